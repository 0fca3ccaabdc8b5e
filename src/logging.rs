//! Narrow logging capability used by the service layer.
//!
//! The service talks to [`LoggerAdapter`] rather than to `tracing` directly so
//! tests can record exactly which entries were emitted.

use std::error::Error;
use std::fmt;

/// A named value attached to a log entry.
pub type Field<'a> = (&'static str, &'a (dyn fmt::Display + Sync));

pub trait LoggerAdapter: Send + Sync {
    fn info(&self, message: &str, fields: &[Field<'_>]);

    fn error(&self, fault: &(dyn Error + 'static), message: &str, fields: &[Field<'_>]);
}

/// Emits entries as `tracing` events.
pub struct TracingLogger {
    component: &'static str,
}

impl TracingLogger {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }
}

/// Keys recorded as their own `tracing` fields; anything else lands in `extra`.
const RECORDED_KEYS: [&str; 3] = ["user_id", "full_name", "elapsed_ms"];

fn field_value<'a>(fields: &[Field<'a>], name: &str) -> Option<&'a (dyn fmt::Display + Sync)> {
    fields
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
}

fn extra_fields<'a>(fields: &[Field<'a>]) -> Vec<Field<'a>> {
    fields
        .iter()
        .copied()
        .filter(|(key, _)| !RECORDED_KEYS.contains(key))
        .collect()
}

impl LoggerAdapter for TracingLogger {
    fn info(&self, message: &str, fields: &[Field<'_>]) {
        let extra = extra_fields(fields);
        tracing::info!(
            component = self.component,
            user_id = field_value(fields, "user_id").map(tracing::field::display),
            full_name = field_value(fields, "full_name").map(tracing::field::display),
            elapsed_ms = field_value(fields, "elapsed_ms").map(tracing::field::display),
            extra = %FieldList(&extra),
            "{message}"
        );
    }

    fn error(&self, fault: &(dyn Error + 'static), message: &str, fields: &[Field<'_>]) {
        let extra = extra_fields(fields);
        tracing::error!(
            component = self.component,
            user_id = field_value(fields, "user_id").map(tracing::field::display),
            full_name = field_value(fields, "full_name").map(tracing::field::display),
            elapsed_ms = field_value(fields, "elapsed_ms").map(tracing::field::display),
            extra = %FieldList(&extra),
            error = %fault,
            "{message}"
        );
    }
}

/// Renders fields as space separated `name=value` pairs.
pub struct FieldList<'a, 'b>(pub &'a [Field<'b>]);

impl fmt::Display for FieldList<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_list_renders_pairs() {
        let id = 42;
        let name = "Peter Parker";
        let fields: [Field<'_>; 2] = [("user_id", &id), ("full_name", &name)];

        assert_eq!(
            FieldList(&fields).to_string(),
            "user_id=42 full_name=Peter Parker"
        );
        assert_eq!(FieldList(&[]).to_string(), "");
    }

    #[test]
    fn known_keys_are_split_from_extra_fields() {
        let id = 7;
        let elapsed = 12u128;
        let attempt = 3;
        let fields: [Field<'_>; 3] = [
            ("user_id", &id),
            ("elapsed_ms", &elapsed),
            ("attempt", &attempt),
        ];

        assert_eq!(
            field_value(&fields, "user_id").map(|value| value.to_string()),
            Some("7".to_string())
        );
        assert_eq!(
            field_value(&fields, "elapsed_ms").map(|value| value.to_string()),
            Some("12".to_string())
        );
        assert!(field_value(&fields, "full_name").is_none());
        assert_eq!(FieldList(&extra_fields(&fields)).to_string(), "attempt=3");
    }
}
