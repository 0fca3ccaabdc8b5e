//! Test doubles and store handles shared by unit tests.

use std::error::Error;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::{Sqlite, pool::PoolConnection};

use crate::db::{self, ConnectionFactory, SqliteConnectionFactory};
use crate::error::StoreError;
use crate::logging::{Field, LoggerAdapter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub fields: Vec<(String, String)>,
    pub fault: Option<String>,
}

impl LogEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Keeps every entry in memory, in emission order.
#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    pub fn entries_at(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.level == level)
            .cloned()
            .collect()
    }

    fn record(&self, level: LogLevel, message: &str, fields: &[Field<'_>], fault: Option<String>) {
        self.entries.lock().unwrap().push(LogEntry {
            level,
            message: message.to_string(),
            fields: fields
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            fault,
        });
    }
}

impl LoggerAdapter for RecordingLogger {
    fn info(&self, message: &str, fields: &[Field<'_>]) {
        self.record(LogLevel::Info, message, fields, None);
    }

    fn error(&self, fault: &(dyn Error + 'static), message: &str, fields: &[Field<'_>]) {
        self.record(LogLevel::Error, message, fields, Some(fault.to_string()));
    }
}

/// A connection factory whose store is unreachable.
pub struct FailingConnectionFactory;

#[async_trait]
impl ConnectionFactory for FailingConnectionFactory {
    async fn create_connection(&self) -> Result<PoolConnection<Sqlite>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}

/// A private in-memory store; dropped with the returned handle.
pub async fn memory_factory() -> Arc<dyn ConnectionFactory> {
    let pool = db::create_pool("sqlite::memory:", 1).await.unwrap();
    Arc::new(SqliteConnectionFactory::new(pool))
}
