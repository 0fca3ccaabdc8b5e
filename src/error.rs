use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Unexpected failures talking to the users store.
///
/// Not-found is never reported through this type; repositories return
/// `None` or `false` for that.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{operation} timed out after {after:?}")]
    TimedOut {
        operation: &'static str,
        after: Duration,
    },
}

/// Errors surfaced by HTTP handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Store(fault) => {
                // The service already logged the fault at error level.
                tracing::debug!(error = %fault, "Store failure while handling request");
            }
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error",
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_maps_to_internal_server_error() {
        let fault = StoreError::Database(sqlx::Error::PoolTimedOut);

        let response = AppError::from(fault).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn timed_out_names_the_operation() {
        let fault = StoreError::TimedOut {
            operation: "get_all",
            after: Duration::from_millis(250),
        };
        assert_eq!(fault.to_string(), "get_all timed out after 250ms");
    }
}
