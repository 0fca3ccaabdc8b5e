//! Users CRUD API: axum handlers over a logging service and a SQLite repository.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod mapper;
pub mod models;
pub mod otel;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod telemetry;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use crate::db::ConnectionFactory;
use crate::logging::TracingLogger;
use crate::repository::SqliteUserRepository;
use crate::service::DefaultUserService;
use crate::state::AppState;

/// Wires repository, service and handlers over the given store.
pub fn app(connections: Arc<dyn ConnectionFactory>, store_timeout: Duration) -> Router {
    let repository = Arc::new(SqliteUserRepository::new(connections, store_timeout));
    let logger = Arc::new(TracingLogger::new("UserService"));
    let service = DefaultUserService::new(repository, logger);

    routes::create_router(AppState::new(Arc::new(service)))
}
