use axum::{Router, routing::get};
use axum_tracing_opentelemetry::middleware::OtelAxumLayer;

use crate::handlers::{add_user, delete_user, get_user, get_users};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/users", get(get_users).post(add_user))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .layer(OtelAxumLayer::default())
        .with_state(state)
}
