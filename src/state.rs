use std::sync::Arc;

use opentelemetry::metrics::Counter;

use crate::service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserService>,
    pub users_created_counter: Counter<u64>,
}

impl AppState {
    /// Builds the state with a counter from the global meter provider.
    pub fn new(users: Arc<dyn UserService>) -> Self {
        let users_created_counter = opentelemetry::global::meter("users-api")
            .u64_counter("users_created")
            .with_description("Number of users created through the API")
            .build();

        Self {
            users,
            users_created_counter,
        }
    }
}
