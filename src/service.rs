use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::logging::{Field, LoggerAdapter};
use crate::models::{User, UserId};
use crate::repository::UserRepository;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_all(&self) -> Result<Vec<User>, StoreError>;

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Persists an already validated user.
    async fn create(&self, user: User) -> Result<bool, StoreError>;

    async fn delete_by_id(&self, id: UserId) -> Result<bool, StoreError>;
}

/// Log lines written around one repository call.
struct Operation<'a> {
    started: &'static str,
    succeeded: &'static str,
    failed: &'static str,
    /// Key fields carried by every entry.
    fields: &'a [Field<'a>],
    /// Extra fields for the start entry only.
    details: &'a [Field<'a>],
}

/// Delegates to the repository, logging start, duration and faults of each call.
///
/// Faults are logged once and returned unchanged.
pub struct DefaultUserService<R, L>
where
    R: UserRepository,
    L: LoggerAdapter,
{
    users: Arc<R>,
    logger: Arc<L>,
}

impl<R, L> DefaultUserService<R, L>
where
    R: UserRepository,
    L: LoggerAdapter,
{
    pub fn new(users: Arc<R>, logger: Arc<L>) -> Self {
        Self { users, logger }
    }

    async fn observe<T>(
        &self,
        operation: Operation<'_>,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        let mut started = operation.fields.to_vec();
        started.extend_from_slice(operation.details);
        self.logger.info(operation.started, &started);
        let started_at = Instant::now();

        match call.await {
            Ok(value) => {
                let elapsed_ms = started_at.elapsed().as_millis();
                let mut fields = operation.fields.to_vec();
                fields.push(("elapsed_ms", &elapsed_ms));
                self.logger.info(operation.succeeded, &fields);
                Ok(value)
            }
            Err(fault) => {
                self.logger.error(&fault, operation.failed, operation.fields);
                Err(fault)
            }
        }
    }
}

#[async_trait]
impl<R, L> UserService for DefaultUserService<R, L>
where
    R: UserRepository,
    L: LoggerAdapter,
{
    async fn get_all(&self) -> Result<Vec<User>, StoreError> {
        let operation = Operation {
            started: "Retrieving all users",
            succeeded: "All users retrieved",
            failed: "Something went wrong while retrieving all users",
            fields: &[],
            details: &[],
        };
        self.observe(operation, self.users.get_all()).await
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let fields: [Field<'_>; 1] = [("user_id", &id)];
        let operation = Operation {
            started: "Retrieving user",
            succeeded: "User retrieved",
            failed: "Something went wrong while retrieving user",
            fields: &fields,
            details: &[],
        };
        self.observe(operation, self.users.get_by_id(id)).await
    }

    async fn create(&self, user: User) -> Result<bool, StoreError> {
        let id = user.id;
        let full_name = user.full_name.clone();
        let fields: [Field<'_>; 1] = [("user_id", &id)];
        let details: [Field<'_>; 1] = [("full_name", &full_name)];
        let operation = Operation {
            started: "Creating user",
            succeeded: "User created",
            failed: "Something went wrong while creating a user",
            fields: &fields,
            details: &details,
        };
        self.observe(operation, self.users.create(user)).await
    }

    async fn delete_by_id(&self, id: UserId) -> Result<bool, StoreError> {
        let fields: [Field<'_>; 1] = [("user_id", &id)];
        let operation = Operation {
            started: "Deleting user",
            succeeded: "User deleted",
            failed: "Something went wrong while deleting user",
            fields: &fields,
            details: &[],
        };
        self.observe(operation, self.users.delete_by_id(id)).await
    }
}
