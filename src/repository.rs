use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{Row, sqlite::SqliteRow};

use crate::db::ConnectionFactory;
use crate::error::StoreError;
use crate::models::{User, UserId};

/// Persistence for [`User`] rows.
///
/// Absence is reported as `None`/`false`; `Err` is reserved for store faults.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<User>, StoreError>;

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Inserts a new row. An existing row with the same id is a store fault.
    async fn create(&self, user: User) -> Result<bool, StoreError>;

    /// Returns `true` iff a row was removed.
    async fn delete_by_id(&self, id: UserId) -> Result<bool, StoreError>;
}

pub struct SqliteUserRepository {
    connections: Arc<dyn ConnectionFactory>,
    timeout: Duration,
}

impl SqliteUserRepository {
    pub fn new(connections: Arc<dyn ConnectionFactory>, timeout: Duration) -> Self {
        Self {
            connections,
            timeout,
        }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        statement: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, statement).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::TimedOut {
                operation,
                after: self.timeout,
            }),
        }
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("Id")?,
        full_name: row.try_get("FullName")?,
    })
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get_all(&self) -> Result<Vec<User>, StoreError> {
        let mut connection = self.connections.create_connection().await?;
        let rows = self
            .bounded(
                "get_all",
                sqlx::query("SELECT Id, FullName FROM Users").fetch_all(&mut *connection),
            )
            .await?;

        Ok(rows.iter().map(user_from_row).collect::<Result<Vec<_>, sqlx::Error>>()?)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let mut connection = self.connections.create_connection().await?;
        let row = self
            .bounded(
                "get_by_id",
                sqlx::query("SELECT Id, FullName FROM Users WHERE Id = ?")
                    .bind(id)
                    .fetch_optional(&mut *connection),
            )
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn create(&self, user: User) -> Result<bool, StoreError> {
        let mut connection = self.connections.create_connection().await?;
        let result = self
            .bounded(
                "create",
                sqlx::query("INSERT INTO Users (Id, FullName) VALUES (?, ?)")
                    .bind(user.id)
                    .bind(&user.full_name)
                    .execute(&mut *connection),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: UserId) -> Result<bool, StoreError> {
        let mut connection = self.connections.create_connection().await?;
        let result = self
            .bounded(
                "delete_by_id",
                sqlx::query("DELETE FROM Users WHERE Id = ?")
                    .bind(id)
                    .execute(&mut *connection),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
