use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{
    Database, Decode, Encode, Row, Sqlite, SqlitePool, Type,
    encode::IsNull,
    error::BoxDynError,
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteTypeInfo},
};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::UserId;

/// Name of the user every fresh store starts with.
pub const SEEDED_USER_NAME: &str = "Peter Parker";

pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .context("Invalid DATABASE_URL")?
        .create_if_missing(true);

    // Idle connections are kept so an in-memory database outlives the first query.
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .context("Failed to connect to DB")
}

/// Hands out one store connection per operation.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn create_connection(&self) -> Result<PoolConnection<Sqlite>, StoreError>;
}

pub struct SqliteConnectionFactory {
    pool: SqlitePool,
}

impl SqliteConnectionFactory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionFactory for SqliteConnectionFactory {
    async fn create_connection(&self) -> Result<PoolConnection<Sqlite>, StoreError> {
        Ok(self.pool.acquire().await?)
    }
}

// SQLite has no native UUID column, so ids travel as hyphenated text.
impl Type<Sqlite> for UserId {
    fn type_info() -> SqliteTypeInfo {
        <String as Type<Sqlite>>::type_info()
    }

    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <String as Type<Sqlite>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Sqlite> for UserId {
    fn encode_by_ref(
        &self,
        buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        <String as Encode<'q, Sqlite>>::encode(self.0.hyphenated().to_string(), buf)
    }
}

impl<'r> Decode<'r, Sqlite> for UserId {
    fn decode(value: <Sqlite as Database>::ValueRef<'r>) -> Result<Self, BoxDynError> {
        let text = <String as Decode<'r, Sqlite>>::decode(value)?;
        Ok(Self(Uuid::parse_str(&text)?))
    }
}

/// Creates the `Users` table and seeds it. Safe to run on every startup.
pub struct DatabaseInitializer {
    connections: Arc<dyn ConnectionFactory>,
}

impl DatabaseInitializer {
    pub fn new(connections: Arc<dyn ConnectionFactory>) -> Self {
        Self { connections }
    }

    pub async fn initialize(&self) -> Result<(), StoreError> {
        let mut connection = self.connections.create_connection().await?;

        sqlx::query("CREATE TABLE IF NOT EXISTS Users (Id TEXT PRIMARY KEY, FullName TEXT NOT NULL)")
            .execute(&mut *connection)
            .await?;

        let seeded = sqlx::query("SELECT Id FROM Users WHERE FullName = ?")
            .bind(SEEDED_USER_NAME)
            .fetch_optional(&mut *connection)
            .await?;

        match seeded {
            Some(row) => {
                let id: UserId = row.try_get("Id")?;
                tracing::debug!(%id, "Seed user already present");
            }
            None => {
                let id = UserId::new();
                sqlx::query("INSERT INTO Users (Id, FullName) VALUES (?, ?)")
                    .bind(id)
                    .bind(SEEDED_USER_NAME)
                    .execute(&mut *connection)
                    .await?;
                tracing::info!(%id, name = SEEDED_USER_NAME, "Seeded users table");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::memory_factory;

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let factory = memory_factory().await;
        let initializer = DatabaseInitializer::new(factory.clone());

        initializer.initialize().await.unwrap();
        initializer.initialize().await.unwrap();

        let mut connection = factory.create_connection().await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Users WHERE FullName = ?")
            .bind(SEEDED_USER_NAME)
            .fetch_one(&mut *connection)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn ids_are_stored_as_hyphenated_text() {
        let factory = memory_factory().await;
        DatabaseInitializer::new(factory.clone())
            .initialize()
            .await
            .unwrap();

        let mut connection = factory.create_connection().await.unwrap();
        let row = sqlx::query("SELECT typeof(Id) AS kind, Id FROM Users")
            .fetch_one(&mut *connection)
            .await
            .unwrap();

        let kind: String = row.get("kind");
        let raw: String = row.get("Id");
        let decoded: UserId = row.get("Id");
        assert_eq!(kind, "text");
        assert_eq!(raw, decoded.to_string());
        assert_eq!(raw.len(), 36);
    }

    #[tokio::test]
    async fn non_uuid_text_fails_to_decode() {
        let factory = memory_factory().await;
        let mut connection = factory.create_connection().await.unwrap();

        let result: Result<UserId, sqlx::Error> = sqlx::query_scalar("SELECT 'not-a-uuid'")
            .fetch_one(&mut *connection)
            .await;

        assert!(matches!(result, Err(sqlx::Error::ColumnDecode { .. })));
    }
}
