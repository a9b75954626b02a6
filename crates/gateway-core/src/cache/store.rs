use super::CacheError;
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::str::FromStr;

/// Durable key/value store backing one cache instance.
///
/// Records are opaque JSON strings of the form `{"key": .., "value": {data, storedAt, ttl}}`.
/// Implementations must tolerate being called from a single worker task in order.
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn put(&self, key: &str, record: &str) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn clear(&self) -> Result<(), CacheError>;
}

/// `SQLite`-backed store: one table per cache instance, keyed by `key`.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    table: String,
}

impl SqliteStore {
    /// Opens (creating if needed) the database and the instance's table.
    ///
    /// # Errors
    /// Returns `CacheError::InvalidTable` for a non-identifier table name and
    /// `CacheError::Database` if the database cannot be opened or the table created.
    pub async fn connect(database_url: &str, table: &str) -> Result<Self, CacheError> {
        validate_table_name(table)?;

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let max_connections = if database_url.contains(":memory:") { 1 } else { 4 };
        let pool =
            SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (key TEXT PRIMARY KEY NOT NULL, value TEXT NOT NULL)"
        ))
        .execute(&pool)
        .await?;

        Ok(Self { pool, table: table.to_string() })
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Number of persisted records, including expired ones not yet removed.
    ///
    /// # Errors
    /// Returns `CacheError::Database` on query failure.
    pub async fn count(&self) -> Result<i64, CacheError> {
        let row = sqlx::query(&format!("SELECT COUNT(*) AS n FROM {}", self.table))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>("n")?)
    }
}

#[async_trait]
impl DurableStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let row = sqlx::query(&format!("SELECT value FROM {} WHERE key = ?", self.table))
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_get::<String, _>("value")).transpose().map_err(CacheError::from)
    }

    async fn put(&self, key: &str, record: &str) -> Result<(), CacheError> {
        sqlx::query(&format!(
            "INSERT INTO {} (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            self.table
        ))
        .bind(key)
        .bind(record)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        sqlx::query(&format!("DELETE FROM {} WHERE key = ?", self.table))
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        sqlx::query(&format!("DELETE FROM {}", self.table)).execute(&self.pool).await?;
        Ok(())
    }
}

fn validate_table_name(table: &str) -> Result<(), CacheError> {
    let valid = !table.is_empty()
        && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !table.starts_with(|c: char| c.is_ascii_digit());

    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidTable(table.to_string()))
    }
}
