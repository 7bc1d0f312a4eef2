//! Schema connection
//!
//! One pooled connection, opened from a URL and threaded explicitly through
//! the introspection pass. Queries run one after another on it.

use crate::{SchemaIntrospector, mysql, postgres, sqlite};
use fastback_core::{DatabaseType, EngineError, EngineResult};
use fastback_ir::{ColumnMetadata, ForeignKeyConstraint};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{MySqlPool, PgPool, SqlitePool};

/// A live connection to one of the supported backends
#[derive(Debug, Clone)]
pub enum SchemaConnection {
    Sqlite(SqlitePool),
    MySql(MySqlPool),
    Postgres(PgPool),
}

impl SchemaConnection {
    /// Open a single-connection pool for `url`.
    ///
    /// The backend is picked from the URL scheme. Any failure here is a
    /// connectivity failure.
    pub async fn connect(url: &str) -> EngineResult<Self> {
        let database = DatabaseType::from_url(url)?;
        tracing::info!(database = %database, "Connecting to schema");

        let connection = match database {
            DatabaseType::SQLite => SqlitePoolOptions::new()
                .max_connections(1)
                .connect(url)
                .await
                .map(SchemaConnection::Sqlite),
            DatabaseType::MySQL => MySqlPoolOptions::new()
                .max_connections(1)
                .connect(url)
                .await
                .map(SchemaConnection::MySql),
            DatabaseType::PostgreSQL => PgPoolOptions::new()
                .max_connections(1)
                .connect(url)
                .await
                .map(SchemaConnection::Postgres),
        };

        connection.map_err(|e| EngineError::connectivity(e.to_string()))
    }

    /// Close the underlying pool
    pub async fn close(&self) {
        match self {
            SchemaConnection::Sqlite(pool) => pool.close().await,
            SchemaConnection::MySql(pool) => pool.close().await,
            SchemaConnection::Postgres(pool) => pool.close().await,
        }
    }
}

impl SchemaIntrospector for SchemaConnection {
    fn database(&self) -> DatabaseType {
        match self {
            SchemaConnection::Sqlite(_) => DatabaseType::SQLite,
            SchemaConnection::MySql(_) => DatabaseType::MySQL,
            SchemaConnection::Postgres(_) => DatabaseType::PostgreSQL,
        }
    }

    async fn list_tables(&self) -> EngineResult<Vec<String>> {
        match self {
            SchemaConnection::Sqlite(pool) => sqlite::list_tables(pool).await,
            SchemaConnection::MySql(pool) => mysql::list_tables(pool).await,
            SchemaConnection::Postgres(pool) => postgres::list_tables(pool).await,
        }
    }

    async fn describe_columns(&self, table: &str) -> EngineResult<Vec<ColumnMetadata>> {
        match self {
            SchemaConnection::Sqlite(pool) => sqlite::describe_columns(pool, table).await,
            SchemaConnection::MySql(pool) => mysql::describe_columns(pool, table).await,
            SchemaConnection::Postgres(pool) => postgres::describe_columns(pool, table).await,
        }
    }

    async fn describe_foreign_keys(&self, table: &str) -> EngineResult<Vec<ForeignKeyConstraint>> {
        match self {
            SchemaConnection::Sqlite(pool) => sqlite::describe_foreign_keys(pool, table).await,
            SchemaConnection::MySql(pool) => mysql::describe_foreign_keys(pool, table).await,
            SchemaConnection::Postgres(pool) => {
                postgres::describe_foreign_keys(pool, table).await
            }
        }
    }
}
