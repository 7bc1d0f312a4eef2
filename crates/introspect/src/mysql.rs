//! MySQL / MariaDB metadata queries
//!
//! `INFORMATION_SCHEMA` columns come back as binary strings on some server
//! versions, hence the `CAST(... AS CHAR)` everywhere.

use crate::rows::{ForeignKeyRow, listing_error, scoped_error};
use fastback_core::EngineResult;
use fastback_ir::{ColumnMetadata, ForeignKeyConstraint};
use sqlx::{FromRow, MySqlPool};

const LIST_TABLES: &str = "SELECT CAST(TABLE_NAME AS CHAR) FROM INFORMATION_SCHEMA.TABLES \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE' \
     ORDER BY TABLE_NAME";

const DESCRIBE_COLUMNS: &str = "SELECT CAST(COLUMN_NAME AS CHAR) AS column_name, \
     CAST(COLUMN_TYPE AS CHAR) AS declared_type, \
     CAST(IS_NULLABLE AS CHAR) AS is_nullable, \
     CAST(COLUMN_KEY AS CHAR) AS column_key \
     FROM INFORMATION_SCHEMA.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
     ORDER BY ORDINAL_POSITION";

const DESCRIBE_FOREIGN_KEYS: &str = "SELECT CAST(CONSTRAINT_NAME AS CHAR) AS constraint_name, \
     CAST(TABLE_NAME AS CHAR) AS detail_table, \
     CAST(COLUMN_NAME AS CHAR) AS detail_column, \
     CAST(REFERENCED_TABLE_NAME AS CHAR) AS master_table, \
     CAST(REFERENCED_COLUMN_NAME AS CHAR) AS master_column, \
     CAST(ORDINAL_POSITION AS SIGNED) AS position \
     FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE \
     WHERE TABLE_SCHEMA = DATABASE() \
     AND (TABLE_NAME = ? OR REFERENCED_TABLE_NAME = ?) \
     AND REFERENCED_TABLE_NAME IS NOT NULL \
     ORDER BY TABLE_NAME, CONSTRAINT_NAME, ORDINAL_POSITION";

#[derive(FromRow, Debug)]
struct MySqlColumnRow {
    column_name: String,
    declared_type: String,
    is_nullable: String,
    column_key: String,
}

impl From<MySqlColumnRow> for ColumnMetadata {
    fn from(row: MySqlColumnRow) -> Self {
        ColumnMetadata::new(row.column_name, row.declared_type)
            .with_nullable(row.is_nullable.eq_ignore_ascii_case("YES"))
            .with_primary_key(row.column_key == "PRI")
    }
}

pub(crate) async fn list_tables(pool: &MySqlPool) -> EngineResult<Vec<String>> {
    tracing::debug!(query = LIST_TABLES, "Listing MySQL tables");
    sqlx::query_scalar(LIST_TABLES)
        .fetch_all(pool)
        .await
        .map_err(listing_error)
}

pub(crate) async fn describe_columns(
    pool: &MySqlPool,
    table: &str,
) -> EngineResult<Vec<ColumnMetadata>> {
    tracing::debug!(table, "Describing MySQL columns");
    let rows: Vec<MySqlColumnRow> = sqlx::query_as(DESCRIBE_COLUMNS)
        .bind(table)
        .fetch_all(pool)
        .await
        .map_err(|e| scoped_error(table, e))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub(crate) async fn describe_foreign_keys(
    pool: &MySqlPool,
    table: &str,
) -> EngineResult<Vec<ForeignKeyConstraint>> {
    tracing::debug!(table, "Describing MySQL foreign keys");
    let rows: Vec<ForeignKeyRow> = sqlx::query_as(DESCRIBE_FOREIGN_KEYS)
        .bind(table)
        .bind(table)
        .fetch_all(pool)
        .await
        .map_err(|e| scoped_error(table, e))?;
    Ok(rows.into_iter().map(Into::into).collect())
}
