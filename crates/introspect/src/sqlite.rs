//! SQLite metadata queries

use crate::rows::{ColumnRow, ForeignKeyRow, listing_error, scoped_error};
use fastback_core::EngineResult;
use fastback_ir::{ColumnMetadata, ForeignKeyConstraint};
use sqlx::SqlitePool;

const LIST_TABLES: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
     ORDER BY name";

const DESCRIBE_COLUMNS: &str = "SELECT name AS column_name, type AS declared_type, \
     (\"notnull\" = 0) AS nullable, (pk > 0) AS primary_key \
     FROM pragma_table_info(?1) ORDER BY cid";

// Foreign keys are declared on the referencing table only, so every table
// is scanned to find the ones pointing at ?1.
const DESCRIBE_FOREIGN_KEYS: &str = "SELECT 'fk_' || m.name || '_' || f.id AS constraint_name, \
     m.name AS detail_table, f.\"from\" AS detail_column, \
     f.\"table\" AS master_table, f.\"to\" AS master_column, \
     f.seq + 1 AS position \
     FROM sqlite_master m JOIN pragma_foreign_key_list(m.name) f \
     WHERE m.type = 'table' AND (m.name = ?1 OR f.\"table\" = ?1) \
     ORDER BY m.name, f.id, f.seq";

pub(crate) async fn list_tables(pool: &SqlitePool) -> EngineResult<Vec<String>> {
    tracing::debug!(query = LIST_TABLES, "Listing SQLite tables");
    sqlx::query_scalar(LIST_TABLES)
        .fetch_all(pool)
        .await
        .map_err(listing_error)
}

pub(crate) async fn describe_columns(
    pool: &SqlitePool,
    table: &str,
) -> EngineResult<Vec<ColumnMetadata>> {
    tracing::debug!(table, "Describing SQLite columns");
    let rows: Vec<ColumnRow> = sqlx::query_as(DESCRIBE_COLUMNS)
        .bind(table)
        .fetch_all(pool)
        .await
        .map_err(|e| scoped_error(table, e))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub(crate) async fn describe_foreign_keys(
    pool: &SqlitePool,
    table: &str,
) -> EngineResult<Vec<ForeignKeyConstraint>> {
    tracing::debug!(table, "Describing SQLite foreign keys");
    let rows: Vec<ForeignKeyRow> = sqlx::query_as(DESCRIBE_FOREIGN_KEYS)
        .bind(table)
        .fetch_all(pool)
        .await
        .map_err(|e| scoped_error(table, e))?;
    Ok(rows.into_iter().map(Into::into).collect())
}
