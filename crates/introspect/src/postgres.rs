//! PostgreSQL metadata queries

use crate::rows::{ColumnRow, ForeignKeyRow, listing_error, scoped_error};
use fastback_core::EngineResult;
use fastback_ir::{ColumnMetadata, ForeignKeyConstraint};
use sqlx::PgPool;

const LIST_TABLES: &str = "SELECT table_name::text FROM information_schema.tables \
     WHERE table_schema = current_schema() AND table_type = 'BASE TABLE' \
     ORDER BY table_name";

const DESCRIBE_COLUMNS: &str = "SELECT c.column_name::text AS column_name, \
     c.data_type::text AS declared_type, \
     (c.is_nullable = 'YES') AS nullable, \
     EXISTS ( \
         SELECT 1 FROM information_schema.table_constraints tc \
         JOIN information_schema.key_column_usage k \
           ON k.constraint_name = tc.constraint_name \
          AND k.table_schema = tc.table_schema \
          AND k.table_name = tc.table_name \
         WHERE tc.constraint_type = 'PRIMARY KEY' \
           AND tc.table_schema = c.table_schema \
           AND tc.table_name = c.table_name \
           AND k.column_name = c.column_name \
     ) AS primary_key \
     FROM information_schema.columns c \
     WHERE c.table_schema = current_schema() AND c.table_name = $1 \
     ORDER BY c.ordinal_position";

const DESCRIBE_FOREIGN_KEYS: &str = "SELECT tc.constraint_name::text AS constraint_name, \
     kcu.table_name::text AS detail_table, \
     kcu.column_name::text AS detail_column, \
     ccu.table_name::text AS master_table, \
     ccu.column_name::text AS master_column, \
     kcu.ordinal_position::int8 AS position \
     FROM information_schema.table_constraints tc \
     JOIN information_schema.key_column_usage kcu \
       ON tc.constraint_name = kcu.constraint_name \
      AND tc.table_schema = kcu.table_schema \
     JOIN information_schema.constraint_column_usage ccu \
       ON ccu.constraint_name = tc.constraint_name \
      AND ccu.table_schema = tc.table_schema \
     WHERE tc.constraint_type = 'FOREIGN KEY' \
       AND tc.table_schema = current_schema() \
       AND (kcu.table_name = $1 OR ccu.table_name = $1) \
     ORDER BY kcu.table_name, tc.constraint_name, kcu.ordinal_position";

pub(crate) async fn list_tables(pool: &PgPool) -> EngineResult<Vec<String>> {
    tracing::debug!(query = LIST_TABLES, "Listing PostgreSQL tables");
    sqlx::query_scalar(LIST_TABLES)
        .fetch_all(pool)
        .await
        .map_err(listing_error)
}

pub(crate) async fn describe_columns(
    pool: &PgPool,
    table: &str,
) -> EngineResult<Vec<ColumnMetadata>> {
    tracing::debug!(table, "Describing PostgreSQL columns");
    let rows: Vec<ColumnRow> = sqlx::query_as(DESCRIBE_COLUMNS)
        .bind(table)
        .fetch_all(pool)
        .await
        .map_err(|e| scoped_error(table, e))?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub(crate) async fn describe_foreign_keys(
    pool: &PgPool,
    table: &str,
) -> EngineResult<Vec<ForeignKeyConstraint>> {
    tracing::debug!(table, "Describing PostgreSQL foreign keys");
    let rows: Vec<ForeignKeyRow> = sqlx::query_as(DESCRIBE_FOREIGN_KEYS)
        .bind(table)
        .fetch_all(pool)
        .await
        .map_err(|e| scoped_error(table, e))?;
    Ok(rows.into_iter().map(Into::into).collect())
}
