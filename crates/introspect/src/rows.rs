//! Row shapes returned by the metadata queries, and sqlx error scoping.

use fastback_core::EngineError;
use fastback_ir::{ColumnMetadata, ForeignKeyConstraint};
use sqlx::FromRow;

/// Column row, normalized across backends
#[derive(FromRow, Debug, Clone)]
pub(crate) struct ColumnRow {
    pub column_name: String,
    pub declared_type: String,
    pub nullable: bool,
    pub primary_key: bool,
}

impl From<ColumnRow> for ColumnMetadata {
    fn from(row: ColumnRow) -> Self {
        ColumnMetadata::new(row.column_name, row.declared_type)
            .with_nullable(row.nullable)
            .with_primary_key(row.primary_key)
    }
}

/// Foreign key row, normalized across backends
#[derive(FromRow, Debug, Clone)]
pub(crate) struct ForeignKeyRow {
    pub constraint_name: String,
    pub detail_table: String,
    pub detail_column: String,
    pub master_table: String,
    pub master_column: Option<String>,
    pub position: i64,
}

impl From<ForeignKeyRow> for ForeignKeyConstraint {
    fn from(row: ForeignKeyRow) -> Self {
        ForeignKeyConstraint::new(
            row.constraint_name,
            row.detail_table,
            row.detail_column,
            row.master_table,
        )
        .with_master_column(row.master_column)
        .with_position(u32::try_from(row.position).unwrap_or(1))
    }
}

/// Map a query failure to its scope: losing the connection is fatal,
/// anything else only affects `table`.
pub(crate) fn scoped_error(table: &str, err: sqlx::Error) -> EngineError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => EngineError::connectivity(err.to_string()),
        other => EngineError::table_introspection(table, other.to_string()),
    }
}

/// Failure while listing tables; always fatal
pub(crate) fn listing_error(err: sqlx::Error) -> EngineError {
    EngineError::connectivity(err.to_string())
}
