//! # Fastback Introspect
//!
//! Reads table, column, and foreign key metadata from a live schema.
//!
//! ## Failure scopes
//!
//! - A failure to list tables means the schema is unreachable; the whole
//!   run stops with `EngineError::Connectivity`.
//! - A failure while describing one table only skips that table. The skip
//!   is logged and recorded in `SchemaSnapshot::skipped`.
//!
//! ## Backends
//!
//! - **SQLite**: `sqlite_master` and the `pragma_*` table-valued functions
//! - **MySQL**: `INFORMATION_SCHEMA` scoped to `DATABASE()`
//! - **PostgreSQL**: `information_schema` scoped to `current_schema()`
//!
//! `StaticSchema` serves the same contract from memory.
//!

pub mod connection;
pub mod memory;
mod mysql;
mod postgres;
mod rows;
mod sqlite;

pub use connection::SchemaConnection;
pub use memory::StaticSchema;

use fastback_core::{DatabaseType, EngineResult, Validatable};
use fastback_ir::{ColumnMetadata, ForeignKeyConstraint, SchemaSnapshot, TableMetadata};

// ============================================================================
// SchemaIntrospector
// ============================================================================

/// Source of schema metadata
#[allow(async_fn_in_trait)]
pub trait SchemaIntrospector {
    /// Dialect of the schema being read
    fn database(&self) -> DatabaseType;

    /// Table names, in the order the schema reports them
    async fn list_tables(&self) -> EngineResult<Vec<String>>;

    /// Columns of one table, in physical order
    async fn describe_columns(&self, table: &str) -> EngineResult<Vec<ColumnMetadata>>;

    /// Foreign key tuples where `table` is either side
    async fn describe_foreign_keys(&self, table: &str) -> EngineResult<Vec<ForeignKeyConstraint>>;
}

// ============================================================================
// Discovery
// ============================================================================

/// Run one full introspection pass.
///
/// Tables are described one after another over the same introspector.
pub async fn discover<I: SchemaIntrospector>(introspector: &I) -> EngineResult<SchemaSnapshot> {
    let names = introspector.list_tables().await?;
    tracing::info!(
        tables = names.len(),
        database = %introspector.database(),
        "Listing tables"
    );

    let mut snapshot = SchemaSnapshot::new(introspector.database());

    for name in names {
        match describe_table(introspector, &name).await {
            Ok((table, constraints)) => {
                tracing::debug!(
                    table = name.as_str(),
                    columns = table.columns.len(),
                    foreign_keys = constraints.len(),
                    "Described table"
                );
                snapshot.tables.push(table);
                snapshot.constraints.extend(constraints);
            }
            Err(err) if err.is_table_scoped() => {
                tracing::warn!(table = name.as_str(), error = %err, "Skipping table");
                snapshot.skip(&name, err.to_string());
            }
            Err(err) => return Err(err),
        }
    }

    Ok(snapshot)
}

async fn describe_table<I: SchemaIntrospector>(
    introspector: &I,
    name: &str,
) -> EngineResult<(TableMetadata, Vec<ForeignKeyConstraint>)> {
    let table = TableMetadata {
        name: name.to_string(),
        columns: introspector.describe_columns(name).await?,
    };
    table.validate()?;

    let constraints = introspector.describe_foreign_keys(name).await?;
    Ok((table, constraints))
}
