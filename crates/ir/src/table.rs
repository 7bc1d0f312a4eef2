//! Table and column metadata
//!
//! These are the per-run records produced by schema introspection. Physical
//! column order is preserved exactly as the schema reports it.

use fastback_core::{DataType, DatabaseType, EngineError, EngineResult, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name of the conventional primary key column
pub const PRIMARY_KEY: &str = "id";

// ============================================================================
// ColumnMetadata
// ============================================================================

/// A single column as reported by the schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Column name, exactly as stored in the schema
    pub name: String,

    /// Declared SQL type (e.g. "varchar(255)", "INTEGER")
    pub declared_type: String,

    /// Whether the column accepts NULL
    pub nullable: bool,

    /// Whether the schema reports the column as part of the primary key
    pub primary_key: bool,
}

impl ColumnMetadata {
    /// Create a new nullable, non-key column
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            nullable: true,
            primary_key: false,
        }
    }

    /// Set nullability (builder pattern)
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Mark the column as primary key (builder pattern)
    pub fn with_primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }

    /// Whether this is the conventional `id` key column
    pub fn is_id(&self) -> bool {
        self.name == PRIMARY_KEY
    }

    /// Classify the declared type for a dialect
    pub fn data_type(&self, db: DatabaseType) -> DataType {
        DataType::from_declared(&self.declared_type, db)
    }
}

// ============================================================================
// TableMetadata
// ============================================================================

/// A table and its ordered columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table name, exactly as stored in the schema
    pub name: String,

    /// Columns in physical order
    pub columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    /// Create a table with no columns yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Append a column (builder pattern)
    pub fn with_column(mut self, column: ColumnMetadata) -> Self {
        self.columns.push(column);
        self
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The `id` key column, if present
    pub fn id_column(&self) -> Option<&ColumnMetadata> {
        self.column(PRIMARY_KEY)
    }

    /// Whether the table has an integer `id` key usable by repositories
    pub fn has_integer_id(&self, db: DatabaseType) -> bool {
        self.id_column()
            .map(|c| c.data_type(db).is_integer())
            .unwrap_or(false)
    }

    /// Columns PostgreSQL must select as `::text`
    pub fn text_columns(&self, db: DatabaseType) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| DataType::reads_as_text(&c.declared_type, db))
            .map(|c| c.name.clone())
            .collect()
    }

    /// Every column except `id`, in physical order
    pub fn non_key_columns(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter().filter(|c| !c.is_id())
    }
}

impl Validatable for TableMetadata {
    fn validate(&self) -> EngineResult<()> {
        if self.name.trim().is_empty() {
            return Err(EngineError::table_introspection(
                &self.name,
                "table name is empty",
            ));
        }
        if self.columns.is_empty() {
            return Err(EngineError::table_introspection(
                &self.name,
                "no columns reported",
            ));
        }
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(EngineError::table_introspection(
                    &self.name,
                    format!("duplicate column '{}'", column.name),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pedido() -> TableMetadata {
        TableMetadata::new("pedido")
            .with_column(
                ColumnMetadata::new("id", "int(11)")
                    .with_nullable(false)
                    .with_primary_key(true),
            )
            .with_column(ColumnMetadata::new("cliente", "varchar(100)"))
            .with_column(ColumnMetadata::new("total", "decimal(10,2)"))
    }

    #[test]
    fn test_column_order_preserved() {
        let table = pedido();
        let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "cliente", "total"]);
    }

    #[test]
    fn test_non_key_columns_skip_id() {
        let table = pedido();
        let names: Vec<_> = table.non_key_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["cliente", "total"]);
    }

    #[test]
    fn test_integer_id_detection() {
        assert!(pedido().has_integer_id(DatabaseType::MySQL));

        let keyed_by_text = TableMetadata::new("tag")
            .with_column(ColumnMetadata::new("id", "varchar(36)"));
        assert!(!keyed_by_text.has_integer_id(DatabaseType::MySQL));

        let no_id = TableMetadata::new("log").with_column(ColumnMetadata::new("line", "text"));
        assert!(!no_id.has_integer_id(DatabaseType::SQLite));
    }

    #[test]
    fn test_text_columns_only_on_postgres() {
        let conta = TableMetadata::new("conta")
            .with_column(ColumnMetadata::new("id", "integer"))
            .with_column(ColumnMetadata::new("titular", "character varying"))
            .with_column(ColumnMetadata::new("saldo", "money"))
            .with_column(ColumnMetadata::new("tags", "ARRAY"));
        assert_eq!(conta.text_columns(DatabaseType::PostgreSQL), vec!["saldo", "tags"]);
        assert!(conta.text_columns(DatabaseType::MySQL).is_empty());
    }

    #[test]
    fn test_validate_rejects_empty_table() {
        let err = TableMetadata::new("ghost").validate().unwrap_err();
        assert!(err.is_table_scoped());
        assert!(pedido().is_valid());
    }

    #[test]
    fn test_validate_rejects_duplicate_columns() {
        let table = TableMetadata::new("dup")
            .with_column(ColumnMetadata::new("a", "text"))
            .with_column(ColumnMetadata::new("a", "text"));
        assert!(!table.is_valid());
    }
}
