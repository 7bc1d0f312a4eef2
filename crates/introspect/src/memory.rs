//! In-memory schema source
//!
//! Serves fixed metadata through `SchemaIntrospector`, with switches to make
//! a single table fail or the whole schema unreachable.

use crate::SchemaIntrospector;
use fastback_core::{DatabaseType, EngineError, EngineResult};
use fastback_ir::{ColumnMetadata, ForeignKeyConstraint, TableMetadata};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    database: DatabaseType,
    tables: Vec<TableMetadata>,
    constraints: Vec<ForeignKeyConstraint>,
    failing: HashSet<String>,
    unreachable: bool,
}

impl StaticSchema {
    pub fn new(database: DatabaseType) -> Self {
        Self {
            database,
            ..Default::default()
        }
    }

    pub fn with_table(mut self, table: TableMetadata) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_constraint(mut self, constraint: ForeignKeyConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Make every metadata query for `table` fail
    pub fn with_failing_table(mut self, table: impl Into<String>) -> Self {
        self.failing.insert(table.into());
        self
    }

    /// Make table listing fail
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    fn check(&self, table: &str) -> EngineResult<()> {
        if self.failing.contains(table) {
            return Err(EngineError::table_introspection(
                table,
                "metadata query failed",
            ));
        }
        Ok(())
    }
}

impl SchemaIntrospector for StaticSchema {
    fn database(&self) -> DatabaseType {
        self.database
    }

    async fn list_tables(&self) -> EngineResult<Vec<String>> {
        if self.unreachable {
            return Err(EngineError::connectivity("schema unreachable"));
        }
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn describe_columns(&self, table: &str) -> EngineResult<Vec<ColumnMetadata>> {
        self.check(table)?;
        self.tables
            .iter()
            .find(|t| t.name == table)
            .map(|t| t.columns.clone())
            .ok_or_else(|| EngineError::table_introspection(table, "no such table"))
    }

    async fn describe_foreign_keys(&self, table: &str) -> EngineResult<Vec<ForeignKeyConstraint>> {
        self.check(table)?;
        Ok(self
            .constraints
            .iter()
            .filter(|fk| fk.touches(table))
            .cloned()
            .collect())
    }
}
