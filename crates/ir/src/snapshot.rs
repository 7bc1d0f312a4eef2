//! Schema snapshot
//!
//! Everything one introspection pass learned about the schema. Built fresh
//! on every run and discarded once emission is done.

use crate::relationship::{ForeignKeyConstraint, RelationshipDetector, TableRelationships};
use crate::table::TableMetadata;
use fastback_core::{DatabaseType, EngineResult};
use serde::{Deserialize, Serialize};

/// A table that was left out of the run, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTable {
    pub table: String,
    pub reason: String,
}

/// Result of one introspection pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// Dialect the snapshot was read from
    pub database: DatabaseType,

    /// Successfully described tables, in schema order
    pub tables: Vec<TableMetadata>,

    /// Raw foreign key tuples gathered across all tables
    pub constraints: Vec<ForeignKeyConstraint>,

    /// Tables whose metadata could not be read
    pub skipped: Vec<SkippedTable>,
}

impl SchemaSnapshot {
    pub fn new(database: DatabaseType) -> Self {
        Self {
            database,
            ..Default::default()
        }
    }

    /// Look up a described table by name
    pub fn table(&self, name: &str) -> Option<&TableMetadata> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Whether `name` was skipped during introspection
    pub fn is_skipped(&self, name: &str) -> bool {
        self.skipped.iter().any(|s| s.table == name)
    }

    /// Record a table skip
    pub fn skip(&mut self, table: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(SkippedTable {
            table: table.into(),
            reason: reason.into(),
        });
    }

    /// Classified relationships for one table
    pub fn relationships_for(&self, table: &str) -> TableRelationships {
        RelationshipDetector::classify(table, &self.constraints)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
