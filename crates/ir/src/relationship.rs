//! Foreign keys and master/detail relationships
//!
//! Raw constraint tuples come straight from introspection. The
//! `RelationshipDetector` collapses them into directional `Relationship`
//! values and partitions them per table into master and detail roles.
//!
//! # Rules
//!
//! - A constraint spanning more than one column is discarded.
//! - A constraint whose referenced column is known and is not `id` is discarded.
//! - The same (detail table, detail column, master table) triple is kept once,
//!   since each side of the dependency reports it.

use crate::table::PRIMARY_KEY;
use fastback_core::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

// ============================================================================
// ForeignKeyConstraint
// ============================================================================

/// One column of a foreign key constraint as reported by the schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKeyConstraint {
    /// Constraint name (synthesized when the backend has none)
    pub name: String,

    /// Referencing table (the "many" side)
    pub detail_table: String,

    /// Referencing column
    pub detail_column: String,

    /// Referenced table (the "one" side)
    pub master_table: String,

    /// Referenced column, when the backend reports it
    pub master_column: Option<String>,

    /// 1-based ordinal position of this column within the constraint
    pub position: u32,
}

impl ForeignKeyConstraint {
    /// Create a single-column constraint referencing `id`
    pub fn new(
        name: impl Into<String>,
        detail_table: impl Into<String>,
        detail_column: impl Into<String>,
        master_table: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            detail_table: detail_table.into(),
            detail_column: detail_column.into(),
            master_table: master_table.into(),
            master_column: Some(PRIMARY_KEY.to_string()),
            position: 1,
        }
    }

    /// Set the referenced column (builder pattern)
    pub fn with_master_column(mut self, column: Option<String>) -> Self {
        self.master_column = column;
        self
    }

    /// Set the ordinal position (builder pattern)
    pub fn with_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }

    /// Whether `table` is either side of this constraint
    pub fn touches(&self, table: &str) -> bool {
        self.detail_table == table || self.master_table == table
    }
}

// ============================================================================
// Relationship
// ============================================================================

/// Directional master/detail link: `detail_column` in `detail_table`
/// references the primary key of `master_table`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relationship {
    pub detail_table: String,
    pub detail_column: String,
    pub master_table: String,
}

impl Relationship {
    pub fn new(
        detail_table: impl Into<String>,
        detail_column: impl Into<String>,
        master_table: impl Into<String>,
    ) -> Self {
        Self {
            detail_table: detail_table.into(),
            detail_column: detail_column.into(),
            master_table: master_table.into(),
        }
    }

    /// Whether the relationship points back at its own table
    pub fn is_self_referencing(&self) -> bool {
        self.detail_table == self.master_table
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.detail_table, self.detail_column, self.master_table, PRIMARY_KEY
        )
    }
}

// ============================================================================
// TableRelationships
// ============================================================================

/// The relationships of one table, split by role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRelationships {
    pub table: String,

    /// Relationships where this table is the referenced ("one") side
    pub as_master: Vec<Relationship>,

    /// Relationships where this table is the referencing ("many") side
    pub as_detail: Vec<Relationship>,
}

impl TableRelationships {
    /// Only masters get composite master-detail operations
    pub fn is_master(&self) -> bool {
        !self.as_master.is_empty()
    }

    pub fn is_detail(&self) -> bool {
        !self.as_detail.is_empty()
    }
}

// ============================================================================
// RelationshipDetector
// ============================================================================

/// Turns raw constraint tuples into classified relationships
pub struct RelationshipDetector;

impl RelationshipDetector {
    /// Collapse raw tuples into distinct single-column relationships.
    ///
    /// Output is sorted so repeated runs over the same schema agree.
    pub fn normalize(constraints: &[ForeignKeyConstraint]) -> Vec<Relationship> {
        let mut groups: BTreeMap<(&str, &str), Vec<&ForeignKeyConstraint>> = BTreeMap::new();
        for fk in constraints {
            groups
                .entry((fk.detail_table.as_str(), fk.name.as_str()))
                .or_default()
                .push(fk);
        }

        let mut seen = HashSet::new();
        let mut relationships = Vec::new();

        for ((detail_table, name), parts) in groups {
            let fk = match Self::validate_constraint(name, &parts) {
                Ok(fk) => fk,
                Err(err) => {
                    tracing::warn!(table = detail_table, "Discarding foreign key: {}", err);
                    continue;
                }
            };

            let rel = Relationship::new(&fk.detail_table, &fk.detail_column, &fk.master_table);
            if seen.insert(rel.clone()) {
                relationships.push(rel);
            }
        }

        relationships.sort();
        relationships
    }

    /// Check that the tuples of one constraint form a single-column reference
    /// to the master's `id`
    pub fn validate_constraint<'c>(
        name: &str,
        parts: &[&'c ForeignKeyConstraint],
    ) -> EngineResult<&'c ForeignKeyConstraint> {
        let invalid = |message: String| EngineError::InvalidRelationship {
            constraint: name.to_string(),
            message,
        };
        let columns: HashSet<&str> = parts.iter().map(|p| p.detail_column.as_str()).collect();
        if columns.len() > 1 || parts.iter().any(|p| p.position > 1) {
            return Err(invalid(format!("composite key over {} columns", parts.len())));
        }
        let fk = parts
            .first()
            .copied()
            .ok_or_else(|| invalid("no columns".to_string()))?;
        match &fk.master_column {
            Some(referenced) if referenced != PRIMARY_KEY => Err(invalid(format!(
                "references '{}.{}' instead of the id column",
                fk.master_table, referenced
            ))),
            _ => Ok(fk),
        }
    }

    /// Partition the relationships that touch `table` into master and detail roles
    pub fn classify(table: &str, constraints: &[ForeignKeyConstraint]) -> TableRelationships {
        let touching: Vec<ForeignKeyConstraint> = constraints
            .iter()
            .filter(|fk| fk.touches(table))
            .cloned()
            .collect();

        let mut result = TableRelationships {
            table: table.to_string(),
            ..Default::default()
        };

        for rel in Self::normalize(&touching) {
            if rel.master_table == table {
                result.as_master.push(rel.clone());
            }
            if rel.detail_table == table {
                result.as_detail.push(rel);
            }
        }

        result
    }
}

// ============================================================================
// Tests
// ============================================================================
