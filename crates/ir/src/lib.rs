//! # Fastback IR (Intermediate Representation)
//!
//! This crate provides the per-run representation of an introspected
//! schema: tables, columns, foreign keys, and the master/detail
//! relationships derived from them, plus the naming convention every
//! emitter shares.
//!
//! ## Core Concepts
//!
//! - **TableMetadata**: A table and its columns in physical order
//! - **ForeignKeyConstraint**: A raw constraint tuple from the schema
//! - **Relationship**: A detail column referencing a master table's `id`
//! - **SchemaSnapshot**: Everything one introspection pass produced
//!

// Module declarations
pub mod naming;
pub mod relationship;
pub mod snapshot;
pub mod table;

// Re-export commonly used types at crate root
pub use relationship::{
    ForeignKeyConstraint, Relationship, RelationshipDetector, TableRelationships,
};
pub use snapshot::{SchemaSnapshot, SkippedTable};
pub use table::{ColumnMetadata, PRIMARY_KEY, TableMetadata};

// Re-export core types that are commonly used with IR
pub use fastback_core::{DataType, DatabaseType, EngineError, EngineResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::naming::{to_camel, to_pascal, to_route_segment};
    pub use crate::{
        ColumnMetadata, DataType, DatabaseType, EngineError, EngineResult,
        ForeignKeyConstraint, Relationship, RelationshipDetector, SchemaSnapshot,
        TableMetadata, TableRelationships,
    };
}
