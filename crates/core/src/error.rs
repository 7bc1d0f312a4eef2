//! Error types for Fastback
//!
//! This module provides unified error handling across the generator,
//! including connectivity errors, per-table introspection errors, code
//! generation errors, IO errors, and configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Fastback
#[derive(Debug, Error)]
pub enum EngineError {
    // ========================================================================
    // Schema Errors
    // ========================================================================
    /// The schema cannot be reached at all; fatal to the run
    #[error("Cannot reach schema: {0}")]
    Connectivity(String),

    /// Metadata query failed for a single table; the table is skipped
    #[error("Introspection failed for table '{table}': {message}")]
    TableIntrospection { table: String, message: String },

    /// Connection URL names a backend we cannot introspect
    #[error("Unsupported database: {0}")]
    UnsupportedDatabase(String),

    /// Foreign key constraint violates the single-column invariant
    #[error("Invalid relationship '{constraint}': {message}")]
    InvalidRelationship { constraint: String, message: String },

    // ========================================================================
    // Code Generation Errors
    // ========================================================================
    /// Code generation failed
    #[error("Code generation failed: {0}")]
    CodeGeneration(String),

    /// Emitted tokens could not be rendered as a Rust source file
    #[error("Rendering failed for '{artifact}': {message}")]
    Render { artifact: String, message: String },

    /// Invalid output path
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(PathBuf),

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// File removal error
    #[error("Failed to remove file '{path}': {message}")]
    FileRemove { path: PathBuf, message: String },

    /// Directory creation failed
    #[error("Failed to create directory '{path}': {message}")]
    DirectoryCreate { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl EngineError {
    /// Create a connectivity error
    pub fn connectivity(msg: impl Into<String>) -> Self {
        EngineError::Connectivity(msg.into())
    }

    /// Create a table-scoped introspection error
    pub fn table_introspection(table: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::TableIntrospection {
            table: table.into(),
            message: msg.into(),
        }
    }

    /// Create a code generation error
    pub fn codegen(msg: impl Into<String>) -> Self {
        EngineError::CodeGeneration(msg.into())
    }

    /// Create a rendering error for a named artifact
    pub fn render(artifact: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::Render {
            artifact: artifact.into(),
            message: msg.into(),
        }
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error aborts the whole run
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            EngineError::Connectivity(_) | EngineError::UnsupportedDatabase(_)
        )
    }

    /// Check if this error is scoped to a single table
    pub fn is_table_scoped(&self) -> bool {
        matches!(self, EngineError::TableIntrospection { .. })
    }
}

/// Result type alias using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

// ============================================================================
// Tests
// ============================================================================
