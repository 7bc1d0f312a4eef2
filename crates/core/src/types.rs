//! Core types used throughout Fastback
//!
//! This module contains the dialect rules for each supported database and
//! the classification of declared column types into Rust types, used by the
//! introspection and code generation layers.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// Data Types
// ============================================================================

/// Rust-side classification of a declared SQL column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DataType {
    /// Boolean true/false
    Bool,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit unsigned integer
    UInt64,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point (double precision)
    Float64,
    /// Fixed-point decimal
    Decimal,
    /// Any character type
    #[default]
    String,
    /// UUID (universally unique identifier)
    Uuid,
    /// Date without time
    Date,
    /// Time without date
    Time,
    /// Date and time without timezone
    DateTime,
    /// Date and time with timezone
    DateTimeUtc,
    /// Binary data (BYTEA/BLOB)
    Bytes,
    /// JSON/JSONB data
    Json,
}

impl DataType {
    /// Classify a declared column type as reported by the schema.
    ///
    /// MySQL integers flagged `unsigned` (or `zerofill`) map to the unsigned
    /// Rust type of the same width; sqlx decodes them into nothing else.
    /// Unknown declarations fall back to `String`.
    pub fn from_declared(declared: &str, db: DatabaseType) -> Self {
        let lowered = declared.trim().to_ascii_lowercase();
        let unsigned = db == DatabaseType::MySQL
            && (lowered.contains("unsigned") || lowered.contains("zerofill"));
        let lowered = lowered.replace(" unsigned", "").replace(" zerofill", "");
        let base = lowered.split('(').next().unwrap_or("").trim();

        if db == DatabaseType::MySQL && lowered.starts_with("tinyint(1)") {
            return DataType::Bool;
        }

        let data_type = match base {
            "bool" | "boolean" => DataType::Bool,
            "bit" if db == DatabaseType::MySQL => DataType::Bool,
            "tinyint" => DataType::Int8,
            "smallint" | "int2" | "smallserial" => DataType::Int16,
            "int" | "integer" if db == DatabaseType::SQLite => DataType::Int64,
            "mediumint" | "int" | "integer" | "int4" | "serial" => DataType::Int32,
            "bigint" | "int8" | "bigserial" => DataType::Int64,
            "real" if db == DatabaseType::SQLite => DataType::Float64,
            "float" | "real" | "float4" => DataType::Float32,
            "double" | "double precision" | "float8" => DataType::Float64,
            "decimal" | "numeric" if db == DatabaseType::SQLite => DataType::Float64,
            "decimal" | "numeric" => DataType::Decimal,
            "uuid" if db == DatabaseType::PostgreSQL => DataType::Uuid,
            "date" => DataType::Date,
            "time" | "time without time zone" => DataType::Time,
            "timestamp" if db == DatabaseType::MySQL => DataType::DateTimeUtc,
            "datetime" | "timestamp" | "timestamp without time zone" => DataType::DateTime,
            "timestamptz" | "timestamp with time zone" => DataType::DateTimeUtc,
            "blob" | "tinyblob" | "mediumblob" | "longblob" | "binary" | "varbinary"
            | "bytea" => DataType::Bytes,
            "json" | "jsonb" => DataType::Json,
            _ => DataType::String,
        };

        if unsigned { data_type.to_unsigned() } else { data_type }
    }

    /// Unsigned integer of the same width; other types are unchanged
    pub fn to_unsigned(self) -> Self {
        match self {
            DataType::Int8 => DataType::UInt8,
            DataType::Int16 => DataType::UInt16,
            DataType::Int32 => DataType::UInt32,
            DataType::Int64 => DataType::UInt64,
            other => other,
        }
    }

    /// Whether the column must be selected as `::text` to decode as `String`.
    ///
    /// PostgreSQL refuses to decode non-character types (money, timetz,
    /// arrays, enums, ...) into `String`. Writes need no cast: text converts
    /// to these types on assignment.
    pub fn reads_as_text(declared: &str, db: DatabaseType) -> bool {
        if db != DatabaseType::PostgreSQL
            || DataType::from_declared(declared, db) != DataType::String
        {
            return false;
        }
        let lowered = declared.trim().to_ascii_lowercase();
        let base = lowered.split('(').next().unwrap_or("").trim();
        !matches!(
            base,
            "text" | "character varying" | "varchar" | "character" | "char" | "bpchar" | "name"
        )
    }

    /// Convert to Rust type string, as written in generated code
    pub fn to_rust_type(&self) -> &'static str {
        match self {
            DataType::Bool => "bool",
            DataType::Int8 => "i8",
            DataType::Int16 => "i16",
            DataType::Int32 => "i32",
            DataType::Int64 => "i64",
            DataType::UInt8 => "u8",
            DataType::UInt16 => "u16",
            DataType::UInt32 => "u32",
            DataType::UInt64 => "u64",
            DataType::Float32 => "f32",
            DataType::Float64 => "f64",
            DataType::Decimal => "rust_decimal::Decimal",
            DataType::String => "String",
            DataType::Uuid => "uuid::Uuid",
            DataType::Date => "chrono::NaiveDate",
            DataType::Time => "chrono::NaiveTime",
            DataType::DateTime => "chrono::NaiveDateTime",
            DataType::DateTimeUtc => "chrono::DateTime<chrono::Utc>",
            DataType::Bytes => "Vec<u8>",
            DataType::Json => "serde_json::Value",
        }
    }

    /// Check if this type is an integer
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    /// External crate the generated project needs for this type, if any
    pub fn required_crate(&self) -> Option<&'static str> {
        match self {
            DataType::Decimal => Some("rust_decimal"),
            DataType::Uuid => Some("uuid"),
            DataType::Date | DataType::Time | DataType::DateTime | DataType::DateTimeUtc => {
                Some("chrono")
            }
            _ => None,
        }
    }

    /// Get a user-friendly display name
    pub fn display_name(&self) -> &'static str {
        match self {
            DataType::Bool => "Boolean",
            DataType::Int8 => "Tiny Integer",
            DataType::Int16 => "Small Integer",
            DataType::Int32 => "Integer",
            DataType::Int64 => "Big Integer",
            DataType::UInt8 => "Unsigned Tiny Integer",
            DataType::UInt16 => "Unsigned Small Integer",
            DataType::UInt32 => "Unsigned Integer",
            DataType::UInt64 => "Unsigned Big Integer",
            DataType::Float32 => "Float",
            DataType::Float64 => "Double",
            DataType::Decimal => "Decimal",
            DataType::String => "String",
            DataType::Uuid => "UUID",
            DataType::Date => "Date",
            DataType::Time => "Time",
            DataType::DateTime => "DateTime",
            DataType::DateTimeUtc => "DateTime (UTC)",
            DataType::Bytes => "Binary",
            DataType::Json => "JSON",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Database Types
// ============================================================================

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    PostgreSQL,
    MySQL,
    SQLite,
}

impl DatabaseType {
    /// Detect the database from a connection URL scheme
    pub fn from_url(url: &str) -> EngineResult<Self> {
        let scheme = url.split(':').next().unwrap_or("").to_ascii_lowercase();
        match scheme.as_str() {
            "postgres" | "postgresql" => Ok(DatabaseType::PostgreSQL),
            "mysql" | "mariadb" => Ok(DatabaseType::MySQL),
            "sqlite" => Ok(DatabaseType::SQLite),
            _ => Err(EngineError::UnsupportedDatabase(scheme)),
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            DatabaseType::PostgreSQL => "PostgreSQL",
            DatabaseType::MySQL => "MySQL",
            DatabaseType::SQLite => "SQLite",
        }
    }

    /// Quote an identifier for this dialect
    pub fn quote_ident(&self, ident: &str) -> String {
        match self {
            DatabaseType::MySQL => format!("`{}`", ident.replace('`', "``")),
            DatabaseType::PostgreSQL | DatabaseType::SQLite => {
                format!("\"{}\"", ident.replace('"', "\"\""))
            }
        }
    }

    /// Bind placeholder for the 1-based parameter `index`
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            DatabaseType::PostgreSQL => format!("${}", index),
            DatabaseType::MySQL | DatabaseType::SQLite => "?".to_string(),
        }
    }

    /// Whether inserted keys are read back with `RETURNING`
    pub fn uses_returning(&self) -> bool {
        matches!(self, DatabaseType::PostgreSQL)
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Tests
// ============================================================================
