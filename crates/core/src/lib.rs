//! # Fastback Core
//!
//! Core types, traits, and error handling for Fastback.
//!
//! This crate provides the foundational building blocks used throughout
//! the generator, including:
//!
//! - **Types**: Database dialect rules and declared-type classification
//! - **Traits**: Common behaviors like `Validatable`
//! - **Errors**: Unified error handling with `EngineError` and `EngineResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{EngineError, EngineResult};
pub use traits::Validatable;
pub use types::{DataType, DatabaseType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
