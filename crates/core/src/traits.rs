//! Core traits for Fastback
//!
//! This module defines the traits that components throughout the generator
//! implement to provide consistent behavior.

use crate::error::EngineResult;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return an error if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use fastback_core::{EngineError, EngineResult, Validatable};
///
/// struct Output {
///     dir: String,
/// }
///
/// impl Validatable for Output {
///     fn validate(&self) -> EngineResult<()> {
///         if self.dir.is_empty() {
///             return Err(EngineError::InvalidConfig("output dir is empty".into()));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or an `EngineError` describing the problem.
    fn validate(&self) -> EngineResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
