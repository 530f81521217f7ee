//! Domain error types
//!
//! - **GroupError**: question group persistence and validation
//! - **CoreError**: cross-cutting failures (permissions, configuration)
//! - **FieldErrors**: attribute-level validation messages carried by `GroupError::Validation`

pub mod core_error;
pub mod field_errors;
pub mod group;

pub use core_error::{CoreError, CoreErrorKind};
pub use field_errors::FieldErrors;
pub use group::GroupError;

/// Result type alias for question group operations
pub type GroupResult<T> = Result<T, GroupError>;

/// Result type alias for cross-cutting operations
pub type CoreResult<T> = Result<T, CoreError>;
