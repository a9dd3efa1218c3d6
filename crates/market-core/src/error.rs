//! # Error Types
//!
//! Domain-level error types for market-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  market-core errors (this file)                                        │
//! │  └── ValidationError  - Input rejected before touching the store       │
//! │                                                                         │
//! │  market-db errors (separate crate)                                     │
//! │  ├── DbError          - Store operation failures                       │
//! │  └── BindError        - Named-parameter template failures              │
//! │                                                                         │
//! │  Flow: ValidationError → DbError::Validation → request layer           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Input validation errors.
///
/// Raised before any SQL is issued, so a validation failure never leaves a
/// partial write behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field or collection is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value is not in the allowed set.
    ///
    /// ## When This Occurs
    /// - Intake status other than `"in process"` / `"fineshed"`
    /// - Patch field that is not a mutable product column
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Value has the wrong shape (e.g. a JSON object where a scalar is expected).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Integer arithmetic on the field would overflow.
    #[error("{field} overflows a 64-bit integer")]
    Overflow { field: String },
}

impl ValidationError {
    /// Creates a NotAllowed error from a field name and the accepted values.
    pub fn not_allowed(field: impl Into<String>, allowed: &[&str]) -> Self {
        ValidationError::NotAllowed {
            field: field.into(),
            allowed: allowed.iter().map(|value| value.to_string()).collect(),
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================
