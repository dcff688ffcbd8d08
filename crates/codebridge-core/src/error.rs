//! Unified error type exposed by **`codebridge-core`**.
//!
//! Building a schema is a one-time, development-time step, so every problem
//! with a descriptor surfaces as a [`SchemaError`] instead of a silently
//! degraded schema.  Data that fails validation is *not* an error in this
//! sense; it is reported through
//! [`ValidationOutcome::Invalid`](crate::validate::ValidationOutcome).

use thiserror::Error;

/// Convenient alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[derive(Debug, Error)]
pub enum SchemaError {
    /// The descriptor is not one of the shapes the builder understands
    /// (tuples, sets, maps, bare `null`, nullable unions, …).
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// A constraint annotation cannot be applied to the node it is attached
    /// to, or its value is unusable (non-finite bound, broken regex).
    #[error("invalid `{constraint}` constraint: {reason}")]
    InvalidConstraint {
        constraint: &'static str,
        reason: String,
    },

    /// A schema handed to the validator does not have the shape the builder
    /// emits.
    #[error("malformed schema at `{path}`: {reason}")]
    MalformedSchema { path: String, reason: String },

    /// Failure while converting schemas to or from JSON values.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SchemaError {
    pub(crate) fn unsupported(what: impl Into<String>) -> Self {
        SchemaError::UnsupportedType(what.into())
    }

    pub(crate) fn constraint(constraint: &'static str, reason: impl Into<String>) -> Self {
        SchemaError::InvalidConstraint {
            constraint,
            reason: reason.into(),
        }
    }
}
