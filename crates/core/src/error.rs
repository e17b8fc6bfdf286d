//! Domain error model.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// A billing rule refused an input or a state change.
///
/// Deterministic failures only. Missing records and storage conflicts are
/// reported by the repositories in `billdesk-infra`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Rejected input, e.g. a negative quantity or an empty name.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Rejected state change, e.g. moving a paid invoice back to pending.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier string did not parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
