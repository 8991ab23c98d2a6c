//! Error types for mail system operations.

use thiserror::Error;

use crate::core::office::OfficeId;

/// Errors produced by core mail system operations.
///
/// Validation and not-found failures are atomic: the operation that returns
/// them has made no state change. [`MailError::OfficeFull`] is an expected,
/// recoverable outcome rather than an exceptional one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MailError {
    /// Office id is negative or otherwise unusable.
    #[error("invalid office id: {0}")]
    InvalidId(OfficeId),
    /// Office capacity must be at least one letter.
    #[error("invalid capacity: {0}")]
    InvalidCapacity(i64),
    /// An office with this id already exists.
    #[error("duplicate office: {0}")]
    DuplicateOffice(OfficeId),
    /// No office with this id exists.
    #[error("office not found: {0}")]
    OfficeNotFound(OfficeId),
    /// No letter with this id exists.
    #[error("letter not found: {0}")]
    LetterNotFound(u64),
    /// A caller-supplied parameter failed validation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    /// The target office is at capacity.
    #[error("office {0} is full")]
    OfficeFull(OfficeId),
    /// Allocation or growth failed; state is unchanged.
    #[error("resource exhausted")]
    ResourceExhausted,
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
