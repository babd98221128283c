//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent business logic violations.
/// Expected refusals (undo without history, deleting the last service)
/// are not errors; see [`crate::domain::Refusal`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid modulus {modulus}: recurrence needs a modulus > 0")]
    InvalidModulus { modulus: i64 },

    #[error("index overflow: service is already at index {0}")]
    IndexOverflow(u64),

    #[error("invalid form link: {0}")]
    InvalidFormLink(String),

    #[error("google form not configured")]
    FormNotConfigured,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("unknown form field: {0}")]
    UnknownFormField(String),
}
