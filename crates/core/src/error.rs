//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Deterministic request-shape and business failures only. Storage failures are
/// modelled by the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field was absent from the request.
    #[error("Missing `{0}` in request body")]
    MissingField(&'static str),

    /// The id in the request path and the id in the body disagree (or one is absent).
    #[error("Request path id ({path}) and request body id ({body}) must match")]
    IdMismatch { path: String, body: String },

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A uniqueness rule was violated.
    #[error("{0}")]
    Conflict(String),
}

impl DomainError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField(field)
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Username uniqueness violation, with the message clients see.
    pub fn username_taken() -> Self {
        Self::Conflict("Username already taken".to_string())
    }

    /// Whether the error is caused by the caller's input (maps to 400).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::InvalidId(_))
    }
}

/// Unwrap a required request field, or fail with [`DomainError::MissingField`].
pub fn require<T>(field: &'static str, value: Option<T>) -> DomainResult<T> {
    value.ok_or(DomainError::MissingField(field))
}
