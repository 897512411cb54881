//! Domain-level error type.

/// Errors raised by domain logic before any I/O happens.
///
/// The HTTP layer maps each variant onto a status code; nothing in here
/// knows about HTTP.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::Validation`] built from anything displayable.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
