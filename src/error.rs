//! Error types for rotation planning.

use crate::validation::ValidationError;

/// Top-level error type for the rotation crate.
#[derive(Debug, thiserror::Error)]
pub enum RotaError {
    /// Configuration could not be read, parsed, or applied.
    #[error("config error: {0}")]
    Config(String),

    /// Persisted rotation state could not be read, written, or locked.
    #[error("state error: {0}")]
    State(String),

    /// A room name that is not part of the household.
    #[error("unknown room: {0}")]
    UnknownRoom(String),

    /// Input failed validation.
    #[error("invalid input: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Vec<ValidationError>> for RotaError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Validation(errors)
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, RotaError>;
