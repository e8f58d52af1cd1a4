use thiserror::Error;

/// Core-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An invariant a decision relies on does not hold for the given data.
    #[error("Inconsistent state: {0}")]
    InconsistentState(String),

    /// The operation is not allowed for this kind of event.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

impl CoreError {
    /// Returns true for errors caused by the caller invoking an operation on
    /// the wrong kind of event.
    #[must_use]
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation(_))
    }

    /// Returns true for errors caused by an unexpected combination of state.
    #[must_use]
    pub fn is_inconsistent_state(&self) -> bool {
        matches!(self, Self::InconsistentState(_))
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
