use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    CoreError(#[from] cadence_core::error::CoreError),

    #[error(transparent)]
    RecurrenceError(#[from] cadence_recurrence::RecurrenceError),

    #[error("Directory error: {0}")]
    DirectoryError(String),

    #[error("Notification transport error: {0}")]
    TransportError(String),
}

impl ServiceError {
    /// The core error behind this one, if any.
    #[must_use]
    pub fn as_core(&self) -> Option<&cadence_core::error::CoreError> {
        match self {
            Self::CoreError(error) => Some(error),
            _ => None,
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
