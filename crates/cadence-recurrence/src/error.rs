use thiserror::Error;

use crate::recurrence::validation::ValidationErrors;

/// Recurrence expansion and validation errors
#[derive(Error, Debug)]
pub enum RecurrenceError {
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Interval {0} is too large to expand")]
    IntervalOverflow(u32),

    #[error("RRule error: {0}")]
    RRule(#[from] rrule::RRuleError),

    #[error("Invalid recurrence: {0}")]
    Validation(#[from] ValidationErrors),
}

pub type RecurrenceResult<T> = std::result::Result<T, RecurrenceError>;
