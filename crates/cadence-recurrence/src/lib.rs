//! Recurrence rules for calendar events.
//!
//! - `recurrence::core`: rule types and schedule equality
//! - `recurrence::expand`: occurrence expansion over a window, backed by the `rrule` crate
//! - `recurrence::validation`: field-scoped validation of rules and raw API input
//! - `recurrence::text`: human readable descriptions

pub mod error;
pub mod recurrence;

pub use error::{RecurrenceError, RecurrenceResult};
pub use recurrence::core::{DayOfWeek, Instance, Recurrence, RecurrenceType};
