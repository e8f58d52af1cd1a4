//! Recurrence rule model, expansion and validation.

pub mod core;
pub mod expand;
pub mod text;
pub mod validation;

pub use self::core::{DayOfWeek, Instance, Recurrence, RecurrenceType, is_equal};
pub use expand::{
    ExpansionOptions, calculated_end_time, max_end_time, occurrence_end, occurrences,
    occurrences_with_options, resolve_timezone,
};
pub use text::text_value;
pub use validation::{
    RecurrenceField, RecurrenceInput, ValidationError, ValidationErrorKind, ValidationErrors,
    parse_recurrence_input, policy, required_fields, validate,
};
