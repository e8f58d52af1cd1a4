//! ## Summary
//! Field-scoped validation of recurrence rules.
//!
//! Every problem found is reported, each attached to the field it concerns,
//! so callers can route errors to individual form inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::core::{DayOfWeek, Instance, Recurrence, RecurrenceType};
use super::expand::resolve_timezone;

/// Recurrence field an error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RecurrenceField {
    RecurrenceType,
    Interval,
    Instance,
    DayOfWeek,
    DayOfMonth,
    MonthOfYear,
    StartTime,
    EndTime,
    TimeZone,
}

impl RecurrenceField {
    /// Property path as exposed by the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RecurrenceType => "recurrenceType",
            Self::Interval => "interval",
            Self::Instance => "instance",
            Self::DayOfWeek => "dayOfWeek",
            Self::DayOfMonth => "dayOfMonth",
            Self::MonthOfYear => "monthOfYear",
            Self::StartTime => "startTime",
            Self::EndTime => "endTime",
            Self::TimeZone => "timeZone",
        }
    }
}

impl std::fmt::Display for RecurrenceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What is wrong with a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationErrorKind {
    MissingRequiredField,
    InvalidChoice { value: String },
    IntervalOutOfRange { min: u32, max: u32 },
    IntervalNotMultipleOf { multiple_of: u32 },
    EndTimeBeforeStartTime,
}

/// One field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: RecurrenceField,
    #[serde(flatten)]
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: RecurrenceField, kind: ValidationErrorKind) -> Self {
        Self { field, kind }
    }

    fn missing(field: RecurrenceField) -> Self {
        Self::new(field, ValidationErrorKind::MissingRequiredField)
    }

    fn invalid_choice(field: RecurrenceField, value: impl std::fmt::Display) -> Self {
        Self::new(
            field,
            ValidationErrorKind::InvalidChoice {
                value: value.to_string(),
            },
        )
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ValidationErrorKind::MissingRequiredField => {
                write!(f, "{}: this value should not be blank", self.field)
            }
            ValidationErrorKind::InvalidChoice { value } => {
                write!(f, "{}: '{value}' is not a valid choice", self.field)
            }
            ValidationErrorKind::IntervalOutOfRange { min, max } => {
                write!(f, "{}: value should be between {min} and {max}", self.field)
            }
            ValidationErrorKind::IntervalNotMultipleOf { multiple_of } => {
                write!(f, "{}: value should be a multiple of {multiple_of}", self.field)
            }
            ValidationErrorKind::EndTimeBeforeStartTime => {
                write!(f, "{}: end time should not be before start time", self.field)
            }
        }
    }
}

/// All problems found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Errors attached to a single field.
    pub fn for_field(&self, field: RecurrenceField) -> impl Iterator<Item = &ValidationError> {
        self.0.iter().filter(move |error| error.field == field)
    }

    #[must_use]
    pub fn has(&self, field: RecurrenceField, kind: &ValidationErrorKind) -> bool {
        self.for_field(field).any(|error| &error.kind == kind)
    }

    fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Per-type validation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypePolicy {
    /// Fields that must be set in addition to the common ones.
    pub required: &'static [RecurrenceField],
    pub min_interval: u32,
    pub max_interval: u32,
    /// `1` means no constraint.
    pub multiple_of: u32,
}

/// Fields every recurrence needs.
pub const COMMON_REQUIRED: &[RecurrenceField] = &[
    RecurrenceField::RecurrenceType,
    RecurrenceField::Interval,
    RecurrenceField::StartTime,
    RecurrenceField::TimeZone,
];

/// ## Summary
/// Returns the validation policy for a recurrence type.
#[must_use]
pub const fn policy(recurrence_type: RecurrenceType) -> TypePolicy {
    match recurrence_type {
        RecurrenceType::Daily => TypePolicy {
            required: &[],
            min_interval: 1,
            max_interval: 99,
            multiple_of: 1,
        },
        RecurrenceType::Weekly => TypePolicy {
            required: &[RecurrenceField::DayOfWeek],
            min_interval: 1,
            max_interval: 99,
            multiple_of: 1,
        },
        RecurrenceType::Monthly => TypePolicy {
            required: &[RecurrenceField::DayOfMonth],
            min_interval: 1,
            max_interval: 99,
            multiple_of: 1,
        },
        RecurrenceType::MonthNth => TypePolicy {
            required: &[RecurrenceField::Instance, RecurrenceField::DayOfWeek],
            min_interval: 1,
            max_interval: 99,
            multiple_of: 1,
        },
        RecurrenceType::Yearly => TypePolicy {
            required: &[RecurrenceField::MonthOfYear, RecurrenceField::DayOfMonth],
            min_interval: 1,
            max_interval: 999,
            multiple_of: 12,
        },
        RecurrenceType::YearNth => TypePolicy {
            required: &[
                RecurrenceField::Instance,
                RecurrenceField::DayOfWeek,
                RecurrenceField::MonthOfYear,
            ],
            min_interval: 1,
            max_interval: 999,
            multiple_of: 12,
        },
    }
}

/// ## Summary
/// Lists every field a recurrence of the given type must have set.
#[must_use]
pub fn required_fields(recurrence_type: RecurrenceType) -> Vec<RecurrenceField> {
    COMMON_REQUIRED
        .iter()
        .chain(policy(recurrence_type).required)
        .copied()
        .collect()
}

/// ## Summary
/// Validates a recurrence rule, collecting every error found.
///
/// ## Errors
/// Returns every field-scoped problem with the rule.
pub fn validate(recurrence: &Recurrence) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_recurrence(recurrence, &mut errors);
    if !errors.is_empty() {
        tracing::debug!(errors = %errors, "Recurrence failed validation");
    }
    errors.into_result()
}

fn check_recurrence(recurrence: &Recurrence, errors: &mut ValidationErrors) {
    let policy = policy(recurrence.recurrence_type);

    for field in policy.required {
        if is_blank(recurrence, *field) {
            errors.push(ValidationError::missing(*field));
        }
    }

    match recurrence.timezone.trim() {
        "" => errors.push(ValidationError::missing(RecurrenceField::TimeZone)),
        tz if resolve_timezone(tz).is_err() => errors.push(ValidationError::invalid_choice(
            RecurrenceField::TimeZone,
            &recurrence.timezone,
        )),
        _ => {}
    }

    if recurrence.interval < policy.min_interval || recurrence.interval > policy.max_interval {
        errors.push(ValidationError::new(
            RecurrenceField::Interval,
            ValidationErrorKind::IntervalOutOfRange {
                min: policy.min_interval,
                max: policy.max_interval,
            },
        ));
    }
    if policy.multiple_of > 1 && recurrence.interval % policy.multiple_of != 0 {
        errors.push(ValidationError::new(
            RecurrenceField::Interval,
            ValidationErrorKind::IntervalNotMultipleOf {
                multiple_of: policy.multiple_of,
            },
        ));
    }

    if let Some(day) = recurrence.day_of_month
        && !(1..=31).contains(&day)
    {
        errors.push(ValidationError::invalid_choice(RecurrenceField::DayOfMonth, day));
    }
    if let Some(month) = recurrence.month_of_year
        && !(1..=12).contains(&month)
    {
        errors.push(ValidationError::invalid_choice(RecurrenceField::MonthOfYear, month));
    }

    if let Some(end_time) = recurrence.end_time
        && end_time < recurrence.start_time
    {
        errors.push(ValidationError::new(
            RecurrenceField::EndTime,
            ValidationErrorKind::EndTimeBeforeStartTime,
        ));
    }
}

fn is_blank(recurrence: &Recurrence, field: RecurrenceField) -> bool {
    match field {
        RecurrenceField::Instance => recurrence.instance.is_none(),
        RecurrenceField::DayOfWeek => recurrence.day_of_week.is_empty(),
        RecurrenceField::DayOfMonth => recurrence.day_of_month.is_none(),
        RecurrenceField::MonthOfYear => recurrence.month_of_year.is_none(),
        RecurrenceField::TimeZone => recurrence.timezone.trim().is_empty(),
        RecurrenceField::RecurrenceType
        | RecurrenceField::Interval
        | RecurrenceField::StartTime
        | RecurrenceField::EndTime => false,
    }
}

/// Recurrence as submitted by an API client, with enumerated values as codes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceInput {
    pub recurrence_type: Option<String>,
    pub interval: Option<i64>,
    pub instance: Option<i64>,
    #[serde(default)]
    pub day_of_week: Vec<String>,
    pub day_of_month: Option<u32>,
    pub month_of_year: Option<u32>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub occurrences: Option<u32>,
    #[serde(rename = "timeZone")]
    pub timezone: Option<String>,
}

/// ## Summary
/// Converts API input into a validated [`Recurrence`].
///
/// Unknown codes are reported as `InvalidChoice` alongside every rule error,
/// so one pass reports all problems.
///
/// ## Errors
/// Returns every field-scoped problem with the input.
pub fn parse_recurrence_input(input: &RecurrenceInput) -> Result<Recurrence, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let recurrence_type = match input.recurrence_type.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(ValidationError::missing(RecurrenceField::RecurrenceType));
            None
        }
        Some(code) => {
            let parsed = RecurrenceType::from_code(code);
            if parsed.is_none() {
                errors.push(ValidationError::invalid_choice(
                    RecurrenceField::RecurrenceType,
                    code,
                ));
            }
            parsed
        }
    };

    let interval = match input.interval {
        None => {
            errors.push(ValidationError::missing(RecurrenceField::Interval));
            None
        }
        Some(value) => {
            let parsed = u32::try_from(value).ok();
            if parsed.is_none() {
                let (min, max) = recurrence_type.map_or((1, 999), |kind| {
                    let policy = policy(kind);
                    (policy.min_interval, policy.max_interval)
                });
                errors.push(ValidationError::new(
                    RecurrenceField::Interval,
                    ValidationErrorKind::IntervalOutOfRange { min, max },
                ));
            }
            parsed
        }
    };

    let instance = input.instance.and_then(|code| {
        let parsed = Instance::from_code(code);
        if parsed.is_none() {
            errors.push(ValidationError::invalid_choice(RecurrenceField::Instance, code));
        }
        parsed
    });

    let mut day_of_week = Vec::new();
    for code in &input.day_of_week {
        match DayOfWeek::from_code(code) {
            Some(day) => day_of_week.push(day),
            None => errors.push(ValidationError::invalid_choice(RecurrenceField::DayOfWeek, code)),
        }
    }

    if input.start_time.is_none() {
        errors.push(ValidationError::missing(RecurrenceField::StartTime));
    }

    let timezone = input.timezone.clone().unwrap_or_default();

    let (Some(recurrence_type), Some(interval), Some(start_time)) =
        (recurrence_type, interval, input.start_time)
    else {
        if timezone.trim().is_empty() {
            errors.push(ValidationError::missing(RecurrenceField::TimeZone));
        }
        return Err(errors);
    };

    let recurrence = Recurrence {
        id: None,
        recurrence_type,
        interval,
        instance,
        day_of_week,
        day_of_month: input.day_of_month,
        month_of_year: input.month_of_year,
        start_time,
        end_time: input.end_time,
        occurrences: input.occurrences,
        timezone,
    };

    check_recurrence(&recurrence, &mut errors);
    errors.into_result().map(|()| recurrence)
}
