//! Occurrence expansion using the `rrule` crate.
//!
//! Rules are translated into an RFC 5545 rule anchored at the recurrence start
//! in the recurrence's own timezone, so occurrences keep their wall-clock time
//! across daylight-saving transitions.

use std::str::FromStr;

use cadence_core::config::RecurrenceConfig;
use chrono::{DateTime, Month, Offset, TimeDelta, TimeZone, Timelike, Utc, Weekday};
use rrule::{Frequency, NWeekday, RRule, RRuleSet, Unvalidated};

use super::core::{Instance, Recurrence, RecurrenceType};
use crate::error::{RecurrenceError, RecurrenceResult};

/// Options for recurrence expansion.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionOptions {
    /// Maximum number of occurrences returned by one expansion.
    pub max_occurrences: usize,
}

impl Default for ExpansionOptions {
    fn default() -> Self {
        Self {
            max_occurrences: 1000,
        }
    }
}

impl From<&RecurrenceConfig> for ExpansionOptions {
    fn from(config: &RecurrenceConfig) -> Self {
        Self {
            max_occurrences: config.max_occurrences,
        }
    }
}

/// End time used for series that never end.
#[must_use]
pub fn max_end_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(9000, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// ## Summary
/// Resolves an IANA timezone identifier.
///
/// ## Errors
/// Returns `RecurrenceError::UnknownTimezone` if the identifier is not known.
pub fn resolve_timezone(tzid: &str) -> RecurrenceResult<chrono_tz::Tz> {
    chrono_tz::Tz::from_str(tzid.trim())
        .map_err(|_e| RecurrenceError::UnknownTimezone(tzid.to_string()))
}

/// ## Summary
/// Returns the occurrence starts of `recurrence` inside `[window_start, window_end]`.
///
/// The occurrence budget is counted from the rule's own start, so occurrences
/// before the window still consume it.
///
/// ## Errors
/// Returns an error if the timezone is unknown or the rule cannot be built.
pub fn occurrences(
    recurrence: &Recurrence,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> RecurrenceResult<Vec<DateTime<Utc>>> {
    occurrences_with_options(
        recurrence,
        window_start,
        window_end,
        ExpansionOptions::default(),
    )
}

/// ## Summary
/// Same as [`occurrences`] with an explicit occurrence cap.
///
/// ## Errors
/// Returns an error if the timezone is unknown or the rule cannot be built.
#[tracing::instrument(skip(recurrence), fields(
    recurrence_type = %recurrence.recurrence_type,
    interval = recurrence.interval,
    timezone = %recurrence.timezone,
))]
pub fn occurrences_with_options(
    recurrence: &Recurrence,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    options: ExpansionOptions,
) -> RecurrenceResult<Vec<DateTime<Utc>>> {
    if window_end < window_start || recurrence.occurrences == Some(0) {
        return Ok(Vec::new());
    }

    let upper = recurrence
        .end_time
        .map_or(window_end, |end_time| end_time.min(window_end));

    let rrule_set = build_rrule_set(recurrence)?;

    let mut result = Vec::new();
    for occurrence in &rrule_set {
        let occurrence = occurrence.with_timezone(&Utc);
        if occurrence > upper {
            break;
        }
        if occurrence < window_start {
            continue;
        }
        result.push(occurrence);
        if result.len() >= options.max_occurrences {
            tracing::warn!(
                limit = options.max_occurrences,
                "Expansion reached the occurrence limit"
            );
            break;
        }
    }

    tracing::trace!(count = result.len(), "Expanded occurrences");
    Ok(result)
}

/// ## Summary
/// Returns the last instant the series can produce an occurrence at.
///
/// Uses the rule's end time when present, otherwise the last counted
/// occurrence, otherwise [`max_end_time`].
///
/// ## Errors
/// Returns an error if the rule has to be expanded and cannot be built.
pub fn calculated_end_time(recurrence: &Recurrence) -> RecurrenceResult<DateTime<Utc>> {
    if let Some(end_time) = recurrence.end_time {
        return Ok(end_time);
    }

    let Some(count) = recurrence.occurrences else {
        return Ok(max_end_time());
    };

    if count == 0 {
        return Ok(recurrence.start_time);
    }

    let rrule_set = build_rrule_set(recurrence)?;
    let last = (&rrule_set)
        .into_iter()
        .last()
        .map_or(recurrence.start_time, |occurrence| {
            occurrence.with_timezone(&Utc)
        });

    Ok(last)
}

/// ## Summary
/// Computes the end of an occurrence so that it spans the same wall-clock
/// duration as the master event in the recurrence's timezone.
///
/// When the start and the naive end fall on different UTC offsets, the end is
/// moved by the offset difference.
#[must_use]
pub fn occurrence_end(
    occurrence_start: DateTime<Utc>,
    duration: TimeDelta,
    tz: chrono_tz::Tz,
) -> DateTime<Utc> {
    let naive_end = occurrence_start + duration;
    let start_offset = tz
        .offset_from_utc_datetime(&occurrence_start.naive_utc())
        .fix()
        .local_minus_utc();
    let end_offset = tz
        .offset_from_utc_datetime(&naive_end.naive_utc())
        .fix()
        .local_minus_utc();

    if start_offset == end_offset {
        naive_end
    } else {
        let adjusted = naive_end + TimeDelta::seconds(i64::from(start_offset - end_offset));
        tracing::trace!(
            start_offset,
            end_offset,
            %adjusted,
            "Adjusted occurrence end across a DST transition"
        );
        adjusted
    }
}

/// ## Summary
/// Builds the validated `rrule` set for a recurrence.
///
/// ## Errors
/// Returns an error if the timezone is unknown, the interval does not fit the
/// `rrule` interval type, or `rrule` rejects the generated rule.
pub fn build_rrule_set(recurrence: &Recurrence) -> RecurrenceResult<RRuleSet> {
    let tz = resolve_timezone(&recurrence.timezone)?;
    let start = recurrence
        .start_time
        .with_nanosecond(0)
        .unwrap_or(recurrence.start_time);
    let dt_start = start.with_timezone(&rrule::Tz::Tz(tz));

    let mut rrule = rule_for(recurrence)?;
    if let Some(count) = recurrence.occurrences {
        rrule = rrule.count(count);
    }

    Ok(rrule.build(dt_start)?)
}

fn rule_for(recurrence: &Recurrence) -> RecurrenceResult<RRule<Unvalidated>> {
    let interval = rrule_interval(recurrence)?;
    let weekdays = || -> Vec<NWeekday> {
        recurrence
            .weekdays()
            .into_iter()
            .map(|day| NWeekday::Every(day.to_weekday()))
            .collect()
    };

    let rule = match recurrence.recurrence_type {
        RecurrenceType::Daily => RRule::new(Frequency::Daily).interval(interval),
        RecurrenceType::Weekly => RRule::new(Frequency::Weekly)
            .interval(interval)
            .week_start(Weekday::Sun)
            .by_weekday(weekdays()),
        RecurrenceType::Monthly => with_month_day(
            RRule::new(Frequency::Monthly).interval(interval),
            recurrence.day_of_month.unwrap_or(1),
        ),
        RecurrenceType::MonthNth => RRule::new(Frequency::Monthly)
            .interval(interval)
            .by_weekday(weekdays())
            .by_set_pos(vec![recurrence.instance.map_or(1, Instance::set_pos)]),
        RecurrenceType::Yearly => with_month_day(
            RRule::new(Frequency::Yearly)
                .interval(interval)
                .by_month(&[month_of(recurrence)]),
            recurrence.day_of_month.unwrap_or(1),
        ),
        RecurrenceType::YearNth => RRule::new(Frequency::Yearly)
            .interval(interval)
            .by_month(&[month_of(recurrence)])
            .by_weekday(weekdays())
            .by_set_pos(vec![recurrence.instance.map_or(1, Instance::set_pos)]),
    };

    Ok(rule)
}

/// Restricts a rule to a day of month, falling back to the last day of
/// shorter months.
fn with_month_day(rule: RRule<Unvalidated>, day: u32) -> RRule<Unvalidated> {
    let day = i8::try_from(day.clamp(1, 31)).unwrap_or(1);
    if day <= 28 {
        rule.by_month_day(vec![day])
    } else {
        rule.by_month_day((28..=day).collect()).by_set_pos(vec![-1])
    }
}

fn month_of(recurrence: &Recurrence) -> Month {
    recurrence
        .month_of_year
        .and_then(|month| u8::try_from(month).ok())
        .and_then(|month| Month::try_from(month).ok())
        .unwrap_or(Month::January)
}

/// Yearly intervals are stored in months.
fn rrule_interval(recurrence: &Recurrence) -> RecurrenceResult<u16> {
    let interval = if recurrence.recurrence_type.is_yearly() {
        (recurrence.interval / 12).max(1)
    } else {
        recurrence.interval.max(1)
    };
    u16::try_from(interval).map_err(|_e| RecurrenceError::IntervalOverflow(recurrence.interval))
}
