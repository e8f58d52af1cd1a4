//! Human readable recurrence descriptions.
//!
//! Output is English; translating it is left to the presentation layer.

use chrono::{DateTime, Month, Utc};

use super::core::{DayOfWeek, Instance, Recurrence, RecurrenceType};

/// ## Summary
/// Describes a recurrence, e.g. `"Weekly every 2 weeks on Sunday, Monday, end after 4 occurrences"`.
#[must_use]
pub fn text_value(recurrence: &Recurrence) -> String {
    let interval = recurrence.interval;
    let mut text = match recurrence.recurrence_type {
        RecurrenceType::Daily => format!("Daily every {interval} {}", plural(interval, "day")),
        RecurrenceType::Weekly => format!(
            "Weekly every {interval} {} on {}",
            plural(interval, "week"),
            day_list(recurrence)
        ),
        RecurrenceType::Monthly => format!(
            "Monthly day {} of every {interval} {}",
            recurrence.day_of_month.unwrap_or(1),
            plural(interval, "month")
        ),
        RecurrenceType::MonthNth => format!(
            "Monthly the {} {} of every {interval} {}",
            instance_label(recurrence),
            day_list(recurrence),
            plural(interval, "month")
        ),
        RecurrenceType::Yearly => {
            let years = (interval / 12).max(1);
            format!(
                "Yearly every {years} {} on {} {}",
                plural(years, "year"),
                month_label(recurrence),
                recurrence.day_of_month.unwrap_or(1)
            )
        }
        RecurrenceType::YearNth => {
            let years = (interval / 12).max(1);
            format!(
                "Yearly every {years} {} on the {} {} of {}",
                plural(years, "year"),
                instance_label(recurrence),
                day_list(recurrence),
                month_label(recurrence)
            )
        }
    };

    match (recurrence.occurrences, recurrence.end_time) {
        (Some(count), _) => {
            text.push_str(&format!(", end after {count} {}", plural(count, "occurrence")));
        }
        (None, Some(end_time)) => text.push_str(&format!(", end by {}", format_date(end_time))),
        (None, None) => {}
    }

    text
}

fn plural(count: u32, unit: &str) -> String {
    if count == 1 {
        unit.to_string()
    } else {
        format!("{unit}s")
    }
}

fn day_list(recurrence: &Recurrence) -> String {
    let days = recurrence.weekdays();
    if days.len() == 5
        && days
            .iter()
            .all(|day| !matches!(day, DayOfWeek::Sunday | DayOfWeek::Saturday))
    {
        return "weekday".to_string();
    }
    days.into_iter()
        .map(DayOfWeek::label)
        .collect::<Vec<_>>()
        .join(", ")
}

fn instance_label(recurrence: &Recurrence) -> &'static str {
    recurrence.instance.map_or("first", Instance::as_str)
}

fn month_label(recurrence: &Recurrence) -> &'static str {
    recurrence
        .month_of_year
        .and_then(|month| u8::try_from(month).ok())
        .and_then(|month| Month::try_from(month).ok())
        .map_or("January", |month| month.name())
}

fn format_date(value: DateTime<Utc>) -> String {
    value.format("%b %-d, %Y").to_string()
}
