//! Recurrence rule types.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Recurrence pattern kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Monthly,
    MonthNth,
    Yearly,
    YearNth,
}

impl RecurrenceType {
    pub const ALL: [Self; 6] = [
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::MonthNth,
        Self::Yearly,
        Self::YearNth,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::MonthNth => "monthnth",
            Self::Yearly => "yearly",
            Self::YearNth => "yearnth",
        }
    }

    /// Parses a type code, case-insensitively.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(code.trim()))
    }

    /// Types that pick the nth weekday of a month.
    #[must_use]
    pub const fn is_nth(self) -> bool {
        matches!(self, Self::MonthNth | Self::YearNth)
    }

    /// Types whose interval is expressed in months and constrained to a month of year.
    #[must_use]
    pub const fn is_yearly(self) -> bool {
        matches!(self, Self::Yearly | Self::YearNth)
    }
}

impl std::fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal of a weekday within a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instance {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl Instance {
    pub const ALL: [Self; 5] = [
        Self::First,
        Self::Second,
        Self::Third,
        Self::Fourth,
        Self::Last,
    ];

    /// Numeric code, `5` standing for the last instance.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
            Self::Last => 5,
        }
    }

    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|instance| i64::from(instance.code()) == code)
    }

    /// Position within the candidate set of a period, negative counting from the end.
    #[must_use]
    pub fn set_pos(self) -> i32 {
        match self {
            Self::Last => -1,
            other => i32::from(other.code()),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Third => "third",
            Self::Fourth => "fourth",
            Self::Last => "last",
        }
    }
}

/// Day of week as used by recurrence rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunday => "sunday",
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(code.trim()))
    }

    #[must_use]
    pub const fn to_weekday(self) -> Weekday {
        match self {
            Self::Sunday => Weekday::Sun,
            Self::Monday => Weekday::Mon,
            Self::Tuesday => Weekday::Tue,
            Self::Wednesday => Weekday::Wed,
            Self::Thursday => Weekday::Thu,
            Self::Friday => Weekday::Fri,
            Self::Saturday => Weekday::Sat,
        }
    }

    /// Capitalized English name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sunday => "Sunday",
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => Self::Sunday,
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
        }
    }
}

/// A recurrence rule owned by the master event of a series.
///
/// `interval` is in days, weeks or months depending on the type; yearly types
/// express it in months (`12` meaning every year).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub recurrence_type: RecurrenceType,
    pub interval: u32,
    #[serde(default)]
    pub instance: Option<Instance>,
    #[serde(default)]
    pub day_of_week: Vec<DayOfWeek>,
    #[serde(default)]
    pub day_of_month: Option<u32>,
    #[serde(default)]
    pub month_of_year: Option<u32>,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub occurrences: Option<u32>,
    #[serde(rename = "timeZone")]
    pub timezone: String,
}

impl Recurrence {
    /// Creates a rule with every optional field unset.
    #[must_use]
    pub fn new(
        recurrence_type: RecurrenceType,
        interval: u32,
        start_time: DateTime<Utc>,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            recurrence_type,
            interval,
            instance: None,
            day_of_week: Vec::new(),
            day_of_month: None,
            month_of_year: None,
            start_time,
            end_time: None,
            occurrences: None,
            timezone: timezone.into(),
        }
    }

    #[must_use]
    pub fn with_days(mut self, days: impl IntoIterator<Item = DayOfWeek>) -> Self {
        self.day_of_week = days.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_instance(mut self, instance: Instance) -> Self {
        self.instance = Some(instance);
        self
    }

    #[must_use]
    pub fn with_day_of_month(mut self, day: u32) -> Self {
        self.day_of_month = Some(day);
        self
    }

    #[must_use]
    pub fn with_month_of_year(mut self, month: u32) -> Self {
        self.month_of_year = Some(month);
        self
    }

    #[must_use]
    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    #[must_use]
    pub fn with_occurrences(mut self, occurrences: u32) -> Self {
        self.occurrences = Some(occurrences);
        self
    }

    /// Weekdays without duplicates, in Sunday-first order.
    #[must_use]
    pub fn weekdays(&self) -> Vec<DayOfWeek> {
        let mut days = self.day_of_week.clone();
        days.sort_unstable();
        days.dedup();
        days
    }

    /// ## Summary
    /// Compares every scheduling field; identity is ignored and weekdays compare as a set.
    #[must_use]
    pub fn same_schedule(&self, other: &Self) -> bool {
        self.recurrence_type == other.recurrence_type
            && self.interval == other.interval
            && self.instance == other.instance
            && self.weekdays() == other.weekdays()
            && self.day_of_month == other.day_of_month
            && self.month_of_year == other.month_of_year
            && self.start_time.timestamp() == other.start_time.timestamp()
            && self.end_time.as_ref().map(DateTime::timestamp)
                == other.end_time.as_ref().map(DateTime::timestamp)
            && self.occurrences == other.occurrences
            && self.timezone == other.timezone
    }
}

/// ## Summary
/// Schedule equality of two optional rules; two absent rules are equal.
#[must_use]
pub fn is_equal(a: Option<&Recurrence>, b: Option<&Recurrence>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same_schedule(b),
        _ => false,
    }
}
