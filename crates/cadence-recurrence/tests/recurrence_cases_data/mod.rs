// Shared expansion cases. The including module must have `Recurrence`,
// `RecurrenceType`, `DayOfWeek`, `Instance` and `occurrences` in scope.

pub struct RecurrenceCase {
    pub name: &'static str,
    pub recurrence: Recurrence,
    pub window_start: &'static str,
    pub window_end: &'static str,
    pub expected: &'static [&'static str],
}

pub fn parse_rfc3339(value: &str) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::parse_from_rfc3339(value)
        .unwrap_or_else(|err| panic!("Invalid RFC3339 '{value}': {err}"))
        .with_timezone(&chrono::Utc)
}

#[expect(clippy::too_many_lines)]
pub fn recurrence_cases() -> Vec<RecurrenceCase> {
    vec![
        RecurrenceCase {
            name: "daily_count_is_series_relative",
            recurrence: Recurrence::new(
                RecurrenceType::Daily,
                1,
                parse_rfc3339("2016-04-25T01:00:00Z"),
                "UTC",
            )
            .with_occurrences(4),
            window_start: "2016-04-01T00:00:00Z",
            window_end: "2016-06-01T00:00:00Z",
            expected: &[
                "2016-04-25T01:00:00Z",
                "2016-04-26T01:00:00Z",
                "2016-04-27T01:00:00Z",
                "2016-04-28T01:00:00Z",
            ],
        },
        RecurrenceCase {
            name: "daily_budget_consumed_before_window",
            recurrence: Recurrence::new(
                RecurrenceType::Daily,
                3,
                parse_rfc3339("2016-04-01T09:00:00Z"),
                "UTC",
            )
            .with_occurrences(5),
            window_start: "2016-04-05T00:00:00Z",
            window_end: "2016-05-01T00:00:00Z",
            expected: &[
                "2016-04-07T09:00:00Z",
                "2016-04-10T09:00:00Z",
                "2016-04-13T09:00:00Z",
            ],
        },
        RecurrenceCase {
            name: "weekly_every_other_sunday_monday",
            recurrence: Recurrence::new(
                RecurrenceType::Weekly,
                2,
                parse_rfc3339("2016-04-25T01:00:00Z"),
                "UTC",
            )
            .with_days([DayOfWeek::Sunday, DayOfWeek::Monday])
            .with_occurrences(4)
            .with_end_time(parse_rfc3339("2016-06-10T00:00:00Z")),
            window_start: "2016-04-01T00:00:00Z",
            window_end: "2016-07-01T00:00:00Z",
            expected: &[
                "2016-04-25T01:00:00Z",
                "2016-05-08T01:00:00Z",
                "2016-05-09T01:00:00Z",
                "2016-05-22T01:00:00Z",
            ],
        },
        RecurrenceCase {
            name: "weekly_stops_at_end_time",
            recurrence: Recurrence::new(
                RecurrenceType::Weekly,
                1,
                parse_rfc3339("2016-05-03T10:00:00Z"),
                "UTC",
            )
            .with_days([DayOfWeek::Tuesday, DayOfWeek::Thursday])
            .with_end_time(parse_rfc3339("2016-05-12T00:00:00Z")),
            window_start: "2016-05-01T00:00:00Z",
            window_end: "2016-06-01T00:00:00Z",
            expected: &[
                "2016-05-03T10:00:00Z",
                "2016-05-05T10:00:00Z",
                "2016-05-10T10:00:00Z",
            ],
        },
        RecurrenceCase {
            name: "monthly_day_31_clamps_in_leap_year",
            recurrence: Recurrence::new(
                RecurrenceType::Monthly,
                1,
                parse_rfc3339("2016-01-01T00:00:00Z"),
                "UTC",
            )
            .with_day_of_month(31),
            window_start: "2016-01-01T00:00:00Z",
            window_end: "2016-04-30T23:59:59Z",
            expected: &[
                "2016-01-31T00:00:00Z",
                "2016-02-29T00:00:00Z",
                "2016-03-31T00:00:00Z",
                "2016-04-30T00:00:00Z",
            ],
        },
        RecurrenceCase {
            name: "monthly_day_31_clamps_in_common_year",
            recurrence: Recurrence::new(
                RecurrenceType::Monthly,
                1,
                parse_rfc3339("2017-02-01T00:00:00Z"),
                "UTC",
            )
            .with_day_of_month(31),
            window_start: "2017-02-01T00:00:00Z",
            window_end: "2017-02-28T23:59:59Z",
            expected: &["2017-02-28T00:00:00Z"],
        },
        RecurrenceCase {
            name: "monthnth_last_friday",
            recurrence: Recurrence::new(
                RecurrenceType::MonthNth,
                1,
                parse_rfc3339("2016-04-01T12:00:00Z"),
                "UTC",
            )
            .with_instance(Instance::Last)
            .with_days([DayOfWeek::Friday])
            .with_occurrences(3),
            window_start: "2016-01-01T00:00:00Z",
            window_end: "2016-12-31T00:00:00Z",
            expected: &[
                "2016-04-29T12:00:00Z",
                "2016-05-27T12:00:00Z",
                "2016-06-24T12:00:00Z",
            ],
        },
        RecurrenceCase {
            name: "monthnth_second_monday_every_other_month",
            recurrence: Recurrence::new(
                RecurrenceType::MonthNth,
                2,
                parse_rfc3339("2016-01-01T08:00:00Z"),
                "UTC",
            )
            .with_instance(Instance::Second)
            .with_days([DayOfWeek::Monday])
            .with_occurrences(3),
            window_start: "2016-01-01T00:00:00Z",
            window_end: "2016-12-31T00:00:00Z",
            expected: &[
                "2016-01-11T08:00:00Z",
                "2016-03-14T08:00:00Z",
                "2016-05-09T08:00:00Z",
            ],
        },
        RecurrenceCase {
            name: "yearly_february_29_clamps",
            recurrence: Recurrence::new(
                RecurrenceType::Yearly,
                12,
                parse_rfc3339("2015-01-01T00:00:00Z"),
                "UTC",
            )
            .with_month_of_year(2)
            .with_day_of_month(29)
            .with_occurrences(3),
            window_start: "2015-01-01T00:00:00Z",
            window_end: "2018-01-01T00:00:00Z",
            expected: &[
                "2015-02-28T00:00:00Z",
                "2016-02-29T00:00:00Z",
                "2017-02-28T00:00:00Z",
            ],
        },
        RecurrenceCase {
            name: "yearnth_first_monday_of_september",
            recurrence: Recurrence::new(
                RecurrenceType::YearNth,
                12,
                parse_rfc3339("2016-01-01T09:00:00Z"),
                "UTC",
            )
            .with_instance(Instance::First)
            .with_days([DayOfWeek::Monday])
            .with_month_of_year(9)
            .with_occurrences(2),
            window_start: "2016-01-01T00:00:00Z",
            window_end: "2018-01-01T00:00:00Z",
            expected: &["2016-09-05T09:00:00Z", "2017-09-04T09:00:00Z"],
        },
        RecurrenceCase {
            name: "daily_keeps_wall_clock_across_dst",
            recurrence: Recurrence::new(
                RecurrenceType::Daily,
                1,
                parse_rfc3339("2016-03-25T09:00:00Z"),
                "Europe/Berlin",
            )
            .with_occurrences(4),
            window_start: "2016-03-01T00:00:00Z",
            window_end: "2016-04-01T00:00:00Z",
            expected: &[
                "2016-03-25T09:00:00Z",
                "2016-03-26T09:00:00Z",
                "2016-03-27T08:00:00Z",
                "2016-03-28T08:00:00Z",
            ],
        },
    ]
}

pub fn assert_case(case: &RecurrenceCase) {
    let actual = occurrences(
        &case.recurrence,
        parse_rfc3339(case.window_start),
        parse_rfc3339(case.window_end),
    )
    .unwrap_or_else(|err| panic!("Failed to expand {}: {}", case.name, err));

    let expected: Vec<chrono::DateTime<chrono::Utc>> =
        case.expected.iter().map(|value| parse_rfc3339(value)).collect();

    assert_eq!(actual, expected, "Case {} did not match", case.name);
}
