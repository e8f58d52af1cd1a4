//! Fixtures shared by the unit tests of this crate.

use cadence_core::types::{CalendarId, OrganizationId, UserId};
use cadence_model::{Attendee, Calendar, Event, EventKey, EventTree, User};
use cadence_recurrence::{DayOfWeek, Recurrence, RecurrenceType};
use chrono::{DateTime, TimeZone, Utc};

use crate::calendar::child_events::reconcile_child_events;
use crate::directory::StaticDirectory;

pub const ORG: OrganizationId = OrganizationId(1);

pub const OWNER: UserId = UserId(1);
pub const ALICE: UserId = UserId(2);
pub const BOB: UserId = UserId(3);
/// Member without a default calendar.
pub const CAROL: UserId = UserId(4);

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid test datetime")
}

pub fn user(id: UserId) -> User {
    let (email, first, last) = match id.0 {
        1 => ("owner@example.com", "Olivia", "Owner"),
        2 => ("alice@example.com", "Alice", "Archer"),
        3 => ("bob@example.com", "Bob", "Baker"),
        _ => ("carol@example.com", "Carol", "Cook"),
    };
    User::new(id, email)
        .with_name(first, last)
        .with_organization(ORG)
}

pub fn calendar_of(id: UserId) -> Calendar {
    Calendar::new(CalendarId(id.0 * 10), Some(user(id)))
}

pub fn attendee(id: UserId) -> Attendee {
    let user = user(id);
    Attendee::new(user.email.clone(), user.full_name()).with_user(id)
}

pub fn directory() -> StaticDirectory {
    StaticDirectory::new()
        .with_user(user(OWNER), Some(calendar_of(OWNER)))
        .with_user(user(ALICE), Some(calendar_of(ALICE)))
        .with_user(user(BOB), Some(calendar_of(BOB)))
        .with_user(user(CAROL), None)
}

/// One-hour event on the owner's calendar, 2016-04-25 10:00 UTC.
pub fn meeting(title: &str) -> Event {
    Event::new(title, at(2016, 4, 25, 10), at(2016, 4, 25, 11)).with_calendar(calendar_of(OWNER))
}

pub fn weekly() -> Recurrence {
    Recurrence::new(RecurrenceType::Weekly, 1, at(2016, 4, 25, 10), "UTC")
        .with_days([DayOfWeek::Monday])
}

/// Inserts a persisted weekly master with the given attendees.
pub fn insert_master(tree: &mut EventTree, attendees: &[UserId]) -> EventKey {
    let master = meeting("Standup")
        .with_id(100)
        .with_recurrence(weekly())
        .with_attendees(attendees.iter().copied().map(attendee));
    tree.insert(master)
}

/// Inserts an exception of `master` replacing the occurrence at `original_start`.
pub fn insert_exception(
    tree: &mut EventTree,
    master: EventKey,
    original_start: DateTime<Utc>,
) -> EventKey {
    let master_event = tree.event(master).expect("master exists");
    let mut exception = Event::new(
        master_event.title.clone(),
        original_start,
        original_start + master_event.duration(),
    )
    .with_calendar(calendar_of(OWNER))
    .with_attendees(master_event.own_attendees().to_vec());
    exception.original_start = Some(original_start);
    let exception = tree.insert(exception);
    tree.set_recurring_event(exception, Some(master))
        .expect("exception links to master");
    exception
}

/// Weekly master attended by the owner, Alice and Bob, with an exception on
/// 2016-05-02 and children for both on every event of the series.
pub fn insert_series(tree: &mut EventTree) -> (EventKey, EventKey) {
    let master = insert_master(tree, &[OWNER, ALICE, BOB]);
    reconcile_child_events(tree, master, ORG, &directory()).expect("master children");
    let exception = insert_exception(tree, master, at(2016, 5, 2, 10));
    reconcile_child_events(tree, exception, ORG, &directory()).expect("exception children");
    (master, exception)
}

/// The child of `parent` on the given user's calendar.
pub fn child_on(tree: &EventTree, parent: EventKey, user: UserId) -> EventKey {
    tree.child_event_by_calendar(parent, calendar_of(user).id)
        .expect("child exists on calendar")
}
