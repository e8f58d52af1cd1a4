//! Cadence integration test support.
//!
//! Re-exports the workspace crates and provides an in-memory organization
//! with members, default calendars and a directory, so integration tests can
//! build event trees without a repository.

use std::collections::BTreeMap;

pub use cadence_model as model;
pub use cadence_recurrence as recurrence;
pub use cadence_service as service;

use cadence_core::types::{CalendarId, OrganizationId, UserId};
use cadence_model::{Attendee, Calendar, Event, User};
use cadence_service::directory::StaticDirectory;
use chrono::{DateTime, Utc};

/// ## Summary
/// Parses an RFC 3339 timestamp into UTC.
///
/// ## Panics
/// Panics on malformed input.
#[must_use]
pub fn utc(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .unwrap_or_else(|err| panic!("Invalid RFC3339 '{value}': {err}"))
        .with_timezone(&Utc)
}

/// An organization with members and their default calendars.
#[derive(Debug, Clone)]
pub struct Organization {
    pub id: OrganizationId,
    members: BTreeMap<UserId, (User, Option<Calendar>)>,
}

impl Organization {
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self {
            id: OrganizationId(id),
            members: BTreeMap::new(),
        }
    }

    /// Adds a member; members with a calendar get one with id `user * 10`.
    #[must_use]
    pub fn with_member(mut self, id: i64, first_name: &str, with_calendar: bool) -> Self {
        let user = User::new(id, format!("{}@example.com", first_name.to_lowercase()))
            .with_name(first_name, "Tester")
            .with_organization(self.id);
        let calendar =
            with_calendar.then(|| Calendar::new(CalendarId(id * 10), Some(user.clone())));
        self.members.insert(user.id, (user, calendar));
        self
    }

    /// ## Panics
    /// Panics if `id` is not a member.
    #[must_use]
    pub fn member(&self, id: i64) -> &User {
        &self
            .members
            .get(&UserId(id))
            .unwrap_or_else(|| panic!("No member {id}"))
            .0
    }

    /// ## Panics
    /// Panics if `id` is not a member with a default calendar.
    #[must_use]
    pub fn calendar(&self, id: i64) -> Calendar {
        self.members
            .get(&UserId(id))
            .and_then(|(_, calendar)| calendar.clone())
            .unwrap_or_else(|| panic!("No calendar for member {id}"))
    }

    /// Attendee entry for a member, left unbound so the directory resolves it.
    #[must_use]
    pub fn invite(&self, id: i64) -> Attendee {
        Attendee::new(self.member(id).email.to_uppercase(), "")
    }

    /// An event on the member's default calendar.
    #[must_use]
    pub fn event_for(
        &self,
        id: i64,
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Event {
        Event::new(title, start, end).with_calendar(self.calendar(id))
    }

    #[must_use]
    pub fn directory(&self) -> StaticDirectory {
        self.members
            .values()
            .fold(StaticDirectory::new(), |directory, (user, calendar)| {
                directory.with_user(user.clone(), calendar.clone())
            })
    }
}

pub const OWNER: i64 = 1;
pub const ALICE: i64 = 2;
pub const BOB: i64 = 3;
pub const CAROL: i64 = 4;

/// Organization 7 with an owner, Alice and Bob, plus Carol who has no
/// default calendar.
#[must_use]
pub fn acme() -> Organization {
    Organization::new(7)
        .with_member(OWNER, "Olivia", true)
        .with_member(ALICE, "Alice", true)
        .with_member(BOB, "Bob", true)
        .with_member(CAROL, "Carol", false)
}
