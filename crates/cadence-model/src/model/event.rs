//! ## Summary
//! The calendar event record.
//!
//! Scalar fields are public. Relationship fields (parent, children, recurring
//! master, exceptions, attendees and calendar) are private and only changed
//! through [`EventTree`](super::tree::EventTree) and the calendar setters, so
//! the tree can keep both sides of every link consistent.

use cadence_core::types::UserId;
use cadence_recurrence::Recurrence;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::attendee::Attendee;
use super::calendar::{Calendar, EventCalendar, SystemCalendar};
use super::tree::EventKey;

/// Organizer information carried by every event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    pub is_organizer: Option<bool>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub user: Option<UserId>,
}

impl Organizer {
    /// True when no organizer field has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_organizer.is_none()
            && self.email.is_none()
            && self.display_name.is_none()
            && self.user.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Event {
    pub id: Option<i64>,
    pub uid: uuid::Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub background_color: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub cancelled: bool,
    /// Start of the occurrence this exception replaces.
    pub original_start: Option<DateTime<Utc>>,
    pub organizer: Organizer,
    /// Only set on the master of a recurring series.
    pub recurrence: Option<Recurrence>,
    calendar: Option<EventCalendar>,
    pub(crate) attendees: Vec<Attendee>,
    pub(crate) parent: Option<EventKey>,
    pub(crate) child_events: Vec<EventKey>,
    pub(crate) recurring_event: Option<EventKey>,
    pub(crate) exceptions: Vec<EventKey>,
}

impl Event {
    /// Creates an unpersisted event with a fresh uid and no relationships.
    #[must_use]
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: None,
            uid: uuid::Uuid::new_v4(),
            title: title.into(),
            description: None,
            start,
            end,
            all_day: false,
            background_color: None,
            created_at: None,
            updated_at: None,
            cancelled: false,
            original_start: None,
            organizer: Organizer::default(),
            recurrence: None,
            calendar: None,
            attendees: Vec::new(),
            parent: None,
            child_events: Vec::new(),
            recurring_event: None,
            exceptions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.set_calendar(calendar);
        self
    }

    #[must_use]
    pub fn with_system_calendar(mut self, calendar: SystemCalendar) -> Self {
        self.set_system_calendar(calendar);
        self
    }

    #[must_use]
    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    /// Attendees given at construction; only accepted before the event joins a tree.
    #[must_use]
    pub fn with_attendees(mut self, attendees: impl IntoIterator<Item = Attendee>) -> Self {
        self.attendees = attendees.into_iter().collect();
        self
    }

    #[must_use]
    pub fn calendar(&self) -> Option<&EventCalendar> {
        self.calendar.as_ref()
    }

    /// Puts the event on a personal calendar, clearing any system calendar.
    pub fn set_calendar(&mut self, calendar: Calendar) {
        self.calendar = Some(EventCalendar::Personal(calendar));
    }

    /// Puts the event on a system calendar, clearing any personal calendar.
    pub fn set_system_calendar(&mut self, calendar: SystemCalendar) {
        self.calendar = Some(EventCalendar::System(calendar));
    }

    /// Owner of the personal calendar the event is on.
    #[must_use]
    pub fn calendar_owner_id(&self) -> Option<UserId> {
        self.calendar.as_ref().and_then(EventCalendar::owner_id)
    }

    /// Attendees stored on this event itself; empty for children.
    #[must_use]
    pub fn own_attendees(&self) -> &[Attendee] {
        &self.attendees
    }

    #[must_use]
    pub fn parent(&self) -> Option<EventKey> {
        self.parent
    }

    #[must_use]
    pub fn child_events(&self) -> &[EventKey] {
        &self.child_events
    }

    #[must_use]
    pub fn recurring_event(&self) -> Option<EventKey> {
        self.recurring_event
    }

    #[must_use]
    pub fn exceptions(&self) -> &[EventKey] {
        &self.exceptions
    }

    #[must_use]
    pub fn is_child(&self) -> bool {
        self.parent.is_some()
    }

    /// True for an override of one occurrence of a series.
    #[must_use]
    pub fn is_exception(&self) -> bool {
        self.recurring_event.is_some()
    }

    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Clears every relationship link, leaving scalar fields and the calendar.
    pub(crate) fn reset_links(&mut self) {
        self.parent = None;
        self.child_events.clear();
        self.recurring_event = None;
        self.exceptions.clear();
    }
}
