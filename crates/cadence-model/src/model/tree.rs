//! ## Summary
//! Arena of events addressed by stable keys.
//!
//! A master owns its child events (one per attendee calendar) and its
//! attendees. Exceptions reference their recurring master and are listed on it,
//! but are not owned by it: removing a master detaches the exceptions it still
//! lists instead of deleting them.
//!
//! Every link is written on both sides by the tree, and attendee mutations are
//! rejected on child events. The tree also journals the persisted events and
//! attendees it drops, so the caller's repository can delete them in the same
//! transaction.

use std::collections::HashSet;

use cadence_core::error::{CoreError, CoreResult};
use cadence_core::types::CalendarId;

use super::attendee::Attendee;
use super::calendar::EventCalendar;
use super::event::Event;
use super::user::User;

/// Stable address of an event inside an [`EventTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey(usize);

impl std::fmt::Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A persisted entity the tree dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovedEntity {
    Event { id: i64, uid: uuid::Uuid },
    Attendee { id: i64, event: Option<i64> },
}

#[derive(Debug, Clone, Default)]
pub struct EventTree {
    events: Vec<Option<Event>>,
    removed: Vec<RemovedEntity>,
}

impl EventTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Adds an event to the arena. Relationship links carried by the value are
    /// reset; use the linking methods to attach it.
    pub fn insert(&mut self, mut event: Event) -> EventKey {
        event.reset_links();
        let key = EventKey(self.events.len());
        self.events.push(Some(event));
        tracing::trace!(event = %key, "Inserted event");
        key
    }

    #[must_use]
    pub fn get(&self, key: EventKey) -> Option<&Event> {
        self.events.get(key.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, key: EventKey) -> Option<&mut Event> {
        self.events.get_mut(key.0).and_then(Option::as_mut)
    }

    /// ## Errors
    /// Returns `CoreError::NotFound` if the key does not address a live event.
    pub fn event(&self, key: EventKey) -> CoreResult<&Event> {
        self.get(key)
            .ok_or_else(|| CoreError::NotFound(format!("event {key}")))
    }

    /// ## Errors
    /// Returns `CoreError::NotFound` if the key does not address a live event.
    pub fn event_mut(&mut self, key: EventKey) -> CoreResult<&mut Event> {
        self.get_mut(key)
            .ok_or_else(|| CoreError::NotFound(format!("event {key}")))
    }

    #[must_use]
    pub fn contains(&self, key: EventKey) -> bool {
        self.get(key).is_some()
    }

    /// Keys of every live event, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = EventKey> + '_ {
        self.events
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| EventKey(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.iter().flatten().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The event itself for masters, the parent for children.
    ///
    /// ## Errors
    /// Returns `CoreError::NotFound` if the key does not address a live event.
    pub fn master_of(&self, key: EventKey) -> CoreResult<EventKey> {
        Ok(self.event(key)?.parent.unwrap_or(key))
    }

    /// ## Summary
    /// Attaches `child` to `parent` as a per-attendee copy.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidOperation` if `parent` is itself a child,
    /// `child` already has a parent, owns children, or holds attendees.
    pub fn add_child(&mut self, parent: EventKey, child: EventKey) -> CoreResult<()> {
        if parent == child {
            return Err(CoreError::InvalidOperation(format!(
                "event {parent} cannot be its own child"
            )));
        }
        if self.event(parent)?.is_child() {
            return Err(CoreError::InvalidOperation(format!(
                "child event {parent} cannot own child events"
            )));
        }
        let child_event = self.event(child)?;
        if child_event.is_child() {
            return Err(CoreError::InvalidOperation(format!(
                "event {child} already has a parent"
            )));
        }
        if !child_event.attendees.is_empty() || !child_event.child_events.is_empty() {
            return Err(CoreError::InvalidOperation(format!(
                "event {child} owns attendees or children and cannot become a child"
            )));
        }

        self.event_mut(child)?.parent = Some(parent);
        self.event_mut(parent)?.child_events.push(child);
        tracing::trace!(parent = %parent, child = %child, "Attached child event");
        Ok(())
    }

    /// ## Summary
    /// Links `exception` to its recurring `master`, or unlinks it when `master`
    /// is `None`. An existing link to another master is moved.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidOperation` if `master` is itself an exception
    /// or `exception` already has exceptions of its own.
    pub fn set_recurring_event(
        &mut self,
        exception: EventKey,
        master: Option<EventKey>,
    ) -> CoreResult<()> {
        let previous = self.event(exception)?.recurring_event;
        if previous == master {
            return Ok(());
        }

        if let Some(master) = master {
            if master == exception {
                return Err(CoreError::InvalidOperation(format!(
                    "event {exception} cannot be an exception of itself"
                )));
            }
            if self.event(master)?.is_exception() {
                return Err(CoreError::InvalidOperation(format!(
                    "exception {master} cannot hold exceptions"
                )));
            }
            if !self.event(exception)?.exceptions.is_empty() {
                return Err(CoreError::InvalidOperation(format!(
                    "recurring master {exception} cannot become an exception"
                )));
            }
        }

        if let Some(previous) = previous
            && let Some(previous_master) = self.get_mut(previous)
        {
            previous_master.exceptions.retain(|key| *key != exception);
        }

        self.event_mut(exception)?.recurring_event = master;
        if let Some(master) = master {
            let master_event = self.event_mut(master)?;
            if !master_event.exceptions.contains(&exception) {
                master_event.exceptions.push(exception);
            }
        }
        Ok(())
    }

    /// ## Summary
    /// Logical attendee list of an event: its own for a master, the parent's
    /// for a child.
    ///
    /// ## Errors
    /// Returns `CoreError::NotFound` if the event or its parent is missing.
    pub fn attendees(&self, key: EventKey) -> CoreResult<&[Attendee]> {
        let master = self.master_of(key)?;
        Ok(&self.event(master)?.attendees)
    }

    /// ## Summary
    /// Mutates the attendee list of a master event. Persisted attendees that
    /// disappear from the list are journaled for removal.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidOperation` on a child event.
    pub fn update_attendees<F>(&mut self, key: EventKey, update: F) -> CoreResult<()>
    where
        F: FnOnce(&mut Vec<Attendee>),
    {
        let event = self.event_mut(key)?;
        if event.is_child() {
            return Err(CoreError::InvalidOperation(format!(
                "attendees of child event {key} are managed by its parent"
            )));
        }

        let before: Vec<i64> = event.attendees.iter().filter_map(|a| a.id).collect();
        update(&mut event.attendees);
        let after: HashSet<i64> = event.attendees.iter().filter_map(|a| a.id).collect();

        let event_id = event.id;
        for id in before.into_iter().filter(|id| !after.contains(id)) {
            self.removed.push(RemovedEntity::Attendee {
                id,
                event: event_id,
            });
        }
        Ok(())
    }

    /// ## Errors
    /// Returns `CoreError::InvalidOperation` on a child event.
    pub fn add_attendee(&mut self, key: EventKey, attendee: Attendee) -> CoreResult<()> {
        self.update_attendees(key, |attendees| attendees.push(attendee))
    }

    /// Removes the first attendee equal to `attendee`.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidOperation` on a child event.
    pub fn remove_attendee(
        &mut self,
        key: EventKey,
        attendee: &Attendee,
    ) -> CoreResult<Option<Attendee>> {
        let mut removed = None;
        self.update_attendees(key, |attendees| {
            if let Some(index) = attendees.iter().position(|a| a.is_equal(attendee)) {
                removed = Some(attendees.remove(index));
            }
        })?;
        Ok(removed)
    }

    /// ## Errors
    /// Returns `CoreError::InvalidOperation` on a child event.
    pub fn set_attendees(&mut self, key: EventKey, attendees: Vec<Attendee>) -> CoreResult<()> {
        self.update_attendees(key, |current| *current = attendees)
    }

    /// ## Summary
    /// Attendees of a master other than its related attendee.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidOperation` on a child event.
    pub fn child_attendees(&self, key: EventKey) -> CoreResult<Vec<&Attendee>> {
        let event = self.event(key)?;
        if event.is_child() {
            return Err(CoreError::InvalidOperation(format!(
                "child event {key} has no child attendees"
            )));
        }
        let related = self.related_attendee_index(key);
        Ok(event
            .attendees
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != related)
            .map(|(_, attendee)| attendee)
            .collect())
    }

    /// ## Summary
    /// The attendee of the logical attendee list whose user owns this event's
    /// calendar. Computed on every call.
    #[must_use]
    pub fn related_attendee(&self, key: EventKey) -> Option<&Attendee> {
        let index = self.related_attendee_index(key)?;
        self.attendees(key).ok()?.get(index)
    }

    /// Position of [`related_attendee`](Self::related_attendee) within the logical list.
    #[must_use]
    pub fn related_attendee_index(&self, key: EventKey) -> Option<usize> {
        let owner = self.get(key)?.calendar_owner_id()?;
        self.attendees(key)
            .ok()?
            .iter()
            .position(|attendee| attendee.user == Some(owner))
    }

    /// ## Errors
    /// Returns `CoreError::InconsistentState` if the event is not on a
    /// personal calendar with an owner.
    pub fn calendar_owner(&self, key: EventKey) -> CoreResult<&User> {
        let event = self.event(key)?;
        let calendar = event.calendar().ok_or_else(|| {
            CoreError::InconsistentState(format!("event {key} has no calendar"))
        })?;
        calendar.owner().ok_or_else(|| {
            CoreError::InconsistentState(format!("calendar of event {key} has no owner"))
        })
    }

    /// The child of `parent` stored on the given personal calendar.
    #[must_use]
    pub fn child_event_by_calendar(
        &self,
        parent: EventKey,
        calendar: CalendarId,
    ) -> Option<EventKey> {
        self.get(parent)?.child_events.iter().copied().find(|child| {
            self.get(*child)
                .and_then(Event::calendar)
                .and_then(EventCalendar::personal_id)
                == Some(calendar)
        })
    }

    /// ## Summary
    /// Removes an event together with the children it owns.
    ///
    /// The event is unlinked from its parent and recurring master. Exceptions
    /// still listed on it are detached and left in the tree; callers that want
    /// them gone remove them first.
    ///
    /// ## Errors
    /// Returns `CoreError::NotFound` if the key does not address a live event.
    pub fn remove(&mut self, key: EventKey) -> CoreResult<Event> {
        let children = self.event(key)?.child_events.clone();
        for child in children {
            self.remove(child)?;
        }

        let event = self
            .events
            .get_mut(key.0)
            .and_then(Option::take)
            .ok_or_else(|| CoreError::NotFound(format!("event {key}")))?;

        if let Some(parent) = event.parent
            && let Some(parent_event) = self.get_mut(parent)
        {
            parent_event.child_events.retain(|child| *child != key);
        }
        if let Some(master) = event.recurring_event
            && let Some(master_event) = self.get_mut(master)
        {
            master_event.exceptions.retain(|exception| *exception != key);
        }
        for exception in &event.exceptions {
            if let Some(orphan) = self.get_mut(*exception) {
                orphan.recurring_event = None;
                tracing::warn!(
                    event = %key,
                    exception = %exception,
                    "Removed event still had exceptions, detached them"
                );
            }
        }

        if let Some(id) = event.id {
            self.removed.push(RemovedEntity::Event { id, uid: event.uid });
        }
        for attendee_id in event.attendees.iter().filter_map(|a| a.id) {
            self.removed.push(RemovedEntity::Attendee {
                id: attendee_id,
                event: event.id,
            });
        }

        tracing::debug!(event = %key, id = ?event.id, "Removed event");
        Ok(event)
    }

    /// Persisted entities dropped since the journal was last taken.
    #[must_use]
    pub fn removed(&self) -> &[RemovedEntity] {
        &self.removed
    }

    pub fn take_removed(&mut self) -> Vec<RemovedEntity> {
        std::mem::take(&mut self.removed)
    }

    /// ## Summary
    /// Checks the structural invariants of every event in the arena.
    ///
    /// ## Errors
    /// Returns `CoreError::InvariantViolation` naming the first broken invariant.
    pub fn validate(&self) -> CoreResult<()> {
        for key in self.keys() {
            let event = self.event(key)?;
            self.validate_parent_links(key, event)?;
            self.validate_exception_links(key, event)?;
        }
        Ok(())
    }

    fn validate_parent_links(&self, key: EventKey, event: &Event) -> CoreResult<()> {
        if let Some(parent) = event.parent {
            let parent_event = self.get(parent).ok_or(CoreError::InvariantViolation(
                "child event references a missing parent",
            ))?;
            if parent_event.is_child() {
                return Err(CoreError::InvariantViolation(
                    "child events cannot own child events",
                ));
            }
            if !parent_event.child_events.contains(&key) {
                return Err(CoreError::InvariantViolation(
                    "parent does not list its child event",
                ));
            }
            if !event.attendees.is_empty() {
                return Err(CoreError::InvariantViolation(
                    "child events cannot hold attendees",
                ));
            }
            if let Some(owner) = event.calendar_owner_id()
                && parent_event.calendar_owner_id() == Some(owner)
            {
                return Err(CoreError::InvariantViolation(
                    "child event is on the calendar owner's own calendar",
                ));
            }
        }

        let mut calendars = HashSet::new();
        for child in &event.child_events {
            let child_event = self.get(*child).ok_or(CoreError::InvariantViolation(
                "parent lists a missing child event",
            ))?;
            if child_event.parent != Some(key) {
                return Err(CoreError::InvariantViolation(
                    "child event does not reference its parent",
                ));
            }
            if let Some(calendar) = child_event.calendar().and_then(EventCalendar::personal_id)
                && !calendars.insert(calendar)
            {
                return Err(CoreError::InvariantViolation(
                    "two child events share a calendar",
                ));
            }
        }
        Ok(())
    }

    fn validate_exception_links(&self, key: EventKey, event: &Event) -> CoreResult<()> {
        if let Some(master) = event.recurring_event {
            if !event.exceptions.is_empty() {
                return Err(CoreError::InvariantViolation(
                    "an event cannot be both a recurring master and an exception",
                ));
            }
            if event.recurrence.is_some() {
                return Err(CoreError::InvariantViolation(
                    "exceptions cannot carry a recurrence",
                ));
            }
            if event.original_start.is_none() {
                return Err(CoreError::InvariantViolation(
                    "exceptions need an original start",
                ));
            }
            let master_event = self.get(master).ok_or(CoreError::InvariantViolation(
                "exception references a missing recurring event",
            ))?;
            if !master_event.exceptions.contains(&key) {
                return Err(CoreError::InvariantViolation(
                    "recurring event does not list its exception",
                ));
            }
        }

        for exception in &event.exceptions {
            let exception_event = self.get(*exception).ok_or(CoreError::InvariantViolation(
                "recurring event lists a missing exception",
            ))?;
            if exception_event.recurring_event != Some(key) {
                return Err(CoreError::InvariantViolation(
                    "exception does not reference its recurring event",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
