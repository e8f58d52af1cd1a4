//! ## Summary
//! Entry points callers run inside their transaction after changing an event.
//!
//! [`on_event_update`] fills defaults, then brings children and exceptions in
//! line with the updated event. [`change_status`] records an attendee's answer
//! on their copy of an event.

use cadence_core::error::{CoreError, CoreResult};
use cadence_core::types::{NotificationStrategy, OrganizationId};
use cadence_model::{AttendeeStatus, EventCalendar, EventKey, EventTree};
use cadence_recurrence::recurrence::is_equal;
use chrono::Utc;

use super::attendee::{apply_attendee_defaults, bind_attendees, has_equal_attendees};
use super::child_events::reconcile_child_events;
use super::exceptions::reconcile_exceptions;
use crate::directory::Directory;
use crate::error::ServiceResult;
use crate::notification::{NotificationQueue, on_change_invitation_status};

/// ## Summary
/// Reconciles the tree after `key` was created or updated. `original` holds
/// the state loaded before the caller's changes; events missing from it are
/// treated as new.
///
/// Steps, in order:
/// 1. organizer defaults for a master on a personal calendar
/// 2. attendee binding and status/type defaults (masters and exceptions)
/// 3. child event creation, removal and mirroring
/// 4. exception synchronization, when `allow_update_exceptions` is set,
///    followed by child reconciliation of exceptions whose attendees changed
/// 5. `updated_at` bump when attendees or recurrence changed
///
/// ## Errors
/// Returns the first fatal error of any step. Soft conditions such as a
/// missing default calendar are logged and skipped.
#[tracing::instrument(skip(tree, original, directory))]
pub fn on_event_update<D>(
    tree: &mut EventTree,
    key: EventKey,
    original: &EventTree,
    organization: OrganizationId,
    directory: &D,
    allow_update_exceptions: bool,
) -> ServiceResult<()>
where
    D: Directory + ?Sized,
{
    apply_organizer_defaults(tree, key)?;

    if !tree.event(key)?.is_child() {
        bind_attendees(tree, key, organization, directory)?;
        apply_attendee_defaults(tree, key)?;
    }

    let relations_changed = relations_changed(tree, key, original)?;

    reconcile_child_events(tree, key, organization, directory)?;

    if allow_update_exceptions {
        for exception in reconcile_exceptions(tree, key, original)? {
            reconcile_child_events(tree, exception, organization, directory)?;
        }
    }

    if relations_changed {
        tree.event_mut(key)?.updated_at = Some(Utc::now());
        tracing::debug!(event = %key, "Attendees or recurrence changed, bumped update time");
    }
    Ok(())
}

/// Marks the calendar owner as organizer of a master without organizer info.
fn apply_organizer_defaults(tree: &mut EventTree, key: EventKey) -> CoreResult<()> {
    let event = tree.event(key)?;
    if event.is_child() || event.is_exception() || !event.organizer.is_empty() {
        return Ok(());
    }
    let Some(owner) = event
        .calendar()
        .and_then(EventCalendar::owner)
        .cloned()
    else {
        return Ok(());
    };

    let organizer = &mut tree.event_mut(key)?.organizer;
    organizer.is_organizer = Some(true);
    organizer.display_name = Some(owner.full_name());
    organizer.user = Some(owner.id);
    organizer.email = Some(owner.email);
    Ok(())
}

fn relations_changed(tree: &EventTree, key: EventKey, original: &EventTree) -> CoreResult<bool> {
    let Some(before) = original.get(key) else {
        return Ok(true);
    };
    let event = tree.event(key)?;
    let attendees_changed = !has_equal_attendees(tree.attendees(key)?, original.attendees(key)?);
    let recurrence_changed = !is_equal(event.recurrence.as_ref(), before.recurrence.as_ref());
    Ok(attendees_changed || recurrence_changed)
}

/// ## Summary
/// Sets the invitation status of a child's related attendee on the parent and
/// decides the owner notification.
///
/// ## Errors
/// Returns `CoreError::InvalidOperation` if `child` is not a child event and
/// `CoreError::InconsistentState` if it has no related attendee.
#[tracing::instrument(skip(tree, queue))]
pub fn change_status(
    tree: &mut EventTree,
    child: EventKey,
    status: AttendeeStatus,
    queue: &mut NotificationQueue,
    strategy: NotificationStrategy,
) -> CoreResult<()> {
    let Some(parent) = tree.event(child)?.parent() else {
        return Err(CoreError::InvalidOperation(format!(
            "event {child} is not a child event"
        )));
    };
    let index = tree.related_attendee_index(child).ok_or_else(|| {
        CoreError::InconsistentState(format!("child event {child} has no related attendee"))
    })?;

    tree.update_attendees(parent, |attendees| {
        if let Some(attendee) = attendees.get_mut(index) {
            attendee.status = Some(status);
        }
    })?;
    tracing::debug!(event = %child, %status, "Changed invitation status");

    on_change_invitation_status(queue, tree, child, strategy)
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
