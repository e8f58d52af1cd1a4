//! ## Summary
//! Decides which notifications an event lifecycle change raises.
//!
//! Every entry point is a no-op under [`NotificationStrategy::None`]. The
//! calendar owner never notifies themself, so owner attendees are left out of
//! attendee notifications.

use cadence_core::error::{CoreError, CoreResult};
use cadence_core::types::NotificationStrategy;
use cadence_model::{Attendee, Event, EventKey, EventTree};

use super::decision::{NotificationDecision, NotificationKind, NotificationQueue, Recipient};
use crate::calendar::attendee::contains_attendee;

fn decision(
    kind: NotificationKind,
    key: EventKey,
    event: &Event,
    recipients: Vec<Recipient>,
) -> NotificationDecision {
    NotificationDecision {
        kind,
        event: key,
        event_id: event.id,
        event_uid: event.uid,
        recipients,
        subject: None,
    }
}

/// Attendees other than the owner of the event's calendar.
fn recipients_except_owner<'a>(
    event: &Event,
    attendees: impl IntoIterator<Item = &'a Attendee>,
) -> Vec<Recipient> {
    let owner = event.calendar_owner_id();
    attendees
        .into_iter()
        .filter(|attendee| owner.is_none() || attendee.user != owner)
        .map(Recipient::from)
        .collect()
}

fn require_recurring_exception(event: &Event, key: EventKey) -> CoreResult<()> {
    if event.is_exception() {
        Ok(())
    } else {
        Err(CoreError::InconsistentState(format!(
            "cancelled event {key} is not an exception of a recurring event"
        )))
    }
}

/// ## Summary
/// A new event invites its attendees. A new cancelled event must be an
/// exception, and cancels the occurrence for its attendees instead.
///
/// ## Errors
/// Returns `CoreError::InconsistentState` for a cancelled event that is not
/// an exception.
#[tracing::instrument(skip(queue, tree))]
pub fn on_create(
    queue: &mut NotificationQueue,
    tree: &EventTree,
    key: EventKey,
    strategy: NotificationStrategy,
) -> CoreResult<()> {
    if strategy == NotificationStrategy::None {
        return Ok(());
    }
    let event = tree.event(key)?;
    let recipients = recipients_except_owner(event, tree.attendees(key)?);

    let kind = if event.cancelled {
        require_recurring_exception(event, key)?;
        NotificationKind::Cancel
    } else {
        NotificationKind::Invite
    };
    queue.push(decision(kind, key, event, recipients));
    Ok(())
}

/// ## Summary
/// Decides the notifications for an updated event, comparing it with its
/// state in `original`.
///
/// - moved from a personal to a system calendar: the original attendees are cancelled
/// - newly cancelled exception: the related attendee as it was in `original`
///   (child) or all attendees (master) are cancelled
/// - cancellation withdrawn: attendees are invited again
/// - otherwise: attendees only found in cleared exceptions are cancelled,
///   added attendees invited, removed attendees uninvited, and under
///   [`NotificationStrategy::All`] the remaining attendees get an update
///
/// Events missing from `original` are treated as created.
///
/// ## Errors
/// Returns `CoreError::InconsistentState` for a newly cancelled event that is
/// not an exception.
#[tracing::instrument(skip(queue, tree, original))]
pub fn on_update(
    queue: &mut NotificationQueue,
    tree: &EventTree,
    key: EventKey,
    original: &EventTree,
    strategy: NotificationStrategy,
) -> CoreResult<()> {
    if strategy == NotificationStrategy::None {
        return Ok(());
    }
    let Some(before) = original.get(key) else {
        return on_create(queue, tree, key, strategy);
    };
    let event = tree.event(key)?;
    let current = tree.attendees(key)?;
    let previous = original.attendees(key)?;

    let was_personal = before.calendar().is_some_and(|calendar| !calendar.is_system());
    let is_system = event.calendar().is_some_and(|calendar| calendar.is_system());
    if was_personal && is_system {
        let recipients = recipients_except_owner(before, previous);
        queue.push(decision(NotificationKind::Cancel, key, event, recipients));
        return Ok(());
    }

    if event.cancelled && !before.cancelled {
        require_recurring_exception(event, key)?;
        let recipients = if event.is_child() {
            // Cancelling a copy detaches its attendee from the parent.
            original
                .related_attendee(key)
                .or_else(|| tree.related_attendee(key))
                .map(Recipient::from)
                .into_iter()
                .collect()
        } else {
            recipients_except_owner(event, current)
        };
        queue.push(decision(NotificationKind::Cancel, key, event, recipients));
        return Ok(());
    }

    if !event.cancelled && before.cancelled {
        let recipients = recipients_except_owner(event, current);
        queue.push(decision(NotificationKind::Invite, key, event, recipients));
        return Ok(());
    }

    if !before.exceptions().is_empty() && event.exceptions().is_empty() {
        let mut dropped: Vec<&Attendee> = Vec::new();
        for exception in before.exceptions() {
            for attendee in original.attendees(*exception)? {
                if !contains_attendee(current, attendee)
                    && !dropped.iter().any(|known| known.is_equal(attendee))
                {
                    dropped.push(attendee);
                }
            }
        }
        let recipients = recipients_except_owner(event, dropped);
        queue.push(decision(NotificationKind::Cancel, key, event, recipients));
    }

    if strategy == NotificationStrategy::All {
        let kept = current
            .iter()
            .filter(|attendee| contains_attendee(previous, attendee));
        let recipients = recipients_except_owner(event, kept);
        queue.push(decision(NotificationKind::Update, key, event, recipients));
    }

    let added = current
        .iter()
        .filter(|attendee| !contains_attendee(previous, attendee));
    let recipients = recipients_except_owner(event, added);
    queue.push(decision(NotificationKind::Invite, key, event, recipients));

    let removed = previous
        .iter()
        .filter(|attendee| !contains_attendee(current, attendee));
    let recipients = recipients_except_owner(event, removed);
    queue.push(decision(NotificationKind::Uninvite, key, event, recipients));

    Ok(())
}

/// ## Summary
/// Decides the notifications for an event about to be deleted.
///
/// Deleting a child tells the parent's owner that the attendee left.
/// Deleting anything else cancels the event for its attendees and for the
/// attendees only invited to one of its exceptions.
///
/// ## Errors
/// Returns `CoreError::InconsistentState` if a child's parent has no owner.
#[tracing::instrument(skip(queue, tree))]
pub fn on_delete(
    queue: &mut NotificationQueue,
    tree: &EventTree,
    key: EventKey,
    strategy: NotificationStrategy,
) -> CoreResult<()> {
    if strategy == NotificationStrategy::None {
        return Ok(());
    }
    let event = tree.event(key)?;

    if let Some(parent) = event.parent() {
        let owner = tree.calendar_owner(parent)?;
        let mut notification = decision(
            NotificationKind::ChildDeleted,
            key,
            event,
            vec![Recipient::from(owner)],
        );
        notification.subject = tree.related_attendee(key).map(Recipient::from);
        queue.push(notification);
        return Ok(());
    }

    let current = tree.attendees(key)?;
    let mut cancelled: Vec<&Attendee> = current.iter().collect();
    for exception in event.exceptions() {
        for attendee in tree.attendees(*exception)? {
            if !cancelled.iter().any(|known| known.is_equal(attendee)) {
                cancelled.push(attendee);
            }
        }
    }
    let recipients = recipients_except_owner(event, cancelled);
    queue.push(decision(NotificationKind::Cancel, key, event, recipients));
    Ok(())
}

/// ## Summary
/// Tells the parent's owner about the new invitation status of a child's
/// related attendee. Events that are not children raise nothing.
///
/// ## Errors
/// Returns `CoreError::InconsistentState` if the child has no related
/// attendee or the parent's calendar has no owner.
#[tracing::instrument(skip(queue, tree))]
pub fn on_change_invitation_status(
    queue: &mut NotificationQueue,
    tree: &EventTree,
    key: EventKey,
    strategy: NotificationStrategy,
) -> CoreResult<()> {
    if strategy == NotificationStrategy::None {
        return Ok(());
    }
    let event = tree.event(key)?;
    let Some(parent) = event.parent() else {
        return Ok(());
    };

    let related = tree.related_attendee(key).ok_or_else(|| {
        CoreError::InconsistentState(format!("child event {key} has no related attendee"))
    })?;
    let owner = tree.calendar_owner(parent)?;

    let mut notification = decision(
        NotificationKind::StatusChanged {
            status: related.status.unwrap_or_default(),
        },
        key,
        event,
        vec![Recipient::from(owner)],
    );
    notification.subject = Some(Recipient::from(related));
    queue.push(notification);
    Ok(())
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
