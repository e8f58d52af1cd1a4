//! ## Summary
//! Hard deletion versus cancellation of events.
//!
//! Exceptions of a series are soft-cancelled when the caller allows it, so
//! the occurrence stays hidden on every calendar. Everything else is removed,
//! together with the exceptions the tree does not cascade on its own.

use cadence_core::error::CoreResult;
use cadence_model::{EventKey, EventTree};

use crate::error::ServiceResult;

/// What [`delete_or_cancel`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    Cancelled,
    Deleted,
}

/// ## Summary
/// Cancels an exception when `allow_cancel` is set, otherwise deletes the
/// event with its children and every exception hanging off them.
///
/// ## Errors
/// Returns an error if the event or one of its linked events is missing.
#[tracing::instrument(skip(tree))]
pub fn delete_or_cancel(
    tree: &mut EventTree,
    key: EventKey,
    allow_cancel: bool,
) -> ServiceResult<DeletionOutcome> {
    if allow_cancel && tree.event(key)?.is_exception() {
        cancel_exception(tree, key)?;
        Ok(DeletionOutcome::Cancelled)
    } else {
        hard_delete(tree, key)?;
        Ok(DeletionOutcome::Deleted)
    }
}

fn cancel_exception(tree: &mut EventTree, key: EventKey) -> CoreResult<()> {
    let event = tree.event(key)?;
    let parent = event.parent();
    let children = event.child_events().to_vec();
    let related = parent.and_then(|_| tree.related_attendee(key).cloned());

    tree.event_mut(key)?.cancelled = true;

    if let Some(parent) = parent {
        // The attendee declined this occurrence; drop them from the parent exception.
        if let Some(related) = related {
            tree.remove_attendee(parent, &related)?;
            tracing::debug!(
                event = %key,
                email = %related.email,
                "Detached related attendee from cancelled occurrence"
            );
        }
    } else {
        for child in children {
            tree.event_mut(child)?.cancelled = true;
        }
    }

    tracing::debug!(event = %key, "Cancelled exception");
    Ok(())
}

/// ## Summary
/// Removes an event, its children, its exceptions and the exceptions of
/// each child, leaving no exception pointing at a removed master.
///
/// ## Errors
/// Returns an error if the event is missing.
pub fn hard_delete(tree: &mut EventTree, key: EventKey) -> CoreResult<()> {
    let children = tree.event(key)?.child_events().to_vec();
    for child in children {
        remove_exceptions(tree, child)?;
    }
    remove_exceptions(tree, key)?;
    tree.remove(key)?;
    Ok(())
}

/// ## Summary
/// Hard-deletes every exception of an event.
///
/// ## Errors
/// Returns an error if the event is missing.
pub fn remove_exceptions(tree: &mut EventTree, key: EventKey) -> CoreResult<usize> {
    let exceptions = tree.event(key)?.exceptions().to_vec();
    let mut removed = 0;
    for exception in exceptions {
        // Removing a master exception also removes its children, which may
        // have been listed on this event.
        if tree.contains(exception) {
            hard_delete(tree, exception)?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
#[path = "deletion_tests.rs"]
mod tests;
