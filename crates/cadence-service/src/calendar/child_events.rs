//! ## Summary
//! Keeps the per-attendee copies of an event in step with it.
//!
//! Every bound attendee other than the calendar owner gets a child event on
//! their default calendar. Children mirror the parent's scalar fields, and
//! children of an exception are linked to the matching child of the series
//! master so each calendar holds a parallel set of exceptions.

use std::collections::HashSet;

use cadence_core::error::CoreResult;
use cadence_core::types::{OrganizationId, UserId};
use cadence_model::{Calendar, Event, EventCalendar, EventKey, EventTree, Organizer};

use super::deletion::hard_delete;
use crate::directory::Directory;
use crate::error::ServiceResult;

/// ## Summary
/// Creates missing children, removes children of attendees that left, and
/// copies the parent's fields into every remaining child.
///
/// A user without a default calendar is skipped with a warning.
///
/// ## Errors
/// Returns an error if a linked event is missing or a directory lookup fails.
#[tracing::instrument(skip(tree, directory))]
pub fn reconcile_child_events<D>(
    tree: &mut EventTree,
    parent: EventKey,
    organization: OrganizationId,
    directory: &D,
) -> ServiceResult<()>
where
    D: Directory + ?Sized,
{
    if tree.event(parent)?.is_child() {
        return Ok(());
    }

    let attendee_users = attendee_user_ids(tree, parent)?;
    let existing = existing_calendar_owners(tree, parent)?;

    for user in attendee_users.iter().filter(|user| !existing.contains(user)) {
        match directory.default_calendar(*user, organization)? {
            Some(calendar) => {
                create_child(tree, parent, calendar)?;
            }
            None => tracing::warn!(
                user = %user,
                "No default calendar for attendee, skipping child event"
            ),
        }
    }

    if is_new_exception_without_attendees(tree, parent)? {
        propagate_to_master_children(tree, parent)?;
    }

    if owns_attendee_list(tree.event(parent)?) {
        remove_stale_children(tree, parent, &attendee_users)?;
    }

    let children = tree.event(parent)?.child_events().to_vec();
    for child in children {
        mirror_parent(tree, parent, child)?;
    }
    Ok(())
}

/// Users of the attendees driving the children, in attendee order.
///
/// A cancelled exception may have lost its own attendees, so it follows the
/// series master instead.
fn attendee_user_ids(tree: &EventTree, parent: EventKey) -> CoreResult<Vec<UserId>> {
    let event = tree.event(parent)?;
    let source = match event.recurring_event() {
        Some(master) if event.cancelled => master,
        _ => parent,
    };

    let mut seen = HashSet::new();
    Ok(tree
        .attendees(source)?
        .iter()
        .filter_map(|attendee| attendee.user)
        .filter(|user| seen.insert(*user))
        .collect())
}

/// Owners of calendars already holding a copy, plus the parent's own owner.
fn existing_calendar_owners(tree: &EventTree, parent: EventKey) -> CoreResult<HashSet<UserId>> {
    let event = tree.event(parent)?;
    let mut owners: HashSet<UserId> = event.calendar_owner_id().into_iter().collect();
    for child in event.child_events() {
        if let Some(owner) = tree.event(*child)?.calendar_owner_id() {
            owners.insert(owner);
        }
    }
    Ok(owners)
}

/// Whether the parent's attendee list decides which children exist.
///
/// Exceptions that are cancelled or carry no attendees of their own inherit
/// membership from the series, so their children are never pruned here.
fn owns_attendee_list(event: &Event) -> bool {
    !event.is_exception() || (!event.cancelled && !event.own_attendees().is_empty())
}

fn is_new_exception_without_attendees(tree: &EventTree, key: EventKey) -> CoreResult<bool> {
    let event = tree.event(key)?;
    Ok(event.id.is_none() && event.is_exception() && event.own_attendees().is_empty())
}

/// ## Summary
/// Adds a child on `calendar` and links it into the parent's series.
///
/// ## Errors
/// Returns an error if the parent is missing or cannot own children.
pub fn create_child(
    tree: &mut EventTree,
    parent: EventKey,
    calendar: Calendar,
) -> CoreResult<EventKey> {
    let parent_event = tree.event(parent)?;
    let mut child = Event::new(
        parent_event.title.clone(),
        parent_event.start,
        parent_event.end,
    );
    child.cancelled = parent_event.cancelled;
    let calendar_id = calendar.id;
    child.set_calendar(calendar);

    let child = tree.insert(child);
    tree.add_child(parent, child)?;
    relink_master_exceptions(tree, parent, child)?;

    tracing::debug!(parent = %parent, child = %child, calendar = %calendar_id, "Created child event");
    Ok(child)
}

/// Points the children of the master's exceptions on the new child's
/// calendar at the new child.
fn relink_master_exceptions(
    tree: &mut EventTree,
    master: EventKey,
    new_child: EventKey,
) -> CoreResult<()> {
    let Some(calendar) = tree
        .event(new_child)?
        .calendar()
        .and_then(EventCalendar::personal_id)
    else {
        return Ok(());
    };

    let exceptions = tree.event(master)?.exceptions().to_vec();
    for exception in exceptions {
        if let Some(exception_child) = tree.child_event_by_calendar(exception, calendar) {
            tree.set_recurring_event(exception_child, Some(new_child))?;
        }
    }
    Ok(())
}

/// Gives a new exception without attendees a copy on every calendar that
/// holds a copy of the series.
fn propagate_to_master_children(tree: &mut EventTree, exception: EventKey) -> CoreResult<()> {
    let event = tree.event(exception)?;
    let Some(master) = event.recurring_event() else {
        return Ok(());
    };
    let owner = event.calendar_owner_id();

    let master_children = tree.event(master)?.child_events().to_vec();
    for master_child in master_children {
        let Some(calendar) = tree
            .event(master_child)?
            .calendar()
            .and_then(EventCalendar::personal)
            .cloned()
        else {
            continue;
        };
        let calendar_owner = calendar.owner.as_ref().map(|user| user.id);
        if tree.child_event_by_calendar(exception, calendar.id).is_some()
            || (owner.is_some() && calendar_owner == owner)
        {
            continue;
        }
        create_child(tree, exception, calendar)?;
    }
    Ok(())
}

/// Hard-deletes the children whose owner is no longer an attendee.
///
/// Cancelled children record an attendee's decline of one occurrence and are
/// kept; they go with the attendee's series copy when the attendee leaves the
/// master.
fn remove_stale_children(
    tree: &mut EventTree,
    parent: EventKey,
    attendee_users: &[UserId],
) -> CoreResult<()> {
    let children = tree.event(parent)?.child_events().to_vec();
    for child in children {
        let child_event = tree.event(child)?;
        if child_event.cancelled {
            continue;
        }
        let Some(owner) = child_event.calendar_owner_id() else {
            continue;
        };
        if !attendee_users.contains(&owner) {
            tracing::debug!(
                parent = %parent,
                child = %child,
                user = %owner,
                "Attendee removed, deleting child event"
            );
            hard_delete(tree, child)?;
        }
    }
    Ok(())
}

/// ## Summary
/// Overwrites the child's scalar fields with the parent's. Children of an
/// exception also follow the exception's original start and are linked to
/// the series master's child on the same calendar.
///
/// ## Errors
/// Returns an error if either event is missing.
pub fn mirror_parent(tree: &mut EventTree, parent: EventKey, child: EventKey) -> CoreResult<()> {
    let parent_event = tree.event(parent)?;
    let title = parent_event.title.clone();
    let description = parent_event.description.clone();
    let (start, end, all_day) = (parent_event.start, parent_event.end, parent_event.all_day);
    let organizer = Organizer {
        is_organizer: Some(false),
        ..parent_event.organizer.clone()
    };
    let series = parent_event
        .recurring_event()
        .map(|master| (master, parent_event.original_start));

    let child_event = tree.event_mut(child)?;
    child_event.title = title;
    child_event.description = description;
    child_event.start = start;
    child_event.end = end;
    child_event.all_day = all_day;
    child_event.organizer = organizer;

    let Some((master, original_start)) = series else {
        return Ok(());
    };
    child_event.original_start = original_start;
    let calendar = child_event.calendar().and_then(EventCalendar::personal_id);

    let sibling = calendar.and_then(|calendar| tree.child_event_by_calendar(master, calendar));
    match sibling {
        Some(sibling) => tree.set_recurring_event(child, Some(sibling))?,
        None => tracing::warn!(
            child = %child,
            master = %master,
            "No copy of the series on the child's calendar, leaving exception unlinked"
        ),
    }
    Ok(())
}

#[cfg(test)]
#[path = "child_events_tests.rs"]
mod tests;
