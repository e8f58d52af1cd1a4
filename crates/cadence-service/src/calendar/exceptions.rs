//! ## Summary
//! Reconciles the exceptions of a series after its master changed.
//!
//! A changed schedule invalidates every exception. Otherwise each exception
//! picks up the master's new values for the fields it had not overridden,
//! and master-level exceptions follow attendee changes they had not
//! overridden either. Children hold parallel exception sets and are processed
//! against the same original master.

use cadence_core::error::CoreResult;
use cadence_model::{Attendee, Event, EventKey, EventTree};
use cadence_recurrence::recurrence::is_equal;

use super::attendee::{contains_attendee, has_equal_attendees};
use super::deletion::remove_exceptions;
use crate::error::ServiceResult;

/// Value of a synchronized field, compared between event versions.
#[derive(Debug, PartialEq, Eq)]
enum FieldValue<'a> {
    Text(&'a str),
    OptionalText(Option<&'a str>),
    Flag(bool),
}

/// A field exceptions inherit from their master unless they override it.
struct SyncedField {
    name: &'static str,
    value: fn(&Event) -> FieldValue<'_>,
    copy: fn(&mut Event, &Event),
}

const SYNCED_FIELDS: [SyncedField; 4] = [
    SyncedField {
        name: "title",
        value: title,
        copy: copy_title,
    },
    SyncedField {
        name: "description",
        value: description,
        copy: copy_description,
    },
    SyncedField {
        name: "all_day",
        value: all_day,
        copy: copy_all_day,
    },
    SyncedField {
        name: "background_color",
        value: background_color,
        copy: copy_background_color,
    },
];

fn title(event: &Event) -> FieldValue<'_> {
    FieldValue::Text(&event.title)
}

fn copy_title(target: &mut Event, source: &Event) {
    target.title.clone_from(&source.title);
}

fn description(event: &Event) -> FieldValue<'_> {
    FieldValue::OptionalText(event.description.as_deref())
}

fn copy_description(target: &mut Event, source: &Event) {
    target.description.clone_from(&source.description);
}

fn all_day(event: &Event) -> FieldValue<'_> {
    FieldValue::Flag(event.all_day)
}

fn copy_all_day(target: &mut Event, source: &Event) {
    target.all_day = source.all_day;
}

fn background_color(event: &Event) -> FieldValue<'_> {
    FieldValue::OptionalText(event.background_color.as_deref())
}

fn copy_background_color(target: &mut Event, source: &Event) {
    target.background_color.clone_from(&source.background_color);
}

/// ## Summary
/// True when the exceptions of `actual` no longer describe its series: the
/// recurrence was removed or changed, or the start or end moved (compared to
/// the second).
#[must_use]
pub fn should_clear_exceptions(actual: &Event, original: &Event) -> bool {
    let recurrence_removed = original.recurrence.is_some() && actual.recurrence.is_none();
    recurrence_removed
        || !is_equal(actual.recurrence.as_ref(), original.recurrence.as_ref())
        || actual.start.timestamp() != original.start.timestamp()
        || actual.end.timestamp() != original.end.timestamp()
}

/// ## Summary
/// Reconciles the exceptions of a master and of each of its children with
/// the master's update. Events absent from `original` are new and have
/// nothing to reconcile.
///
/// Returns the exceptions whose attendee list changed; their per-attendee
/// copies still have to be reconciled.
///
/// ## Errors
/// Returns an error if a linked event is missing.
#[tracing::instrument(skip(tree, original))]
pub fn reconcile_exceptions(
    tree: &mut EventTree,
    key: EventKey,
    original: &EventTree,
) -> ServiceResult<Vec<EventKey>> {
    let mut changed = Vec::new();
    let Some(original_event) = original.get(key) else {
        return Ok(changed);
    };
    let actual_event = tree.event(key)?.clone();
    if actual_event.is_child() {
        return Ok(changed);
    }

    let targets: Vec<EventKey> = std::iter::once(key)
        .chain(actual_event.child_events().iter().copied())
        .collect();

    if should_clear_exceptions(&actual_event, original_event) {
        for target in targets {
            if tree.contains(target) {
                let removed = remove_exceptions(tree, target)?;
                tracing::debug!(event = %target, removed, "Cleared exceptions");
            }
        }
        return Ok(changed);
    }

    let actual_attendees = tree.attendees(key)?.to_vec();
    let original_attendees = original.attendees(key)?;

    for target in targets {
        let exceptions = tree.event(target)?.exceptions().to_vec();
        for exception in exceptions {
            sync_fields(tree, exception, &actual_event, original_event)?;
            if !tree.event(exception)?.is_child()
                && sync_attendees(tree, exception, &actual_attendees, original_attendees)?
            {
                changed.push(exception);
            }
        }
    }
    Ok(changed)
}

/// Copies every synchronized field the exception still shares with the
/// original master.
fn sync_fields(
    tree: &mut EventTree,
    exception: EventKey,
    actual: &Event,
    original: &Event,
) -> CoreResult<()> {
    let exception_event = tree.event_mut(exception)?;
    for field in &SYNCED_FIELDS {
        if (field.value)(exception_event) == (field.value)(original) {
            (field.copy)(exception_event, actual);
        } else {
            tracing::trace!(exception = %exception, field = field.name, "Keeping overridden field");
        }
    }
    Ok(())
}

/// Applies master attendee changes to an exception that had not overridden
/// its attendee list. Returns whether the exception changed.
fn sync_attendees(
    tree: &mut EventTree,
    exception: EventKey,
    actual: &[Attendee],
    original: &[Attendee],
) -> CoreResult<bool> {
    let own = tree.event(exception)?.own_attendees();
    if !has_equal_attendees(own, original) {
        return Ok(false);
    }
    if has_equal_attendees(actual, original) {
        return Ok(false);
    }

    tree.update_attendees(exception, |attendees| {
        attendees.retain_mut(|attendee| {
            match actual.iter().find(|candidate| candidate.is_equal(attendee)) {
                Some(current) => {
                    attendee.status = current.status;
                    true
                }
                None => false,
            }
        });
        for current in actual {
            if !contains_attendee(attendees, current) {
                attendees.push(current.copy_for_exception());
            }
        }
    })?;

    tracing::debug!(exception = %exception, "Propagated attendee changes to exception");
    Ok(true)
}

#[cfg(test)]
#[path = "exceptions_tests.rs"]
mod tests;
