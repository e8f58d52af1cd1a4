//! ## Summary
//! Attendee binding, defaults and collection equality.

use cadence_core::types::OrganizationId;
use cadence_model::{Attendee, AttendeeStatus, AttendeeType, EventKey, EventTree, User};

use crate::directory::Directory;
use crate::error::ServiceResult;

/// ## Summary
/// Binds the unbound attendees of a master event to organization members
/// matched by email. A matched attendee with a blank display name takes the
/// member's full name. Unmatched attendees keep their literal values.
///
/// Children hold no attendees, so nothing happens for them.
///
/// ## Errors
/// Returns an error if the event is missing or a directory lookup fails.
#[tracing::instrument(skip(tree, directory))]
pub fn bind_attendees<D>(
    tree: &mut EventTree,
    key: EventKey,
    organization: OrganizationId,
    directory: &D,
) -> ServiceResult<()>
where
    D: Directory + ?Sized,
{
    let event = tree.event(key)?;
    if event.is_child() {
        return Ok(());
    }

    let mut resolved: Vec<(usize, User)> = Vec::new();
    for (index, attendee) in event.own_attendees().iter().enumerate() {
        if attendee.user.is_some() || attendee.email.trim().is_empty() {
            continue;
        }
        match directory.find_user_by_email(organization, &attendee.email)? {
            Some(user) => resolved.push((index, user)),
            None => tracing::warn!(
                email = %attendee.email,
                "No organization member matches attendee, keeping it unbound"
            ),
        }
    }

    if resolved.is_empty() {
        return Ok(());
    }

    tree.update_attendees(key, |attendees| {
        for (index, user) in resolved {
            if let Some(attendee) = attendees.get_mut(index) {
                attendee.user = Some(user.id);
                if attendee.display_name.trim().is_empty() {
                    attendee.display_name = user.full_name();
                }
                tracing::debug!(email = %attendee.email, user = %user.id, "Bound attendee to user");
            }
        }
    })?;
    Ok(())
}

/// ## Summary
/// Fills missing attendee status and type on a master event.
///
/// Status defaults to `none`; type defaults to `organizer` for the calendar
/// owner and `required` for everyone else.
///
/// ## Errors
/// Returns an error if the event is missing.
pub fn apply_attendee_defaults(tree: &mut EventTree, key: EventKey) -> ServiceResult<()> {
    let event = tree.event(key)?;
    if event.is_child() {
        return Ok(());
    }
    let owner = event.calendar_owner_id();

    tree.update_attendees(key, |attendees| {
        for attendee in attendees.iter_mut() {
            if attendee.status.is_none() {
                attendee.status = Some(AttendeeStatus::None);
            }
            if attendee.attendee_type.is_none() {
                let is_owner = owner.is_some() && attendee.user == owner;
                attendee.attendee_type = Some(if is_owner {
                    AttendeeType::Organizer
                } else {
                    AttendeeType::Required
                });
            }
        }
    })?;
    Ok(())
}

/// The attendee whose user owns the event's calendar, recomputed on each call.
#[must_use]
pub fn find_related_attendee(tree: &EventTree, key: EventKey) -> Option<&Attendee> {
    tree.related_attendee(key)
}

/// ## Summary
/// Collection equality: same size, and pairwise equal once both sides are
/// sorted by email.
#[must_use]
pub fn has_equal_attendees(a: &[Attendee], b: &[Attendee]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let a = sorted_by_email(a);
    let b = sorted_by_email(b);
    a.iter().zip(&b).all(|(left, right)| left.is_equal(right))
}

/// True if `attendees` holds an attendee equal to `attendee`.
#[must_use]
pub fn contains_attendee(attendees: &[Attendee], attendee: &Attendee) -> bool {
    attendees.iter().any(|candidate| candidate.is_equal(attendee))
}

fn sorted_by_email(attendees: &[Attendee]) -> Vec<&Attendee> {
    let mut sorted: Vec<&Attendee> = attendees.iter().collect();
    sorted.sort_by(|left, right| {
        left.email
            .to_lowercase()
            .cmp(&right.email.to_lowercase())
            .then_with(|| left.display_name.cmp(&right.display_name))
    });
    sorted
}

#[cfg(test)]
#[path = "attendee_tests.rs"]
mod tests;
