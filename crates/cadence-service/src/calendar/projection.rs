//! ## Summary
//! Occurrence projection for display.
//!
//! Turns the rows a repository returns for a window into the list a calendar
//! view shows: regular events as they are, recurring masters expanded into
//! occurrences, and exceptions substituted for the occurrence they replace.

use cadence_core::error::CoreResult;
use cadence_core::types::UserId;
use cadence_model::{Attendee, EventKey, EventTree};
use cadence_recurrence::Recurrence;
use cadence_recurrence::recurrence::{
    ExpansionOptions, occurrence_end, occurrences_with_options, resolve_timezone,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServiceResult;

/// Event record as exchanged with the repository and the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRow {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub uid: Option<uuid::Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default)]
    pub original_start: Option<DateTime<Utc>>,
    #[serde(default, rename = "isCancelled")]
    pub cancelled: bool,
    #[serde(default)]
    pub recurring_event_id: Option<i64>,
    #[serde(default)]
    pub is_organizer: Option<bool>,
    #[serde(default)]
    pub organizer_email: Option<String>,
    #[serde(default)]
    pub organizer_display_name: Option<String>,
    #[serde(default)]
    pub organizer_user_id: Option<UserId>,
}

/// Role of a row within a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Regular,
    Exception,
    RecurringMaster,
}

impl EventRow {
    /// ## Summary
    /// Builds the record of an event in the tree, with the logical attendee
    /// list and recurrence (the parent's for a child) and the persisted id of
    /// its recurring master.
    ///
    /// ## Errors
    /// Returns `CoreError::NotFound` if the event or its parent is missing.
    pub fn from_event(tree: &EventTree, key: EventKey) -> CoreResult<Self> {
        let event = tree.event(key)?;
        let recurring_event_id = event
            .recurring_event()
            .and_then(|master| tree.get(master))
            .and_then(|master| master.id);
        let recurrence = tree.event(tree.master_of(key)?)?.recurrence.clone();

        Ok(Self {
            id: event.id,
            uid: Some(event.uid),
            title: event.title.clone(),
            description: event.description.clone(),
            start: event.start,
            end: event.end,
            all_day: event.all_day,
            background_color: event.background_color.clone(),
            recurrence,
            attendees: tree.attendees(key)?.to_vec(),
            original_start: event.original_start,
            cancelled: event.cancelled,
            recurring_event_id,
            is_organizer: event.organizer.is_organizer,
            organizer_email: event.organizer.email.clone(),
            organizer_display_name: event.organizer.display_name.clone(),
            organizer_user_id: event.organizer.user,
        })
    }

    /// Rows with a recurrence are masters, rows pointing at a master with an
    /// original start are exceptions; anything else is shown as is.
    #[must_use]
    pub fn kind(&self) -> RowKind {
        match (&self.recurrence, self.recurring_event_id, self.original_start) {
            (Some(_), None, _) => RowKind::RecurringMaster,
            (None, Some(_), Some(_)) => RowKind::Exception,
            _ => RowKind::Regular,
        }
    }

    fn occurrence(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            ..self.clone()
        }
    }
}

/// ## Summary
/// Projects rows onto the window with the default expansion options.
///
/// ## Errors
/// Returns an error if a master's recurrence cannot be expanded.
pub fn project(
    rows: Vec<EventRow>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> ServiceResult<Vec<EventRow>> {
    project_with_options(rows, window_start, window_end, ExpansionOptions::default())
}

/// ## Summary
/// Merges regular rows, expanded occurrences of recurring masters and
/// exceptions into one list ordered by start.
///
/// Each occurrence is replaced by the exception of the same master whose
/// original start matches it to the second, or dropped when that exception
/// is cancelled. Exceptions matching no occurrence are kept as they are.
/// Occurrence ends keep the master's wall-clock duration in the
/// recurrence's timezone.
///
/// ## Errors
/// Returns an error if a master's recurrence cannot be expanded.
#[tracing::instrument(skip(rows, options), fields(rows = rows.len()))]
pub fn project_with_options(
    rows: Vec<EventRow>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    options: ExpansionOptions,
) -> ServiceResult<Vec<EventRow>> {
    let mut output = Vec::new();
    let mut masters = Vec::new();
    let mut exceptions = Vec::new();
    for row in rows {
        match row.kind() {
            RowKind::Regular => output.push(row),
            RowKind::RecurringMaster => masters.push(row),
            RowKind::Exception => exceptions.push(row),
        }
    }

    let mut matched = vec![false; exceptions.len()];
    for master in &masters {
        let Some(recurrence) = &master.recurrence else {
            continue;
        };
        let tz = resolve_timezone(&recurrence.timezone)?;
        let duration = master.end - master.start;

        for start in occurrences_with_options(recurrence, window_start, window_end, options)? {
            let substitute = exceptions.iter().enumerate().position(|(index, exception)| {
                !matched[index]
                    && master.id.is_some()
                    && exception.recurring_event_id == master.id
                    && exception
                        .original_start
                        .is_some_and(|original| original.timestamp() == start.timestamp())
            });

            match substitute {
                Some(index) => {
                    matched[index] = true;
                    if !exceptions[index].cancelled {
                        output.push(exceptions[index].clone());
                    }
                }
                None => {
                    output.push(master.occurrence(start, occurrence_end(start, duration, tz)));
                }
            }
        }
    }

    let unmatched = exceptions
        .into_iter()
        .zip(matched)
        .filter(|(_, matched)| !matched)
        .map(|(exception, _)| exception);
    output.extend(unmatched);

    output.sort_by_key(|row| row.start);
    tracing::debug!(count = output.len(), masters = masters.len(), "Projected events");
    Ok(output)
}

#[cfg(test)]
#[path = "projection_tests.rs"]
mod tests;
