use chrono::{DateTime, TimeDelta, Utc};

use cadence_core::types::UserId;
use cadence_test::model::{Event, EventKey, EventTree};
use cadence_test::service::calendar::deletion::{DeletionOutcome, delete_or_cancel};
use cadence_test::service::calendar::projection::{EventRow, project};
use cadence_test::{ALICE, OWNER, acme, utc};

use crate::reconciliation::reconciled_series;

/// Rows of one user's calendar as the repository would hand them back.
fn calendar_rows(tree: &EventTree, owner: i64) -> Vec<EventRow> {
    let rows: Vec<EventRow> = tree
        .keys()
        .filter(|key| {
            tree.event(*key).ok().and_then(Event::calendar_owner_id) == Some(UserId(owner))
        })
        .map(|key| EventRow::from_event(tree, key).expect("row builds"))
        .collect();
    let json = serde_json::to_string(&rows).expect("rows serialize");
    serde_json::from_str(&json).expect("rows deserialize")
}

fn starts(rows: &[EventRow]) -> Vec<DateTime<Utc>> {
    rows.iter().map(|row| row.start).collect()
}

fn assign_id(tree: &mut EventTree, key: EventKey, id: i64) {
    tree.event_mut(key).expect("event exists").id = Some(id);
}

#[test_log::test]
fn organizer_sees_moved_occurrence() {
    let org = acme();
    let mut tree = EventTree::new();
    reconciled_series(&org, &mut tree);

    let projected = project(
        calendar_rows(&tree, OWNER),
        utc("2016-04-25T00:00:00Z"),
        utc("2016-05-10T00:00:00Z"),
    )
    .expect("projects");

    assert_eq!(
        starts(&projected),
        vec![
            utc("2016-04-25T10:00:00Z"),
            utc("2016-05-02T14:00:00Z"),
            utc("2016-05-09T10:00:00Z"),
        ]
    );
    assert_eq!(projected[1].original_start, Some(utc("2016-05-02T10:00:00Z")));
    assert!(projected.iter().all(|row| row.title == "Planning"));
}

#[test_log::test]
fn attendee_copy_expands_like_the_series() {
    let org = acme();
    let mut tree = EventTree::new();
    let (master, exception) = reconciled_series(&org, &mut tree);
    let alice_calendar = org.calendar(ALICE).id;
    let master_copy = tree
        .child_event_by_calendar(master, alice_calendar)
        .expect("alice copy");
    let exception_copy = tree
        .child_event_by_calendar(exception, alice_calendar)
        .expect("alice exception copy");
    assign_id(&mut tree, master_copy, 21);
    assign_id(&mut tree, exception_copy, 22);

    let rows = calendar_rows(&tree, ALICE);
    assert!(rows.iter().all(|row| row.is_organizer == Some(false)));
    assert_eq!(rows.iter().filter(|row| row.recurrence.is_some()).count(), 1);

    let projected = project(rows, utc("2016-04-25T00:00:00Z"), utc("2016-05-10T00:00:00Z"))
        .expect("projects");

    assert_eq!(
        starts(&projected),
        vec![
            utc("2016-04-25T10:00:00Z"),
            utc("2016-05-02T14:00:00Z"),
            utc("2016-05-09T10:00:00Z"),
        ]
    );
    assert_eq!(projected[1].id, Some(22));
    assert_eq!(projected[0].attendees.len(), 4);
}

#[test_log::test]
fn series_keeps_local_time_across_autumn_change() {
    let org = acme();
    let mut tree = EventTree::new();
    let (master, _) = reconciled_series(&org, &mut tree);

    let row = EventRow::from_event(&tree, master).expect("row builds");
    let projected = project(
        vec![row],
        utc("2016-10-20T00:00:00Z"),
        utc("2016-11-01T00:00:00Z"),
    )
    .expect("projects");

    // Noon in Berlin on both sides of the change.
    assert_eq!(
        starts(&projected),
        vec![utc("2016-10-24T10:00:00Z"), utc("2016-10-31T11:00:00Z")]
    );
    assert!(
        projected
            .iter()
            .all(|row| row.end - row.start == TimeDelta::hours(1))
    );
}

#[test_log::test]
fn declined_occurrence_disappears_for_everyone() {
    let org = acme();
    let mut tree = EventTree::new();
    let (_, exception) = reconciled_series(&org, &mut tree);

    let outcome = delete_or_cancel(&mut tree, exception, true).expect("exception cancels");
    assert_eq!(outcome, DeletionOutcome::Cancelled);

    let projected = project(
        calendar_rows(&tree, OWNER),
        utc("2016-04-25T00:00:00Z"),
        utc("2016-05-10T00:00:00Z"),
    )
    .expect("projects");

    assert_eq!(
        starts(&projected),
        vec![utc("2016-04-25T10:00:00Z"), utc("2016-05-09T10:00:00Z")]
    );
}
