use cadence_core::types::UserId;
use cadence_test::model::{EventKey, EventTree, RemovedEntity};
use cadence_test::service::calendar::deletion::{DeletionOutcome, delete_or_cancel};
use cadence_test::service::calendar::manager::on_event_update;
use cadence_test::{ALICE, BOB, OWNER, Organization, acme, utc};

use crate::reconciliation::weekly_planning;

/// Persisted series whose exception carries its own copy of the attendees.
fn persisted_series(org: &Organization, tree: &mut EventTree) -> (EventKey, EventKey) {
    let directory = org.directory();
    let master = tree.insert(weekly_planning(org));
    on_event_update(tree, master, &EventTree::new(), org.id, &directory, true)
        .expect("master reconciles");

    let mut exception = org.event_for(
        OWNER,
        "Planning",
        utc("2016-05-02T10:00:00Z"),
        utc("2016-05-02T12:00:00Z"),
    );
    exception.original_start = Some(utc("2016-05-02T10:00:00Z"));
    let exception = tree.insert(exception.with_id(2));
    tree.set_recurring_event(exception, Some(master))
        .expect("exception links");
    let attendees = tree.attendees(master).expect("attendees").to_vec();
    tree.set_attendees(exception, attendees)
        .expect("exception accepts attendees");
    on_event_update(tree, exception, &EventTree::new(), org.id, &directory, true)
        .expect("exception reconciles");

    tree.take_removed();
    (master, exception)
}

fn copy_of(org: &Organization, tree: &EventTree, parent: EventKey, user: i64) -> EventKey {
    tree.child_event_by_calendar(parent, org.calendar(user).id)
        .expect("copy exists")
}

fn invites(tree: &EventTree, key: EventKey, user: i64) -> bool {
    tree.attendees(key)
        .expect("attendees")
        .iter()
        .any(|attendee| attendee.user == Some(UserId(user)))
}

#[test_log::test]
fn declining_one_occurrence_detaches_only_that_attendee() {
    let org = acme();
    let mut tree = EventTree::new();
    let (master, exception) = persisted_series(&org, &mut tree);
    let alice_copy = copy_of(&org, &tree, exception, ALICE);
    let bob_copy = copy_of(&org, &tree, exception, BOB);

    let outcome = delete_or_cancel(&mut tree, alice_copy, true).expect("copy cancels");

    assert_eq!(outcome, DeletionOutcome::Cancelled);
    assert!(tree.event(alice_copy).expect("copy").cancelled);
    assert!(!tree.event(bob_copy).expect("copy").cancelled);
    assert!(!tree.event(exception).expect("exception").cancelled);
    assert!(!invites(&tree, exception, ALICE));
    assert!(invites(&tree, exception, BOB));
    assert!(invites(&tree, master, ALICE));
    tree.validate().expect("tree is consistent");
}

#[test_log::test]
fn declined_occurrence_stays_declined_when_the_occurrence_changes() {
    let org = acme();
    let mut tree = EventTree::new();
    let (_, exception) = persisted_series(&org, &mut tree);
    let alice_copy = copy_of(&org, &tree, exception, ALICE);
    delete_or_cancel(&mut tree, alice_copy, true).expect("copy cancels");
    let original = tree.clone();

    tree.event_mut(exception).expect("exception").title = "Planning (room 2)".to_string();
    on_event_update(&mut tree, exception, &original, org.id, &org.directory(), true)
        .expect("exception reconciles");

    let copy = tree.event(alice_copy).expect("declined copy is kept");
    assert!(copy.cancelled);
    assert_eq!(copy.title, "Planning (room 2)");
    assert_eq!(copy_of(&org, &tree, exception, ALICE), alice_copy);
    assert!(!invites(&tree, exception, ALICE));
    assert!(tree.removed().is_empty());
    tree.validate().expect("tree is consistent");
}

#[test_log::test]
fn cancelling_the_occurrence_cancels_every_copy() {
    let org = acme();
    let mut tree = EventTree::new();
    let (_, exception) = persisted_series(&org, &mut tree);

    let outcome = delete_or_cancel(&mut tree, exception, true).expect("exception cancels");

    assert_eq!(outcome, DeletionOutcome::Cancelled);
    let event = tree.event(exception).expect("exception");
    assert!(event.cancelled);
    assert_eq!(event.child_events().len(), 2);
    for child in event.child_events() {
        assert!(tree.event(*child).expect("copy").cancelled);
    }
    assert!(tree.removed().is_empty());
}

#[test_log::test]
fn deleting_the_series_leaves_nothing_behind() {
    let org = acme();
    let mut tree = EventTree::new();
    let (master, _) = persisted_series(&org, &mut tree);

    let outcome = delete_or_cancel(&mut tree, master, true).expect("series deletes");

    assert_eq!(outcome, DeletionOutcome::Deleted);
    assert!(tree.is_empty());
    let mut removed_events: Vec<i64> = tree
        .removed()
        .iter()
        .filter_map(|removed| match removed {
            RemovedEntity::Event { id, .. } => Some(*id),
            RemovedEntity::Attendee { .. } => None,
        })
        .collect();
    removed_events.sort_unstable();
    assert_eq!(removed_events, vec![1, 2]);
}

#[test]
fn exception_is_deleted_when_cancelling_is_not_allowed() {
    let org = acme();
    let mut tree = EventTree::new();
    let (master, exception) = persisted_series(&org, &mut tree);

    let outcome = delete_or_cancel(&mut tree, exception, false).expect("exception deletes");

    assert_eq!(outcome, DeletionOutcome::Deleted);
    assert!(!tree.contains(exception));
    assert!(tree.event(master).expect("master").exceptions().is_empty());
    for child in tree.event(master).expect("master").child_events() {
        assert!(tree.event(*child).expect("copy").exceptions().is_empty());
    }
    assert_eq!(tree.len(), 3);
    tree.validate().expect("tree is consistent");
}
