use cadence_core::types::{NotificationStrategy, UserId};
use cadence_test::model::{AttendeeStatus, EventTree};
use cadence_test::service::calendar::deletion::{DeletionOutcome, delete_or_cancel};
use cadence_test::service::calendar::manager::{change_status, on_event_update};
use cadence_test::service::notification::{
    NotificationDecision, NotificationKind, NotificationQueue, on_create, on_delete, on_update,
};
use cadence_test::{ALICE, BOB, CAROL, OWNER, acme};

use crate::reconciliation::weekly_planning;

const DEFAULT: NotificationStrategy = NotificationStrategy::AddedOrDeleted;

fn recipient_ids(decision: &NotificationDecision) -> Vec<i64> {
    decision
        .recipients
        .iter()
        .filter_map(|recipient| recipient.user_id)
        .map(|user| user.0)
        .collect()
}

#[test_log::test]
fn series_lifecycle_reaches_the_right_people() {
    let org = acme();
    let directory = org.directory();
    let mut tree = EventTree::new();
    let mut queue = NotificationQueue::new();

    let master = tree.insert(weekly_planning(&org));
    on_event_update(&mut tree, master, &EventTree::new(), org.id, &directory, true)
        .expect("master reconciles");
    on_create(&mut queue, &tree, master, DEFAULT).expect("create decides");

    let original = tree.clone();
    let bob = tree
        .attendees(master)
        .expect("attendees")
        .iter()
        .find(|attendee| attendee.user == Some(UserId(BOB)))
        .cloned()
        .expect("bob is invited");
    tree.remove_attendee(master, &bob)
        .expect("master accepts removal");
    on_event_update(&mut tree, master, &original, org.id, &directory, true)
        .expect("master reconciles");
    on_update(&mut queue, &tree, master, &original, DEFAULT).expect("update decides");

    let alice_copy = tree
        .child_event_by_calendar(master, org.calendar(ALICE).id)
        .expect("alice copy");
    change_status(
        &mut tree,
        alice_copy,
        AttendeeStatus::Declined,
        &mut queue,
        DEFAULT,
    )
    .expect("status changes");

    let mut outbox: Vec<NotificationDecision> = Vec::new();
    assert_eq!(queue.flush(&mut outbox).expect("flush succeeds"), 3);
    assert!(queue.is_empty());

    let kinds: Vec<NotificationKind> = outbox.iter().map(|decision| decision.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::Invite,
            NotificationKind::Uninvite,
            NotificationKind::StatusChanged {
                status: AttendeeStatus::Declined
            },
        ]
    );
    assert_eq!(recipient_ids(&outbox[0]), vec![ALICE, BOB, CAROL]);
    assert_eq!(recipient_ids(&outbox[1]), vec![BOB]);
    assert_eq!(recipient_ids(&outbox[2]), vec![OWNER]);
    assert!(outbox[..2].iter().all(|decision| decision.event_id == Some(1)));
    assert_eq!(outbox[2].event, alice_copy);

    let json = serde_json::to_value(&outbox).expect("decisions serialize");
    assert_eq!(json[0]["kind"], "invite");
    assert_eq!(json[0]["recipients"][0]["userId"], ALICE);
    assert_eq!(json[2]["kind"], "status_changed");
    assert_eq!(json[2]["status"], "declined");
}

#[test_log::test]
fn attendee_removing_their_copy_tells_the_organizer() {
    let org = acme();
    let mut tree = EventTree::new();
    let mut queue = NotificationQueue::new();
    let master = tree.insert(weekly_planning(&org));
    on_event_update(&mut tree, master, &EventTree::new(), org.id, &org.directory(), true)
        .expect("master reconciles");
    let bob_copy = tree
        .child_event_by_calendar(master, org.calendar(BOB).id)
        .expect("bob copy");

    on_delete(&mut queue, &tree, bob_copy, DEFAULT).expect("delete decides");
    let outcome = delete_or_cancel(&mut tree, bob_copy, true).expect("copy deleted");

    assert_eq!(outcome, DeletionOutcome::Deleted);
    assert!(!tree.contains(bob_copy));
    tree.validate().expect("tree is consistent");

    let decision = queue.pending().next().expect("one decision");
    assert_eq!(decision.kind, NotificationKind::ChildDeleted);
    assert_eq!(recipient_ids(decision), vec![OWNER]);
    assert_eq!(
        decision.subject.as_ref().and_then(|subject| subject.user_id),
        Some(UserId(BOB))
    );
}

#[test]
fn silent_strategy_queues_nothing() {
    let org = acme();
    let mut tree = EventTree::new();
    let mut queue = NotificationQueue::new();
    let master = tree.insert(weekly_planning(&org));
    on_event_update(&mut tree, master, &EventTree::new(), org.id, &org.directory(), true)
        .expect("master reconciles");

    on_create(&mut queue, &tree, master, NotificationStrategy::None).expect("create decides");
    on_delete(&mut queue, &tree, master, NotificationStrategy::None).expect("delete decides");

    assert!(queue.is_empty());
}
