use cadence_test::model::{Event, EventKey, EventTree, RemovedEntity};
use cadence_test::recurrence::{DayOfWeek, Recurrence, RecurrenceType};
use cadence_test::service::calendar::manager::on_event_update;
use cadence_test::{ALICE, BOB, CAROL, OWNER, Organization, acme, utc};

pub(crate) fn weekly_planning(org: &Organization) -> Event {
    let start = utc("2016-04-25T10:00:00Z");
    org.event_for(OWNER, "Planning", start, utc("2016-04-25T11:00:00Z"))
        .with_id(1)
        .with_recurrence(
            Recurrence::new(RecurrenceType::Weekly, 1, start, "Europe/Berlin")
                .with_days([DayOfWeek::Monday]),
        )
        .with_attendees([
            org.invite(OWNER),
            org.invite(ALICE),
            org.invite(BOB),
            org.invite(CAROL),
        ])
}

pub(crate) fn child_owners(tree: &EventTree, parent: EventKey) -> Vec<i64> {
    let mut owners: Vec<i64> = tree
        .event(parent)
        .expect("parent exists")
        .child_events()
        .iter()
        .filter_map(|child| tree.event(*child).ok()?.calendar_owner_id())
        .map(|owner| owner.0)
        .collect();
    owners.sort_unstable();
    owners
}

/// Master plus a new, attendee-less exception on 2016-05-02, both reconciled.
pub(crate) fn reconciled_series(org: &Organization, tree: &mut EventTree) -> (EventKey, EventKey) {
    let directory = org.directory();
    let master = tree.insert(weekly_planning(org));
    on_event_update(tree, master, &EventTree::new(), org.id, &directory, true)
        .expect("master reconciles");

    let original_start = utc("2016-05-02T10:00:00Z");
    let mut exception = org.event_for(
        OWNER,
        "Planning",
        utc("2016-05-02T14:00:00Z"),
        utc("2016-05-02T15:00:00Z"),
    );
    exception.original_start = Some(original_start);
    let exception = tree.insert(exception);
    tree.set_recurring_event(exception, Some(master))
        .expect("exception links");
    on_event_update(tree, exception, &EventTree::new(), org.id, &directory, true)
        .expect("exception reconciles");

    (master, exception)
}

#[test_log::test]
fn new_series_reaches_every_reachable_attendee() {
    let org = acme();
    let mut tree = EventTree::new();
    let (master, exception) = reconciled_series(&org, &mut tree);

    let attendees = tree.attendees(master).expect("attendees");
    assert!(attendees.iter().all(|attendee| attendee.user.is_some()));
    assert_eq!(attendees[1].display_name, "Alice Tester");

    assert_eq!(child_owners(&tree, master), vec![ALICE, BOB]);
    assert_eq!(child_owners(&tree, exception), vec![ALICE, BOB]);

    let alice_master_copy = tree
        .child_event_by_calendar(master, org.calendar(ALICE).id)
        .expect("alice copy");
    let alice_exception_copy = tree
        .child_event_by_calendar(exception, org.calendar(ALICE).id)
        .expect("alice exception copy");
    let copy = tree.event(alice_exception_copy).expect("copy");
    assert_eq!(copy.recurring_event(), Some(alice_master_copy));
    assert_eq!(copy.start, utc("2016-05-02T14:00:00Z"));
    assert_eq!(copy.original_start, Some(utc("2016-05-02T10:00:00Z")));

    tree.validate().expect("tree is consistent");
}

#[test_log::test]
fn reconciling_twice_changes_nothing() {
    let org = acme();
    let mut tree = EventTree::new();
    let (master, _) = reconciled_series(&org, &mut tree);
    let before = tree.len();

    let original = tree.clone();
    on_event_update(&mut tree, master, &original, org.id, &org.directory(), true)
        .expect("master reconciles");

    assert_eq!(tree.len(), before);
    assert!(tree.removed().is_empty());
}

#[test_log::test]
fn removed_attendee_loses_every_copy() {
    let org = acme();
    let mut tree = EventTree::new();
    let (master, exception) = reconciled_series(&org, &mut tree);
    tree.update_attendees(master, |attendees| {
        for (attendee, id) in attendees.iter_mut().zip(11..) {
            attendee.id = Some(id);
        }
    })
    .expect("master accepts attendees");
    let original = tree.clone();

    tree.event_mut(master).expect("master").title = "Planning (moved room)".to_string();
    let bob = tree.attendees(master).expect("attendees")[2].clone();
    tree.remove_attendee(master, &bob)
        .expect("master accepts removal");
    on_event_update(&mut tree, master, &original, org.id, &org.directory(), true)
        .expect("master reconciles");

    assert_eq!(child_owners(&tree, master), vec![ALICE]);
    assert_eq!(child_owners(&tree, exception), vec![ALICE]);
    assert_eq!(
        tree.event(exception).expect("exception").title,
        "Planning (moved room)"
    );
    assert_eq!(
        tree.removed(),
        &[RemovedEntity::Attendee {
            id: 13,
            event: Some(1)
        }]
    );
    assert!(tree.event(master).expect("master").updated_at.is_some());
    tree.validate().expect("tree is consistent");
}

#[test_log::test]
fn added_attendee_gets_a_copy_of_every_occurrence() {
    let org = acme().with_member(5, "Dave", true);
    let mut tree = EventTree::new();
    let (master, exception) = reconciled_series(&org, &mut tree);
    let original = tree.clone();

    tree.add_attendee(master, org.invite(5))
        .expect("master accepts attendees");
    on_event_update(&mut tree, master, &original, org.id, &org.directory(), true)
        .expect("master reconciles");

    assert_eq!(child_owners(&tree, master), vec![ALICE, BOB, 5]);
    assert_eq!(child_owners(&tree, exception), vec![ALICE, BOB, 5]);
    let dave_calendar = org.calendar(5).id;
    let dave_series = tree
        .child_event_by_calendar(master, dave_calendar)
        .expect("dave copy");
    let dave_exception = tree
        .child_event_by_calendar(exception, dave_calendar)
        .expect("dave exception copy");
    let copy = tree.event(dave_exception).expect("copy");
    assert_eq!(copy.recurring_event(), Some(dave_series));
    assert_eq!(copy.start, utc("2016-05-02T14:00:00Z"));
    tree.validate().expect("tree is consistent");
}

#[test_log::test]
fn changed_schedule_drops_all_exceptions() {
    let org = acme();
    let mut tree = EventTree::new();
    let (master, exception) = reconciled_series(&org, &mut tree);
    let original = tree.clone();

    if let Some(recurrence) = tree.event_mut(master).expect("master").recurrence.as_mut() {
        recurrence.interval = 2;
    }
    on_event_update(&mut tree, master, &original, org.id, &org.directory(), true)
        .expect("master reconciles");

    assert!(!tree.contains(exception));
    assert_eq!(tree.len(), 3);
    for child in tree.event(master).expect("master").child_events() {
        assert!(tree.event(*child).expect("child").exceptions().is_empty());
    }
    tree.validate().expect("tree is consistent");
}
