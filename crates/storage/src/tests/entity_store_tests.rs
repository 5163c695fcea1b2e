use super::*;
use chrono::TimeZone;
use shared::{
    clock::ManualClock,
    domain::{ActivityKind, ContactStatus, UserId},
};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

fn seeded_store() -> (EntityStore, ManualClock) {
    let clock = ManualClock::new(start());
    (EntityStore::seeded(Arc::new(clock.clone())), clock)
}

fn new_contact(name: &str) -> NewContact {
    NewContact {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: "(555) 000-0000".into(),
        company: "Initech".into(),
        position: "Engineer".into(),
        status: ContactStatus::Lead,
        tags: vec!["tech".into()],
        assigned_to: UserId(1),
        last_contacted: start(),
    }
}

fn new_deal(name: &str, stage: &str) -> NewDeal {
    NewDeal {
        name: name.to_string(),
        value: 10_000,
        stage: StageId::from(stage),
        probability: 50,
        expected_close_date: start(),
        contacts: Vec::new(),
        assigned_to: UserId(1),
        notes: String::new(),
    }
}

#[test]
fn seeded_store_orders_stages_and_loads_demo_data() {
    let (store, _) = seeded_store();
    let ids: Vec<&str> = store.stages().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(
        ids,
        ["lead", "qualified", "proposal", "negotiation", "closed", "lost"]
    );
    assert_eq!(store.contacts().len(), 3);
    assert_eq!(store.deals().len(), 5);
    assert_eq!(store.activities().len(), 3);
}

#[test]
fn new_sorts_stages_by_order() {
    let clock = ManualClock::new(start());
    let mut stages = seed::stages();
    stages.reverse();
    let store = EntityStore::new(stages, Arc::new(clock)).expect("store");
    assert_eq!(store.stages()[0].id.as_str(), "lead");
    assert_eq!(store.stages()[5].id.as_str(), "lost");
}

#[test]
fn new_rejects_duplicate_stage_order() {
    let mut stages = seed::stages();
    stages[1].order = stages[0].order;
    let err = EntityStore::new(stages, Arc::new(ManualClock::new(start())))
        .err()
        .expect("duplicate order rejected");
    assert!(matches!(err, CrmError::Validation(_)));
}

#[test]
fn new_rejects_duplicate_stage_id() {
    let mut stages = seed::stages();
    stages[2].id = StageId::from("lead");
    let err = EntityStore::new(stages, Arc::new(ManualClock::new(start())))
        .err()
        .expect("duplicate id rejected");
    assert!(matches!(err, CrmError::Validation(_)));
}

#[test]
fn add_then_update_contact_only_changes_patched_field() {
    let (mut store, _) = seeded_store();
    let input = new_contact("Dana");
    let created = store.add_contact(input.clone());

    store
        .update_contact(created.id, ContactPatch::default().status(ContactStatus::Customer))
        .expect("update");

    let read = store.contact(created.id).expect("contact").clone();
    let expected = Contact {
        id: created.id,
        name: input.name,
        email: input.email,
        phone: input.phone,
        company: input.company,
        position: input.position,
        status: ContactStatus::Customer,
        tags: input.tags,
        assigned_to: input.assigned_to,
        last_contacted: input.last_contacted,
        created_at: start(),
    };
    assert_eq!(read, expected);
}

#[test]
fn ids_stay_unique_when_clock_does_not_move() {
    let (mut store, _) = seeded_store();
    let first = store.add_contact(new_contact("Eve"));
    let second = store.add_contact(new_contact("Frank"));
    assert!(second.id.0 > first.id.0);
    assert_eq!(first.id.0, start().timestamp_millis());
}

#[test]
fn update_unknown_contact_is_not_found() {
    let (mut store, _) = seeded_store();
    let err = store
        .update_contact(ContactId(404), ContactPatch::default().name("Nobody"))
        .expect_err("unknown id");
    assert_eq!(err, CrmError::not_found("contact", 404));
}

#[test]
fn delete_reports_whether_anything_was_removed() {
    let (mut store, _) = seeded_store();
    let removed = store.delete_contact(ContactId(1)).expect("removed");
    assert_eq!(removed.name, "Alice Johnson");
    assert!(store.delete_contact(ContactId(1)).is_none());
    assert!(store.delete_deal(DealId(99)).is_none());
    assert!(store.delete_activity(ActivityId(99)).is_none());
}

#[test]
fn deleting_contact_leaves_referencing_deals_and_activities() {
    let (mut store, _) = seeded_store();
    store.delete_contact(ContactId(1));
    let acme = store.deal(DealId(1)).expect("deal kept");
    assert_eq!(acme.contacts, vec![ContactId(1)]);
}

#[test]
fn move_deal_sets_stage_and_advances_updated_at() {
    let (mut store, clock) = seeded_store();
    let before = store.deal(DealId(3)).expect("deal").updated_at;

    clock.advance(TimeDelta::seconds(30));
    let moved = store
        .move_deal(DealId(3), &StageId::from("proposal"))
        .expect("move");

    assert_eq!(moved.stage.as_str(), "proposal");
    assert!(moved.updated_at > before);
    assert_eq!(store.deal(DealId(3)).expect("deal"), &moved);
}

#[test]
fn repeated_moves_within_one_instant_still_advance_updated_at() {
    let (mut store, _) = seeded_store();
    let first = store
        .move_deal(DealId(1), &StageId::from("proposal"))
        .expect("first");
    let second = store
        .move_deal(DealId(1), &StageId::from("negotiation"))
        .expect("second");
    assert!(second.updated_at > first.updated_at);
}

#[test]
fn move_deal_rejects_unknown_stage_and_deal() {
    let (mut store, _) = seeded_store();
    let err = store
        .move_deal(DealId(1), &StageId::from("archived"))
        .expect_err("unknown stage");
    assert!(matches!(err, CrmError::InvalidReference { .. }));
    assert_eq!(store.deal(DealId(1)).expect("deal").stage.as_str(), "qualified");

    let err = store
        .move_deal(DealId(42), &StageId::from("lead"))
        .expect_err("unknown deal");
    assert_eq!(err, CrmError::not_found("deal", 42));
}

#[test]
fn add_deal_validates_value_probability_and_stage() {
    let (mut store, _) = seeded_store();

    let mut negative = new_deal("Refund", "lead");
    negative.value = -1;
    assert!(matches!(
        store.add_deal(negative),
        Err(CrmError::Validation(_))
    ));

    let mut certain = new_deal("Sure thing", "lead");
    certain.probability = 101;
    assert!(matches!(
        store.add_deal(certain),
        Err(CrmError::Validation(_))
    ));

    assert!(matches!(
        store.add_deal(new_deal("Ghost", "archived")),
        Err(CrmError::InvalidReference { .. })
    ));
    assert_eq!(store.deals().len(), 5);
}

#[test]
fn update_deal_bumps_updated_at_and_keeps_failed_patch_out() {
    let (mut store, clock) = seeded_store();
    let created = store.add_deal(new_deal("Widgets", "lead")).expect("deal");

    clock.advance(TimeDelta::minutes(1));
    let updated = store
        .update_deal(created.id, DealPatch::default().value(12_500))
        .expect("update");
    assert_eq!(updated.value, 12_500);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    let err = store
        .update_deal(created.id, DealPatch::default().probability(150))
        .expect_err("invalid probability");
    assert!(matches!(err, CrmError::Validation(_)));
    assert_eq!(store.deal(created.id).expect("deal").probability, 50);
}

#[test]
fn activity_relation_checked_on_write_and_tolerated_on_read() {
    let (mut store, _) = seeded_store();
    let dangling = NewActivity {
        kind: ActivityKind::Task,
        title: "Chase".into(),
        description: String::new(),
        date: start(),
        completed: false,
        related_to: RelatedTo::Contact(ContactId(77)),
        assigned_to: UserId(1),
    };
    assert!(matches!(
        store.add_activity(dangling),
        Err(CrmError::InvalidReference { .. })
    ));

    store.delete_deal(DealId(2));
    let label = store.resolve_related(&RelatedTo::Deal(DealId(2)));
    assert_eq!(label.name, "Unknown Deal");
    assert_eq!(label.kind, "deal");
    assert!(label.dangling);

    let toggled = store
        .update_activity(ActivityId(2), ActivityPatch::default().completed(true))
        .expect("edit activity with dangling relation");
    assert!(toggled.completed);
}

#[test]
fn resolve_related_names_live_entities() {
    let (store, _) = seeded_store();
    let label = store.resolve_related(&RelatedTo::Contact(ContactId(2)));
    assert_eq!(label.name, "Bob Smith");
    assert!(!label.dangling);
    let missing = store.resolve_related(&RelatedTo::Contact(ContactId(9)));
    assert_eq!(missing.name, "Unknown Contact");
}
