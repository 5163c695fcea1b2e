use std::sync::Arc;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use shared::{
    clock::ManualClock,
    domain::{
        Activity, ActivityKind, Contact, ContactId, ContactStatus, Deal, RelatedTo, StageId,
        UserId,
    },
    protocol::{NewActivity, NewContact, NewDeal},
};
use storage::{seed, EntityStore};

pub(crate) fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .expect("valid timestamp")
}

/// `at` read in UTC+0, the offset most view tests run in.
pub(crate) fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
    at(y, m, d, h, min).fixed_offset()
}

/// Empty store over the default stages with a controllable clock.
pub(crate) struct Fixture {
    pub store: EntityStore,
    pub clock: ManualClock,
}

impl Fixture {
    pub fn new(start: DateTime<Utc>) -> Self {
        let clock = ManualClock::new(start);
        let store = EntityStore::new(seed::stages(), Arc::new(clock.clone()))
            .expect("seed stages are valid");
        Self { store, clock }
    }

    pub fn seeded(start: DateTime<Utc>) -> Self {
        let clock = ManualClock::new(start);
        let store = EntityStore::seeded(Arc::new(clock.clone()));
        Self { store, clock }
    }

    pub fn deal(&mut self, name: &str, stage: &str, value: i64) -> Deal {
        self.store
            .add_deal(NewDeal {
                name: name.to_string(),
                value,
                stage: StageId::from(stage),
                probability: 50,
                expected_close_date: self.clock_now(),
                contacts: Vec::new(),
                assigned_to: UserId(1),
                notes: String::new(),
            })
            .expect("add deal")
    }

    /// Adds a deal whose creation instant is `created`.
    pub fn deal_created_at(
        &mut self,
        created: DateTime<Utc>,
        name: &str,
        stage: &str,
        value: i64,
    ) -> Deal {
        self.clock.set(created);
        self.deal(name, stage, value)
    }

    pub fn contact(&mut self, name: &str, company: &str, status: ContactStatus) -> Contact {
        self.store.add_contact(NewContact {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            phone: "(555) 000-0000".into(),
            company: company.to_string(),
            position: "Buyer".into(),
            status,
            tags: Vec::new(),
            assigned_to: UserId(1),
            last_contacted: self.clock_now(),
        })
    }

    pub fn activity(
        &mut self,
        title: &str,
        kind: ActivityKind,
        date: DateTime<Utc>,
        completed: bool,
        related_to: RelatedTo,
    ) -> Activity {
        self.store
            .add_activity(NewActivity {
                kind,
                title: title.to_string(),
                description: format!("{title} notes"),
                date,
                completed,
                related_to,
                assigned_to: UserId(1),
            })
            .expect("add activity")
    }

    /// Activity hanging off a throwaway contact.
    pub fn task(&mut self, title: &str, date: DateTime<Utc>, completed: bool) -> Activity {
        let owner = self.owner();
        self.activity(title, ActivityKind::Task, date, completed, RelatedTo::Contact(owner))
    }

    fn owner(&mut self) -> ContactId {
        match self.store.contacts().first() {
            Some(contact) => contact.id,
            None => self.contact("Owner", "Acme", ContactStatus::Customer).id,
        }
    }

    fn clock_now(&self) -> DateTime<Utc> {
        self.store.now()
    }
}
