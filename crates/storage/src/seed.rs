//! Demo data the dashboard starts with.

use chrono::{DateTime, TimeZone, Utc};
use shared::domain::{
    Activity, ActivityId, ActivityKind, Contact, ContactId, ContactStatus, Deal, DealId,
    PipelineStage, RelatedTo, StageId, UserId,
};

const OWNER: UserId = UserId(1);

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .unwrap_or_default()
}

fn stage(id: &str, name: &str, order: i32, color: &str) -> PipelineStage {
    PipelineStage {
        id: StageId::from(id),
        name: name.to_string(),
        order,
        color: color.to_string(),
    }
}

pub fn stages() -> Vec<PipelineStage> {
    vec![
        stage("lead", "Lead", 1, "#38BDF8"),
        stage("qualified", "Qualified", 2, "#818CF8"),
        stage("proposal", "Proposal", 3, "#C084FC"),
        stage("negotiation", "Negotiation", 4, "#F472B6"),
        stage("closed", "Closed Won", 5, "#34D399"),
        stage("lost", "Closed Lost", 6, "#F87171"),
    ]
}

pub fn contacts() -> Vec<Contact> {
    vec![
        Contact {
            id: ContactId(1),
            name: "Alice Johnson".into(),
            email: "alice@example.com".into(),
            phone: "(555) 123-4567".into(),
            company: "Acme Inc".into(),
            position: "CTO".into(),
            status: ContactStatus::Lead,
            tags: vec!["tech".into(), "enterprise".into()],
            assigned_to: OWNER,
            last_contacted: at(2023, 5, 15, 0),
            created_at: at(2023, 4, 10, 0),
        },
        Contact {
            id: ContactId(2),
            name: "Bob Smith".into(),
            email: "bob@example.com".into(),
            phone: "(555) 987-6543".into(),
            company: "XYZ Corp".into(),
            position: "CEO".into(),
            status: ContactStatus::Customer,
            tags: vec!["finance".into(), "enterprise".into()],
            assigned_to: OWNER,
            last_contacted: at(2023, 5, 20, 0),
            created_at: at(2023, 3, 15, 0),
        },
        Contact {
            id: ContactId(3),
            name: "Carol Williams".into(),
            email: "carol@example.com".into(),
            phone: "(555) 456-7890".into(),
            company: "ABC Ltd".into(),
            position: "Marketing Director".into(),
            status: ContactStatus::Lead,
            tags: vec!["marketing".into(), "mid-market".into()],
            assigned_to: OWNER,
            last_contacted: at(2023, 5, 18, 0),
            created_at: at(2023, 5, 1, 0),
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn deal(
    id: i64,
    name: &str,
    value: i64,
    stage: &str,
    probability: u8,
    expected_close_date: DateTime<Utc>,
    contact: i64,
    notes: &str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Deal {
    Deal {
        id: DealId(id),
        name: name.to_string(),
        value,
        stage: StageId::from(stage),
        probability,
        expected_close_date,
        contacts: vec![ContactId(contact)],
        assigned_to: OWNER,
        notes: notes.to_string(),
        created_at,
        updated_at,
    }
}

pub fn deals() -> Vec<Deal> {
    vec![
        deal(
            1,
            "Acme Inc Software Implementation",
            25_000,
            "qualified",
            60,
            at(2023, 7, 15, 0),
            1,
            "Need to follow up on technical requirements",
            at(2023, 5, 1, 0),
            at(2023, 5, 10, 0),
        ),
        deal(
            2,
            "XYZ Corp Enterprise Plan",
            50_000,
            "proposal",
            75,
            at(2023, 6, 30, 0),
            2,
            "Proposal sent, awaiting feedback",
            at(2023, 4, 15, 0),
            at(2023, 5, 15, 0),
        ),
        deal(
            3,
            "ABC Ltd Marketing Campaign",
            15_000,
            "lead",
            30,
            at(2023, 8, 1, 0),
            3,
            "Initial discussion about marketing needs",
            at(2023, 5, 10, 0),
            at(2023, 5, 10, 0),
        ),
        deal(
            4,
            "Global Industries Partnership",
            100_000,
            "negotiation",
            90,
            at(2023, 6, 15, 0),
            1,
            "Final contract details being negotiated",
            at(2023, 3, 10, 0),
            at(2023, 5, 18, 0),
        ),
        deal(
            5,
            "TechStart Annual Subscription",
            12_000,
            "closed",
            100,
            at(2023, 5, 15, 0),
            2,
            "Deal closed successfully",
            at(2023, 4, 1, 0),
            at(2023, 5, 15, 0),
        ),
    ]
}

pub fn activities() -> Vec<Activity> {
    vec![
        Activity {
            id: ActivityId(1),
            kind: ActivityKind::Call,
            title: "Initial discovery call".into(),
            description: "Discuss needs and potential solutions".into(),
            date: at(2023, 5, 20, 10),
            completed: true,
            related_to: RelatedTo::Deal(DealId(1)),
            assigned_to: OWNER,
            created_at: at(2023, 5, 15, 0),
        },
        Activity {
            id: ActivityId(2),
            kind: ActivityKind::Email,
            title: "Send proposal".into(),
            description: "Follow up with detailed proposal".into(),
            date: at(2023, 5, 25, 14),
            completed: false,
            related_to: RelatedTo::Deal(DealId(2)),
            assigned_to: OWNER,
            created_at: at(2023, 5, 18, 0),
        },
        Activity {
            id: ActivityId(3),
            kind: ActivityKind::Meeting,
            title: "Contract negotiation".into(),
            description: "Finalize contract terms".into(),
            date: at(2023, 5, 30, 11),
            completed: false,
            related_to: RelatedTo::Deal(DealId(4)),
            assigned_to: OWNER,
            created_at: at(2023, 5, 20, 0),
        },
    ]
}
