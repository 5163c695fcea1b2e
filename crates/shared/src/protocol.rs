//! Requests the presentation layer hands to the entity store.
//!
//! `New*` structs carry every caller-supplied field of an entity; the store
//! assigns ids and creation timestamps. `*Patch` structs carry only the
//! fields to change: `None` leaves the current value untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Activity, ActivityKind, Contact, ContactId, ContactStatus, Deal, RelatedTo, StageId, UserId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub position: String,
    pub status: ContactStatus,
    pub tags: Vec<String>,
    pub assigned_to: UserId,
    pub last_contacted: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeal {
    pub name: String,
    pub value: i64,
    pub stage: StageId,
    pub probability: u8,
    pub expected_close_date: DateTime<Utc>,
    pub contacts: Vec<ContactId>,
    pub assigned_to: UserId,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivity {
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub completed: bool,
    pub related_to: RelatedTo,
    pub assigned_to: UserId,
}

macro_rules! patch_setters {
    ($($field:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $field(mut self, value: $ty) -> Self {
                self.$field = Some(value);
                self
            }
        )*
    };
}

macro_rules! patch_into_setters {
    ($($field:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $field(mut self, value: impl Into<$ty>) -> Self {
                self.$field = Some(value.into());
                self
            }
        )*
    };
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: Option<ContactStatus>,
    pub tags: Option<Vec<String>>,
    pub assigned_to: Option<UserId>,
    pub last_contacted: Option<DateTime<Utc>>,
}

impl ContactPatch {
    patch_into_setters! {
        name: String,
        email: String,
        phone: String,
        company: String,
        position: String,
    }

    patch_setters! {
        status: ContactStatus,
        tags: Vec<String>,
        assigned_to: UserId,
        last_contacted: DateTime<Utc>,
    }

    pub fn apply(self, contact: &mut Contact) {
        if let Some(v) = self.name {
            contact.name = v;
        }
        if let Some(v) = self.email {
            contact.email = v;
        }
        if let Some(v) = self.phone {
            contact.phone = v;
        }
        if let Some(v) = self.company {
            contact.company = v;
        }
        if let Some(v) = self.position {
            contact.position = v;
        }
        if let Some(v) = self.status {
            contact.status = v;
        }
        if let Some(v) = self.tags {
            contact.tags = v;
        }
        if let Some(v) = self.assigned_to {
            contact.assigned_to = v;
        }
        if let Some(v) = self.last_contacted {
            contact.last_contacted = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealPatch {
    pub name: Option<String>,
    pub value: Option<i64>,
    pub stage: Option<StageId>,
    pub probability: Option<u8>,
    pub expected_close_date: Option<DateTime<Utc>>,
    pub contacts: Option<Vec<ContactId>>,
    pub assigned_to: Option<UserId>,
    pub notes: Option<String>,
}

impl DealPatch {
    patch_into_setters! {
        name: String,
        stage: StageId,
        notes: String,
    }

    patch_setters! {
        value: i64,
        probability: u8,
        expected_close_date: DateTime<Utc>,
        contacts: Vec<ContactId>,
        assigned_to: UserId,
    }

    /// Merges the set fields. `updated_at` is the store's business.
    pub fn apply(self, deal: &mut Deal) {
        if let Some(v) = self.name {
            deal.name = v;
        }
        if let Some(v) = self.value {
            deal.value = v;
        }
        if let Some(v) = self.stage {
            deal.stage = v;
        }
        if let Some(v) = self.probability {
            deal.probability = v;
        }
        if let Some(v) = self.expected_close_date {
            deal.expected_close_date = v;
        }
        if let Some(v) = self.contacts {
            deal.contacts = v;
        }
        if let Some(v) = self.assigned_to {
            deal.assigned_to = v;
        }
        if let Some(v) = self.notes {
            deal.notes = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPatch {
    pub kind: Option<ActivityKind>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub completed: Option<bool>,
    pub related_to: Option<RelatedTo>,
    pub assigned_to: Option<UserId>,
}

impl ActivityPatch {
    patch_into_setters! {
        title: String,
        description: String,
    }

    patch_setters! {
        kind: ActivityKind,
        date: DateTime<Utc>,
        completed: bool,
        related_to: RelatedTo,
        assigned_to: UserId,
    }

    pub fn apply(self, activity: &mut Activity) {
        if let Some(v) = self.kind {
            activity.kind = v;
        }
        if let Some(v) = self.title {
            activity.title = v;
        }
        if let Some(v) = self.description {
            activity.description = v;
        }
        if let Some(v) = self.date {
            activity.date = v;
        }
        if let Some(v) = self.completed {
            activity.completed = v;
        }
        if let Some(v) = self.related_to {
            activity.related_to = v;
        }
        if let Some(v) = self.assigned_to {
            activity.assigned_to = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn unset_patch_fields_leave_deal_untouched() {
        let at = Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap();
        let mut deal = Deal {
            id: crate::domain::DealId(1),
            name: "Acme rollout".into(),
            value: 25_000,
            stage: StageId::from("qualified"),
            probability: 60,
            expected_close_date: at,
            contacts: vec![ContactId(1)],
            assigned_to: UserId(1),
            notes: "follow up".into(),
            created_at: at,
            updated_at: at,
        };
        let before = deal.clone();

        DealPatch::default().notes("signed").apply(&mut deal);

        assert_eq!(deal.notes, "signed");
        assert_eq!(
            Deal {
                notes: before.notes.clone(),
                ..deal
            },
            before
        );
    }
}
