use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use shared::{
    clock::Clock,
    domain::{
        Activity, ActivityId, Contact, ContactId, Deal, DealId, PipelineStage, RelatedLabel,
        RelatedTo, StageId,
    },
    error::{CrmError, CrmResult},
    protocol::{ActivityPatch, ContactPatch, DealPatch, NewActivity, NewContact, NewDeal},
};
use tracing::{debug, warn};

use crate::seed;

/// Canonical in-memory collections of contacts, deals, stages and activities.
///
/// All mutation goes through `&mut self`, so a caller driving the store from
/// one event loop sees every operation as atomic. Readers get slices; nothing
/// outside the store can change an entity in place.
pub struct EntityStore {
    clock: Arc<dyn Clock>,
    contacts: Vec<Contact>,
    deals: Vec<Deal>,
    stages: Vec<PipelineStage>,
    activities: Vec<Activity>,
    last_id: i64,
}

impl EntityStore {
    /// Empty store over the given stage set. Stage ids and orders must be unique.
    pub fn new(mut stages: Vec<PipelineStage>, clock: Arc<dyn Clock>) -> CrmResult<Self> {
        validate_stages(&stages)?;
        stages.sort_by_key(|stage| stage.order);
        Ok(Self {
            clock,
            contacts: Vec::new(),
            deals: Vec::new(),
            stages,
            activities: Vec::new(),
            last_id: 0,
        })
    }

    /// Store preloaded with the demo pipeline, contacts, deals and activities.
    pub fn seeded(clock: Arc<dyn Clock>) -> Self {
        let mut stages = seed::stages();
        stages.sort_by_key(|stage| stage.order);
        let contacts = seed::contacts();
        let deals = seed::deals();
        let activities = seed::activities();
        let last_id = contacts
            .iter()
            .map(|c| c.id.0)
            .chain(deals.iter().map(|d| d.id.0))
            .chain(activities.iter().map(|a| a.id.0))
            .max()
            .unwrap_or(0);
        Self {
            clock,
            contacts,
            deals,
            stages,
            activities,
            last_id,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    /// Stages in ascending `order`.
    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn contact(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    pub fn deal(&self, id: DealId) -> Option<&Deal> {
        self.deals.iter().find(|d| d.id == id)
    }

    pub fn stage(&self, id: &StageId) -> Option<&PipelineStage> {
        self.stages.iter().find(|s| &s.id == id)
    }

    pub fn activity(&self, id: ActivityId) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    /// Name of whatever `related` points at, or a placeholder when it dangles.
    pub fn resolve_related(&self, related: &RelatedTo) -> RelatedLabel {
        let resolved = match related {
            RelatedTo::Deal(id) => self.deal(*id).map(|d| d.name.clone()),
            RelatedTo::Contact(id) => self.contact(*id).map(|c| c.name.clone()),
        };
        let kind = related.kind_label().to_string();
        match resolved {
            Some(name) => RelatedLabel {
                kind,
                name,
                dangling: false,
            },
            None => RelatedLabel {
                name: match related {
                    RelatedTo::Deal(_) => "Unknown Deal".to_string(),
                    RelatedTo::Contact(_) => "Unknown Contact".to_string(),
                },
                kind,
                dangling: true,
            },
        }
    }

    pub fn add_contact(&mut self, data: NewContact) -> Contact {
        let contact = Contact {
            id: ContactId(self.next_id()),
            name: data.name,
            email: data.email,
            phone: data.phone,
            company: data.company,
            position: data.position,
            status: data.status,
            tags: data.tags,
            assigned_to: data.assigned_to,
            last_contacted: data.last_contacted,
            created_at: self.clock.now(),
        };
        debug!(contact_id = contact.id.0, "store: contact added");
        self.contacts.push(contact.clone());
        contact
    }

    pub fn update_contact(&mut self, id: ContactId, patch: ContactPatch) -> CrmResult<Contact> {
        let Some(contact) = self.contacts.iter_mut().find(|c| c.id == id) else {
            warn!(contact_id = id.0, "store: update of unknown contact");
            return Err(CrmError::not_found("contact", id));
        };
        patch.apply(contact);
        debug!(contact_id = id.0, "store: contact updated");
        Ok(contact.clone())
    }

    /// Removes the contact. Deals and activities that reference it are left alone.
    pub fn delete_contact(&mut self, id: ContactId) -> Option<Contact> {
        let index = self.contacts.iter().position(|c| c.id == id)?;
        debug!(contact_id = id.0, "store: contact deleted");
        Some(self.contacts.remove(index))
    }

    pub fn add_deal(&mut self, data: NewDeal) -> CrmResult<Deal> {
        validate_deal_numbers(data.value, data.probability)?;
        self.ensure_stage("deal", "new", &data.stage)?;

        let now = self.clock.now();
        let deal = Deal {
            id: DealId(self.next_id()),
            name: data.name,
            value: data.value,
            stage: data.stage,
            probability: data.probability,
            expected_close_date: data.expected_close_date,
            contacts: data.contacts,
            assigned_to: data.assigned_to,
            notes: data.notes,
            created_at: now,
            updated_at: now,
        };
        debug!(deal_id = deal.id.0, stage = %deal.stage, "store: deal added");
        self.deals.push(deal.clone());
        Ok(deal)
    }

    /// Merges `patch` and refreshes `updated_at`, even when the patch is empty.
    pub fn update_deal(&mut self, id: DealId, patch: DealPatch) -> CrmResult<Deal> {
        let index = self.deal_index(id)?;
        if let Some(stage) = &patch.stage {
            self.ensure_stage("deal", id, stage)?;
        }

        let mut updated = self.deals[index].clone();
        patch.apply(&mut updated);
        validate_deal_numbers(updated.value, updated.probability)?;
        updated.updated_at = self.bump(updated.updated_at);

        debug!(deal_id = id.0, "store: deal updated");
        self.deals[index] = updated.clone();
        Ok(updated)
    }

    pub fn move_deal(&mut self, deal_id: DealId, stage_id: &StageId) -> CrmResult<Deal> {
        let index = self.deal_index(deal_id)?;
        self.ensure_stage("deal", deal_id, stage_id)?;

        let updated_at = self.bump(self.deals[index].updated_at);
        let deal = &mut self.deals[index];
        let from = std::mem::replace(&mut deal.stage, stage_id.clone());
        deal.updated_at = updated_at;
        debug!(
            deal_id = deal_id.0,
            from = %from,
            to = %stage_id,
            "store: deal moved"
        );
        Ok(deal.clone())
    }

    pub fn delete_deal(&mut self, id: DealId) -> Option<Deal> {
        let index = self.deals.iter().position(|d| d.id == id)?;
        debug!(deal_id = id.0, "store: deal deleted");
        Some(self.deals.remove(index))
    }

    pub fn add_activity(&mut self, data: NewActivity) -> CrmResult<Activity> {
        self.ensure_related("new", &data.related_to)?;

        let activity = Activity {
            id: ActivityId(self.next_id()),
            kind: data.kind,
            title: data.title,
            description: data.description,
            date: data.date,
            completed: data.completed,
            related_to: data.related_to,
            assigned_to: data.assigned_to,
            created_at: self.clock.now(),
        };
        debug!(activity_id = activity.id.0, "store: activity added");
        self.activities.push(activity.clone());
        Ok(activity)
    }

    /// A relation is only checked when the patch changes it, so an activity
    /// whose target has since been deleted can still be edited.
    pub fn update_activity(&mut self, id: ActivityId, patch: ActivityPatch) -> CrmResult<Activity> {
        let Some(index) = self.activities.iter().position(|a| a.id == id) else {
            warn!(activity_id = id.0, "store: update of unknown activity");
            return Err(CrmError::not_found("activity", id));
        };
        if let Some(related) = &patch.related_to {
            self.ensure_related(id, related)?;
        }

        let activity = &mut self.activities[index];
        patch.apply(activity);
        debug!(activity_id = id.0, "store: activity updated");
        Ok(activity.clone())
    }

    pub fn delete_activity(&mut self, id: ActivityId) -> Option<Activity> {
        let index = self.activities.iter().position(|a| a.id == id)?;
        debug!(activity_id = id.0, "store: activity deleted");
        Some(self.activities.remove(index))
    }

    fn deal_index(&self, id: DealId) -> CrmResult<usize> {
        self.deals.iter().position(|d| d.id == id).ok_or_else(|| {
            warn!(deal_id = id.0, "store: unknown deal");
            CrmError::not_found("deal", id)
        })
    }

    fn ensure_stage(&self, entity: &'static str, id: impl ToString, stage: &StageId) -> CrmResult<()> {
        if self.stage(stage).is_some() {
            return Ok(());
        }
        warn!(stage = %stage, "store: rejected unknown stage");
        Err(CrmError::invalid_reference(
            entity,
            id,
            format!("stage '{stage}'"),
        ))
    }

    fn ensure_related(&self, id: impl ToString, related: &RelatedTo) -> CrmResult<()> {
        let exists = match related {
            RelatedTo::Deal(deal_id) => self.deal(*deal_id).is_some(),
            RelatedTo::Contact(contact_id) => self.contact(*contact_id).is_some(),
        };
        if exists {
            return Ok(());
        }
        let reference = match related {
            RelatedTo::Deal(deal_id) => format!("deal {deal_id}"),
            RelatedTo::Contact(contact_id) => format!("contact {contact_id}"),
        };
        warn!(%reference, "store: rejected dangling activity relation");
        Err(CrmError::invalid_reference("activity", id, reference))
    }

    /// Millisecond timestamp id, pushed past the last one handed out.
    fn next_id(&mut self) -> i64 {
        let id = self.clock.now().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        id
    }

    /// Current time, or 1ms past `previous` if the clock has not moved on.
    fn bump(&self, previous: DateTime<Utc>) -> DateTime<Utc> {
        let now = self.clock.now();
        if now > previous {
            now
        } else {
            previous + TimeDelta::milliseconds(1)
        }
    }
}

fn validate_stages(stages: &[PipelineStage]) -> CrmResult<()> {
    for (i, stage) in stages.iter().enumerate() {
        for other in &stages[i + 1..] {
            if other.id == stage.id {
                return Err(CrmError::validation(format!(
                    "duplicate stage id '{}'",
                    stage.id
                )));
            }
            if other.order == stage.order {
                return Err(CrmError::validation(format!(
                    "stages '{}' and '{}' share order {}",
                    stage.id, other.id, stage.order
                )));
            }
        }
    }
    Ok(())
}

fn validate_deal_numbers(value: i64, probability: u8) -> CrmResult<()> {
    if value < 0 {
        return Err(CrmError::validation(format!(
            "deal value must not be negative, got {value}"
        )));
    }
    if probability > 100 {
        return Err(CrmError::validation(format!(
            "deal probability must be within 0..=100, got {probability}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/entity_store_tests.rs"]
mod tests;
