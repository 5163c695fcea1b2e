use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use shared::domain::{Activity, Deal, RelatedLabel};
use storage::EntityStore;

use crate::{
    analytics::key_metrics,
    pipeline::{deals_by_stage, StageTotals},
};

pub const UPCOMING_LIMIT: usize = 5;
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingActivity {
    pub activity: Activity,
    pub related: RelatedLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentDeal {
    pub deal: Deal,
    pub stage_name: String,
    pub stage_color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_deals: usize,
    pub total_contacts: usize,
    pub total_deal_value: i64,
    pub won_deals: usize,
    pub win_rate: u32,
    pub stage_totals: Vec<StageTotals>,
    pub upcoming: Vec<UpcomingActivity>,
    pub recent_deals: Vec<RecentDeal>,
}

/// Incomplete activities due now or later, soonest first.
pub fn upcoming_activities(store: &EntityStore, now: DateTime<FixedOffset>) -> Vec<&Activity> {
    let now = now.with_timezone(&Utc);
    let mut upcoming: Vec<&Activity> = store
        .activities()
        .iter()
        .filter(|activity| !activity.completed && activity.date >= now)
        .collect();
    upcoming.sort_by_key(|activity| activity.date);
    upcoming.truncate(UPCOMING_LIMIT);
    upcoming
}

/// Most recently touched deals first.
pub fn recent_deals(store: &EntityStore) -> Vec<&Deal> {
    let mut deals: Vec<&Deal> = store.deals().iter().collect();
    deals.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    deals.truncate(RECENT_LIMIT);
    deals
}

pub fn dashboard_summary(store: &EntityStore, now: DateTime<FixedOffset>) -> DashboardSummary {
    let metrics = key_metrics(store);
    let upcoming = upcoming_activities(store, now)
        .into_iter()
        .map(|activity| UpcomingActivity {
            related: store.resolve_related(&activity.related_to),
            activity: activity.clone(),
        })
        .collect();
    let recent_deals = recent_deals(store)
        .into_iter()
        .map(|deal| {
            let (stage_name, stage_color) = store
                .stage(&deal.stage)
                .map(|stage| (stage.name.clone(), stage.color.clone()))
                .unwrap_or_else(|| (deal.stage.to_string(), String::new()));
            RecentDeal {
                deal: deal.clone(),
                stage_name,
                stage_color,
            }
        })
        .collect();

    DashboardSummary {
        total_deals: metrics.total_deals,
        total_contacts: store.contacts().len(),
        total_deal_value: metrics.total_value,
        won_deals: metrics.won_deals,
        win_rate: metrics.win_rate,
        stage_totals: deals_by_stage(store),
        upcoming,
        recent_deals,
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
