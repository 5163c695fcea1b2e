use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Months, Utc};
use serde::{Deserialize, Serialize};
use shared::domain::{Deal, StageId};
use storage::EntityStore;

use crate::{
    calendar::{local_date, local_midnight, month_start, next_month},
    pipeline::{deals_by_stage, StageTotals},
    rounded_percent,
};

/// Look-back window for the monthly value chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    Last30Days,
    Last3Months,
    #[default]
    Last6Months,
    Last12Months,
}

impl TimeRange {
    /// Calendar months subtracted from "now" to find the first bucket.
    pub fn lookback_months(self) -> u32 {
        match self {
            TimeRange::Last30Days => 1,
            TimeRange::Last3Months => 3,
            TimeRange::Last6Months => 6,
            TimeRange::Last12Months => 12,
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "30days" => Ok(Self::Last30Days),
            "3months" => Ok(Self::Last3Months),
            "6months" => Ok(Self::Last6Months),
            "12months" => Ok(Self::Last12Months),
            other => Err(format!(
                "unknown time range '{other}' (expected 30days, 3months, 6months or 12months)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageConversion {
    pub from: StageId,
    pub to: StageId,
    pub label: String,
    pub rate: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyDealValue {
    pub label: String,
    pub month_start: DateTime<Utc>,
    pub total: i64,
    pub won: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyMetrics {
    pub total_deals: usize,
    pub total_value: i64,
    pub average_deal_size: i64,
    pub won_deals: usize,
    pub win_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsReport {
    pub range: TimeRange,
    pub metrics: KeyMetrics,
    pub stage_totals: Vec<StageTotals>,
    pub monthly: Vec<MonthlyDealValue>,
    pub conversions: Vec<StageConversion>,
}

/// Occupancy ratio of each stage against the one before it.
///
/// This compares how many deals sit in adjacent columns right now. It is not
/// a cohort measure of deals that actually moved from one stage to the next.
pub fn conversion_rates(store: &EntityStore) -> Vec<StageConversion> {
    let totals = deals_by_stage(store);
    totals
        .windows(2)
        .map(|pair| {
            let (current, next) = (&pair[0], &pair[1]);
            StageConversion {
                from: current.stage_id.clone(),
                to: next.stage_id.clone(),
                label: format!("{} → {}", current.name, next.name),
                rate: rounded_percent(next.count, current.count),
                color: current.color.clone(),
            }
        })
        .collect()
}

/// First instant of the earliest bucket and first instant after the latest one.
pub fn window_bounds(range: TimeRange, now: DateTime<FixedOffset>) -> (DateTime<Utc>, DateTime<Utc>) {
    let offset = *now.offset();
    let start = now
        .checked_sub_months(Months::new(range.lookback_months()))
        .unwrap_or(now);
    let first = month_start(start.date_naive());
    let last = month_start(now.date_naive());
    let end = next_month(last).unwrap_or(last);
    (local_midnight(first, offset), local_midnight(end, offset))
}

/// Total and won deal value per calendar month of the window.
///
/// Deals land in the month they were created, not the month they closed, so
/// a deal won in June but opened in April counts towards April's `won`.
pub fn monthly_deal_values(
    store: &EntityStore,
    range: TimeRange,
    now: DateTime<FixedOffset>,
) -> Vec<MonthlyDealValue> {
    let offset = *now.offset();
    let (start, end) = window_bounds(range, now);

    let mut buckets = Vec::new();
    let mut month = local_date(start, offset);
    loop {
        let from = local_midnight(month, offset);
        if from >= end {
            break;
        }
        let Some(following) = next_month(month) else {
            break;
        };
        let until = local_midnight(following, offset);
        let created_in_month = |deal: &&Deal| deal.created_at >= from && deal.created_at < until;

        let (total, won) = store
            .deals()
            .iter()
            .filter(created_in_month)
            .fold((0, 0), |(total, won), deal| {
                let won_value = if deal.is_won() { deal.value } else { 0 };
                (total + deal.value, won + won_value)
            });

        buckets.push(MonthlyDealValue {
            label: month.format("%b %Y").to_string(),
            month_start: from,
            total,
            won,
        });
        month = following;
    }
    buckets
}

pub fn key_metrics(store: &EntityStore) -> KeyMetrics {
    let deals = store.deals();
    let total_value: i64 = deals.iter().map(|d| d.value).sum();
    let won_deals = deals.iter().filter(|d| d.is_won()).count();
    let average_deal_size = if deals.is_empty() {
        0
    } else {
        (total_value as f64 / deals.len() as f64).round() as i64
    };
    KeyMetrics {
        total_deals: deals.len(),
        total_value,
        average_deal_size,
        won_deals,
        win_rate: rounded_percent(won_deals, deals.len()),
    }
}

pub fn analytics_report(
    store: &EntityStore,
    range: TimeRange,
    now: DateTime<FixedOffset>,
) -> AnalyticsReport {
    AnalyticsReport {
        range,
        metrics: key_metrics(store),
        stage_totals: deals_by_stage(store),
        monthly: monthly_deal_values(store, range, now),
        conversions: conversion_rates(store),
    }
}

#[cfg(test)]
#[path = "tests/analytics_tests.rs"]
mod tests;
