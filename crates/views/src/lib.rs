//! Read-only projections over an `EntityStore` snapshot.
//!
//! Every function recomputes from the store it is handed; nothing here holds
//! state between calls.

pub mod activities;
pub mod analytics;
mod calendar;
pub mod contacts;
pub mod dashboard;
pub mod pipeline;

pub use activities::{
    activity_badge, activity_rows, filter_activities, ActivityBadge, ActivityFilter, ActivityRow,
    CompletionStatus, TimeWindow,
};
pub use analytics::{
    analytics_report, conversion_rates, key_metrics, monthly_deal_values, window_bounds,
    AnalyticsReport, KeyMetrics, MonthlyDealValue, StageConversion, TimeRange,
};
pub use contacts::filter_contacts;
pub use dashboard::{dashboard_summary, recent_deals, upcoming_activities, DashboardSummary};
pub use pipeline::{deals_by_stage, pipeline_board, BoardColumn, StageTotals};

/// `round(100 * part / whole)`, or 0 when `whole` is 0.
pub(crate) fn rounded_percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

/// Case-insensitive substring test; an empty needle matches everything.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod support;
