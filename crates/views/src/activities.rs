use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use shared::domain::{Activity, ActivityKind, RelatedLabel};
use storage::EntityStore;

use crate::{
    calendar::{local_date, week_start},
    contains_ignore_case,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    #[default]
    All,
    Today,
    ThisWeek,
    ThisMonth,
    /// In the past, not completed, and not today.
    Overdue,
    /// Later than now, or any time today.
    Upcoming,
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "thisweek" => Ok(Self::ThisWeek),
            "thismonth" => Ok(Self::ThisMonth),
            "overdue" => Ok(Self::Overdue),
            "upcoming" => Ok(Self::Upcoming),
            _ => Err(format!("unknown time window '{s}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Completed,
    Pending,
}

impl FromStr for CompletionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "completed" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            other => Err(format!("unknown completion status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityBadge {
    Today,
    Overdue,
}

/// Independent predicates over activities. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    pub search: Option<String>,
    pub window: TimeWindow,
    pub kind: Option<ActivityKind>,
    pub status: Option<CompletionStatus>,
}

impl ActivityFilter {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn kind(mut self, kind: ActivityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn status(mut self, status: CompletionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, activity: &Activity, now: DateTime<FixedOffset>) -> bool {
        self.matches_search(activity)
            && in_window(activity, self.window, now)
            && self.kind.map_or(true, |kind| activity.kind == kind)
            && self.status.map_or(true, |status| match status {
                CompletionStatus::Completed => activity.completed,
                CompletionStatus::Pending => !activity.completed,
            })
    }

    fn matches_search(&self, activity: &Activity) -> bool {
        match self.search.as_deref() {
            None | Some("") => true,
            Some(text) => {
                contains_ignore_case(&activity.title, text)
                    || contains_ignore_case(&activity.description, text)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRow {
    pub activity: Activity,
    pub related: RelatedLabel,
    pub badge: Option<ActivityBadge>,
}

fn is_today(date: DateTime<Utc>, now: DateTime<FixedOffset>) -> bool {
    local_date(date, *now.offset()) == now.date_naive()
}

fn is_overdue(activity: &Activity, now: DateTime<FixedOffset>) -> bool {
    activity.date < now.with_timezone(&Utc) && !activity.completed && !is_today(activity.date, now)
}

fn in_window(activity: &Activity, window: TimeWindow, now: DateTime<FixedOffset>) -> bool {
    let date = local_date(activity.date, *now.offset());
    let today = now.date_naive();
    match window {
        TimeWindow::All => true,
        TimeWindow::Today => date == today,
        TimeWindow::ThisWeek => week_start(date) == week_start(today),
        TimeWindow::ThisMonth => date.year() == today.year() && date.month() == today.month(),
        TimeWindow::Overdue => is_overdue(activity, now),
        TimeWindow::Upcoming => activity.date > now.with_timezone(&Utc) || date == today,
    }
}

/// Activities passing every predicate of `filter`, earliest first.
pub fn filter_activities<'a>(
    store: &'a EntityStore,
    filter: &ActivityFilter,
    now: DateTime<FixedOffset>,
) -> Vec<&'a Activity> {
    let mut matched: Vec<&Activity> = store
        .activities()
        .iter()
        .filter(|activity| filter.matches(activity, now))
        .collect();
    matched.sort_by_key(|activity| activity.date);
    matched
}

pub fn activity_badge(activity: &Activity, now: DateTime<FixedOffset>) -> Option<ActivityBadge> {
    if is_today(activity.date, now) {
        Some(ActivityBadge::Today)
    } else if is_overdue(activity, now) {
        Some(ActivityBadge::Overdue)
    } else {
        None
    }
}

/// Filtered activities with their related-entity label and badge attached.
pub fn activity_rows(
    store: &EntityStore,
    filter: &ActivityFilter,
    now: DateTime<FixedOffset>,
) -> Vec<ActivityRow> {
    filter_activities(store, filter, now)
        .into_iter()
        .map(|activity| ActivityRow {
            activity: activity.clone(),
            related: store.resolve_related(&activity.related_to),
            badge: activity_badge(activity, now),
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/activities_tests.rs"]
mod tests;
