use super::*;
use crate::support::{at, local, Fixture};
use chrono::TimeDelta;
use shared::domain::StageId;

#[test]
fn upcoming_skips_completed_and_past_and_caps_at_five() {
    let mut fx = Fixture::new(at(2024, 6, 1, 9, 0));
    let now = local(2024, 6, 10, 12, 0);
    fx.task("Past", at(2024, 6, 9, 12, 0), false);
    fx.task("Done", at(2024, 6, 11, 12, 0), true);
    fx.task("Exactly now", at(2024, 6, 10, 12, 0), false);
    for day in (12..=18).rev() {
        fx.task(&format!("Day {day}"), at(2024, 6, day, 9, 0), false);
    }

    let upcoming = upcoming_activities(&fx.store, now);
    let titles: Vec<&str> = upcoming.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, ["Exactly now", "Day 12", "Day 13", "Day 14", "Day 15"]);
}

#[test]
fn recent_deals_order_by_last_update() {
    let mut fx = Fixture::new(at(2024, 6, 1, 9, 0));
    let ids: Vec<_> = (1..=6)
        .map(|n| {
            fx.clock.advance(TimeDelta::minutes(1));
            fx.deal(&format!("Deal {n}"), "lead", 100).id
        })
        .collect();
    fx.clock.advance(TimeDelta::minutes(1));
    fx.store
        .move_deal(ids[0], &StageId::from("proposal"))
        .expect("move");

    let names: Vec<&str> = recent_deals(&fx.store)
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(names, ["Deal 1", "Deal 6", "Deal 5", "Deal 4", "Deal 3"]);
}

#[test]
fn summary_over_seed_data() {
    let fx = Fixture::seeded(at(2023, 5, 21, 9, 0));
    let summary = dashboard_summary(&fx.store, local(2023, 5, 21, 9, 0));

    assert_eq!(summary.total_deals, 5);
    assert_eq!(summary.total_contacts, 3);
    assert_eq!(summary.total_deal_value, 202_000);
    assert_eq!(summary.won_deals, 1);
    assert_eq!(summary.win_rate, 20);
    assert_eq!(summary.stage_totals.len(), 6);

    let upcoming: Vec<&str> = summary
        .upcoming
        .iter()
        .map(|u| u.activity.title.as_str())
        .collect();
    assert_eq!(upcoming.len(), 2);
    assert_eq!(summary.upcoming[0].related.kind, "deal");
    assert!(!summary.upcoming[0].related.dangling);

    assert_eq!(summary.recent_deals[0].deal.id.0, 4);
    assert_eq!(summary.recent_deals[0].stage_name, "Negotiation");
    assert_eq!(summary.recent_deals.len(), 5);
}

#[test]
fn summary_of_empty_store_has_zeroed_totals() {
    let fx = Fixture::new(at(2024, 6, 1, 9, 0));
    let summary = dashboard_summary(&fx.store, local(2024, 6, 1, 9, 0));
    assert_eq!(summary.total_deals, 0);
    assert_eq!(summary.win_rate, 0);
    assert!(summary.upcoming.is_empty());
    assert!(summary.recent_deals.is_empty());
    assert!(summary.stage_totals.iter().all(|t| t.count == 0 && t.value == 0));
}
