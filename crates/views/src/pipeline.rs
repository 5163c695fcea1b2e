use std::collections::HashMap;

use serde::Serialize;
use shared::domain::{Deal, PipelineStage, StageId};
use storage::EntityStore;

use crate::contains_ignore_case;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageTotals {
    pub stage_id: StageId,
    pub name: String,
    pub color: String,
    pub count: usize,
    pub value: i64,
}

/// One kanban column. `is_empty` drives the "No deals" placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardColumn {
    pub stage: PipelineStage,
    pub deals: Vec<Deal>,
    pub is_empty: bool,
}

/// Deal count and value per stage, in stage order.
///
/// Every stage is present, including ones no deal points at.
pub fn deals_by_stage(store: &EntityStore) -> Vec<StageTotals> {
    let mut totals: Vec<StageTotals> = store
        .stages()
        .iter()
        .map(|stage| StageTotals {
            stage_id: stage.id.clone(),
            name: stage.name.clone(),
            color: stage.color.clone(),
            count: 0,
            value: 0,
        })
        .collect();
    let index: HashMap<&StageId, usize> = store
        .stages()
        .iter()
        .enumerate()
        .map(|(i, stage)| (&stage.id, i))
        .collect();

    for deal in store.deals() {
        if let Some(&i) = index.get(&deal.stage) {
            totals[i].count += 1;
            totals[i].value += deal.value;
        }
    }
    totals
}

/// Kanban columns in stage order, narrowed to deals whose name contains `search`.
pub fn pipeline_board(store: &EntityStore, search: Option<&str>) -> Vec<BoardColumn> {
    let search = search.filter(|s| !s.is_empty());
    store
        .stages()
        .iter()
        .map(|stage| {
            let deals: Vec<Deal> = store
                .deals()
                .iter()
                .filter(|deal| deal.stage == stage.id)
                .filter(|deal| search.map_or(true, |s| contains_ignore_case(&deal.name, s)))
                .cloned()
                .collect();
            BoardColumn {
                stage: stage.clone(),
                is_empty: deals.is_empty(),
                deals,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
