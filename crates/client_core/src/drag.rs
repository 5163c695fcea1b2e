//! Reconciles a finished pipeline drag gesture into at most one store mutation.
//!
//! Deal cards and stage columns share one droppable namespace, so a drop
//! target is an opaque string that has to be resolved against the store.

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Deal, DealId, PipelineStage, StageId},
    error::{CrmError, CrmResult},
};
use storage::EntityStore;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DroppableId(pub String);

impl DroppableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<DealId> for DroppableId {
    fn from(id: DealId) -> Self {
        Self(id.to_string())
    }
}

impl From<&StageId> for DroppableId {
    fn from(id: &StageId) -> Self {
        Self(id.as_str().to_string())
    }
}

impl From<&str> for DroppableId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let right = self.x + self.width;
        let bottom = self.y + self.height;
        [
            (self.x, self.y),
            (right, self.y),
            (self.x, bottom),
            (right, bottom),
        ]
    }
}

fn mean_corner_distance(a: &Rect, b: &Rect) -> f64 {
    let total: f64 = a
        .corners()
        .iter()
        .zip(b.corners().iter())
        .map(|(&(ax, ay), &(bx, by))| (ax - bx).hypot(ay - by))
        .sum();
    total / 4.0
}

/// Droppable whose corners sit closest, on average, to the dragged card's.
///
/// Ties go to the earliest entry in `droppables`.
pub fn closest_corners(active: Rect, droppables: &[(DroppableId, Rect)]) -> Option<DroppableId> {
    droppables
        .iter()
        .map(|(id, rect)| (id, mean_corner_distance(&active, rect)))
        .filter(|(_, distance)| distance.is_finite())
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id.clone())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        deal_id: DealId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOutcome {
    /// Released outside every droppable.
    NoTarget,
    /// Released over its own card.
    Unchanged,
    Moved {
        deal_id: DealId,
        from: StageId,
        to: StageId,
    },
    /// Released over something that is not a stage, such as another card.
    Ignored,
    NoActiveDrag,
}

#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn active_deal(&self) -> Option<DealId> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { deal_id } => Some(deal_id),
        }
    }

    pub fn start(&mut self, deal_id: DealId) {
        if let Some(previous) = self.active_deal() {
            debug!(previous = previous.0, "drag: restarting over an unfinished drag");
        }
        debug!(deal_id = deal_id.0, "drag: start");
        self.state = DragState::Dragging { deal_id };
    }

    pub fn cancel(&mut self) {
        if let Some(deal_id) = self.active_deal() {
            debug!(deal_id = deal_id.0, "drag: cancelled");
        }
        self.state = DragState::Idle;
    }

    /// The dragged deal and its current stage, for the drag overlay.
    pub fn active_card<'a>(&self, store: &'a EntityStore) -> Option<(&'a Deal, &'a PipelineStage)> {
        let deal = store.deal(self.active_deal()?)?;
        let stage = store.stage(&deal.stage)?;
        Some((deal, stage))
    }

    /// Finishes the drag. The session is idle afterwards whatever the result.
    ///
    /// A drop over a stage column moves the deal even when it is the column
    /// the deal already sits in; that refreshes `updated_at`.
    pub fn end(
        &mut self,
        store: &mut EntityStore,
        over: Option<&DroppableId>,
    ) -> CrmResult<DropOutcome> {
        let state = std::mem::take(&mut self.state);
        let DragState::Dragging { deal_id } = state else {
            return Ok(DropOutcome::NoActiveDrag);
        };
        let Some(over) = over else {
            debug!(deal_id = deal_id.0, "drag: dropped outside any target");
            return Ok(DropOutcome::NoTarget);
        };
        if over.as_str() == deal_id.to_string() {
            return Ok(DropOutcome::Unchanged);
        }

        let target = StageId::new(over.as_str());
        if store.stage(&target).is_none() {
            debug!(deal_id = deal_id.0, over = over.as_str(), "drag: target is not a stage");
            return Ok(DropOutcome::Ignored);
        }

        let Some(from) = store.deal(deal_id).map(|deal| deal.stage.clone()) else {
            return Err(CrmError::not_found("deal", deal_id));
        };
        let moved = store.move_deal(deal_id, &target)?;
        info!(
            deal_id = deal_id.0,
            from = from.as_str(),
            to = moved.stage.as_str(),
            "drag: deal moved"
        );
        Ok(DropOutcome::Moved {
            deal_id,
            from,
            to: moved.stage,
        })
    }
}

#[cfg(test)]
#[path = "tests/drag_tests.rs"]
mod tests;
