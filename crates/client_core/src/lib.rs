use std::{sync::Arc, time::Duration};

use shared::{
    clock::Clock,
    domain::{Activity, ActivityId, DealId},
    error::CrmResult,
    protocol::ActivityPatch,
};
use storage::{EntityStore, KeyValueStore};
use tracing::info;

pub mod drag;
pub mod session;

pub use drag::{closest_corners, DragSession, DragState, DropOutcome, DroppableId, Rect};
pub use session::{
    AuthError, AuthService, MockAuthService, SessionManager, SessionState,
    DEFAULT_LOGIN_LATENCY, DEFAULT_LOGIN_TIMEOUT,
};

/// Everything one running CRM front end owns.
///
/// Instances are independent; nothing is shared through globals.
pub struct CrmApp {
    store: EntityStore,
    session: SessionManager,
    drag: DragSession,
}

impl CrmApp {
    pub fn new(store: EntityStore, session: SessionManager) -> Self {
        Self {
            store,
            session,
            drag: DragSession::new(),
        }
    }

    /// Demo data plus the mock login flow over `local`.
    pub fn demo(
        clock: Arc<dyn Clock>,
        local: Arc<dyn KeyValueStore>,
        login_latency: Duration,
        login_timeout: Duration,
    ) -> Self {
        let auth = Arc::new(MockAuthService::new(login_latency));
        Self::new(
            EntityStore::seeded(clock),
            SessionManager::new(auth, local, login_timeout),
        )
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    pub fn start_drag(&mut self, deal_id: DealId) {
        self.drag.start(deal_id);
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    pub fn end_drag(&mut self, over: Option<&DroppableId>) -> CrmResult<DropOutcome> {
        self.drag.end(&mut self.store, over)
    }

    /// A whole drag gesture at once: pick up `deal_id`, release over `over`.
    pub fn drop_deal(&mut self, deal_id: DealId, over: Option<&DroppableId>) -> CrmResult<DropOutcome> {
        self.start_drag(deal_id);
        self.end_drag(over)
    }

    pub fn complete_activity(&mut self, id: ActivityId) -> CrmResult<Activity> {
        let activity = self
            .store
            .update_activity(id, ActivityPatch::default().completed(true))?;
        info!(activity_id = id.0, "app: activity completed");
        Ok(activity)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
