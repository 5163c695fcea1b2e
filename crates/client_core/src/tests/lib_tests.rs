use super::*;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use shared::{clock::ManualClock, domain::StageId, error::CrmError};
use std::{collections::HashMap, time::Duration};
use tokio::sync::Mutex;

#[derive(Default)]
struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.values.lock().await.remove(key).is_some())
    }
}

fn setup() -> CrmApp {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2023, 5, 21, 9, 0, 0).unwrap());
    CrmApp::demo(
        Arc::new(clock),
        Arc::new(MemoryStore::default()),
        Duration::from_millis(5),
        Duration::from_millis(50),
    )
}

#[test]
fn drop_deal_runs_a_full_gesture() {
    let mut app = setup();

    let outcome = app
        .drop_deal(DealId(3), Some(&DroppableId::from("qualified")))
        .expect("drop");

    assert!(matches!(outcome, DropOutcome::Moved { .. }));
    assert_eq!(
        app.store().deal(DealId(3)).map(|d| d.stage.clone()),
        Some(StageId::from("qualified"))
    );
    assert_eq!(app.drag().state(), DragState::Idle);
}

#[test]
fn drag_can_be_started_and_cancelled_through_app() {
    let mut app = setup();
    app.start_drag(DealId(1));
    assert_eq!(app.drag().active_deal(), Some(DealId(1)));

    app.cancel_drag();
    assert_eq!(
        app.end_drag(Some(&DroppableId::from("lead"))).expect("end"),
        DropOutcome::NoActiveDrag
    );
}

#[test]
fn complete_activity_marks_it_done() {
    let mut app = setup();
    let pending = app
        .store()
        .activities()
        .iter()
        .find(|a| !a.completed)
        .map(|a| a.id)
        .expect("pending activity");

    let done = app.complete_activity(pending).expect("complete");
    assert!(done.completed);

    let err = app.complete_activity(ActivityId(42)).expect_err("unknown id");
    assert!(matches!(err, CrmError::NotFound { .. }));
}

#[tokio::test]
async fn apps_do_not_share_state() {
    let mut first = setup();
    let second = setup();

    first.store_mut().delete_deal(DealId(1));
    first
        .session()
        .login("a@b.c", "pw")
        .await
        .expect("login");

    assert_eq!(first.store().deals().len(), 4);
    assert_eq!(second.store().deals().len(), 5);
    assert!(first.session().is_authenticated().await);
    assert!(!second.session().is_authenticated().await);
}
