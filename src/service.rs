//! Todo service: one shared task store plus one breakdown gateway.
//!
//! ## Add-with-breakdown flow
//!
//! ```text
//! Idle -> PendingInsert -> Resolved   (subtasks populated)
//!                      \-> Discarded  (task removed, error returned)
//! ```
//!
//! The store lock is held only for each synchronous mutation, never across
//! the gateway call, so other tasks stay mutable while a breakdown runs.
//! The pending task itself is reserved by the store until it settles.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::breakdown::{validate_subtasks, BreakdownError, GatewayRef};
use crate::task::{validate_title, SubtaskId, TaskError, TaskId, TaskStore, TaskView};

pub type SharedTaskStore = Arc<RwLock<TaskStore>>;

/// Errors surfaced by service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Breakdown(#[from] BreakdownError),

    /// The background breakdown task panicked or was aborted
    #[error("Breakdown task failed: {0}")]
    Internal(String),
}

/// What to do with a pending task whose breakdown failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnFailure {
    /// Newly inserted task: remove it
    Discard,
    /// Existing task: keep it and its previous subtasks
    Release,
}

#[derive(Clone)]
pub struct TodoService {
    store: SharedTaskStore,
    gateway: GatewayRef,
}

impl TodoService {
    pub fn new(gateway: GatewayRef) -> Self {
        Self {
            store: Arc::new(RwLock::new(TaskStore::new())),
            gateway,
        }
    }

    pub fn gateway(&self) -> &GatewayRef {
        &self.gateway
    }

    pub async fn snapshot(&self) -> Vec<TaskView> {
        self.store.read().await.snapshot()
    }

    pub async fn get(&self, id: TaskId) -> Option<TaskView> {
        self.store.read().await.get(id).map(TaskView::from)
    }

    /// Add a task with caller-supplied subtasks (possibly none).
    pub async fn add_task(
        &self,
        title: &str,
        subtask_titles: &[String],
    ) -> Result<TaskView, ServiceError> {
        let mut store = self.store.write().await;
        let id = store.add_task(title, subtask_titles)?;
        info!(task_id = %id, "Task created");
        Ok(view_of(&store, id)?)
    }

    /// Insert a pending task, break its title down, then resolve or discard it.
    ///
    /// # Postconditions
    /// - On success the task holds the gateway's subtasks in order
    /// - On failure the store is as if the add had never been attempted
    /// - Dropping the returned future does not leave the task pending: the
    ///   breakdown settles in a background task either way
    pub async fn add_with_breakdown(&self, title: &str) -> Result<TaskView, ServiceError> {
        // Validate before touching the store or the gateway
        let title = validate_title(title)?;

        let id = self.store.write().await.add_pending_task(&title)?;
        info!(task_id = %id, gateway = self.gateway.name(), "Breakdown started");

        self.settle_in_background(id, title, OnFailure::Discard)
            .await
    }

    /// Break down an existing task on demand, replacing its subtasks.
    ///
    /// A failure leaves the task and its previous subtasks in place.
    pub async fn breakdown_existing(&self, id: TaskId) -> Result<TaskView, ServiceError> {
        let title = {
            let mut store = self.store.write().await;
            store.begin_breakdown(id)?;
            store
                .get(id)
                .map(|t| t.title().to_string())
                .ok_or(TaskError::NotFound(id))?
        };
        info!(task_id = %id, gateway = self.gateway.name(), "On-demand breakdown started");

        self.settle_in_background(id, title, OnFailure::Release)
            .await
    }

    /// Run the gateway call and the resolve/discard step on a spawned task.
    ///
    /// The spawned task owns the pending reservation, so it runs to completion
    /// even when the caller's future is dropped.
    async fn settle_in_background(
        &self,
        id: TaskId,
        title: String,
        on_failure: OnFailure,
    ) -> Result<TaskView, ServiceError> {
        let store = Arc::clone(&self.store);
        let gateway = Arc::clone(&self.gateway);
        let handle = tokio::spawn(async move {
            let outcome = gateway.breakdown(&title).await;
            settle(&store, id, outcome, on_failure).await
        });

        match handle.await {
            Ok(result) => result,
            Err(e) => {
                error!(task_id = %id, "Breakdown task did not complete: {}", e);
                let mut store = self.store.write().await;
                match on_failure {
                    OnFailure::Discard => {
                        store.discard_pending_task(id);
                    }
                    OnFailure::Release => store.release_pending(id),
                }
                Err(ServiceError::Internal(e.to_string()))
            }
        }
    }

    pub async fn toggle_task(&self, id: TaskId) -> Result<TaskView, ServiceError> {
        let mut store = self.store.write().await;
        store.toggle_task(id).map_err(log_benign)?;
        Ok(view_of(&store, id)?)
    }

    pub async fn toggle_subtask(
        &self,
        task_id: TaskId,
        subtask_id: SubtaskId,
    ) -> Result<TaskView, ServiceError> {
        let mut store = self.store.write().await;
        store
            .toggle_subtask(task_id, subtask_id)
            .map_err(log_benign)?;
        Ok(view_of(&store, task_id)?)
    }

    /// Delete a task; deleting an absent task is a no-op.
    pub async fn delete_task(&self, id: TaskId) -> Result<bool, ServiceError> {
        let removed = self.store.write().await.delete_task(id)?;
        if removed {
            info!(task_id = %id, "Task deleted");
        }
        Ok(removed)
    }

    /// Break a title down without touching the store.
    pub async fn breakdown(&self, title: &str) -> Result<Vec<String>, BreakdownError> {
        self.gateway.breakdown(title).await
    }
}

fn view_of(store: &TaskStore, id: TaskId) -> Result<TaskView, TaskError> {
    store
        .get(id)
        .map(TaskView::from)
        .ok_or(TaskError::NotFound(id))
}

/// Apply a breakdown outcome to a pending task.
///
/// Exactly one of resolve, discard or release happens for `id`.
async fn settle(
    store: &SharedTaskStore,
    id: TaskId,
    outcome: Result<Vec<String>, BreakdownError>,
    on_failure: OnFailure,
) -> Result<TaskView, ServiceError> {
    // Gateways are checked here too, so bad data is always a breakdown error
    let outcome = outcome.and_then(validate_subtasks);

    let mut store = store.write().await;
    let result = match outcome {
        Ok(subtasks) => store
            .resolve_pending_task(id, &subtasks)
            .map(|()| subtasks.len())
            .map_err(ServiceError::from),
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(count) => {
            info!(task_id = %id, subtasks = count, "Breakdown resolved");
            Ok(view_of(&store, id)?)
        }
        Err(e) => {
            match on_failure {
                OnFailure::Discard => {
                    store.discard_pending_task(id);
                    warn!(task_id = %id, "Breakdown failed, pending task discarded: {}", e);
                }
                OnFailure::Release => {
                    store.release_pending(id);
                    warn!(task_id = %id, "On-demand breakdown failed: {}", e);
                }
            }
            Err(e)
        }
    }
}

fn log_benign(error: TaskError) -> TaskError {
    if error.is_benign() {
        debug!("Ignoring mutation of a removed task: {}", error);
    }
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakdown::{BreakdownErrorKind, BreakdownGateway, KeywordBreakdownGateway};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Fails for titles containing "fail", otherwise returns fixed steps.
    struct ScriptedGateway;

    #[async_trait]
    impl BreakdownGateway for ScriptedGateway {
        async fn breakdown(&self, title: &str) -> Result<Vec<String>, BreakdownError> {
            if title.contains("fail") {
                Err(BreakdownError::status(500, "Internal Server Error"))
            } else {
                Ok(vec!["a".to_string(), "b".to_string(), "c".to_string()])
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    /// Blocks until released, so tests can observe the pending state.
    struct GatedGateway {
        release: Arc<Notify>,
        fail: bool,
    }

    #[async_trait]
    impl BreakdownGateway for GatedGateway {
        async fn breakdown(&self, _title: &str) -> Result<Vec<String>, BreakdownError> {
            self.release.notified().await;
            if self.fail {
                Err(BreakdownError::network("connection reset"))
            } else {
                Ok(vec!["step".to_string()])
            }
        }

        fn name(&self) -> &'static str {
            "gated"
        }
    }

    /// Returns whatever list it was built with, without checking it.
    struct FixedGateway(Vec<String>);

    #[async_trait]
    impl BreakdownGateway for FixedGateway {
        async fn breakdown(&self, _title: &str) -> Result<Vec<String>, BreakdownError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn gated(fail: bool) -> (TodoService, Arc<Notify>) {
        let release = Arc::new(Notify::new());
        let service = TodoService::new(Arc::new(GatedGateway {
            release: Arc::clone(&release),
            fail,
        }));
        (service, release)
    }

    async fn wait_for_pending(service: &TodoService) -> TaskView {
        loop {
            if let Some(task) = service.snapshot().await.into_iter().find(|t| t.pending) {
                return task;
            }
            tokio::task::yield_now().await;
        }
    }

    async fn wait_until_settled(service: &TodoService) -> Vec<TaskView> {
        loop {
            let tasks = service.snapshot().await;
            if tasks.iter().all(|t| !t.pending) {
                return tasks;
            }
            tokio::task::yield_now().await;
        }
    }

    fn scripted() -> TodoService {
        TodoService::new(Arc::new(ScriptedGateway))
    }

    #[tokio::test]
    async fn add_with_breakdown_populates_subtasks_in_order() {
        let service = scripted();
        let view = service.add_with_breakdown("  x ").await.unwrap();

        assert_eq!(view.title, "x");
        assert!(!view.pending);
        assert!(!view.completed);
        let titles: Vec<&str> = view.subtasks.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert_eq!(view.progress, Some(0.0));
    }

    #[tokio::test]
    async fn failed_breakdown_discards_pending_task() {
        let service = scripted();
        service.add_task("keep me", &[]).await.unwrap();

        let err = service.add_with_breakdown("fail-me").await.unwrap_err();
        assert!(matches!(err, ServiceError::Breakdown(_)));

        let tasks = service.snapshot().await;
        assert_eq!(tasks.len(), 1);
        assert!(tasks.iter().all(|t| t.title != "fail-me"));
    }

    #[tokio::test]
    async fn blank_title_never_reaches_store_or_gateway() {
        let service = scripted();
        let err = service.add_with_breakdown("   ").await.unwrap_err();
        assert!(matches!(err, ServiceError::Task(TaskError::Validation(_))));
        assert!(service.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn store_stays_usable_while_breakdown_is_in_flight() {
        let (service, release) = gated(false);
        let other = service.add_task("other", &[]).await.unwrap();

        let flow = {
            let service = service.clone();
            tokio::spawn(async move { service.add_with_breakdown("slow").await })
        };

        let pending = wait_for_pending(&service).await;
        assert_eq!(pending.title, "slow");
        assert!(pending.subtasks.is_empty());

        // Unrelated tasks can change; the pending one is reserved
        assert!(service.toggle_task(other.id).await.unwrap().completed);
        assert!(matches!(
            service.delete_task(pending.id).await,
            Err(ServiceError::Task(TaskError::Reserved(_)))
        ));

        release.notify_one();
        let resolved = flow.await.unwrap().unwrap();
        assert_eq!(resolved.id, pending.id);
        assert!(!resolved.pending);
        assert_eq!(resolved.subtasks.len(), 1);
    }

    #[tokio::test]
    async fn dropped_caller_still_resolves_pending_task() {
        let (service, release) = gated(false);
        let flow = {
            let service = service.clone();
            tokio::spawn(async move { service.add_with_breakdown("slow").await })
        };
        let pending = wait_for_pending(&service).await;

        // The client goes away mid-breakdown
        flow.abort();
        assert!(flow.await.unwrap_err().is_cancelled());

        release.notify_one();
        let tasks = wait_until_settled(&service).await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, pending.id);
        assert_eq!(tasks[0].subtasks.len(), 1);

        // No longer reserved
        assert!(service.toggle_task(pending.id).await.unwrap().completed);
        assert!(service.delete_task(pending.id).await.unwrap());
    }

    #[tokio::test]
    async fn dropped_caller_still_discards_failed_task() {
        let (service, release) = gated(true);
        let flow = {
            let service = service.clone();
            tokio::spawn(async move { service.add_with_breakdown("slow").await })
        };
        wait_for_pending(&service).await;
        flow.abort();
        let _ = flow.await;

        release.notify_one();
        loop {
            if service.snapshot().await.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn dropped_caller_still_releases_existing_task() {
        let (service, release) = gated(true);
        let id = service.add_task("errand", &["old".to_string()]).await.unwrap().id;
        let flow = {
            let service = service.clone();
            tokio::spawn(async move { service.breakdown_existing(id).await })
        };
        wait_for_pending(&service).await;
        flow.abort();
        let _ = flow.await;

        release.notify_one();
        let tasks = wait_until_settled(&service).await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].subtasks[0].title, "old");
        assert!(service.delete_task(id).await.unwrap());
    }

    #[tokio::test]
    async fn empty_gateway_result_is_a_breakdown_error() {
        let service = TodoService::new(Arc::new(FixedGateway(Vec::new())));
        let err = service.add_with_breakdown("x").await.unwrap_err();
        match err {
            ServiceError::Breakdown(e) => assert_eq!(e.kind, BreakdownErrorKind::Malformed),
            other => panic!("expected breakdown error, got {:?}", other),
        }
        assert!(service.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn blank_gateway_entry_keeps_existing_subtasks() {
        let service = TodoService::new(Arc::new(FixedGateway(vec![
            "ok".to_string(),
            "  ".to_string(),
        ])));
        let task = service.add_task("errand", &["old".to_string()]).await.unwrap();

        let err = service.breakdown_existing(task.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Breakdown(_)));
        let view = service.get(task.id).await.unwrap();
        assert!(!view.pending);
        assert_eq!(view.subtasks[0].title, "old");
    }

    #[tokio::test]
    async fn breakdown_existing_replaces_subtasks() {
        let service = scripted();
        let task = service
            .add_task("errand", &["old".to_string()])
            .await
            .unwrap();

        let view = service.breakdown_existing(task.id).await.unwrap();
        let titles: Vec<&str> = view.subtasks.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert!(!view.pending);
    }

    #[tokio::test]
    async fn failed_breakdown_existing_keeps_task() {
        let service = scripted();
        let task = service
            .add_task("fail later", &["old".to_string()])
            .await
            .unwrap();

        assert!(service.breakdown_existing(task.id).await.is_err());
        let view = service.get(task.id).await.unwrap();
        assert!(!view.pending);
        assert_eq!(view.subtasks.len(), 1);
        assert_eq!(view.subtasks[0].title, "old");
    }

    #[tokio::test]
    async fn toggles_after_delete_are_benign_not_found() {
        let service = scripted();
        let task = service.add_with_breakdown("trip").await.unwrap();
        let subtask = task.subtasks[0].id;

        assert!(service.delete_task(task.id).await.unwrap());
        assert!(!service.delete_task(task.id).await.unwrap());
        for result in [
            service.toggle_task(task.id).await,
            service.toggle_subtask(task.id, subtask).await,
        ] {
            match result {
                Err(ServiceError::Task(e)) => assert!(e.is_benign()),
                other => panic!("expected NotFound, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn keyword_gateway_drives_full_flow() {
        let service = TodoService::new(Arc::new(KeywordBreakdownGateway::with_delay(
            Duration::ZERO,
        )));
        let view = service.add_with_breakdown("weekend shopping").await.unwrap();
        assert_eq!(view.total_count, 5);
        assert_eq!(view.subtasks[0].title, "list what you need");

        let toggled = service.toggle_task(view.id).await.unwrap();
        assert!(toggled.completed);
        assert_eq!(toggled.completed_count, 5);
        assert_eq!(toggled.progress, Some(1.0));
    }
}
