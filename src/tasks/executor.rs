//! # Long-Running Task Executor
//!
//! In-process task substrate: tracks task lifecycle, runs workloads item
//! by item, records per-item outcomes, and honors cooperative cancellation
//! between items. Tasks stay in the tracker after completion as
//! historical, auditable records.
//!
//! The executor does not deduplicate logically-equivalent submissions; it
//! has no visibility into task identity semantics beyond the task type.
//! Submitting processors that need at-most-one-concurrent use
//! [`LongRunningTaskExecutor::is_running`] to check-then-submit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::tasks::task::{OperationResult, Task, TaskState};
use crate::tasks::workload::TaskWorkload;

/// Abstract task substrate, substitutable by a test double.
#[async_trait]
pub trait TaskSubstrate: Send + Sync {
    /// Submit for background execution; returns immediately with a
    /// tracked handle. Failures are visible only through the task's
    /// recorded item outcomes, never at the submission site.
    async fn execute(&self, task: Task, workload: Arc<dyn TaskWorkload>) -> Result<TaskHandle>;

    /// Run on the caller's task, inside the caller's transaction.
    /// Returns the final task record; an aborted run (first item failure
    /// with `continue_on_exception` unset) surfaces as `Err` so the
    /// triggering change can roll back.
    async fn execute_sync(&self, task: Task, workload: Arc<dyn TaskWorkload>) -> Result<Task>;
}

/// Handle to a background task submitted through [`TaskSubstrate::execute`].
pub struct TaskHandle {
    task_id: Uuid,
    join: JoinHandle<Task>,
}

impl TaskHandle {
    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    /// Wait for the background run to finish and return the final record.
    pub async fn wait(self) -> Result<Task> {
        self.join
            .await
            .map_err(|e| CoreError::Task(format!("task worker panicked: {e}")))
    }
}

struct TrackedTask {
    record: RwLock<Task>,
    cancel: AtomicBool,
}

/// In-process implementation of the task substrate.
#[derive(Default)]
pub struct LongRunningTaskExecutor {
    tasks: DashMap<Uuid, Arc<TrackedTask>>,
}

impl LongRunningTaskExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a tracked task (live or historical).
    pub fn find(&self, task_id: Uuid) -> Option<Task> {
        self.tasks.get(&task_id).map(|t| t.record.read().clone())
    }

    /// Snapshots of every tracked task.
    pub fn list(&self) -> Vec<Task> {
        self.tasks.iter().map(|t| t.record.read().clone()).collect()
    }

    /// True when any task of this logical type has not yet reached a
    /// terminal state (submitted or running). The check-then-submit hook
    /// for processors that deduplicate their own escalations.
    pub fn is_running(&self, task_type: &str) -> bool {
        self.tasks.iter().any(|t| {
            let record = t.record.read();
            record.task_type == task_type && !record.state.is_terminal()
        })
    }

    /// Request cooperative cancellation. The worker observes the flag at
    /// the next between-items checkpoint; mid-item work is not
    /// interrupted.
    pub fn cancel(&self, task_id: Uuid) -> Result<()> {
        let tracked = self
            .tasks
            .get(&task_id)
            .ok_or(CoreError::TaskNotFound(task_id))?;
        tracked.cancel.store(true, Ordering::SeqCst);
        info!(task_id = %task_id, "task cancellation requested");
        Ok(())
    }

    fn track(&self, task: Task) -> Arc<TrackedTask> {
        let tracked = Arc::new(TrackedTask {
            record: RwLock::new(task),
            cancel: AtomicBool::new(false),
        });
        self.tasks.insert(tracked.record.read().id, tracked.clone());
        tracked
    }

    async fn run(tracked: Arc<TrackedTask>, workload: Arc<dyn TaskWorkload>) -> Task {
        let (task_id, task_type, continue_on_exception, require_new_transaction) = {
            let mut record = tracked.record.write();
            record.mark_running();
            (
                record.id,
                record.task_type.clone(),
                record.continue_on_exception,
                record.require_new_transaction,
            )
        };
        info!(
            task_id = %task_id,
            task_type = %task_type,
            description = workload.description().as_deref().unwrap_or(""),
            continue_on_exception,
            require_new_transaction,
            "task started"
        );

        let items = match workload.items().await {
            Ok(items) => items,
            Err(e) => {
                error!(task_id = %task_id, error = %e, "task failed to resolve items");
                let mut record = tracked.record.write();
                record.finish(
                    TaskState::Failed,
                    OperationResult::exception(format!("failed to resolve items: {e}")),
                );
                return record.clone();
            }
        };
        tracked.record.write().counters.total = items.len() as u64;

        for item_id in items {
            // Cooperative cancellation checkpoint.
            if tracked.cancel.load(Ordering::SeqCst) {
                info!(task_id = %task_id, "task canceled at checkpoint");
                let mut record = tracked.record.write();
                record.finish(TaskState::Canceled, OperationResult::canceled());
                return record.clone();
            }

            match workload.process_item(item_id).await {
                Ok(result) => {
                    tracked.record.write().record_item(item_id, result);
                }
                Err(e) => {
                    warn!(
                        task_id = %task_id,
                        item_id = %item_id,
                        error = %e,
                        "task item failed"
                    );
                    let mut record = tracked.record.write();
                    record.record_item(item_id, OperationResult::exception(e.to_string()));
                    if !continue_on_exception {
                        record.finish(
                            TaskState::Failed,
                            OperationResult::exception(format!("aborted on item {item_id}: {e}")),
                        );
                        return record.clone();
                    }
                }
            }
        }

        let mut record = tracked.record.write();
        if record.counters.failed > 0 {
            let message = format!(
                "{} of {} items failed",
                record.counters.failed, record.counters.total
            );
            record.finish(TaskState::Failed, OperationResult::exception(message));
        } else {
            record.finish(TaskState::Success, OperationResult::executed());
        }
        info!(
            task_id = %task_id,
            state = %record.state,
            success = record.counters.success,
            failed = record.counters.failed,
            warning = record.counters.warning,
            "task finished"
        );
        record.clone()
    }
}

#[async_trait]
impl TaskSubstrate for LongRunningTaskExecutor {
    async fn execute(&self, task: Task, workload: Arc<dyn TaskWorkload>) -> Result<TaskHandle> {
        let task_id = task.id;
        let tracked = self.track(task);
        let join = tokio::spawn(Self::run(tracked, workload));
        Ok(TaskHandle { task_id, join })
    }

    async fn execute_sync(&self, task: Task, workload: Arc<dyn TaskWorkload>) -> Result<Task> {
        let tracked = self.track(task);
        let record = Self::run(tracked, workload).await;

        if record.state == TaskState::Failed && !record.continue_on_exception {
            let reason = record
                .result
                .as_ref()
                .and_then(|r| r.message.clone())
                .unwrap_or_else(|| "task failed".to_string());
            return Err(CoreError::Task(format!(
                "task '{}' ({}) failed: {reason}",
                record.task_type, record.id
            )));
        }
        Ok(record)
    }
}
