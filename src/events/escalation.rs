//! # Priority-Based Escalation
//!
//! Decides, per triggered unit of work, whether it runs inline in the
//! caller's transaction or is handed to the task substrate. This is a
//! design contract, not an optimization:
//!
//! - `Immediate` priority runs through the substrate's synchronous entry
//!   point; failures propagate and can roll back the triggering change.
//! - `Normal` priority builds a task with `continue_on_exception` set (a
//!   single bad item must not abort a large recomputation), additionally
//!   marks it `require_new_transaction` when the deployment is
//!   asynchronous/multi-instance (the task must not share, and cannot be
//!   rolled back by, the triggering transaction), submits it
//!   asynchronously, and returns without waiting.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::events::envelope::{EntityContent, EntityEvent};
use crate::events::types::PriorityType;
use crate::tasks::executor::{TaskHandle, TaskSubstrate};
use crate::tasks::task::Task;
use crate::tasks::workload::TaskWorkload;
use uuid::Uuid;

/// How an escalated unit of work was handled.
pub enum EscalationOutcome {
    /// Ran synchronously; the final task record is available now.
    Completed(Task),
    /// Submitted to the background pool; discoverable through the handle.
    Scheduled(TaskHandle),
}

impl EscalationOutcome {
    pub fn task_id(&self) -> Uuid {
        match self {
            Self::Completed(task) => task.id,
            Self::Scheduled(handle) => handle.task_id(),
        }
    }
}

/// The priority/escalation layer used by heavy processors (automatic-role
/// recomputation, subtree reconciliation, ...).
pub struct Escalator {
    substrate: Arc<dyn TaskSubstrate>,
    config: EngineConfig,
}

impl Escalator {
    pub fn new(substrate: Arc<dyn TaskSubstrate>, config: EngineConfig) -> Self {
        Self { substrate, config }
    }

    /// Escalate per the envelope's priority.
    pub async fn escalate_for<T: EntityContent>(
        &self,
        event: &EntityEvent<T>,
        workload: Arc<dyn TaskWorkload>,
    ) -> Result<EscalationOutcome> {
        self.escalate(event.priority(), workload).await
    }

    pub async fn escalate(
        &self,
        priority: PriorityType,
        workload: Arc<dyn TaskWorkload>,
    ) -> Result<EscalationOutcome> {
        match priority {
            PriorityType::Immediate => {
                debug!(
                    task_type = workload.task_type(),
                    "immediate priority, executing synchronously"
                );
                let task = Task::new(workload.task_type(), &self.config.instance_id);
                let record = self.substrate.execute_sync(task, workload).await?;
                Ok(EscalationOutcome::Completed(record))
            }
            PriorityType::Normal => {
                let mut task = Task::new(workload.task_type(), &self.config.instance_id);
                task.set_continue_on_exception(true);
                if self.config.asynchronous {
                    task.set_require_new_transaction(true);
                }
                info!(
                    task_id = %task.id,
                    task_type = %task.task_type,
                    require_new_transaction = task.require_new_transaction,
                    "escalating to background task"
                );
                let handle = self.substrate.execute(task, workload).await?;
                Ok(EscalationOutcome::Scheduled(handle))
            }
        }
    }
}
