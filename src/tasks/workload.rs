//! Task workload contract.
//!
//! A workload names the logical task type and drives the per-item work;
//! the executor owns lifecycle, counters, cancellation checkpoints, and
//! item outcome records.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::tasks::task::OperationResult;

#[async_trait]
pub trait TaskWorkload: Send + Sync {
    /// Logical task type. Equivalent submissions share this key; a
    /// processor that wants at-most-one-concurrent uses it to
    /// check-then-submit against the executor.
    fn task_type(&self) -> &str;

    fn description(&self) -> Option<String> {
        None
    }

    /// Identifiers of the items to process, resolved once at task start.
    async fn items(&self) -> Result<Vec<Uuid>>;

    /// Process a single item. `Err` counts as a failed item; whether the
    /// task continues afterwards is governed by `continue_on_exception`.
    async fn process_item(&self, item_id: Uuid) -> Result<OperationResult>;
}
