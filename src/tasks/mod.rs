//! Long-running task substrate: tracked, cancellable background work with
//! per-item outcomes.

pub mod executor;
pub mod task;
pub mod workload;

// Re-export key types for convenience
pub use executor::{LongRunningTaskExecutor, TaskHandle, TaskSubstrate};
pub use task::{OperationResult, OperationState, Task, TaskCounters, TaskItemResult, TaskState};
pub use workload::TaskWorkload;
