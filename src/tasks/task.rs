//! Long-running task model.
//!
//! A task is a named unit of deferred work with a tracked lifecycle,
//! per-item outcome records (used for audit and partial retry), and
//! aggregate counters. Tasks are retained after completion purely as
//! historical records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Task lifecycle: `Created → Running → {Success, Failed, Canceled}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    #[default]
    Created,
    Running,
    Success,
    Failed,
    Canceled,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Canceled)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

impl std::str::FromStr for TaskState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "running" => Ok(Self::Running),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            "canceled" => Ok(Self::Canceled),
            _ => Err(format!("Invalid task state: {s}")),
        }
    }
}

/// Outcome state of one processed item (or of the task as a whole).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationState {
    Executed,
    Warning,
    Exception,
    NotExecuted,
    Canceled,
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executed => write!(f, "executed"),
            Self::Warning => write!(f, "warning"),
            Self::Exception => write!(f, "exception"),
            Self::NotExecuted => write!(f, "not_executed"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

/// Per-item (or whole-task) operation result with optional code/message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    pub state: OperationState,
    pub code: Option<String>,
    pub message: Option<String>,
}

impl OperationResult {
    pub fn executed() -> Self {
        Self {
            state: OperationState::Executed,
            code: None,
            message: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            state: OperationState::Warning,
            code: None,
            message: Some(message.into()),
        }
    }

    pub fn exception(message: impl Into<String>) -> Self {
        Self {
            state: OperationState::Exception,
            code: None,
            message: Some(message.into()),
        }
    }

    pub fn canceled() -> Self {
        Self {
            state: OperationState::Canceled,
            code: None,
            message: None,
        }
    }
}

/// Audit record for one processed item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskItemResult {
    pub referenced_entity_id: Uuid,
    pub result: OperationResult,
    pub processed_at: DateTime<Utc>,
}

/// Aggregate item counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TaskCounters {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub warning: u64,
}

/// A tracked unit of deferred work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    /// Logical task type, shared by equivalent submissions (the key a
    /// submitting processor uses for check-then-submit deduplication).
    pub task_type: String,
    /// Instance that owns the execution, for cluster node identification.
    pub instance_id: String,
    pub state: TaskState,
    pub running: bool,
    /// A single bad item must not abort the whole run when set.
    pub continue_on_exception: bool,
    /// Commit-boundary contract toward persistence collaborators: the
    /// task must not share the triggering transaction and cannot be
    /// rolled back by it.
    pub require_new_transaction: bool,
    pub counters: TaskCounters,
    pub items: Vec<TaskItemResult>,
    /// Whole-task result, set when the task reaches a terminal state.
    pub result: Option<OperationResult>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(task_type: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_type: task_type.into(),
            instance_id: instance_id.into(),
            state: TaskState::Created,
            running: false,
            continue_on_exception: false,
            require_new_transaction: false,
            counters: TaskCounters::default(),
            items: Vec::new(),
            result: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn set_continue_on_exception(&mut self, value: bool) {
        self.continue_on_exception = value;
    }

    pub fn set_require_new_transaction(&mut self, value: bool) {
        self.require_new_transaction = value;
    }

    /// Transition `Created → Running`.
    pub fn mark_running(&mut self) {
        self.state = TaskState::Running;
        self.running = true;
        self.started_at = Some(Utc::now());
    }

    /// Transition into a terminal state with the whole-task result.
    pub fn finish(&mut self, state: TaskState, result: OperationResult) {
        debug_assert!(state.is_terminal());
        self.state = state;
        self.running = false;
        self.result = Some(result);
        self.finished_at = Some(Utc::now());
    }

    /// Record one processed item and update the counters.
    pub fn record_item(&mut self, referenced_entity_id: Uuid, result: OperationResult) {
        match result.state {
            OperationState::Executed => self.counters.success += 1,
            OperationState::Warning => self.counters.warning += 1,
            OperationState::Exception => self.counters.failed += 1,
            OperationState::NotExecuted | OperationState::Canceled => {}
        }
        self.items.push(TaskItemResult {
            referenced_entity_id,
            result,
            processed_at: Utc::now(),
        });
    }
}
