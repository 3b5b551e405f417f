//! Priority escalation and task substrate behavior: inline execution for
//! immediate priority, tracked background execution otherwise, per-item
//! failure handling, and cooperative cancellation.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use uuid::Uuid;

use common::TreeNode;
use idgov_core::config::EngineConfig;
use idgov_core::error::{CoreError, Result};
use idgov_core::events::{
    EntityEvent, EntityEventDispatcher, EntityProcessor, Escalator, EventResult, EventType,
    PriorityType, ProcessorRegistry,
};
use idgov_core::tasks::{
    LongRunningTaskExecutor, OperationResult, Task, TaskState, TaskSubstrate, TaskWorkload,
};

/// Recomputation-style workload: one item per affected identity, gated so
/// tests control when item work may proceed.
struct RecomputeWorkload {
    items: Vec<Uuid>,
    gate: Arc<Semaphore>,
    processed: Arc<AtomicUsize>,
    fail_on: Option<usize>,
}

impl RecomputeWorkload {
    fn open(item_count: usize) -> Self {
        Self::gated(item_count, item_count)
    }

    fn gated(item_count: usize, permits: usize) -> Self {
        Self {
            items: (0..item_count).map(|_| Uuid::new_v4()).collect(),
            gate: Arc::new(Semaphore::new(permits)),
            processed: Arc::new(AtomicUsize::new(0)),
            fail_on: None,
        }
    }

    fn failing_on(mut self, index: usize) -> Self {
        self.fail_on = Some(index);
        self
    }
}

#[async_trait]
impl TaskWorkload for RecomputeWorkload {
    fn task_type(&self) -> &str {
        "automatic_role_recompute"
    }

    async fn items(&self) -> Result<Vec<Uuid>> {
        Ok(self.items.clone())
    }

    async fn process_item(&self, item_id: Uuid) -> Result<OperationResult> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| CoreError::Task(e.to_string()))?;
        permit.forget();

        let index = self.processed.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == Some(index) {
            return Err(CoreError::Task(format!("identity {item_id} recompute failed")));
        }
        Ok(OperationResult::executed())
    }
}

/// Processor that escalates its heavy work per the envelope priority.
struct RecomputeProcessor {
    escalator: Arc<Escalator>,
    workload: Arc<RecomputeWorkload>,
    task_id: Arc<Mutex<Option<Uuid>>>,
}

#[async_trait]
impl EntityProcessor<TreeNode> for RecomputeProcessor {
    fn name(&self) -> &str {
        "automatic_role_recompute"
    }

    fn order(&self) -> i32 {
        100
    }

    fn event_types(&self) -> Vec<EventType> {
        vec![EventType::Update]
    }

    async fn process(&self, event: &mut EntityEvent<TreeNode>) -> Result<EventResult<TreeNode>> {
        let outcome = self
            .escalator
            .escalate_for(event, self.workload.clone())
            .await?;
        *self.task_id.lock().unwrap() = Some(outcome.task_id());
        Ok(EventResult::of(self.name(), event.content().clone()))
    }
}

struct Fixture {
    executor: Arc<LongRunningTaskExecutor>,
    workload: Arc<RecomputeWorkload>,
    task_id: Arc<Mutex<Option<Uuid>>>,
    dispatcher: EntityEventDispatcher<TreeNode>,
}

fn fixture(workload: RecomputeWorkload) -> Fixture {
    let executor = Arc::new(LongRunningTaskExecutor::new());
    let escalator = Arc::new(Escalator::new(
        executor.clone(),
        EngineConfig {
            instance_id: "test-node".to_string(),
            asynchronous: true,
        },
    ));

    let workload = Arc::new(workload);
    let task_id = Arc::new(Mutex::new(None));
    let processor: Arc<dyn EntityProcessor<TreeNode>> = Arc::new(RecomputeProcessor {
        escalator,
        workload: workload.clone(),
        task_id: task_id.clone(),
    });
    let registry = ProcessorRegistry::builder()
        .register(processor)
        .build()
        .unwrap();

    Fixture {
        executor,
        workload,
        task_id,
        dispatcher: EntityEventDispatcher::new(Arc::new(registry)),
    }
}

fn move_event(priority: PriorityType) -> EntityEvent<TreeNode> {
    let before = TreeNode::new("subtree");
    let moved = before.clone().under(Uuid::new_v4());
    EntityEvent::new(EventType::Update, moved)
        .with_original_source(before)
        .with_priority(priority)
}

async fn wait_for_terminal(executor: &LongRunningTaskExecutor, task_id: Uuid) -> Task {
    for _ in 0..500 {
        if let Some(task) = executor.find(task_id) {
            if task.state.is_terminal() {
                return task;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {task_id} did not reach a terminal state");
}

#[tokio::test]
async fn immediate_priority_completes_before_publish_returns() {
    let fx = fixture(RecomputeWorkload::open(3));

    fx.dispatcher
        .publish(move_event(PriorityType::Immediate))
        .await
        .unwrap();

    // All items were recomputed inside the publish call.
    assert_eq!(fx.workload.processed.load(Ordering::SeqCst), 3);

    let task_id = fx.task_id.lock().unwrap().unwrap();
    let task = fx.executor.find(task_id).unwrap();
    assert_eq!(task.state, TaskState::Success);
    assert!(!task.continue_on_exception);
    assert_eq!(task.counters.success, 3);
}

#[tokio::test]
async fn immediate_priority_failure_aborts_the_publish_call() {
    let fx = fixture(RecomputeWorkload::open(2).failing_on(0));

    let result = fx
        .dispatcher
        .publish(move_event(PriorityType::Immediate))
        .await;

    assert!(result.is_err());
    // Aborted on the first item; the second never ran.
    assert_eq!(fx.workload.processed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn normal_priority_returns_before_the_work_completes() {
    // No permits: item work cannot proceed until the test allows it.
    let fx = fixture(RecomputeWorkload::gated(2, 0));

    fx.dispatcher
        .publish(move_event(PriorityType::Normal))
        .await
        .unwrap();

    // Publish returned while the escalated work is still pending.
    assert_eq!(fx.workload.processed.load(Ordering::SeqCst), 0);

    let task_id = fx.task_id.lock().unwrap().unwrap();
    let task = fx.executor.find(task_id).expect("task must be discoverable");
    assert!(!task.state.is_terminal());
    assert!(task.continue_on_exception);
    assert!(task.require_new_transaction);

    fx.workload.gate.add_permits(2);
    let task = wait_for_terminal(&fx.executor, task_id).await;
    assert_eq!(task.state, TaskState::Success);
    assert_eq!(task.counters.success, 2);
}

#[tokio::test]
async fn background_task_continues_past_a_failed_item() {
    let fx = fixture(RecomputeWorkload::open(3).failing_on(1));

    fx.dispatcher
        .publish(move_event(PriorityType::Normal))
        .await
        .unwrap();

    let task_id = fx.task_id.lock().unwrap().unwrap();
    let task = wait_for_terminal(&fx.executor, task_id).await;

    // Partially failed, not aborted: every item has an outcome record.
    assert_eq!(task.state, TaskState::Failed);
    assert_eq!(task.counters.total, 3);
    assert_eq!(task.counters.success, 2);
    assert_eq!(task.counters.failed, 1);
    assert_eq!(task.items.len(), 3);
}

#[tokio::test]
async fn sync_execution_aborts_on_first_failure_without_continue_flag() {
    let executor = LongRunningTaskExecutor::new();
    let workload = Arc::new(RecomputeWorkload::open(3).failing_on(0));

    let task = Task::new(workload.task_type(), "test-node");
    let task_id = task.id;
    let result = executor.execute_sync(task, workload).await;

    assert!(matches!(result, Err(CoreError::Task(_))));
    let record = executor.find(task_id).unwrap();
    assert_eq!(record.state, TaskState::Failed);
    // Only the failing item was recorded; the rest never ran.
    assert_eq!(record.items.len(), 1);
    assert_eq!(record.counters.failed, 1);
}

#[tokio::test]
async fn cancellation_is_observed_between_items() {
    let executor = LongRunningTaskExecutor::new();
    let workload = Arc::new(RecomputeWorkload::gated(3, 0));

    let task = Task::new(workload.task_type(), "test-node");
    let handle = executor
        .execute(task, workload.clone())
        .await
        .unwrap();
    let task_id = handle.task_id();

    // Let exactly one item through, then request cancellation.
    workload.gate.add_permits(1);
    for _ in 0..500 {
        if workload.processed.load(Ordering::SeqCst) == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    executor.cancel(task_id).unwrap();
    workload.gate.add_permits(2);

    let record = handle.wait().await.unwrap();
    assert_eq!(record.state, TaskState::Canceled);
    // The flag is observed at a between-items checkpoint: an item already
    // in flight may finish, but at least one item never runs.
    assert!(workload.processed.load(Ordering::SeqCst) < 3);
    assert!(record.items.len() < 3);
    assert!(!executor.is_running("automatic_role_recompute"));
}
