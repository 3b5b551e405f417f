#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # idgov-core
//!
//! In-process entity event processing and orchestration engine for an
//! identity-governance platform.
//!
//! ## Overview
//!
//! Business logic (provisioning, automatic-role recomputation, audit,
//! notification, approval triggering) is not hard-coded into services; it
//! fires as side effects of entity lifecycle changes. A caller wraps a
//! changed entity in an [`events::EntityEvent`] envelope and publishes it;
//! the dispatcher resolves the ordered chain of registered processors for
//! that (entity type, event type) pair and runs them conditionally, one
//! after another, on the calling task.
//!
//! Some processors run heavy recomputation. Instead of doing that work
//! inline, they escalate it through [`events::Escalator`] to the
//! long-running task substrate: synchronously (inside the triggering
//! operation, failures propagate) for immediate-priority events, or as a
//! tracked, cancellable background task otherwise.
//!
//! This crate is not a durable or distributed message broker. Events are
//! never persisted or delivered across process boundaries, and ordering
//! guarantees apply only within a single `publish` call.
//!
//! ## Module Organization
//!
//! - [`events`] - Envelope, processor contract, registry, dispatcher, and
//!   the priority/escalation layer
//! - [`tasks`] - Long-running task model, workload contract, and executor
//! - [`constants`] - Well-known property keys and ordering conventions
//! - [`config`] - Engine configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging initialization
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use idgov_core::events::{
//!     EntityContent, EntityEvent, EntityEventDispatcher, EventType, ProcessorRegistry,
//! };
//!
//! #[derive(Debug, Clone)]
//! struct Identity {
//!     username: String,
//! }
//!
//! impl EntityContent for Identity {
//!     const ENTITY_TYPE: &'static str = "identity";
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ProcessorRegistry::<Identity>::builder()
//!     // .register(Arc::new(SaveIdentityProcessor::new(...)))
//!     // .register(Arc::new(IdentityProvisioningProcessor::new(...)))
//!     .build()?;
//!
//! let dispatcher = EntityEventDispatcher::new(Arc::new(registry));
//! let event = EntityEvent::new(
//!     EventType::Create,
//!     Identity {
//!         username: "alice".to_string(),
//!     },
//! );
//! let context = dispatcher.publish(event).await?;
//! println!("processors run: {}", context.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod logging;
pub mod tasks;

pub use config::EngineConfig;
pub use error::{CoreError, Result};
pub use events::{
    EntityContent, EntityEvent, EntityEventDispatcher, EntityProcessor, EventContext, EventEngine,
    EventResult, EventType, PriorityType,
};
pub use tasks::{LongRunningTaskExecutor, Task, TaskState, TaskSubstrate, TaskWorkload};
