//! # Entity Processor Contract
//!
//! The pluggable unit of behavior. One implementation exists per distinct
//! business rule; dozens are registered per deployment. Processors declare
//! the event types they react to, an order within the chain, and an
//! overridable conditional; the registry guarantees a processor is never
//! invoked for an event type it does not support.
//!
//! ## Ordering convention
//!
//! More negative orders run earlier. Prepare processors use orders around
//! [`crate::constants::order::PREPARE`] to capture state before the primary
//! persistence processor; cross-cutting side effects use orders `>= 100`
//! ([`crate::constants::order::AFTER_SAVE`]) because they rely on the save
//! processor having already persisted the entity and replaced the content
//! with generated fields.
//!
//! ## Re-entrancy convention
//!
//! Every processor that can be triggered transitively by its own side
//! effects must declare a skip key in [`crate::constants::properties`] and
//! check it first in `process`, returning an unmodified, non-closing
//! result when set.

use async_trait::async_trait;

use crate::error::Result;
use crate::events::context::EventResult;
use crate::events::envelope::{EntityContent, EntityEvent};
use crate::events::types::EventType;

#[async_trait]
pub trait EntityProcessor<T: EntityContent>: Send + Sync {
    /// Unique processor name, used for registry diagnostics, enablement
    /// checks, and the result log.
    fn name(&self) -> &str;

    /// Position in the chain; ties resolve by registration order.
    fn order(&self) -> i32 {
        0
    }

    /// Event types this processor reacts to. The registry never resolves
    /// a processor for an event type outside this set.
    fn event_types(&self) -> Vec<EventType>;

    fn supports(&self, event_type: EventType) -> bool {
        self.event_types().contains(&event_type)
    }

    /// Decide whether `process` should run for this envelope. The default
    /// re-checks event-type support; overrides typically add an
    /// update-diff (e.g. "did the parent change?") via
    /// [`EntityEvent::changed`]. A skipped processor leaves no trace in
    /// the event context. Errors abort the whole chain.
    fn conditional(&self, event: &EntityEvent<T>) -> Result<bool> {
        Ok(self.supports(event.event_type()))
    }

    /// Execute the business rule. Receives the envelope mutably so it can
    /// replace content and read/write shared properties; returns the
    /// result recorded in the event context. Errors abort the chain and
    /// propagate to the `publish` caller.
    async fn process(&self, event: &mut EntityEvent<T>) -> Result<EventResult<T>>;
}
