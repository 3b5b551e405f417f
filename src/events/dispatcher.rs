//! # Entity Event Dispatcher
//!
//! Executes the ordered, conditional processor chain for one envelope and
//! aggregates the results. Dispatch is strictly sequential: processors run
//! one after another on the calling task, inside whatever transaction the
//! caller holds, and `publish` does not resolve until every non-escalated
//! processor has run. The engine provides no serialization between
//! concurrent `publish` calls for different envelopes; racing writers are
//! the persistence layer's concern.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{CoreError, Result};
use crate::events::context::EventContext;
use crate::events::envelope::{EntityContent, EntityEvent};
use crate::events::registry::ProcessorRegistry;

/// Dispatcher for one entity type. Holds the frozen registry and runs the
/// publish algorithm.
pub struct EntityEventDispatcher<T: EntityContent> {
    registry: Arc<ProcessorRegistry<T>>,
}

impl<T: EntityContent> EntityEventDispatcher<T> {
    pub fn new(registry: Arc<ProcessorRegistry<T>>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProcessorRegistry<T> {
        &self.registry
    }

    /// Run the processor chain for one envelope.
    ///
    /// For each resolved candidate, in order: stop if the envelope is
    /// closed; skip (without a result record) if `conditional` is false;
    /// otherwise run `process`, replace the envelope content with the
    /// result's content, append the result, and stop if the result closed
    /// the chain. The first error aborts the remaining processors and
    /// propagates to the caller.
    pub async fn publish(&self, mut event: EntityEvent<T>) -> Result<EventContext<T>> {
        let candidates = self.registry.resolve(event.event_type());
        debug!(
            entity_type = T::ENTITY_TYPE,
            event_type = %event.event_type(),
            event_id = %event.event_id(),
            priority = %event.priority(),
            candidates = candidates.len(),
            "publishing entity event"
        );

        let mut context = EventContext::new();

        for processor in candidates {
            if event.closed() {
                debug!(
                    event_id = %event.event_id(),
                    "envelope closed, stopping chain"
                );
                break;
            }

            if !processor.conditional(&event)? {
                debug!(
                    processor = processor.name(),
                    event_id = %event.event_id(),
                    "conditional not met, skipping processor"
                );
                continue;
            }

            debug!(
                processor = processor.name(),
                order = processor.order(),
                event_id = %event.event_id(),
                "invoking processor"
            );
            let result = processor.process(&mut event).await?;

            // Single mutable pipeline: the next processor sees this
            // processor's content.
            event.set_content(result.content().clone());
            let closed = result.closed();
            context.push(result);

            if closed {
                debug!(
                    processor = processor.name(),
                    event_id = %event.event_id(),
                    "processor closed the chain"
                );
                event.close();
                break;
            }
        }

        debug!(
            event_id = %event.event_id(),
            processors_run = context.len(),
            "entity event published"
        );
        Ok(context)
    }
}

/// Composition-root router holding one dispatcher per entity type.
///
/// Built once at process start; `publish` routes an envelope to the
/// dispatcher registered for its content type.
#[derive(Default)]
pub struct EventEngine {
    dispatchers: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl EventEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_dispatcher<T: EntityContent>(&mut self, dispatcher: EntityEventDispatcher<T>) {
        self.dispatchers
            .insert(TypeId::of::<T>(), Box::new(Arc::new(dispatcher)));
    }

    pub fn dispatcher<T: EntityContent>(&self) -> Option<Arc<EntityEventDispatcher<T>>> {
        self.dispatchers
            .get(&TypeId::of::<T>())
            .and_then(|d| d.downcast_ref::<Arc<EntityEventDispatcher<T>>>())
            .cloned()
    }

    pub async fn publish<T: EntityContent>(
        &self,
        event: EntityEvent<T>,
    ) -> Result<EventContext<T>> {
        let dispatcher = self
            .dispatcher::<T>()
            .ok_or(CoreError::UnknownEntityType(T::ENTITY_TYPE))?;
        dispatcher.publish(event).await
    }
}
