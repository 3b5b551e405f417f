//! # Processor Registry
//!
//! Explicit registration table built once at composition time. Resolution
//! for an event type returns the enabled processors that declare support,
//! sorted ascending by order with ties broken by registration order.
//!
//! ## Enablement
//!
//! Whether a processor is enabled (module-disabled, property-disabled) is
//! an external concern consulted through [`EnablementGuard`] during
//! `resolve`, before the chain runs. A disabled processor is invisible to
//! the dispatcher, not merely skipped.
//!
//! ## Startup validation
//!
//! Two processors sharing an event type may not declare the same order;
//! `build` rejects the table instead of leaving chain positions implicit.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::events::envelope::EntityContent;
use crate::events::processor::EntityProcessor;
use crate::events::types::EventType;

/// External enablement check consulted once per resolution.
pub trait EnablementGuard: Send + Sync {
    fn is_enabled(&self, processor_name: &str) -> bool;
}

/// Default guard: every registered processor is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysEnabled;

impl EnablementGuard for AlwaysEnabled {
    fn is_enabled(&self, _processor_name: &str) -> bool {
        true
    }
}

/// Guard backed by an explicit disabled set, for deployments that turn
/// processors off through configuration properties.
#[derive(Debug, Clone, Default)]
pub struct StaticEnablementGuard {
    disabled: HashSet<String>,
}

impl StaticEnablementGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disable(mut self, processor_name: impl Into<String>) -> Self {
        self.disabled.insert(processor_name.into());
        self
    }
}

impl EnablementGuard for StaticEnablementGuard {
    fn is_enabled(&self, processor_name: &str) -> bool {
        !self.disabled.contains(processor_name)
    }
}

/// Builder for the per-entity-type registration table.
pub struct ProcessorRegistryBuilder<T: EntityContent> {
    processors: Vec<Arc<dyn EntityProcessor<T>>>,
    guard: Arc<dyn EnablementGuard>,
}

impl<T: EntityContent> Default for ProcessorRegistryBuilder<T> {
    fn default() -> Self {
        Self {
            processors: Vec::new(),
            guard: Arc::new(AlwaysEnabled),
        }
    }
}

impl<T: EntityContent> ProcessorRegistryBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, processor: Arc<dyn EntityProcessor<T>>) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn with_enablement_guard(mut self, guard: Arc<dyn EnablementGuard>) -> Self {
        self.guard = guard;
        self
    }

    /// Validate and freeze the table. Fails on duplicate processor names
    /// and on duplicate orders within any (entity type, event type) cell.
    pub fn build(self) -> Result<ProcessorRegistry<T>> {
        let mut names = HashSet::new();
        for processor in &self.processors {
            if !names.insert(processor.name().to_string()) {
                return Err(CoreError::Registry(format!(
                    "duplicate processor name '{}' for entity type '{}'",
                    processor.name(),
                    T::ENTITY_TYPE
                )));
            }
        }

        let mut orders_by_type: HashMap<EventType, HashMap<i32, String>> = HashMap::new();
        for processor in &self.processors {
            for event_type in processor.event_types() {
                let cell = orders_by_type.entry(event_type).or_default();
                if let Some(existing) = cell.insert(processor.order(), processor.name().to_string())
                {
                    return Err(CoreError::Registry(format!(
                        "processors '{}' and '{}' both declare order {} for ({}, {})",
                        existing,
                        processor.name(),
                        processor.order(),
                        T::ENTITY_TYPE,
                        event_type,
                    )));
                }
            }
        }

        // Stable sort keeps registration order for equal orders across
        // disjoint event types.
        let mut processors = self.processors;
        processors.sort_by_key(|p| p.order());

        info!(
            entity_type = T::ENTITY_TYPE,
            processors = processors.len(),
            "processor registry built"
        );

        Ok(ProcessorRegistry {
            processors,
            guard: self.guard,
        })
    }
}

/// Frozen, per-entity-type processor table. Resolution is idempotent and
/// side-effect-free; the processor set is static for the process lifetime.
pub struct ProcessorRegistry<T: EntityContent> {
    processors: Vec<Arc<dyn EntityProcessor<T>>>,
    guard: Arc<dyn EnablementGuard>,
}

impl<T: EntityContent> ProcessorRegistry<T> {
    pub fn builder() -> ProcessorRegistryBuilder<T> {
        ProcessorRegistryBuilder::new()
    }

    /// Ordered candidates for one event type: supporting and currently
    /// enabled, ascending by order.
    pub fn resolve(&self, event_type: EventType) -> Vec<Arc<dyn EntityProcessor<T>>> {
        let candidates: Vec<_> = self
            .processors
            .iter()
            .filter(|p| p.supports(event_type) && self.guard.is_enabled(p.name()))
            .cloned()
            .collect();

        debug!(
            entity_type = T::ENTITY_TYPE,
            event_type = %event_type,
            candidates = candidates.len(),
            "resolved processors"
        );

        candidates
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// All registered names in chain order, for diagnostics.
    pub fn processor_names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }
}
