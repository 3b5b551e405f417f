//! Entity event system: envelope, processor contract, registry,
//! dispatcher, and the priority/escalation layer.

pub mod context;
pub mod dispatcher;
pub mod envelope;
pub mod escalation;
pub mod processor;
pub mod properties;
pub mod registry;
pub mod types;

// Re-export key types for convenience
pub use context::{EventContext, EventResult};
pub use dispatcher::{EntityEventDispatcher, EventEngine};
pub use envelope::{EntityContent, EntityEvent};
pub use escalation::{EscalationOutcome, Escalator};
pub use processor::EntityProcessor;
pub use properties::{PropertyBag, PropertyKey, PropertyValue};
pub use registry::{
    AlwaysEnabled, EnablementGuard, ProcessorRegistry, ProcessorRegistryBuilder,
    StaticEnablementGuard,
};
pub use types::{EventType, PriorityType};
