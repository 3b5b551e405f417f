//! Entity event envelope.
//!
//! One envelope exists per `publish` call and never outlives it. The
//! envelope owns the entity's current state for the duration of the chain;
//! processors may replace the content (e.g. after a save fills generated
//! fields) and every later processor observes the replacement.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::events::properties::PropertyBag;
use crate::events::types::{EventType, PriorityType};

/// Implemented by every entity state type that can travel through the
/// event engine. The associated constant identifies the entity domain in
/// logs and registry diagnostics.
pub trait EntityContent: Clone + Send + Sync + 'static {
    const ENTITY_TYPE: &'static str;

    /// Identifier of the underlying entity, when it already has one
    /// (CREATE events may carry content without a persisted id).
    fn entity_id(&self) -> Option<Uuid> {
        None
    }
}

/// Typed event instance carrying current/previous state and the shared
/// property bag. Mutable during the chain; see [`crate::events::dispatcher`]
/// for the pipeline semantics.
#[derive(Debug, Clone)]
pub struct EntityEvent<T: EntityContent> {
    event_id: Uuid,
    event_type: EventType,
    content: T,
    original_source: Option<T>,
    properties: PropertyBag,
    priority: PriorityType,
    closed: bool,
    created_at: DateTime<Utc>,
}

impl<T: EntityContent> EntityEvent<T> {
    pub fn new(event_type: EventType, content: T) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            content,
            original_source: None,
            properties: PropertyBag::new(),
            priority: PriorityType::Normal,
            closed: false,
            created_at: Utc::now(),
        }
    }

    /// Attach the immutable pre-change snapshot (absent for CREATE).
    pub fn with_original_source(mut self, original: T) -> Self {
        self.original_source = Some(original);
        self
    }

    pub fn with_priority(mut self, priority: PriorityType) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_properties(mut self, properties: PropertyBag) -> Self {
        self.properties = properties;
        self
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut T {
        &mut self.content
    }

    /// Replace the current state; used by the dispatcher after each
    /// processor and by save processors that receive generated fields.
    pub fn set_content(&mut self, content: T) {
        self.content = content;
    }

    pub fn original_source(&self) -> Option<&T> {
        self.original_source.as_ref()
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyBag {
        &mut self.properties
    }

    pub fn priority(&self) -> PriorityType {
        self.priority
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    /// Terminate the chain after the current processor.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Diff helper for update-like conditionals: did the projected field
    /// change between the original source and the current content?
    /// Without an original source the field counts as changed.
    pub fn changed<V: PartialEq>(&self, field: impl Fn(&T) -> &V) -> bool {
        match &self.original_source {
            Some(original) => field(original) != field(&self.content),
            None => true,
        }
    }
}
