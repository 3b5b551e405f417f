//! Structured error handling for the event engine.
//!
//! A single crate-wide error enum keeps the dispatch core, registry, and
//! task substrate on one `Result` alias, mirrored by more specific
//! variants where callers need to branch.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Registry composition failed (duplicate orders, empty tables, ...).
    #[error("registry error: {0}")]
    Registry(String),

    /// A processor's `conditional` or `process` failed; aborts the chain.
    #[error("processor '{processor}' failed: {reason}")]
    Processor { processor: String, reason: String },

    /// A property was present but held a value of the wrong type.
    #[error("property '{key}' has unexpected type (expected {expected})")]
    PropertyType {
        key: String,
        expected: &'static str,
    },

    /// No dispatcher is registered for the entity type being published.
    #[error("no dispatcher registered for entity type '{0}'")]
    UnknownEntityType(&'static str),

    /// A long-running task failed or aborted.
    #[error("task error: {0}")]
    Task(String),

    /// Lookup of a tracked task by id failed.
    #[error("task {0} not found")]
    TaskNotFound(Uuid),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    /// Wrap an arbitrary failure as a processor error.
    pub fn processor(processor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Processor {
            processor: processor.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
