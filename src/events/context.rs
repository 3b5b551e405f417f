//! Event results and the per-publish context log.

use chrono::{DateTime, Utc};

/// Outcome of one processor invocation: the (possibly mutated) content the
/// rest of the chain should see, and whether the chain closes here.
#[derive(Debug, Clone)]
pub struct EventResult<T> {
    processor: String,
    content: T,
    closed: bool,
    processed_at: DateTime<Utc>,
}

impl<T> EventResult<T> {
    pub fn of(processor: impl Into<String>, content: T) -> Self {
        Self {
            processor: processor.into(),
            content,
            closed: false,
            processed_at: Utc::now(),
        }
    }

    /// A result that terminates the chain after this processor.
    pub fn closing(processor: impl Into<String>, content: T) -> Self {
        Self {
            closed: true,
            ..Self::of(processor, content)
        }
    }

    pub fn processor(&self) -> &str {
        &self.processor
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    pub fn into_content(self) -> T {
        self.content
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    pub fn processed_at(&self) -> DateTime<Utc> {
        self.processed_at
    }
}

/// Append-only ordered log of the processors actually invoked by one
/// `publish` call. The content of the last result is the authoritative
/// outcome returned to the caller.
#[derive(Debug, Clone, Default)]
pub struct EventContext<T> {
    results: Vec<EventResult<T>>,
}

impl<T> EventContext<T> {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: EventResult<T>) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[EventResult<T>] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn last(&self) -> Option<&EventResult<T>> {
        self.results.last()
    }

    /// Authoritative final content, if any processor ran.
    pub fn content(&self) -> Option<&T> {
        self.last().map(EventResult::content)
    }

    pub fn into_content(mut self) -> Option<T> {
        self.results.pop().map(EventResult::into_content)
    }

    /// True when the chain was terminated early by a closing result.
    pub fn is_closed(&self) -> bool {
        self.last().is_some_and(EventResult::closed)
    }
}
