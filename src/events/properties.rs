//! # Event Property Bag
//!
//! Insertion-ordered, string-keyed map of arbitrary values shared by every
//! processor in one dispatch chain. Properties serve two documented roles:
//!
//! - **Skip flags**: booleans checked defensively at the top of a
//!   processor's `process` to break re-entrant cascades (saving a contract
//!   triggers identity provisioning, which must not re-trigger contract
//!   provisioning).
//! - **Cross-phase relay**: a low-order processor computes state (e.g.
//!   the automatic roles that existed before a tree move) and stores it for
//!   a high-order processor in the same chain, which takes it back out.
//!
//! Cooperating processors share [`PropertyKey`] constants instead of raw
//! strings, so the value type of every well-known key is checked at compile
//! time. Well-known keys live in [`crate::constants::properties`].

use std::collections::HashSet;
use std::marker::PhantomData;

use serde_json::Value;
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// A well-known property key carrying its value type.
pub struct PropertyKey<V> {
    name: &'static str,
    _marker: PhantomData<fn() -> V>,
}

impl<V> PropertyKey<V> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<V> Clone for PropertyKey<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for PropertyKey<V> {}

impl<V> std::fmt::Debug for PropertyKey<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PropertyKey({})", self.name)
    }
}

/// Conversion between typed property values and the untyped bag.
pub trait PropertyValue: Sized {
    const TYPE_NAME: &'static str;

    fn into_value(self) -> Value;
    fn from_value(value: &Value) -> Option<Self>;
}

impl PropertyValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl PropertyValue for String {
    const TYPE_NAME: &'static str = "string";

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl PropertyValue for i64 {
    const TYPE_NAME: &'static str = "i64";

    fn into_value(self) -> Value {
        Value::from(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl PropertyValue for Uuid {
    const TYPE_NAME: &'static str = "uuid";

    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().and_then(|s| s.parse().ok())
    }
}

impl PropertyValue for HashSet<Uuid> {
    const TYPE_NAME: &'static str = "uuid set";

    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(|id| Value::String(id.to_string())).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value
            .as_array()?
            .iter()
            .map(|v| v.as_str().and_then(|s| s.parse().ok()))
            .collect()
    }
}

impl PropertyValue for Value {
    const TYPE_NAME: &'static str = "json";

    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

/// Insertion-ordered property map for one dispatch chain.
///
/// Keys are write-once-per-key by convention, not enforced; re-setting a
/// key replaces the value but keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct PropertyBag {
    entries: Vec<(String, Value)>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn set_raw(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove_raw(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Typed read. `Ok(None)` when absent, `Err` when present with the
    /// wrong type; never panics.
    pub fn get<V: PropertyValue>(&self, key: PropertyKey<V>) -> Result<Option<V>> {
        match self.get_raw(key.name()) {
            None => Ok(None),
            Some(value) => match V::from_value(value) {
                Some(typed) => Ok(Some(typed)),
                None => Err(CoreError::PropertyType {
                    key: key.name().to_string(),
                    expected: V::TYPE_NAME,
                }),
            },
        }
    }

    pub fn set<V: PropertyValue>(&mut self, key: PropertyKey<V>, value: V) {
        self.set_raw(key.name(), value.into_value());
    }

    /// Typed take: read and remove in one step, the relay-consumption idiom.
    pub fn take<V: PropertyValue>(&mut self, key: PropertyKey<V>) -> Result<Option<V>> {
        let typed = self.get(key)?;
        if typed.is_some() {
            self.remove_raw(key.name());
        }
        Ok(typed)
    }

    /// Skip-flag read: true only when the key holds boolean `true`.
    /// Missing keys and mistyped values read as false.
    pub fn flag(&self, key: PropertyKey<bool>) -> bool {
        self.get(key).ok().flatten().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAG: PropertyKey<bool> = PropertyKey::new("test:flag");
    const IDS: PropertyKey<HashSet<Uuid>> = PropertyKey::new("test:ids");

    #[test]
    fn test_typed_roundtrip() {
        let mut bag = PropertyBag::new();
        bag.set(FLAG, true);

        let mut ids = HashSet::new();
        ids.insert(Uuid::new_v4());
        ids.insert(Uuid::new_v4());
        bag.set(IDS, ids.clone());

        assert_eq!(bag.get(FLAG).unwrap(), Some(true));
        assert_eq!(bag.get(IDS).unwrap(), Some(ids));
    }

    #[test]
    fn test_type_mismatch_is_error_not_panic() {
        let mut bag = PropertyBag::new();
        bag.set_raw("test:flag", Value::String("yes".to_string()));

        assert!(matches!(
            bag.get(FLAG),
            Err(CoreError::PropertyType { .. })
        ));
        // Flag reads degrade to false instead of failing.
        assert!(!bag.flag(FLAG));
    }

    #[test]
    fn test_missing_key_is_none() {
        let bag = PropertyBag::new();
        assert_eq!(bag.get(FLAG).unwrap(), None);
        assert!(!bag.flag(FLAG));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut bag = PropertyBag::new();
        bag.set_raw("c", Value::from(1));
        bag.set_raw("a", Value::from(2));
        bag.set_raw("b", Value::from(3));
        // Re-setting keeps position.
        bag.set_raw("c", Value::from(4));

        let keys: Vec<&str> = bag.keys().collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
        assert_eq!(bag.get_raw("c"), Some(&Value::from(4)));
    }

    #[test]
    fn test_take_consumes_relay_value() {
        let mut bag = PropertyBag::new();
        bag.set(FLAG, true);

        assert_eq!(bag.take(FLAG).unwrap(), Some(true));
        assert_eq!(bag.get(FLAG).unwrap(), None);
    }
}
