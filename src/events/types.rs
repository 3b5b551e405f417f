//! Event and priority type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of entity lifecycle change an event describes.
///
/// The common set covers every entity domain; domains extend it with
/// `Custom` tags (e.g. tree-node moves, contract-guarantee changes).
/// Custom tags for shared domains live in [`crate::constants::event_types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Create,
    Update,
    Delete,
    /// Extended-attribute (EAV) values were saved for the entity.
    EavSave,
    Notify,
    /// Domain-specific extension identified by a registered tag.
    Custom(&'static str),
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::EavSave => "eav_save",
            Self::Notify => "notify",
            Self::Custom(tag) => tag,
        }
    }

    /// Update-like events carry an original source worth diffing against.
    pub fn is_update_like(&self) -> bool {
        matches!(self, Self::Update | Self::EavSave)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Governs whether escalated work must run inline in the caller's
/// transaction (`Immediate`) or may be deferred to the task substrate
/// (`Normal`). See [`crate::events::escalation`] for the contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityType {
    #[default]
    Normal,
    Immediate,
}

impl fmt::Display for PriorityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Immediate => write!(f, "immediate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_display() {
        assert_eq!(EventType::Create.to_string(), "create");
        assert_eq!(EventType::EavSave.to_string(), "eav_save");
        assert_eq!(EventType::Custom("tree_node.move").to_string(), "tree_node.move");
    }

    #[test]
    fn test_update_like() {
        assert!(EventType::Update.is_update_like());
        assert!(EventType::EavSave.is_update_like());
        assert!(!EventType::Create.is_update_like());
        assert!(!EventType::Custom("tree_node.move").is_update_like());
    }

    #[test]
    fn test_priority_serde() {
        let json = serde_json::to_string(&PriorityType::Immediate).unwrap();
        assert_eq!(json, "\"immediate\"");
        let parsed: PriorityType = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, PriorityType::Immediate);
    }
}
