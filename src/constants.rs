//! # System Constants
//!
//! Well-known property keys, extension event tags, and ordering conventions
//! shared by independently-developed processors. These constants are the
//! only contract between processors that must cooperate without holding a
//! reference to each other.

use std::collections::HashSet;

use uuid::Uuid;

use crate::events::properties::PropertyKey;

/// Well-known property keys with their documented value types.
pub mod properties {
    use super::*;

    /// Skip flag: downstream provisioning processors return immediately.
    /// Set by callers that already provisioned the entity through another
    /// path (e.g. identity provisioning re-saving a contract).
    pub const SKIP_PROVISIONING: PropertyKey<bool> = PropertyKey::new("idgov:skip-provisioning");

    /// Skip flag: notification processors return immediately.
    pub const SKIP_NOTIFY: PropertyKey<bool> = PropertyKey::new("idgov:skip-notify");

    /// Skip flag: automatic-role recomputation processors return
    /// immediately (used while bulk operations recompute separately).
    pub const SKIP_AUTOMATIC_ROLE_RECALCULATION: PropertyKey<bool> =
        PropertyKey::new("idgov:skip-automatic-role-recalculation");

    /// Relay key: automatic-role assignment ids captured by a prepare
    /// processor before a structural change, consumed afterward by the
    /// reconciliation processor in the same chain.
    pub const PREVIOUS_AUTOMATIC_ROLES: PropertyKey<HashSet<Uuid>> =
        PropertyKey::new("idgov:previous-automatic-roles");
}

/// Extension event tags for shared entity domains.
pub mod event_types {
    use crate::events::types::EventType;

    /// A tree node was moved under a new parent.
    pub const TREE_NODE_MOVE: EventType = EventType::Custom("tree_node.move");

    /// A guarantee was added to or removed from a contract.
    pub const CONTRACT_GUARANTEE_CHANGE: EventType = EventType::Custom("contract.guarantee_change");
}

/// Processor ordering conventions.
///
/// More negative orders run earlier. Prepare processors capture state
/// before the primary persistence processor runs; orders `>= 100` mark
/// cross-cutting side effects that rely on the persistence processor
/// having already saved the entity and filled generated fields.
pub mod order {
    /// Prepare processors that must observe pre-change state.
    pub const PREPARE: i32 = -100;
    /// The primary persistence processor for an event.
    pub const SAVE: i32 = 0;
    /// Cross-cutting side effects after persistence (provisioning, audit,
    /// notification, automatic-role reconciliation).
    pub const AFTER_SAVE: i32 = 100;
}
