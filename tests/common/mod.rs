//! Shared test fixtures: a small tree-node entity in the shape the engine
//! sees in production (structural parent, generated audit fields).

use uuid::Uuid;

use idgov_core::events::EntityContent;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub id: Uuid,
    pub name: String,
    pub parent: Option<Uuid>,
    /// Filled by the save processor, like a persistence-generated field.
    pub audit_stamp: Option<String>,
}

impl TreeNode {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            parent: None,
            audit_stamp: None,
        }
    }

    pub fn under(mut self, parent: Uuid) -> Self {
        self.parent = Some(parent);
        self
    }
}

impl EntityContent for TreeNode {
    const ENTITY_TYPE: &'static str = "tree_node";

    fn entity_id(&self) -> Option<Uuid> {
        Some(self.id)
    }
}
