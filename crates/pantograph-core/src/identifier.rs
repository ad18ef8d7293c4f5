//! Stable identifiers for diagram entities.
//!
//! Nodes and relationships are owned by the [`Diagram`](crate::model::Diagram)
//! arena and addressed by these handles everywhere else — views, commands,
//! and the connector layout hold ids, never references, so there are no
//! back-reference cycles to manage. Ids are never reused within a diagram,
//! even after the entity they named is removed.

use std::fmt;

/// Handle for a node in a diagram's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Handle for a relationship in a diagram's relationship list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationshipId(u32);

impl RelationshipId {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}
