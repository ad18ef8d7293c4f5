//! The diagram semantic model.
//!
//! A [`Diagram`] aggregates typed nodes and typed relationships and enforces
//! the structural invariants (referential integrity, unique names, kind
//! compatibility). Everything outside the aggregate holds
//! [`NodeId`](crate::identifier::NodeId) /
//! [`RelationshipId`](crate::identifier::RelationshipId) handles and resolves
//! them through the diagram.

mod diagram;
mod node;
mod relationship;

pub use diagram::{Diagram, DiagramKind, RemovedNode, ValidationError};
pub use node::{Attribute, DiagramNode, Method, NodeKind, Visibility};
pub use relationship::{Relationship, RelationshipKind};
