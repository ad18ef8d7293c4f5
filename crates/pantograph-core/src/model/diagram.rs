//! The diagram aggregate root.
//!
//! A [`Diagram`] owns its nodes in an insertion-ordered arena (insertion
//! order is the z-order used by overlap resolution) and its relationships in
//! an ordered list. All structural mutation goes through the aggregate so the
//! invariants hold at every public-API boundary:
//!
//! 1. Every relationship endpoint resolves to a live node of this diagram.
//! 2. No relationship connects a node to itself.
//! 3. Node sizes never drop below their kind's minimum.
//! 4. Node names are unique within the diagram (relationships are persisted
//!    by name, so a duplicate would make resolution ambiguous).
//! 5. Member kinds are compatible with the diagram kind.

use std::fmt;

use indexmap::IndexMap;
use log::debug;
use thiserror::Error;

use crate::geometry::{Point, Size};
use crate::identifier::{NodeId, RelationshipId};

use super::node::{DiagramNode, NodeKind};
use super::relationship::{Relationship, RelationshipKind};

/// The type of diagram, selecting the persisted schema and the member kinds
/// it may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramKind {
    ClassDiagram,
    UseCaseDiagram,
}

impl DiagramKind {
    /// Node kinds this diagram kind may contain.
    pub fn allows_node(self, kind: NodeKind) -> bool {
        match self {
            Self::ClassDiagram => matches!(kind, NodeKind::Class | NodeKind::Interface),
            Self::UseCaseDiagram => matches!(kind, NodeKind::Actor | NodeKind::UseCase),
        }
    }

    /// Relationship kinds this diagram kind may contain.
    pub fn allows_relationship(self, kind: RelationshipKind) -> bool {
        match self {
            Self::ClassDiagram => matches!(
                kind,
                RelationshipKind::Association
                    | RelationshipKind::Aggregation
                    | RelationshipKind::Composition
                    | RelationshipKind::Inheritance
            ),
            Self::UseCaseDiagram => matches!(
                kind,
                RelationshipKind::Association
                    | RelationshipKind::Include
                    | RelationshipKind::Extend
            ),
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ClassDiagram => "class diagram",
            Self::UseCaseDiagram => "use case diagram",
        };
        f.write_str(name)
    }
}

/// A structural mutation was rejected before it touched the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("node {0} does not exist in this diagram")]
    UnknownNode(NodeId),

    #[error("relationship {0} does not exist in this diagram")]
    UnknownRelationship(RelationshipId),

    #[error("a relationship cannot connect node {0} to itself")]
    SelfRelationship(NodeId),

    #[error("a node named `{0}` already exists in this diagram")]
    DuplicateNodeName(String),

    #[error("an identical {kind} relationship from {start} to {end} already exists")]
    DuplicateRelationship {
        start: NodeId,
        end: NodeId,
        kind: RelationshipKind,
    },

    #[error("a {diagram} cannot contain {kind} nodes")]
    NodeKindNotAllowed {
        kind: NodeKind,
        diagram: DiagramKind,
    },

    #[error("a {diagram} cannot contain {kind} relationships")]
    RelationshipKindNotAllowed {
        kind: RelationshipKind,
        diagram: DiagramKind,
    },
}

/// A node detached from a diagram, together with everything needed to put it
/// back exactly where it was: its z-order slot and the cascade-removed
/// relationships with their original list positions.
#[derive(Debug, Clone)]
pub struct RemovedNode {
    node: DiagramNode,
    z_index: usize,
    relationships: Vec<(usize, Relationship)>,
}

impl RemovedNode {
    pub fn node(&self) -> &DiagramNode {
        &self.node
    }

    /// Relationships removed by the cascade, in their original list order.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter().map(|(_, relationship)| relationship)
    }
}

/// A single, typed diagram: the aggregate root of the model.
///
/// Equality is content equality: two diagrams are equal when they hold the
/// same nodes in the same z-order and the same relationships in the same
/// list order. Internal id counters are excluded, so a mutation that is then
/// undone compares equal to the state before it.
#[derive(Debug, Clone)]
pub struct Diagram {
    name: String,
    kind: DiagramKind,
    nodes: IndexMap<NodeId, DiagramNode>,
    relationships: Vec<Relationship>,
    next_node_id: u32,
    next_relationship_id: u32,
}

impl PartialEq for Diagram {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.nodes.iter().eq(other.nodes.iter())
            && self.relationships == other.relationships
    }
}

impl Diagram {
    pub fn new(name: impl Into<String>, kind: DiagramKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nodes: IndexMap::new(),
            relationships: Vec::new(),
            next_node_id: 0,
            next_relationship_id: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> DiagramKind {
        self.kind
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Creates a node and returns its id.
    ///
    /// # Errors
    ///
    /// Rejects node kinds the diagram kind does not allow and names already
    /// taken by another node.
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        name: impl Into<String>,
        position: Point,
        size: Size,
    ) -> Result<NodeId, ValidationError> {
        let name = name.into();
        if !self.kind.allows_node(kind) {
            return Err(ValidationError::NodeKindNotAllowed {
                kind,
                diagram: self.kind,
            });
        }
        if self.node_by_name(&name).is_some() {
            return Err(ValidationError::DuplicateNodeName(name));
        }

        let id = NodeId::new(self.next_node_id);
        self.next_node_id += 1;
        self.nodes
            .insert(id, DiagramNode::new(id, kind, name.as_str(), position, size));

        debug!(node = id.to_string(), name; "node added");
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&DiagramNode> {
        self.nodes.get(&id)
    }

    /// Mutable access for member editing (attributes, methods).
    ///
    /// Name, position, and size stay under the diagram's control; see
    /// [`rename_node`](Self::rename_node), [`set_node_position`](Self::set_node_position),
    /// and [`set_node_size`](Self::set_node_size).
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut DiagramNode> {
        self.nodes.get_mut(&id)
    }

    /// Looks a node up by its unique name.
    pub fn node_by_name(&self, name: &str) -> Option<&DiagramNode> {
        self.nodes.values().find(|node| node.name() == name)
    }

    /// Nodes in insertion order, which is also the z-order.
    pub fn nodes(&self) -> impl Iterator<Item = &DiagramNode> {
        self.nodes.values()
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Renames a node, keeping names unique.
    pub fn rename_node(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let name = name.into();
        if self
            .node_by_name(&name)
            .is_some_and(|existing| existing.id() != id)
        {
            return Err(ValidationError::DuplicateNodeName(name));
        }
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(ValidationError::UnknownNode(id))?;
        node.set_name(name);
        Ok(())
    }

    /// Moves a node. The caller is responsible for canvas clamping; the model
    /// accepts any finite position.
    pub fn set_node_position(&mut self, id: NodeId, position: Point) -> Result<(), ValidationError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(ValidationError::UnknownNode(id))?;
        node.set_position(position);
        Ok(())
    }

    /// Resizes a node. Sizes below the kind minimum are clamped up, never
    /// rejected.
    pub fn set_node_size(&mut self, id: NodeId, size: Size) -> Result<(), ValidationError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(ValidationError::UnknownNode(id))?;
        node.set_size(size);
        Ok(())
    }

    /// Removes a node, cascading to every relationship that references it.
    ///
    /// Returns the detached node together with the cascaded relationships so
    /// the removal can be undone exactly; callers that do not need the data
    /// may drop it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<RemovedNode, ValidationError> {
        let z_index = self
            .nodes
            .get_index_of(&id)
            .ok_or(ValidationError::UnknownNode(id))?;

        let mut cascaded = Vec::new();
        // Walk backwards so earlier captured indices stay valid on restore.
        for index in (0..self.relationships.len()).rev() {
            if self.relationships[index].references(id) {
                cascaded.push((index, self.relationships.remove(index)));
            }
        }
        cascaded.reverse();

        let (_, node) = self
            .nodes
            .shift_remove_index(z_index)
            .expect("index was just resolved from the id");

        debug!(
            node = id.to_string(),
            cascaded_relationships = cascaded.len();
            "node removed"
        );
        Ok(RemovedNode {
            node,
            z_index,
            relationships: cascaded,
        })
    }

    /// Reattaches a previously removed node at its original z-order slot and
    /// restores the relationships its removal cascaded away.
    ///
    /// # Errors
    ///
    /// The same validations as [`add_node`](Self::add_node) apply; restoring
    /// into a diagram that has since taken the node's name fails without
    /// mutating anything.
    pub fn restore_node(&mut self, removed: RemovedNode) -> Result<NodeId, ValidationError> {
        let RemovedNode {
            node,
            z_index,
            relationships,
        } = removed;

        if !self.kind.allows_node(node.kind()) {
            return Err(ValidationError::NodeKindNotAllowed {
                kind: node.kind(),
                diagram: self.kind,
            });
        }
        if self.node_by_name(node.name()).is_some() {
            return Err(ValidationError::DuplicateNodeName(node.name().to_string()));
        }

        let id = node.id();
        let slot = z_index.min(self.nodes.len());
        self.nodes.shift_insert(slot, id, node);

        for (index, relationship) in relationships {
            // Endpoints may have been removed while this node was detached;
            // skip such relationships rather than resurrect a dangling edge.
            if self.contains_node(relationship.start()) && self.contains_node(relationship.end()) {
                let slot = index.min(self.relationships.len());
                self.relationships.insert(slot, relationship);
            } else {
                debug!(
                    relationship = relationship.id().to_string();
                    "skipping restore of relationship with missing endpoint"
                );
            }
        }

        Ok(id)
    }

    // =========================================================================
    // Relationships
    // =========================================================================

    /// Creates a relationship and returns its id.
    ///
    /// # Errors
    ///
    /// Both endpoints must exist, must differ, the kind must be allowed by
    /// the diagram kind, and an identical (start, end, kind) edge must not
    /// already exist. Nothing is mutated on rejection.
    pub fn add_relationship(
        &mut self,
        start: NodeId,
        end: NodeId,
        kind: RelationshipKind,
        label: Option<String>,
    ) -> Result<RelationshipId, ValidationError> {
        self.validate_relationship(start, end, kind)?;

        let id = RelationshipId::new(self.next_relationship_id);
        self.next_relationship_id += 1;
        self.relationships
            .push(Relationship::new(id, start, end, kind, label));

        debug!(
            relationship = id.to_string(),
            start = start.to_string(),
            end = end.to_string(),
            kind = kind.to_string();
            "relationship added"
        );
        Ok(id)
    }

    pub fn relationship(&self, id: RelationshipId) -> Option<&Relationship> {
        self.relationships
            .iter()
            .find(|relationship| relationship.id() == id)
    }

    /// Relationships in creation order.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter()
    }

    pub fn relationships_count(&self) -> usize {
        self.relationships.len()
    }

    /// Relationships touching the given node on either side.
    pub fn relationships_of(&self, node: NodeId) -> impl Iterator<Item = &Relationship> {
        self.relationships
            .iter()
            .filter(move |relationship| relationship.references(node))
    }

    /// Removes a single relationship, returning it with its list position.
    pub fn remove_relationship(
        &mut self,
        id: RelationshipId,
    ) -> Result<(usize, Relationship), ValidationError> {
        let index = self
            .relationships
            .iter()
            .position(|relationship| relationship.id() == id)
            .ok_or(ValidationError::UnknownRelationship(id))?;
        let relationship = self.relationships.remove(index);

        debug!(relationship = id.to_string(); "relationship removed");
        Ok((index, relationship))
    }

    /// Reinserts a previously removed relationship at its original position.
    pub fn restore_relationship(
        &mut self,
        index: usize,
        relationship: Relationship,
    ) -> Result<RelationshipId, ValidationError> {
        self.validate_relationship(
            relationship.start(),
            relationship.end(),
            relationship.kind(),
        )?;
        let id = relationship.id();
        let slot = index.min(self.relationships.len());
        self.relationships.insert(slot, relationship);
        Ok(id)
    }

    /// Resolves a relationship's endpoints to node names, the identity used
    /// by the persisted schema.
    pub fn endpoint_names(&self, relationship: &Relationship) -> Option<(&str, &str)> {
        let start = self.node(relationship.start())?;
        let end = self.node(relationship.end())?;
        Some((start.name(), end.name()))
    }

    fn validate_relationship(
        &self,
        start: NodeId,
        end: NodeId,
        kind: RelationshipKind,
    ) -> Result<(), ValidationError> {
        if !self.contains_node(start) {
            return Err(ValidationError::UnknownNode(start));
        }
        if !self.contains_node(end) {
            return Err(ValidationError::UnknownNode(end));
        }
        if start == end {
            return Err(ValidationError::SelfRelationship(start));
        }
        if !self.kind.allows_relationship(kind) {
            return Err(ValidationError::RelationshipKindNotAllowed {
                kind,
                diagram: self.kind,
            });
        }
        let duplicate = self.relationships.iter().any(|existing| {
            existing.start() == start && existing.end() == end && existing.kind() == kind
        });
        if duplicate {
            return Err(ValidationError::DuplicateRelationship { start, end, kind });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_diagram_with_two_nodes() -> (Diagram, NodeId, NodeId) {
        let mut diagram = Diagram::new("Zoo", DiagramKind::ClassDiagram);
        let animal = diagram
            .add_node(
                NodeKind::Class,
                "Animal",
                Point::new(10.0, 10.0),
                Size::new(200.0, 150.0),
            )
            .unwrap();
        let dog = diagram
            .add_node(
                NodeKind::Class,
                "Dog",
                Point::new(300.0, 10.0),
                Size::new(200.0, 150.0),
            )
            .unwrap();
        (diagram, animal, dog)
    }

    #[test]
    fn test_add_node_assigns_unique_ids() {
        let (diagram, animal, dog) = class_diagram_with_two_nodes();

        assert_ne!(animal, dog);
        assert_eq!(diagram.nodes_count(), 2);
        assert_eq!(diagram.node(animal).unwrap().name(), "Animal");
        assert_eq!(diagram.node_by_name("Dog").unwrap().id(), dog);
    }

    #[test]
    fn test_add_node_rejects_duplicate_name() {
        let (mut diagram, _, _) = class_diagram_with_two_nodes();

        let result = diagram.add_node(
            NodeKind::Class,
            "Animal",
            Point::default(),
            Size::new(200.0, 150.0),
        );

        assert_eq!(
            result,
            Err(ValidationError::DuplicateNodeName("Animal".to_string()))
        );
        assert_eq!(diagram.nodes_count(), 2);
    }

    #[test]
    fn test_add_node_rejects_incompatible_kind() {
        let mut diagram = Diagram::new("Zoo", DiagramKind::ClassDiagram);

        let result = diagram.add_node(
            NodeKind::Actor,
            "Visitor",
            Point::default(),
            Size::new(200.0, 150.0),
        );

        assert_eq!(
            result,
            Err(ValidationError::NodeKindNotAllowed {
                kind: NodeKind::Actor,
                diagram: DiagramKind::ClassDiagram,
            })
        );
    }

    #[test]
    fn test_nodes_iterate_in_insertion_order() {
        let (diagram, _, _) = class_diagram_with_two_nodes();

        let names: Vec<&str> = diagram.nodes().map(|node| node.name()).collect();
        assert_eq!(names, vec!["Animal", "Dog"]);
    }

    #[test]
    fn test_self_relationship_rejected_for_every_kind() {
        let (mut diagram, animal, _) = class_diagram_with_two_nodes();

        for kind in [
            RelationshipKind::Association,
            RelationshipKind::Aggregation,
            RelationshipKind::Composition,
            RelationshipKind::Inheritance,
        ] {
            let result = diagram.add_relationship(animal, animal, kind, None);
            assert_eq!(result, Err(ValidationError::SelfRelationship(animal)));
        }
        assert_eq!(diagram.relationships_count(), 0);
    }

    #[test]
    fn test_relationship_requires_live_endpoints() {
        let (mut diagram, animal, dog) = class_diagram_with_two_nodes();
        diagram.remove_node(dog).unwrap();

        let result = diagram.add_relationship(dog, animal, RelationshipKind::Inheritance, None);
        assert_eq!(result, Err(ValidationError::UnknownNode(dog)));
    }

    #[test]
    fn test_duplicate_relationship_rejected() {
        let (mut diagram, animal, dog) = class_diagram_with_two_nodes();
        diagram
            .add_relationship(dog, animal, RelationshipKind::Inheritance, None)
            .unwrap();

        let result = diagram.add_relationship(dog, animal, RelationshipKind::Inheritance, None);
        assert_eq!(
            result,
            Err(ValidationError::DuplicateRelationship {
                start: dog,
                end: animal,
                kind: RelationshipKind::Inheritance,
            })
        );
        assert_eq!(diagram.relationships_count(), 1);
    }

    #[test]
    fn test_same_endpoints_different_kind_is_not_a_duplicate() {
        let (mut diagram, animal, dog) = class_diagram_with_two_nodes();
        diagram
            .add_relationship(dog, animal, RelationshipKind::Inheritance, None)
            .unwrap();
        diagram
            .add_relationship(dog, animal, RelationshipKind::Association, None)
            .unwrap();

        assert_eq!(diagram.relationships_count(), 2);
    }

    #[test]
    fn test_relationship_kind_constrained_by_diagram_kind() {
        let (mut diagram, animal, dog) = class_diagram_with_two_nodes();

        let result = diagram.add_relationship(dog, animal, RelationshipKind::Include, None);
        assert_eq!(
            result,
            Err(ValidationError::RelationshipKindNotAllowed {
                kind: RelationshipKind::Include,
                diagram: DiagramKind::ClassDiagram,
            })
        );
    }

    #[test]
    fn test_remove_node_cascades_to_relationships() {
        let (mut diagram, animal, dog) = class_diagram_with_two_nodes();
        let cat = diagram
            .add_node(
                NodeKind::Class,
                "Cat",
                Point::new(600.0, 10.0),
                Size::new(200.0, 150.0),
            )
            .unwrap();
        diagram
            .add_relationship(dog, animal, RelationshipKind::Inheritance, None)
            .unwrap();
        diagram
            .add_relationship(cat, animal, RelationshipKind::Inheritance, None)
            .unwrap();
        diagram
            .add_relationship(cat, dog, RelationshipKind::Association, None)
            .unwrap();

        let removed = diagram.remove_node(animal).unwrap();

        assert_eq!(removed.relationships().count(), 2);
        assert_eq!(diagram.relationships_count(), 1);
        assert!(
            diagram
                .relationships()
                .all(|relationship| !relationship.references(animal))
        );
    }

    #[test]
    fn test_restore_node_preserves_z_order_and_relationships() {
        let (mut diagram, animal, dog) = class_diagram_with_two_nodes();
        let cat = diagram
            .add_node(
                NodeKind::Class,
                "Cat",
                Point::new(600.0, 10.0),
                Size::new(200.0, 150.0),
            )
            .unwrap();
        diagram
            .add_relationship(dog, animal, RelationshipKind::Inheritance, None)
            .unwrap();
        diagram
            .add_relationship(cat, animal, RelationshipKind::Inheritance, None)
            .unwrap();
        let before = diagram.clone();

        let removed = diagram.remove_node(animal).unwrap();
        diagram.restore_node(removed).unwrap();

        assert_eq!(diagram, before);
    }

    #[test]
    fn test_restore_node_rejects_stolen_name() {
        let (mut diagram, animal, _) = class_diagram_with_two_nodes();
        let removed = diagram.remove_node(animal).unwrap();
        diagram
            .add_node(
                NodeKind::Class,
                "Animal",
                Point::default(),
                Size::new(200.0, 150.0),
            )
            .unwrap();

        let result = diagram.restore_node(removed);
        assert_eq!(
            result,
            Err(ValidationError::DuplicateNodeName("Animal".to_string()))
        );
    }

    #[test]
    fn test_remove_and_restore_relationship_keeps_list_position() {
        let (mut diagram, animal, dog) = class_diagram_with_two_nodes();
        let cat = diagram
            .add_node(
                NodeKind::Class,
                "Cat",
                Point::new(600.0, 10.0),
                Size::new(200.0, 150.0),
            )
            .unwrap();
        let first = diagram
            .add_relationship(dog, animal, RelationshipKind::Inheritance, None)
            .unwrap();
        diagram
            .add_relationship(cat, animal, RelationshipKind::Inheritance, None)
            .unwrap();
        let before = diagram.clone();

        let (index, relationship) = diagram.remove_relationship(first).unwrap();
        assert_eq!(index, 0);
        diagram.restore_relationship(index, relationship).unwrap();

        assert_eq!(diagram, before);
    }

    #[test]
    fn test_rename_node_enforces_uniqueness() {
        let (mut diagram, animal, dog) = class_diagram_with_two_nodes();

        assert_eq!(
            diagram.rename_node(dog, "Animal"),
            Err(ValidationError::DuplicateNodeName("Animal".to_string()))
        );
        // Renaming a node to its own name is fine.
        diagram.rename_node(animal, "Animal").unwrap();
        diagram.rename_node(dog, "Wolf").unwrap();
        assert_eq!(diagram.node(dog).unwrap().name(), "Wolf");
    }

    #[test]
    fn test_set_node_size_clamps_to_minimum() {
        let (mut diagram, animal, _) = class_diagram_with_two_nodes();

        diagram.set_node_size(animal, Size::new(10.0, 500.0)).unwrap();
        assert_eq!(diagram.node(animal).unwrap().size(), Size::new(50.0, 500.0));
    }

    #[test]
    fn test_endpoint_names_resolve() {
        let (mut diagram, animal, dog) = class_diagram_with_two_nodes();
        let id = diagram
            .add_relationship(dog, animal, RelationshipKind::Inheritance, None)
            .unwrap();

        let relationship = diagram.relationship(id).unwrap().clone();
        assert_eq!(
            diagram.endpoint_names(&relationship),
            Some(("Dog", "Animal"))
        );
    }

    #[test]
    fn test_use_case_diagram_members() {
        let mut diagram = Diagram::new("Checkout", DiagramKind::UseCaseDiagram);
        let customer = diagram
            .add_node(
                NodeKind::Actor,
                "Customer",
                Point::new(20.0, 40.0),
                Size::new(80.0, 120.0),
            )
            .unwrap();
        let pay = diagram
            .add_node(
                NodeKind::UseCase,
                "Pay order",
                Point::new(300.0, 60.0),
                Size::new(160.0, 80.0),
            )
            .unwrap();

        diagram
            .add_relationship(customer, pay, RelationshipKind::Association, None)
            .unwrap();
        let result = diagram.add_relationship(
            pay,
            customer,
            RelationshipKind::Inheritance,
            None,
        );
        assert_eq!(
            result,
            Err(ValidationError::RelationshipKindNotAllowed {
                kind: RelationshipKind::Inheritance,
                diagram: DiagramKind::UseCaseDiagram,
            })
        );
    }
}
