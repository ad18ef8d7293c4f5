//! Undoable structural mutations.
//!
//! Every structural change to a diagram (adding or removing nodes and
//! relationships) is expressed as a [`Command`]: an object that performs the
//! mutation on `execute`, captures whatever it needs to reverse itself, and
//! restores the previous state on `undo`. The [`CommandStack`] records
//! executed commands and replays them for undo/redo.
//!
//! Commands are re-executable: after an undo, `execute` may be called again
//! (the redo path). Driving a command out of order — undoing before
//! executing, or undoing twice in a row — is a caller bug and fails with
//! [`EditError::CommandMisuse`] instead of being silently ignored.

use std::fmt;

use log::{debug, warn};

use pantograph_core::geometry::{Point, Size};
use pantograph_core::identifier::{NodeId, RelationshipId};
use pantograph_core::model::{Diagram, NodeKind, Relationship, RelationshipKind, RemovedNode};

use crate::error::EditError;

/// A reversible structural mutation of a diagram.
pub trait Command: fmt::Debug {
    /// Applies the mutation. Validation failures leave the diagram unchanged.
    fn execute(&mut self, diagram: &mut Diagram) -> Result<(), EditError>;

    /// Reverses the mutation performed by the last `execute`.
    fn undo(&mut self, diagram: &mut Diagram) -> Result<(), EditError>;

    /// Short human-readable name, used in logs.
    fn describe(&self) -> &'static str;
}

/// Creates a node; undo removes exactly that node.
///
/// Undoing after relationships have come to reference the node cascades to
/// them; the cascade is reported in the log, never silently skipped.
#[derive(Debug)]
pub struct AddNodeCommand {
    kind: NodeKind,
    name: String,
    position: Point,
    size: Size,
    created: Option<NodeId>,
    executed: bool,
}

impl AddNodeCommand {
    pub fn new(kind: NodeKind, name: impl Into<String>, position: Point, size: Size) -> Self {
        Self {
            kind,
            name: name.into(),
            position,
            size,
            created: None,
            executed: false,
        }
    }

    /// Id of the node created by the last `execute`.
    pub fn node_id(&self) -> Option<NodeId> {
        self.created
    }
}

impl Command for AddNodeCommand {
    fn execute(&mut self, diagram: &mut Diagram) -> Result<(), EditError> {
        if self.executed {
            return Err(EditError::CommandMisuse(
                "execute called twice without an undo in between",
            ));
        }
        let id = diagram.add_node(self.kind, self.name.as_str(), self.position, self.size)?;
        self.created = Some(id);
        self.executed = true;
        Ok(())
    }

    fn undo(&mut self, diagram: &mut Diagram) -> Result<(), EditError> {
        if !self.executed {
            return Err(EditError::CommandMisuse(
                "undo called without a prior execute",
            ));
        }
        let id = self
            .created
            .ok_or(EditError::CommandMisuse("undo without a created node"))?;

        let removed = diagram.remove_node(id)?;
        let cascaded = removed.relationships().count();
        if cascaded > 0 {
            warn!(
                node = id.to_string(),
                cascaded_relationships = cascaded;
                "undoing node creation also removed relationships that referenced it"
            );
        }
        self.executed = false;
        Ok(())
    }

    fn describe(&self) -> &'static str {
        "add node"
    }
}

/// Creates a relationship; undo removes exactly that relationship.
#[derive(Debug)]
pub struct AddRelationshipCommand {
    start: NodeId,
    end: NodeId,
    kind: RelationshipKind,
    label: Option<String>,
    created: Option<RelationshipId>,
    executed: bool,
}

impl AddRelationshipCommand {
    pub fn new(
        start: NodeId,
        end: NodeId,
        kind: RelationshipKind,
        label: Option<String>,
    ) -> Self {
        Self {
            start,
            end,
            kind,
            label,
            created: None,
            executed: false,
        }
    }

    /// Id of the relationship created by the last `execute`.
    pub fn relationship_id(&self) -> Option<RelationshipId> {
        self.created
    }
}

impl Command for AddRelationshipCommand {
    fn execute(&mut self, diagram: &mut Diagram) -> Result<(), EditError> {
        if self.executed {
            return Err(EditError::CommandMisuse(
                "execute called twice without an undo in between",
            ));
        }
        let id = diagram.add_relationship(self.start, self.end, self.kind, self.label.clone())?;
        self.created = Some(id);
        self.executed = true;
        Ok(())
    }

    fn undo(&mut self, diagram: &mut Diagram) -> Result<(), EditError> {
        if !self.executed {
            return Err(EditError::CommandMisuse(
                "undo called without a prior execute",
            ));
        }
        let id = self.created.ok_or(EditError::CommandMisuse(
            "undo without a created relationship",
        ))?;
        diagram.remove_relationship(id)?;
        self.executed = false;
        Ok(())
    }

    fn describe(&self) -> &'static str {
        "add relationship"
    }
}

/// Removes a node (cascading); undo restores the node at its original
/// z-order slot along with the cascaded relationships.
#[derive(Debug)]
pub struct RemoveNodeCommand {
    node: NodeId,
    removed: Option<RemovedNode>,
    executed: bool,
}

impl RemoveNodeCommand {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            removed: None,
            executed: false,
        }
    }
}

impl Command for RemoveNodeCommand {
    fn execute(&mut self, diagram: &mut Diagram) -> Result<(), EditError> {
        if self.executed {
            return Err(EditError::CommandMisuse(
                "execute called twice without an undo in between",
            ));
        }
        let removed = diagram.remove_node(self.node)?;
        debug!(
            node = self.node.to_string(),
            cascaded_relationships = removed.relationships().count();
            "node removal cascaded"
        );
        self.removed = Some(removed);
        self.executed = true;
        Ok(())
    }

    fn undo(&mut self, diagram: &mut Diagram) -> Result<(), EditError> {
        if !self.executed {
            return Err(EditError::CommandMisuse(
                "undo called without a prior execute",
            ));
        }
        let removed = self
            .removed
            .take()
            .ok_or(EditError::CommandMisuse("undo without a removed node"))?;
        diagram.restore_node(removed)?;
        self.executed = false;
        Ok(())
    }

    fn describe(&self) -> &'static str {
        "remove node"
    }
}

/// Removes a single relationship; undo reinserts it at its original list
/// position.
#[derive(Debug)]
pub struct RemoveRelationshipCommand {
    relationship: RelationshipId,
    removed: Option<(usize, Relationship)>,
    executed: bool,
}

impl RemoveRelationshipCommand {
    pub fn new(relationship: RelationshipId) -> Self {
        Self {
            relationship,
            removed: None,
            executed: false,
        }
    }
}

impl Command for RemoveRelationshipCommand {
    fn execute(&mut self, diagram: &mut Diagram) -> Result<(), EditError> {
        if self.executed {
            return Err(EditError::CommandMisuse(
                "execute called twice without an undo in between",
            ));
        }
        let removed = diagram.remove_relationship(self.relationship)?;
        self.removed = Some(removed);
        self.executed = true;
        Ok(())
    }

    fn undo(&mut self, diagram: &mut Diagram) -> Result<(), EditError> {
        if !self.executed {
            return Err(EditError::CommandMisuse(
                "undo called without a prior execute",
            ));
        }
        let (index, relationship) = self.removed.take().ok_or(EditError::CommandMisuse(
            "undo without a removed relationship",
        ))?;
        diagram.restore_relationship(index, relationship)?;
        self.executed = false;
        Ok(())
    }

    fn describe(&self) -> &'static str {
        "remove relationship"
    }
}

/// History of executed commands, with explicit undo and redo stacks.
///
/// Commands are pushed after the caller has executed them (the caller often
/// needs the created entity's id, which lives on the concrete command type).
/// Any fresh mutation clears the redo stack: redo only replays a straight
/// line of undone history.
#[derive(Debug, Default)]
pub struct CommandStack {
    undo_stack: Vec<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
}

impl CommandStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an already-executed command and invalidates the redo history.
    pub fn push(&mut self, command: Box<dyn Command>) {
        debug!(command = command.describe(); "command recorded");
        self.undo_stack.push(command);
        self.redo_stack.clear();
    }

    /// Undoes the most recent command.
    ///
    /// Returns `false` when there is nothing to undo. A command that fails to
    /// undo is dropped from the history (the diagram is unchanged; keeping
    /// the command would leave the stacks out of sync with the model).
    pub fn undo(&mut self, diagram: &mut Diagram) -> Result<bool, EditError> {
        let Some(mut command) = self.undo_stack.pop() else {
            return Ok(false);
        };
        debug!(command = command.describe(); "undo");
        command.undo(diagram)?;
        self.redo_stack.push(command);
        Ok(true)
    }

    /// Re-executes the most recently undone command.
    ///
    /// Returns `false` when there is nothing to redo.
    pub fn redo(&mut self, diagram: &mut Diagram) -> Result<bool, EditError> {
        let Some(mut command) = self.redo_stack.pop() else {
            return Ok(false);
        };
        debug!(command = command.describe(); "redo");
        command.execute(diagram)?;
        self.undo_stack.push(command);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pantograph_core::model::DiagramKind;

    use super::*;

    fn class_diagram() -> Diagram {
        Diagram::new("Zoo", DiagramKind::ClassDiagram)
    }

    fn add_node(diagram: &mut Diagram, name: &str, x: f32) -> NodeId {
        diagram
            .add_node(
                NodeKind::Class,
                name,
                Point::new(x, 10.0),
                Size::new(200.0, 150.0),
            )
            .unwrap()
    }

    #[test]
    fn test_add_node_execute_then_undo_restores_counts() {
        let mut diagram = class_diagram();
        let before = diagram.clone();

        let mut command = AddNodeCommand::new(
            NodeKind::Class,
            "Foo",
            Point::new(10.0, 10.0),
            Size::new(200.0, 150.0),
        );
        command.execute(&mut diagram).unwrap();
        assert_eq!(diagram.nodes_count(), 1);
        assert!(diagram.node_by_name("Foo").is_some());

        command.undo(&mut diagram).unwrap();
        assert_eq!(diagram, before);
        assert!(diagram.node_by_name("Foo").is_none());
    }

    #[test]
    fn test_add_node_undo_cascades_to_later_relationships() {
        let mut diagram = class_diagram();
        let animal = add_node(&mut diagram, "Animal", 10.0);

        let mut command = AddNodeCommand::new(
            NodeKind::Class,
            "Dog",
            Point::new(300.0, 10.0),
            Size::new(200.0, 150.0),
        );
        command.execute(&mut diagram).unwrap();
        let dog = command.node_id().unwrap();
        diagram
            .add_relationship(dog, animal, RelationshipKind::Inheritance, None)
            .unwrap();

        command.undo(&mut diagram).unwrap();
        assert_eq!(diagram.relationships_count(), 0);
        assert!(diagram.relationships().all(|r| !r.references(dog)));
    }

    #[test]
    fn test_add_relationship_execute_then_undo() {
        let mut diagram = class_diagram();
        let animal = add_node(&mut diagram, "Animal", 10.0);
        let dog = add_node(&mut diagram, "Dog", 300.0);
        let before = diagram.clone();

        let mut command =
            AddRelationshipCommand::new(dog, animal, RelationshipKind::Inheritance, None);
        command.execute(&mut diagram).unwrap();
        assert_eq!(diagram.relationships_count(), 1);

        command.undo(&mut diagram).unwrap();
        assert_eq!(diagram, before);
    }

    #[test]
    fn test_add_relationship_rejects_self_edge_without_mutation() {
        let mut diagram = class_diagram();
        let animal = add_node(&mut diagram, "Animal", 10.0);
        let before = diagram.clone();

        let mut command =
            AddRelationshipCommand::new(animal, animal, RelationshipKind::Association, None);
        let result = command.execute(&mut diagram);

        assert!(matches!(result, Err(EditError::Validation(_))));
        assert_eq!(diagram, before);
        // A failed execute leaves the command un-executed; undo is misuse.
        assert!(matches!(
            command.undo(&mut diagram),
            Err(EditError::CommandMisuse(_))
        ));
    }

    #[test]
    fn test_remove_node_round_trips_through_undo() {
        let mut diagram = class_diagram();
        let animal = add_node(&mut diagram, "Animal", 10.0);
        let dog = add_node(&mut diagram, "Dog", 300.0);
        diagram
            .add_relationship(dog, animal, RelationshipKind::Inheritance, None)
            .unwrap();
        let before = diagram.clone();

        let mut command = RemoveNodeCommand::new(animal);
        command.execute(&mut diagram).unwrap();
        assert_eq!(diagram.nodes_count(), 1);
        assert_eq!(diagram.relationships_count(), 0);

        command.undo(&mut diagram).unwrap();
        assert_eq!(diagram, before);
    }

    #[test]
    fn test_remove_relationship_round_trips_through_undo() {
        let mut diagram = class_diagram();
        let animal = add_node(&mut diagram, "Animal", 10.0);
        let dog = add_node(&mut diagram, "Dog", 300.0);
        let id = diagram
            .add_relationship(dog, animal, RelationshipKind::Inheritance, None)
            .unwrap();
        let before = diagram.clone();

        let mut command = RemoveRelationshipCommand::new(id);
        command.execute(&mut diagram).unwrap();
        assert_eq!(diagram.relationships_count(), 0);

        command.undo(&mut diagram).unwrap();
        assert_eq!(diagram, before);
    }

    #[test]
    fn test_undo_twice_is_misuse() {
        let mut diagram = class_diagram();
        let mut command = AddNodeCommand::new(
            NodeKind::Class,
            "Foo",
            Point::new(10.0, 10.0),
            Size::new(200.0, 150.0),
        );

        assert!(matches!(
            command.undo(&mut diagram),
            Err(EditError::CommandMisuse(_))
        ));

        command.execute(&mut diagram).unwrap();
        command.undo(&mut diagram).unwrap();
        assert!(matches!(
            command.undo(&mut diagram),
            Err(EditError::CommandMisuse(_))
        ));
    }

    #[test]
    fn test_stack_undo_redo_round_trip() {
        let mut diagram = class_diagram();
        let mut stack = CommandStack::new();

        let mut command = AddNodeCommand::new(
            NodeKind::Class,
            "Foo",
            Point::new(10.0, 10.0),
            Size::new(200.0, 150.0),
        );
        command.execute(&mut diagram).unwrap();
        stack.push(Box::new(command));

        assert!(stack.can_undo());
        assert!(stack.undo(&mut diagram).unwrap());
        assert_eq!(diagram.nodes_count(), 0);

        assert!(stack.can_redo());
        assert!(stack.redo(&mut diagram).unwrap());
        assert_eq!(diagram.nodes_count(), 1);
        assert!(diagram.node_by_name("Foo").is_some());
    }

    #[test]
    fn test_stack_new_mutation_clears_redo() {
        let mut diagram = class_diagram();
        let mut stack = CommandStack::new();

        let mut first = AddNodeCommand::new(
            NodeKind::Class,
            "Foo",
            Point::new(10.0, 10.0),
            Size::new(200.0, 150.0),
        );
        first.execute(&mut diagram).unwrap();
        stack.push(Box::new(first));
        stack.undo(&mut diagram).unwrap();
        assert!(stack.can_redo());

        let mut second = AddNodeCommand::new(
            NodeKind::Class,
            "Bar",
            Point::new(300.0, 10.0),
            Size::new(200.0, 150.0),
        );
        second.execute(&mut diagram).unwrap();
        stack.push(Box::new(second));

        assert!(!stack.can_redo());
        assert!(!stack.redo(&mut diagram).unwrap());
    }

    #[test]
    fn test_stack_undo_on_empty_returns_false() {
        let mut diagram = class_diagram();
        let mut stack = CommandStack::new();
        assert!(!stack.undo(&mut diagram).unwrap());
    }
}
