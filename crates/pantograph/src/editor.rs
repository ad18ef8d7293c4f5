//! The editor: one state machine over the whole interactive session.
//!
//! The original flag-per-mode design (`addActorMode`, `dragMode`, ...) is
//! replaced by a single [`EditorMode`] value, so impossible combinations
//! (dragging while placing, two pending relationships) cannot be
//! represented. [`Editor`] owns the diagram, the command stack, the
//! connector layout, and the configuration, and is the public API of the
//! engine: pointer events go in, model mutations and connector refreshes
//! come out.
//!
//! Anything that needs user text (a new node's name) is returned to the
//! caller as an [`EditorRequest`]; the engine never blocks, and cancelling a
//! prompt simply means not calling the follow-up method — the model is not
//! touched until the follow-up arrives.
//!
//! All mutation goes through `&mut self`, so an editor lives on one event
//! thread; share the rendered output, not the editor.

use log::{debug, info};

use pantograph_core::geometry::{Bounds, Point};
use pantograph_core::identifier::{NodeId, RelationshipId};
use pantograph_core::model::{Diagram, DiagramKind, DiagramNode, NodeKind, RelationshipKind};

use crate::command::{
    AddNodeCommand, AddRelationshipCommand, Command, CommandStack, RemoveNodeCommand,
    RemoveRelationshipCommand,
};
use crate::config::AppConfig;
use crate::connector::ConnectorLayout;
use crate::error::{EditError, PantographError};
use crate::persist;
use crate::placement::{self, HitZone, ResizeDirection};

/// What the editor is currently doing.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorMode {
    /// Waiting for input.
    Idle,
    /// The next canvas click requests a node of this kind.
    PlacingNode { kind: NodeKind },
    /// Collecting the two endpoints of a new relationship.
    CreatingRelationship {
        kind: RelationshipKind,
        label: Option<String>,
        pending_start: Option<NodeId>,
    },
    /// A node is following the pointer.
    Dragging {
        node: NodeId,
        grab: Point,
        origin: Point,
    },
    /// A node border is following the pointer.
    Resizing {
        node: NodeId,
        direction: ResizeDirection,
        origin: Bounds,
        anchor: Point,
    },
}

impl EditorMode {
    fn is_gesture(&self) -> bool {
        matches!(self, Self::Dragging { .. } | Self::Resizing { .. })
    }
}

/// Input the engine needs from the user before it can proceed.
///
/// Returned by [`Editor::pointer_down`]; the embedding UI shows its prompt
/// and calls the follow-up method (or nothing, to cancel).
#[derive(Debug, Clone, PartialEq)]
pub enum EditorRequest {
    /// Prompt for a name, then call [`Editor::place_node`] with it.
    NodeName { kind: NodeKind, position: Point },
}

/// The interactive diagram editor engine.
///
/// # Examples
///
/// ```
/// use pantograph::{Editor, config::AppConfig};
/// use pantograph_core::model::{NodeKind, RelationshipKind};
///
/// let mut editor = Editor::new(AppConfig::default(), "Zoo");
/// let animal = editor
///     .place_node(NodeKind::Class, "Animal", (10.0, 10.0).into())
///     .expect("place Animal");
/// let dog = editor
///     .place_node(NodeKind::Class, "Dog", (300.0, 10.0).into())
///     .expect("place Dog");
///
/// let relationship = editor
///     .connect(dog, animal, RelationshipKind::Inheritance, None)
///     .expect("connect");
/// assert!(editor.connectors().geometry(relationship).is_some());
///
/// editor.undo().expect("undo");
/// assert_eq!(editor.diagram().relationships_count(), 0);
/// ```
#[derive(Debug)]
pub struct Editor {
    config: AppConfig,
    diagram: Diagram,
    commands: CommandStack,
    connectors: ConnectorLayout,
    mode: EditorMode,
}

impl Editor {
    /// Creates an editor over an empty class diagram.
    pub fn new(config: AppConfig, name: impl Into<String>) -> Self {
        Self::with_kind(config, name, DiagramKind::ClassDiagram)
    }

    /// Creates an editor over an empty diagram of the given kind.
    pub fn with_kind(config: AppConfig, name: impl Into<String>, kind: DiagramKind) -> Self {
        Self::from_diagram(config, Diagram::new(name, kind))
    }

    /// Wraps an existing diagram, e.g. one loaded from disk.
    pub fn from_diagram(config: AppConfig, diagram: Diagram) -> Self {
        let connectors = ConnectorLayout::of(&diagram);
        Self {
            config,
            diagram,
            commands: CommandStack::new(),
            connectors,
            mode: EditorMode::Idle,
        }
    }

    /// Parses a persisted diagram file and wraps it.
    pub fn from_xml(config: AppConfig, xml: &str) -> Result<Self, PantographError> {
        let diagram = persist::read_diagram(xml, config.interaction().default_node_size())?;
        Ok(Self::from_diagram(config, diagram))
    }

    /// Serializes the current diagram to its persisted schema.
    pub fn to_xml(&self) -> Result<String, PantographError> {
        Ok(persist::write_diagram(&self.diagram)?)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Member editing (attributes, methods) on a node.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut DiagramNode> {
        self.diagram.node_mut(id)
    }

    pub fn connectors(&self) -> &ConnectorLayout {
        &self.connectors
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    // =========================================================================
    // Mode transitions
    // =========================================================================

    /// Arms node placement: the next canvas click requests a node name.
    pub fn begin_place_node(&mut self, kind: NodeKind) {
        self.leave_gesture();
        debug!(kind = kind.to_string(); "placing node");
        self.mode = EditorMode::PlacingNode { kind };
    }

    /// Arms relationship creation: the next two node clicks become the
    /// endpoints. The label, if any, is captured up front.
    pub fn begin_connect(&mut self, kind: RelationshipKind, label: Option<String>) {
        self.leave_gesture();
        debug!(kind = kind.to_string(); "creating relationship");
        self.mode = EditorMode::CreatingRelationship {
            kind,
            label,
            pending_start: None,
        };
    }

    /// Abandons the current mode or gesture.
    ///
    /// A cancelled gesture snaps the node back to its geometry at
    /// pointer-down; a cancelled placement or relationship leaves the model
    /// untouched (nothing was created yet).
    pub fn cancel(&mut self) {
        self.leave_gesture();
        self.mode = EditorMode::Idle;
    }

    fn leave_gesture(&mut self) {
        match self.mode {
            EditorMode::Dragging { node, origin, .. } => {
                let _ = self.diagram.set_node_position(node, origin);
                self.connectors.refresh_node(&self.diagram, node);
            }
            EditorMode::Resizing { node, origin, .. } => {
                let _ = self.diagram.set_node_position(node, origin.min_point());
                let _ = self.diagram.set_node_size(node, origin.to_size());
                self.connectors.refresh_node(&self.diagram, node);
            }
            _ => {}
        }
    }

    // =========================================================================
    // Pointer events
    // =========================================================================

    /// Feeds a pointer-down event at canvas coordinates.
    ///
    /// Depending on the mode this starts a drag or resize, collects a
    /// relationship endpoint, or asks the caller for a node name.
    pub fn pointer_down(&mut self, pointer: Point) -> Result<Option<EditorRequest>, EditError> {
        match self.mode.clone() {
            EditorMode::Idle => {
                self.start_gesture(pointer);
                Ok(None)
            }
            EditorMode::PlacingNode { kind } => Ok(Some(EditorRequest::NodeName {
                kind,
                position: pointer,
            })),
            EditorMode::CreatingRelationship {
                kind,
                label,
                pending_start,
            } => {
                let Some(hit) = self.node_at(pointer) else {
                    return Ok(None);
                };
                match pending_start {
                    None => {
                        debug!(start = hit.to_string(); "relationship start selected");
                        self.mode = EditorMode::CreatingRelationship {
                            kind,
                            label,
                            pending_start: Some(hit),
                        };
                        Ok(None)
                    }
                    Some(start) => {
                        // Creation ends the mode either way; a rejected pair
                        // (self-edge, duplicate) surfaces to the caller with
                        // the model unchanged.
                        self.mode = EditorMode::Idle;
                        self.connect(start, hit, kind, label)?;
                        Ok(None)
                    }
                }
            }
            EditorMode::Dragging { .. } | EditorMode::Resizing { .. } => Ok(None),
        }
    }

    /// Feeds a pointer-move event. During a gesture the node geometry and
    /// every incident connector update live; otherwise this is a no-op.
    pub fn pointer_moved(&mut self, pointer: Point) -> Result<(), EditError> {
        match self.mode {
            EditorMode::Dragging { node, grab, .. } => {
                let size = self
                    .diagram
                    .node(node)
                    .map(DiagramNode::size)
                    .unwrap_or_default();
                let position =
                    placement::drag_position(pointer, grab, size, self.config.canvas().size());
                self.diagram.set_node_position(node, position)?;
                self.connectors.refresh_node(&self.diagram, node);
            }
            EditorMode::Resizing {
                node,
                direction,
                origin,
                anchor,
            } => {
                let minimum = self
                    .diagram
                    .node(node)
                    .map(|node| node.kind().minimum_size())
                    .unwrap_or_default();
                let bounds = placement::resize_bounds(
                    direction,
                    origin,
                    pointer.sub_point(anchor),
                    minimum,
                    self.config.canvas().size(),
                );
                self.diagram.set_node_position(node, bounds.min_point())?;
                self.diagram.set_node_size(node, bounds.to_size())?;
                self.connectors.refresh_node(&self.diagram, node);
            }
            _ => {}
        }
        Ok(())
    }

    /// Feeds a pointer-up event, ending any gesture.
    ///
    /// This is where overlap resolution runs: the first node still
    /// overlapping the gestured one nudges it aside.
    pub fn pointer_up(&mut self) -> Result<(), EditError> {
        if let EditorMode::Dragging { node, .. } | EditorMode::Resizing { node, .. } = self.mode {
            if let Some(position) =
                placement::resolve_overlap(&self.diagram, node, self.config.canvas().size())
            {
                debug!(node = node.to_string(); "overlap resolved");
                self.diagram.set_node_position(node, position)?;
            }
            self.connectors.refresh_node(&self.diagram, node);
            self.mode = EditorMode::Idle;
        }
        Ok(())
    }

    fn start_gesture(&mut self, pointer: Point) {
        let Some(id) = self.node_at(pointer) else {
            return;
        };
        // Hit succeeded, the node exists.
        let Some(node) = self.diagram.node(id) else {
            return;
        };
        let bounds = node.bounds();
        let margin = self.config.interaction().resize_margin();

        match placement::classify_zone(pointer, bounds, margin) {
            Some(HitZone::Interior) => {
                self.mode = EditorMode::Dragging {
                    node: id,
                    grab: pointer.sub_point(bounds.min_point()),
                    origin: bounds.min_point(),
                };
            }
            Some(HitZone::Resize(direction)) => {
                self.mode = EditorMode::Resizing {
                    node: id,
                    direction,
                    origin: bounds,
                    anchor: pointer,
                };
            }
            None => {}
        }
    }

    /// The topmost node under the pointer; later insertions stack on top.
    fn node_at(&self, pointer: Point) -> Option<NodeId> {
        self.diagram
            .nodes()
            .filter(|node| node.bounds().contains(pointer))
            .map(DiagramNode::id)
            .last()
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    /// Creates a node with the configured default size, through the command
    /// stack. The position is clamped to the canvas. Returns the new id.
    pub fn place_node(
        &mut self,
        kind: NodeKind,
        name: impl Into<String>,
        position: Point,
    ) -> Result<NodeId, EditError> {
        let name = name.into();
        let size = self.config.interaction().default_node_size();
        let position = placement::clamp_to_canvas(position, size, self.config.canvas().size());

        let mut command = AddNodeCommand::new(kind, name.as_str(), position, size);
        command.execute(&mut self.diagram)?;
        let id = command
            .node_id()
            .expect("a successfully executed AddNodeCommand records its node id");
        self.commands.push(Box::new(command));
        self.mode = EditorMode::Idle;

        info!(node = id.to_string(), name, kind = kind.to_string(); "node placed");
        Ok(id)
    }

    /// Creates a relationship through the command stack. Returns the new id.
    pub fn connect(
        &mut self,
        start: NodeId,
        end: NodeId,
        kind: RelationshipKind,
        label: Option<String>,
    ) -> Result<RelationshipId, EditError> {
        let mut command = AddRelationshipCommand::new(start, end, kind, label);
        command.execute(&mut self.diagram)?;
        let id = command
            .relationship_id()
            .expect("a successfully executed AddRelationshipCommand records its relationship id");
        self.commands.push(Box::new(command));
        self.connectors.refresh_node(&self.diagram, start);

        info!(
            relationship = id.to_string(),
            kind = kind.to_string();
            "relationship created"
        );
        Ok(id)
    }

    /// Removes a node (cascading) through the command stack.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), EditError> {
        let mut command = RemoveNodeCommand::new(id);
        command.execute(&mut self.diagram)?;
        self.commands.push(Box::new(command));
        self.connectors.refresh_all(&self.diagram);
        Ok(())
    }

    /// Removes a relationship through the command stack.
    pub fn remove_relationship(&mut self, id: RelationshipId) -> Result<(), EditError> {
        let mut command = RemoveRelationshipCommand::new(id);
        command.execute(&mut self.diagram)?;
        self.commands.push(Box::new(command));
        self.connectors.refresh_all(&self.diagram);
        Ok(())
    }

    /// Undoes the most recent structural mutation. Returns `false` when the
    /// history is empty.
    pub fn undo(&mut self) -> Result<bool, EditError> {
        let undone = self.commands.undo(&mut self.diagram)?;
        if undone {
            self.connectors.refresh_all(&self.diagram);
        }
        Ok(undone)
    }

    /// Re-applies the most recently undone mutation. Returns `false` when
    /// there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, EditError> {
        let redone = self.commands.redo(&mut self.diagram)?;
        if redone {
            self.connectors.refresh_all(&self.diagram);
        }
        Ok(redone)
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }
}
