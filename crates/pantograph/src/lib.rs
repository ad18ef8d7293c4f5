//! Pantograph - an interactive diagram-editing engine.
//!
//! Editing, connector routing, undo/redo, and persistence for UML class and
//! use-case diagrams. The engine is headless: it consumes pointer events and
//! structured edit calls, and exposes the resulting model and connector
//! geometry for an embedding UI to render.
//!
//! The public facade is [`Editor`]. It owns the diagram, the command stack,
//! the connector layout, and the configuration:
//!
//! ```rust
//! use pantograph::{Editor, config::AppConfig};
//! use pantograph_core::model::{NodeKind, RelationshipKind};
//!
//! let mut editor = Editor::new(AppConfig::default(), "Zoo");
//!
//! // Structural edits go through undoable commands.
//! let animal = editor
//!     .place_node(NodeKind::Class, "Animal", (10.0, 10.0).into())
//!     .expect("place Animal");
//! let dog = editor
//!     .place_node(NodeKind::Class, "Dog", (300.0, 10.0).into())
//!     .expect("place Dog");
//! editor
//!     .connect(dog, animal, RelationshipKind::Inheritance, None)
//!     .expect("connect Dog to Animal");
//!
//! // Pointer events drive dragging and resizing; connectors re-route live.
//! editor.pointer_down((400.0, 85.0).into()).expect("grab Dog");
//! editor.pointer_moved((700.0, 500.0).into()).expect("drag Dog");
//! editor.pointer_up().expect("release Dog");
//!
//! // The whole session round-trips through the persisted XML schema.
//! let xml = editor.to_xml().expect("serialize");
//! let reloaded = Editor::from_xml(AppConfig::default(), &xml).expect("reload");
//! assert_eq!(reloaded.diagram().nodes_count(), 2);
//! ```

pub mod command;
pub mod config;
pub mod connector;
pub mod editor;
pub mod persist;
pub mod placement;

mod error;

pub use editor::{Editor, EditorMode, EditorRequest};
pub use error::{EditError, PantographError};
