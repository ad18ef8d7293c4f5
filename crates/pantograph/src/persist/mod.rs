//! The persistence adapter: XML serialization of diagrams.
//!
//! Two schemas exist, selected by the diagram kind. Class diagrams persist as
//! `<Diagram>` documents carrying classes (with attributes and methods) and
//! typed relationships; use-case diagrams persist as `<UseCaseDiagram>`
//! documents carrying components and labelled relationships. Relationships
//! reference nodes **by name**, not by internal id, so the reader re-resolves
//! names against the loaded nodes and fails when one does not resolve.
//!
//! Node sizes are not part of either schema; loaded nodes take the default
//! creation size passed by the caller.
//!
//! Loading goes through the model API, so every diagram invariant is
//! re-validated: a file that violates one (self-relationship, duplicate name,
//! incompatible kind) aborts with [`LoadError`] and nothing of the partial
//! diagram escapes.

mod reader;
mod writer;

use thiserror::Error;

use pantograph_core::model::ValidationError;

pub use reader::read_diagram;
pub use writer::write_diagram;

/// A persisted diagram file could not be turned into a valid diagram.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("unexpected element <{0}>")]
    UnexpectedElement(String),

    #[error("missing element <{0}>")]
    MissingElement(&'static str),

    #[error("document ended before </{0}>")]
    UnexpectedEof(&'static str),

    #[error("element <{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("attribute `{attribute}` has invalid value `{value}`: {message}")]
    InvalidAttribute {
        attribute: &'static str,
        value: String,
        message: String,
    },

    #[error("relationship references unknown node `{0}`")]
    UnresolvedNode(String),

    #[error("persisted diagram violates an invariant: {0}")]
    Invalid(#[from] ValidationError),
}
