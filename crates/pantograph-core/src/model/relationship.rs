//! Relationship types: the typed, directed edges of a diagram.

use std::fmt;
use std::str::FromStr;

use crate::identifier::{NodeId, RelationshipId};

/// The type of a relationship.
///
/// The direction convention is uniform across the crate: `start` is the
/// dependent side (child, part, including use case), `end` is the independent
/// side (parent, whole, included use case). Directional markers are drawn at
/// the end anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    Association,
    Aggregation,
    Composition,
    Inheritance,
    Include,
    Extend,
}

impl RelationshipKind {
    /// Returns the persisted `type` attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Association => "association",
            Self::Aggregation => "aggregation",
            Self::Composition => "composition",
            Self::Inheritance => "inheritance",
            Self::Include => "include",
            Self::Extend => "extend",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "association" => Ok(Self::Association),
            "aggregation" => Ok(Self::Aggregation),
            "composition" => Ok(Self::Composition),
            "inheritance" => Ok(Self::Inheritance),
            "include" => Ok(Self::Include),
            "extend" => Ok(Self::Extend),
            _ => Err(format!(
                "invalid relationship type `{s}`, valid values: association, \
                 aggregation, composition, inheritance, include, extend"
            )),
        }
    }
}

/// A typed, directed edge between two nodes of the same diagram.
///
/// Relationships store endpoint ids only; anchor points and marker rotation
/// are derived state owned by the connector layout and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    id: RelationshipId,
    start: NodeId,
    end: NodeId,
    kind: RelationshipKind,
    label: Option<String>,
}

impl Relationship {
    pub(crate) fn new(
        id: RelationshipId,
        start: NodeId,
        end: NodeId,
        kind: RelationshipKind,
        label: Option<String>,
    ) -> Self {
        Self {
            id,
            start,
            end,
            kind,
            label,
        }
    }

    pub fn id(&self) -> RelationshipId {
        self.id
    }

    /// The dependent endpoint (child, part, including use case).
    pub fn start(&self) -> NodeId {
        self.start
    }

    /// The independent endpoint (parent, whole, included use case).
    pub fn end(&self) -> NodeId {
        self.end
    }

    pub fn kind(&self) -> RelationshipKind {
        self.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// True when this relationship touches the given node on either side.
    pub fn references(&self, node: NodeId) -> bool {
        self.start == node || self.end == node
    }
}
