//! Node types: the placed elements of a diagram.

use std::fmt;
use std::str::FromStr;

use crate::geometry::{Bounds, Point, Size};
use crate::identifier::NodeId;

/// The type of a diagram node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Class,
    Interface,
    Actor,
    UseCase,
}

impl NodeKind {
    /// Smallest size a node of this kind may be resized to.
    pub fn minimum_size(self) -> Size {
        Size::new(50.0, 50.0)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Actor => "actor",
            Self::UseCase => "use case",
        };
        f.write_str(name)
    }
}

/// Member visibility for attributes and methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
}

impl Visibility {
    /// Returns the persisted `access` attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "protected" => Ok(Self::Protected),
            _ => Err(format!(
                "invalid visibility `{s}`, valid values: public, private, protected"
            )),
        }
    }
}

/// A typed attribute of a class node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub type_name: String,
    pub visibility: Visibility,
}

impl Attribute {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            visibility,
        }
    }
}

/// A method of a class or interface node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<String>,
    pub visibility: Visibility,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        return_type: impl Into<String>,
        parameters: Vec<String>,
        visibility: Visibility,
    ) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            parameters,
            visibility,
        }
    }
}

/// A placed diagram element: class, interface, actor, or use case.
///
/// Nodes are created and owned by a [`Diagram`](super::Diagram); everything
/// outside the aggregate addresses them by [`NodeId`]. Position and size are
/// mutated through the diagram so placement invariants stay in one place.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramNode {
    id: NodeId,
    name: String,
    kind: NodeKind,
    attributes: Vec<Attribute>,
    methods: Vec<Method>,
    position: Point,
    size: Size,
}

impl DiagramNode {
    pub(crate) fn new(
        id: NodeId,
        kind: NodeKind,
        name: impl Into<String>,
        position: Point,
        size: Size,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            attributes: Vec::new(),
            methods: Vec::new(),
            position,
            size: size.max(kind.minimum_size()),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Top-left corner of the node on the canvas.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Bounding box of the node on the canvas.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_origin(self.position, self.size)
    }

    /// Center point of the node, the origin for connector anchoring.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Attributes in declaration order. Only meaningful for class nodes.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Methods in declaration order.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Appends an attribute.
    pub fn push_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Appends a method.
    pub fn push_method(&mut self, method: Method) {
        self.methods.push(method);
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub(crate) fn set_size(&mut self, size: Size) {
        self.size = size.max(self.kind.minimum_size());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_bounds_and_center() {
        let node = DiagramNode::new(
            NodeId::new(0),
            NodeKind::Class,
            "Animal",
            Point::new(10.0, 20.0),
            Size::new(200.0, 150.0),
        );

        let bounds = node.bounds();
        assert_eq!(bounds.min_x(), 10.0);
        assert_eq!(bounds.max_x(), 210.0);
        assert_eq!(node.center(), Point::new(110.0, 95.0));
    }

    #[test]
    fn test_node_size_is_clamped_to_kind_minimum() {
        let node = DiagramNode::new(
            NodeId::new(0),
            NodeKind::Actor,
            "User",
            Point::default(),
            Size::new(10.0, 10.0),
        );

        assert_eq!(node.size(), Size::new(50.0, 50.0));
    }

    #[test]
    fn test_node_members_keep_declaration_order() {
        let mut node = DiagramNode::new(
            NodeId::new(0),
            NodeKind::Class,
            "Animal",
            Point::default(),
            Size::new(200.0, 150.0),
        );

        node.push_attribute(Attribute::new("name", "String", Visibility::Private));
        node.push_attribute(Attribute::new("age", "int", Visibility::Protected));
        node.push_method(Method::new(
            "speak",
            "void",
            vec!["String".to_string()],
            Visibility::Public,
        ));

        assert_eq!(node.attributes()[0].name, "name");
        assert_eq!(node.attributes()[1].name, "age");
        assert_eq!(node.methods()[0].parameters, vec!["String".to_string()]);
    }

    #[test]
    fn test_visibility_from_str() {
        assert_eq!(Visibility::from_str("public").unwrap(), Visibility::Public);
        assert_eq!(
            Visibility::from_str("private").unwrap(),
            Visibility::Private
        );
        assert_eq!(
            Visibility::from_str("protected").unwrap(),
            Visibility::Protected
        );
        assert!(Visibility::from_str("package").is_err());
    }
}
