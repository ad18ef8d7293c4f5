//! XML parsing for the two diagram schemas.
//!
//! Parsing happens in two stages: the event loop collects plain parsed
//! records, then the records are replayed through the model API so every
//! diagram invariant is re-validated. A file that fails either stage aborts
//! the load; no partially built diagram is ever returned.

use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};

use pantograph_core::geometry::{Point, Size};
use pantograph_core::model::{
    Attribute, Diagram, DiagramKind, Method, NodeKind, RelationshipKind, Visibility,
};

use super::LoadError;

/// Parses a persisted diagram document.
///
/// The root element selects the schema: `<Diagram>` for class diagrams,
/// `<UseCaseDiagram>` for use-case diagrams. Loaded nodes take
/// `default_size`, since neither schema persists node dimensions.
///
/// # Errors
///
/// Returns [`LoadError`] for malformed XML, schema violations, relationship
/// names that do not resolve to a component, and files that violate a
/// diagram invariant.
pub fn read_diagram(xml: &str, default_size: Size) -> Result<Diagram, LoadError> {
    let mut reader = Reader::from_str(xml);

    loop {
        match next_event(&mut reader)? {
            Event::Start(element) => {
                return match element.name().as_ref() {
                    b"Diagram" => read_class_diagram(&mut reader, default_size),
                    b"UseCaseDiagram" => read_use_case_diagram(&mut reader, default_size),
                    other => Err(unexpected(other)),
                };
            }
            Event::Eof => return Err(LoadError::MissingElement("Diagram")),
            _ => {}
        }
    }
}

// =============================================================================
// Class diagram schema
// =============================================================================

struct ParsedClass {
    name: String,
    kind: NodeKind,
    position: Point,
    attributes: Vec<Attribute>,
    methods: Vec<Method>,
}

struct ParsedEdge {
    start: String,
    end: String,
    kind: RelationshipKind,
    label: Option<String>,
}

fn read_class_diagram(
    reader: &mut Reader<&[u8]>,
    default_size: Size,
) -> Result<Diagram, LoadError> {
    let mut name = None;
    let mut classes = Vec::new();
    let mut edges = Vec::new();

    loop {
        match next_event(reader)? {
            Event::Start(element) => match element.name().as_ref() {
                b"Name" => name = Some(read_element_text(reader)?),
                b"Classes" => read_classes(reader, &mut classes)?,
                b"Relationships" => read_class_relationships(reader, &mut edges)?,
                other => return Err(unexpected(other)),
            },
            Event::Empty(element) => match element.name().as_ref() {
                // Empty sections are fine; they just contribute nothing.
                b"Name" | b"Classes" | b"Relationships" => {}
                other => return Err(unexpected(other)),
            },
            Event::End(_) => break,
            Event::Eof => return Err(LoadError::UnexpectedEof("Diagram")),
            _ => {}
        }
    }

    let name = name.ok_or(LoadError::MissingElement("Name"))?;
    build_diagram(name, DiagramKind::ClassDiagram, classes, edges, default_size)
}

fn read_classes(
    reader: &mut Reader<&[u8]>,
    classes: &mut Vec<ParsedClass>,
) -> Result<(), LoadError> {
    loop {
        match next_event(reader)? {
            Event::Start(element) if element.name().as_ref() == b"Class" => {
                classes.push(read_class(reader, &element, true)?);
            }
            Event::Empty(element) if element.name().as_ref() == b"Class" => {
                classes.push(read_class(reader, &element, false)?);
            }
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(LoadError::UnexpectedEof("Classes")),
            Event::Start(element) => return Err(unexpected(element.name().as_ref())),
            _ => {}
        }
    }
}

fn read_class(
    reader: &mut Reader<&[u8]>,
    element: &BytesStart<'_>,
    has_children: bool,
) -> Result<ParsedClass, LoadError> {
    let name = required_attr(element, "Class", "name")?;
    let kind = match required_attr(element, "Class", "type")?.as_str() {
        "class" => NodeKind::Class,
        "interface" => NodeKind::Interface,
        other => {
            return Err(LoadError::InvalidAttribute {
                attribute: "type",
                value: other.to_string(),
                message: "valid values: class, interface".to_string(),
            });
        }
    };
    let position = read_position(element, "Class")?;

    let mut attributes = Vec::new();
    let mut methods = Vec::new();
    if has_children {
        loop {
            match next_event(reader)? {
                Event::Start(child) => match child.name().as_ref() {
                    b"Attributes" => read_attributes(reader, &mut attributes)?,
                    b"Methods" => read_methods(reader, &mut methods)?,
                    other => return Err(unexpected(other)),
                },
                Event::Empty(child) => match child.name().as_ref() {
                    b"Attributes" | b"Methods" => {}
                    other => return Err(unexpected(other)),
                },
                Event::End(_) => break,
                Event::Eof => return Err(LoadError::UnexpectedEof("Class")),
                _ => {}
            }
        }
    }

    Ok(ParsedClass {
        name,
        kind,
        position,
        attributes,
        methods,
    })
}

fn read_attributes(
    reader: &mut Reader<&[u8]>,
    attributes: &mut Vec<Attribute>,
) -> Result<(), LoadError> {
    loop {
        match next_event(reader)? {
            Event::Empty(element) | Event::Start(element)
                if element.name().as_ref() == b"Attribute" =>
            {
                attributes.push(Attribute::new(
                    required_attr(&element, "Attribute", "name")?,
                    required_attr(&element, "Attribute", "type")?,
                    read_visibility(&element, "Attribute")?,
                ));
            }
            Event::End(element) if element.name().as_ref() == b"Attributes" => return Ok(()),
            Event::End(_) => {}
            Event::Eof => return Err(LoadError::UnexpectedEof("Attributes")),
            Event::Start(element) => return Err(unexpected(element.name().as_ref())),
            _ => {}
        }
    }
}

fn read_methods(reader: &mut Reader<&[u8]>, methods: &mut Vec<Method>) -> Result<(), LoadError> {
    loop {
        match next_event(reader)? {
            Event::Start(element) if element.name().as_ref() == b"Method" => {
                methods.push(read_method(reader, &element, true)?);
            }
            Event::Empty(element) if element.name().as_ref() == b"Method" => {
                methods.push(read_method(reader, &element, false)?);
            }
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(LoadError::UnexpectedEof("Methods")),
            Event::Start(element) => return Err(unexpected(element.name().as_ref())),
            _ => {}
        }
    }
}

fn read_method(
    reader: &mut Reader<&[u8]>,
    element: &BytesStart<'_>,
    has_children: bool,
) -> Result<Method, LoadError> {
    let name = required_attr(element, "Method", "name")?;
    let return_type = required_attr(element, "Method", "returnType")?;
    let visibility = read_visibility(element, "Method")?;

    let mut parameters = Vec::new();
    if has_children {
        loop {
            match next_event(reader)? {
                Event::Start(child) => match child.name().as_ref() {
                    b"Parameters" => {}
                    b"Parameter" => parameters.push(read_element_text(reader)?),
                    other => return Err(unexpected(other)),
                },
                Event::End(child) if child.name().as_ref() == b"Method" => break,
                Event::End(_) => {}
                Event::Eof => return Err(LoadError::UnexpectedEof("Method")),
                _ => {}
            }
        }
    }

    Ok(Method::new(name, return_type, parameters, visibility))
}

fn read_class_relationships(
    reader: &mut Reader<&[u8]>,
    edges: &mut Vec<ParsedEdge>,
) -> Result<(), LoadError> {
    loop {
        match next_event(reader)? {
            Event::Empty(element) | Event::Start(element)
                if element.name().as_ref() == b"Relationship" =>
            {
                let kind_value = required_attr(&element, "Relationship", "type")?;
                let kind =
                    RelationshipKind::from_str(&kind_value).map_err(|message| {
                        LoadError::InvalidAttribute {
                            attribute: "type",
                            value: kind_value.clone(),
                            message,
                        }
                    })?;
                edges.push(ParsedEdge {
                    start: required_attr(&element, "Relationship", "startClass")?,
                    end: required_attr(&element, "Relationship", "endClass")?,
                    kind,
                    label: None,
                });
            }
            Event::End(element) if element.name().as_ref() == b"Relationships" => return Ok(()),
            Event::End(_) => {}
            Event::Eof => return Err(LoadError::UnexpectedEof("Relationships")),
            Event::Start(element) => return Err(unexpected(element.name().as_ref())),
            _ => {}
        }
    }
}

// =============================================================================
// Use-case diagram schema
// =============================================================================

fn read_use_case_diagram(
    reader: &mut Reader<&[u8]>,
    default_size: Size,
) -> Result<Diagram, LoadError> {
    let mut name = None;
    let mut components = Vec::new();
    let mut edges = Vec::new();

    loop {
        match next_event(reader)? {
            Event::Start(element) => match element.name().as_ref() {
                b"Name" => name = Some(read_element_text(reader)?),
                b"Components" => read_components(reader, &mut components)?,
                b"Relationships" => read_use_case_relationships(reader, &mut edges)?,
                other => return Err(unexpected(other)),
            },
            Event::Empty(element) => match element.name().as_ref() {
                b"Name" | b"Components" | b"Relationships" => {}
                other => return Err(unexpected(other)),
            },
            Event::End(_) => break,
            Event::Eof => return Err(LoadError::UnexpectedEof("UseCaseDiagram")),
            _ => {}
        }
    }

    let name = name.ok_or(LoadError::MissingElement("Name"))?;
    build_diagram(
        name,
        DiagramKind::UseCaseDiagram,
        components,
        edges,
        default_size,
    )
}

fn read_components(
    reader: &mut Reader<&[u8]>,
    components: &mut Vec<ParsedClass>,
) -> Result<(), LoadError> {
    loop {
        match next_event(reader)? {
            Event::Empty(element) | Event::Start(element)
                if element.name().as_ref() == b"Component" =>
            {
                let kind = match required_attr(&element, "Component", "type")?.as_str() {
                    "Actor" => NodeKind::Actor,
                    "UseCase" => NodeKind::UseCase,
                    other => {
                        return Err(LoadError::InvalidAttribute {
                            attribute: "type",
                            value: other.to_string(),
                            message: "valid values: Actor, UseCase".to_string(),
                        });
                    }
                };
                components.push(ParsedClass {
                    name: required_attr(&element, "Component", "label")?,
                    kind,
                    position: read_position(&element, "Component")?,
                    attributes: Vec::new(),
                    methods: Vec::new(),
                });
            }
            Event::End(element) if element.name().as_ref() == b"Components" => return Ok(()),
            Event::End(_) => {}
            Event::Eof => return Err(LoadError::UnexpectedEof("Components")),
            Event::Start(element) => return Err(unexpected(element.name().as_ref())),
            _ => {}
        }
    }
}

fn read_use_case_relationships(
    reader: &mut Reader<&[u8]>,
    edges: &mut Vec<ParsedEdge>,
) -> Result<(), LoadError> {
    loop {
        match next_event(reader)? {
            Event::Empty(element) | Event::Start(element)
                if element.name().as_ref() == b"Relationship" =>
            {
                let label = optional_attr(&element, "label")?.unwrap_or_default();
                edges.push(ParsedEdge {
                    start: required_attr(&element, "Relationship", "from")?,
                    end: required_attr(&element, "Relationship", "to")?,
                    kind: kind_for_label(&label),
                    label: if label.is_empty() { None } else { Some(label) },
                });
            }
            Event::End(element) if element.name().as_ref() == b"Relationships" => return Ok(()),
            Event::End(_) => {}
            Event::Eof => return Err(LoadError::UnexpectedEof("Relationships")),
            Event::Start(element) => return Err(unexpected(element.name().as_ref())),
            _ => {}
        }
    }
}

/// The use-case schema has no relationship `type` attribute; the conventional
/// guillemet labels carry the kind instead.
fn kind_for_label(label: &str) -> RelationshipKind {
    let stripped = label
        .trim()
        .trim_matches(|c| c == '\u{ab}' || c == '\u{bb}')
        .trim();
    if stripped.eq_ignore_ascii_case("include") {
        RelationshipKind::Include
    } else if stripped.eq_ignore_ascii_case("extend") {
        RelationshipKind::Extend
    } else {
        RelationshipKind::Association
    }
}

// =============================================================================
// Rebuild through the model
// =============================================================================

fn build_diagram(
    name: String,
    kind: DiagramKind,
    nodes: Vec<ParsedClass>,
    edges: Vec<ParsedEdge>,
    default_size: Size,
) -> Result<Diagram, LoadError> {
    let mut diagram = Diagram::new(name, kind);

    for parsed in nodes {
        let id = diagram.add_node(parsed.kind, parsed.name, parsed.position, default_size)?;
        let node = diagram
            .node_mut(id)
            .expect("node was just added to the diagram");
        for attribute in parsed.attributes {
            node.push_attribute(attribute);
        }
        for method in parsed.methods {
            node.push_method(method);
        }
    }

    for edge in edges {
        let start = diagram
            .node_by_name(&edge.start)
            .ok_or_else(|| LoadError::UnresolvedNode(edge.start.clone()))?
            .id();
        let end = diagram
            .node_by_name(&edge.end)
            .ok_or_else(|| LoadError::UnresolvedNode(edge.end.clone()))?
            .id();
        diagram.add_relationship(start, end, edge.kind, edge.label)?;
    }

    Ok(diagram)
}

// =============================================================================
// Event helpers
// =============================================================================

fn next_event<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Event<'a>, LoadError> {
    reader.read_event().map_err(xml_error)
}

fn xml_error(err: impl std::fmt::Display) -> LoadError {
    LoadError::Xml(err.to_string())
}

/// Collects the text content up to the matching end tag.
fn read_element_text(reader: &mut Reader<&[u8]>) -> Result<String, LoadError> {
    let mut text = String::new();
    loop {
        match next_event(reader)? {
            Event::Text(t) => text.push_str(&t.decode().map_err(xml_error)?),
            Event::GeneralRef(r) => {
                if let Some(ch) = r.resolve_char_ref().map_err(xml_error)? {
                    text.push(ch);
                } else {
                    let name = r.decode().map_err(xml_error)?;
                    let resolved = resolve_predefined_entity(&name)
                        .ok_or_else(|| LoadError::Xml(format!("unknown entity &{name};")))?;
                    text.push_str(resolved);
                }
            }
            Event::End(_) => return Ok(text),
            Event::Eof => return Err(LoadError::UnexpectedEof("text element")),
            _ => {}
        }
    }
}

fn required_attr(
    element: &BytesStart<'_>,
    element_name: &'static str,
    name: &'static str,
) -> Result<String, LoadError> {
    optional_attr(element, name)?.ok_or(LoadError::MissingAttribute {
        element: element_name,
        attribute: name,
    })
}

fn optional_attr(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, LoadError> {
    let Some(attr) = element.try_get_attribute(name).map_err(xml_error)? else {
        return Ok(None);
    };
    Ok(Some(attr.unescape_value().map_err(xml_error)?.into_owned()))
}

fn read_visibility(
    element: &BytesStart<'_>,
    element_name: &'static str,
) -> Result<Visibility, LoadError> {
    let value = required_attr(element, element_name, "access")?;
    Visibility::from_str(&value).map_err(|message| LoadError::InvalidAttribute {
        attribute: "access",
        value,
        message,
    })
}

fn read_position(element: &BytesStart<'_>, element_name: &'static str) -> Result<Point, LoadError> {
    let x = parse_coordinate(required_attr(element, element_name, "x")?, "x")?;
    let y = parse_coordinate(required_attr(element, element_name, "y")?, "y")?;
    Ok(Point::new(x, y))
}

fn parse_coordinate(value: String, attribute: &'static str) -> Result<f32, LoadError> {
    value
        .parse::<f32>()
        .map_err(|err| LoadError::InvalidAttribute {
            attribute,
            value,
            message: err.to_string(),
        })
}

fn unexpected(name: &[u8]) -> LoadError {
    LoadError::UnexpectedElement(String::from_utf8_lossy(name).into_owned())
}
