//! XML emission for the two diagram schemas.

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use pantograph_core::model::{Diagram, DiagramKind, DiagramNode, NodeKind, RelationshipKind};

/// Serializes a diagram to its persisted schema.
///
/// The schema is selected by the diagram kind. Node sizes are not persisted;
/// they are an editor concern, not part of the document model.
pub fn write_diagram(diagram: &Diagram) -> io::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    match diagram.kind() {
        DiagramKind::ClassDiagram => write_class_diagram(&mut writer, diagram)?,
        DiagramKind::UseCaseDiagram => write_use_case_diagram(&mut writer, diagram)?,
    }

    let bytes = writer.into_inner();
    Ok(String::from_utf8(bytes).expect("the XML writer emits UTF-8"))
}

fn write_class_diagram<W: Write>(writer: &mut Writer<W>, diagram: &Diagram) -> io::Result<()> {
    emit(writer, Event::Start(BytesStart::new("Diagram")))?;
    write_name(writer, diagram.name())?;

    emit(writer, Event::Start(BytesStart::new("Classes")))?;
    for node in diagram.nodes() {
        write_class(writer, node)?;
    }
    emit(writer, Event::End(BytesEnd::new("Classes")))?;

    emit(writer, Event::Start(BytesStart::new("Relationships")))?;
    for relationship in diagram.relationships() {
        let (start, end) = diagram
            .endpoint_names(relationship)
            .expect("diagram invariant: relationship endpoints resolve");
        let mut element = BytesStart::new("Relationship");
        element.push_attribute(("startClass", start));
        element.push_attribute(("endClass", end));
        element.push_attribute(("type", relationship.kind().as_str()));
        emit(writer, Event::Empty(element))?;
    }
    emit(writer, Event::End(BytesEnd::new("Relationships")))?;

    emit(writer, Event::End(BytesEnd::new("Diagram")))
}

fn write_class<W: Write>(writer: &mut Writer<W>, node: &DiagramNode) -> io::Result<()> {
    let mut class = BytesStart::new("Class");
    class.push_attribute(("name", node.name()));
    class.push_attribute(("type", class_type(node.kind())));
    class.push_attribute(("x", format_coordinate(node.position().x()).as_str()));
    class.push_attribute(("y", format_coordinate(node.position().y()).as_str()));
    emit(writer, Event::Start(class))?;

    emit(writer, Event::Start(BytesStart::new("Attributes")))?;
    for attribute in node.attributes() {
        let mut element = BytesStart::new("Attribute");
        element.push_attribute(("name", attribute.name.as_str()));
        element.push_attribute(("type", attribute.type_name.as_str()));
        element.push_attribute(("access", attribute.visibility.as_str()));
        emit(writer, Event::Empty(element))?;
    }
    emit(writer, Event::End(BytesEnd::new("Attributes")))?;

    emit(writer, Event::Start(BytesStart::new("Methods")))?;
    for method in node.methods() {
        let mut element = BytesStart::new("Method");
        element.push_attribute(("name", method.name.as_str()));
        element.push_attribute(("returnType", method.return_type.as_str()));
        element.push_attribute(("access", method.visibility.as_str()));
        emit(writer, Event::Start(element))?;

        emit(writer, Event::Start(BytesStart::new("Parameters")))?;
        for parameter in &method.parameters {
            emit(writer, Event::Start(BytesStart::new("Parameter")))?;
            emit(writer, Event::Text(BytesText::new(parameter)))?;
            emit(writer, Event::End(BytesEnd::new("Parameter")))?;
        }
        emit(writer, Event::End(BytesEnd::new("Parameters")))?;

        emit(writer, Event::End(BytesEnd::new("Method")))?;
    }
    emit(writer, Event::End(BytesEnd::new("Methods")))?;

    emit(writer, Event::End(BytesEnd::new("Class")))
}

fn write_use_case_diagram<W: Write>(writer: &mut Writer<W>, diagram: &Diagram) -> io::Result<()> {
    emit(writer, Event::Start(BytesStart::new("UseCaseDiagram")))?;
    write_name(writer, diagram.name())?;

    emit(writer, Event::Start(BytesStart::new("Components")))?;
    for node in diagram.nodes() {
        let mut component = BytesStart::new("Component");
        component.push_attribute(("x", format_coordinate(node.position().x()).as_str()));
        component.push_attribute(("y", format_coordinate(node.position().y()).as_str()));
        component.push_attribute(("type", component_type(node.kind())));
        component.push_attribute(("label", node.name()));
        emit(writer, Event::Empty(component))?;
    }
    emit(writer, Event::End(BytesEnd::new("Components")))?;

    emit(writer, Event::Start(BytesStart::new("Relationships")))?;
    for relationship in diagram.relationships() {
        let (start, end) = diagram
            .endpoint_names(relationship)
            .expect("diagram invariant: relationship endpoints resolve");
        let mut element = BytesStart::new("Relationship");
        element.push_attribute(("from", start));
        element.push_attribute(("to", end));
        element.push_attribute(("label", use_case_label(relationship.kind(), relationship.label())));
        emit(writer, Event::Empty(element))?;
    }
    emit(writer, Event::End(BytesEnd::new("Relationships")))?;

    emit(writer, Event::End(BytesEnd::new("UseCaseDiagram")))
}

fn write_name<W: Write>(writer: &mut Writer<W>, name: &str) -> io::Result<()> {
    emit(writer, Event::Start(BytesStart::new("Name")))?;
    emit(writer, Event::Text(BytesText::new(name)))?;
    emit(writer, Event::End(BytesEnd::new("Name")))
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> io::Result<()> {
    writer.write_event(event).map_err(io::Error::other)
}

fn class_type(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Class => "class",
        NodeKind::Interface => "interface",
        NodeKind::Actor | NodeKind::UseCase => {
            unreachable!("diagram invariant: a class diagram only contains classes and interfaces")
        }
    }
}

fn component_type(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Actor => "Actor",
        NodeKind::UseCase => "UseCase",
        NodeKind::Class | NodeKind::Interface => {
            unreachable!("diagram invariant: a use case diagram only contains actors and use cases")
        }
    }
}

/// The use-case schema has no `type` attribute; include and extend encode
/// their kind in the conventional guillemet label, which the reader maps
/// back. Custom labels only survive on plain associations.
fn use_case_label<'a>(kind: RelationshipKind, label: Option<&'a str>) -> &'a str {
    match kind {
        RelationshipKind::Include => "\u{ab}include\u{bb}",
        RelationshipKind::Extend => "\u{ab}extend\u{bb}",
        _ => label.unwrap_or(""),
    }
}

/// Coordinates print without a fractional part when they are whole, matching
/// the integer-friendly look of hand-written files.
fn format_coordinate(value: f32) -> String {
    format!("{value}")
}
