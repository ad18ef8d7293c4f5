//! Connector routing: border-anchored relationship geometry.
//!
//! Every relationship is drawn as a segment between two anchor points, one on
//! the border of each endpoint node, aimed at the other node's center. The
//! [`ConnectorLayout`] caches the geometry for every relationship of a
//! diagram and recomputes it whenever an endpoint node moves or resizes —
//! continuously during a drag, so connectors follow the node live. Renderers
//! that prefer computing on demand can call [`compute`] directly instead of
//! reading the cache.

use std::collections::HashMap;

use log::warn;

use pantograph_core::geometry::{self, Point};
use pantograph_core::identifier::{NodeId, RelationshipId};
use pantograph_core::model::{Diagram, DiagramNode, Relationship, RelationshipKind};

/// The glyph drawn at a connector's directed end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerGlyph {
    /// Hollow triangle: inheritance, at the superclass.
    HollowTriangle,
    /// Filled diamond: composition, at the whole.
    FilledDiamond,
    /// Hollow diamond: aggregation, at the whole.
    HollowDiamond,
}

/// A directional marker pinned to an anchor point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    glyph: MarkerGlyph,
    position: Point,
    rotation_degrees: f32,
}

impl Marker {
    pub fn glyph(&self) -> MarkerGlyph {
        self.glyph
    }

    /// The anchor point the marker is pinned to.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Rotation to apply to the glyph, in degrees.
    ///
    /// Zero means the glyph's tip points up; the rotation turns it to face
    /// away from the dependent (start) node.
    pub fn rotation_degrees(&self) -> f32 {
        self.rotation_degrees
    }
}

/// The derived geometry of one relationship.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorGeometry {
    start_anchor: Point,
    end_anchor: Point,
    marker: Option<Marker>,
    label_anchor: Point,
    degenerate: bool,
}

impl ConnectorGeometry {
    /// Anchor on the border of the start (dependent) node.
    pub fn start_anchor(&self) -> Point {
        self.start_anchor
    }

    /// Anchor on the border of the end (independent) node.
    pub fn end_anchor(&self) -> Point {
        self.end_anchor
    }

    /// The directional marker, when the relationship kind has one.
    pub fn marker(&self) -> Option<Marker> {
        self.marker
    }

    /// Midpoint of the segment, where a label is placed.
    pub fn label_anchor(&self) -> Point {
        self.label_anchor
    }

    /// True when the endpoints' centers coincided and fallback anchors were
    /// used instead of border intersections.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }
}

/// Computes the connector geometry for one relationship, on demand.
///
/// Coincident node centers make a border intersection undefined; the
/// computation then falls back to each node's top-center point, flags the
/// geometry as degenerate, and logs a warning. NaN never reaches the result.
pub fn compute(diagram: &Diagram, relationship: &Relationship) -> Option<ConnectorGeometry> {
    let start = diagram.node(relationship.start())?;
    let end = diagram.node(relationship.end())?;

    let anchors = geometry::border_intersection(start.center(), start.size(), end.center())
        .and_then(|start_anchor| {
            geometry::border_intersection(end.center(), end.size(), start.center())
                .map(|end_anchor| (start_anchor, end_anchor))
        });

    let (start_anchor, end_anchor, degenerate) = match anchors {
        Ok((start_anchor, end_anchor)) => (start_anchor, end_anchor, false),
        Err(_) => {
            warn!(
                relationship = relationship.id().to_string(),
                start = start.name(),
                end = end.name();
                "coincident node centers, using top-center fallback anchors"
            );
            (top_center(start), top_center(end), true)
        }
    };

    let marker = marker_glyph(relationship.kind()).map(|glyph| Marker {
        glyph,
        position: end_anchor,
        rotation_degrees: geometry::angle_degrees(end_anchor, start_anchor) - 90.0,
    });

    Some(ConnectorGeometry {
        start_anchor,
        end_anchor,
        marker,
        label_anchor: start_anchor.midpoint(end_anchor),
        degenerate,
    })
}

fn top_center(node: &DiagramNode) -> Point {
    Point::new(node.center().x(), node.bounds().min_y())
}

/// Markers sit at the end (independent) anchor; association, include, and
/// extend draw a bare line.
fn marker_glyph(kind: RelationshipKind) -> Option<MarkerGlyph> {
    match kind {
        RelationshipKind::Inheritance => Some(MarkerGlyph::HollowTriangle),
        RelationshipKind::Composition => Some(MarkerGlyph::FilledDiamond),
        RelationshipKind::Aggregation => Some(MarkerGlyph::HollowDiamond),
        RelationshipKind::Association | RelationshipKind::Include | RelationshipKind::Extend => {
            None
        }
    }
}

/// Cached connector geometry for every relationship of a diagram.
#[derive(Debug, Clone, Default)]
pub struct ConnectorLayout {
    geometries: HashMap<RelationshipId, ConnectorGeometry>,
}

impl ConnectorLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the layout for a diagram's current relationships.
    pub fn of(diagram: &Diagram) -> Self {
        let mut layout = Self::new();
        layout.refresh_all(diagram);
        layout
    }

    /// Returns the cached geometry for a relationship.
    pub fn geometry(&self, id: RelationshipId) -> Option<&ConnectorGeometry> {
        self.geometries.get(&id)
    }

    /// Discards the cache and recomputes every relationship.
    ///
    /// Used after structural changes (add/remove/undo/redo) where stale
    /// entries may linger or new relationships may be missing.
    pub fn refresh_all(&mut self, diagram: &Diagram) {
        self.geometries.clear();
        for relationship in diagram.relationships() {
            if let Some(geometry) = compute(diagram, relationship) {
                self.geometries.insert(relationship.id(), geometry);
            }
        }
    }

    /// Recomputes the relationships incident to one node.
    ///
    /// This is the hot path during a drag or resize: only connectors touching
    /// the moving node change, everything else keeps its cached geometry.
    pub fn refresh_node(&mut self, diagram: &Diagram, node: NodeId) {
        for relationship in diagram.relationships_of(node) {
            if let Some(geometry) = compute(diagram, relationship) {
                self.geometries.insert(relationship.id(), geometry);
            }
        }
    }

    /// Number of cached connector geometries.
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use pantograph_core::geometry::{Size, border_intersection};
    use pantograph_core::model::{DiagramKind, NodeKind};

    use super::*;

    fn assert_point_eq(actual: Point, expected: Point) {
        assert_approx_eq!(f32, actual.x(), expected.x());
        assert_approx_eq!(f32, actual.y(), expected.y());
    }

    fn zoo() -> (Diagram, RelationshipId) {
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
        let relationship = diagram
            .add_relationship(dog, animal, RelationshipKind::Inheritance, None)
            .unwrap();
        (diagram, relationship)
    }

    #[test]
    fn test_anchors_lie_on_borders_facing_each_other() {
        let (diagram, id) = zoo();
        let layout = ConnectorLayout::of(&diagram);
        let geometry = layout.geometry(id).unwrap();

        let animal = diagram.node_by_name("Animal").unwrap();
        let dog = diagram.node_by_name("Dog").unwrap();

        // Dog (start) anchors on its left edge, Animal (end) on its right.
        assert_point_eq(
            geometry.start_anchor(),
            border_intersection(dog.center(), dog.size(), animal.center()).unwrap(),
        );
        assert_point_eq(
            geometry.end_anchor(),
            border_intersection(animal.center(), animal.size(), dog.center()).unwrap(),
        );
        assert_approx_eq!(f32, geometry.start_anchor().x(), 300.0);
        assert_approx_eq!(f32, geometry.end_anchor().x(), 210.0);
    }

    #[test]
    fn test_inheritance_marker_at_superclass_anchor() {
        let (diagram, id) = zoo();
        let layout = ConnectorLayout::of(&diagram);
        let geometry = layout.geometry(id).unwrap();

        let marker = geometry.marker().unwrap();
        assert_eq!(marker.glyph(), MarkerGlyph::HollowTriangle);
        assert_point_eq(marker.position(), geometry.end_anchor());
        // End anchor is left of the start anchor at equal height, so the
        // angle end->start is 0 degrees and the triangle tips -90.
        assert_approx_eq!(f32, marker.rotation_degrees(), -90.0);
    }

    #[test]
    fn test_association_has_no_marker() {
        let mut diagram = Diagram::new("Zoo", DiagramKind::ClassDiagram);
        let a = diagram
            .add_node(
                NodeKind::Class,
                "A",
                Point::new(0.0, 0.0),
                Size::new(100.0, 100.0),
            )
            .unwrap();
        let b = diagram
            .add_node(
                NodeKind::Class,
                "B",
                Point::new(300.0, 0.0),
                Size::new(100.0, 100.0),
            )
            .unwrap();
        let id = diagram
            .add_relationship(a, b, RelationshipKind::Association, None)
            .unwrap();

        let layout = ConnectorLayout::of(&diagram);
        assert_eq!(layout.geometry(id).unwrap().marker(), None);
    }

    #[test]
    fn test_diamond_markers_for_whole_part_kinds() {
        let mut diagram = Diagram::new("Garage", DiagramKind::ClassDiagram);
        let wheel = diagram
            .add_node(
                NodeKind::Class,
                "Wheel",
                Point::new(0.0, 0.0),
                Size::new(100.0, 100.0),
            )
            .unwrap();
        let car = diagram
            .add_node(
                NodeKind::Class,
                "Car",
                Point::new(300.0, 0.0),
                Size::new(100.0, 100.0),
            )
            .unwrap();
        let composition = diagram
            .add_relationship(wheel, car, RelationshipKind::Composition, None)
            .unwrap();
        let aggregation = diagram
            .add_relationship(wheel, car, RelationshipKind::Aggregation, None)
            .unwrap();

        let layout = ConnectorLayout::of(&diagram);
        let composition = layout.geometry(composition).unwrap();
        let aggregation = layout.geometry(aggregation).unwrap();

        assert_eq!(
            composition.marker().unwrap().glyph(),
            MarkerGlyph::FilledDiamond
        );
        assert_eq!(
            aggregation.marker().unwrap().glyph(),
            MarkerGlyph::HollowDiamond
        );
        // Both sit on the whole's border.
        assert_point_eq(composition.marker().unwrap().position(), composition.end_anchor());
    }

    #[test]
    fn test_label_anchor_is_segment_midpoint() {
        let (diagram, id) = zoo();
        let layout = ConnectorLayout::of(&diagram);
        let geometry = layout.geometry(id).unwrap();

        assert_point_eq(
            geometry.label_anchor(),
            geometry.start_anchor().midpoint(geometry.end_anchor()),
        );
    }

    #[test]
    fn test_refresh_node_follows_moved_endpoint() {
        let (mut diagram, id) = zoo();
        let mut layout = ConnectorLayout::of(&diagram);
        let before = *layout.geometry(id).unwrap();

        let dog = diagram.node_by_name("Dog").unwrap().id();
        diagram
            .set_node_position(dog, Point::new(300.0, 400.0))
            .unwrap();
        layout.refresh_node(&diagram, dog);

        let after = *layout.geometry(id).unwrap();
        assert_ne!(before, after);
        // The end anchor now leaves through Animal's bottom edge.
        assert!(after.end_anchor().y() > before.end_anchor().y());
    }

    #[test]
    fn test_coincident_centers_fall_back_to_top_center() {
        let mut diagram = Diagram::new("Zoo", DiagramKind::ClassDiagram);
        let a = diagram
            .add_node(
                NodeKind::Class,
                "A",
                Point::new(100.0, 100.0),
                Size::new(200.0, 100.0),
            )
            .unwrap();
        let b = diagram
            .add_node(
                NodeKind::Class,
                "B",
                Point::new(150.0, 125.0),
                Size::new(100.0, 50.0),
            )
            .unwrap();
        let id = diagram
            .add_relationship(a, b, RelationshipKind::Association, None)
            .unwrap();

        // Same center (200, 150) for both nodes.
        let layout = ConnectorLayout::of(&diagram);
        let geometry = layout.geometry(id).unwrap();

        assert!(geometry.is_degenerate());
        assert_point_eq(geometry.start_anchor(), Point::new(200.0, 100.0));
        assert_point_eq(geometry.end_anchor(), Point::new(200.0, 125.0));
        assert!(geometry.start_anchor().x().is_finite());
    }

    #[test]
    fn test_refresh_all_drops_stale_entries() {
        let (mut diagram, id) = zoo();
        let mut layout = ConnectorLayout::of(&diagram);
        assert_eq!(layout.len(), 1);

        let dog = diagram.node_by_name("Dog").unwrap().id();
        diagram.remove_node(dog).unwrap();
        layout.refresh_all(&diagram);

        assert!(layout.is_empty());
        assert_eq!(layout.geometry(id), None);
    }
}
