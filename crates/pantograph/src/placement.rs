//! Node placement: gesture classification, drag and resize math, and
//! post-gesture overlap resolution.
//!
//! This module contains the pure calculations behind interactive placement.
//! The gesture *state* lives in the editor mode machine
//! ([`EditorMode`](crate::editor::EditorMode)); the functions here map
//! pointer coordinates to new node geometry and never touch the model
//! themselves.

use pantograph_core::geometry::{Bounds, Point, Size};
use pantograph_core::identifier::NodeId;
use pantograph_core::model::Diagram;

/// One of the eight compass directions a node border can be resized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl ResizeDirection {
    /// True when this direction moves the left edge of the node.
    fn moves_left_edge(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    /// True when this direction moves the right edge of the node.
    fn moves_right_edge(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    /// True when this direction moves the top edge of the node.
    fn moves_top_edge(self) -> bool {
        matches!(self, Self::North | Self::NorthWest | Self::NorthEast)
    }

    /// True when this direction moves the bottom edge of the node.
    fn moves_bottom_edge(self) -> bool {
        matches!(self, Self::South | Self::SouthWest | Self::SouthEast)
    }
}

/// What a pointer-down inside a node's bounds means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitZone {
    /// The interior: start a drag.
    Interior,
    /// A border band or corner: start a resize in that direction.
    Resize(ResizeDirection),
}

/// Classifies a pointer position against a node's bounds.
///
/// A band of `margin` units along each edge maps to a resize direction;
/// corner squares (where two bands meet) take priority over edges, edges over
/// the interior. Returns `None` when the pointer is outside the bounds
/// entirely.
pub fn classify_zone(pointer: Point, bounds: Bounds, margin: f32) -> Option<HitZone> {
    if !bounds.contains(pointer) {
        return None;
    }

    let near_left = pointer.x() <= bounds.min_x() + margin;
    let near_right = pointer.x() >= bounds.max_x() - margin;
    let near_top = pointer.y() <= bounds.min_y() + margin;
    let near_bottom = pointer.y() >= bounds.max_y() - margin;

    let direction = match (near_left, near_right, near_top, near_bottom) {
        (true, _, true, _) => Some(ResizeDirection::NorthWest),
        (_, true, true, _) => Some(ResizeDirection::NorthEast),
        (true, _, _, true) => Some(ResizeDirection::SouthWest),
        (_, true, _, true) => Some(ResizeDirection::SouthEast),
        (true, _, _, _) => Some(ResizeDirection::West),
        (_, true, _, _) => Some(ResizeDirection::East),
        (_, _, true, _) => Some(ResizeDirection::North),
        (_, _, _, true) => Some(ResizeDirection::South),
        _ => None,
    };

    Some(direction.map_or(HitZone::Interior, HitZone::Resize))
}

/// Computes a dragged node's new origin, keeping it fully on the canvas.
///
/// `grab` is the pointer offset from the node origin captured at
/// pointer-down, so the node does not jump under the cursor.
pub fn drag_position(pointer: Point, grab: Point, node_size: Size, canvas: Size) -> Point {
    let origin = pointer.sub_point(grab);
    clamp_to_canvas(origin, node_size, canvas)
}

/// Clamps a node origin so the node's bounds stay inside the canvas.
pub fn clamp_to_canvas(origin: Point, node_size: Size, canvas: Size) -> Point {
    origin.clamp(
        Point::new(0.0, 0.0),
        Point::new(
            canvas.width() - node_size.width(),
            canvas.height() - node_size.height(),
        ),
    )
}

/// Computes the new bounds for a resize gesture.
///
/// `origin` is the node's bounds at pointer-down and `delta` the pointer
/// movement since. Only the edges named by `direction` move; the opposite
/// edges keep their world-space coordinates. Width and height are clamped to
/// `minimum` and to the canvas: a moving left/top edge stops at 0, a moving
/// right/bottom edge at the canvas extent.
pub fn resize_bounds(
    direction: ResizeDirection,
    origin: Bounds,
    delta: Point,
    minimum: Size,
    canvas: Size,
) -> Bounds {
    let mut min_x = origin.min_x();
    let mut max_x = origin.max_x();
    let mut min_y = origin.min_y();
    let mut max_y = origin.max_y();

    if direction.moves_left_edge() {
        min_x = (origin.min_x() + delta.x())
            .min(max_x - minimum.width())
            .max(0.0);
    }
    if direction.moves_right_edge() {
        max_x = (origin.max_x() + delta.x())
            .max(min_x + minimum.width())
            .min(canvas.width());
    }
    if direction.moves_top_edge() {
        min_y = (origin.min_y() + delta.y())
            .min(max_y - minimum.height())
            .max(0.0);
    }
    if direction.moves_bottom_edge() {
        max_y = (origin.max_y() + delta.y())
            .max(min_y + minimum.height())
            .min(canvas.height());
    }

    Bounds::new(min_x, min_y, max_x, max_y)
}

/// Resolves the first collision after a gesture ends.
///
/// Scans the other nodes in insertion order (z-order) and, for the first one
/// whose bounds strictly overlap the gestured node's, nudges the gestured
/// node past the blocker: to its right where the horizontal spans intersect
/// and below it where the vertical spans intersect. Only one collision is
/// resolved per gesture; this is a best-effort nudge, not a packing pass.
/// The nudged origin is re-clamped to the canvas.
///
/// Returns the new origin, or `None` when nothing overlaps (or the node is
/// unknown) and the node should stay where it is.
pub fn resolve_overlap(diagram: &Diagram, moved: NodeId, canvas: Size) -> Option<Point> {
    let moved_node = diagram.node(moved)?;
    let moved_bounds = moved_node.bounds();

    for other in diagram.nodes() {
        if other.id() == moved {
            continue;
        }
        let blocker = other.bounds();
        if !moved_bounds.overlaps(blocker) {
            continue;
        }

        let mut x = moved_bounds.min_x();
        let mut y = moved_bounds.min_y();
        if moved_bounds.overlaps_horizontally(blocker) {
            x = blocker.max_x();
        }
        if moved_bounds.overlaps_vertically(blocker) {
            y = blocker.max_y();
        }
        return Some(clamp_to_canvas(
            Point::new(x, y),
            moved_node.size(),
            canvas,
        ));
    }

    None
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn direction_strategy() -> impl Strategy<Value = ResizeDirection> {
        prop_oneof![
            Just(ResizeDirection::North),
            Just(ResizeDirection::NorthEast),
            Just(ResizeDirection::East),
            Just(ResizeDirection::SouthEast),
            Just(ResizeDirection::South),
            Just(ResizeDirection::SouthWest),
            Just(ResizeDirection::West),
            Just(ResizeDirection::NorthWest),
        ]
    }

    fn origin_bounds_strategy() -> impl Strategy<Value = Bounds> {
        // A node somewhere inside a 1600x1200 canvas, already at least the
        // minimum size.
        (0.0f32..1400.0, 0.0f32..1000.0, 50.0f32..200.0, 50.0f32..200.0).prop_map(
            |(x, y, w, h)| {
                Bounds::from_origin(
                    Point::new(x.min(1600.0 - w), y.min(1200.0 - h)),
                    Size::new(w, h),
                )
            },
        )
    }

    fn delta_strategy() -> impl Strategy<Value = Point> {
        (-2000.0f32..2000.0, -2000.0f32..2000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    // ===================
    // Property Test Functions
    // ===================

    /// The edge opposite the resize direction never moves.
    fn check_opposite_edge_fixed(
        direction: ResizeDirection,
        origin: Bounds,
        delta: Point,
    ) -> Result<(), TestCaseError> {
        let resized = resize_bounds(direction, origin, delta, Size::new(50.0, 50.0), canvas());

        if !direction.moves_left_edge() {
            prop_assert_eq!(resized.min_x(), origin.min_x());
        }
        if !direction.moves_right_edge() {
            prop_assert_eq!(resized.max_x(), origin.max_x());
        }
        if !direction.moves_top_edge() {
            prop_assert_eq!(resized.min_y(), origin.min_y());
        }
        if !direction.moves_bottom_edge() {
            prop_assert_eq!(resized.max_y(), origin.max_y());
        }
        Ok(())
    }

    /// Resizing never produces a node below the minimum size or outside the
    /// canvas on the moving edges.
    fn check_resize_respects_limits(
        direction: ResizeDirection,
        origin: Bounds,
        delta: Point,
    ) -> Result<(), TestCaseError> {
        let minimum = Size::new(50.0, 50.0);
        let resized = resize_bounds(direction, origin, delta, minimum, canvas());

        prop_assert!(resized.width() >= minimum.width() - 0.001);
        prop_assert!(resized.height() >= minimum.height() - 0.001);
        if direction.moves_left_edge() {
            prop_assert!(resized.min_x() >= 0.0);
        }
        if direction.moves_right_edge() {
            prop_assert!(resized.max_x() <= canvas().width());
        }
        if direction.moves_top_edge() {
            prop_assert!(resized.min_y() >= 0.0);
        }
        if direction.moves_bottom_edge() {
            prop_assert!(resized.max_y() <= canvas().height());
        }
        Ok(())
    }

    /// A dragged node always ends up fully inside the canvas.
    fn check_drag_stays_on_canvas(pointer: Point, grab: Point) -> Result<(), TestCaseError> {
        let size = Size::new(200.0, 150.0);
        let origin = drag_position(pointer, grab, size, canvas());
        let bounds = Bounds::from_origin(origin, size);

        prop_assert!(bounds.min_x() >= 0.0);
        prop_assert!(bounds.min_y() >= 0.0);
        prop_assert!(bounds.max_x() <= canvas().width());
        prop_assert!(bounds.max_y() <= canvas().height());
        Ok(())
    }

    fn canvas() -> Size {
        Size::new(1600.0, 1200.0)
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn opposite_edge_fixed(direction in direction_strategy(), origin in origin_bounds_strategy(), delta in delta_strategy()) {
            check_opposite_edge_fixed(direction, origin, delta)?;
        }

        #[test]
        fn resize_respects_limits(direction in direction_strategy(), origin in origin_bounds_strategy(), delta in delta_strategy()) {
            check_resize_respects_limits(direction, origin, delta)?;
        }

        #[test]
        fn drag_stays_on_canvas(pointer in delta_strategy(), grab in delta_strategy()) {
            check_drag_stays_on_canvas(pointer, grab)?;
        }
    }
}
