//! Transformer overlay: the resize and rotate handles around the selected node.

use crate::element::{ElementId, MIN_ELEMENT_SIZE};
use crate::scene::{SceneGraph, SceneNode};
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Overlay color for border and anchors.
pub const TRANSFORMER_COLOR: &str = "#8B5CF6";
/// Anchor square size in screen pixels.
pub const ANCHOR_SIZE: f64 = 8.0;
/// Border dash pattern in screen pixels.
pub const BORDER_DASH: [f64; 2] = [3.0, 3.0];
/// Distance from the top edge to the rotation handle (in workspace units).
pub const ROTATE_HANDLE_OFFSET: f64 = 50.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Type of transformer handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Corner(Corner),
    Edge(Edge),
    /// Rotation handle above the top edge.
    Rotate,
}

/// A handle with its position in workspace coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point (in workspace coordinates) hits this handle.
    /// `tolerance` should be adjusted for zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point.x - self.position.x).abs() <= tolerance
            && (point.y - self.position.y).abs() <= tolerance
    }
}

/// Keep `old` when `proposed` is smaller than the minimum size on either axis.
pub fn bound_box(old: Rect, proposed: Rect) -> Rect {
    if proposed.width() < MIN_ELEMENT_SIZE || proposed.height() < MIN_ELEMENT_SIZE {
        old
    } else {
        proposed
    }
}

/// Rotation frame of a node: translation then rotation, no scale.
fn frame(node: &SceneNode) -> Affine {
    Affine::translate(Vec2::new(node.x, node.y)) * Affine::rotate(node.rotation.to_radians())
}

/// The node's scaled box in its own rotation frame.
fn frame_box(node: &SceneNode) -> Rect {
    let (width, height) = node.scaled_size();
    Rect::new(0.0, 0.0, width, height)
}

/// Handle positions for a node, in workspace coordinates.
pub fn node_handles(node: &SceneNode) -> Vec<Handle> {
    let frame = frame(node);
    let b = frame_box(node);
    let mid_x = b.x1 / 2.0;
    let mid_y = b.y1 / 2.0;
    let at = |x: f64, y: f64, kind: HandleKind| Handle::new(frame * Point::new(x, y), kind);

    vec![
        at(0.0, 0.0, HandleKind::Corner(Corner::TopLeft)),
        at(b.x1, 0.0, HandleKind::Corner(Corner::TopRight)),
        at(0.0, b.y1, HandleKind::Corner(Corner::BottomLeft)),
        at(b.x1, b.y1, HandleKind::Corner(Corner::BottomRight)),
        at(mid_x, 0.0, HandleKind::Edge(Edge::Top)),
        at(b.x1, mid_y, HandleKind::Edge(Edge::Right)),
        at(mid_x, b.y1, HandleKind::Edge(Edge::Bottom)),
        at(0.0, mid_y, HandleKind::Edge(Edge::Left)),
        at(mid_x, -ROTATE_HANDLE_OFFSET, HandleKind::Rotate),
    ]
}

/// Corners of the node's rotated box, clockwise from top-left.
pub fn node_outline(node: &SceneNode) -> [Point; 4] {
    let frame = frame(node);
    let b = frame_box(node);
    [
        frame * Point::new(0.0, 0.0),
        frame * Point::new(b.x1, 0.0),
        frame * Point::new(b.x1, b.y1),
        frame * Point::new(0.0, b.y1),
    ]
}

/// Resize `start` by dragging `handle` to `pointer`.
///
/// The edges controlled by the handle follow the pointer in the node's
/// rotation frame; the result goes through [`bound_box`]. The change is
/// expressed as scale, as the scene library does until the gesture commits.
pub fn resize_node(start: &SceneNode, handle: HandleKind, pointer: Point) -> SceneNode {
    let frame = frame(start);
    let local = frame.inverse() * pointer;
    let old = frame_box(start);
    let mut proposed = old;

    match handle {
        HandleKind::Corner(Corner::TopLeft) => {
            proposed.x0 = local.x;
            proposed.y0 = local.y;
        }
        HandleKind::Corner(Corner::TopRight) => {
            proposed.x1 = local.x;
            proposed.y0 = local.y;
        }
        HandleKind::Corner(Corner::BottomLeft) => {
            proposed.x0 = local.x;
            proposed.y1 = local.y;
        }
        HandleKind::Corner(Corner::BottomRight) => {
            proposed.x1 = local.x;
            proposed.y1 = local.y;
        }
        HandleKind::Edge(Edge::Top) => proposed.y0 = local.y,
        HandleKind::Edge(Edge::Right) => proposed.x1 = local.x,
        HandleKind::Edge(Edge::Bottom) => proposed.y1 = local.y,
        HandleKind::Edge(Edge::Left) => proposed.x0 = local.x,
        HandleKind::Rotate => return rotate_node(start, pointer),
    }

    let accepted = bound_box(old, proposed);
    let origin = frame * Point::new(accepted.x0, accepted.y0);

    let mut node = start.clone();
    node.set_position(origin);
    if start.width > 0.0 {
        node.scale_x = accepted.width() / start.width;
    }
    if start.height > 0.0 {
        node.scale_y = accepted.height() / start.height;
    }
    node
}

/// Rotate `start` about its center so the rotation handle points at `pointer`.
pub fn rotate_node(start: &SceneNode, pointer: Point) -> SceneNode {
    let b = frame_box(start);
    let half = Vec2::new(b.x1 / 2.0, b.y1 / 2.0);
    let center = frame(start) * half.to_point();

    let delta = pointer - center;
    if delta.hypot() < f64::EPSILON {
        return start.clone();
    }
    // The handle sits straight above the center at rotation 0.
    let rotation = delta.y.atan2(delta.x).to_degrees() + 90.0;

    let mut node = start.clone();
    node.rotation = rotation;
    let offset = Affine::rotate(rotation.to_radians()) * half.to_point();
    node.set_position(center - offset.to_vec2());
    node
}

/// The single transformer overlay, attached to at most one node.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    attached: Option<ElementId>,
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to the selected node, looked up by id. Detaches when there is
    /// no selection or the node is missing.
    pub fn attach(&mut self, graph: &SceneGraph, selected: Option<ElementId>) {
        self.attached = selected.filter(|id| graph.find(*id).is_some());
    }

    pub fn attached(&self) -> Option<ElementId> {
        self.attached
    }

    /// Handles of the attached node.
    pub fn handles(&self, graph: &SceneGraph) -> Vec<Handle> {
        self.attached
            .and_then(|id| graph.find(id))
            .map(node_handles)
            .unwrap_or_default()
    }

    /// Outline of the attached node.
    pub fn outline(&self, graph: &SceneGraph) -> Option<[Point; 4]> {
        self.attached.and_then(|id| graph.find(id)).map(node_outline)
    }

    /// Handle under a workspace point.
    pub fn handle_at(&self, graph: &SceneGraph, point: Point, tolerance: f64) -> Option<HandleKind> {
        self.handles(graph)
            .into_iter()
            .find(|h| h.hit_test(point, tolerance))
            .map(|h| h.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{CanvasElement, ElementKind};

    fn node_at(x: f64, y: f64) -> SceneNode {
        SceneNode::from_element(&CanvasElement::new(ElementKind::Rectangle, Point::new(x, y)))
    }

    #[test]
    fn test_bound_box_rejects_small() {
        let old = Rect::new(0.0, 0.0, 100.0, 80.0);
        assert_eq!(bound_box(old, Rect::new(0.0, 0.0, 4.9, 80.0)), old);
        assert_eq!(bound_box(old, Rect::new(0.0, 0.0, 100.0, 3.0)), old);
        let ok = Rect::new(0.0, 0.0, 5.0, 5.0);
        assert_eq!(bound_box(old, ok), ok);
    }

    #[test]
    fn test_handles_unrotated() {
        let node = node_at(10.0, 20.0);
        let handles = node_handles(&node);
        assert_eq!(handles.len(), 9);

        let br = handles
            .iter()
            .find(|h| h.kind == HandleKind::Corner(Corner::BottomRight))
            .unwrap();
        assert!((br.position.x - 110.0).abs() < 1e-9);
        assert!((br.position.y - 100.0).abs() < 1e-9);

        let rotate = handles.iter().find(|h| h.kind == HandleKind::Rotate).unwrap();
        assert!((rotate.position.x - 60.0).abs() < 1e-9);
        assert!((rotate.position.y - (20.0 - ROTATE_HANDLE_OFFSET)).abs() < 1e-9);
    }

    #[test]
    fn test_resize_bottom_right() {
        let start = node_at(0.0, 0.0);
        let node = resize_node(&start, HandleKind::Corner(Corner::BottomRight), Point::new(200.0, 40.0));
        assert!((node.scale_x - 2.0).abs() < 1e-9);
        assert!((node.scale_y - 0.5).abs() < 1e-9);
        assert!(node.x.abs() < 1e-9);
        assert!(node.y.abs() < 1e-9);
        assert!((node.width - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_top_left_moves_origin() {
        let start = node_at(0.0, 0.0);
        let node = resize_node(&start, HandleKind::Corner(Corner::TopLeft), Point::new(50.0, 40.0));
        assert!((node.x - 50.0).abs() < 1e-9);
        assert!((node.y - 40.0).abs() < 1e-9);
        assert!((node.scale_x - 0.5).abs() < 1e-9);
        assert!((node.scale_y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_resize_below_minimum_keeps_old_box() {
        let start = node_at(0.0, 0.0);
        let node = resize_node(&start, HandleKind::Edge(Edge::Right), Point::new(3.0, 40.0));
        assert_eq!(node, start);
    }

    #[test]
    fn test_resize_edge_only_changes_one_axis() {
        let start = node_at(0.0, 0.0);
        let node = resize_node(&start, HandleKind::Edge(Edge::Bottom), Point::new(500.0, 160.0));
        assert!((node.scale_x - 1.0).abs() < f64::EPSILON);
        assert!((node.scale_y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_keeps_center() {
        let start = node_at(0.0, 0.0);
        // Center is (50, 40); a pointer to the right means 90 degrees.
        let node = rotate_node(&start, Point::new(200.0, 40.0));
        assert!((node.rotation - 90.0).abs() < 1e-9);

        let center = frame(&node) * Point::new(50.0, 40.0);
        assert!((center.x - 50.0).abs() < 1e-9);
        assert!((center.y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_attach_follows_selection() {
        let element = CanvasElement::new(ElementKind::Rectangle, Point::ZERO);
        let id = element.id();
        let mut graph = SceneGraph::new();
        graph.sync(&[element], 1);

        let mut transformer = Transformer::new();
        transformer.attach(&graph, Some(id));
        assert_eq!(transformer.attached(), Some(id));
        assert_eq!(transformer.handles(&graph).len(), 9);

        transformer.attach(&graph, Some(uuid::Uuid::new_v4()));
        assert_eq!(transformer.attached(), None);

        transformer.attach(&graph, Some(id));
        transformer.attach(&graph, None);
        assert!(transformer.handles(&graph).is_empty());
    }

    #[test]
    fn test_handle_at() {
        let element = CanvasElement::new(ElementKind::Rectangle, Point::ZERO);
        let id = element.id();
        let mut graph = SceneGraph::new();
        graph.sync(&[element], 1);
        let mut transformer = Transformer::new();
        transformer.attach(&graph, Some(id));

        assert_eq!(
            transformer.handle_at(&graph, Point::new(101.0, 79.0), 4.0),
            Some(HandleKind::Corner(Corner::BottomRight))
        );
        assert_eq!(transformer.handle_at(&graph, Point::new(50.0, 40.0), 4.0), None);
    }
}
