//! Live scene graph mirroring the editor state.
//!
//! Nodes hold the geometry the renderer draws. During a drag or transform the
//! active node is mutated in place; the store only sees the result when the
//! gesture ends.

use crate::element::{CanvasElement, ElementId, ElementKind};
use kurbo::{Affine, Point, Rect, Vec2};

/// Renderer-owned mirror of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: ElementId,
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    /// Rotation in degrees about the node origin (top-left corner).
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub width: f64,
    pub height: f64,
}

impl SceneNode {
    pub fn from_element(element: &CanvasElement) -> Self {
        Self {
            id: element.id(),
            kind: element.kind(),
            x: element.position.x,
            y: element.position.y,
            rotation: element.rotation,
            scale_x: 1.0,
            scale_y: 1.0,
            width: element.width,
            height: element.height,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    /// Check if the node carries a pending scale.
    pub fn is_scaled(&self) -> bool {
        self.scale_x != 1.0 || self.scale_y != 1.0
    }

    /// Size with the pending scale applied.
    pub fn scaled_size(&self) -> (f64, f64) {
        (self.width * self.scale_x, self.height * self.scale_y)
    }

    /// Unrotated box with the pending scale applied, in workspace coordinates.
    pub fn bounds(&self) -> Rect {
        let (width, height) = self.scaled_size();
        Rect::new(self.x, self.y, self.x + width, self.y + height)
    }

    /// Transform from node-local coordinates (unscaled size) to workspace.
    pub fn transform(&self) -> Affine {
        Affine::translate(Vec2::new(self.x, self.y))
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }

    /// Map a workspace point into node-local coordinates.
    pub fn to_local(&self, point: Point) -> Point {
        let scale_ok = self.scale_x.abs() > f64::EPSILON && self.scale_y.abs() > f64::EPSILON;
        if !scale_ok {
            return Point::new(f64::NAN, f64::NAN);
        }
        self.transform().inverse() * point
    }

    /// Hit test a workspace point against the node's visible shape.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let local = self.to_local(point);
        if !local.x.is_finite() || !local.y.is_finite() {
            return false;
        }
        match self.kind {
            ElementKind::Circle => {
                let radius = self.width.min(self.height) / 2.0;
                let center = Point::new(self.width / 2.0, self.height / 2.0);
                local.distance(center) <= radius + tolerance
            }
            ElementKind::Rectangle | ElementKind::Text | ElementKind::Image => {
                Rect::new(0.0, 0.0, self.width, self.height)
                    .inflate(tolerance, tolerance)
                    .contains(local)
            }
        }
    }
}

/// Retained scene graph, back to front.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    /// Store revision the nodes were built from.
    synced_revision: Option<u64>,
    /// Node under an active gesture; kept as-is by `sync`.
    held: Option<ElementId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild nodes from the store's elements if the revision changed.
    ///
    /// A held node keeps its live geometry as long as its element still exists.
    pub fn sync(&mut self, elements: &[CanvasElement], revision: u64) {
        if self.synced_revision == Some(revision) {
            return;
        }
        let held = self.held.and_then(|id| self.find(id).cloned());

        self.nodes = elements
            .iter()
            .map(|element| match &held {
                Some(node) if node.id == element.id() => node.clone(),
                _ => SceneNode::from_element(element),
            })
            .collect();
        self.synced_revision = Some(revision);
        if self.held.is_some_and(|id| self.find(id).is_none()) {
            self.held = None;
        }
    }

    /// Force the next `sync` to rebuild.
    pub fn invalidate(&mut self) {
        self.synced_revision = None;
    }

    /// Keep a node's live geometry across syncs until released.
    pub fn hold(&mut self, id: ElementId) {
        self.held = Some(id);
    }

    pub fn release(&mut self) {
        self.held = None;
    }

    pub fn find(&self, id: ElementId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn find_mut(&mut self, id: ElementId) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Topmost node under a workspace point.
    pub fn node_at(&self, point: Point, tolerance: f64) -> Option<ElementId> {
        self.nodes
            .iter()
            .rev()
            .find(|n| n.hit_test(point, tolerance))
            .map(|n| n.id)
    }

    /// Unrotated boxes of every node, for guide computation.
    pub fn boxes(&self) -> impl Iterator<Item = (ElementId, Rect)> + '_ {
        self.nodes.iter().map(|n| (n.id, n.bounds()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
