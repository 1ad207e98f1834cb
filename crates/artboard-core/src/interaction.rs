//! Pointer interaction: selection clicks, drags and transformer gestures.
//!
//! Gestures mutate the live [`SceneNode`] and only reach the store when they
//! end, as one partial patch.

use crate::element::{CanvasElement, ElementId, ElementKind, ElementPatch, MIN_ELEMENT_SIZE};
use crate::guides::{Guide, GuideConfig, compute_guides};
use crate::scene::{SceneGraph, SceneNode};
use crate::store::EditorState;
use crate::transform::{HandleKind, Transformer, resize_node};
use kurbo::{Point, Rect, Vec2};

/// Current gesture.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Pointer went down on empty canvas.
    PressedCanvas { origin: Point },
    /// Pointer went down on an element that has not moved yet.
    PressedElement { id: ElementId, origin: Point },
    /// An element is being dragged.
    Drag {
        id: ElementId,
        /// The element as it was when the drag started.
        record: CanvasElement,
        /// Pointer position minus node origin at drag start.
        grab: Vec2,
    },
    /// A transformer handle is being dragged.
    Transform {
        id: ElementId,
        handle: HandleKind,
        start: SceneNode,
    },
}

/// Build the patch that commits a node's live geometry.
///
/// A pending scale is folded into width and height (at least the minimum
/// size) and the node's scale is reset to 1.
pub fn commit_patch(node: &mut SceneNode) -> ElementPatch {
    let mut patch = ElementPatch::new()
        .with_x(node.x)
        .with_y(node.y)
        .with_rotation(node.rotation);

    if node.is_scaled() {
        let width = (node.width * node.scale_x).max(MIN_ELEMENT_SIZE);
        let height = (node.height * node.scale_y).max(MIN_ELEMENT_SIZE);
        patch = patch.with_size(width, height);
        node.width = width;
        node.height = height;
        node.scale_x = 1.0;
        node.scale_y = 1.0;
    }
    patch
}

/// Drives drag and transform gestures against the store and scene graph.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    gesture: Gesture,
    guides: Vec<Guide>,
    pub guide_config: GuideConfig,
}

impl Interaction {
    pub fn new(guide_config: GuideConfig) -> Self {
        Self {
            gesture: Gesture::Idle,
            guides: Vec::new(),
            guide_config,
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Check if a drag or transform is in progress.
    pub fn is_active(&self) -> bool {
        matches!(self.gesture, Gesture::Drag { .. } | Gesture::Transform { .. })
    }

    /// Guides for the current drag tick.
    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    /// Start dragging an element. `pointer` is in workspace coordinates.
    pub fn drag_start(
        &mut self,
        state: &EditorState,
        graph: &mut SceneGraph,
        id: ElementId,
        pointer: Point,
    ) -> bool {
        let (Some(record), Some(node)) = (state.get(id), graph.find(id)) else {
            return false;
        };
        let grab = pointer - node.position();
        self.gesture = Gesture::Drag {
            id,
            record: record.clone(),
            grab,
        };
        graph.hold(id);
        self.guides.clear();
        true
    }

    /// Move the dragged node under the pointer and recompute guides.
    pub fn drag_move(&mut self, graph: &mut SceneGraph, pointer: Point, canvas: Rect) -> &[Guide] {
        let Gesture::Drag { id, grab, .. } = &self.gesture else {
            return &self.guides;
        };
        let id = *id;
        let Some(node) = graph.find_mut(id) else {
            return &self.guides;
        };
        node.set_position(pointer - *grab);
        let dragged = node.bounds();

        self.guides = compute_guides(id, dragged, graph.boxes(), canvas, &self.guide_config);
        &self.guides
    }

    /// Finish a drag: clear guides and commit the node's position.
    pub fn drag_end(&mut self, state: &mut EditorState, graph: &mut SceneGraph) -> Option<ElementPatch> {
        self.guides.clear();
        let Gesture::Drag { id, record, .. } = &self.gesture else {
            return None;
        };
        let (id, from) = (*id, record.position);
        self.gesture = Gesture::Idle;
        log::debug!("Drag of {id} ended, started at ({}, {})", from.x, from.y);
        self.commit(state, graph, id)
    }

    /// Start a transformer gesture on the node.
    pub fn transform_start(&mut self, graph: &mut SceneGraph, id: ElementId, handle: HandleKind) -> bool {
        let Some(node) = graph.find(id) else {
            return false;
        };
        self.gesture = Gesture::Transform {
            id,
            handle,
            start: node.clone(),
        };
        graph.hold(id);
        true
    }

    /// Apply the handle drag to the live node.
    pub fn transform_move(&mut self, graph: &mut SceneGraph, pointer: Point) {
        let Gesture::Transform { id, handle, start } = &self.gesture else {
            return;
        };
        let updated = resize_node(start, *handle, pointer);
        if let Some(node) = graph.find_mut(*id) {
            *node = updated;
        }
    }

    /// Finish a transformer gesture and commit the node's geometry.
    pub fn transform_end(&mut self, state: &mut EditorState, graph: &mut SceneGraph) -> Option<ElementPatch> {
        let Gesture::Transform { id, .. } = self.gesture else {
            return None;
        };
        self.gesture = Gesture::Idle;
        self.commit(state, graph, id)
    }

    /// Abandon the current gesture and restore the node from the store.
    pub fn cancel(&mut self, graph: &mut SceneGraph) {
        self.gesture = Gesture::Idle;
        self.guides.clear();
        graph.release();
        graph.invalidate();
    }

    fn commit(&mut self, state: &mut EditorState, graph: &mut SceneGraph, id: ElementId) -> Option<ElementPatch> {
        graph.release();
        let node = graph.find_mut(id)?;
        let patch = commit_patch(node);
        log::debug!("Committing gesture on {id}: {patch:?}");
        state.update_element(id, &patch);
        Some(patch)
    }

    /// Pointer pressed at a workspace point.
    ///
    /// Transformer handles win over elements. Pressing an element selects it.
    pub fn pointer_down(
        &mut self,
        state: &mut EditorState,
        graph: &mut SceneGraph,
        transformer: &Transformer,
        pointer: Point,
        tolerance: f64,
    ) {
        let grabbed = transformer
            .attached()
            .zip(transformer.handle_at(graph, pointer, tolerance));
        if let Some((id, handle)) = grabbed {
            self.transform_start(graph, id, handle);
            return;
        }

        match graph.node_at(pointer, 0.0) {
            Some(id) => {
                if state.selected() != Some(id) {
                    state.select_element(Some(id));
                }
                self.gesture = Gesture::PressedElement { id, origin: pointer };
            }
            None => self.gesture = Gesture::PressedCanvas { origin: pointer },
        }
    }

    /// Pointer moved while pressed.
    pub fn pointer_move(
        &mut self,
        state: &EditorState,
        graph: &mut SceneGraph,
        pointer: Point,
        canvas: Rect,
    ) {
        match self.gesture {
            Gesture::PressedElement { id, origin } => {
                if pointer != origin && self.drag_start(state, graph, id, origin) {
                    self.drag_move(graph, pointer, canvas);
                }
            }
            Gesture::Drag { .. } => {
                self.drag_move(graph, pointer, canvas);
            }
            Gesture::Transform { .. } => self.transform_move(graph, pointer),
            Gesture::Idle | Gesture::PressedCanvas { .. } => {}
        }
    }

    /// Pointer released. A press and release on empty canvas is a canvas click.
    pub fn pointer_up(&mut self, state: &mut EditorState, graph: &mut SceneGraph, pointer: Point) {
        match self.gesture {
            Gesture::Drag { .. } => {
                self.drag_end(state, graph);
            }
            Gesture::Transform { .. } => {
                self.transform_end(state, graph);
            }
            Gesture::PressedCanvas { .. } => {
                self.gesture = Gesture::Idle;
                state.canvas_click(pointer);
            }
            Gesture::PressedElement { .. } | Gesture::Idle => self.gesture = Gesture::Idle,
        }
    }

    /// Double click at a workspace point enters text editing on text elements.
    pub fn double_click(&mut self, state: &mut EditorState, graph: &SceneGraph, pointer: Point) {
        let Some(id) = graph.node_at(pointer, 0.0) else {
            return;
        };
        if graph.find(id).is_some_and(|n| n.kind == ElementKind::Text) {
            state.begin_text_edit(id);
        }
    }
}
