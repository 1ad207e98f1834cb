//! Renderer trait abstraction.

use artboard_core::element::ElementId;
use artboard_core::guides::Guide;
use artboard_core::images::ImageRegistry;
use artboard_core::scene::SceneGraph;
use artboard_core::store::EditorState;
use artboard_core::transform::Transformer;
use kurbo::Rect;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("No scene node for element {0}; the graph is out of sync")]
    MissingNode(ElementId),
    #[error("Invalid zoom factor: {0}")]
    InvalidZoom(f64),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The editor state to render.
    pub state: &'a EditorState,
    /// Live geometry, possibly mid-gesture.
    pub graph: &'a SceneGraph,
    pub transformer: &'a Transformer,
    /// Alignment guides for the current drag tick.
    pub guides: &'a [Guide],
    /// Loaded bitmaps for image elements.
    pub images: Option<&'a ImageRegistry>,
    /// Visible canvas in workspace coordinates.
    pub canvas_rect: Rect,
    /// Current zoom, used to keep overlays a constant screen size.
    pub zoom: f64,
    /// Workspace background color.
    pub background_color: Color,
    /// Canvas rectangle color.
    pub canvas_color: Color,
    /// Transformer and guide color.
    pub selection_color: Color,
    /// Draw the transformer and guides.
    pub show_overlays: bool,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(
        state: &'a EditorState,
        graph: &'a SceneGraph,
        transformer: &'a Transformer,
        canvas_rect: Rect,
    ) -> Self {
        Self {
            state,
            graph,
            transformer,
            guides: &[],
            images: None,
            canvas_rect,
            zoom: 1.0,
            background_color: Color::from_rgba8(243, 244, 246, 255),
            canvas_color: Color::WHITE,
            selection_color: Color::from_rgba8(0x8B, 0x5C, 0xF6, 255),
            show_overlays: true,
        }
    }

    /// Set the guides to draw.
    pub fn with_guides(mut self, guides: &'a [Guide]) -> Self {
        self.guides = guides;
        self
    }

    /// Set the image registry used for image elements.
    pub fn with_images(mut self, images: &'a ImageRegistry) -> Self {
        self.images = Some(images);
        self
    }

    /// Set the zoom level.
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Show or hide the transformer and guides.
    pub fn with_overlays(mut self, show: bool) -> Self {
        self.show_overlays = show;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Build the draw commands for a frame.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
