//! Backend-neutral draw commands.
//!
//! Element primitives are given in node-local coordinates together with the
//! node's local-to-workspace transform. Overlay primitives are already in
//! workspace coordinates. The shell applies the viewport transform on top.

use artboard_core::element::ElementId;
use artboard_core::images::Bitmap;
use kurbo::{Affine, Line, Point, Rect, Size};
use peniko::Color;

/// Fill and stroke of a closed shape.
#[derive(Debug, Clone, Copy)]
pub struct Paint {
    pub fill: Option<Color>,
    /// Stroke color and width in local units.
    pub stroke: Option<(Color, f64)>,
    /// Element opacity in [0, 1], applied on top of the colors.
    pub opacity: f64,
}

impl Paint {
    /// A paint that draws nothing.
    pub fn none() -> Self {
        Self {
            fill: None,
            stroke: None,
            opacity: 1.0,
        }
    }

    /// Check if the paint would produce any pixels.
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0 && (self.fill.is_some() || self.stroke.is_some())
    }
}

/// Stroke used by overlays: constant screen width, optionally dashed.
#[derive(Debug, Clone, Copy)]
pub struct OverlayStroke {
    pub color: Color,
    /// Width in workspace units (already divided by zoom).
    pub width: f64,
    /// Dash and gap length in workspace units.
    pub dash: Option<[f64; 2]>,
}

/// One draw command.
#[derive(Debug, Clone)]
pub enum DrawItem {
    /// The canvas sheet. A visual reference only, it never clips.
    Canvas { rect: Rect, color: Color },
    /// A rectangle covering `(0, 0)..size` in local space.
    Rect {
        id: ElementId,
        transform: Affine,
        size: Size,
        paint: Paint,
    },
    /// A circle in local space.
    Circle {
        id: ElementId,
        transform: Affine,
        center: Point,
        radius: f64,
        paint: Paint,
    },
    /// A single-box text block anchored at the local origin.
    Text {
        id: ElementId,
        transform: Affine,
        size: Size,
        text: String,
        font_size: f64,
        font_family: String,
        color: Color,
        opacity: f64,
        /// The shell overlays an editor instead of drawing the text.
        editing: bool,
    },
    /// A loaded bitmap stretched over `(0, 0)..size`.
    Image {
        id: ElementId,
        transform: Affine,
        size: Size,
        bitmap: Bitmap,
        opacity: f64,
    },
    /// An image whose bitmap is not available. Draws nothing but occupies
    /// the box so hit testing and the transformer still work.
    EmptyImage {
        id: ElementId,
        transform: Affine,
        size: Size,
    },
    /// An alignment guide.
    Guide { line: Line, stroke: OverlayStroke },
    /// The transformer border, clockwise from top-left.
    Outline {
        points: [Point; 4],
        stroke: OverlayStroke,
    },
    /// A square transformer anchor centered on a handle.
    Anchor {
        rect: Rect,
        fill: Color,
        stroke: OverlayStroke,
    },
}

impl DrawItem {
    /// Element this item draws, if any.
    pub fn element_id(&self) -> Option<ElementId> {
        match self {
            DrawItem::Rect { id, .. }
            | DrawItem::Circle { id, .. }
            | DrawItem::Text { id, .. }
            | DrawItem::Image { id, .. }
            | DrawItem::EmptyImage { id, .. } => Some(*id),
            DrawItem::Canvas { .. }
            | DrawItem::Guide { .. }
            | DrawItem::Outline { .. }
            | DrawItem::Anchor { .. } => None,
        }
    }

    /// Check if the item belongs to the transformer or guide overlay.
    pub fn is_overlay(&self) -> bool {
        matches!(
            self,
            DrawItem::Guide { .. } | DrawItem::Outline { .. } | DrawItem::Anchor { .. }
        )
    }
}

/// Draw commands for one frame, back to front.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    background: Option<Color>,
    items: Vec<DrawItem>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.background = None;
        self.items.clear();
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = Some(color);
    }

    /// Clear color for the whole surface.
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn push(&mut self, item: DrawItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items without the transformer and guides, as used for export.
    pub fn content(&self) -> impl Iterator<Item = &DrawItem> {
        self.items.iter().filter(|item| !item.is_overlay())
    }
}
