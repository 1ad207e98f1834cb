//! Builds a [`DisplayList`] from the editor state and the live scene graph.

use crate::display::{DisplayList, DrawItem, OverlayStroke, Paint};
use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError};
use artboard_core::element::{CanvasElement, ElementContent, ElementId, ImageContent, TextContent};
use artboard_core::images::Bitmap;
use artboard_core::scene::SceneNode;
use artboard_core::style::ElementStyle;
use artboard_core::transform::{ANCHOR_SIZE, BORDER_DASH};
use kurbo::{Affine, Point, Rect, Size};
use peniko::Color;

/// Guide dash and gap in screen pixels.
const GUIDE_DASH: [f64; 2] = [4.0, 4.0];
/// Overlay line width in screen pixels.
const OVERLAY_STROKE_WIDTH: f64 = 1.0;

/// Everything an element primitive needs besides its own content.
pub struct ElementFrame<'a> {
    pub id: ElementId,
    /// Local-to-workspace transform of the live node.
    pub transform: Affine,
    /// Unscaled node size; the transform carries any pending scale.
    pub size: Size,
    pub style: &'a ElementStyle,
    pub editing: bool,
    pub bitmap: Option<&'a Bitmap>,
}

impl ElementFrame<'_> {
    fn opacity(&self) -> f64 {
        self.style.opacity().clamp(0.0, 1.0)
    }

    fn paint(&self) -> Paint {
        let width = self.style.stroke_width();
        Paint {
            fill: self.style.fill_color(),
            stroke: self
                .style
                .stroke_color()
                .filter(|_| width > 0.0)
                .map(|color| (color, width)),
            opacity: self.opacity(),
        }
    }
}

/// Rendering for one element variant.
pub trait RenderElement {
    fn render(&self, frame: &ElementFrame<'_>) -> DrawItem;
}

/// Rectangle variant.
pub struct RectangleShape;

/// Circle variant.
pub struct CircleShape;

impl RenderElement for RectangleShape {
    fn render(&self, frame: &ElementFrame<'_>) -> DrawItem {
        DrawItem::Rect {
            id: frame.id,
            transform: frame.transform,
            size: frame.size,
            paint: frame.paint(),
        }
    }
}

impl RenderElement for CircleShape {
    fn render(&self, frame: &ElementFrame<'_>) -> DrawItem {
        // Centered in the box; a non-square box still gives a circle.
        DrawItem::Circle {
            id: frame.id,
            transform: frame.transform,
            center: Point::new(frame.size.width / 2.0, frame.size.height / 2.0),
            radius: frame.size.width.min(frame.size.height) / 2.0,
            paint: frame.paint(),
        }
    }
}

impl RenderElement for TextContent {
    fn render(&self, frame: &ElementFrame<'_>) -> DrawItem {
        DrawItem::Text {
            id: frame.id,
            transform: frame.transform,
            size: frame.size,
            text: self.text().to_string(),
            font_size: self.font_size(),
            font_family: self.font_family().to_string(),
            color: frame.style.fill_color().unwrap_or(Color::BLACK),
            opacity: frame.opacity(),
            editing: frame.editing,
        }
    }
}

impl RenderElement for ImageContent {
    fn render(&self, frame: &ElementFrame<'_>) -> DrawItem {
        match frame.bitmap {
            Some(bitmap) => DrawItem::Image {
                id: frame.id,
                transform: frame.transform,
                size: frame.size,
                bitmap: bitmap.clone(),
                opacity: frame.opacity(),
            },
            None => DrawItem::EmptyImage {
                id: frame.id,
                transform: frame.transform,
                size: frame.size,
            },
        }
    }
}

fn renderer_for(content: &ElementContent) -> &dyn RenderElement {
    match content {
        ElementContent::Rectangle => &RectangleShape,
        ElementContent::Circle => &CircleShape,
        ElementContent::Text(text) => text,
        ElementContent::Image(image) => image,
    }
}

/// Renderer producing a backend-neutral display list.
#[derive(Debug, Default)]
pub struct SceneBuilder {
    list: DisplayList,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently built display list.
    pub fn display_list(&self) -> &DisplayList {
        &self.list
    }

    fn render_element(&mut self, element: &CanvasElement, node: &SceneNode, ctx: &RenderContext) {
        let id = element.id();
        let frame = ElementFrame {
            id,
            transform: node.transform(),
            size: Size::new(node.width, node.height),
            style: &element.style,
            editing: ctx.state.editing_text() == Some(id),
            bitmap: ctx.images.and_then(|images| images.bitmap(id)),
        };
        self.list.push(renderer_for(&element.content).render(&frame));
    }

    fn render_guides(&mut self, ctx: &RenderContext) {
        // Pink, slightly translucent.
        let stroke = OverlayStroke {
            color: Color::from_rgba8(236, 72, 153, 200),
            width: OVERLAY_STROKE_WIDTH / ctx.zoom,
            dash: Some(GUIDE_DASH.map(|d| d / ctx.zoom)),
        };
        for guide in ctx.guides {
            self.list.push(DrawItem::Guide {
                line: guide.line,
                stroke,
            });
        }
    }

    fn render_transformer(&mut self, ctx: &RenderContext) {
        let Some(points) = ctx.transformer.outline(ctx.graph) else {
            return;
        };
        self.list.push(DrawItem::Outline {
            points,
            stroke: OverlayStroke {
                color: ctx.selection_color,
                width: OVERLAY_STROKE_WIDTH / ctx.zoom,
                dash: Some(BORDER_DASH.map(|d| d / ctx.zoom)),
            },
        });

        let half = ANCHOR_SIZE / ctx.zoom / 2.0;
        let stroke = OverlayStroke {
            color: ctx.selection_color,
            width: OVERLAY_STROKE_WIDTH / ctx.zoom,
            dash: None,
        };
        for handle in ctx.transformer.handles(ctx.graph) {
            let p = handle.position;
            self.list.push(DrawItem::Anchor {
                rect: Rect::new(p.x - half, p.y - half, p.x + half, p.y + half),
                fill: ctx.selection_color,
                stroke,
            });
        }
    }
}

impl Renderer for SceneBuilder {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        if !(ctx.zoom.is_finite() && ctx.zoom > 0.0) {
            return Err(RendererError::InvalidZoom(ctx.zoom));
        }

        self.list.clear();
        self.list.set_background(self.background_color(ctx));
        self.list.push(DrawItem::Canvas {
            rect: ctx.canvas_rect,
            color: ctx.canvas_color,
        });

        for element in ctx.state.elements() {
            let node = ctx
                .graph
                .find(element.id())
                .ok_or(RendererError::MissingNode(element.id()))?;
            self.render_element(element, node, ctx);
        }

        if ctx.show_overlays {
            self.render_transformer(ctx);
            self.render_guides(ctx);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artboard_core::element::{ElementKind, ElementPatch};
    use artboard_core::guides::{Guide, GuideKind};
    use artboard_core::scene::SceneGraph;
    use artboard_core::store::EditorState;
    use artboard_core::transform::Transformer;
    use kurbo::Line;
    use pretty_assertions::assert_eq;

    struct Fixture {
        state: EditorState,
        graph: SceneGraph,
        transformer: Transformer,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                state: EditorState::new(),
                graph: SceneGraph::new(),
                transformer: Transformer::new(),
            }
        }

        fn sync(&mut self) {
            self.graph.sync(self.state.elements(), self.state.revision());
            self.transformer.attach(&self.graph, self.state.selected());
        }

        fn context(&self) -> RenderContext<'_> {
            RenderContext::new(
                &self.state,
                &self.graph,
                &self.transformer,
                Rect::new(2000.0, 2000.0, 2576.0, 2720.0),
            )
        }
    }

    fn element_items(list: &DisplayList) -> Vec<&DrawItem> {
        list.items().iter().filter(|i| i.element_id().is_some()).collect()
    }

    #[test]
    fn test_renderer_creation() {
        let builder = SceneBuilder::new();
        assert!(builder.display_list().is_empty());
    }

    #[test]
    fn test_build_empty_scene() {
        let fixture = Fixture::new();
        let mut builder = SceneBuilder::new();
        builder.build_scene(&fixture.context()).unwrap();

        let list = builder.display_list();
        assert_eq!(list.len(), 1);
        assert!(matches!(
            list.items()[0],
            DrawItem::Canvas { rect, .. } if rect == Rect::new(2000.0, 2000.0, 2576.0, 2720.0)
        ));
        assert!(list.background().is_some());
    }

    #[test]
    fn test_build_scene_with_shapes() {
        let mut fixture = Fixture::new();
        let rect = fixture
            .state
            .add_element(ElementKind::Rectangle, None, Some(Point::new(100.0, 100.0)));
        let circle = fixture.state.add_element(ElementKind::Circle, None, None);
        fixture.state.select_element(None);
        fixture.sync();

        let mut builder = SceneBuilder::new();
        builder.build_scene(&fixture.context()).unwrap();
        let items = element_items(builder.display_list());

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].element_id(), Some(rect));
        assert_eq!(items[1].element_id(), Some(circle));
        match items[0] {
            DrawItem::Rect { size, paint, transform, .. } => {
                assert_eq!(*size, Size::new(100.0, 80.0));
                assert_eq!(paint.stroke.map(|(_, w)| w), Some(2.0));
                assert_eq!(*transform * Point::ZERO, Point::new(100.0, 100.0));
            }
            other => panic!("expected a rectangle, got {other:?}"),
        }
    }

    #[test]
    fn test_circle_is_centered_in_non_square_box() {
        let mut fixture = Fixture::new();
        let id = fixture.state.add_element(ElementKind::Circle, None, Some(Point::ZERO));
        fixture
            .state
            .update_element(id, &ElementPatch::new().with_size(120.0, 60.0));
        fixture.sync();

        let mut builder = SceneBuilder::new();
        builder.build_scene(&fixture.context()).unwrap();
        let items = element_items(builder.display_list());
        match items[0] {
            DrawItem::Circle { center, radius, .. } => {
                assert_eq!(*center, Point::new(60.0, 30.0));
                assert!((radius - 30.0).abs() < f64::EPSILON);
            }
            other => panic!("expected a circle, got {other:?}"),
        }
    }

    #[test]
    fn test_text_carries_editing_flag() {
        let mut fixture = Fixture::new();
        let id = fixture.state.add_element(ElementKind::Text, None, None);
        fixture.state.begin_text_edit(id);
        fixture.sync();

        let mut builder = SceneBuilder::new();
        builder.build_scene(&fixture.context()).unwrap();
        match element_items(builder.display_list())[0] {
            DrawItem::Text {
                editing,
                text,
                font_size,
                ..
            } => {
                assert!(*editing);
                assert_eq!(text, "Sample Text");
                assert!((font_size - 24.0).abs() < f64::EPSILON);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_unloaded_image_is_an_empty_box() {
        let mut fixture = Fixture::new();
        fixture
            .state
            .add_element(ElementKind::Image, Some("https://example.com/a.png".into()), None);
        fixture.sync();

        let mut builder = SceneBuilder::new();
        builder.build_scene(&fixture.context()).unwrap();
        assert!(matches!(
            element_items(builder.display_list())[0],
            DrawItem::EmptyImage { size, .. } if *size == Size::new(150.0, 150.0)
        ));
    }

    #[test]
    fn test_transformer_overlay_scales_with_zoom() {
        let mut fixture = Fixture::new();
        fixture
            .state
            .add_element(ElementKind::Rectangle, None, Some(Point::new(0.0, 0.0)));
        fixture.sync();

        let mut builder = SceneBuilder::new();
        builder.build_scene(&fixture.context().with_zoom(2.0)).unwrap();
        let list = builder.display_list();

        let anchors: Vec<_> = list
            .items()
            .iter()
            .filter_map(|item| match item {
                DrawItem::Anchor { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();
        // Four corners, four edges, one rotation handle.
        assert_eq!(anchors.len(), 9);
        assert!((anchors[0].width() - ANCHOR_SIZE / 2.0).abs() < f64::EPSILON);

        let outline = list
            .items()
            .iter()
            .find_map(|item| match item {
                DrawItem::Outline { stroke, .. } => Some(*stroke),
                _ => None,
            })
            .unwrap();
        assert_eq!(outline.dash, Some([1.5, 1.5]));
    }

    #[test]
    fn test_overlays_hidden_for_export() {
        let mut fixture = Fixture::new();
        fixture.state.add_element(ElementKind::Rectangle, None, None);
        fixture.sync();
        let guides = [Guide {
            kind: GuideKind::Top,
            line: Line::new((0.0, 100.0), (300.0, 100.0)),
        }];

        let mut builder = SceneBuilder::new();
        builder
            .build_scene(&fixture.context().with_guides(&guides))
            .unwrap();
        assert!(builder.display_list().items().iter().any(DrawItem::is_overlay));

        builder
            .build_scene(&fixture.context().with_guides(&guides).with_overlays(false))
            .unwrap();
        assert!(!builder.display_list().items().iter().any(DrawItem::is_overlay));
    }

    #[test]
    fn test_missing_node_is_an_error() {
        let mut fixture = Fixture::new();
        fixture.state.add_element(ElementKind::Rectangle, None, None);
        // Graph not synced.
        let mut builder = SceneBuilder::new();
        assert!(matches!(
            builder.build_scene(&fixture.context()),
            Err(RendererError::MissingNode(_))
        ));
    }

    #[test]
    fn test_invalid_zoom_is_rejected() {
        let fixture = Fixture::new();
        let mut builder = SceneBuilder::new();
        assert!(matches!(
            builder.build_scene(&fixture.context().with_zoom(0.0)),
            Err(RendererError::InvalidZoom(_))
        ));
    }
}
