//! Painting the display list with egui.

use artboard_core::element::ElementId;
use artboard_core::images::Bitmap;
use artboard_core::transform::{Corner, Edge, HandleKind};
use artboard_render::{DisplayList, DrawItem, OverlayStroke, Paint};
use egui::epaint::{Mesh, TextShape, Vertex};
use egui::{Color32, ColorImage, Context, CursorIcon, FontFamily, FontId, Painter, Pos2, Shape, Stroke, StrokeKind, TextureHandle, TextureId, TextureOptions};
use kurbo::{Affine, Point, Rect, Size};
use peniko::Color;
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::sync::Arc;

/// Segments used to draw a circle.
const CIRCLE_SEGMENTS: usize = 64;

/// Convert a color, scaling its alpha by `opacity`.
pub(crate) fn to_color32(color: Color, opacity: f64) -> Color32 {
    let c = color.to_rgba8();
    let alpha = (f64::from(c.a) * opacity.clamp(0.0, 1.0)).round() as u8;
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, alpha)
}

pub(crate) fn to_pos2(point: Point) -> Pos2 {
    Pos2::new(point.x as f32, point.y as f32)
}

pub(crate) fn to_point(pos: Pos2) -> Point {
    Point::new(f64::from(pos.x), f64::from(pos.y))
}

pub(crate) fn to_egui_rect(rect: Rect) -> egui::Rect {
    egui::Rect::from_min_max(to_pos2(Point::new(rect.x0, rect.y0)), to_pos2(Point::new(rect.x1, rect.y1)))
}

/// Uniform scale factor of an affine map.
fn scale_of(transform: Affine) -> f64 {
    transform.determinant().abs().sqrt()
}

/// Rotation angle of an affine map, in radians.
fn angle_of(transform: Affine) -> f64 {
    let [a, b, ..] = transform.as_coeffs();
    b.atan2(a)
}

/// Cursor to show over a transformer handle.
pub(crate) fn handle_cursor(handle: HandleKind) -> CursorIcon {
    match handle {
        HandleKind::Corner(Corner::TopLeft | Corner::BottomRight) => CursorIcon::ResizeNwSe,
        HandleKind::Corner(Corner::TopRight | Corner::BottomLeft) => CursorIcon::ResizeNeSw,
        HandleKind::Edge(Edge::Top | Edge::Bottom) => CursorIcon::ResizeVertical,
        HandleKind::Edge(Edge::Left | Edge::Right) => CursorIcon::ResizeHorizontal,
        HandleKind::Rotate => CursorIcon::Grab,
    }
}

/// GPU textures for image elements, keyed by element id.
#[derive(Default)]
pub(crate) struct TextureCache {
    textures: HashMap<ElementId, (Arc<Vec<u8>>, TextureHandle)>,
}

impl TextureCache {
    /// Get the texture for a bitmap, uploading it if the pixels changed.
    fn get_or_load(&mut self, ctx: &Context, id: ElementId, bitmap: &Bitmap) -> TextureId {
        if let Some((pixels, handle)) = self.textures.get(&id) {
            if Arc::ptr_eq(pixels, &bitmap.rgba) {
                return handle.id();
            }
        }

        let size = [bitmap.width as usize, bitmap.height as usize];
        let image = ColorImage::from_rgba_unmultiplied(size, &bitmap.rgba);
        let handle = ctx.load_texture(format!("element_{id}"), image, TextureOptions::LINEAR);
        let texture_id = handle.id();
        self.textures.insert(id, (bitmap.rgba.clone(), handle));
        texture_id
    }

    /// Drop textures of elements no longer drawn as images.
    fn retain_drawn(&mut self, list: &DisplayList) {
        self.textures.retain(|id, _| {
            list.content()
                .any(|item| matches!(item, DrawItem::Image { id: drawn, .. } if drawn == id))
        });
    }
}

/// Paints a display list through a viewport transform.
pub(crate) struct CanvasPainter<'a> {
    painter: &'a Painter,
    /// Workspace to screen.
    view: Affine,
    zoom: f64,
}

impl<'a> CanvasPainter<'a> {
    pub(crate) fn new(painter: &'a Painter, view: Affine, zoom: f64) -> Self {
        Self { painter, view, zoom }
    }

    pub(crate) fn paint(&self, list: &DisplayList, textures: &mut TextureCache) {
        for item in list.items() {
            self.paint_item(item, textures);
        }
        textures.retain_drawn(list);
    }

    fn paint_item(&self, item: &DrawItem, textures: &mut TextureCache) {
        match item {
            DrawItem::Canvas { rect, color } => {
                let rect = to_egui_rect(self.view.transform_rect_bbox(*rect));
                self.painter.rect_filled(rect, 0.0, to_color32(*color, 1.0));
                self.painter
                    .rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::from_gray(225)), StrokeKind::Outside);
            }
            DrawItem::Rect {
                transform,
                size,
                paint,
                ..
            } => {
                let corners = [
                    Point::ZERO,
                    Point::new(size.width, 0.0),
                    Point::new(size.width, size.height),
                    Point::new(0.0, size.height),
                ];
                self.paint_polygon(*transform, &corners, paint);
            }
            DrawItem::Circle {
                transform,
                center,
                radius,
                paint,
                ..
            } => {
                let points: Vec<Point> = (0..CIRCLE_SEGMENTS)
                    .map(|i| {
                        let t = TAU * i as f64 / CIRCLE_SEGMENTS as f64;
                        Point::new(center.x + radius * t.cos(), center.y + radius * t.sin())
                    })
                    .collect();
                self.paint_polygon(*transform, &points, paint);
            }
            DrawItem::Text {
                transform,
                size,
                text,
                font_size,
                font_family,
                color,
                opacity,
                editing,
                ..
            } => {
                if !*editing {
                    self.paint_text(*transform, *size, text, *font_size, font_family, to_color32(*color, *opacity));
                }
            }
            DrawItem::Image {
                id,
                transform,
                size,
                bitmap,
                opacity,
            } => {
                let texture = textures.get_or_load(self.painter.ctx(), *id, bitmap);
                self.paint_image(*transform, *size, texture, *opacity);
            }
            // Nothing to draw until the bitmap arrives.
            DrawItem::EmptyImage { .. } => {}
            DrawItem::Guide { line, stroke } => {
                self.paint_dashed(&[line.p0, line.p1], stroke);
            }
            DrawItem::Outline { points, stroke } => {
                self.paint_dashed(&[points[0], points[1], points[2], points[3], points[0]], stroke);
            }
            DrawItem::Anchor { rect, fill, stroke } => {
                let rect = to_egui_rect(self.view.transform_rect_bbox(*rect));
                let stroke = Stroke::new((stroke.width * self.zoom) as f32, to_color32(stroke.color, 1.0));
                self.painter
                    .rect(rect, 0.0, to_color32(*fill, 1.0), stroke, StrokeKind::Middle);
            }
        }
    }

    fn paint_polygon(&self, transform: Affine, points: &[Point], paint: &Paint) {
        if !paint.is_visible() {
            return;
        }
        let to_screen = self.view * transform;
        let screen: Vec<Pos2> = points.iter().map(|p| to_pos2(to_screen * *p)).collect();
        let fill = paint
            .fill
            .map(|c| to_color32(c, paint.opacity))
            .unwrap_or(Color32::TRANSPARENT);
        let stroke = paint
            .stroke
            .map(|(color, width)| {
                Stroke::new((width * scale_of(to_screen)) as f32, to_color32(color, paint.opacity))
            })
            .unwrap_or(Stroke::NONE);
        self.painter.add(Shape::convex_polygon(screen, fill, stroke));
    }

    fn paint_text(&self, transform: Affine, size: Size, text: &str, font_size: f64, family: &str, color: Color32) {
        let to_screen = self.view * transform;
        let scale = scale_of(to_screen);
        let family = if family.to_ascii_lowercase().contains("mono") || family.eq_ignore_ascii_case("courier") {
            FontFamily::Monospace
        } else {
            FontFamily::Proportional
        };
        let font = FontId::new((font_size * scale) as f32, family);
        let galley = self
            .painter
            .layout(text.to_string(), font, color, (size.width * scale) as f32);
        let origin = to_pos2(to_screen * Point::ZERO);
        let shape = TextShape::new(origin, galley, color).with_angle(angle_of(to_screen) as f32);
        self.painter.add(shape);
    }

    fn paint_image(&self, transform: Affine, size: Size, texture: TextureId, opacity: f64) {
        let to_screen = self.view * transform;
        let tint = Color32::WHITE.gamma_multiply(opacity.clamp(0.0, 1.0) as f32);
        let corners = [
            (Point::ZERO, Pos2::new(0.0, 0.0)),
            (Point::new(size.width, 0.0), Pos2::new(1.0, 0.0)),
            (Point::new(size.width, size.height), Pos2::new(1.0, 1.0)),
            (Point::new(0.0, size.height), Pos2::new(0.0, 1.0)),
        ];

        let mut mesh = Mesh::with_texture(texture);
        for (local, uv) in corners {
            mesh.vertices.push(Vertex {
                pos: to_pos2(to_screen * local),
                uv,
                color: tint,
            });
        }
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(0, 2, 3);
        self.painter.add(Shape::mesh(mesh));
    }

    fn paint_dashed(&self, points: &[Point], stroke: &OverlayStroke) {
        let screen: Vec<Pos2> = points.iter().map(|p| to_pos2(self.view * *p)).collect();
        let egui_stroke = Stroke::new((stroke.width * self.zoom) as f32, to_color32(stroke.color, 1.0));
        match stroke.dash {
            Some([dash, gap]) => {
                let dash = (dash * self.zoom) as f32;
                let gap = (gap * self.zoom) as f32;
                self.painter
                    .extend(Shape::dashed_line(&screen, egui_stroke, dash, gap));
            }
            None => {
                self.painter.add(Shape::line(screen, egui_stroke));
            }
        }
    }
}
