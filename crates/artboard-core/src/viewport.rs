//! Viewport controller: canvas sizing, zoom and screen/workspace mapping.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom factor.
pub const MIN_ZOOM: f64 = 0.25;
/// Largest zoom factor.
pub const MAX_ZOOM: f64 = 4.0;
/// Zoom increment for zoom in/out.
pub const ZOOM_STEP: f64 = 0.1;
/// Margin around the visible canvas in workspace coordinates.
pub const STAGE_PADDING: f64 = 2000.0;
/// Offset of toolbar-added elements from the canvas top-left.
pub const INSERTION_OFFSET: f64 = 100.0;

/// Layout parameters used to size the canvas from the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width reserved for the left sidebar (tools and layers).
    pub left_sidebar: f64,
    /// Width reserved for the right sidebar (properties).
    pub right_sidebar: f64,
    /// Padding around the canvas area, applied on both sides.
    pub outer_padding: f64,
    /// Floor for the available width and height.
    pub min_available: f64,
    /// Canvas width divided by height.
    pub aspect: f64,
    /// Margin around the canvas in workspace coordinates.
    pub stage_padding: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            left_sidebar: 320.0,
            right_sidebar: 320.0,
            outer_padding: 32.0,
            min_available: 240.0,
            aspect: 4.0 / 5.0,
            stage_padding: STAGE_PADDING,
        }
    }
}

impl ViewportConfig {
    /// Fit a canvas of the configured aspect ratio into the space left by the panels.
    pub fn canvas_size_for_window(&self, window: Size) -> Size {
        let available_width = (window.width
            - self.left_sidebar
            - self.right_sidebar
            - self.outer_padding * 2.0)
            .max(self.min_available);
        let available_height = (window.height - self.outer_padding * 2.0).max(self.min_available);

        let width = available_width.min(available_height * self.aspect);
        let height = (width / self.aspect).round();
        Size::new(width, height)
    }
}

fn round_zoom(zoom: f64) -> f64 {
    ((zoom * 100.0).round() / 100.0).clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Viewport state: canvas size, zoom and pan.
///
/// Workspace coordinates put the canvas top-left at `(stage_padding, stage_padding)`.
/// Screen coordinates are the host window's logical pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    pub config: ViewportConfig,
    canvas_size: Size,
    zoom: f64,
    /// Pan offset in screen units.
    pub pan: Vec2,
    /// Where the canvas top-left is drawn on screen before pan is applied.
    pub screen_origin: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl Viewport {
    /// Create a viewport sized for a 1280x800 window.
    pub fn new(config: ViewportConfig) -> Self {
        let canvas_size = config.canvas_size_for_window(Size::new(1280.0, 800.0));
        Self {
            config,
            canvas_size,
            zoom: 1.0,
            pan: Vec2::ZERO,
            screen_origin: Point::ZERO,
        }
    }

    /// Recompute the canvas size after a window resize.
    pub fn resize(&mut self, window: Size) {
        let size = self.config.canvas_size_for_window(window);
        if size != self.canvas_size {
            log::debug!("Canvas resized to {}x{}", size.width, size.height);
            self.canvas_size = size;
        }
    }

    /// Visible canvas size.
    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    pub fn stage_padding(&self) -> f64 {
        self.config.stage_padding
    }

    /// Canvas rectangle in workspace coordinates.
    pub fn canvas_rect(&self) -> Rect {
        let padding = self.stage_padding();
        Rect::from_origin_size((padding, padding), self.canvas_size)
    }

    /// Where toolbar-added elements are placed.
    pub fn default_insertion_point(&self) -> Point {
        let padding = self.stage_padding();
        Point::new(padding + INSERTION_OFFSET, padding + INSERTION_OFFSET)
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor, clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = round_zoom(zoom);
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    /// Reset zoom to exactly 1.
    pub fn zoom_reset(&mut self) {
        self.zoom = 1.0;
    }

    /// Zoom as a whole percentage for display.
    pub fn zoom_percent(&self) -> i32 {
        (self.zoom * 100.0).round() as i32
    }

    /// Pan the view by a delta in screen coordinates.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Clear the pan offset.
    pub fn reset_pan(&mut self) {
        self.pan = Vec2::ZERO;
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts workspace coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        let padding = self.stage_padding();
        Affine::translate(self.screen_origin.to_vec2() + self.pan)
            * Affine::scale(self.zoom)
            * Affine::translate((-padding, -padding))
    }

    /// Get the inverse transform for input handling.
    pub fn inverse_transform(&self) -> Affine {
        self.transform().inverse()
    }

    /// Convert a screen point to workspace coordinates.
    pub fn screen_to_workspace(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a workspace point to screen coordinates.
    pub fn workspace_to_screen(&self, workspace_point: Point) -> Point {
        self.transform() * workspace_point
    }

    /// Canvas rectangle as drawn on screen.
    pub fn canvas_screen_rect(&self) -> Rect {
        self.transform().transform_rect_bbox(self.canvas_rect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_size_reference_window() {
        let config = ViewportConfig::default();
        let size = config.canvas_size_for_window(Size::new(1280.0, 800.0));
        assert!((size.width - 576.0).abs() < f64::EPSILON);
        assert!((size.height - 720.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_canvas_size_limited_by_height() {
        let config = ViewportConfig::default();
        // available 1336 x 536 -> width = 536 * 0.8
        let size = config.canvas_size_for_window(Size::new(2000.0, 600.0));
        assert!((size.width - 428.8).abs() < 1e-9);
        assert!((size.height - 536.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_canvas_size_floor() {
        let config = ViewportConfig::default();
        let size = config.canvas_size_for_window(Size::new(100.0, 100.0));
        // both axes floored at 240 -> width = min(240, 192)
        assert!((size.width - 192.0).abs() < 1e-9);
        assert!((size.height - 240.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_updates_canvas() {
        let mut viewport = Viewport::default();
        viewport.resize(Size::new(2000.0, 1200.0));
        let size = viewport.canvas_size();
        assert!((size.width - 908.8).abs() < 1e-9);
        assert!((size.height - 1136.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_steps_are_rounded() {
        let mut viewport = Viewport::default();
        for _ in 0..3 {
            viewport.zoom_in();
        }
        assert!((viewport.zoom() - 1.3).abs() < f64::EPSILON);
        viewport.zoom_out();
        assert!((viewport.zoom() - 1.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_stays_in_range() {
        let mut viewport = Viewport::default();
        for _ in 0..100 {
            viewport.zoom_in();
        }
        assert!((viewport.zoom() - MAX_ZOOM).abs() < f64::EPSILON);
        for _ in 0..100 {
            viewport.zoom_out();
        }
        assert!((viewport.zoom() - MIN_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_reset_is_exact() {
        let mut viewport = Viewport::default();
        viewport.zoom_in();
        viewport.zoom_in();
        viewport.zoom_reset();
        assert_eq!(viewport.zoom(), 1.0);
        assert_eq!(viewport.zoom_percent(), 100);
    }

    #[test]
    fn test_set_zoom_clamps() {
        let mut viewport = Viewport::default();
        viewport.set_zoom(10.0);
        assert!((viewport.zoom() - MAX_ZOOM).abs() < f64::EPSILON);
        viewport.set_zoom(0.01);
        assert!((viewport.zoom() - MIN_ZOOM).abs() < f64::EPSILON);
        viewport.set_zoom(f64::NAN);
        assert!((viewport.zoom() - MIN_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_canvas_origin_maps_to_screen_origin() {
        let mut viewport = Viewport::default();
        viewport.screen_origin = Point::new(352.0, 32.0);
        let screen = viewport.workspace_to_screen(Point::new(STAGE_PADDING, STAGE_PADDING));
        assert!((screen.x - 352.0).abs() < 1e-9);
        assert!((screen.y - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_screen_to_workspace_with_zoom_and_pan() {
        let mut viewport = Viewport::default();
        viewport.screen_origin = Point::new(100.0, 50.0);
        viewport.set_zoom(2.0);
        viewport.pan_by(Vec2::new(10.0, -20.0));

        let workspace = viewport.screen_to_workspace(Point::new(310.0, 230.0));
        // (310 - 110) / 2 + 2000, (230 - 30) / 2 + 2000
        assert!((workspace.x - 2100.0).abs() < 1e-9);
        assert!((workspace.y - 2100.0).abs() < 1e-9);

        let back = viewport.workspace_to_screen(workspace);
        assert!((back.x - 310.0).abs() < 1e-9);
        assert!((back.y - 230.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_insertion_point() {
        let viewport = Viewport::default();
        let point = viewport.default_insertion_point();
        assert!((point.x - 2100.0).abs() < f64::EPSILON);
        assert!((point.y - 2100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_canvas_rect() {
        let viewport = Viewport::default();
        let rect = viewport.canvas_rect();
        assert!((rect.x0 - STAGE_PADDING).abs() < f64::EPSILON);
        assert!((rect.width() - 576.0).abs() < f64::EPSILON);
        assert!((rect.height() - 720.0).abs() < f64::EPSILON);
    }
}
