//! Core application state and lifecycle.

use artboard_core::element::{ElementId, ElementKind, ElementPatch};
use artboard_core::guides::GuideConfig;
use artboard_core::images::ImageRegistry;
use artboard_core::interaction::{Gesture, Interaction};
use artboard_core::layers::layer_items;
use artboard_core::properties::PropertyValues;
use artboard_core::scene::SceneGraph;
use artboard_core::store::EditorState;
use artboard_core::style::parse_color;
use artboard_core::transform::{ANCHOR_SIZE, Transformer};
use artboard_core::viewport::{Viewport, ViewportConfig};
use artboard_render::{
    Capture, EXPORT_FILE_NAME, ExportError, ExportRegion, RenderContext, Renderer, SceneBuilder,
    export_canvas, export_region,
};
use egui::{Align2, Color32, ColorImage, Context, CornerRadius, CursorIcon, FontId, Frame, Margin, PointerButton, Sense, Stroke};
use kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::canvas::{CanvasPainter, TextureCache, handle_cursor, to_color32, to_point, to_pos2};
use crate::loader::NativeImageLoader;
use crate::shortcuts::handle_shortcuts;
use crate::ui::{PanelView, UiAction, UiState, render_ui};

/// Path of a JSON config file.
pub const CONFIG_ENV: &str = "ARTBOARD_CONFIG";
/// Window width override.
pub const WIDTH_ENV: &str = "ARTBOARD_WIDTH";
/// Window height override.
pub const HEIGHT_ENV: &str = "ARTBOARD_HEIGHT";

/// Seconds a status notification stays on screen.
const TOAST_SECONDS: f64 = 3.0;
/// Frames to wait for a requested screenshot before giving up.
const CAPTURE_FRAME_LIMIT: u32 = 30;
/// Extra hit slop around transformer anchors, in screen pixels.
const HANDLE_SLOP: f64 = 2.0;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Workspace color around the canvas, as `#RRGGBB`.
    pub background: String,
    pub viewport: ViewportConfig,
    pub guides: GuideConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Artboard".to_string(),
            width: 1280,
            height: 800,
            background: "#F3F4F6".to_string(),
            viewport: ViewportConfig::default(),
            guides: GuideConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load the config file named by `ARTBOARD_CONFIG`, then apply the
    /// window size overrides. Problems are logged and the defaults kept.
    pub fn from_env() -> Self {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => match std::fs::read_to_string(&path) {
                Ok(json) => Self::from_json(&json).unwrap_or_else(|e| {
                    log::warn!("Ignoring invalid config {path}: {e}");
                    Self::default()
                }),
                Err(e) => {
                    log::warn!("Failed to read config {path}: {e}");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Apply `ARTBOARD_WIDTH` / `ARTBOARD_HEIGHT` style overrides.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(width) = parse_dimension(WIDTH_ENV, lookup(WIDTH_ENV)) {
            self.width = width;
        }
        if let Some(height) = parse_dimension(HEIGHT_ENV, lookup(HEIGHT_ENV)) {
            self.height = height;
        }
    }

    pub fn background_color(&self) -> Color {
        parse_color(&self.background).unwrap_or(Color::from_rgba8(243, 244, 246, 255))
    }
}

fn parse_dimension(name: &str, value: Option<String>) -> Option<u32> {
    let value = value?;
    match value.trim().parse::<u32>() {
        Ok(v) if v > 0 => Some(v),
        _ => {
            log::warn!("Ignoring {name}={value:?}: expected a positive integer");
            None
        }
    }
}

/// Run the application until the window closes.
pub fn run(config: AppConfig) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.title.clone())
            .with_inner_size([config.width as f32, config.height as f32])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };
    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, config)))),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToastKind {
    Success,
    Warning,
    Error,
}

/// A short-lived status notification.
#[derive(Debug, Clone)]
struct Toast {
    message: String,
    kind: ToastKind,
    shown_at: f64,
}

/// PNG export progress. A capture renders the canvas at zoom 1 without
/// overlays until the screenshot comes back.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ExportState {
    Idle,
    Capture,
    Waiting { region: ExportRegion, frames: u32 },
}

impl ExportState {
    fn is_capturing(self) -> bool {
        !matches!(self, ExportState::Idle)
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    state: EditorState,
    graph: SceneGraph,
    transformer: Transformer,
    interaction: Interaction,
    viewport: Viewport,
    images: ImageRegistry,
    scene: SceneBuilder,
    textures: TextureCache,
    ui_state: UiState,
    /// Text element being edited and its working copy.
    text_edit: Option<(ElementId, String)>,
    toasts: Vec<Toast>,
    export: ExportState,
    /// A primary press started on the canvas and has not been released.
    pointer_captured: bool,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let viewport = Viewport::new(config.viewport);
        let state = EditorState::new().with_insertion_point(viewport.default_insertion_point());
        let loader = NativeImageLoader::new(cc.egui_ctx.clone());

        Self {
            interaction: Interaction::new(config.guides),
            config,
            state,
            graph: SceneGraph::new(),
            transformer: Transformer::new(),
            viewport,
            images: ImageRegistry::new(Box::new(loader)),
            scene: SceneBuilder::new(),
            textures: TextureCache::default(),
            ui_state: UiState::default(),
            text_edit: None,
            toasts: Vec::new(),
            export: ExportState::Idle,
            pointer_captured: false,
        }
    }

    fn toast(&mut self, ctx: &Context, kind: ToastKind, message: impl Into<String>) {
        self.toasts.push(Toast {
            message: message.into(),
            kind,
            shown_at: ctx.input(|i| i.time),
        });
    }

    fn sync_scene(&mut self) {
        self.graph.sync(self.state.elements(), self.state.revision());
        self.transformer.attach(&self.graph, self.state.selected());
    }

    fn handle_action(&mut self, ctx: &Context, action: UiAction) {
        match action {
            UiAction::SetTool(tool) => self.state.set_tool(tool),
            UiAction::AddElement(kind) => self.add_element(ctx, kind, None),
            UiAction::AddImage(src) => self.add_element(ctx, ElementKind::Image, Some(src)),
            UiAction::PickImageFile => {
                let picked = rfd::FileDialog::new()
                    .set_title("Add Image")
                    .add_filter("Images", &["png", "jpg", "jpeg", "webp"])
                    .pick_file();
                if let Some(path) = picked {
                    let src = path.to_string_lossy().into_owned();
                    self.add_element(ctx, ElementKind::Image, Some(src));
                }
            }
            UiAction::SelectElement(id) => self.state.select_element(Some(id)),
            UiAction::DeleteElement(id) => self.delete_element(ctx, Some(id)),
            UiAction::DeleteSelected => self.delete_element(ctx, self.state.selected()),
            UiAction::Edit(id, edit) => {
                self.state.update_element(id, &edit.into_patch());
            }
            UiAction::ZoomIn => self.viewport.zoom_in(),
            UiAction::ZoomOut => self.viewport.zoom_out(),
            UiAction::ZoomReset => self.viewport.zoom_reset(),
            UiAction::ResetPan => self.viewport.reset_pan(),
            UiAction::ExportPng => {
                if !self.export.is_capturing() {
                    self.interaction.cancel(&mut self.graph);
                    self.pointer_captured = false;
                    self.export = ExportState::Capture;
                    ctx.request_repaint();
                }
            }
            UiAction::Cancel => {
                self.interaction.cancel(&mut self.graph);
                self.pointer_captured = false;
                self.state.cancel_text_edit();
                self.text_edit = None;
            }
        }
    }

    fn add_element(&mut self, ctx: &Context, kind: ElementKind, src: Option<String>) {
        self.state.add_element(kind, src, None);
        self.toast(ctx, ToastKind::Success, format!("{} added to canvas", kind.display_name()));
    }

    fn delete_element(&mut self, ctx: &Context, id: Option<ElementId>) {
        let Some(id) = id else {
            return;
        };
        if self.interaction.is_active() {
            self.interaction.cancel(&mut self.graph);
            self.pointer_captured = false;
        }
        if self.state.delete_element(id).is_some() {
            self.toast(ctx, ToastKind::Success, "Element deleted");
        }
    }

    /// Viewport used for drawing this frame: the live one, or zoom 1 with no
    /// pan while capturing for export.
    fn frame_viewport(&self) -> Viewport {
        let mut view = self.viewport.clone();
        if self.export.is_capturing() {
            view.zoom_reset();
            view.reset_pan();
        }
        view
    }

    fn canvas_ui(&mut self, ui: &mut egui::Ui) {
        let ctx = ui.ctx().clone();
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());

        // Keep the canvas centered in the free area at zoom 1.
        let area = response.rect;
        let canvas_size = self.viewport.canvas_size();
        self.viewport.screen_origin = Point::new(
            f64::from(area.center().x) - canvas_size.width / 2.0,
            f64::from(area.center().y) - canvas_size.height / 2.0,
        );

        if !self.export.is_capturing() {
            self.handle_canvas_input(&ctx, &response);
        }
        self.sync_scene();

        let view = self.frame_viewport();
        let capturing = self.export.is_capturing();
        let render_ctx = RenderContext::new(&self.state, &self.graph, &self.transformer, view.canvas_rect())
            .with_guides(self.interaction.guides())
            .with_images(&self.images)
            .with_zoom(view.zoom())
            .with_background(self.config.background_color())
            .with_overlays(!capturing);
        if let Err(e) = self.scene.build_scene(&render_ctx) {
            log::error!("Failed to build scene: {e}");
            return;
        }

        let painter = painter.with_clip_rect(area);
        let background = self.scene.background_color(&render_ctx);
        painter.rect_filled(area, 0.0, to_color32(background, 1.0));
        CanvasPainter::new(&painter, view.transform(), view.zoom())
            .paint(self.scene.display_list(), &mut self.textures);

        if self.export == ExportState::Capture {
            let visible = Rect::new(
                f64::from(area.min.x),
                f64::from(area.min.y),
                f64::from(area.max.x),
                f64::from(area.max.y),
            );
            match export_region(view.canvas_screen_rect(), visible, view.zoom()) {
                Some(region) => {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
                    self.export = ExportState::Waiting { region, frames: 0 };
                }
                None => {
                    log::error!("Export failed: the canvas is not visible");
                    self.export = ExportState::Idle;
                    self.toast(&ctx, ToastKind::Error, "Export failed: canvas is not visible");
                }
            }
            ctx.request_repaint();
        }
    }

    fn handle_canvas_input(&mut self, ctx: &Context, response: &egui::Response) {
        // Scroll and middle-drag pan the view.
        if response.hovered() {
            let scroll = ctx.input(|i| i.smooth_scroll_delta);
            if scroll != egui::Vec2::ZERO {
                self.viewport.pan_by(Vec2::new(f64::from(scroll.x), f64::from(scroll.y)));
            }
        }
        if response.dragged_by(PointerButton::Middle) {
            let delta = response.drag_delta();
            self.viewport.pan_by(Vec2::new(f64::from(delta.x), f64::from(delta.y)));
        }

        let (pressed, released, moved, position) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.is_moving(),
                i.pointer.interact_pos(),
            )
        });
        let Some(position) = position else {
            return;
        };
        let workspace = self.viewport.screen_to_workspace(to_point(position));
        let zoom = self.viewport.zoom();
        let canvas = self.viewport.canvas_rect();

        let press = pressed && response.hovered();
        if press {
            // The inline editor only notices the lost focus after this press is routed.
            commit_pending_text(&mut self.state, &mut self.text_edit);
        }
        self.sync_scene();
        if press {
            let tolerance = (ANCHOR_SIZE / 2.0 + HANDLE_SLOP) / zoom;
            self.interaction.pointer_down(
                &mut self.state,
                &mut self.graph,
                &self.transformer,
                workspace,
                tolerance,
            );
            self.pointer_captured = true;
            self.transformer.attach(&self.graph, self.state.selected());
        } else if self.pointer_captured && moved {
            self.interaction
                .pointer_move(&self.state, &mut self.graph, workspace, canvas);
        }

        if released && self.pointer_captured {
            self.interaction.pointer_up(&mut self.state, &mut self.graph, workspace);
            self.pointer_captured = false;
        }

        if response.double_clicked() {
            self.interaction.double_click(&mut self.state, &self.graph, workspace);
        }

        self.update_cursor(ctx, response, workspace);
    }

    fn update_cursor(&self, ctx: &Context, response: &egui::Response, workspace: Point) {
        let cursor = match self.interaction.gesture() {
            Gesture::Drag { .. } => Some(CursorIcon::Grabbing),
            Gesture::Transform { handle, .. } => Some(handle_cursor(*handle)),
            _ if response.hovered() => {
                let tolerance = (ANCHOR_SIZE / 2.0 + HANDLE_SLOP) / self.viewport.zoom();
                match self.transformer.handle_at(&self.graph, workspace, tolerance) {
                    Some(handle) => Some(handle_cursor(handle)),
                    None => self.graph.node_at(workspace, 0.0).map(|_| CursorIcon::Move),
                }
            }
            _ => None,
        };
        if let Some(cursor) = cursor {
            ctx.set_cursor_icon(cursor);
        }
    }

    /// Inline text editor placed over the text element being edited.
    fn text_edit_ui(&mut self, ctx: &Context) {
        let editing = self.state.editing_text();
        if self.text_edit.as_ref().is_some_and(|(id, _)| Some(*id) != editing) {
            commit_pending_text(&mut self.state, &mut self.text_edit);
        }
        let Some(id) = editing else {
            return;
        };
        let Some(element) = self.state.get(id) else {
            return;
        };
        let (font_size, width) = match element.as_text() {
            Some(text) => (text.font_size(), element.width),
            None => return,
        };
        let is_new = self.text_edit.as_ref().map(|(edit_id, _)| *edit_id) != Some(id);
        if is_new {
            let current = element.as_text().map(|t| t.text().to_string()).unwrap_or_default();
            self.text_edit = Some((id, current));
        }
        let Some(node) = self.graph.find(id) else {
            return;
        };

        let zoom = self.viewport.zoom();
        let origin = to_pos2(self.viewport.workspace_to_screen(node.position()));
        let mut commit = false;
        let mut cancel = false;

        egui::Area::new(egui::Id::new("text_edit_overlay"))
            .fixed_pos(origin)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                let Some((_, buffer)) = self.text_edit.as_mut() else {
                    return;
                };
                let editor = egui::TextEdit::multiline(buffer)
                    .font(FontId::proportional((font_size * zoom) as f32))
                    .desired_width((width * zoom) as f32)
                    .desired_rows(1);
                let response = ui.add(editor);
                if is_new {
                    response.request_focus();
                }
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    cancel = true;
                } else if response.lost_focus() {
                    commit = true;
                }
            });

        if cancel {
            self.state.cancel_text_edit();
            self.text_edit = None;
        } else if commit {
            if let Some((id, text)) = self.text_edit.take() {
                self.state.commit_text_edit(id, text);
            }
        }
    }

    fn toasts_ui(&mut self, ctx: &Context) {
        let now = ctx.input(|i| i.time);
        self.toasts.retain(|t| now - t.shown_at < TOAST_SECONDS);
        if self.toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(Align2::CENTER_TOP, egui::Vec2::new(0.0, 16.0))
            .order(egui::Order::Tooltip)
            .interactable(false)
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    let accent = match toast.kind {
                        ToastKind::Success => Color32::from_rgb(16, 185, 129),
                        ToastKind::Warning => Color32::from_rgb(245, 158, 11),
                        ToastKind::Error => Color32::from_rgb(239, 68, 68),
                    };
                    Frame::new()
                        .fill(Color32::from_rgb(31, 41, 55))
                        .corner_radius(CornerRadius::same(8))
                        .stroke(Stroke::new(1.0, accent))
                        .inner_margin(Margin::symmetric(14, 8))
                        .show(ui, |ui| {
                            ui.colored_label(Color32::WHITE, &toast.message);
                        });
                    ui.add_space(6.0);
                }
            });

        if let Some(oldest) = self.toasts.first() {
            let remaining = TOAST_SECONDS - (now - oldest.shown_at);
            ctx.request_repaint_after(std::time::Duration::from_secs_f64(remaining.max(0.0)));
        }
    }

    /// Pick up a finished screenshot, or give up after too many frames.
    fn poll_export(&mut self, ctx: &Context) {
        let ExportState::Waiting { region, frames } = self.export else {
            return;
        };

        let screenshot = ctx.input(|i| {
            i.raw.events.iter().find_map(|event| match event {
                egui::Event::Screenshot { image, .. } => Some(Arc::clone(image)),
                _ => None,
            })
        });

        match screenshot {
            Some(image) => {
                self.export = ExportState::Idle;
                let ppp = f64::from(ctx.pixels_per_point());
                self.finish_export(ctx, &image, region, ppp);
            }
            None if frames >= CAPTURE_FRAME_LIMIT => {
                log::error!("Export failed: no screenshot after {frames} frames");
                self.export = ExportState::Idle;
                self.toast(ctx, ToastKind::Error, "Export failed");
            }
            None => {
                self.export = ExportState::Waiting {
                    region,
                    frames: frames + 1,
                };
                ctx.request_repaint();
            }
        }
    }

    fn finish_export(&mut self, ctx: &Context, image: &ColorImage, region: ExportRegion, ppp: f64) {
        let capture = Capture {
            width: image.size[0] as u32,
            height: image.size[1] as u32,
            rgba: image.as_raw(),
            pixels_per_point: ppp,
        };
        match export_canvas(&capture, region.screen_rect, region.canvas_size).and_then(|png| save_png(&png)) {
            Ok(true) if region.partial => {
                log::warn!("Exported only the visible part of the canvas");
                self.toast(ctx, ToastKind::Warning, "Exported the visible part only. Widen the window for the full canvas");
            }
            Ok(true) => {
                log::info!("Design exported successfully!");
                self.toast(ctx, ToastKind::Success, "Design exported successfully!");
            }
            Ok(false) => log::info!("Export cancelled"),
            Err(e) => {
                log::error!("Failed to export PNG: {e}");
                self.toast(ctx, ToastKind::Error, "Export failed");
            }
        }
    }
}

/// Write the inline editor's working copy back to its element.
///
/// Leaves text edit mode when the element is still being edited. The edit may
/// already have ended, e.g. when a layer row selected another element.
fn commit_pending_text(state: &mut EditorState, pending: &mut Option<(ElementId, String)>) {
    let Some((id, text)) = pending.take() else {
        return;
    };
    if state.editing_text() == Some(id) {
        state.commit_text_edit(id, text);
    } else {
        state.update_element(id, &ElementPatch::new().with_text(text));
    }
}

/// Ask where to save the PNG and write it. Returns false if the dialog was cancelled.
fn save_png(png_data: &[u8]) -> Result<bool, ExportError> {
    let dialog = rfd::FileDialog::new()
        .set_title("Export PNG")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("PNG Image", &["png"]);

    let Some(path) = dialog.save_file() else {
        return Ok(false);
    };
    std::fs::write(&path, png_data)?;
    log::info!("Exported PNG to: {:?}", path);
    Ok(true)
}

impl eframe::App for App {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_export(ctx);

        for action in handle_shortcuts(ctx) {
            self.handle_action(ctx, action);
        }

        let loaded = self.images.update(self.state.elements());
        if !loaded.is_empty() {
            log::debug!("{} image(s) ready", loaded.len());
        }

        #[allow(deprecated)]
        let screen_rect = ctx.input(|i| i.content_rect());
        self.viewport
            .resize(Size::new(f64::from(screen_rect.width()), f64::from(screen_rect.height())));

        self.sync_scene();
        let layers = layer_items(self.state.elements(), self.state.selected());
        let selection = self
            .state
            .selected_element()
            .map(|e| (e.id(), e.kind(), PropertyValues::from_element(e)));
        let view = PanelView {
            tool: self.state.tool(),
            layers: &layers,
            selection,
            zoom_percent: self.viewport.zoom_percent(),
            capturing: self.export.is_capturing(),
        };
        if let Some(action) = render_ui(ctx, &mut self.ui_state, &view) {
            self.handle_action(ctx, action);
        }

        let background = to_color32(self.config.background_color(), 1.0);
        egui::CentralPanel::default()
            .frame(Frame::new().fill(background))
            .show(ctx, |ui| self.canvas_ui(ui));

        if !self.export.is_capturing() {
            self.text_edit_ui(ctx);
            self.toasts_ui(ctx);
        }
    }
}
