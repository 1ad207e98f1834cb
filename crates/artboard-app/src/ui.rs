//! Side panels and floating controls using egui.

use artboard_core::element::{ElementId, ElementKind};
use artboard_core::layers::LayerItem;
use artboard_core::properties::{
    COLOR_PRESETS, OPACITY_RANGE, OPACITY_STEP, PanelSections, PropertyEdit, PropertyValues,
    ROTATION_RANGE, SAMPLE_IMAGES, STROKE_WIDTH_RANGE, normalize_color_input,
};
use artboard_core::style::{format_color, parse_color};
use artboard_core::tools::Tool;
use egui::{Align2, Color32, Context, CornerRadius, Frame, Margin, RichText, Stroke, Vec2};

use crate::canvas::to_color32;
use crate::shortcuts::ShortcutRegistry;

/// Actions that can be triggered by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// Change the current tool.
    SetTool(Tool),
    /// Add an element at the default insertion point.
    AddElement(ElementKind),
    /// Add an image element with the given source.
    AddImage(String),
    /// Pick an image file and add it.
    PickImageFile,
    SelectElement(ElementId),
    DeleteElement(ElementId),
    DeleteSelected,
    /// Edit a property of an element.
    Edit(ElementId, PropertyEdit),
    ZoomIn,
    ZoomOut,
    ZoomReset,
    /// Scroll the canvas back to its home position.
    ResetPan,
    /// Export the canvas as PNG.
    ExportPng,
    /// Cancel the current gesture or text edit.
    Cancel,
}

/// What the panels show this frame.
pub struct PanelView<'a> {
    pub tool: Tool,
    pub layers: &'a [LayerItem],
    /// The selected element with its current values.
    pub selection: Option<(ElementId, ElementKind, PropertyValues)>,
    pub zoom_percent: i32,
    /// A frame is being captured for export; floating controls stay hidden.
    pub capturing: bool,
}

/// Text buffers for the free-text inputs of the property panel.
#[derive(Debug, Clone, Default)]
struct FormBuffers {
    x: String,
    y: String,
    width: String,
    height: String,
    fill: String,
    stroke: String,
    text: String,
    font_size: String,
    src: String,
}

/// UI state kept between frames.
#[derive(Debug, Default)]
pub struct UiState {
    form: FormBuffers,
}

/// Render all panels and return any triggered action.
pub fn render_ui(ctx: &Context, ui_state: &mut UiState, view: &PanelView<'_>) -> Option<UiAction> {
    let left_action = render_left_panel(ctx, view);
    let right_action = render_properties_panel(ctx, ui_state, view);
    let zoom_action = render_zoom_controls(ctx, view);

    left_action.or(right_action).or(zoom_action)
}

fn panel_frame() -> Frame {
    Frame::new()
        .fill(Color32::from_rgb(250, 250, 252))
        .stroke(Stroke::new(1.0, Color32::from_gray(220)))
        .inner_margin(Margin::same(16))
}

fn section_label(ui: &mut egui::Ui, text: &str) {
    ui.label(RichText::new(text).size(12.0).color(Color32::from_gray(110)));
}

/// Tool strip, quick add, sample images, export and the layers list.
fn render_left_panel(ctx: &Context, view: &PanelView<'_>) -> Option<UiAction> {
    let mut action = None;

    egui::SidePanel::left("tools_panel")
        .exact_width(320.0)
        .resizable(false)
        .frame(panel_frame())
        .show(ctx, |ui| {
            ui.heading("Tools");
            ui.add_space(8.0);
            egui::Grid::new("tool_grid")
                .num_columns(2)
                .spacing(Vec2::new(8.0, 8.0))
                .show(ui, |ui| {
                    for (i, tool) in Tool::all().iter().enumerate() {
                        let selected = view.tool == *tool;
                        let button = egui::Button::selectable(selected, tool.display_name())
                            .min_size(Vec2::new(136.0, 32.0));
                        if ui.add(button).clicked() {
                            action = Some(UiAction::SetTool(*tool));
                        }
                        if i % 2 == 1 {
                            ui.end_row();
                        }
                    }
                });

            ui.separator();
            section_label(ui, "Quick Add");
            for kind in [ElementKind::Rectangle, ElementKind::Circle, ElementKind::Text] {
                let label = format!("+ Add {}", kind.display_name());
                if ui.add_sized([288.0, 28.0], egui::Button::new(label)).clicked() {
                    action = Some(UiAction::AddElement(kind));
                }
            }

            ui.separator();
            section_label(ui, "Sample Images");
            egui::Grid::new("sample_images")
                .num_columns(2)
                .spacing(Vec2::new(8.0, 8.0))
                .show(ui, |ui| {
                    for (i, sample) in SAMPLE_IMAGES.iter().enumerate() {
                        let button = egui::Button::new(sample.name).min_size(Vec2::new(136.0, 48.0));
                        if ui.add(button).on_hover_text(sample.src).clicked() {
                            action = Some(UiAction::AddImage(sample.src.to_string()));
                        }
                        if i % 2 == 1 {
                            ui.end_row();
                        }
                    }
                });
            if ui.button("Image from file…").clicked() {
                action = Some(UiAction::PickImageFile);
            }

            ui.separator();
            let export = egui::Button::new(RichText::new("Export PNG").color(Color32::WHITE))
                .fill(Color32::from_rgb(0x8B, 0x5C, 0xF6));
            if ui.add_sized([288.0, 32.0], export).clicked() {
                action = Some(UiAction::ExportPng);
            }

            egui::CollapsingHeader::new("Keyboard Shortcuts")
                .default_open(false)
                .show(ui, render_shortcuts);

            ui.separator();
            ui.heading("Layers");
            if let Some(layer_action) = render_layers(ui, view.layers) {
                action = Some(layer_action);
            }
        });

    action
}

fn render_shortcuts(ui: &mut egui::Ui) {
    egui::Grid::new("shortcut_list").num_columns(2).show(ui, |ui| {
        for shortcut in ShortcutRegistry::all() {
            ui.label(RichText::new(shortcut.format()).monospace());
            ui.label(shortcut.description);
            ui.end_row();
        }
    });
}

fn kind_icon(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Rectangle => "⬜",
        ElementKind::Circle => "⚪",
        ElementKind::Text => "T",
        ElementKind::Image => "🖼",
    }
}

fn render_layers(ui: &mut egui::Ui, layers: &[LayerItem]) -> Option<UiAction> {
    if layers.is_empty() {
        ui.add_space(16.0);
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new("No elements yet.\nStart by adding shapes or text to your canvas.")
                    .color(Color32::from_gray(140)),
            );
        });
        return None;
    }

    let mut action = None;
    egui::ScrollArea::vertical().show(ui, |ui| {
        for layer in layers {
            if let Some(row_action) = layer_row(ui, layer) {
                action = Some(row_action);
            }
        }
    });
    action
}

/// One row of the layers list: select by clicking the name, delete with the trash button.
fn layer_row(ui: &mut egui::Ui, layer: &LayerItem) -> Option<UiAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        let label = format!("{}  {}", kind_icon(layer.kind), layer.name);
        let row = egui::Button::selectable(layer.selected, label).min_size(Vec2::new(232.0, 24.0));
        if ui.add(row).clicked() {
            action = Some(UiAction::SelectElement(layer.id));
        }
        if layer.visible {
            ui.label("👁");
        }
        if ui.small_button("🗑").on_hover_text("Delete").clicked() {
            action = Some(UiAction::DeleteElement(layer.id));
        }
    });
    action
}

/// Widget id of a property panel input.
fn property_input_id(id_salt: &str) -> egui::Id {
    egui::Id::new(("property", id_salt))
}

/// A free-text input that follows the element's value unless it has focus.
/// Returns the new text when the user changed it.
fn text_input(ui: &mut egui::Ui, id_salt: &str, buffer: &mut String, current: &str, width: f32) -> Option<String> {
    let id = property_input_id(id_salt);
    if !ui.memory(|m| m.has_focus(id)) {
        current.clone_into(buffer);
    }
    let response = ui.add(egui::TextEdit::singleline(buffer).id(id).desired_width(width));
    response.changed().then(|| buffer.clone())
}

fn color_row(
    ui: &mut egui::Ui,
    id_salt: &str,
    buffer: &mut String,
    current: &str,
) -> Option<String> {
    let mut changed = None;
    ui.horizontal(|ui| {
        let mut color = parse_color(current)
            .map(|c| to_color32(c, 1.0))
            .unwrap_or(Color32::BLACK);
        if egui::color_picker::color_edit_button_srgba(ui, &mut color, egui::color_picker::Alpha::Opaque)
            .changed()
        {
            changed = Some(format!("#{:02X}{:02X}{:02X}", color.r(), color.g(), color.b()));
        }
        if let Some(typed) = text_input(ui, id_salt, buffer, current, 120.0) {
            changed = Some(normalize_color_input(&typed));
        }
    });
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing = Vec2::new(4.0, 0.0);
        for preset in COLOR_PRESETS {
            let Some(color) = parse_color(preset) else {
                continue;
            };
            let swatch = egui::Button::new("")
                .fill(to_color32(color, 1.0))
                .corner_radius(CornerRadius::same(4))
                .min_size(Vec2::new(24.0, 24.0));
            if ui.add(swatch).on_hover_text(preset).clicked() {
                changed = Some(format_color(color));
            }
        }
    });
    changed
}

fn render_properties_panel(ctx: &Context, ui_state: &mut UiState, view: &PanelView<'_>) -> Option<UiAction> {
    let mut action = None;
    let form = &mut ui_state.form;

    egui::SidePanel::right("properties_panel")
        .exact_width(320.0)
        .resizable(false)
        .frame(panel_frame())
        .show(ctx, |ui| {
            ui.heading("Properties");
            ui.add_space(8.0);

            let Some((id, kind, values)) = &view.selection else {
                ui.label(RichText::new("Select an element to edit its properties").color(Color32::from_gray(140)));
                return;
            };
            let id = *id;
            let sections = PanelSections::for_kind(*kind);
            let mut edit = |e: PropertyEdit| action = Some(UiAction::Edit(id, e));

            section_label(ui, "Position & Size");
            egui::Grid::new("geometry").num_columns(4).show(ui, |ui| {
                ui.label("X");
                if let Some(v) = text_input(ui, "prop_x", &mut form.x, &values.x, 80.0) {
                    edit(PropertyEdit::X(v));
                }
                ui.label("Y");
                if let Some(v) = text_input(ui, "prop_y", &mut form.y, &values.y, 80.0) {
                    edit(PropertyEdit::Y(v));
                }
                ui.end_row();
                ui.label("Width");
                if let Some(v) = text_input(ui, "prop_w", &mut form.width, &values.width, 80.0) {
                    edit(PropertyEdit::Width(v));
                }
                ui.label("Height");
                if let Some(v) = text_input(ui, "prop_h", &mut form.height, &values.height, 80.0) {
                    edit(PropertyEdit::Height(v));
                }
                ui.end_row();
            });

            ui.separator();
            section_label(ui, "Fill Color");
            if let Some(fill) = color_row(ui, "prop_fill", &mut form.fill, &values.fill) {
                edit(PropertyEdit::Fill(fill));
            }

            if sections.stroke {
                ui.separator();
                section_label(ui, "Stroke Color");
                if let Some(stroke) = color_row(ui, "prop_stroke", &mut form.stroke, &values.stroke) {
                    edit(PropertyEdit::Stroke(stroke));
                }
                section_label(ui, "Stroke Width");
                let mut width = values.stroke_width;
                let slider = egui::Slider::new(&mut width, STROKE_WIDTH_RANGE.0..=STROKE_WIDTH_RANGE.1).step_by(1.0);
                if ui.add(slider).changed() {
                    edit(PropertyEdit::StrokeWidth(width));
                }
            }

            ui.separator();
            section_label(ui, &format!("Opacity ({}%)", values.opacity_percent()));
            let mut opacity = values.opacity;
            let slider = egui::Slider::new(&mut opacity, OPACITY_RANGE.0..=OPACITY_RANGE.1)
                .step_by(OPACITY_STEP)
                .show_value(false);
            if ui.add(slider).changed() {
                edit(PropertyEdit::Opacity(opacity));
            }

            if sections.text {
                ui.separator();
                section_label(ui, "Content");
                if let Some(v) = text_input(ui, "prop_text", &mut form.text, &values.text, 280.0) {
                    edit(PropertyEdit::Text(v));
                }
                section_label(ui, "Font Size");
                if let Some(v) = text_input(ui, "prop_font_size", &mut form.font_size, &values.font_size, 80.0) {
                    edit(PropertyEdit::FontSize(v));
                }
            }

            if sections.image {
                ui.separator();
                section_label(ui, "Image URL");
                if let Some(v) = text_input(ui, "prop_src", &mut form.src, &values.src, 280.0) {
                    edit(PropertyEdit::Src(v));
                }
            }

            ui.separator();
            section_label(ui, &format!("Rotation ({}°)", values.rotation.round()));
            let mut rotation = values.rotation;
            let slider = egui::Slider::new(&mut rotation, ROTATION_RANGE.0..=ROTATION_RANGE.1).show_value(false);
            if ui.add(slider).changed() {
                edit(PropertyEdit::Rotation(rotation));
            }
        });

    action
}

/// Floating zoom controls at the bottom of the canvas area.
fn render_zoom_controls(ctx: &Context, view: &PanelView<'_>) -> Option<UiAction> {
    if view.capturing {
        return None;
    }
    let mut action = None;

    egui::Area::new(egui::Id::new("zoom_controls"))
        .anchor(Align2::CENTER_BOTTOM, Vec2::new(0.0, -12.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            Frame::new()
                .fill(Color32::from_rgba_unmultiplied(250, 250, 252, 250))
                .corner_radius(CornerRadius::same(8))
                .stroke(Stroke::new(1.0, Color32::from_gray(220)))
                .inner_margin(Margin::symmetric(12, 6))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("−").on_hover_text("Zoom out (Ctrl+-)").clicked() {
                            action = Some(UiAction::ZoomOut);
                        }
                        ui.label(format!("{}%", view.zoom_percent));
                        if ui.button("+").on_hover_text("Zoom in (Ctrl++)").clicked() {
                            action = Some(UiAction::ZoomIn);
                        }
                        if ui.button("Reset").on_hover_text("Reset zoom (Ctrl+0)").clicked() {
                            action = Some(UiAction::ZoomReset);
                        }
                        if ui.button("Center").on_hover_text("Scroll back to the canvas").clicked() {
                            action = Some(UiAction::ResetPan);
                        }
                    });
                });
        });

    action
}
