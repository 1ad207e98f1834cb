//! Property panel input handling.
//!
//! Panel inputs are free text. Numeric fields take the leading integer and
//! fall back to a per-field default when there is none (or it is zero).

use crate::element::{CanvasElement, ElementKind, ElementPatch};
use crate::style::format_color;

/// Preset swatches offered next to the color inputs.
pub const COLOR_PRESETS: [&str; 8] = [
    "#8B5CF6", "#F59E0B", "#EF4444", "#10B981", "#3B82F6", "#F97316", "#84CC16", "#EC4899",
];

/// Color shown in a color input when the element has none.
pub const FALLBACK_COLOR: &str = "#000000";

pub const OPACITY_RANGE: (f64, f64) = (0.0, 1.0);
pub const OPACITY_STEP: f64 = 0.1;
pub const STROKE_WIDTH_RANGE: (f64, f64) = (0.0, 20.0);
pub const ROTATION_RANGE: (f64, f64) = (0.0, 360.0);

/// A sample image offered in the tool strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleImage {
    pub name: &'static str,
    pub src: &'static str,
}

pub const SAMPLE_IMAGES: [SampleImage; 4] = [
    SampleImage {
        name: "Abstract",
        src: "https://picsum.photos/seed/abstract/600/600",
    },
    SampleImage {
        name: "Landscape",
        src: "https://picsum.photos/seed/landscape/600/600",
    },
    SampleImage {
        name: "Workspace",
        src: "https://picsum.photos/seed/workspace/600/600",
    },
    SampleImage {
        name: "Tropical",
        src: "https://picsum.photos/seed/tropical/600/600",
    },
];

/// Parse the leading integer of `input`: optional whitespace, optional sign,
/// then digits. Anything after the digits is ignored.
pub fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    // Saturate instead of failing on very long inputs.
    let magnitude = rest[..digits_end]
        .bytes()
        .fold(0i64, |n, d| n.saturating_mul(10).saturating_add(i64::from(d - b'0')));
    Some(magnitude * sign)
}

/// Parse a numeric field, using `fallback` when there is no integer or it is zero.
pub fn parse_int_or(input: &str, fallback: f64) -> f64 {
    match parse_leading_int(input) {
        Some(n) if n != 0 => n as f64,
        _ => fallback,
    }
}

/// Normalise a rotation into [0, 360) for display.
pub fn normalize_rotation(rotation: f64) -> f64 {
    let normalized = rotation.rem_euclid(360.0);
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// An edit made in the property panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEdit {
    X(String),
    Y(String),
    Width(String),
    Height(String),
    Fill(String),
    Stroke(String),
    StrokeWidth(f64),
    Opacity(f64),
    Text(String),
    FontSize(String),
    Src(String),
    Rotation(f64),
}

impl PropertyEdit {
    /// Turn the edit into a patch with the panel's fallbacks and slider ranges.
    pub fn into_patch(self) -> ElementPatch {
        let patch = ElementPatch::new();
        match self {
            PropertyEdit::X(input) => patch.with_x(parse_int_or(&input, 0.0)),
            PropertyEdit::Y(input) => patch.with_y(parse_int_or(&input, 0.0)),
            PropertyEdit::Width(input) => ElementPatch {
                width: Some(parse_int_or(&input, 1.0)),
                ..patch
            },
            PropertyEdit::Height(input) => ElementPatch {
                height: Some(parse_int_or(&input, 1.0)),
                ..patch
            },
            PropertyEdit::Fill(color) => patch.with_fill(color),
            PropertyEdit::Stroke(color) => patch.with_stroke(color),
            PropertyEdit::StrokeWidth(width) => patch
                .with_stroke_width(width.round().clamp(STROKE_WIDTH_RANGE.0, STROKE_WIDTH_RANGE.1)),
            PropertyEdit::Opacity(opacity) => {
                let stepped = (opacity / OPACITY_STEP).round() * OPACITY_STEP;
                patch.with_opacity(stepped.clamp(OPACITY_RANGE.0, OPACITY_RANGE.1))
            }
            PropertyEdit::Text(text) => patch.with_text(text),
            PropertyEdit::FontSize(input) => patch.with_font_size(parse_int_or(&input, 16.0)),
            PropertyEdit::Src(src) => patch.with_src(src),
            PropertyEdit::Rotation(rotation) => {
                patch.with_rotation(rotation.clamp(ROTATION_RANGE.0, ROTATION_RANGE.1))
            }
        }
    }
}

/// Which panel sections apply to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSections {
    pub stroke: bool,
    pub text: bool,
    pub image: bool,
}

impl PanelSections {
    pub fn for_kind(kind: ElementKind) -> Self {
        Self {
            stroke: kind != ElementKind::Text,
            text: kind == ElementKind::Text,
            image: kind == ElementKind::Image,
        }
    }
}

/// Current values formatted for the panel's inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValues {
    pub x: String,
    pub y: String,
    pub width: String,
    pub height: String,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
    pub rotation: f64,
    pub text: String,
    pub font_size: String,
    pub src: String,
}

impl PropertyValues {
    pub fn from_element(element: &CanvasElement) -> Self {
        let text = element.as_text();
        Self {
            x: format!("{}", element.position.x.round()),
            y: format!("{}", element.position.y.round()),
            width: format!("{}", element.width.round()),
            height: format!("{}", element.height.round()),
            fill: display_color(element.style.fill.as_deref()),
            stroke: display_color(element.style.stroke.as_deref()),
            stroke_width: element.style.stroke_width(),
            opacity: element.style.opacity(),
            rotation: normalize_rotation(element.rotation),
            text: text.and_then(|t| t.text.clone()).unwrap_or_default(),
            font_size: format!("{}", text.map(|t| t.font_size()).unwrap_or(16.0)),
            src: element
                .as_image()
                .and_then(|i| i.src.clone())
                .unwrap_or_default(),
        }
    }

    /// Opacity as a whole percentage.
    pub fn opacity_percent(&self) -> i32 {
        (self.opacity * 100.0).round() as i32
    }
}

fn display_color(color: Option<&str>) -> String {
    match color {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => FALLBACK_COLOR.to_string(),
    }
}

/// Normalise a typed color to `#RRGGBB` when it parses, else keep it as typed.
pub fn normalize_color_input(input: &str) -> String {
    crate::style::parse_color(input)
        .map(format_color)
        .unwrap_or_else(|| input.to_string())
}
