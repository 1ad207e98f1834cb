//! Visual attributes shared by every element kind.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Default opacity when an element carries none.
pub const DEFAULT_OPACITY: f64 = 1.0;

/// Optional visual attributes of an element.
///
/// Colors are kept exactly as the user entered them so the property form can
/// echo them back; [`parse_color`] turns them into renderable colors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementStyle {
    /// Fill color (CSS hex string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Stroke color (CSS hex string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Stroke width in workspace units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// Opacity in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl ElementStyle {
    /// Style with fill, stroke and stroke width set.
    pub fn filled(fill: &str, stroke: &str, stroke_width: f64) -> Self {
        Self {
            fill: Some(fill.to_string()),
            stroke: Some(stroke.to_string()),
            stroke_width: Some(stroke_width),
            opacity: None,
        }
    }

    /// Style with only a fill color.
    pub fn fill_only(fill: &str) -> Self {
        Self {
            fill: Some(fill.to_string()),
            ..Self::default()
        }
    }

    /// Effective opacity.
    pub fn opacity(&self) -> f64 {
        self.opacity.unwrap_or(DEFAULT_OPACITY)
    }

    /// Effective stroke width (0 when absent).
    pub fn stroke_width(&self) -> f64 {
        self.stroke_width.unwrap_or(0.0)
    }

    /// Fill as a renderable color, if set and parseable.
    pub fn fill_color(&self) -> Option<Color> {
        self.fill.as_deref().and_then(parse_color)
    }

    /// Stroke as a renderable color, if set and parseable.
    pub fn stroke_color(&self) -> Option<Color> {
        self.stroke.as_deref().and_then(parse_color)
    }
}

/// Parse a CSS hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
pub fn parse_color(color: &str) -> Option<Color> {
    let hex = color.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    match hex.len() {
        3 => {
            // #rgb -> #rrggbb
            let r = channel(0..1)? * 17;
            let g = channel(1..2)? * 17;
            let b = channel(2..3)? * 17;
            Some(Color::from_rgba8(r, g, b, 255))
        }
        6 => Some(Color::from_rgba8(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
        8 => Some(Color::from_rgba8(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        )),
        _ => None,
    }
}

/// Format a color as `#rrggbb`, dropping alpha.
pub fn format_color(color: Color) -> String {
    let rgba = color.to_rgba8();
    format!("#{:02X}{:02X}{:02X}", rgba.r, rgba.g, rgba.b)
}
