//! Element definitions for the design canvas.

use crate::style::ElementStyle;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Smallest width or height an element may have.
pub const MIN_ELEMENT_SIZE: f64 = 5.0;

/// Fallback text content shown when a text element has none.
pub const DEFAULT_TEXT: &str = "Text";
/// Fallback font size.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
/// Fallback font family.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// The four kinds of element a design can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Circle,
    Text,
    Image,
}

impl ElementKind {
    /// Display name for UI.
    pub fn display_name(self) -> &'static str {
        match self {
            ElementKind::Rectangle => "Rectangle",
            ElementKind::Circle => "Circle",
            ElementKind::Text => "Text",
            ElementKind::Image => "Image",
        }
    }
}

/// Content of a text element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

impl TextContent {
    /// Text to display.
    pub fn text(&self) -> &str {
        match self.text.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => DEFAULT_TEXT,
        }
    }

    /// Font size in workspace units.
    pub fn font_size(&self) -> f64 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Font family name.
    pub fn font_family(&self) -> &str {
        self.font_family.as_deref().unwrap_or(DEFAULT_FONT_FAMILY)
    }
}

/// Content of an image element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageContent {
    /// Source URL (http(s), file or data URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

impl ImageContent {
    /// Source URL, if one is set and non-empty.
    pub fn src(&self) -> Option<&str> {
        self.src.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Kind-specific payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementContent {
    Rectangle,
    Circle,
    Text(TextContent),
    Image(ImageContent),
}

impl ElementContent {
    /// The kind this content belongs to.
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementContent::Rectangle => ElementKind::Rectangle,
            ElementContent::Circle => ElementKind::Circle,
            ElementContent::Text(_) => ElementKind::Text,
            ElementContent::Image(_) => ElementKind::Image,
        }
    }
}

/// A single placed shape, text box or image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasElement {
    pub(crate) id: ElementId,
    /// Top-left corner in workspace coordinates.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees. Not normalised.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub style: ElementStyle,
    #[serde(flatten)]
    pub content: ElementContent,
}

impl CanvasElement {
    /// Create an element of `kind` at `position` with the editor's defaults.
    pub fn new(kind: ElementKind, position: Point) -> Self {
        let (width, height, style, content) = match kind {
            ElementKind::Rectangle => (
                100.0,
                80.0,
                ElementStyle::filled("#8B5CF6", "#7C3AED", 2.0),
                ElementContent::Rectangle,
            ),
            ElementKind::Circle => (
                100.0,
                100.0,
                ElementStyle::filled("#F59E0B", "#D97706", 2.0),
                ElementContent::Circle,
            ),
            ElementKind::Text => (
                200.0,
                40.0,
                ElementStyle::fill_only("#1F2937"),
                ElementContent::Text(TextContent {
                    text: Some("Sample Text".to_string()),
                    font_size: Some(24.0),
                    font_family: Some(DEFAULT_FONT_FAMILY.to_string()),
                }),
            ),
            ElementKind::Image => (
                150.0,
                150.0,
                ElementStyle::default(),
                ElementContent::Image(ImageContent { src: Some(String::new()) }),
            ),
        };
        Self {
            id: Uuid::new_v4(),
            position,
            width,
            height,
            rotation: 0.0,
            style,
            content,
        }
    }

    /// Create an image element pointing at `src`.
    pub fn image(position: Point, src: impl Into<String>) -> Self {
        let mut element = Self::new(ElementKind::Image, position);
        element.content = ElementContent::Image(ImageContent {
            src: Some(src.into()),
        });
        element
    }

    /// Get the unique identifier.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Get the element kind.
    pub fn kind(&self) -> ElementKind {
        self.content.kind()
    }

    /// Unrotated bounding box in workspace coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    /// Text content, for text elements.
    pub fn as_text(&self) -> Option<&TextContent> {
        match &self.content {
            ElementContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Image content, for image elements.
    pub fn as_image(&self) -> Option<&ImageContent> {
        match &self.content {
            ElementContent::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Merge a partial update into this element.
    ///
    /// Returns true if any field changed. Kind-specific fields that do not
    /// apply to this element's kind are ignored.
    pub fn apply(&mut self, patch: &ElementPatch) -> bool {
        let before = self.clone();

        if let Some(x) = patch.x {
            self.position.x = x;
        }
        if let Some(y) = patch.y {
            self.position.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width.max(MIN_ELEMENT_SIZE);
        }
        if let Some(height) = patch.height {
            self.height = height.max(MIN_ELEMENT_SIZE);
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(fill) = &patch.fill {
            self.style.fill = Some(fill.clone());
        }
        if let Some(stroke) = &patch.stroke {
            self.style.stroke = Some(stroke.clone());
        }
        if let Some(stroke_width) = patch.stroke_width {
            self.style.stroke_width = Some(stroke_width);
        }
        if let Some(opacity) = patch.opacity {
            self.style.opacity = Some(opacity);
        }

        match &mut self.content {
            ElementContent::Text(content) => {
                if let Some(text) = &patch.text {
                    content.text = Some(text.clone());
                }
                if let Some(font_size) = patch.font_size {
                    content.font_size = Some(font_size);
                }
                if let Some(font_family) = &patch.font_family {
                    content.font_family = Some(font_family.clone());
                }
            }
            ElementContent::Image(content) => {
                if let Some(src) = &patch.src {
                    content.src = Some(src.clone());
                }
            }
            ElementContent::Rectangle | ElementContent::Circle => {}
        }

        *self != before
    }
}

/// A partial-field update for an element. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub src: Option<String>,
}

impl ElementPatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the patch carries no fields.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn with_x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn with_y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    pub fn with_stroke(mut self, stroke: impl Into<String>) -> Self {
        self.stroke = Some(stroke.into());
        self
    }

    pub fn with_stroke_width(mut self, stroke_width: f64) -> Self {
        self.stroke_width = Some(stroke_width);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = Some(font_size);
        self
    }

    pub fn with_font_family(mut self, font_family: impl Into<String>) -> Self {
        self.font_family = Some(font_family.into());
        self
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rectangle_defaults() {
        let rect = CanvasElement::new(ElementKind::Rectangle, Point::new(10.0, 20.0));
        assert_eq!(rect.kind(), ElementKind::Rectangle);
        assert!((rect.width - 100.0).abs() < f64::EPSILON);
        assert!((rect.height - 80.0).abs() < f64::EPSILON);
        assert_eq!(rect.style.fill.as_deref(), Some("#8B5CF6"));
        assert_eq!(rect.style.stroke.as_deref(), Some("#7C3AED"));
        assert!(rect.rotation.abs() < f64::EPSILON);
    }

    #[test]
    fn test_text_defaults() {
        let text = CanvasElement::new(ElementKind::Text, Point::ZERO);
        let content = text.as_text().unwrap();
        assert_eq!(content.text(), "Sample Text");
        assert!((content.font_size() - 24.0).abs() < f64::EPSILON);
        assert_eq!(content.font_family(), "Arial");
        assert!(text.style.stroke.is_none());
    }

    #[test]
    fn test_text_fallbacks() {
        let content = TextContent::default();
        assert_eq!(content.text(), DEFAULT_TEXT);
        assert!((content.font_size() - DEFAULT_FONT_SIZE).abs() < f64::EPSILON);
        assert_eq!(content.font_family(), DEFAULT_FONT_FAMILY);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = CanvasElement::new(ElementKind::Circle, Point::ZERO);
        let b = CanvasElement::new(ElementKind::Circle, Point::ZERO);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_bounds() {
        let rect = CanvasElement::new(ElementKind::Rectangle, Point::new(10.0, 20.0));
        let bounds = rect.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut rect = CanvasElement::new(ElementKind::Rectangle, Point::new(100.0, 100.0));
        let before = rect.clone();

        assert!(rect.apply(&ElementPatch::new().with_x(300.0)));

        assert!((rect.position.x - 300.0).abs() < f64::EPSILON);
        let mut expected = before;
        expected.position.x = 300.0;
        assert_eq!(rect, expected);
    }

    #[test]
    fn test_patch_clamps_size() {
        let mut rect = CanvasElement::new(ElementKind::Rectangle, Point::ZERO);
        rect.apply(&ElementPatch::new().with_size(1.0, 0.0));
        assert!((rect.width - MIN_ELEMENT_SIZE).abs() < f64::EPSILON);
        assert!((rect.height - MIN_ELEMENT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_patch_ignores_foreign_fields() {
        let mut rect = CanvasElement::new(ElementKind::Rectangle, Point::ZERO);
        let changed = rect.apply(&ElementPatch::new().with_text("hello").with_src("x.png"));
        assert!(!changed);
        assert_eq!(rect.content, ElementContent::Rectangle);
    }

    #[test]
    fn test_patch_text_fields() {
        let mut text = CanvasElement::new(ElementKind::Text, Point::ZERO);
        text.apply(&ElementPatch::new().with_text("Hello").with_font_size(32.0));
        let content = text.as_text().unwrap();
        assert_eq!(content.text(), "Hello");
        assert!((content.font_size() - 32.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_patch() {
        assert!(ElementPatch::new().is_empty());
        assert!(!ElementPatch::new().with_rotation(45.0).is_empty());
    }

    #[test]
    fn test_image_src() {
        let image = CanvasElement::image(Point::ZERO, "https://example.com/a.png");
        assert_eq!(image.as_image().and_then(|i| i.src()), Some("https://example.com/a.png"));

        let blank = CanvasElement::new(ElementKind::Image, Point::ZERO);
        assert_eq!(blank.as_image().and_then(|i| i.src()), None);
    }

    #[test]
    fn test_json_shape() {
        let rect = CanvasElement::new(ElementKind::Rectangle, Point::new(1.0, 2.0));
        let value = serde_json::to_value(&rect).unwrap();
        assert_eq!(value["type"], "rectangle");
        assert_eq!(value["style"]["fill"], "#8B5CF6");
    }
}
