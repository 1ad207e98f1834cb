//! Tool system for the editor.

use crate::element::ElementKind;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    Rectangle,
    Circle,
    Text,
    Image,
}

impl Tool {
    /// All tools in toolbar order.
    pub fn all() -> &'static [Tool] {
        &[
            Tool::Select,
            Tool::Rectangle,
            Tool::Circle,
            Tool::Text,
            Tool::Image,
        ]
    }

    /// Display name for UI.
    pub fn display_name(self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Rectangle => "Rectangle",
            Tool::Circle => "Circle",
            Tool::Text => "Text",
            Tool::Image => "Image",
        }
    }

    /// Element kind placed by a click on empty canvas, if this is a placement tool.
    ///
    /// The image tool needs a source, so it does not place on click.
    pub fn placement_kind(self) -> Option<ElementKind> {
        match self {
            Tool::Rectangle => Some(ElementKind::Rectangle),
            Tool::Circle => Some(ElementKind::Circle),
            Tool::Text => Some(ElementKind::Text),
            Tool::Select | Tool::Image => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tool() {
        assert_eq!(Tool::default(), Tool::Select);
    }

    #[test]
    fn test_placement_kinds() {
        assert_eq!(Tool::Rectangle.placement_kind(), Some(ElementKind::Rectangle));
        assert_eq!(Tool::Circle.placement_kind(), Some(ElementKind::Circle));
        assert_eq!(Tool::Text.placement_kind(), Some(ElementKind::Text));
        assert_eq!(Tool::Image.placement_kind(), None);
        assert_eq!(Tool::Select.placement_kind(), None);
    }
}
