//! Layer list shown in the side panel.

use crate::element::{CanvasElement, ElementId, ElementKind};
use std::collections::HashMap;

/// Characters of text shown before truncation.
pub const LAYER_NAME_MAX_CHARS: usize = 15;

/// One row of the layers panel.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerItem {
    pub id: ElementId,
    pub kind: ElementKind,
    pub name: String,
    pub visible: bool,
    pub selected: bool,
}

fn layer_name(element: &CanvasElement, ordinal: usize) -> String {
    match element.as_text().and_then(|t| t.text.as_deref()) {
        Some(text) if !text.is_empty() => truncate(text),
        _ => format!("{} {}", element.kind().display_name(), ordinal),
    }
}

fn truncate(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(LAYER_NAME_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Layer rows, topmost element first.
pub fn layer_items(elements: &[CanvasElement], selected: Option<ElementId>) -> Vec<LayerItem> {
    // 1-based position among elements of the same kind, in z-order.
    let mut counts: HashMap<ElementKind, usize> = HashMap::new();
    let ordinals: Vec<usize> = elements
        .iter()
        .map(|e| {
            let count = counts.entry(e.kind()).or_insert(0);
            *count += 1;
            *count
        })
        .collect();

    elements
        .iter()
        .zip(ordinals)
        .rev()
        .map(|(element, ordinal)| LayerItem {
            id: element.id(),
            kind: element.kind(),
            name: layer_name(element, ordinal),
            visible: true,
            selected: selected == Some(element.id()),
        })
        .collect()
}
