//! Editor state: the element list, selection and active tool.

use crate::element::{CanvasElement, ElementContent, ElementId, ElementKind, ElementPatch};
use crate::tools::Tool;
use crate::viewport::{INSERTION_OFFSET, STAGE_PADDING};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Session state of the editor.
///
/// Every mutation goes through the command methods below. Commands never fail;
/// unknown ids are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorState {
    /// Elements back to front.
    elements: Vec<CanvasElement>,
    selected: Option<ElementId>,
    tool: Tool,
    /// Text element whose text is being edited.
    editing_text: Option<ElementId>,
    /// Bumped on every mutation.
    #[serde(skip)]
    revision: u64,
    /// Where toolbar-added elements are placed.
    insertion_point: Point,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    /// Create an empty editor.
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            selected: None,
            tool: Tool::Select,
            editing_text: None,
            revision: 0,
            insertion_point: Point::new(
                STAGE_PADDING + INSERTION_OFFSET,
                STAGE_PADDING + INSERTION_OFFSET,
            ),
        }
    }

    /// Use a different default insertion point.
    pub fn with_insertion_point(mut self, point: Point) -> Self {
        self.insertion_point = point;
        self
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == id)
    }

    /// Add an element on top of the others and select it.
    ///
    /// `src` is only used by image elements. The tool reverts to select.
    pub fn add_element(
        &mut self,
        kind: ElementKind,
        src: Option<String>,
        position: Option<Point>,
    ) -> ElementId {
        let position = position.unwrap_or(self.insertion_point);
        let element = match kind {
            ElementKind::Image => CanvasElement::image(position, src.unwrap_or_default()),
            _ => CanvasElement::new(kind, position),
        };
        let id = element.id();

        log::info!(
            "{} added to canvas at ({}, {})",
            kind.display_name(),
            position.x,
            position.y
        );

        self.elements.push(element);
        self.selected = Some(id);
        self.editing_text = None;
        self.tool = Tool::Select;
        self.touch();
        id
    }

    /// Merge a partial update into an element. Returns true if anything changed.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        let Some(element) = self.elements.iter_mut().find(|e| e.id() == id) else {
            return false;
        };
        let changed = element.apply(patch);
        if changed {
            log::debug!("Updated element {id}");
            self.touch();
        }
        changed
    }

    /// Remove an element, clearing selection and text editing that pointed at it.
    pub fn delete_element(&mut self, id: ElementId) -> Option<CanvasElement> {
        let index = self.index_of(id)?;
        let removed = self.elements.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.editing_text == Some(id) {
            self.editing_text = None;
        }
        log::info!("{} deleted", removed.kind().display_name());
        self.touch();
        Some(removed)
    }

    /// Delete the selected element, if any.
    pub fn delete_selected(&mut self) -> Option<CanvasElement> {
        let id = self.selected?;
        self.delete_element(id)
    }

    /// Select an element or clear the selection. Ends text editing.
    pub fn select_element(&mut self, id: Option<ElementId>) {
        if id.is_some_and(|id| !self.contains(id)) {
            return;
        }
        self.selected = id;
        self.editing_text = None;
        self.touch();
    }

    /// Set the active tool.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool != tool {
            self.tool = tool;
            self.touch();
        }
    }

    /// Enter text edit mode for a text element.
    pub fn begin_text_edit(&mut self, id: ElementId) {
        let is_text = self
            .get(id)
            .is_some_and(|e| matches!(e.content, ElementContent::Text(_)));
        if !is_text {
            return;
        }
        self.selected = Some(id);
        self.editing_text = Some(id);
        self.touch();
    }

    /// Write the edited text and leave edit mode.
    pub fn commit_text_edit(&mut self, id: ElementId, text: impl Into<String>) {
        self.update_element(id, &ElementPatch::new().with_text(text));
        self.cancel_text_edit();
    }

    /// Leave text edit mode without changing the text.
    pub fn cancel_text_edit(&mut self) {
        if self.editing_text.take().is_some() {
            self.touch();
        }
    }

    /// Handle a click on empty canvas at a workspace point.
    ///
    /// Placement tools add an element there; the image tool only reverts to
    /// select; the select tool clears the selection.
    pub fn canvas_click(&mut self, point: Point) -> Option<ElementId> {
        match self.tool {
            Tool::Select => {
                self.select_element(None);
                None
            }
            Tool::Image => {
                self.set_tool(Tool::Select);
                None
            }
            tool => tool
                .placement_kind()
                .map(|kind| self.add_element(kind, None, Some(point))),
        }
    }

    /// Elements back to front.
    pub fn elements(&self) -> &[CanvasElement] {
        &self.elements
    }

    pub fn get(&self, id: ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn selected_element(&self) -> Option<&CanvasElement> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn editing_text(&self) -> Option<ElementId> {
        self.editing_text
    }

    /// Counter bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn insertion_point(&self) -> Point {
        self.insertion_point
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Dump the state as JSON for debugging.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
