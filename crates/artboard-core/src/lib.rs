//! Artboard Core Library
//!
//! Platform-agnostic data model and editing logic for the Artboard design editor.

pub mod element;
pub mod guides;
pub mod images;
pub mod interaction;
pub mod layers;
pub mod properties;
pub mod scene;
pub mod store;
pub mod style;
pub mod tools;
pub mod transform;
pub mod viewport;

pub use element::{CanvasElement, ElementContent, ElementId, ElementKind, ElementPatch, MIN_ELEMENT_SIZE};
pub use guides::{Guide, GuideConfig, GuideKind, GuideOrientation, compute_guides};
pub use images::{Bitmap, ImageLoader, ImageRegistry, ImageSource, LoadError};
pub use interaction::{Gesture, Interaction, commit_patch};
pub use layers::{LayerItem, layer_items};
pub use properties::{PropertyEdit, PropertyValues};
pub use scene::{SceneGraph, SceneNode};
pub use store::EditorState;
pub use style::{ElementStyle, format_color, parse_color};
pub use tools::Tool;
pub use transform::{Handle, HandleKind, Transformer, bound_box};
pub use viewport::{Viewport, ViewportConfig};
