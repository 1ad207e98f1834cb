//! Artboard Render Library
//!
//! Turns the editor state and live scene graph into a backend-neutral display
//! list, decodes bitmaps for image elements and encodes PNG exports.

pub mod decode;
pub mod display;
pub mod export;
mod renderer;
pub mod scene_builder;

pub use decode::decode_bitmap;
pub use display::{DisplayList, DrawItem, OverlayStroke, Paint};
pub use export::{
    Capture, EXPORT_FILE_NAME, EXPORT_PIXEL_RATIO, ExportError, ExportRegion, encode_png, export_canvas,
    export_region,
};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
pub use scene_builder::{RenderElement, SceneBuilder};
