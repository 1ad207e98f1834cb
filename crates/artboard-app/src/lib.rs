//! Artboard Application
//!
//! The application shell: window, side panels, pointer and keyboard routing,
//! painting of the display list and image loading.

mod app;
mod canvas;
mod loader;
mod shortcuts;
mod ui;

pub use app::{App, AppConfig, run};
pub use loader::NativeImageLoader;
pub use shortcuts::{Shortcut, ShortcutRegistry};
pub use ui::{UiAction, UiState};
