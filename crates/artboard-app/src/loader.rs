//! Native image loader: fetch and decode on a worker thread.

use artboard_core::images::{Bitmap, ImageLoader, ImageSource, LoadError};
use artboard_render::decode_bitmap;
use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use std::thread;

/// Loads images on short-lived worker threads.
///
/// When a repaint context is set, a finished load wakes the UI so the
/// registry gets polled again.
#[derive(Default)]
pub struct NativeImageLoader {
    repaint: Option<egui::Context>,
}

impl NativeImageLoader {
    pub fn new(repaint: egui::Context) -> Self {
        Self {
            repaint: Some(repaint),
        }
    }
}

impl ImageLoader for NativeImageLoader {
    fn load(&self, source: ImageSource) -> LocalBoxFuture<'static, Result<Bitmap, LoadError>> {
        let (tx, rx) = oneshot::channel();
        let repaint = self.repaint.clone();

        let spawned = thread::Builder::new()
            .name("image-loader".to_string())
            .spawn(move || {
                let result = fetch_bytes(source).and_then(|bytes| decode_bitmap(&bytes));
                // The receiver is gone if the registry dropped the load.
                let _ = tx.send(result);
                if let Some(ctx) = repaint {
                    ctx.request_repaint();
                }
            });
        if let Err(e) = spawned {
            log::error!("Failed to spawn image loader thread: {e}");
        }

        async move { rx.await.unwrap_or(Err(LoadError::Cancelled)) }.boxed_local()
    }
}

/// Read the raw bytes behind a source.
fn fetch_bytes(source: ImageSource) -> Result<Vec<u8>, LoadError> {
    match source {
        ImageSource::Http(url) => {
            let response = reqwest::blocking::get(url.as_str())
                .and_then(|r| r.error_for_status())
                .map_err(|e| LoadError::Http(e.to_string()))?;
            let bytes = response.bytes().map_err(|e| LoadError::Http(e.to_string()))?;
            Ok(bytes.to_vec())
        }
        ImageSource::File(path) => Ok(std::fs::read(path)?),
        ImageSource::Data { bytes, .. } => Ok(bytes),
    }
}
