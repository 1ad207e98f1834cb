//! Asynchronous image loading for image elements.
//!
//! Loads are fire-and-forget. The registry polls outstanding loads once per
//! frame and only applies a finished load if its element still exists with
//! the same source. Failed loads leave the element blank.

use crate::element::{CanvasElement, ElementId};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use futures::task::{Context, Poll, noop_waker_ref};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Image loading errors.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Empty image source")]
    EmptySource,
    #[error("Unsupported image source: {0}")]
    Unsupported(String),
    #[error("Invalid data URL: {0}")]
    DataUrl(String),
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Loader went away before finishing")]
    Cancelled,
}

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// `http` or `https` URL.
    Http(Url),
    /// Local file, from a `file://` URL or a plain path.
    File(PathBuf),
    /// Inline `data:` URL payload.
    Data { mime: Option<String>, bytes: Vec<u8> },
}

impl ImageSource {
    /// Parse an element's `src` string.
    pub fn parse(src: &str) -> Result<Self, LoadError> {
        let src = src.trim();
        if src.is_empty() {
            return Err(LoadError::EmptySource);
        }
        if let Some(rest) = src.strip_prefix("data:") {
            return Self::parse_data(rest);
        }

        match Url::parse(src) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(ImageSource::Http(url)),
                "file" => url
                    .to_file_path()
                    .map(ImageSource::File)
                    .map_err(|_| LoadError::Unsupported(src.to_string())),
                // Windows drive letters parse as one-letter schemes.
                scheme if scheme.len() == 1 => Ok(ImageSource::File(PathBuf::from(src))),
                scheme => Err(LoadError::Unsupported(format!("{scheme}: scheme"))),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(ImageSource::File(PathBuf::from(src))),
            Err(e) => Err(LoadError::Unsupported(format!("{src}: {e}"))),
        }
    }

    fn parse_data(rest: &str) -> Result<Self, LoadError> {
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| LoadError::DataUrl("missing ','".to_string()))?;
        let Some(mime) = header.strip_suffix(";base64") else {
            return Err(LoadError::DataUrl("only base64 payloads are supported".to_string()));
        };
        let bytes = STANDARD.decode(payload.trim())?;
        let mime = (!mime.is_empty()).then(|| mime.to_string());
        Ok(ImageSource::Data { mime, bytes })
    }
}

/// A decoded RGBA8 bitmap.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    /// Row-major, unpremultiplied RGBA8 pixels.
    pub rgba: Arc<Vec<u8>>,
}

impl Bitmap {
    /// Wrap RGBA8 pixels, checking the buffer length.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, LoadError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(LoadError::Decode(format!(
                "expected {expected} bytes for {width}x{height}, got {}",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba: Arc::new(rgba),
        })
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Something that can fetch and decode images.
pub trait ImageLoader {
    /// Start loading `source`. The returned future resolves once.
    fn load(&self, source: ImageSource) -> LocalBoxFuture<'static, Result<Bitmap, LoadError>>;
}

enum LoadState {
    Pending(LocalBoxFuture<'static, Result<Bitmap, LoadError>>),
    Ready(Bitmap),
    /// Failed; stays blank until the source changes.
    Failed,
}

struct Entry {
    src: String,
    state: LoadState,
}

/// Tracks image loads per element.
pub struct ImageRegistry {
    loader: Box<dyn ImageLoader>,
    entries: HashMap<ElementId, Entry>,
}

impl ImageRegistry {
    pub fn new(loader: Box<dyn ImageLoader>) -> Self {
        Self {
            loader,
            entries: HashMap::new(),
        }
    }

    /// Start loads for new or changed image sources.
    pub fn request(&mut self, elements: &[CanvasElement]) {
        for element in elements {
            let Some(src) = element.as_image().and_then(|i| i.src()) else {
                continue;
            };
            let id = element.id();
            if self.entries.get(&id).is_some_and(|e| e.src == src) {
                continue;
            }

            let state = match ImageSource::parse(src) {
                Ok(source) => {
                    log::debug!("Loading image for {id} from {src}");
                    LoadState::Pending(self.loader.load(source))
                }
                Err(e) => {
                    log::warn!("Cannot load image {src}: {e}");
                    LoadState::Failed
                }
            };
            self.entries.insert(
                id,
                Entry {
                    src: src.to_string(),
                    state,
                },
            );
        }
    }

    /// Poll outstanding loads once. Returns the ids whose bitmap became ready.
    pub fn poll(&mut self, elements: &[CanvasElement]) -> Vec<ElementId> {
        let mut cx = Context::from_waker(noop_waker_ref());
        let mut ready = Vec::new();
        let mut stale = Vec::new();

        for (id, entry) in &mut self.entries {
            let LoadState::Pending(future) = &mut entry.state else {
                continue;
            };
            let Poll::Ready(result) = future.poll_unpin(&mut cx) else {
                continue;
            };

            let still_wanted = elements
                .iter()
                .find(|e| e.id() == *id)
                .and_then(|e| e.as_image())
                .and_then(|i| i.src())
                .is_some_and(|src| src == entry.src);
            if !still_wanted {
                stale.push(*id);
                continue;
            }

            match result {
                Ok(bitmap) => {
                    log::debug!("Image ready for {id}: {}x{}", bitmap.width, bitmap.height);
                    entry.state = LoadState::Ready(bitmap);
                    ready.push(*id);
                }
                Err(e) => {
                    log::warn!("Failed to load image {}: {e}", entry.src);
                    entry.state = LoadState::Failed;
                }
            }
        }

        for id in stale {
            self.entries.remove(&id);
        }
        ready
    }

    /// Drop entries whose element is gone or no longer has that source.
    pub fn prune(&mut self, elements: &[CanvasElement]) {
        self.entries.retain(|id, entry| {
            elements
                .iter()
                .find(|e| e.id() == *id)
                .and_then(|e| e.as_image())
                .and_then(|i| i.src())
                .is_some_and(|src| src == entry.src)
        });
    }

    /// Request, poll and prune in one go. Call once per frame.
    pub fn update(&mut self, elements: &[CanvasElement]) -> Vec<ElementId> {
        self.request(elements);
        let ready = self.poll(elements);
        self.prune(elements);
        ready
    }

    /// Loaded bitmap for an element, if any.
    pub fn bitmap(&self, id: ElementId) -> Option<&Bitmap> {
        match &self.entries.get(&id)?.state {
            LoadState::Ready(bitmap) => Some(bitmap),
            LoadState::Pending(_) | LoadState::Failed => None,
        }
    }

    /// Check if a load is still outstanding.
    pub fn is_pending(&self, id: ElementId) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|e| matches!(e.state, LoadState::Pending(_)))
    }

    /// Number of outstanding loads.
    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e.state, LoadState::Pending(_)))
            .count()
    }
}

impl fmt::Debug for ImageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRegistry")
            .field("entries", &self.entries.len())
            .field("pending", &self.pending_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, ElementPatch};
    use futures::channel::oneshot;
    use kurbo::Point;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Senders = Rc<RefCell<Vec<oneshot::Sender<Result<Bitmap, LoadError>>>>>;

    /// Loader whose loads finish when the test sends a result.
    struct ManualLoader {
        senders: Senders,
    }

    impl ImageLoader for ManualLoader {
        fn load(&self, _source: ImageSource) -> LocalBoxFuture<'static, Result<Bitmap, LoadError>> {
            let (tx, rx) = oneshot::channel();
            self.senders.borrow_mut().push(tx);
            async move { rx.await.unwrap_or(Err(LoadError::Cancelled)) }.boxed_local()
        }
    }

    fn registry() -> (ImageRegistry, Senders) {
        let senders: Senders = Rc::default();
        let loader = ManualLoader {
            senders: senders.clone(),
        };
        (ImageRegistry::new(Box::new(loader)), senders)
    }

    fn pixel() -> Bitmap {
        Bitmap::new(1, 1, vec![255, 0, 0, 255]).unwrap()
    }

    #[test]
    fn test_parse_sources() {
        assert!(matches!(
            ImageSource::parse("https://example.com/a.png"),
            Ok(ImageSource::Http(_))
        ));
        assert_eq!(
            ImageSource::parse("assets/sample1.jpg").unwrap(),
            ImageSource::File(PathBuf::from("assets/sample1.jpg"))
        );
        assert!(matches!(ImageSource::parse(""), Err(LoadError::EmptySource)));
        assert!(matches!(ImageSource::parse("ftp://x/y.png"), Err(LoadError::Unsupported(_))));
    }

    #[test]
    fn test_parse_data_url() {
        let source = ImageSource::parse("data:image/png;base64,AAEC").unwrap();
        assert_eq!(
            source,
            ImageSource::Data {
                mime: Some("image/png".to_string()),
                bytes: vec![0, 1, 2],
            }
        );
        assert!(matches!(ImageSource::parse("data:text/plain,hi"), Err(LoadError::DataUrl(_))));
    }

    #[test]
    fn test_bitmap_checks_length() {
        assert!(Bitmap::new(2, 2, vec![0; 16]).is_ok());
        assert!(Bitmap::new(2, 2, vec![0; 15]).is_err());
    }

    #[test]
    fn test_load_applies_when_element_unchanged() {
        let (mut registry, senders) = registry();
        let image = CanvasElement::image(Point::ZERO, "https://example.com/a.png");
        let id = image.id();
        let elements = vec![image];

        registry.update(&elements);
        assert!(registry.is_pending(id));
        assert!(registry.bitmap(id).is_none());

        let tx = senders.borrow_mut().remove(0);
        assert!(tx.send(Ok(pixel())).is_ok());

        assert_eq!(registry.update(&elements), vec![id]);
        assert_eq!(registry.bitmap(id).map(|b| b.width), Some(1));
    }

    #[test]
    fn test_load_discarded_after_delete() {
        let (mut registry, senders) = registry();
        let image = CanvasElement::image(Point::ZERO, "https://example.com/a.png");
        let id = image.id();
        registry.request(&[image]);

        let tx = senders.borrow_mut().remove(0);
        // The load completes after the element is gone.
        let _ = tx.send(Ok(pixel()));
        assert!(registry.poll(&[]).is_empty());
        assert!(registry.bitmap(id).is_none());
    }

    #[test]
    fn test_load_discarded_after_src_change() {
        let (mut registry, senders) = registry();
        let mut image = CanvasElement::image(Point::ZERO, "https://example.com/a.png");
        let id = image.id();
        registry.request(std::slice::from_ref(&image));

        image.apply(&ElementPatch::new().with_src("https://example.com/b.png"));
        let first = senders.borrow_mut().remove(0);
        let _ = first.send(Ok(pixel()));

        // Polling against the changed element ignores the stale result.
        assert!(registry.poll(std::slice::from_ref(&image)).is_empty());
        registry.request(std::slice::from_ref(&image));
        assert!(registry.is_pending(id));
    }

    #[test]
    fn test_failed_load_stays_blank() {
        let (mut registry, senders) = registry();
        let image = CanvasElement::image(Point::ZERO, "https://example.com/a.png");
        let id = image.id();
        let elements = vec![image];
        registry.update(&elements);

        let tx = senders.borrow_mut().remove(0);
        let _ = tx.send(Err(LoadError::Http("404".to_string())));
        assert!(registry.update(&elements).is_empty());
        assert!(registry.bitmap(id).is_none());
        assert!(!registry.is_pending(id));

        // Not retried for the same source.
        registry.update(&elements);
        assert!(senders.borrow().is_empty());
    }

    #[test]
    fn test_blank_src_does_not_load() {
        let (mut registry, senders) = registry();
        let blank = CanvasElement::new(ElementKind::Image, Point::ZERO);
        registry.update(&[blank]);
        assert!(senders.borrow().is_empty());
        assert_eq!(registry.pending_count(), 0);
    }
}
