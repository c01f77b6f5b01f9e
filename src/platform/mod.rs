//! Platform collaborators: font readiness and image decoding
//!
//! These are the external, potentially slow inputs a scene waits on before
//! it invokes the engine. Each is a small trait or handle so callers and
//! tests can substitute their own.

use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use crate::rendering::pixmap::Pixmap;
use crate::rendering::text::TextRasterizer;
use crate::{Error, Result};

type Slot = Option<Arc<dyn TextRasterizer>>;

/// Receiving half of the one-shot fonts-ready notification.
///
/// Cloning is cheap; every clone observes the same signal.
#[derive(Clone)]
pub struct FontsReady {
    rx: watch::Receiver<Slot>,
}

/// Sending half; consumed when fired.
pub struct FontsReadySignal {
    tx: watch::Sender<Slot>,
}

impl FontsReady {
    /// A pending signal and the handle that fires it.
    pub fn pending() -> (FontsReadySignal, FontsReady) {
        let (tx, rx) = watch::channel(None);
        (FontsReadySignal { tx }, FontsReady { rx })
    }

    /// A signal that has already fired.
    pub fn ready(rasterizer: Arc<dyn TextRasterizer>) -> FontsReady {
        let (tx, rx) = watch::channel(Some(rasterizer));
        // The value stays readable after the sender is gone.
        drop(tx);
        FontsReady { rx }
    }

    pub fn is_ready(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Wait for the fonts and return the rasterizer to measure with.
    ///
    /// Fails with [`Error::FontError`] when the signal is dropped unfired.
    pub async fn wait(&self) -> Result<Arc<dyn TextRasterizer>> {
        let mut rx = self.rx.clone();
        let slot = rx
            .wait_for(|slot| slot.is_some())
            .await
            .map_err(|_| Error::FontError("fonts-ready signal dropped before firing".into()))?;
        match slot.as_ref() {
            Some(r) => Ok(Arc::clone(r)),
            None => Err(Error::FontError("fonts-ready signal fired without a rasterizer".into())),
        }
    }
}

impl FontsReadySignal {
    pub fn fire(self, rasterizer: Arc<dyn TextRasterizer>) {
        debug!("fonts ready");
        self.tx.send_replace(Some(rasterizer));
    }
}

/// Encoded bytes to bitmap
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Pixmap>;
}

/// PNG decoding via the `png` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct PngDecoder;

impl ImageDecoder for PngDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Pixmap> {
        Pixmap::decode_png(bytes)
    }
}

/// Decoded images memoized by path.
///
/// Only successful decodes are stored, so a failed load is retried on the
/// next request.
pub struct ImageCache {
    decoder: Box<dyn ImageDecoder>,
    entries: Mutex<HashMap<PathBuf, Arc<Pixmap>>>,
}

impl ImageCache {
    pub fn new(decoder: Box<dyn ImageDecoder>) -> Self {
        Self { decoder, entries: Mutex::new(HashMap::new()) }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Arc<Pixmap>>> {
        // A panic while holding the lock leaves the map itself intact.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<Arc<Pixmap>> {
        let path = path.as_ref();
        if let Some(hit) = self.entries().get(path) {
            return Ok(Arc::clone(hit));
        }
        let bytes = std::fs::read(path)?;
        let image = Arc::new(self.decoder.decode(&bytes)?);
        debug!("decoded {} ({}x{})", path.display(), image.width(), image.height());
        self.entries().insert(path.to_path_buf(), Arc::clone(&image));
        Ok(image)
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(Box::new(PngDecoder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::color::Rgba;
    use crate::rendering::text::HeadlessRasterizer;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(Arc<AtomicUsize>);

    impl ImageDecoder for Counting {
        fn decode(&self, bytes: &[u8]) -> Result<Pixmap> {
            self.0.fetch_add(1, Ordering::SeqCst);
            PngDecoder.decode(bytes)
        }
    }

    fn temp_png(name: &str) -> PathBuf {
        let mut pm = Pixmap::new(3, 2).unwrap();
        pm.fill(Rgba::opaque(10, 20, 30));
        let path = std::env::temp_dir().join(format!("fcdesign-{}-{}.png", name, std::process::id()));
        std::fs::write(&path, pm.encode_png().unwrap()).unwrap();
        path
    }

    #[test]
    fn cache_decodes_once() {
        let path = temp_png("cache");
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = ImageCache::new(Box::new(Counting(calls.clone())));
        let a = cache.load(&path).unwrap();
        let b = cache.load(&path).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!((a.width(), a.height()), (3, 2));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = ImageCache::default();
        let missing = std::env::temp_dir().join("fcdesign-definitely-missing.png");
        assert!(cache.load(&missing).is_err());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn fonts_ready_fires_once_for_all_waiters() {
        let (signal, ready) = FontsReady::pending();
        let other = ready.clone();
        assert!(!ready.is_ready());
        let waiter = tokio::spawn(async move { other.wait().await.map(|_| ()) });
        signal.fire(Arc::new(HeadlessRasterizer::new()));
        assert!(waiter.await.unwrap().is_ok());
        assert!(ready.wait().await.is_ok());
    }

    #[tokio::test]
    async fn dropped_signal_is_a_font_error() {
        let (signal, ready) = FontsReady::pending();
        drop(signal);
        assert!(matches!(ready.wait().await, Err(Error::FontError(_))));
    }
}
