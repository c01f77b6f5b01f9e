use crate::platform::{FontsReady, ImageCache};
use crate::rendering::pixmap::Pixmap;
use crate::rendering::text::TextRasterizer;
use crate::rendering::Screenshot;
use crate::scene::{self, Scene};
use crate::{Error, RenderConfig, Result};
use log::debug;
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tokio::sync::{oneshot, watch};

enum Command {
    Render(Job, oneshot::Sender<Result<Screenshot>>),
    Load(PathBuf, oneshot::Sender<Result<Arc<Pixmap>>>),
    Close(oneshot::Sender<()>),
}

struct Job {
    scene: Arc<dyn Scene>,
    rasterizer: Arc<dyn TextRasterizer>,
    ticket: Ticket,
}

/// Generation number of one render request.
#[derive(Clone)]
pub(crate) struct Ticket {
    generation: u64,
    latest: watch::Receiver<u64>,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether no newer request has been made since this one.
    pub fn is_current(&self) -> bool {
        *self.latest.borrow() == self.generation
    }

    /// Resolves once a newer request supersedes this one.
    pub async fn superseded(&self) {
        let mut rx = self.latest.clone();
        let generation = self.generation;
        let closed = rx.wait_for(|g| *g != generation).await.is_err();
        if closed {
            // Session gone; nothing newer will come.
            std::future::pending::<()>().await;
        }
    }
}

/// Result of [`RenderSession::render`]
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// This request won and its image is now the presented one
    Presented(Screenshot),
    /// A newer request arrived first; nothing was presented
    Superseded,
}

impl RenderOutcome {
    pub fn is_presented(&self) -> bool {
        matches!(self, RenderOutcome::Presented(_))
    }
}

/// Last-write-wins asynchronous rendering.
///
/// Render passes run on a dedicated worker thread that owns the CPU-bound
/// work. Each call to [`render`](Self::render) takes a new generation;
/// every wait along the way (fonts, debounce, the pass itself) gives up as
/// soon as a newer call arrives, and only the latest generation may replace
/// the presented image.
#[derive(Clone)]
pub struct RenderSession {
    cmd_tx: Sender<Command>,
    generation: Arc<watch::Sender<u64>>,
    fonts: FontsReady,
    config: RenderConfig,
    presented: Arc<Mutex<Option<Screenshot>>>,
}

impl RenderSession {
    /// Create a session (spawns the worker thread).
    pub fn new(fonts: FontsReady, config: RenderConfig) -> Self {
        Self::with_cache(fonts, config, Arc::new(ImageCache::default()))
    }

    pub fn with_cache(fonts: FontsReady, config: RenderConfig, cache: Arc<ImageCache>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let worker_config = config.clone();

        thread::spawn(move || {
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Render(job, resp) => {
                        // Requests queue up while a pass runs; skip the stale ones.
                        let res = if job.ticket.is_current() {
                            scene::render(job.scene.as_ref(), job.rasterizer.as_ref(), &worker_config)
                        } else {
                            Err(Error::Canceled)
                        };
                        let _ = resp.send(res);
                    }
                    Command::Load(path, resp) => {
                        let _ = resp.send(cache.load(path));
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(());
                        break;
                    }
                }
            }
            debug!("render worker stopped");
        });

        let (generation, _) = watch::channel(0u64);
        Self {
            cmd_tx,
            generation: Arc::new(generation),
            fonts,
            config,
            presented: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn next_ticket(&self) -> Ticket {
        let mut generation = 0;
        self.generation.send_modify(|g| {
            *g += 1;
            generation = *g;
        });
        Ticket { generation, latest: self.generation.subscribe() }
    }

    fn presented(&self) -> std::sync::MutexGuard<'_, Option<Screenshot>> {
        self.presented.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The image most recently presented, if any.
    pub fn current(&self) -> Option<Screenshot> {
        self.presented().clone()
    }

    /// Request a render of `scene`, superseding any request still in flight.
    ///
    /// A superseded request never touches the presented image, and its
    /// errors are dropped: they belong to input the user already replaced.
    pub async fn render(&self, scene: Arc<dyn Scene>) -> Result<RenderOutcome> {
        let ticket = self.next_ticket();
        match self.run(scene, &ticket).await {
            Ok(Some(shot)) => {
                let mut presented = self.presented();
                if !ticket.is_current() {
                    debug!("render #{} finished after being superseded", ticket.generation());
                    return Ok(RenderOutcome::Superseded);
                }
                *presented = Some(shot.clone());
                Ok(RenderOutcome::Presented(shot))
            }
            Ok(None) => Ok(RenderOutcome::Superseded),
            Err(e) if e.is_canceled() || !ticket.is_current() => {
                debug!("render #{} dropped: {}", ticket.generation(), e);
                Ok(RenderOutcome::Superseded)
            }
            Err(e) => Err(e),
        }
    }

    /// `Ok(None)` when superseded at one of the wait points.
    async fn run(&self, scene: Arc<dyn Scene>, ticket: &Ticket) -> Result<Option<Screenshot>> {
        let rasterizer = tokio::select! {
            r = self.fonts.wait() => r?,
            _ = ticket.superseded() => return Ok(None),
        };

        if self.config.debounce_ms > 0 {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(self.config.debounce_ms)) => {}
                _ = ticket.superseded() => return Ok(None),
            }
        }

        let (tx, rx) = oneshot::channel();
        let job = Job { scene, rasterizer, ticket: ticket.clone() };
        self.cmd_tx
            .send(Command::Render(job, tx))
            .map_err(|_| Error::Other("render worker is gone".into()))?;

        // The pass cannot be interrupted; its result is checked on return.
        let shot = rx
            .await
            .map_err(|e| Error::Other(format!("Render canceled: {}", e)))??;
        Ok(Some(shot))
    }

    /// Decode an image on the worker, memoized by path.
    pub async fn load_image(&self, path: impl Into<PathBuf>) -> Result<Arc<Pixmap>> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Load(path.into(), tx))
            .map_err(|_| Error::Other("render worker is gone".into()))?;
        rx.await
            .map_err(|e| Error::Other(format!("Load canceled: {}", e)))?
    }

    /// Shut down the worker thread.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Close(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::text::HeadlessRasterizer;
    use crate::scene::{CoverInputs, CoverScene};

    fn session(debounce_ms: u64) -> RenderSession {
        let fonts = FontsReady::ready(Arc::new(HeadlessRasterizer::new()));
        let config = RenderConfig { supersample: Some(1), debounce_ms, ..Default::default() };
        RenderSession::new(fonts, config)
    }

    #[tokio::test]
    async fn single_request_is_presented() {
        let s = session(0);
        let out = s.render(Arc::new(CoverScene::default())).await.unwrap();
        assert!(out.is_presented());
        let shot = s.current().unwrap();
        assert_eq!((shot.width, shot.height), (820, 360));
        s.close().await.unwrap();
    }

    #[tokio::test]
    async fn newer_request_wins() {
        let s = session(50);
        let first = Arc::new(CoverScene::new(CoverInputs { source: "A,B".into() }));
        let second = Arc::new(CoverScene::default());
        let (a, b) = tokio::join!(s.render(first), s.render(second));
        assert_eq!(a.unwrap(), RenderOutcome::Superseded);
        let b = b.unwrap();
        let RenderOutcome::Presented(shot) = b else { panic!("latest request not presented") };
        assert_eq!(s.current(), Some(shot));
    }

    #[tokio::test]
    async fn tickets_track_the_latest_generation() {
        let s = session(0);
        let first = s.next_ticket();
        assert!(first.is_current());
        let second = s.next_ticket();
        assert_eq!(second.generation(), first.generation() + 1);
        assert!(!first.is_current());
        assert!(second.is_current());
        tokio::time::timeout(Duration::from_millis(100), first.superseded()).await.unwrap();
        assert!(tokio::time::timeout(Duration::from_millis(20), second.superseded()).await.is_err());
    }

    #[tokio::test]
    async fn waits_for_fonts() {
        let (signal, fonts) = FontsReady::pending();
        let config = RenderConfig { supersample: Some(1), debounce_ms: 0, ..Default::default() };
        let s = RenderSession::new(fonts, config);
        let pending = tokio::spawn({
            let s = s.clone();
            async move { s.render(Arc::new(CoverScene::default())).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(s.current().is_none());
        signal.fire(Arc::new(HeadlessRasterizer::new()));
        assert!(pending.await.unwrap().unwrap().is_presented());
    }
}
