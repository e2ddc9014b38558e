//! Asynchronous scene loading
//!
//! `SceneLoader::spawn` decodes a scene file on a worker thread and streams
//! progress plus one terminal result back over a channel. The owning side
//! polls the returned [`LoadHandle`] from the render thread, so loaded data
//! is only ever applied on that thread.
//!
//! The handle carries a cancel token. Once cancelled (or dropped) the handle
//! never yields another event, and the worker stops at its next stage
//! boundary. A result that arrives after teardown is therefore discarded
//! rather than applied to a viewer that no longer exists.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use thiserror::Error;

use crate::assets::gltf_loader;
use crate::assets::scene_asset::SceneAsset;
use crate::camera::config::CameraConfig;
use crate::foundation::time::Stopwatch;

/// Scene loading errors
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid glTF/GLB document
    #[error("Failed to decode glTF: {0}")]
    Gltf(#[from] gltf::Error),

    /// The document declares no scene
    #[error("Scene file contains no scenes")]
    NoScene,

    /// A mesh primitive has no POSITION attribute
    #[error("Missing position data for mesh: {0}")]
    MissingPositions(String),

    /// A mesh needs more than 32-bit indices
    #[error("Mesh {0} exceeds the 32-bit index range")]
    IndexOverflow(String),

    /// A texture points at an image the document does not contain
    #[error("Texture references missing image {0}")]
    MissingImage(usize),

    /// The load was cancelled before it finished
    #[error("Load cancelled")]
    Cancelled,

    /// The worker ended without reporting a result
    #[error("Loader worker terminated without a result")]
    Disconnected,

    /// The worker thread could not be started
    #[error("Failed to start loader worker: {0}")]
    Spawn(String),
}

/// A decoded scene and the cameras it declares
#[derive(Debug)]
pub struct LoadedAsset {
    /// Scene subtree and its resources
    pub scene: SceneAsset,
    /// Cameras in discovery order (possibly empty)
    pub cameras: Vec<CameraConfig>,
}

/// Notification from a running load
#[derive(Debug)]
pub enum LoadEvent {
    /// Fraction completed in `[0, 1]`, never decreasing
    Progress(f32),
    /// Terminal success
    Loaded(Box<LoadedAsset>),
    /// Terminal failure (never retried)
    Failed(LoadError),
}

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an un-cancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(LoadError::Cancelled)` once cancelled
    pub fn check(&self) -> Result<(), LoadError> {
        if self.is_cancelled() {
            Err(LoadError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Starts scene loads
pub struct SceneLoader;

impl SceneLoader {
    /// Load the scene at `path` on a worker thread
    pub fn spawn(path: impl AsRef<Path>) -> LoadHandle {
        let source = path.as_ref().to_path_buf();
        let (sender, receiver) = mpsc::channel();
        let cancel = CancelToken::new();

        let worker_source = source.clone();
        let worker_cancel = cancel.clone();
        let spawned = thread::Builder::new()
            .name("scene-loader".to_string())
            .spawn(move || run_load(&worker_source, &sender, &worker_cancel));

        let mut pending = None;
        if let Err(error) = spawned {
            log::error!("Could not start scene loader for {}: {error}", source.display());
            pending = Some(LoadEvent::Failed(LoadError::Spawn(error.to_string())));
        }

        LoadHandle {
            source,
            receiver,
            cancel,
            pending,
            finished: false,
        }
    }

    /// Load the scene at `path` on the calling thread
    pub fn load_blocking(path: impl AsRef<Path>) -> Result<LoadedAsset, LoadError> {
        gltf_loader::load_scene(path.as_ref(), &mut |_| {}, &CancelToken::new())
    }
}

fn run_load(source: &Path, sender: &mpsc::Sender<LoadEvent>, cancel: &CancelToken) {
    let stopwatch = Stopwatch::start_new();
    let mut last = 0.0_f32;

    let result = gltf_loader::load_scene(
        source,
        &mut |fraction| {
            // Clamp so reported progress never goes backwards
            let fraction = fraction.clamp(last, 1.0);
            if fraction > last {
                last = fraction;
                // Dropped receiver => handle is gone, ignore
                let _ = sender.send(LoadEvent::Progress(fraction));
            }
        },
        cancel,
    );

    if cancel.is_cancelled() {
        log::debug!("Scene load of {} cancelled", source.display());
        return;
    }

    let event = match result {
        Ok(asset) => {
            log::info!(
                "Loaded scene {} in {:.1} ms ({} meshes, {} cameras)",
                source.display(),
                stopwatch.elapsed_millis(),
                asset.scene.mesh_count(),
                asset.cameras.len()
            );
            LoadEvent::Loaded(Box::new(asset))
        }
        Err(error) => LoadEvent::Failed(error),
    };
    let _ = sender.send(event);
}

/// Receiving end of one scene load
pub struct LoadHandle {
    source: PathBuf,
    receiver: mpsc::Receiver<LoadEvent>,
    cancel: CancelToken,
    pending: Option<LoadEvent>,
    finished: bool,
}

impl LoadHandle {
    /// Path being loaded
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Next event, if one is ready; never blocks
    ///
    /// Returns `None` after cancellation and after the terminal event.
    pub fn poll(&mut self) -> Option<LoadEvent> {
        if self.finished || self.cancel.is_cancelled() {
            return None;
        }

        let event = match self.pending.take() {
            Some(event) => event,
            None => match self.receiver.try_recv() {
                Ok(event) => event,
                Err(mpsc::TryRecvError::Empty) => return None,
                Err(mpsc::TryRecvError::Disconnected) => LoadEvent::Failed(LoadError::Disconnected),
            },
        };

        self.observe(&event);
        Some(event)
    }

    /// Block until the load finishes, discarding progress
    pub fn wait(&mut self) -> Result<LoadedAsset, LoadError> {
        loop {
            if self.finished || self.cancel.is_cancelled() {
                return Err(LoadError::Cancelled);
            }

            let event = match self.pending.take() {
                Some(event) => event,
                None => self
                    .receiver
                    .recv()
                    .unwrap_or_else(|_| LoadEvent::Failed(LoadError::Disconnected)),
            };
            self.observe(&event);

            match event {
                LoadEvent::Progress(_) => {}
                LoadEvent::Loaded(asset) => return Ok(*asset),
                LoadEvent::Failed(error) => return Err(error),
            }
        }
    }

    /// Invalidate this load; no further events are delivered
    pub fn cancel(&mut self) {
        if !self.cancel.is_cancelled() && !self.finished {
            log::debug!("Cancelling scene load of {}", self.source.display());
        }
        self.cancel.cancel();
    }

    /// Whether the terminal event was delivered or the load was cancelled
    pub fn is_done(&self) -> bool {
        self.finished || self.cancel.is_cancelled()
    }

    /// Token shared with the worker
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn observe(&mut self, event: &LoadEvent) {
        match event {
            LoadEvent::Progress(fraction) => {
                log::debug!("Loading {}: {:.0}%", self.source.display(), fraction * 100.0);
            }
            LoadEvent::Loaded(_) => self.finished = true,
            LoadEvent::Failed(error) => {
                log::error!("Failed to load scene {}: {error}", self.source.display());
                self.finished = true;
            }
        }
    }
}

impl Drop for LoadHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
