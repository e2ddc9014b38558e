//! Viewer composition root
//!
//! Wires loader, scene graph, camera controller, render loop and backend
//! together and owns the teardown order. Everything here runs on one thread;
//! the only off-thread work is the scene decode behind the [`LoadHandle`].

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::application::{AppEvent, KeyCode, MouseButton};
use crate::assets::loader::{LoadEvent, LoadHandle, LoadedAsset, SceneLoader};
use crate::camera::controller::CameraController;
use crate::camera::registry::CameraRegistry;
use crate::config::ConfigError;
use crate::core::config::ViewerConfig;
use crate::render::backend::{RenderBackend, RenderError};
use crate::render::render_loop::RenderLoop;
use crate::render::resize::ResizeAdapter;
use crate::render::resources::{DisposeReport, ResourceLifecycle};
use crate::scene::scene_manager::SceneGraphManager;

/// Viewer errors
#[derive(Error, Debug)]
pub enum ViewerError {
    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The backend failed to upload or render
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Where the scene asset stands
#[derive(Debug, Clone, PartialEq)]
pub enum AssetStatus {
    /// Decode in progress
    Loading,
    /// Attached and resident
    Ready,
    /// Load failed; the fallback camera stays in use
    Failed(String),
    /// Torn down before the load finished
    Cancelled,
}

/// Result of one [`Viewer::frame`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// A frame was rendered
    Rendered,
    /// The viewer is torn down; nothing ran
    Stopped,
}

/// What the viewer did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event changed viewer state
    Handled,
    /// Unbound, rejected, or arrived after teardown
    Ignored,
    /// The host should close the window and tear down
    Quit,
}

/// Summary of a teardown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Resources released by this call
    pub disposed: DisposeReport,
    /// Frames rendered over the viewer's lifetime
    pub frames_rendered: u64,
    /// False when the viewer was already torn down
    pub performed: bool,
}

/// Interactive single-scene viewer
pub struct Viewer<B: RenderBackend> {
    config: ViewerConfig,
    scene: SceneGraphManager,
    controller: CameraController,
    loader: Option<LoadHandle>,
    status: AssetStatus,
    load_progress: f32,
    render_loop: RenderLoop,
    backend: B,
    listening: bool,
    torn_down: bool,
}

impl<B: RenderBackend> Viewer<B> {
    /// Validate `config`, start loading its scene and render with the fallback camera meanwhile
    pub fn new(config: ViewerConfig, backend: B) -> Result<Self, ViewerError> {
        config.validate()?;

        let (width, height) = backend.surface_extent();
        let aspect = if width > 0 && height > 0 {
            width as f32 / height as f32
        } else {
            config.window.width as f32 / config.window.height as f32
        };

        let controller = CameraController::new(CameraRegistry::fallback(&config.cameras), &config.transition, aspect);
        let scene = SceneGraphManager::new(&config.lighting);
        let render_loop = RenderLoop::new(config.window.target_fps);

        log::info!("Loading scene {}", config.asset.scene_path.display());
        let loader = SceneLoader::spawn(&config.asset.scene_path);

        Ok(Self {
            config,
            scene,
            controller,
            loader: Some(loader),
            status: AssetStatus::Loading,
            load_progress: 0.0,
            render_loop,
            backend,
            listening: true,
            torn_down: false,
        })
    }

    /// Apply pending load results, then advance the camera and render
    pub fn frame(&mut self, now: Instant) -> Result<FrameStatus, ViewerError> {
        if self.torn_down {
            return Ok(FrameStatus::Stopped);
        }

        self.poll_loader();

        let rendered = self
            .render_loop
            .tick(now, &mut self.controller, &self.scene, &mut self.backend)?;
        Ok(if rendered { FrameStatus::Rendered } else { FrameStatus::Stopped })
    }

    /// React to one input or window event
    pub fn handle_event(&mut self, event: AppEvent, now: Instant) -> EventOutcome {
        if !self.listening {
            return EventOutcome::Ignored;
        }

        match event {
            AppEvent::MouseButton {
                button: MouseButton::Left,
                pressed: true,
            }
            | AppEvent::KeyInput {
                key: KeyCode::Space | KeyCode::A,
                pressed: true,
            } => self.trigger(now),
            AppEvent::KeyInput {
                key: KeyCode::R,
                pressed: true,
            } => {
                self.controller.reset();
                EventOutcome::Handled
            }
            AppEvent::KeyInput {
                key: KeyCode::Digit(digit @ 1..=9),
                pressed: true,
            } => match self.controller.jump_to(usize::from(digit - 1)) {
                Ok(()) => EventOutcome::Handled,
                Err(_) => EventOutcome::Ignored,
            },
            AppEvent::KeyInput {
                key: KeyCode::Escape,
                pressed: true,
            }
            | AppEvent::WindowCloseRequested => EventOutcome::Quit,
            AppEvent::WindowResized { width, height } => {
                match ResizeAdapter::on_resize(width, height, &mut self.controller, &mut self.backend) {
                    Ok(()) => EventOutcome::Handled,
                    Err(_) => EventOutcome::Ignored,
                }
            }
            _ => EventOutcome::Ignored,
        }
    }

    /// Stop everything and release the scene's GPU resources
    ///
    /// Order: stop the render loop, stop listening for events, cancel the
    /// load, detach and dispose the asset, detach the surface. Stopping the
    /// loop first keeps a tick from drawing resources that are being freed.
    /// Later calls do nothing and report `performed: false`.
    pub fn teardown(&mut self) -> TeardownReport {
        let frames_rendered = self.render_loop.timer().frame_count();
        if self.torn_down {
            return TeardownReport {
                frames_rendered,
                ..TeardownReport::default()
            };
        }

        self.render_loop.cancel();
        self.listening = false;

        if let Some(mut handle) = self.loader.take() {
            handle.cancel();
        }
        if self.status == AssetStatus::Loading {
            self.status = AssetStatus::Cancelled;
        }

        let mut asset = self.scene.detach();
        let disposed = ResourceLifecycle::dispose(asset.as_mut(), &mut self.backend);

        self.backend.detach_surface();
        self.torn_down = true;

        log::info!(
            "Viewer torn down after {frames_rendered} frames ({} resources released)",
            disposed.total()
        );
        TeardownReport {
            disposed,
            frames_rendered,
            performed: true,
        }
    }

    /// Camera controller
    pub fn camera(&self) -> &CameraController {
        &self.controller
    }

    /// Camera controller, for debugging tools
    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.controller
    }

    /// Scene graph
    pub fn scene(&self) -> &SceneGraphManager {
        &self.scene
    }

    /// Render backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Scene asset status
    pub fn asset_status(&self) -> &AssetStatus {
        &self.status
    }

    /// Last reported load progress in `[0, 1]`
    pub fn load_progress(&self) -> f32 {
        self.load_progress
    }

    /// Whether teardown has run
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Time until the next frame is due
    pub fn time_until_next_frame(&self, now: Instant) -> Duration {
        self.render_loop.time_until_next(now)
    }

    fn trigger(&mut self, now: Instant) -> EventOutcome {
        let Some(target) = self.controller.toggle_target() else {
            log::debug!(
                "Trigger ignored: {} camera(s) registered",
                self.controller.cameras().len()
            );
            return EventOutcome::Ignored;
        };

        match self.controller.arm(target, now) {
            Ok(()) => EventOutcome::Handled,
            Err(_) => EventOutcome::Ignored,
        }
    }

    fn poll_loader(&mut self) {
        let mut terminal = None;
        if let Some(handle) = self.loader.as_mut() {
            while let Some(event) = handle.poll() {
                if let LoadEvent::Progress(fraction) = event {
                    self.load_progress = fraction;
                } else {
                    terminal = Some(event);
                    break;
                }
            }
        }

        match terminal {
            Some(LoadEvent::Loaded(loaded)) => {
                self.loader = None;
                self.apply_loaded(*loaded);
            }
            Some(LoadEvent::Failed(error)) => {
                self.loader = None;
                log::warn!("Continuing with the fallback camera");
                self.status = AssetStatus::Failed(error.to_string());
            }
            _ => {}
        }
    }

    /// Attach the asset, upload it, and rebuild the camera registry from its cameras
    ///
    /// Always settles the status. An upload failure releases whatever was
    /// uploaded and detaches the asset, but the authored cameras are kept.
    fn apply_loaded(&mut self, loaded: LoadedAsset) {
        let cameras = match self
            .scene
            .attach(loaded, &self.config.asset.anchor(), self.config.lighting.shadows)
        {
            Ok(cameras) => cameras,
            Err(error) => {
                log::error!("Failed to attach scene: {error}");
                self.status = AssetStatus::Failed(error.to_string());
                return;
            }
        };

        let residency = match self.scene.asset_mut() {
            Some(asset) => ResourceLifecycle::make_resident(asset, &mut self.backend).map(|_| ()),
            None => Ok(()),
        };

        let aspect = self.controller.projection().aspect;
        let registry = CameraRegistry::build(cameras, &self.config.cameras);
        log::info!("Camera registry ready with {} camera(s)", registry.len());
        self.controller = CameraController::new(registry, &self.config.transition, aspect);

        match residency {
            Ok(()) => {
                self.load_progress = 1.0;
                self.status = AssetStatus::Ready;
            }
            Err(error) => {
                log::error!("Failed to upload scene resources: {error}");
                let mut asset = self.scene.detach();
                ResourceLifecycle::dispose(asset.as_mut(), &mut self.backend);
                self.status = AssetStatus::Failed(error.to_string());
            }
        }
    }
}

impl<B: RenderBackend> Drop for Viewer<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::controller::TransitionState;
    use crate::assets::scene_asset::{GeometryData, MaterialData, TextureData};
    use crate::render::backend::{BackendResult, FrameContext, GpuResources};
    use crate::render::headless::HeadlessBackend;
    use crate::render::resources::{GeometryHandle, MaterialHandle, TextureHandle};
    use std::path::PathBuf;

    /// Headless backend that runs out of memory on geometry uploads
    struct GeometryRejectingBackend(HeadlessBackend);

    impl GpuResources for GeometryRejectingBackend {
        fn upload_geometry(&mut self, _data: &GeometryData) -> BackendResult<GeometryHandle> {
            Err(RenderError::ResourceCreationFailed("out of device memory".to_string()))
        }

        fn upload_material(&mut self, data: &MaterialData) -> BackendResult<MaterialHandle> {
            self.0.upload_material(data)
        }

        fn upload_texture(&mut self, data: &TextureData) -> BackendResult<TextureHandle> {
            self.0.upload_texture(data)
        }

        fn release_geometry(&mut self, handle: GeometryHandle) -> bool {
            self.0.release_geometry(handle)
        }

        fn release_material(&mut self, handle: MaterialHandle) -> bool {
            self.0.release_material(handle)
        }

        fn release_texture(&mut self, handle: TextureHandle) -> bool {
            self.0.release_texture(handle)
        }
    }

    impl RenderBackend for GeometryRejectingBackend {
        fn surface_extent(&self) -> (u32, u32) {
            self.0.surface_extent()
        }

        fn resize_surface(&mut self, width: u32, height: u32) {
            self.0.resize_surface(width, height);
        }

        fn render_frame(&mut self, frame: &FrameContext<'_>) -> BackendResult<()> {
            self.0.render_frame(frame)
        }

        fn detach_surface(&mut self) {
            self.0.detach_surface();
        }
    }

    /// Triangle (0,0,0) (1,0,0) (0,1,0) as little-endian f32
    const TRIANGLE_BUFFER: &str = "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA";

    fn office_document() -> String {
        format!(
            r#"{{
                "asset": {{ "version": "2.0" }},
                "scenes": [{{ "nodes": [0, 1, 2] }}],
                "nodes": [
                    {{ "name": "Desk", "mesh": 0 }},
                    {{ "name": "Side", "camera": 0, "translation": [0.04, 1.24, 0.73] }},
                    {{ "name": "Primary", "camera": 0, "translation": [0.0, 2.0, 5.0] }}
                ],
                "cameras": [{{ "type": "perspective", "perspective": {{ "yfov": 1.0, "znear": 0.1 }} }}],
                "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "material": 0 }}] }}],
                "materials": [{{ "name": "Wood" }}],
                "accessors": [{{
                    "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                    "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
                }}],
                "bufferViews": [{{ "buffer": 0, "byteLength": 36 }}],
                "buffers": [{{ "byteLength": 36, "uri": "{TRIANGLE_BUFFER}" }}]
            }}"#
        )
    }

    fn write_scene(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("scene_viewer_viewer_{name}_{}.gltf", std::process::id()));
        std::fs::write(&path, office_document()).unwrap();
        path
    }

    fn viewer_for(path: PathBuf) -> Viewer<HeadlessBackend> {
        let mut config = ViewerConfig::default();
        config.asset.scene_path = path;
        Viewer::new(config, HeadlessBackend::new(1280, 720)).unwrap()
    }

    /// Render frames until the load settles
    fn settle<B: RenderBackend>(viewer: &mut Viewer<B>) {
        while *viewer.asset_status() == AssetStatus::Loading {
            viewer.frame(Instant::now()).unwrap();
            std::thread::yield_now();
        }
    }

    fn click() -> AppEvent {
        AppEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        }
    }

    #[test]
    fn test_loaded_scene_replaces_fallback_registry() {
        let path = write_scene("loaded");
        let mut viewer = viewer_for(path.clone());
        settle(&mut viewer);
        let _ = std::fs::remove_file(&path);

        assert_eq!(*viewer.asset_status(), AssetStatus::Ready);
        assert_eq!(viewer.load_progress(), 1.0);
        assert!(viewer.scene().is_attached());

        let cameras = viewer.camera().cameras();
        assert_eq!(cameras.len(), 2);
        assert_eq!(cameras[0].name.as_deref(), Some("Primary"));
        assert_eq!(viewer.camera().active_index(), 0);
        assert_eq!(viewer.camera().projection().aspect, 1280.0 / 720.0);

        let resources = viewer.backend().resources();
        assert_eq!(resources.geometry_count(), 1);
        assert_eq!(resources.material_count(), 1);

        assert_eq!(viewer.frame(Instant::now()).unwrap(), FrameStatus::Rendered);
        assert_eq!(viewer.backend().last_frame().map(|stats| stats.draw_count), Some(1));
    }

    #[test]
    fn test_click_arms_and_second_click_is_rejected() {
        let path = write_scene("click");
        let mut viewer = viewer_for(path.clone());
        settle(&mut viewer);
        let _ = std::fs::remove_file(&path);

        let now = Instant::now();
        assert_eq!(viewer.handle_event(click(), now), EventOutcome::Handled);
        assert!(viewer.camera().state().is_animating());
        assert_eq!(viewer.camera().active_index(), 1);

        assert_eq!(viewer.handle_event(click(), now), EventOutcome::Ignored);
        assert_eq!(viewer.camera().active_index(), 1);

        // Releases and unbound keys do nothing
        let release = AppEvent::MouseButton {
            button: MouseButton::Left,
            pressed: false,
        };
        assert_eq!(viewer.handle_event(release, now), EventOutcome::Ignored);

        viewer.frame(now + Duration::from_secs(3)).unwrap();
        assert_eq!(*viewer.camera().state(), TransitionState::Idle);
    }

    #[test]
    fn test_failed_load_keeps_fallback_camera() {
        let mut viewer = viewer_for(std::env::temp_dir().join("scene_viewer_viewer_missing.glb"));
        settle(&mut viewer);

        assert!(matches!(viewer.asset_status(), AssetStatus::Failed(_)));
        assert_eq!(viewer.camera().cameras().len(), 1);
        assert_eq!(viewer.handle_event(click(), Instant::now()), EventOutcome::Ignored);
        assert_eq!(viewer.frame(Instant::now()).unwrap(), FrameStatus::Rendered);
    }

    #[test]
    fn test_upload_failure_settles_as_failed() {
        let path = write_scene("upload");
        let mut config = ViewerConfig::default();
        config.asset.scene_path = path.clone();
        let mut viewer = Viewer::new(config, GeometryRejectingBackend(HeadlessBackend::new(1280, 720))).unwrap();
        settle(&mut viewer);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(viewer.asset_status(), AssetStatus::Failed(_)));
        assert!(!viewer.scene().is_attached());
        assert!(viewer.backend().0.resources().is_empty());

        // Authored cameras survive the failed upload
        assert_eq!(viewer.camera().cameras().len(), 2);
        assert_eq!(viewer.handle_event(click(), Instant::now()), EventOutcome::Handled);

        assert_eq!(viewer.frame(Instant::now()).unwrap(), FrameStatus::Rendered);
        assert_eq!(viewer.backend().0.last_frame().map(|stats| stats.draw_count), Some(0));
        assert!(viewer.teardown().disposed.is_empty());
    }

    #[test]
    fn test_keyboard_controls() {
        let path = write_scene("keys");
        let mut viewer = viewer_for(path.clone());
        settle(&mut viewer);
        let _ = std::fs::remove_file(&path);
        let now = Instant::now();
        let key = |key| AppEvent::KeyInput { key, pressed: true };

        assert_eq!(viewer.handle_event(key(KeyCode::Digit(2)), now), EventOutcome::Handled);
        assert_eq!(viewer.camera().active_index(), 1);
        assert_eq!(viewer.handle_event(key(KeyCode::Digit(9)), now), EventOutcome::Ignored);
        assert_eq!(viewer.handle_event(key(KeyCode::Digit(0)), now), EventOutcome::Ignored);

        assert_eq!(viewer.handle_event(key(KeyCode::Space), now), EventOutcome::Handled);
        assert_eq!(viewer.handle_event(key(KeyCode::R), now), EventOutcome::Handled);
        assert!(!viewer.camera().state().is_animating());

        assert_eq!(viewer.handle_event(key(KeyCode::Escape), now), EventOutcome::Quit);
        assert_eq!(viewer.handle_event(AppEvent::WindowCloseRequested, now), EventOutcome::Quit);
    }

    #[test]
    fn test_resize_event_updates_projection() {
        let mut viewer = viewer_for(std::env::temp_dir().join("scene_viewer_viewer_resize.glb"));
        let now = Instant::now();

        let resized = AppEvent::WindowResized { width: 800, height: 600 };
        assert_eq!(viewer.handle_event(resized, now), EventOutcome::Handled);
        assert_eq!(viewer.camera().projection().aspect, 800.0 / 600.0);
        assert_eq!(viewer.backend().surface_extent(), (800, 600));

        let minimized = AppEvent::WindowResized { width: 0, height: 0 };
        assert_eq!(viewer.handle_event(minimized, now), EventOutcome::Ignored);
        assert_eq!(viewer.camera().projection().aspect, 800.0 / 600.0);
    }

    #[test]
    fn test_teardown_stops_everything_once() {
        let path = write_scene("teardown");
        let mut viewer = viewer_for(path.clone());
        settle(&mut viewer);
        let _ = std::fs::remove_file(&path);

        let report = viewer.teardown();
        assert!(report.performed);
        assert_eq!(report.disposed.geometries, 1);
        assert_eq!(report.disposed.materials, 1);
        assert!(viewer.backend().resources().is_empty());
        assert!(!viewer.backend().is_surface_attached());
        assert!(!viewer.scene().is_attached());

        let frames = viewer.backend().frames_rendered();
        assert_eq!(viewer.frame(Instant::now()).unwrap(), FrameStatus::Stopped);
        assert_eq!(viewer.backend().frames_rendered(), frames);
        assert_eq!(viewer.handle_event(click(), Instant::now()), EventOutcome::Ignored);

        let again = viewer.teardown();
        assert!(!again.performed);
        assert!(again.disposed.is_empty());
        assert!(ResourceLifecycle::dispose(None, &mut HeadlessBackend::new(1, 1)).is_empty());
    }

    #[test]
    fn test_teardown_during_load_discards_result() {
        let path = write_scene("late");
        let mut viewer = viewer_for(path.clone());

        let report = viewer.teardown();
        let _ = std::fs::remove_file(&path);

        assert!(report.disposed.is_empty());
        assert_eq!(*viewer.asset_status(), AssetStatus::Cancelled);
        assert_eq!(viewer.frame(Instant::now()).unwrap(), FrameStatus::Stopped);
        assert!(!viewer.scene().is_attached());
        assert!(viewer.backend().resources().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = ViewerConfig::default();
        config.transition.rotation_delay_fraction = 1.5;
        assert!(matches!(
            Viewer::new(config, HeadlessBackend::new(640, 480)),
            Err(ViewerError::Config(_))
        ));
    }
}
