//! # Scene Viewer
//!
//! Interactive viewer core for a single pre-authored 3D scene.
//!
//! ## Features
//!
//! - **Camera Transitions**: Eased, time-based moves between authored viewpoints
//! - **Asynchronous Loading**: glTF/GLB scenes decoded off the render thread
//! - **Resource Lifecycle**: Idempotent release of GPU-resident scene resources
//! - **Backend Agnostic**: Rendering goes through the `RenderBackend` trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_viewer::prelude::*;
//! use std::time::Instant;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ViewerConfig::default();
//!     let backend = HeadlessBackend::new(config.window.width, config.window.height);
//!     let mut viewer = Viewer::new(config, backend)?;
//!
//!     // One iteration per display refresh
//!     viewer.frame(Instant::now())?;
//!     viewer.handle_event(AppEvent::MouseButton { button: MouseButton::Left, pressed: true }, Instant::now());
//!
//!     viewer.teardown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod foundation;
pub mod config;
pub mod assets;
pub mod scene;
pub mod camera;
pub mod render;

mod application;
mod viewer;

pub use application::{AppEvent, KeyCode, MouseButton};
pub use viewer::{AssetStatus, EventOutcome, FrameStatus, TeardownReport, Viewer, ViewerError};

/// Common imports for viewer users
pub mod prelude {
    pub use crate::{
        AppEvent, KeyCode, MouseButton,
        AssetStatus, EventOutcome, FrameStatus, Viewer, ViewerError,
        foundation::{
            math::{Vec3, Quat, Mat4, Transform},
            time::{Clock, ManualClock, SystemClock, Timer, Stopwatch},
        },
        assets::{LoadedAsset, LoadError, LoadEvent, LoadHandle, SceneLoader},
        camera::{CameraConfig, CameraController, CameraPose, CameraRegistry, TransitionState},
        render::{HeadlessBackend, RenderBackend, ResizeAdapter, ResourceLifecycle},
        scene::SceneGraphManager,
        core::config::ViewerConfig,
        config::Config,
    };
}
