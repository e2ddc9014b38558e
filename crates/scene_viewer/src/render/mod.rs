//! Rendering system
//!
//! The render backend boundary (`GpuResources`, `RenderBackend`), GPU
//! residency of scene resources, viewport resize handling, and the loop that
//! renders one frame per display refresh.

pub mod backend;
pub mod headless;
pub mod render_loop;
pub mod resize;
pub mod resources;

pub use backend::{BackendResult, FrameContext, GpuResources, RenderBackend, RenderError};
pub use headless::{FrameStats, HeadlessBackend};
pub use render_loop::{RenderLoop, TickSource};
pub use resize::{ResizeAdapter, ResizeError};
pub use resources::{
    DisposeReport, GeometryHandle, MaterialHandle, ResidencyReport, ResourceLifecycle, ResourceRegistry, TextureHandle,
};
