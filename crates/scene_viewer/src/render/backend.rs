//! Backend abstraction traits for the rendering system
//!
//! This module defines the traits that rendering backends must implement.
//! The viewer core only talks to these traits, so it can be driven without
//! a GPU (see `HeadlessBackend`).

use thiserror::Error;

use crate::assets::scene_asset::{GeometryData, MaterialData, TextureData};
use crate::foundation::math::{Mat4, Vec3};
use crate::render::resources::{GeometryHandle, MaterialHandle, TextureHandle};
use crate::scene::scene_graph::RenderQueue;

/// Rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// The render surface was detached or lost
    #[error("Render surface is not attached")]
    SurfaceLost,

    /// A rendering operation failed during execution
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// Resource creation or upload failed
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Camera and scene state for one frame
#[derive(Debug)]
pub struct FrameContext<'a> {
    /// World-to-view matrix of the live camera
    pub view: Mat4,
    /// Projection matrix of the live camera
    pub projection: Mat4,
    /// Eye position of the live camera
    pub camera_position: Vec3,
    /// Draw items and lights
    pub queue: &'a RenderQueue,
}

impl FrameContext<'_> {
    /// Combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// GPU residency of scene resources
///
/// Uploads return typed handles. Releases report whether anything was
/// freed; unknown or already released handles are skipped, never an error.
pub trait GpuResources {
    /// Upload vertex and index buffers
    fn upload_geometry(&mut self, data: &GeometryData) -> BackendResult<GeometryHandle>;

    /// Upload material parameters
    fn upload_material(&mut self, data: &MaterialData) -> BackendResult<MaterialHandle>;

    /// Upload a texture image
    fn upload_texture(&mut self, data: &TextureData) -> BackendResult<TextureHandle>;

    /// Release geometry buffers
    fn release_geometry(&mut self, handle: GeometryHandle) -> bool;

    /// Release a material
    fn release_material(&mut self, handle: MaterialHandle) -> bool;

    /// Release a texture
    fn release_texture(&mut self, handle: TextureHandle) -> bool;
}

/// Main rendering backend trait
pub trait RenderBackend: GpuResources {
    /// Current surface extent (width, height)
    fn surface_extent(&self) -> (u32, u32);

    /// Resize the render surface
    fn resize_surface(&mut self, width: u32, height: u32);

    /// Draw one frame
    fn render_frame(&mut self, frame: &FrameContext<'_>) -> BackendResult<()>;

    /// Detach the render surface from its host; later frames fail with `SurfaceLost`
    fn detach_surface(&mut self);
}
