//! Headless render backend
//!
//! Implements the full backend contract without a graphics API: resources
//! are tracked in a [`ResourceRegistry`], frames are counted, and the last
//! frame's camera matrices are kept for inspection.

use crate::assets::scene_asset::{GeometryData, MaterialData, TextureData};
use crate::foundation::math::Mat4;
use crate::render::backend::{BackendResult, FrameContext, GpuResources, RenderBackend, RenderError};
use crate::render::resources::{GeometryHandle, MaterialHandle, ResourceRegistry, TextureHandle};

/// Summary of the last rendered frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// Number of draw items submitted
    pub draw_count: usize,
    /// Number of lights submitted
    pub light_count: usize,
    /// View-projection matrix used
    pub view_projection: Mat4,
}

/// Backend without a GPU
#[derive(Debug)]
pub struct HeadlessBackend {
    resources: ResourceRegistry,
    extent: (u32, u32),
    surface_attached: bool,
    frames_rendered: u64,
    last_frame: Option<FrameStats>,
}

impl HeadlessBackend {
    /// Create a backend with a surface of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            resources: ResourceRegistry::new(),
            extent: (width, height),
            surface_attached: true,
            frames_rendered: 0,
            last_frame: None,
        }
    }

    /// Resident resource bookkeeping
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Number of frames rendered so far
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Whether the surface is still attached
    pub fn is_surface_attached(&self) -> bool {
        self.surface_attached
    }

    /// Stats of the most recent frame
    pub fn last_frame(&self) -> Option<&FrameStats> {
        self.last_frame.as_ref()
    }
}

impl GpuResources for HeadlessBackend {
    fn upload_geometry(&mut self, data: &GeometryData) -> BackendResult<GeometryHandle> {
        self.resources.upload_geometry(data)
    }

    fn upload_material(&mut self, data: &MaterialData) -> BackendResult<MaterialHandle> {
        self.resources.upload_material(data)
    }

    fn upload_texture(&mut self, data: &TextureData) -> BackendResult<TextureHandle> {
        self.resources.upload_texture(data)
    }

    fn release_geometry(&mut self, handle: GeometryHandle) -> bool {
        self.resources.release_geometry(handle)
    }

    fn release_material(&mut self, handle: MaterialHandle) -> bool {
        self.resources.release_material(handle)
    }

    fn release_texture(&mut self, handle: TextureHandle) -> bool {
        self.resources.release_texture(handle)
    }
}

impl RenderBackend for HeadlessBackend {
    fn surface_extent(&self) -> (u32, u32) {
        self.extent
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        log::trace!("Headless surface resized to {width}x{height}");
        self.extent = (width, height);
    }

    fn render_frame(&mut self, frame: &FrameContext<'_>) -> BackendResult<()> {
        if !self.surface_attached {
            return Err(RenderError::SurfaceLost);
        }

        self.frames_rendered += 1;
        self.last_frame = Some(FrameStats {
            draw_count: frame.queue.draw_count(),
            light_count: frame.queue.lights.len(),
            view_projection: frame.view_projection(),
        });
        Ok(())
    }

    fn detach_surface(&mut self) {
        if self.surface_attached {
            log::debug!("Headless surface detached after {} frames", self.frames_rendered);
        }
        self.surface_attached = false;
    }
}
