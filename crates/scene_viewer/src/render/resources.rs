//! GPU Resource Tracking and Lifecycle Management
//!
//! **SEPARATION OF CONCERNS**:
//! - `ResourceRegistry`: tracks which resources are resident, by handle
//! - `ResourceLifecycle`: walks a scene asset and uploads or releases its
//!   geometry, materials and textures through a `GpuResources` implementation
//! - `SceneGraphManager`: attaches and detaches the subtree, never frees
//!
//! Every resource slot on the asset holds `Option<Handle>`. Release takes
//! the handle out of its slot before handing it to the backend, so a second
//! dispose finds nothing to release and reports zero.

use slotmap::SlotMap;

use crate::assets::scene_asset::{GeometryData, MaterialData, NodeKind, SceneAsset, TextureData};
use crate::render::backend::{BackendResult, GpuResources};

slotmap::new_key_type! {
    /// Handle of resident geometry buffers
    pub struct GeometryHandle;
    /// Handle of a resident material
    pub struct MaterialHandle;
    /// Handle of a resident texture
    pub struct TextureHandle;
}

/// Bookkeeping entry for resident geometry
#[derive(Debug, Clone, Copy)]
pub struct GeometryEntry {
    /// Number of vertices
    pub vertex_count: usize,
    /// Number of indices
    pub index_count: usize,
    /// Buffer size in bytes
    pub bytes: usize,
}

/// Bookkeeping entry for a resident texture
#[derive(Debug, Clone, Copy)]
pub struct TextureEntry {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel data size in bytes
    pub bytes: usize,
}

/// Residency registry
///
/// CPU-side record of what a backend holds. Backends without real GPU
/// objects (the headless backend, tests) use it as their whole resource store.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    geometry: SlotMap<GeometryHandle, GeometryEntry>,
    materials: SlotMap<MaterialHandle, Option<String>>,
    textures: SlotMap<TextureHandle, TextureEntry>,
}

impl ResourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resident geometries
    pub fn geometry_count(&self) -> usize {
        self.geometry.len()
    }

    /// Number of resident materials
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Number of resident textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Whether nothing is resident
    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty() && self.materials.is_empty() && self.textures.is_empty()
    }

    /// Total resident bytes of geometry and textures
    pub fn resident_bytes(&self) -> usize {
        self.geometry.values().map(|entry| entry.bytes).sum::<usize>()
            + self.textures.values().map(|entry| entry.bytes).sum::<usize>()
    }

    /// Bookkeeping for resident geometry
    pub fn geometry(&self, handle: GeometryHandle) -> Option<&GeometryEntry> {
        self.geometry.get(handle)
    }
}

impl GpuResources for ResourceRegistry {
    fn upload_geometry(&mut self, data: &GeometryData) -> BackendResult<GeometryHandle> {
        Ok(self.geometry.insert(GeometryEntry {
            vertex_count: data.vertex_count(),
            index_count: data.indices.len(),
            bytes: data.byte_size(),
        }))
    }

    fn upload_material(&mut self, data: &MaterialData) -> BackendResult<MaterialHandle> {
        Ok(self.materials.insert(data.name.clone()))
    }

    fn upload_texture(&mut self, data: &TextureData) -> BackendResult<TextureHandle> {
        Ok(self.textures.insert(TextureEntry {
            width: data.width,
            height: data.height,
            bytes: data.pixels.len(),
        }))
    }

    fn release_geometry(&mut self, handle: GeometryHandle) -> bool {
        self.geometry.remove(handle).is_some()
    }

    fn release_material(&mut self, handle: MaterialHandle) -> bool {
        self.materials.remove(handle).is_some()
    }

    fn release_texture(&mut self, handle: TextureHandle) -> bool {
        self.textures.remove(handle).is_some()
    }
}

/// Counts of resources released by one dispose call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisposeReport {
    /// Geometry buffers released
    pub geometries: usize,
    /// Materials released
    pub materials: usize,
    /// Textures released
    pub textures: usize,
}

impl DisposeReport {
    /// Whether nothing was released
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Total number of released resources
    pub fn total(&self) -> usize {
        self.geometries + self.materials + self.textures
    }
}

/// Counts of resources uploaded by `make_resident`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResidencyReport {
    /// Geometry buffers uploaded
    pub geometries: usize,
    /// Materials uploaded
    pub materials: usize,
    /// Textures uploaded
    pub textures: usize,
}

/// Upload and release of a scene asset's GPU resources
pub struct ResourceLifecycle;

impl ResourceLifecycle {
    /// Upload every not yet resident resource of `asset`
    ///
    /// Resources that already hold a handle are left alone, so calling this
    /// twice uploads nothing the second time. A disposed asset is never
    /// made resident again.
    pub fn make_resident(asset: &mut SceneAsset, gpu: &mut dyn GpuResources) -> BackendResult<ResidencyReport> {
        let mut report = ResidencyReport::default();
        if asset.is_disposed() {
            log::warn!("Refusing to upload a disposed scene asset");
            return Ok(report);
        }

        for texture in &mut asset.textures {
            if texture.handle.is_none() {
                texture.handle = Some(gpu.upload_texture(&texture.data)?);
                report.textures += 1;
            }
        }

        for material in &mut asset.materials {
            if material.handle.is_none() {
                material.handle = Some(gpu.upload_material(&material.data)?);
                report.materials += 1;
            }
        }

        let mut result = Ok(());
        asset.for_each_mesh_mut(|mesh| {
            if result.is_err() || mesh.geometry.handle.is_some() {
                return;
            }
            match gpu.upload_geometry(&mesh.geometry.data) {
                Ok(handle) => {
                    mesh.geometry.handle = Some(handle);
                    report.geometries += 1;
                }
                Err(error) => result = Err(error),
            }
        });
        result?;

        log::debug!(
            "Scene resident: {} geometries, {} materials, {} textures uploaded",
            report.geometries,
            report.materials,
            report.textures
        );
        Ok(report)
    }

    /// Release every GPU resource reachable from `asset`
    ///
    /// Covers each mesh's geometry, every material in its material list
    /// (multi-material meshes included) and the textures those materials
    /// bind. Absent or already released resources are skipped. `None` and
    /// already disposed assets are no-ops that return an empty report.
    pub fn dispose(asset: Option<&mut SceneAsset>, gpu: &mut dyn GpuResources) -> DisposeReport {
        let mut report = DisposeReport::default();
        let Some(asset) = asset else {
            return report;
        };
        if asset.is_disposed() {
            log::debug!("Scene asset already disposed");
            return report;
        }

        let SceneAsset {
            root,
            materials,
            textures,
            ..
        } = &mut *asset;

        root.walk_mut(&mut |node| {
            let NodeKind::Mesh(mesh) = &mut node.kind else {
                return;
            };

            if let Some(handle) = mesh.geometry.handle.take() {
                if gpu.release_geometry(handle) {
                    report.geometries += 1;
                }
            }

            for &index in &mesh.materials {
                let Some(material) = materials.get_mut(index) else {
                    continue;
                };
                if let Some(handle) = material.handle.take() {
                    if gpu.release_material(handle) {
                        report.materials += 1;
                    }
                }
                for &texture_index in &material.data.textures {
                    let Some(texture) = textures.get_mut(texture_index) else {
                        continue;
                    };
                    if let Some(handle) = texture.handle.take() {
                        if gpu.release_texture(handle) {
                            report.textures += 1;
                        }
                    }
                }
            }
        });

        // Uploaded but never bound by a mesh
        for material in materials.iter_mut() {
            if let Some(handle) = material.handle.take() {
                if gpu.release_material(handle) {
                    report.materials += 1;
                }
            }
        }
        for texture in textures.iter_mut() {
            if let Some(handle) = texture.handle.take() {
                if gpu.release_texture(handle) {
                    report.textures += 1;
                }
            }
        }

        asset.mark_disposed();
        log::info!(
            "Released scene resources: {} geometries, {} materials, {} textures",
            report.geometries,
            report.materials,
            report.textures
        );
        report
    }
}
