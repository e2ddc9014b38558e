//! Live scene graph
//!
//! The root of everything the viewer renders: the lighting environment plus
//! at most one attached asset subtree.

use crate::assets::scene_asset::{NodeKind, SceneAsset};
use crate::foundation::math::{Mat4, Transform};
use crate::render::resources::{GeometryHandle, MaterialHandle};
use crate::scene::lighting::{Light, LightingEnvironment};

/// One resident mesh to draw this frame
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    /// Object-to-world matrix
    pub world: Mat4,
    /// Resident geometry buffers
    pub geometry: GeometryHandle,
    /// Material handle per material slot (`None` when not resident)
    pub materials: Vec<Option<MaterialHandle>>,
    /// Casts shadows
    pub cast_shadow: bool,
    /// Receives shadows
    pub receive_shadow: bool,
}

/// Everything a backend needs to draw one frame of the scene
#[derive(Debug, Clone, Default)]
pub struct RenderQueue {
    /// Meshes with resident geometry
    pub draws: Vec<DrawItem>,
    /// Environment lights followed by the asset's lights
    pub lights: Vec<Light>,
}

impl RenderQueue {
    /// Get the number of draw items
    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }
}

/// Root scene graph
#[derive(Debug, Default)]
pub struct SceneGraph {
    environment: LightingEnvironment,
    asset: Option<SceneAsset>,
}

impl SceneGraph {
    /// Create a graph with the given lighting and no asset
    pub fn new(environment: LightingEnvironment) -> Self {
        Self {
            environment,
            asset: None,
        }
    }

    /// Lighting environment
    pub fn environment(&self) -> &LightingEnvironment {
        &self.environment
    }

    /// Attached asset subtree
    pub fn asset(&self) -> Option<&SceneAsset> {
        self.asset.as_ref()
    }

    /// Attached asset subtree, mutably
    pub fn asset_mut(&mut self) -> Option<&mut SceneAsset> {
        self.asset.as_mut()
    }

    pub(crate) fn insert(&mut self, asset: SceneAsset) {
        self.asset = Some(asset);
    }

    pub(crate) fn take(&mut self) -> Option<SceneAsset> {
        self.asset.take()
    }

    /// Collect draw items and lights for the current frame
    ///
    /// Meshes whose geometry is not resident are skipped.
    pub fn collect(&self) -> RenderQueue {
        let mut queue = RenderQueue {
            draws: Vec::new(),
            lights: self.environment.lights.clone(),
        };

        let Some(asset) = &self.asset else {
            return queue;
        };

        asset.root.walk(&Transform::identity(), &mut |node, world| match &node.kind {
            NodeKind::Mesh(mesh) => {
                if let Some(geometry) = mesh.geometry.handle {
                    queue.draws.push(DrawItem {
                        world: world.to_matrix(),
                        geometry,
                        materials: mesh
                            .materials
                            .iter()
                            .map(|&index| asset.materials.get(index).and_then(|material| material.handle))
                            .collect(),
                        cast_shadow: mesh.cast_shadow,
                        receive_shadow: mesh.receive_shadow,
                    });
                }
            }
            NodeKind::Light(light) => queue.lights.push(Light::from_node(light, world)),
            NodeKind::Group | NodeKind::Camera => {}
        });

        queue
    }
}
