//! Scene Manager
//!
//! Owns the live scene graph and the attach/detach lifecycle of the loaded
//! asset subtree. Attaching recenters the asset so a fixed world anchor
//! becomes its local origin. Detaching only removes the subtree; releasing
//! its GPU resources is `render::ResourceLifecycle`'s job.

use thiserror::Error;

use crate::assets::loader::LoadedAsset;
use crate::assets::scene_asset::SceneAsset;
use crate::camera::config::CameraConfig;
use crate::core::config::LightingConfig;
use crate::foundation::math::Vec3;
use crate::scene::lighting::LightingEnvironment;
use crate::scene::scene_graph::{RenderQueue, SceneGraph};

/// Scene graph errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    /// An asset was already attached during this viewer's lifetime
    #[error("an asset has already been attached to the scene")]
    AlreadyAttached,
}

/// Scene Manager - owns the live graph and the asset subtree lifecycle
#[derive(Debug)]
pub struct SceneGraphManager {
    graph: SceneGraph,
    attached_once: bool,
}

impl SceneGraphManager {
    /// Create a scene with the lighting rig selected by `lighting`
    pub fn new(lighting: &LightingConfig) -> Self {
        let environment = if lighting.enabled {
            LightingEnvironment::viewer_default()
        } else {
            LightingEnvironment::new()
        };

        Self {
            graph: SceneGraph::new(environment),
            attached_once: false,
        }
    }

    /// Attach a loaded asset, recentered on `anchor`
    ///
    /// The asset root is translated by `-anchor` and the discovered cameras
    /// are moved by the same offset, so they keep framing the same content.
    /// Returns those cameras. Only the first call succeeds.
    ///
    /// # Arguments
    /// * `loaded` - Decoded scene and its cameras
    /// * `anchor` - World point that becomes the asset's local origin
    /// * `shadows` - Mark every mesh as shadow caster and receiver
    pub fn attach(&mut self, loaded: LoadedAsset, anchor: &Vec3, shadows: bool) -> Result<Vec<CameraConfig>, SceneError> {
        if self.attached_once {
            log::warn!("Ignoring second scene attach");
            return Err(SceneError::AlreadyAttached);
        }

        let LoadedAsset { mut scene, cameras } = loaded;
        scene.root.transform.position -= anchor;

        if shadows {
            scene.for_each_mesh_mut(|mesh| {
                mesh.cast_shadow = true;
                mesh.receive_shadow = true;
            });
        }

        let offset = -anchor;
        let cameras = cameras.iter().map(|camera| camera.translated(&offset)).collect();

        log::info!(
            "Attached scene ({} meshes) with anchor {:?}",
            scene.mesh_count(),
            anchor
        );
        self.graph.insert(scene);
        self.attached_once = true;
        Ok(cameras)
    }

    /// Remove the asset subtree without releasing its resources
    pub fn detach(&mut self) -> Option<SceneAsset> {
        let asset = self.graph.take();
        if asset.is_some() {
            log::debug!("Detached scene asset");
        }
        asset
    }

    /// Whether an asset is currently attached
    pub fn is_attached(&self) -> bool {
        self.graph.asset().is_some()
    }

    /// Attached asset, mutably
    pub fn asset_mut(&mut self) -> Option<&mut SceneAsset> {
        self.graph.asset_mut()
    }

    /// The live scene graph
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Draw items and lights for the current frame
    pub fn render_queue(&self) -> RenderQueue {
        self.graph.collect()
    }
}
