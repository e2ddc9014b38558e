//! Scene management
//!
//! The live scene graph (lighting environment plus the attached asset
//! subtree) and the manager that owns its attach/detach lifecycle.

pub mod lighting;
pub mod scene_graph;
pub mod scene_manager;

pub use lighting::{Light, LightType, LightingEnvironment, ShadowSettings};
pub use scene_graph::{DrawItem, RenderQueue, SceneGraph};
pub use scene_manager::{SceneError, SceneGraphManager};
