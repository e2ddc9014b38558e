//! Asset management system
//!
//! Scene files are decoded into a CPU-side [`SceneAsset`] off the render
//! thread; GPU residency is tracked on the asset's resources and managed by
//! `render::ResourceLifecycle`.

pub mod gltf_loader;
pub mod loader;
pub mod scene_asset;

pub use loader::{CancelToken, LoadError, LoadEvent, LoadHandle, LoadedAsset, SceneLoader};
pub use scene_asset::{
    GeometryData, GeometryResource, LightKind, LightNode, MaterialData, MaterialResource, MeshNode, NodeKind,
    SceneAsset, SceneNode, SubMesh, TextureData, TextureFormat, TextureResource,
};
