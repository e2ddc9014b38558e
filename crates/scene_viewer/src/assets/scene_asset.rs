//! CPU-side scene asset model
//!
//! A `SceneAsset` is the node tree decoded from one scene file together with
//! the material and texture tables its meshes reference. Each GPU-backed
//! resource carries an optional handle: `None` until it is made resident,
//! and `None` again once released. Taking the handle out of the slot is what
//! makes every release idempotent.

use crate::foundation::math::Transform;
use crate::render::resources::{GeometryHandle, MaterialHandle, TextureHandle};

/// Root of a loaded scene plus its shared resource tables
#[derive(Debug)]
pub struct SceneAsset {
    /// Root node of the asset subtree
    pub root: SceneNode,

    /// Materials referenced by mesh nodes (by index)
    pub materials: Vec<MaterialResource>,

    /// Textures referenced by materials (by index)
    pub textures: Vec<TextureResource>,

    disposed: bool,
}

impl SceneAsset {
    /// Create an asset from a node tree and its resource tables
    pub fn new(root: SceneNode, materials: Vec<MaterialResource>, textures: Vec<TextureResource>) -> Self {
        Self {
            root,
            materials,
            textures,
            disposed: false,
        }
    }

    /// Whether the asset's resources have been released
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub(crate) fn mark_disposed(&mut self) {
        self.disposed = true;
    }

    /// Number of mesh nodes in the tree
    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.root.walk(&Transform::identity(), &mut |node, _| {
            if matches!(node.kind, NodeKind::Mesh(_)) {
                count += 1;
            }
        });
        count
    }

    /// Visit every mesh node mutably, depth first
    pub fn for_each_mesh_mut(&mut self, mut f: impl FnMut(&mut MeshNode)) {
        self.root.walk_mut(&mut |node| {
            if let NodeKind::Mesh(mesh) = &mut node.kind {
                f(mesh);
            }
        });
    }
}

/// One node of the scene tree
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Authored node name
    pub name: Option<String>,

    /// Transform relative to the parent node
    pub transform: Transform,

    /// What the node carries
    pub kind: NodeKind,

    /// Child nodes
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Create a node without children
    pub fn new(name: Option<String>, transform: Transform, kind: NodeKind) -> Self {
        Self {
            name,
            transform,
            kind,
            children: Vec::new(),
        }
    }

    /// Create an empty grouping node
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(Some(name.into()), Transform::identity(), NodeKind::Group)
    }

    /// Builder pattern: add a child
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first walk passing each node with its world transform
    pub fn walk<'a>(&'a self, parent_world: &Transform, f: &mut impl FnMut(&'a Self, &Transform)) {
        let world = parent_world.combine(&self.transform);
        f(self, &world);
        for child in &self.children {
            child.walk(&world, f);
        }
    }

    /// Depth-first mutable walk
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Self)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }
}

/// Payload of a scene node
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Pure transform node
    Group,
    /// Renderable mesh
    Mesh(MeshNode),
    /// Punctual light
    Light(LightNode),
    /// Authored camera position (its configuration lives in the camera registry)
    Camera,
}

/// Mesh node: one geometry drawn with one or more materials
#[derive(Debug, Clone)]
pub struct MeshNode {
    /// Vertex and index data
    pub geometry: GeometryResource,

    /// Material table indices, one per material slot (multi-material meshes have several)
    pub materials: Vec<usize>,

    /// Casts shadows
    pub cast_shadow: bool,

    /// Receives shadows
    pub receive_shadow: bool,
}

/// Geometry data plus its GPU residency
#[derive(Debug, Clone)]
pub struct GeometryResource {
    /// CPU-side vertex data
    pub data: GeometryData,
    /// GPU buffer handle while resident
    pub handle: Option<GeometryHandle>,
}

impl GeometryResource {
    /// Wrap CPU data that is not yet resident
    pub fn new(data: GeometryData) -> Self {
        Self { data, handle: None }
    }
}

/// Vertex streams and index ranges
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals (same length as positions)
    pub normals: Vec<[f32; 3]>,
    /// First UV set (same length as positions)
    pub tex_coords: Vec<[f32; 2]>,
    /// Triangle list indices
    pub indices: Vec<u32>,
    /// Index ranges drawn with distinct material slots
    pub groups: Vec<SubMesh>,
}

impl GeometryData {
    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Approximate size of the vertex and index buffers in bytes
    pub fn byte_size(&self) -> usize {
        self.positions.len() * std::mem::size_of::<[f32; 3]>()
            + self.normals.len() * std::mem::size_of::<[f32; 3]>()
            + self.tex_coords.len() * std::mem::size_of::<[f32; 2]>()
            + self.indices.len() * std::mem::size_of::<u32>()
    }
}

/// Contiguous index range drawn with one material slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubMesh {
    /// First index in the index buffer
    pub index_start: u32,
    /// Number of indices
    pub index_count: u32,
    /// Position in the owning mesh's `materials` list
    pub material_slot: usize,
}

/// Material data plus its GPU residency
#[derive(Debug, Clone)]
pub struct MaterialResource {
    /// Material parameters
    pub data: MaterialData,
    /// GPU handle while resident
    pub handle: Option<MaterialHandle>,
}

impl MaterialResource {
    /// Wrap material data that is not yet resident
    pub fn new(data: MaterialData) -> Self {
        Self { data, handle: None }
    }
}

/// Metallic-roughness material parameters
#[derive(Debug, Clone)]
pub struct MaterialData {
    /// Authored name
    pub name: Option<String>,
    /// Linear RGBA base color
    pub base_color: [f32; 4],
    /// Metalness factor
    pub metallic: f32,
    /// Roughness factor
    pub roughness: f32,
    /// Emissive color
    pub emissive: [f32; 3],
    /// Render back faces
    pub double_sided: bool,
    /// Texture table indices bound to this material
    pub textures: Vec<usize>,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: None,
            base_color: [1.0, 1.0, 1.0, 1.0],
            metallic: 1.0,
            roughness: 1.0,
            emissive: [0.0, 0.0, 0.0],
            double_sided: false,
            textures: Vec::new(),
        }
    }
}

/// Texture data plus its GPU residency
#[derive(Debug, Clone)]
pub struct TextureResource {
    /// Decoded pixels
    pub data: TextureData,
    /// GPU handle while resident
    pub handle: Option<TextureHandle>,
}

impl TextureResource {
    /// Wrap texture data that is not yet resident
    pub fn new(data: TextureData) -> Self {
        Self { data, handle: None }
    }
}

/// Decoded image
#[derive(Debug, Clone)]
pub struct TextureData {
    /// Authored name
    pub name: Option<String>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel layout
    pub format: TextureFormat,
    /// Raw pixel bytes
    pub pixels: Vec<u8>,
}

/// Pixel layouts the viewer distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// One 8-bit channel
    R8,
    /// Two 8-bit channels
    Rg8,
    /// Three 8-bit channels
    Rgb8,
    /// Four 8-bit channels
    Rgba8,
    /// 16-bit or floating point layouts
    Other,
}

/// Punctual light carried by the asset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightNode {
    /// Light type
    pub kind: LightKind,
    /// Linear RGB color
    pub color: [f32; 3],
    /// Intensity in the asset's units
    pub intensity: f32,
    /// Attenuation range, unlimited when absent
    pub range: Option<f32>,
}

/// Punctual light types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Infinitely distant light along the node's -Z
    Directional,
    /// Omnidirectional point light
    Point,
    /// Cone light along the node's -Z
    Spot {
        /// Inner cone angle in radians
        inner_cone_angle: f32,
        /// Outer cone angle in radians
        outer_cone_angle: f32,
    },
}
