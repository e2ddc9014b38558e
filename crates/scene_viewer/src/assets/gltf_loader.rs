//! glTF/GLB scene decoding
//!
//! Converts one glTF document into a [`SceneAsset`] plus the cameras it
//! declares. Extracts:
//! - Mesh nodes, with every primitive of a mesh merged into one geometry
//!   whose index ranges keep their own material slot
//! - Materials and the textures they bind
//! - Lights from the `KHR_lights_punctual` extension
//! - Perspective cameras with their world pose and projection

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::assets::loader::{CancelToken, LoadError, LoadedAsset};
use crate::assets::scene_asset::{
    GeometryData, GeometryResource, LightKind, LightNode, MaterialData, MaterialResource, MeshNode, NodeKind,
    SceneAsset, SceneNode, SubMesh, TextureData, TextureFormat, TextureResource,
};
use crate::camera::config::{CameraConfig, CameraPose, ProjectionParams};
use crate::foundation::math::Transform;

const READ_CHUNK: usize = 64 * 1024;

/// Decode the scene file at `path`
///
/// `progress` receives fractions in `[0, 1]`, never decreasing. Reading the
/// file covers the first half; parsing and conversion the rest. The cancel
/// token is checked between stages.
pub fn load_scene(
    path: &Path,
    progress: &mut dyn FnMut(f32),
    cancel: &CancelToken,
) -> Result<LoadedAsset, LoadError> {
    let bytes = read_with_progress(path, progress, cancel)?;

    let gltf = gltf::Gltf::from_slice(&bytes)?;
    progress(0.6);
    cancel.check()?;

    let base = path.parent();
    let gltf::Gltf { document, blob } = gltf;
    let buffers = gltf::import_buffers(&document, base, blob)?;
    progress(0.7);
    cancel.check()?;

    let images = gltf::import_images(&document, base, &buffers)?;
    progress(0.8);
    cancel.check()?;

    let asset = convert_document(&document, &buffers, &images)?;
    progress(1.0);
    Ok(asset)
}

fn read_with_progress(path: &Path, progress: &mut dyn FnMut(f32), cancel: &CancelToken) -> Result<Vec<u8>, LoadError> {
    let mut file = File::open(path)?;
    let total = file.metadata()?.len().max(1) as f32;

    let mut bytes = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        cancel.check()?;
        let read = file.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..read]);
        progress((bytes.len() as f32 / total).min(1.0) * 0.5);
    }

    Ok(bytes)
}

/// Convert an already imported document
pub fn convert_document(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
) -> Result<LoadedAsset, LoadError> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(LoadError::NoScene)?;

    let textures = document
        .textures()
        .map(|texture| convert_texture(&texture, images))
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder = SceneBuilder {
        buffers,
        materials: document.materials().map(|material| MaterialResource::new(convert_material(&material))).collect(),
        default_material: None,
        cameras: Vec::new(),
    };

    let mut root = SceneNode::group(scene.name().unwrap_or("Scene"));
    for node in scene.nodes() {
        root.children.push(builder.convert_node(&node, &Transform::identity())?);
    }

    let asset = SceneAsset::new(root, builder.materials, textures);
    log::debug!(
        "Converted glTF scene: {} meshes, {} materials, {} textures, {} cameras",
        asset.mesh_count(),
        asset.materials.len(),
        asset.textures.len(),
        builder.cameras.len()
    );

    Ok(LoadedAsset {
        scene: asset,
        cameras: builder.cameras,
    })
}

struct SceneBuilder<'a> {
    buffers: &'a [gltf::buffer::Data],
    materials: Vec<MaterialResource>,
    default_material: Option<usize>,
    cameras: Vec<CameraConfig>,
}

impl SceneBuilder<'_> {
    fn convert_node(&mut self, node: &gltf::Node, parent_world: &Transform) -> Result<SceneNode, LoadError> {
        let (translation, rotation, scale) = node.transform().decomposed();
        let local = Transform::from_decomposed(translation, rotation, scale);
        let world = parent_world.combine(&local);
        let name = node.name().map(str::to_string);

        if let Some(camera) = node.camera() {
            let camera_name = name.clone().or_else(|| camera.name().map(str::to_string));
            self.cameras.push(convert_camera(&camera, camera_name, &world));
        }

        let kind = if let Some(mesh) = node.mesh() {
            NodeKind::Mesh(self.convert_mesh(&mesh)?)
        } else if let Some(light) = node.light() {
            NodeKind::Light(convert_light(&light))
        } else if node.camera().is_some() {
            NodeKind::Camera
        } else {
            NodeKind::Group
        };

        let mut scene_node = SceneNode::new(name, local, kind);
        for child in node.children() {
            scene_node.children.push(self.convert_node(&child, &world)?);
        }
        Ok(scene_node)
    }

    fn convert_mesh(&mut self, mesh: &gltf::Mesh) -> Result<MeshNode, LoadError> {
        let mesh_name = mesh.name().unwrap_or("unnamed").to_string();
        let buffers = self.buffers;

        let mut data = GeometryData::default();
        let mut materials: Vec<usize> = Vec::new();

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!("Skipping non-triangle primitive in mesh {mesh_name}");
                continue;
            }

            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .ok_or_else(|| LoadError::MissingPositions(mesh_name.clone()))?
                .collect();
            let count = positions.len();
            let base = to_index(data.positions.len(), &mesh_name)?;

            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map_or_else(|| vec![[0.0, 1.0, 0.0]; count], Iterator::collect);
            let tex_coords: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map_or_else(|| vec![[0.0, 0.0]; count], |coords| coords.into_f32().collect());

            let index_start = to_index(data.indices.len(), &mesh_name)?;
            match reader.read_indices() {
                Some(indices) => data.indices.extend(indices.into_u32().map(|index| index + base)),
                None => {
                    let end = to_index(count, &mesh_name)?;
                    data.indices.extend((0..end).map(|index| index + base));
                }
            }
            let index_count = to_index(data.indices.len(), &mesh_name)? - index_start;

            let material = match primitive.material().index() {
                Some(index) => index,
                None => self.default_material(),
            };
            let material_slot = materials.iter().position(|&m| m == material).unwrap_or_else(|| {
                materials.push(material);
                materials.len() - 1
            });

            data.positions.extend(positions);
            data.normals.extend(normals);
            data.tex_coords.extend(tex_coords);
            data.groups.push(SubMesh {
                index_start,
                index_count,
                material_slot,
            });
        }

        log::trace!(
            "Mesh {mesh_name}: {} vertices, {} groups, {} material(s)",
            data.vertex_count(),
            data.groups.len(),
            materials.len()
        );

        Ok(MeshNode {
            geometry: GeometryResource::new(data),
            materials,
            cast_shadow: false,
            receive_shadow: false,
        })
    }

    /// Index of the material used by primitives that reference none
    fn default_material(&mut self) -> usize {
        *self.default_material.get_or_insert_with(|| {
            self.materials.push(MaterialResource::new(MaterialData {
                name: Some("Default".to_string()),
                ..MaterialData::default()
            }));
            self.materials.len() - 1
        })
    }
}

fn to_index(value: usize, mesh_name: &str) -> Result<u32, LoadError> {
    u32::try_from(value).map_err(|_| LoadError::IndexOverflow(mesh_name.to_string()))
}

fn convert_camera(camera: &gltf::Camera, name: Option<String>, world: &Transform) -> CameraConfig {
    let defaults = ProjectionParams::default();
    let projection = match camera.projection() {
        gltf::camera::Projection::Perspective(perspective) => ProjectionParams {
            fov_y: perspective.yfov(),
            aspect: perspective.aspect_ratio(),
            near: perspective.znear(),
            far: perspective.zfar().unwrap_or(defaults.far),
        },
        gltf::camera::Projection::Orthographic(orthographic) => {
            log::warn!("Orthographic camera {name:?} is viewed with a perspective projection");
            ProjectionParams {
                near: orthographic.znear().max(defaults.near),
                far: orthographic.zfar(),
                ..defaults
            }
        }
    };

    CameraConfig {
        name,
        pose: CameraPose::from_transform(world),
        projection,
    }
}

fn convert_light(light: &gltf::khr_lights_punctual::Light) -> LightNode {
    let kind = match light.kind() {
        gltf::khr_lights_punctual::Kind::Directional => LightKind::Directional,
        gltf::khr_lights_punctual::Kind::Point => LightKind::Point,
        gltf::khr_lights_punctual::Kind::Spot {
            inner_cone_angle,
            outer_cone_angle,
        } => LightKind::Spot {
            inner_cone_angle,
            outer_cone_angle,
        },
    };

    LightNode {
        kind,
        color: light.color(),
        intensity: light.intensity(),
        range: light.range(),
    }
}

fn convert_material(material: &gltf::Material) -> MaterialData {
    let pbr = material.pbr_metallic_roughness();

    let mut textures = Vec::new();
    let bound = [
        pbr.base_color_texture().map(|info| info.texture().index()),
        pbr.metallic_roughness_texture().map(|info| info.texture().index()),
        material.normal_texture().map(|normal| normal.texture().index()),
        material.occlusion_texture().map(|occlusion| occlusion.texture().index()),
        material.emissive_texture().map(|info| info.texture().index()),
    ];
    for index in bound.into_iter().flatten() {
        if !textures.contains(&index) {
            textures.push(index);
        }
    }

    MaterialData {
        name: material.name().map(str::to_string),
        base_color: pbr.base_color_factor(),
        metallic: pbr.metallic_factor(),
        roughness: pbr.roughness_factor(),
        emissive: material.emissive_factor(),
        double_sided: material.double_sided(),
        textures,
    }
}

fn convert_texture(texture: &gltf::Texture, images: &[gltf::image::Data]) -> Result<TextureResource, LoadError> {
    let source = texture.source().index();
    let image = images.get(source).ok_or(LoadError::MissingImage(source))?;

    let format = match image.format {
        gltf::image::Format::R8 => TextureFormat::R8,
        gltf::image::Format::R8G8 => TextureFormat::Rg8,
        gltf::image::Format::R8G8B8 => TextureFormat::Rgb8,
        gltf::image::Format::R8G8B8A8 => TextureFormat::Rgba8,
        _ => TextureFormat::Other,
    };

    Ok(TextureResource::new(TextureData {
        name: texture.name().map(str::to_string),
        width: image.width,
        height: image.height,
        format,
        pixels: image.pixels.clone(),
    }))
}
