//! Wavefront OBJ/MTL scene source
//!
//! Reads OBJ files with `tobj` and reshapes them into a [`SourceScene`]: one
//! root node with a child node per OBJ object, each child owning the one mesh
//! built from that object.

use std::path::Path;

use crate::assets::post_process::{self, PostProcess};
use crate::assets::{
    AssetError, SceneFlags, SceneSource, SourceMaterial, SourceMesh, SourceNode, SourceScene,
    SourceTextureType, TextureSlot,
};

/// Name of the material given to objects that have none
pub const DEFAULT_MATERIAL_NAME: &str = "DefaultMaterial";

/// [`SceneSource`] for `.obj` files and their `.mtl` libraries
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjSceneSource;

impl SceneSource for ObjSceneSource {
    fn read_scene(&self, path: &Path, post_process: PostProcess) -> Result<SourceScene, AssetError> {
        let options = tobj::LoadOptions {
            single_index: true,
            triangulate: false,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };

        let (models, materials) = tobj::load_obj(path, &options)
            .map_err(|e| AssetError::Import(format!("{}: {e}", path.display())))?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("No usable material library for {}: {e}", path.display());
            Vec::new()
        });

        let mut scene = SourceScene {
            materials: materials.iter().map(convert_material).collect(),
            ..SourceScene::default()
        };

        let mut needs_default = false;
        let mut root = SourceNode {
            name: path
                .file_stem()
                .map_or_else(|| "root".to_string(), |s| s.to_string_lossy().into_owned()),
            ..SourceNode::default()
        };
        scene.nodes.push(SourceNode::default());

        for model in models {
            if model.mesh.positions.is_empty() {
                log::debug!("Skipping empty object '{}'", model.name);
                continue;
            }
            let material_index = match model.mesh.material_id {
                Some(id) => id,
                None => {
                    needs_default = true;
                    usize::MAX
                }
            };

            let mesh_index = scene.meshes.len();
            scene.meshes.push(convert_mesh(&model, material_index));
            root.children.push(scene.nodes.len());
            scene.nodes.push(SourceNode {
                name: model.name,
                meshes: vec![mesh_index],
                children: Vec::new(),
            });
        }

        if needs_default {
            let default_index = scene.materials.len();
            scene.materials.push(SourceMaterial {
                name: DEFAULT_MATERIAL_NAME.to_string(),
                slots: Vec::new(),
            });
            for mesh in scene.meshes.iter_mut().filter(|m| m.material_index == usize::MAX) {
                mesh.material_index = default_index;
            }
        }

        if scene.meshes.is_empty() {
            scene.flags |= SceneFlags::INCOMPLETE;
        }
        scene.nodes[0] = root;
        scene.root = Some(0);

        post_process::apply(&mut scene, post_process);
        Ok(scene)
    }
}

fn convert_material(material: &tobj::Material) -> SourceMaterial {
    // map_Bump is reported as a height map, map_Ka as an ambient map
    let slots = [
        (SourceTextureType::Diffuse, &material.diffuse_texture),
        (SourceTextureType::Specular, &material.specular_texture),
        (SourceTextureType::Height, &material.normal_texture),
        (SourceTextureType::Ambient, &material.ambient_texture),
        (SourceTextureType::Shininess, &material.shininess_texture),
        (SourceTextureType::Opacity, &material.dissolve_texture),
    ]
    .into_iter()
    .filter_map(|(semantic, path)| {
        path.as_ref().map(|path| TextureSlot {
            semantic,
            path: path.clone(),
        })
    })
    .collect();

    SourceMaterial {
        name: material.name.clone(),
        slots,
    }
}

fn convert_mesh(model: &tobj::Model, material_index: usize) -> SourceMesh {
    let mesh = &model.mesh;
    let vertex_count = mesh.positions.len() / 3;

    let triples = |data: &[f32]| -> Option<Vec<[f32; 3]>> {
        (data.len() == vertex_count * 3)
            .then(|| data.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
    };
    let normals = triples(&mesh.normals);
    let tex_coords = (mesh.texcoords.len() == vertex_count * 2)
        .then(|| mesh.texcoords.chunks_exact(2).map(|c| [c[0], c[1]]).collect());

    let faces = if mesh.face_arities.is_empty() {
        mesh.indices.chunks(3).map(<[u32]>::to_vec).collect()
    } else {
        let mut faces = Vec::with_capacity(mesh.face_arities.len());
        let mut start = 0;
        for &arity in &mesh.face_arities {
            let end = (start + arity as usize).min(mesh.indices.len());
            faces.push(mesh.indices[start..end].to_vec());
            start = end;
        }
        faces
    };

    SourceMesh {
        name: model.name.clone(),
        positions: triples(&mesh.positions).unwrap_or_default(),
        normals,
        tex_coords,
        tangents: None,
        bitangents: None,
        faces,
        material_index,
    }
}
