//! Model importer
//!
//! Flattens a [`SourceScene`] into an ordered list of [`RenderableMesh`]es.
//!
//! ## Mesh Order
//!
//! Nodes are visited depth-first, pre-order: a node's meshes in listed order,
//! then its children in listed order. The resulting mesh order is part of the
//! importer's contract; entities draw their meshes in exactly this order.
//!
//! ## Failure Modes
//!
//! | Problem                              | Result                             |
//! |--------------------------------------|------------------------------------|
//! | source cannot parse, incomplete scene, no root | [`AssetError::Import`]   |
//! | node / mesh / material / vertex index out of range | [`AssetError::InvalidReference`] |
//! | node graph cycles                    | [`AssetError::NodeLimitExceeded`]  |
//! | one texture unreadable               | slot skipped, import continues     |
//!
//! Every scene-level check runs before the first upload, so a failed import
//! leaves nothing behind on the GPU.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assets::{
    AssetError, PostProcess, ReferenceKind, SceneFlags, SceneSource, SourceMaterial, SourceMesh,
    SourceScene, SourceTextureType, TextureCache,
};
use crate::render::{GpuUploader, RenderableMesh, TextureRef, TextureRole, Vertex};

/// Which source semantic feeds each texture role, in resolution order
const ROLE_SOURCES: [(TextureRole, SourceTextureType); 4] = [
    (TextureRole::Diffuse, SourceTextureType::Diffuse),
    (TextureRole::Specular, SourceTextureType::Specular),
    (TextureRole::Normal, SourceTextureType::Height),
    (TextureRole::Height, SourceTextureType::Ambient),
];

/// Import options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Post-processing requested from the scene source
    pub post_process: PostProcess,
    /// Tag every texture of the model as sRGB
    pub gamma_correction: bool,
    /// Upper bound on node visits during traversal
    pub max_nodes: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            post_process: PostProcess::default(),
            gamma_correction: false,
            max_nodes: 65_536,
        }
    }
}

/// A texture slot that was dropped during import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTexture {
    /// Mesh the slot belonged to
    pub mesh: String,
    /// Role the texture would have had
    pub role: TextureRole,
    /// Path as referenced by the material
    pub path: String,
    /// Why it was dropped
    pub reason: String,
}

/// Result of a successful import
#[derive(Debug)]
pub struct ImportedModel {
    path: PathBuf,
    directory: PathBuf,
    meshes: Vec<RenderableMesh>,
    textures: TextureCache,
    skipped_textures: Vec<SkippedTexture>,
}

impl ImportedModel {
    /// File the model was imported from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory texture paths were resolved against
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Meshes in traversal order
    pub fn meshes(&self) -> &[RenderableMesh] {
        &self.meshes
    }

    /// Take the meshes, dropping the texture bookkeeping
    pub fn into_meshes(self) -> Vec<RenderableMesh> {
        self.meshes
    }

    /// Textures loaded for this model
    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    /// Slots dropped because their texture could not be loaded
    pub fn skipped_textures(&self) -> &[SkippedTexture] {
        &self.skipped_textures
    }

    /// Total triangles across all meshes
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(RenderableMesh::triangle_count).sum()
    }
}

/// CPU-side mesh data, checked but not uploaded yet
struct PendingMesh<'s> {
    name: &'s str,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    material: &'s SourceMaterial,
}

/// Imports model files through a [`SceneSource`]
pub struct ModelImporter<'a> {
    source: &'a dyn SceneSource,
    settings: ImportSettings,
}

impl<'a> ModelImporter<'a> {
    /// Create an importer reading through `source`
    pub fn new(source: &'a dyn SceneSource, settings: ImportSettings) -> Self {
        Self { source, settings }
    }

    /// Settings used for every import
    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Import `path`, uploading meshes and textures through `uploader`
    pub fn import(
        &self,
        path: impl AsRef<Path>,
        uploader: &mut dyn GpuUploader,
    ) -> Result<ImportedModel, AssetError> {
        let path = path.as_ref();
        let scene = self.source.read_scene(path, self.settings.post_process)?;
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();

        let order = self.mesh_order(&scene)?;
        let pending = order
            .iter()
            .map(|&index| assemble(&scene, index))
            .collect::<Result<Vec<_>, _>>()?;

        let mut textures = TextureCache::new(self.settings.gamma_correction);
        let mut skipped_textures = Vec::new();
        let mut meshes = Vec::with_capacity(pending.len());

        for mesh in pending {
            let mut refs = Vec::new();
            for (role, semantic) in ROLE_SOURCES {
                for texture_path in mesh.material.textures_of(semantic) {
                    match textures.resolve(texture_path, &directory, uploader) {
                        Ok(handle) => refs.push(TextureRef {
                            handle,
                            role,
                            path: texture_path.to_string(),
                        }),
                        Err(err) => {
                            log::warn!("Mesh '{}': skipping {} texture: {}", mesh.name, role, err);
                            skipped_textures.push(SkippedTexture {
                                mesh: mesh.name.to_string(),
                                role,
                                path: texture_path.to_string(),
                                reason: err.to_string(),
                            });
                        }
                    }
                }
            }
            meshes.push(RenderableMesh::new(mesh.name, mesh.vertices, mesh.indices, refs, uploader)?);
        }

        let model = ImportedModel {
            path: path.to_path_buf(),
            directory,
            meshes,
            textures,
            skipped_textures,
        };
        log::info!(
            "Imported {}: {} meshes, {} triangles, {} textures ({} skipped)",
            path.display(),
            model.meshes.len(),
            model.triangle_count(),
            model.textures.len(),
            model.skipped_textures.len()
        );
        Ok(model)
    }

    /// Mesh indices in depth-first pre-order
    fn mesh_order(&self, scene: &SourceScene) -> Result<Vec<usize>, AssetError> {
        if scene.flags.contains(SceneFlags::INCOMPLETE) {
            return Err(AssetError::Import("scene is incomplete".to_string()));
        }
        let root = scene
            .root
            .ok_or_else(|| AssetError::Import("scene has no root node".to_string()))?;

        let mut order = Vec::new();
        let mut stack = vec![root];
        let mut visits = 0usize;

        while let Some(node_index) = stack.pop() {
            visits += 1;
            if visits > self.settings.max_nodes {
                return Err(AssetError::NodeLimitExceeded {
                    limit: self.settings.max_nodes,
                });
            }

            let node = scene.nodes.get(node_index).ok_or(AssetError::InvalidReference {
                kind: ReferenceKind::Node,
                index: node_index,
                count: scene.nodes.len(),
            })?;

            for &mesh_index in &node.meshes {
                if mesh_index >= scene.meshes.len() {
                    return Err(AssetError::InvalidReference {
                        kind: ReferenceKind::Mesh,
                        index: mesh_index,
                        count: scene.meshes.len(),
                    });
                }
                order.push(mesh_index);
            }
            // reversed so the first child is popped first
            stack.extend(node.children.iter().rev());
        }

        log::trace!("Visited {} nodes, {} mesh references", visits, order.len());
        Ok(order)
    }
}

/// Build the vertex and index lists for one source mesh
fn assemble(scene: &SourceScene, mesh_index: usize) -> Result<PendingMesh<'_>, AssetError> {
    let mesh = &scene.meshes[mesh_index];
    let material = scene
        .materials
        .get(mesh.material_index)
        .ok_or(AssetError::InvalidReference {
            kind: ReferenceKind::Material,
            index: mesh.material_index,
            count: scene.materials.len(),
        })?;

    check_attribute_lengths(mesh)?;

    let has_uvs = mesh.tex_coords.is_some();
    let vertices = mesh
        .positions
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            let attr3 = |data: &Option<Vec<[f32; 3]>>| data.as_ref().map_or([0.0; 3], |d| d[i]);
            Vertex {
                position,
                normal: attr3(&mesh.normals),
                tex_coords: mesh.tex_coords.as_ref().map_or([0.0; 2], |uv| uv[i]),
                tangent: if has_uvs { attr3(&mesh.tangents) } else { [0.0; 3] },
                bitangent: if has_uvs { attr3(&mesh.bitangents) } else { [0.0; 3] },
            }
        })
        .collect::<Vec<_>>();

    let mut indices = Vec::with_capacity(mesh.faces.len() * 3);
    for face in &mesh.faces {
        if face.len() != 3 {
            return Err(AssetError::InvalidMesh {
                name: mesh.name.clone(),
                reason: format!("face with {} corners; triangulation was not requested", face.len()),
            });
        }
        for &index in face {
            if index as usize >= vertices.len() {
                return Err(AssetError::InvalidReference {
                    kind: ReferenceKind::Vertex,
                    index: index as usize,
                    count: vertices.len(),
                });
            }
            indices.push(index);
        }
    }

    if vertices.len() < 3 {
        return Err(AssetError::InvalidMesh {
            name: mesh.name.clone(),
            reason: format!("{} vertices, need at least 3", vertices.len()),
        });
    }

    Ok(PendingMesh {
        name: &mesh.name,
        vertices,
        indices,
        material,
    })
}

fn check_attribute_lengths(mesh: &SourceMesh) -> Result<(), AssetError> {
    let expected = mesh.positions.len();
    let lengths = [
        ("normals", mesh.normals.as_ref().map(Vec::len)),
        ("tex_coords", mesh.tex_coords.as_ref().map(Vec::len)),
        ("tangents", mesh.tangents.as_ref().map(Vec::len)),
        ("bitangents", mesh.bitangents.as_ref().map(Vec::len)),
    ];
    for (attribute, len) in lengths {
        if let Some(len) = len.filter(|&len| len != expected) {
            return Err(AssetError::InvalidMesh {
                name: mesh.name.clone(),
                reason: format!("{len} {attribute} for {expected} positions"),
            });
        }
    }
    Ok(())
}
