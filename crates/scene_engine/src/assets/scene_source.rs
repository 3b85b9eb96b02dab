//! Scene source contract
//!
//! A scene source is whatever parses model files. It produces a
//! [`SourceScene`]: a node tree whose nodes index into one flat mesh array,
//! and materials that list texture slots per semantic. The importer only ever
//! sees this shape, never a file format.

use std::path::Path;

use bitflags::bitflags;

use crate::assets::{AssetError, PostProcess};

bitflags! {
    /// Scene-level status flags reported by a source
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SceneFlags: u32 {
        /// The source could not read the whole file
        const INCOMPLETE = 1 << 0;
    }
}

/// Texture semantic as reported by the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTextureType {
    /// Base color map
    Diffuse,
    /// Specular map
    Specular,
    /// Ambient map
    Ambient,
    /// Height / bump map
    Height,
    /// Tangent-space normal map
    Normals,
    /// Shininess map
    Shininess,
    /// Opacity map
    Opacity,
}

/// One texture reference in a material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSlot {
    /// Semantic the texture was declared with
    pub semantic: SourceTextureType,
    /// Path relative to the model's directory
    pub path: String,
}

/// Material as reported by the source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMaterial {
    /// Material name
    pub name: String,
    /// Texture slots in declaration order
    pub slots: Vec<TextureSlot>,
}

impl SourceMaterial {
    /// Slot paths of one semantic, in declaration order
    pub fn textures_of(&self, semantic: SourceTextureType) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter(move |slot| slot.semantic == semantic)
            .map(|slot| slot.path.as_str())
    }
}

/// Mesh as reported by the source
///
/// Optional attribute arrays, when present, have one entry per position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMesh {
    /// Mesh name
    pub name: String,
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals
    pub normals: Option<Vec<[f32; 3]>>,
    /// First UV channel
    pub tex_coords: Option<Vec<[f32; 2]>>,
    /// Tangents
    pub tangents: Option<Vec<[f32; 3]>>,
    /// Bitangents
    pub bitangents: Option<Vec<[f32; 3]>>,
    /// Polygons as vertex index lists; triangles after post-processing
    pub faces: Vec<Vec<u32>>,
    /// Index into the scene's material array
    pub material_index: usize,
}

/// Node of the scene tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceNode {
    /// Node name
    pub name: String,
    /// Indices into [`SourceScene::meshes`]
    pub meshes: Vec<usize>,
    /// Indices into [`SourceScene::nodes`]
    pub children: Vec<usize>,
}

/// A whole scene as produced by a [`SceneSource`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceScene {
    /// Status flags
    pub flags: SceneFlags,
    /// Index of the root node, if the scene has one
    pub root: Option<usize>,
    /// Node arena
    pub nodes: Vec<SourceNode>,
    /// Flat mesh array
    pub meshes: Vec<SourceMesh>,
    /// Material array
    pub materials: Vec<SourceMaterial>,
}

/// Parser for model files
pub trait SceneSource {
    /// Read the file at `path`, applying the requested post-processing.
    ///
    /// Parse failures are reported as [`AssetError::Import`] carrying the
    /// parser's message.
    fn read_scene(&self, path: &Path, post_process: PostProcess) -> Result<SourceScene, AssetError>;
}
