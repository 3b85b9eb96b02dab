//! Asset import pipeline
//!
//! Turns an externally-authored model file into GPU-ready meshes:
//!
//! 1. A [`SceneSource`] reads the file into a [`SourceScene`] (node tree,
//!    flat mesh array, materials with texture slots).
//! 2. [`post_process`] triangulates, fills in normals, flips V and derives
//!    tangent space as requested by [`PostProcess`] flags.
//! 3. [`ModelImporter`] walks the node tree depth-first, builds one
//!    [`RenderableMesh`](crate::render::RenderableMesh) per referenced mesh,
//!    and resolves textures through a per-model [`TextureCache`].

pub mod image_loader;
pub mod model_importer;
pub mod obj_source;
pub mod post_process;
pub mod scene_source;
pub mod texture_cache;

pub use image_loader::ImageData;
pub use model_importer::{ImportSettings, ImportedModel, ModelImporter, SkippedTexture};
pub use obj_source::ObjSceneSource;
pub use post_process::PostProcess;
pub use scene_source::{
    SceneFlags, SceneSource, SourceMaterial, SourceMesh, SourceNode, SourceScene,
    SourceTextureType, TextureSlot,
};
pub use texture_cache::{TextureCache, TextureKey, TextureRecord};

use std::fmt;

use thiserror::Error;

use crate::render::RenderError;

/// What an out-of-range index pointed into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Scene mesh array
    Mesh,
    /// Scene material array
    Material,
    /// Scene node array
    Node,
    /// A mesh's vertex list
    Vertex,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mesh => "mesh",
            Self::Material => "material",
            Self::Node => "node",
            Self::Vertex => "vertex",
        })
    }
}

/// Asset errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// The scene could not be imported at all; no meshes were produced
    #[error("Import failed: {0}")]
    Import(String),

    /// One texture could not be read or decoded
    #[error("Failed to load texture '{path}': {reason}")]
    TextureLoad {
        /// Path as referenced by the material
        path: String,
        /// Decoder or I/O message
        reason: String,
    },

    /// The scene refers to something that is not there
    #[error("Invalid {kind} reference {index} (scene has {count})")]
    InvalidReference {
        /// Which array the index points into
        kind: ReferenceKind,
        /// Offending index
        index: usize,
        /// Length of that array
        count: usize,
    },

    /// Node traversal visited more nodes than allowed, usually a cycle
    #[error("Node traversal exceeded {limit} visits; the node graph is cyclic or too large")]
    NodeLimitExceeded {
        /// Visit bound that was hit
        limit: usize,
    },

    /// A mesh built from the scene violates the renderable mesh invariants
    #[error("Invalid mesh '{name}': {reason}")]
    InvalidMesh {
        /// Diagnostic mesh name
        name: String,
        /// What was wrong
        reason: String,
    },

    /// Backend rejected an upload
    #[error("Render backend error: {0}")]
    Render(RenderError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RenderError> for AssetError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::InvalidMesh { name, reason } => Self::InvalidMesh { name, reason },
            other => Self::Render(other),
        }
    }
}
