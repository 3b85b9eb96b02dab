//! Rendering data and backend seams
//!
//! This module owns everything the engine hands to a renderer: GPU-ready
//! meshes, the spotlight rig, and the two traits through which a renderer is
//! driven. No graphics API is referenced here; applications plug their own
//! renderer in by implementing [`GpuUploader`] and [`ShadingStage`].
//!
//! ## Per-frame Flow
//!
//! ```text
//! set_camera ─► set_spot_lights ─► for each entity:
//!                                    set_model_matrix
//!                                    for each mesh: bind_sampler* ─► draw_indexed
//! ```

pub mod backend;
pub mod headless;
pub mod lighting;
pub mod mesh;

pub use backend::{
    BackendResult, BufferHandle, GpuUploader, MeshBuffers, SamplerBinding, ShadingStage,
    TextureHandle,
};
pub use headless::{HeadlessBackend, RecordedCommand};
pub use lighting::{LightRig, SpotLight, SpotLightUniform};
pub use mesh::{RenderableMesh, TextureRef, TextureRole, Vertex, VertexAttribute};

use thiserror::Error;

/// Rendering errors
///
/// Backend failures are reported as strings so that renderer-specific error
/// types never leak into the engine's public API.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A texture or buffer upload was rejected by the backend
    #[error("Upload failed: {0}")]
    Upload(String),

    /// The shading stage rejected per-frame state or a draw
    #[error("Shading failed: {0}")]
    Shading(String),

    /// Mesh geometry violates the renderable mesh invariants
    #[error("Invalid mesh '{name}': {reason}")]
    InvalidMesh {
        /// Diagnostic mesh name
        name: String,
        /// What was wrong
        reason: String,
    },

    /// Spotlight parameters are inconsistent
    #[error("Invalid light: {0}")]
    InvalidLight(String),
}
