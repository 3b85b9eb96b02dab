//! Backend abstraction traits for the rendering collaborators
//!
//! The engine never talks to a graphics API directly. GPU uploads go through
//! [`GpuUploader`] during import, and per-frame state goes through
//! [`ShadingStage`]. Both are implemented by the application's renderer; the
//! [`HeadlessBackend`](super::HeadlessBackend) implements them for tests and
//! offline runs.

use crate::assets::ImageData;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::lighting::SpotLightUniform;
use crate::render::mesh::Vertex;
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Opaque handle to a texture living on the GPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Opaque handle to a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// GPU buffers backing one renderable mesh
///
/// Owned exclusively by its mesh; never shared between meshes.
#[derive(Debug, PartialEq, Eq)]
pub struct MeshBuffers {
    /// Interleaved vertex buffer
    pub vertex_buffer: BufferHandle,
    /// 32-bit index buffer
    pub index_buffer: BufferHandle,
    /// Number of indices to draw
    pub index_count: u32,
}

/// A named sampler bound to a texture unit for the next draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerBinding {
    /// Uniform name, `"<role><n>"` with a 1-based per-role counter
    pub name: String,
    /// Texture unit the texture is bound to
    pub unit: u32,
    /// Texture to bind
    pub texture: TextureHandle,
}

/// Upload side of the renderer, used while importing models
pub trait GpuUploader {
    /// Upload decoded RGBA8 pixels and return a handle to the new texture.
    ///
    /// `srgb` is set when the model was imported with gamma correction.
    fn upload_texture(&mut self, image: &ImageData, srgb: bool) -> BackendResult<TextureHandle>;

    /// Upload vertex and index data for one mesh
    fn upload_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> BackendResult<MeshBuffers>;
}

/// Per-frame side of the renderer
///
/// Calls arrive in a fixed order each frame: `set_camera`, `set_spot_lights`,
/// then for each entity one `set_model_matrix` followed by its meshes'
/// `bind_sampler`/`draw_indexed` calls.
pub trait ShadingStage {
    /// Forward the camera matrices and eye position for this frame
    fn set_camera(&mut self, view: &Mat4, projection: &Mat4, eye: Vec3) -> BackendResult<()>;

    /// Forward every spotlight of the rig, in rig order
    fn set_spot_lights(&mut self, lights: &[SpotLightUniform]) -> BackendResult<()>;

    /// Set the model matrix used by subsequent draws
    fn set_model_matrix(&mut self, model: &Mat4) -> BackendResult<()>;

    /// Bind a texture to a named sampler for the next draw
    fn bind_sampler(&mut self, binding: &SamplerBinding) -> BackendResult<()>;

    /// Draw a mesh's buffers as an indexed triangle list
    fn draw_indexed(&mut self, buffers: &MeshBuffers) -> BackendResult<()>;
}
