//! GPU-free backend
//!
//! Hands out sequential handles and records every call it receives, so the
//! import pipeline and the frame driver can run (and be inspected) without a
//! graphics device.

use crate::assets::ImageData;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::backend::{
    BackendResult, BufferHandle, GpuUploader, MeshBuffers, SamplerBinding, ShadingStage,
    TextureHandle,
};
use crate::render::lighting::SpotLightUniform;
use crate::render::mesh::Vertex;

/// One call received by the headless backend
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// `upload_texture`
    UploadTexture {
        /// Handle that was returned
        handle: TextureHandle,
        /// Image width
        width: u32,
        /// Image height
        height: u32,
        /// sRGB hint
        srgb: bool,
    },
    /// `upload_mesh`
    UploadMesh {
        /// Vertex buffer that was returned
        vertex_buffer: BufferHandle,
        /// Vertices uploaded
        vertex_count: usize,
        /// Indices uploaded
        index_count: usize,
    },
    /// `set_camera`
    SetCamera {
        /// View matrix
        view: Mat4,
        /// Projection matrix
        projection: Mat4,
        /// Eye position
        eye: Vec3,
    },
    /// `set_spot_lights`
    SetSpotLights(Vec<SpotLightUniform>),
    /// `set_model_matrix`
    SetModelMatrix(Mat4),
    /// `bind_sampler`
    BindSampler(SamplerBinding),
    /// `draw_indexed`
    DrawIndexed {
        /// Vertex buffer drawn
        vertex_buffer: BufferHandle,
        /// Indices drawn
        index_count: u32,
    },
}

/// Recording backend for tests and offline runs
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_texture: u32,
    next_buffer: u32,
    commands: Vec<RecordedCommand>,
}

impl HeadlessBackend {
    /// Create a backend with an empty command log
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    /// Drop the command log; handle counters keep counting
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of textures uploaded
    pub fn texture_upload_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RecordedCommand::UploadTexture { .. }))
            .count()
    }

    /// Number of meshes uploaded
    pub fn mesh_upload_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RecordedCommand::UploadMesh { .. }))
            .count()
    }

    /// Model matrices in the order they were set
    pub fn model_matrices(&self) -> Vec<Mat4> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RecordedCommand::SetModelMatrix(m) => Some(*m),
                _ => None,
            })
            .collect()
    }

    /// The most recently forwarded spotlight array
    pub fn last_spot_lights(&self) -> Option<&[SpotLightUniform]> {
        self.commands.iter().rev().find_map(|c| match c {
            RecordedCommand::SetSpotLights(lights) => Some(lights.as_slice()),
            _ => None,
        })
    }

    fn buffer(&mut self) -> BufferHandle {
        self.next_buffer += 1;
        BufferHandle(self.next_buffer)
    }
}

impl GpuUploader for HeadlessBackend {
    fn upload_texture(&mut self, image: &ImageData, srgb: bool) -> BackendResult<TextureHandle> {
        self.next_texture += 1;
        let handle = TextureHandle(self.next_texture);
        self.commands.push(RecordedCommand::UploadTexture {
            handle,
            width: image.width,
            height: image.height,
            srgb,
        });
        Ok(handle)
    }

    fn upload_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> BackendResult<MeshBuffers> {
        let vertex_buffer = self.buffer();
        let index_buffer = self.buffer();
        self.commands.push(RecordedCommand::UploadMesh {
            vertex_buffer,
            vertex_count: vertices.len(),
            index_count: indices.len(),
        });
        Ok(MeshBuffers {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        })
    }
}

impl ShadingStage for HeadlessBackend {
    fn set_camera(&mut self, view: &Mat4, projection: &Mat4, eye: Vec3) -> BackendResult<()> {
        self.commands.push(RecordedCommand::SetCamera {
            view: *view,
            projection: *projection,
            eye,
        });
        Ok(())
    }

    fn set_spot_lights(&mut self, lights: &[SpotLightUniform]) -> BackendResult<()> {
        self.commands.push(RecordedCommand::SetSpotLights(lights.to_vec()));
        Ok(())
    }

    fn set_model_matrix(&mut self, model: &Mat4) -> BackendResult<()> {
        self.commands.push(RecordedCommand::SetModelMatrix(*model));
        Ok(())
    }

    fn bind_sampler(&mut self, binding: &SamplerBinding) -> BackendResult<()> {
        self.commands.push(RecordedCommand::BindSampler(binding.clone()));
        Ok(())
    }

    fn draw_indexed(&mut self, buffers: &MeshBuffers) -> BackendResult<()> {
        self.commands.push(RecordedCommand::DrawIndexed {
            vertex_buffer: buffers.vertex_buffer,
            index_count: buffers.index_count,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique() {
        let mut backend = HeadlessBackend::new();
        let image = ImageData::solid_color(2, 2, [255, 0, 0, 255]);

        let a = backend.upload_texture(&image, false).unwrap();
        let b = backend.upload_texture(&image, true).unwrap();
        assert_ne!(a, b);

        let verts = [Vertex::default(); 3];
        let m1 = backend.upload_mesh(&verts, &[0, 1, 2]).unwrap();
        let m2 = backend.upload_mesh(&verts, &[0, 1, 2]).unwrap();
        assert_ne!(m1.vertex_buffer, m2.vertex_buffer);
        assert_ne!(m1.vertex_buffer, m1.index_buffer);
        assert_eq!(backend.texture_upload_count(), 2);
        assert_eq!(backend.mesh_upload_count(), 2);
    }
}
