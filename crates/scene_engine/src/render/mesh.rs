//! Renderable mesh representation
//!
//! A [`RenderableMesh`] is the flattened, GPU-ready form of one imported
//! source mesh: interleaved vertices, a triangle index list, the textures its
//! material resolved to, and the GPU buffers holding the geometry.
//!
//! # Vertex Layout
//!
//! | Attribute | Components | Offset | Location |
//! |-----------|------------|--------|----------|
//! | position  | 3 × f32    | 0      | 0        |
//! | normal    | 3 × f32    | 12     | 1        |
//! | tex_coords| 2 × f32    | 24     | 2        |
//! | tangent   | 3 × f32    | 32     | 3        |
//! | bitangent | 3 × f32    | 44     | 4        |

use std::fmt;

use crate::render::backend::{
    BackendResult, GpuUploader, MeshBuffers, SamplerBinding, ShadingStage, TextureHandle,
};
use crate::render::RenderError;

/// 3D vertex with tangent space, laid out for direct GPU upload
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],
    /// Surface normal, zero when the source supplied none
    pub normal: [f32; 3],
    /// First UV channel, zero when absent
    pub tex_coords: [f32; 2],
    /// Tangent, zero when the mesh has no UV channel
    pub tangent: [f32; 3],
    /// Bitangent, zero when the mesh has no UV channel
    pub bitangent: [f32; 3],
}

/// Backend-neutral description of one vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location
    pub location: u32,
    /// Number of f32 components
    pub components: u32,
    /// Byte offset inside [`Vertex`]
    pub offset: u32,
}

impl Vertex {
    /// Size of one vertex in bytes
    pub const STRIDE: u32 = std::mem::size_of::<Self>() as u32;

    /// Attribute table matching the module-level layout
    pub const ATTRIBUTES: [VertexAttribute; 5] = [
        VertexAttribute { location: 0, components: 3, offset: 0 },
        VertexAttribute { location: 1, components: 3, offset: 12 },
        VertexAttribute { location: 2, components: 2, offset: 24 },
        VertexAttribute { location: 3, components: 3, offset: 32 },
        VertexAttribute { location: 4, components: 3, offset: 44 },
    ];

    /// Vertex with only a position; every other attribute is zero
    pub fn from_position(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// Semantic role of a texture, which decides its sampler name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureRole {
    /// Base color
    Diffuse,
    /// Specular intensity
    Specular,
    /// Normal map
    Normal,
    /// Height / parallax map
    Height,
}

impl TextureRole {
    /// All roles in the order materials are resolved
    pub const ALL: [Self; 4] = [Self::Diffuse, Self::Specular, Self::Normal, Self::Height];

    /// Sampler name prefix used by the shading stage
    pub const fn sampler_prefix(self) -> &'static str {
        match self {
            Self::Diffuse => "texture_diffuse",
            Self::Specular => "texture_specular",
            Self::Normal => "texture_normal",
            Self::Height => "texture_height",
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Diffuse => 0,
            Self::Specular => 1,
            Self::Normal => 2,
            Self::Height => 3,
        }
    }
}

impl fmt::Display for TextureRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sampler_prefix())
    }
}

/// A resolved texture attached to a mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRef {
    /// GPU texture
    pub handle: TextureHandle,
    /// What the texture is used for
    pub role: TextureRole,
    /// Path exactly as the material referenced it
    pub path: String,
}

/// Flattened, GPU-ready mesh
///
/// Immutable after construction. Vertex and index data are kept CPU-side as
/// well, for diagnostics and for tests.
#[derive(Debug)]
pub struct RenderableMesh {
    name: String,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    textures: Vec<TextureRef>,
    buffers: MeshBuffers,
}

impl RenderableMesh {
    /// Validate geometry, upload it and build the mesh.
    ///
    /// Fails with [`RenderError::InvalidMesh`] when there are fewer than three
    /// vertices, the index count is not a multiple of three, or an index
    /// points past the vertex list.
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        textures: Vec<TextureRef>,
        uploader: &mut dyn GpuUploader,
    ) -> Result<Self, RenderError> {
        let name = name.into();
        Self::validate(&name, &vertices, &indices)?;

        let buffers = uploader.upload_mesh(&vertices, &indices)?;
        log::debug!(
            "Uploaded mesh '{}': {} vertices, {} triangles, {} textures",
            name,
            vertices.len(),
            indices.len() / 3,
            textures.len()
        );

        Ok(Self {
            name,
            vertices,
            indices,
            textures,
            buffers,
        })
    }

    fn validate(name: &str, vertices: &[Vertex], indices: &[u32]) -> Result<(), RenderError> {
        let invalid = |reason: String| RenderError::InvalidMesh {
            name: name.to_string(),
            reason,
        };

        if vertices.len() < 3 {
            return Err(invalid(format!("{} vertices, need at least 3", vertices.len())));
        }
        if indices.len() % 3 != 0 {
            return Err(invalid(format!("{} indices is not a whole number of triangles", indices.len())));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(invalid(format!("index {bad} out of range for {} vertices", vertices.len())));
        }
        Ok(())
    }

    /// Diagnostic name from the source mesh
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vertex data
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Triangle-corner indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Textures in role-then-slot order
    pub fn textures(&self) -> &[TextureRef] {
        &self.textures
    }

    /// GPU buffers owned by this mesh
    pub fn buffers(&self) -> &MeshBuffers {
        &self.buffers
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Sampler bindings for one draw.
    ///
    /// Texture `i` goes to unit `i`; its name is the role prefix followed by
    /// a 1-based counter that only advances for that role.
    pub fn sampler_bindings(&self) -> Vec<SamplerBinding> {
        let mut counters = [0u32; TextureRole::ALL.len()];
        self.textures
            .iter()
            .enumerate()
            .map(|(unit, texture)| {
                let counter = &mut counters[texture.role.slot()];
                *counter += 1;
                SamplerBinding {
                    name: format!("{}{}", texture.role.sampler_prefix(), counter),
                    unit: unit as u32,
                    texture: texture.handle,
                }
            })
            .collect()
    }

    /// Bind this mesh's textures and issue its draw
    pub fn draw(&self, stage: &mut dyn ShadingStage) -> BackendResult<()> {
        for binding in self.sampler_bindings() {
            stage.bind_sampler(&binding)?;
        }
        stage.draw_indexed(&self.buffers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessBackend;

    fn triangle() -> Vec<Vertex> {
        vec![
            Vertex::from_position([0.0, 0.0, 0.0]),
            Vertex::from_position([1.0, 0.0, 0.0]),
            Vertex::from_position([0.0, 1.0, 0.0]),
        ]
    }

    fn texture(id: u32, role: TextureRole) -> TextureRef {
        TextureRef {
            handle: TextureHandle(id),
            role,
            path: format!("tex{id}.png"),
        }
    }

    #[test]
    fn test_vertex_layout() {
        assert_eq!(Vertex::STRIDE, 56);
        let last = Vertex::ATTRIBUTES[4];
        assert_eq!(last.offset + last.components * 4, Vertex::STRIDE);
        assert_eq!(bytemuck::cast_slice::<Vertex, u8>(&triangle()).len(), 3 * 56);
    }

    #[test]
    fn test_sampler_counters_are_per_role() {
        let mut backend = HeadlessBackend::new();
        let textures = vec![
            texture(1, TextureRole::Diffuse),
            texture(2, TextureRole::Specular),
            texture(3, TextureRole::Diffuse),
            texture(4, TextureRole::Normal),
            texture(5, TextureRole::Height),
            texture(6, TextureRole::Specular),
        ];
        let mesh = RenderableMesh::new("m", triangle(), vec![0, 1, 2], textures, &mut backend).unwrap();

        let names: Vec<_> = mesh.sampler_bindings().into_iter().map(|b| (b.name, b.unit)).collect();
        assert_eq!(
            names,
            vec![
                ("texture_diffuse1".to_string(), 0),
                ("texture_specular1".to_string(), 1),
                ("texture_diffuse2".to_string(), 2),
                ("texture_normal1".to_string(), 3),
                ("texture_height1".to_string(), 4),
                ("texture_specular2".to_string(), 5),
            ]
        );
    }

    #[test]
    fn test_counters_reset_between_draws() {
        let mut backend = HeadlessBackend::new();
        let mesh = RenderableMesh::new(
            "m",
            triangle(),
            vec![0, 1, 2],
            vec![texture(1, TextureRole::Diffuse)],
            &mut backend,
        )
        .unwrap();

        assert_eq!(mesh.sampler_bindings()[0].name, "texture_diffuse1");
        assert_eq!(mesh.sampler_bindings()[0].name, "texture_diffuse1");
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let mut backend = HeadlessBackend::new();

        let too_few = RenderableMesh::new("a", triangle()[..2].to_vec(), vec![], vec![], &mut backend);
        assert!(matches!(too_few, Err(RenderError::InvalidMesh { .. })));

        let ragged = RenderableMesh::new("b", triangle(), vec![0, 1], vec![], &mut backend);
        assert!(matches!(ragged, Err(RenderError::InvalidMesh { .. })));

        let out_of_range = RenderableMesh::new("c", triangle(), vec![0, 1, 3], vec![], &mut backend);
        assert!(matches!(out_of_range, Err(RenderError::InvalidMesh { .. })));

        assert_eq!(backend.mesh_upload_count(), 0);
    }
}
