//! Post-processing applied to a source scene before import
//!
//! Steps run in a fixed order: triangulate, generate normals, flip V, then
//! derive tangent space. Each step only fills in what the source left out;
//! attributes the file supplied are never overwritten.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::assets::{SourceMesh, SourceScene};
use crate::foundation::math::{Vec2, Vec3};

bitflags! {
    /// Post-processing steps requested from a scene source
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PostProcess: u32 {
        /// Split polygons into triangles; drop points and lines
        const TRIANGULATE = 1 << 0;
        /// Area-weighted smooth normals for meshes without normals
        const GEN_SMOOTH_NORMALS = 1 << 1;
        /// `v = 1 - v` on the first UV channel
        const FLIP_UVS = 1 << 2;
        /// Tangents and bitangents for meshes with UVs
        const CALC_TANGENT_SPACE = 1 << 3;
    }
}

impl Default for PostProcess {
    fn default() -> Self {
        Self::all()
    }
}

/// Apply the requested steps to every mesh of `scene`
pub fn apply(scene: &mut SourceScene, steps: PostProcess) {
    for mesh in &mut scene.meshes {
        apply_to_mesh(mesh, steps);
    }
}

/// Apply the requested steps to one mesh
pub fn apply_to_mesh(mesh: &mut SourceMesh, steps: PostProcess) {
    if steps.contains(PostProcess::TRIANGULATE) {
        triangulate(mesh);
    }
    if steps.contains(PostProcess::GEN_SMOOTH_NORMALS) && mesh.normals.is_none() {
        mesh.normals = Some(smooth_normals(mesh));
    }
    if steps.contains(PostProcess::FLIP_UVS) {
        if let Some(uvs) = mesh.tex_coords.as_mut() {
            for uv in uvs.iter_mut() {
                uv[1] = 1.0 - uv[1];
            }
        }
    }
    if steps.contains(PostProcess::CALC_TANGENT_SPACE)
        && mesh.tangents.is_none()
        && mesh.tex_coords.is_some()
    {
        let (tangents, bitangents) = tangent_space(mesh);
        mesh.tangents = Some(tangents);
        mesh.bitangents = Some(bitangents);
    }
}

/// Fan-triangulate polygons in place
fn triangulate(mesh: &mut SourceMesh) {
    let before = mesh.faces.len();
    let mut triangles = Vec::with_capacity(before);
    for face in &mesh.faces {
        if face.len() < 3 {
            continue;
        }
        for i in 1..face.len() - 1 {
            triangles.push(vec![face[0], face[i], face[i + 1]]);
        }
    }
    if triangles.len() != before {
        log::trace!("Triangulated '{}': {} faces -> {} triangles", mesh.name, before, triangles.len());
    }
    mesh.faces = triangles;
}

fn corner(mesh: &SourceMesh, index: u32) -> Option<Vec3> {
    mesh.positions.get(index as usize).map(|p| Vec3::from(*p))
}

fn smooth_normals(mesh: &SourceMesh) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::zeros(); mesh.positions.len()];

    for face in mesh.faces.iter().filter(|f| f.len() == 3) {
        let (Some(p0), Some(p1), Some(p2)) =
            (corner(mesh, face[0]), corner(mesh, face[1]), corner(mesh, face[2]))
        else {
            // out-of-range indices are reported by the importer
            continue;
        };
        // cross product length is twice the area, which weights the sum
        let face_normal = (p1 - p0).cross(&(p2 - p0));
        for &i in face {
            accum[i as usize] += face_normal;
        }
    }

    accum
        .into_iter()
        .map(|n| n.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros).into())
        .collect()
}

fn tangent_space(mesh: &SourceMesh) -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
    let count = mesh.positions.len();
    let mut tangents = vec![Vec3::zeros(); count];
    let mut bitangents = vec![Vec3::zeros(); count];
    let uvs = mesh.tex_coords.as_deref().unwrap_or(&[]);
    let uv = |i: u32| uvs.get(i as usize).map(|t| Vec2::new(t[0], t[1]));

    for face in mesh.faces.iter().filter(|f| f.len() == 3) {
        let (Some(p0), Some(p1), Some(p2)) =
            (corner(mesh, face[0]), corner(mesh, face[1]), corner(mesh, face[2]))
        else {
            continue;
        };
        let (Some(uv0), Some(uv1), Some(uv2)) = (uv(face[0]), uv(face[1]), uv(face[2])) else {
            continue;
        };

        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let d1 = uv1 - uv0;
        let d2 = uv2 - uv0;

        let det = d1.x * d2.y - d2.x * d1.y;
        if det.abs() < 1e-8 {
            continue;
        }
        let r = 1.0 / det;
        let tangent = (e1 * d2.y - e2 * d1.y) * r;
        let bitangent = (e2 * d1.x - e1 * d2.x) * r;

        for &i in face {
            tangents[i as usize] += tangent;
            bitangents[i as usize] += bitangent;
        }
    }

    let normals = mesh.normals.as_deref();
    let finish = |v: Vec3| -> [f32; 3] { v.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros).into() };

    let tangents = tangents
        .into_iter()
        .enumerate()
        .map(|(i, t)| {
            // Gram-Schmidt against the normal when there is one
            let t = match normals.and_then(|n| n.get(i)) {
                Some(n) => {
                    let n = Vec3::from(*n);
                    t - n * n.dot(&t)
                }
                None => t,
            };
            finish(t)
        })
        .collect();
    let bitangents = bitangents.into_iter().map(finish).collect();

    (tangents, bitangents)
}
