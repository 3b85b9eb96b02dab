//! Scene entities

use std::sync::Arc;

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::render::{BackendResult, RenderableMesh, ShadingStage};
use crate::scene::motion::{EllipticalOrbit, Motion};
use crate::scene::SceneError;

/// Position, Euler rotation in degrees, and non-uniform scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityTransform {
    /// World-space position
    pub position: Vec3,
    /// Rotation about X, Y and Z in degrees, composed as `rotX · rotY · rotZ`
    pub rotation: Vec3,
    /// Per-axis scale
    pub scale: Vec3,
}

impl Default for EntityTransform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl EntityTransform {
    /// Identity transform at `position`
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// `translate · rotX · rotY · rotZ · scale`
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * Mat4::rotation_x_deg(self.rotation.x)
            * Mat4::rotation_y_deg(self.rotation.y)
            * Mat4::rotation_z_deg(self.rotation.z)
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

/// Something drawn in the scene: a transform plus shared meshes
///
/// Meshes sit behind an `Arc` so several entities can draw the same imported
/// model without copying or re-uploading it.
#[derive(Debug, Clone)]
pub struct SceneEntity {
    name: String,
    transform: EntityTransform,
    meshes: Arc<[RenderableMesh]>,
    motion: Motion,
}

impl SceneEntity {
    /// Static entity at the origin
    pub fn new(name: impl Into<String>, meshes: impl Into<Arc<[RenderableMesh]>>) -> Self {
        Self {
            name: name.into(),
            transform: EntityTransform::default(),
            meshes: meshes.into(),
            motion: Motion::Static,
        }
    }

    /// Entity that follows `orbit`, placed at the orbit's current point
    pub fn kinematic(
        name: impl Into<String>,
        meshes: impl Into<Arc<[RenderableMesh]>>,
        orbit: EllipticalOrbit,
    ) -> Self {
        Self::new(name, meshes).with_motion(Motion::Kinematic(orbit))
    }

    /// Replace the transform
    #[must_use]
    pub fn with_transform(mut self, transform: EntityTransform) -> Self {
        self.transform = transform;
        self.sync_with_motion();
        self
    }

    /// Replace the motion state
    #[must_use]
    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self.sync_with_motion();
        self
    }

    /// Move a static entity.
    ///
    /// Kinematic entities derive position and rotation from their orbit, so
    /// only a scale change is accepted for them.
    pub fn set_transform(&mut self, transform: EntityTransform) -> Result<(), SceneError> {
        if self.motion.is_kinematic()
            && (transform.position != self.transform.position
                || transform.rotation != self.transform.rotation)
        {
            return Err(SceneError::KinematicTransform(self.name.clone()));
        }
        self.transform = transform;
        Ok(())
    }

    /// Change the scale; allowed for every entity
    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
    }

    fn sync_with_motion(&mut self) {
        if let Motion::Kinematic(orbit) = &self.motion {
            self.transform.position = orbit.position();
            self.transform.rotation = Vec3::new(0.0, orbit.yaw_degrees(), 0.0);
        }
    }

    /// Advance motion by `dt` seconds; static entities are untouched
    pub fn update(&mut self, dt: f32) {
        if let Motion::Kinematic(orbit) = &mut self.motion {
            orbit.advance(dt);
            self.sync_with_motion();
        }
    }

    /// Forward the model matrix, then draw every mesh in order.
    ///
    /// Returns the number of triangles submitted.
    pub fn draw(&self, stage: &mut dyn ShadingStage) -> BackendResult<usize> {
        stage.set_model_matrix(&self.transform.model_matrix())?;
        let mut triangles = 0;
        for mesh in self.meshes.iter() {
            mesh.draw(stage)?;
            triangles += mesh.triangle_count();
        }
        Ok(triangles)
    }

    /// Entity name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current transform
    pub fn transform(&self) -> &EntityTransform {
        &self.transform
    }

    /// World-space position
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Shared mesh list
    pub fn meshes(&self) -> &Arc<[RenderableMesh]> {
        &self.meshes
    }

    /// Motion state
    pub fn motion(&self) -> &Motion {
        &self.motion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{HeadlessBackend, RecordedCommand, Vertex};
    use approx::assert_relative_eq;

    fn no_meshes() -> Vec<RenderableMesh> {
        Vec::new()
    }

    fn cube_ish(backend: &mut HeadlessBackend) -> Vec<RenderableMesh> {
        let verts = vec![
            Vertex::from_position([0.0, 0.0, 0.0]),
            Vertex::from_position([1.0, 0.0, 0.0]),
            Vertex::from_position([0.0, 1.0, 0.0]),
        ];
        vec![
            RenderableMesh::new("a", verts.clone(), vec![0, 1, 2], vec![], backend).unwrap(),
            RenderableMesh::new("b", verts, vec![0, 1, 2, 2, 1, 0], vec![], backend).unwrap(),
        ]
    }

    #[test]
    fn test_model_matrix_order() {
        let transform = EntityTransform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::new(0.0, 90.0, 0.0),
            scale: Vec3::new(2.0, 1.0, 1.0),
        };
        // scale first, then rotate +X onto -Z, then translate
        let p = transform.model_matrix().transform_point(&nalgebra::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.coords, Vec3::new(1.0, 2.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_composition_order() {
        let transform = EntityTransform {
            rotation: Vec3::new(90.0, 90.0, 0.0),
            ..EntityTransform::default()
        };
        // rotY acts on the vector first: +Y stays +Y, then rotX takes it to +Z
        let v = transform.model_matrix().transform_vector(&Vec3::y());
        assert_relative_eq!(v, Vec3::z(), epsilon = 1e-5);
    }

    #[test]
    fn test_draw_sets_matrix_once_then_meshes_in_order() {
        let mut backend = HeadlessBackend::new();
        let entity = SceneEntity::new("pair", cube_ish(&mut backend));
        backend.clear_commands();

        let triangles = entity.draw(&mut backend).unwrap();
        assert_eq!(triangles, 3);

        let commands = backend.commands();
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], RecordedCommand::SetModelMatrix(_)));
        let drawn: Vec<_> = commands[1..]
            .iter()
            .map(|c| match c {
                RecordedCommand::DrawIndexed { index_count, .. } => *index_count,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(drawn, vec![3, 6]);
    }

    #[test]
    fn test_kinematic_update_derives_transform() {
        let mut entity = SceneEntity::kinematic("blimp", no_meshes(), EllipticalOrbit::default());
        assert_relative_eq!(entity.position(), Vec3::new(1.0, 1.5, 0.0));

        // half a lap at 0.5 rad/s
        entity.update(std::f32::consts::TAU);
        assert_relative_eq!(entity.position(), Vec3::new(-1.0, 1.5, 0.0), epsilon = 1e-5);
        assert_relative_eq!(entity.transform().rotation.y.abs(), 180.0, epsilon = 1e-3);
        assert_relative_eq!(entity.transform().rotation.x, 0.0);
    }

    #[test]
    fn test_static_update_is_a_no_op() {
        let mut entity = SceneEntity::new("rock", no_meshes()).with_transform(EntityTransform::at(Vec3::x()));
        entity.update(10.0);
        assert_relative_eq!(entity.position(), Vec3::x());
        assert!(!entity.motion().is_kinematic());
    }

    #[test]
    fn test_kinematic_transform_is_read_only() {
        let mut entity = SceneEntity::kinematic("blimp", no_meshes(), EllipticalOrbit::default());
        let before = *entity.transform();

        let moved = EntityTransform::at(Vec3::new(9.0, 9.0, 9.0));
        assert!(matches!(
            entity.set_transform(moved),
            Err(SceneError::KinematicTransform(name)) if name == "blimp"
        ));
        assert_eq!(*entity.transform(), before);

        entity.set_scale(Vec3::repeat(2.0));
        let rescaled = *entity.transform();
        assert_eq!(rescaled.scale, Vec3::repeat(2.0));
        assert!(entity.set_transform(rescaled).is_ok());
        assert_eq!(rescaled.position, before.position);
    }

    #[test]
    fn test_static_transform_can_be_set() {
        let mut entity = SceneEntity::new("rock", no_meshes());
        entity.set_transform(EntityTransform::at(Vec3::y())).unwrap();
        assert_relative_eq!(entity.position(), Vec3::y());
    }

    #[test]
    fn test_clones_share_meshes() {
        let mut backend = HeadlessBackend::new();
        let a = SceneEntity::new("a", cube_ish(&mut backend));
        let b = a.clone();
        assert!(Arc::ptr_eq(a.meshes(), b.meshes()));
    }
}
