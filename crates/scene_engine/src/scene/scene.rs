//! Scene container and per-frame driver

use slotmap::SlotMap;

use crate::foundation::math::{Mat4, Vec3};
use crate::render::{LightRig, ShadingStage, SpotLight};
use crate::scene::{SceneEntity, SceneError};

slotmap::new_key_type! {
    /// Stable identifier of an entity in a [`Scene`]
    pub struct EntityId;
}

/// Everything the frame driver needs from outside the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Seconds since the previous frame
    pub delta_time: f32,
    /// Camera view matrix
    pub view: Mat4,
    /// Camera projection matrix
    pub projection: Mat4,
    /// Camera position, for specular terms
    pub eye: Vec3,
}

impl FrameInput {
    /// Bundle one frame's inputs
    pub fn new(delta_time: f32, view: Mat4, projection: Mat4, eye: Vec3) -> Self {
        Self {
            delta_time,
            view,
            projection,
            eye,
        }
    }
}

/// What one frame submitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Entities drawn
    pub entities_drawn: usize,
    /// Meshes drawn
    pub meshes_drawn: usize,
    /// Triangles submitted
    pub triangles_drawn: usize,
    /// Spotlights forwarded
    pub lights_forwarded: usize,
}

/// Entities plus the light rig, drawn in spawn order
#[derive(Debug, Default)]
pub struct Scene {
    entities: SlotMap<EntityId, SceneEntity>,
    draw_order: Vec<EntityId>,
    lights: LightRig,
}

impl Scene {
    /// Empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity; it is drawn after every entity spawned before it
    pub fn spawn(&mut self, entity: SceneEntity) -> EntityId {
        log::debug!(
            "Spawning '{}' ({} meshes, {})",
            entity.name(),
            entity.meshes().len(),
            if entity.motion().is_kinematic() { "kinematic" } else { "static" }
        );
        let id = self.entities.insert(entity);
        self.draw_order.push(id);
        id
    }

    /// Entity by id
    pub fn entity(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entities.get(id)
    }

    /// Mutable entity by id
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut SceneEntity> {
        self.entities.get_mut(id)
    }

    /// First entity with the given name, in draw order
    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.draw_order
            .iter()
            .copied()
            .find(|&id| self.entities[id].name() == name)
    }

    /// Entities in draw order
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &SceneEntity)> {
        self.draw_order.iter().map(|&id| (id, &self.entities[id]))
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True when nothing has been spawned
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The light rig
    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    /// Mutable light rig
    pub fn lights_mut(&mut self) -> &mut LightRig {
        &mut self.lights
    }

    /// Add a free-standing spotlight, returning its rig index
    pub fn add_spot_light(&mut self, light: SpotLight) -> usize {
        self.lights.add(light)
    }

    /// Add a spotlight that tracks `target`
    pub fn add_following_light(&mut self, light: SpotLight, target: EntityId) -> Result<usize, SceneError> {
        if !self.entities.contains_key(target) {
            return Err(SceneError::UnknownEntity(target));
        }
        Ok(self.lights.add_following(light, target))
    }

    /// Make light `index` track `target`
    pub fn bind_light(&mut self, index: usize, target: EntityId) -> Result<(), SceneError> {
        if !self.entities.contains_key(target) {
            return Err(SceneError::UnknownEntity(target));
        }
        self.lights.bind(index, target)?;
        Ok(())
    }

    /// Advance every entity, then move bound lights onto their targets
    pub fn update(&mut self, dt: f32) {
        for &id in &self.draw_order {
            self.entities[id].update(dt);
        }
        let entities = &self.entities;
        self.lights.follow(|id| entities.get(id).map(SceneEntity::position));
    }

    /// Run one frame: update, follow, forward camera and lights, draw.
    ///
    /// Lights always see this frame's entity positions, never last frame's.
    pub fn render_frame(
        &mut self,
        input: &FrameInput,
        stage: &mut dyn ShadingStage,
    ) -> Result<FrameStats, SceneError> {
        self.update(input.delta_time);

        stage.set_camera(&input.view, &input.projection, input.eye)?;
        let lights = self.lights.uniforms();
        stage.set_spot_lights(&lights)?;

        let mut stats = FrameStats {
            lights_forwarded: lights.len(),
            ..FrameStats::default()
        };
        for &id in &self.draw_order {
            let entity = &self.entities[id];
            stats.triangles_drawn += entity.draw(stage)?;
            stats.meshes_drawn += entity.meshes().len();
            stats.entities_drawn += 1;
        }

        log::trace!(
            "Frame: {} entities, {} meshes, {} triangles, {} lights",
            stats.entities_drawn,
            stats.meshes_drawn,
            stats.triangles_drawn,
            stats.lights_forwarded
        );
        Ok(stats)
    }
}
