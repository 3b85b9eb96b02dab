//! Spotlight rig
//!
//! Spotlights keep their cone angles in degrees; the cosine form the shading
//! stage wants is produced only when the rig is forwarded. A light may be
//! bound to one scene entity, in which case its position is overwritten from
//! that entity every frame.

use crate::foundation::math::{utils, Vec3};
use crate::render::RenderError;
use crate::scene::EntityId;

/// Spot light source
#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    position: Vec3,
    direction: Vec3,
    inner_cutoff_deg: f32,
    outer_cutoff_deg: f32,
    /// Ambient color
    pub ambient: Vec3,
    /// Diffuse color
    pub diffuse: Vec3,
    /// Specular color
    pub specular: Vec3,
    /// Constant attenuation term
    pub constant: f32,
    /// Linear attenuation term
    pub linear: f32,
    /// Quadratic attenuation term
    pub quadratic: f32,
}

impl SpotLight {
    /// Create a white spotlight with the usual 50-unit attenuation curve.
    ///
    /// Fails when `direction` is zero or the inner cone is wider than the
    /// outer one.
    pub fn new(
        position: Vec3,
        direction: Vec3,
        inner_cutoff_deg: f32,
        outer_cutoff_deg: f32,
    ) -> Result<Self, RenderError> {
        let direction = Self::checked_direction(direction)?;
        Self::check_cutoffs(inner_cutoff_deg, outer_cutoff_deg)?;

        Ok(Self {
            position,
            direction,
            inner_cutoff_deg,
            outer_cutoff_deg,
            ambient: Vec3::zeros(),
            diffuse: Vec3::new(1.0, 1.0, 1.0),
            specular: Vec3::new(1.0, 1.0, 1.0),
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        })
    }

    /// Replace the three color terms
    #[must_use]
    pub fn with_colors(mut self, ambient: Vec3, diffuse: Vec3, specular: Vec3) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }

    /// Replace the attenuation terms
    #[must_use]
    pub fn with_attenuation(mut self, constant: f32, linear: f32, quadratic: f32) -> Self {
        self.constant = constant;
        self.linear = linear;
        self.quadratic = quadratic;
        self
    }

    fn checked_direction(direction: Vec3) -> Result<Vec3, RenderError> {
        direction
            .try_normalize(f32::EPSILON)
            .ok_or_else(|| RenderError::InvalidLight(format!("direction {direction:?} has no length")))
    }

    fn check_cutoffs(inner: f32, outer: f32) -> Result<(), RenderError> {
        if inner.is_finite() && outer.is_finite() && inner <= outer {
            Ok(())
        } else {
            Err(RenderError::InvalidLight(format!(
                "inner cutoff {inner}° must not exceed outer cutoff {outer}°"
            )))
        }
    }

    /// World-space position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move the light
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Unit direction the cone points along
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Re-aim the light; the direction is normalized
    pub fn set_direction(&mut self, direction: Vec3) -> Result<(), RenderError> {
        self.direction = Self::checked_direction(direction)?;
        Ok(())
    }

    /// Inner cone half-angle in degrees
    pub fn inner_cutoff_deg(&self) -> f32 {
        self.inner_cutoff_deg
    }

    /// Outer cone half-angle in degrees
    pub fn outer_cutoff_deg(&self) -> f32 {
        self.outer_cutoff_deg
    }

    /// Change both cone angles at once
    pub fn set_cutoffs(&mut self, inner_deg: f32, outer_deg: f32) -> Result<(), RenderError> {
        Self::check_cutoffs(inner_deg, outer_deg)?;
        self.inner_cutoff_deg = inner_deg;
        self.outer_cutoff_deg = outer_deg;
        Ok(())
    }

    /// Shading-stage form of this light
    pub fn to_uniform(&self) -> SpotLightUniform {
        SpotLightUniform {
            position: self.position,
            direction: self.direction,
            cut_off: utils::deg_to_rad(self.inner_cutoff_deg).cos(),
            outer_cut_off: utils::deg_to_rad(self.outer_cutoff_deg).cos(),
            ambient: self.ambient,
            diffuse: self.diffuse,
            specular: self.specular,
            constant: self.constant,
            linear: self.linear,
            quadratic: self.quadratic,
        }
    }
}

/// Spotlight as forwarded to the shading stage
///
/// Cutoffs are cosines of the cone half-angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLightUniform {
    /// World-space position
    pub position: Vec3,
    /// Unit direction
    pub direction: Vec3,
    /// cos(inner cutoff)
    pub cut_off: f32,
    /// cos(outer cutoff)
    pub outer_cut_off: f32,
    /// Ambient color
    pub ambient: Vec3,
    /// Diffuse color
    pub diffuse: Vec3,
    /// Specular color
    pub specular: Vec3,
    /// Constant attenuation
    pub constant: f32,
    /// Linear attenuation
    pub linear: f32,
    /// Quadratic attenuation
    pub quadratic: f32,
}

#[derive(Debug, Clone)]
struct RigEntry {
    light: SpotLight,
    follow: Option<EntityId>,
}

/// Ordered collection of spotlights
///
/// Rig order is the order lights are forwarded in, so index `i` here is
/// index `i` in the shading stage's light array.
#[derive(Debug, Clone, Default)]
pub struct LightRig {
    entries: Vec<RigEntry>,
}

impl LightRig {
    /// Create an empty rig
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a free-standing light and return its index
    pub fn add(&mut self, light: SpotLight) -> usize {
        self.entries.push(RigEntry { light, follow: None });
        self.entries.len() - 1
    }

    /// Add a light that follows `entity` and return its index
    pub fn add_following(&mut self, light: SpotLight, entity: EntityId) -> usize {
        self.entries.push(RigEntry {
            light,
            follow: Some(entity),
        });
        self.entries.len() - 1
    }

    /// Bind light `index` to `entity`, replacing any previous binding
    pub fn bind(&mut self, index: usize, entity: EntityId) -> Result<(), RenderError> {
        let entry = self.entry_mut(index)?;
        entry.follow = Some(entity);
        Ok(())
    }

    /// Stop light `index` from following anything; it stays where it is
    pub fn unbind(&mut self, index: usize) -> Result<Option<EntityId>, RenderError> {
        Ok(self.entry_mut(index)?.follow.take())
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut RigEntry, RenderError> {
        let count = self.entries.len();
        self.entries
            .get_mut(index)
            .ok_or_else(|| RenderError::InvalidLight(format!("light index {index} out of range ({count} lights)")))
    }

    /// Light at `index`
    pub fn light(&self, index: usize) -> Option<&SpotLight> {
        self.entries.get(index).map(|e| &e.light)
    }

    /// Mutable light at `index`
    pub fn light_mut(&mut self, index: usize) -> Option<&mut SpotLight> {
        self.entries.get_mut(index).map(|e| &mut e.light)
    }

    /// Entity that light `index` follows, if any
    pub fn follow_target(&self, index: usize) -> Option<EntityId> {
        self.entries.get(index).and_then(|e| e.follow)
    }

    /// Lights in rig order
    pub fn lights(&self) -> impl Iterator<Item = &SpotLight> {
        self.entries.iter().map(|e| &e.light)
    }

    /// Number of lights
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the rig has no lights
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy each bound entity's position onto its light.
    ///
    /// `position_of` returns `None` for entities that no longer exist; those
    /// lights keep their last position. Returns how many lights moved.
    pub fn follow<F>(&mut self, position_of: F) -> usize
    where
        F: Fn(EntityId) -> Option<Vec3>,
    {
        let mut moved = 0;
        for (index, entry) in self.entries.iter_mut().enumerate() {
            let Some(target) = entry.follow else { continue };
            match position_of(target) {
                Some(position) => {
                    entry.light.position = position;
                    moved += 1;
                }
                None => log::warn!("Spot light {index} follows a missing entity"),
            }
        }
        moved
    }

    /// All lights in forwarding form, in rig order
    pub fn uniforms(&self) -> Vec<SpotLightUniform> {
        self.entries.iter().map(|e| e.light.to_uniform()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use slotmap::SlotMap;

    fn down_light(position: Vec3) -> SpotLight {
        SpotLight::new(position, Vec3::new(0.0, -2.0, 0.0), 12.5, 17.5).unwrap()
    }

    #[test]
    fn test_direction_is_normalized() {
        let light = down_light(Vec3::zeros());
        assert_relative_eq!(light.direction(), Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(SpotLight::new(Vec3::zeros(), Vec3::zeros(), 10.0, 20.0).is_err());
        assert!(SpotLight::new(Vec3::zeros(), Vec3::y(), 30.0, 20.0).is_err());

        let mut light = down_light(Vec3::zeros());
        assert!(light.set_cutoffs(25.0, 5.0).is_err());
        assert_relative_eq!(light.inner_cutoff_deg(), 12.5);
    }

    #[test]
    fn test_uniform_uses_cosines() {
        let light = down_light(Vec3::new(1.2, 1.0, 2.0));
        let uniform = light.to_uniform();

        assert_relative_eq!(uniform.cut_off, 12.5_f32.to_radians().cos(), epsilon = 1e-6);
        assert_relative_eq!(uniform.outer_cut_off, 17.5_f32.to_radians().cos(), epsilon = 1e-6);
        assert!(uniform.cut_off > uniform.outer_cut_off);
        // storage stays in degrees
        assert_relative_eq!(light.outer_cutoff_deg(), 17.5);
    }

    #[test]
    fn test_follow_only_moves_bound_lights() {
        let mut ids: SlotMap<EntityId, Vec3> = SlotMap::with_key();
        let blimp = ids.insert(Vec3::new(3.0, 1.5, 0.0));

        let mut rig = LightRig::new();
        let fixed = rig.add(down_light(Vec3::new(1.2, 1.0, 2.0)));
        let chase = rig.add_following(down_light(Vec3::zeros()), blimp);

        assert_eq!(rig.follow(|id| ids.get(id).copied()), 1);
        assert_relative_eq!(rig.light(fixed).unwrap().position(), Vec3::new(1.2, 1.0, 2.0));
        assert_relative_eq!(rig.light(chase).unwrap().position(), Vec3::new(3.0, 1.5, 0.0));

        assert_eq!(rig.unbind(chase).unwrap(), Some(blimp));
        ids[blimp] = Vec3::new(-1.0, 0.0, 0.0);
        assert_eq!(rig.follow(|id| ids.get(id).copied()), 0);
        assert_relative_eq!(rig.light(chase).unwrap().position(), Vec3::new(3.0, 1.5, 0.0));
    }

    #[test]
    fn test_missing_target_keeps_position() {
        let mut ids: SlotMap<EntityId, Vec3> = SlotMap::with_key();
        let gone = ids.insert(Vec3::new(9.0, 9.0, 9.0));
        ids.remove(gone);

        let mut rig = LightRig::new();
        let index = rig.add_following(down_light(Vec3::new(1.0, 2.0, 3.0)), gone);
        assert_eq!(rig.follow(|id| ids.get(id).copied()), 0);
        assert_relative_eq!(rig.light(index).unwrap().position(), Vec3::new(1.0, 2.0, 3.0));
        assert!(rig.bind(7, gone).is_err());
    }
}
