//! Scene description files
//!
//! A scene file lists the models to import, where to put them, which of them
//! orbit, and the spotlights. Every field has a default, so a file only needs
//! what differs.
//!
//! ```toml
//! [[models]]
//! name = "blimp"
//! path = "models/blimp/blimp.obj"
//! scale = [0.2, 0.2, 0.2]
//! orbit = { speed = 0.5, semi_major = 1.0, semi_minor = 2.0, center = [0.0, 1.5, 0.0] }
//!
//! [[spot_lights]]
//! position = [1.2, 1.0, 2.0]
//! follow = "blimp"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::assets::ImportSettings;
use crate::config::Config;
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::render::{RenderError, SpotLight};
use crate::scene::{EllipticalOrbit, EntityTransform};

/// Whole scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Import options shared by every model
    pub import: ImportSettings,
    /// Models in draw order
    pub models: Vec<ModelConfig>,
    /// Spotlights in rig order
    pub spot_lights: Vec<SpotLightConfig>,
    /// Fixed camera used by the demo shell
    pub camera: CameraConfig,
    /// Frame timing
    pub frame: FrameConfig,
}

impl Config for SceneConfig {}

/// One model placed in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Entity name, used by lights to refer to it
    pub name: String,
    /// Model file, relative to the scene file
    pub path: PathBuf,
    /// World position; ignored for orbiting models
    pub position: Vec3,
    /// Euler rotation in degrees; ignored for orbiting models
    pub rotation: Vec3,
    /// Per-axis scale
    pub scale: Vec3,
    /// Makes the model kinematic
    pub orbit: Option<OrbitConfig>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            path: PathBuf::new(),
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            orbit: None,
        }
    }
}

impl ModelConfig {
    /// Initial transform
    pub fn transform(&self) -> EntityTransform {
        EntityTransform {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }
}

/// Elliptical path parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Radians per second
    pub speed: f32,
    /// X extent
    pub semi_major: f32,
    /// Z extent
    pub semi_minor: f32,
    /// Ellipse center
    pub center: Vec3,
    /// Starting phase in radians
    pub phase: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            speed: 0.5,
            semi_major: 1.0,
            semi_minor: 2.0,
            center: Vec3::new(0.0, 1.5, 0.0),
            phase: 0.0,
        }
    }
}

impl OrbitConfig {
    /// Build the orbit
    pub fn to_orbit(&self) -> EllipticalOrbit {
        EllipticalOrbit::new(self.speed, self.semi_major, self.semi_minor, self.center).with_phase(self.phase)
    }
}

/// One spotlight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotLightConfig {
    /// Initial position
    pub position: Vec3,
    /// Cone direction, normalized on load
    pub direction: Vec3,
    /// Inner cone half-angle in degrees
    pub inner_cutoff: f32,
    /// Outer cone half-angle in degrees
    pub outer_cutoff: f32,
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
    /// Name of the model to follow
    pub follow: Option<String>,
}

impl Default for SpotLightConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(1.2, 1.0, 2.0),
            direction: Vec3::new(0.0, -1.0, 0.0),
            inner_cutoff: 12.5,
            outer_cutoff: 17.5,
            ambient: Vec3::zeros(),
            diffuse: Vec3::new(1.0, 1.0, 1.0),
            specular: Vec3::new(1.0, 1.0, 1.0),
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
            follow: None,
        }
    }
}

impl SpotLightConfig {
    /// Build and validate the light
    pub fn to_spot_light(&self) -> Result<SpotLight, RenderError> {
        Ok(SpotLight::new(self.position, self.direction, self.inner_cutoff, self.outer_cutoff)?
            .with_colors(self.ambient, self.diffuse, self.specular)
            .with_attenuation(self.constant, self.linear, self.quadratic))
    }
}

/// Fixed camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position
    pub eye: Vec3,
    /// Look-at point
    pub target: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov_y: f32,
    /// Width over height
    pub aspect: f32,
    /// Near plane
    pub near: f32,
    /// Far plane
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 10.0, 50.0),
            target: Vec3::zeros(),
            up: Vec3::y(),
            fov_y: 45.0,
            aspect: 800.0 / 600.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl CameraConfig {
    /// View matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.eye, self.target, self.up)
    }

    /// Projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_deg(self.fov_y, self.aspect, self.near, self.far)
    }
}

/// Frame timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Largest delta handed to the scene, in seconds
    pub max_delta: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { max_delta: 0.25 }
    }
}
