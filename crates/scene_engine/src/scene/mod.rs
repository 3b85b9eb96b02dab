//! Scene composition
//!
//! A [`Scene`] owns entities and a light rig and drives one frame at a time:
//!
//! ```text
//! FrameInput ─► update entities ─► lights follow ─► set_camera
//!                                                ─► set_spot_lights
//!                                                ─► draw entities (spawn order)
//! ```
//!
//! [`SceneBuilder`] assembles a scene from a
//! [`SceneConfig`](crate::config::SceneConfig).

mod builder;
mod entity;
mod motion;
#[allow(clippy::module_inception)]
mod scene;

pub use builder::SceneBuilder;
pub use entity::{EntityTransform, SceneEntity};
pub use motion::{EllipticalOrbit, Motion};
pub use scene::{EntityId, FrameInput, FrameStats, Scene};

use thiserror::Error;

use crate::render::RenderError;

/// Scene errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// An entity id does not belong to this scene
    #[error("Unknown entity {0:?}")]
    UnknownEntity(EntityId),

    /// A light was configured to follow a model that does not exist
    #[error("Spot light follows unknown model '{0}'")]
    UnknownFollowTarget(String),

    /// Position and rotation of a kinematic entity come from its orbit
    #[error("Entity '{0}' is kinematic; only its scale can be set")]
    KinematicTransform(String),

    /// Invalid configuration value
    #[error("Invalid scene configuration: {0}")]
    InvalidConfig(String),

    /// The backend failed during a frame
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}
