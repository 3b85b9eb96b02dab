//! # Scene Engine
//!
//! Model import and scene composition for real-time rendering.
//!
//! ## Features
//!
//! - **Model Import**: Scene-graph flattening into GPU-ready meshes
//! - **Texture Caching**: Per-model deduplication of texture files by path
//! - **Procedural Motion**: Entities orbiting closed elliptical paths
//! - **Light Rigs**: Spotlights that follow moving entities
//! - **Backend Agnostic**: GPU upload and shading live behind two small traits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SceneConfig::load_from_file("resources/scenes/blimp.toml")?;
//!     let mut backend = HeadlessBackend::new();
//!     let mut scene = SceneBuilder::new(&config).build(&ObjSceneSource, &mut backend)?;
//!
//!     let input = FrameInput::new(1.0 / 60.0, Mat4::identity(), Mat4::identity(), Vec3::zeros());
//!     scene.render_frame(&input, &mut backend)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod render;
pub mod scene;

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{
            AssetError, ImportSettings, ImportedModel, ModelImporter, ObjSceneSource,
            PostProcess, SceneSource, TextureCache,
        },
        config::{Config, ConfigError, SceneConfig},
        foundation::{
            math::{Mat4, Vec3},
            time::FrameClock,
        },
        render::{
            GpuUploader, HeadlessBackend, LightRig, RenderError, RenderableMesh, ShadingStage,
            SpotLight, TextureHandle, TextureRole, Vertex,
        },
        scene::{
            EllipticalOrbit, EntityId, EntityTransform, FrameInput, FrameStats, Motion, Scene,
            SceneBuilder, SceneEntity, SceneError,
        },
    };
}
