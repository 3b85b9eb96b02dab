//! Scene assembly from a [`SceneConfig`]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::{ModelImporter, SceneSource};
use crate::config::SceneConfig;
use crate::render::{GpuUploader, RenderableMesh};
use crate::scene::{EntityId, Motion, Scene, SceneEntity, SceneError};

/// Builds a [`Scene`] by importing every configured model
///
/// A model that fails to import is logged and spawned without meshes, so the
/// rest of the scene (and any light following it) still works. Models that
/// share a file share one set of meshes.
pub struct SceneBuilder<'a> {
    config: &'a SceneConfig,
    base_dir: PathBuf,
}

impl<'a> SceneBuilder<'a> {
    /// Builder resolving model paths against the working directory
    pub fn new(config: &'a SceneConfig) -> Self {
        Self {
            config,
            base_dir: PathBuf::new(),
        }
    }

    /// Resolve model paths against `dir`, usually the scene file's directory
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Import models, spawn entities and set up the light rig
    pub fn build(
        &self,
        source: &dyn SceneSource,
        uploader: &mut dyn GpuUploader,
    ) -> Result<Scene, SceneError> {
        let importer = ModelImporter::new(source, self.config.import);
        let mut imported: HashMap<PathBuf, Arc<[RenderableMesh]>> = HashMap::new();
        let mut by_name: HashMap<&str, EntityId> = HashMap::new();
        let mut scene = Scene::new();

        for model in &self.config.models {
            let path = self.base_dir.join(&model.path);
            let meshes = match imported.get(&path) {
                Some(meshes) => Arc::clone(meshes),
                None => {
                    let meshes = Self::import_or_empty(&importer, &path, &model.name, uploader);
                    imported.insert(path, Arc::clone(&meshes));
                    meshes
                }
            };

            let motion = model
                .orbit
                .as_ref()
                .map_or(Motion::Static, |orbit| Motion::Kinematic(orbit.to_orbit()));
            let entity = SceneEntity::new(model.name.clone(), meshes)
                .with_transform(model.transform())
                .with_motion(motion);

            let id = scene.spawn(entity);
            if by_name.insert(model.name.as_str(), id).is_some() {
                log::warn!("Duplicate model name '{}'; lights follow the last one", model.name);
            }
        }

        for (index, light_config) in self.config.spot_lights.iter().enumerate() {
            let light = light_config.to_spot_light()?;
            match &light_config.follow {
                Some(name) => {
                    let target = *by_name
                        .get(name.as_str())
                        .ok_or_else(|| SceneError::UnknownFollowTarget(name.clone()))?;
                    scene.add_following_light(light, target)?;
                    log::debug!("Spot light {index} follows '{name}'");
                }
                None => {
                    scene.add_spot_light(light);
                }
            }
        }

        log::info!(
            "Scene ready: {} entities, {} spot lights",
            scene.len(),
            scene.lights().len()
        );
        Ok(scene)
    }

    fn import_or_empty(
        importer: &ModelImporter<'_>,
        path: &Path,
        name: &str,
        uploader: &mut dyn GpuUploader,
    ) -> Arc<[RenderableMesh]> {
        match importer.import(path, uploader) {
            Ok(model) => model.into_meshes().into(),
            Err(err) => {
                log::error!("Failed to import model '{}' from {}: {}", name, path.display(), err);
                Arc::from(Vec::new())
            }
        }
    }
}
