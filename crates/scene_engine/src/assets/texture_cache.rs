//! Per-model texture cache
//!
//! Materials routinely share texture files. The cache makes sure each path is
//! decoded and uploaded once per import session: records live in a slot
//! arena and a path index points into it. Paths are compared exactly as the
//! material spelled them; `a.png` and `./a.png` are different entries.

use std::collections::HashMap;
use std::path::Path;

use slotmap::SlotMap;

use crate::assets::{AssetError, ImageData};
use crate::render::{GpuUploader, TextureHandle};

slotmap::new_key_type! {
    /// Key of a texture record inside a [`TextureCache`]
    pub struct TextureKey;
}

/// One loaded texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRecord {
    /// GPU texture
    pub handle: TextureHandle,
    /// Path as referenced by the material
    pub path: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Path-to-texture cache owned by one imported model
#[derive(Debug, Default)]
pub struct TextureCache {
    records: SlotMap<TextureKey, TextureRecord>,
    order: Vec<TextureKey>,
    by_path: HashMap<String, TextureKey>,
    failed: HashMap<String, String>,
    srgb: bool,
}

impl TextureCache {
    /// Create an empty cache; `srgb` is passed to every upload
    pub fn new(srgb: bool) -> Self {
        Self {
            srgb,
            ..Self::default()
        }
    }

    /// Return the handle for `path`, loading `directory/path` on first use.
    ///
    /// A path that failed once fails again immediately without touching
    /// the disk.
    pub fn resolve(
        &mut self,
        path: &str,
        directory: &Path,
        uploader: &mut dyn GpuUploader,
    ) -> Result<TextureHandle, AssetError> {
        if let Some(&key) = self.by_path.get(path) {
            return Ok(self.records[key].handle);
        }
        if let Some(reason) = self.failed.get(path) {
            return Err(AssetError::TextureLoad {
                path: path.to_string(),
                reason: reason.clone(),
            });
        }

        match self.load(path, directory, uploader) {
            Ok(record) => {
                let handle = record.handle;
                let key = self.records.insert(record);
                self.order.push(key);
                self.by_path.insert(path.to_string(), key);
                Ok(handle)
            }
            Err(reason) => {
                self.failed.insert(path.to_string(), reason.clone());
                Err(AssetError::TextureLoad {
                    path: path.to_string(),
                    reason,
                })
            }
        }
    }

    fn load(
        &self,
        path: &str,
        directory: &Path,
        uploader: &mut dyn GpuUploader,
    ) -> Result<TextureRecord, String> {
        let full_path = directory.join(path);
        let image = ImageData::from_file(&full_path).map_err(|e| match e {
            AssetError::TextureLoad { reason, .. } => reason,
            other => other.to_string(),
        })?;
        let handle = uploader
            .upload_texture(&image, self.srgb)
            .map_err(|e| e.to_string())?;

        log::debug!(
            "Loaded texture {} ({}x{}) as {:?}",
            full_path.display(),
            image.width,
            image.height,
            handle
        );
        Ok(TextureRecord {
            handle,
            path: path.to_string(),
            width: image.width,
            height: image.height,
        })
    }

    /// Handle for an already loaded path, without loading anything
    pub fn lookup(&self, path: &str) -> Option<TextureHandle> {
        self.by_path.get(path).map(|&key| self.records[key].handle)
    }

    /// Record by key
    pub fn get(&self, key: TextureKey) -> Option<&TextureRecord> {
        self.records.get(key)
    }

    /// Loaded textures in load order
    pub fn records(&self) -> impl Iterator<Item = &TextureRecord> {
        self.order.iter().map(|&key| &self.records[key])
    }

    /// Paths that failed to load this session
    pub fn failed_paths(&self) -> impl Iterator<Item = &str> {
        self.failed.keys().map(String::as_str)
    }

    /// Whether uploads are tagged as sRGB
    pub fn srgb(&self) -> bool {
        self.srgb
    }

    /// Number of loaded textures
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been loaded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
