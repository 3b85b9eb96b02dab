//! Image decoding for texture data
//!
//! Everything is converted to RGBA8 before it reaches the uploader.

use std::path::Path;

use crate::assets::AssetError;

/// Decoded image ready for GPU upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// RGBA8 pixels, row-major, top row first
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Channel count, always 4
    pub channels: u8,
}

impl ImageData {
    /// Decode an image file in any format the `image` crate was built with
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        log::debug!("Decoding image {}", path.display());

        let img = image::open(path).map_err(|e| AssetError::TextureLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_rgba(img.to_rgba8()))
    }

    /// Decode an in-memory image
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes).map_err(|e| AssetError::TextureLoad {
            path: "<memory>".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_rgba(img.to_rgba8()))
    }

    fn from_rgba(rgba: image::RgbaImage) -> Self {
        let (width, height) = rgba.dimensions();
        Self {
            data: rgba.into_raw(),
            width,
            height,
            channels: 4,
        }
    }

    /// Single-color image
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            data: color.repeat(pixel_count),
            width,
            height,
            channels: 4,
        }
    }

    /// Pixel data size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_color_image() {
        let img = ImageData::solid_color(4, 2, [255, 0, 0, 255]);
        assert_eq!((img.width, img.height, img.channels), (4, 2, 4));
        assert_eq!(img.size_bytes(), 4 * 2 * 4);
        assert_eq!(&img.data[28..32], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_from_bytes_decodes_png() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(3, 1, image::Rgba([0, 255, 0, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let img = ImageData::from_bytes(&png).unwrap();
        assert_eq!((img.width, img.height), (3, 1));
        assert_eq!(&img.data[0..4], &[0, 255, 0, 255]);
    }

    #[test]
    fn test_garbage_is_a_texture_error() {
        let err = ImageData::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, AssetError::TextureLoad { .. }));
    }
}
