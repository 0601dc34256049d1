//! Texture decoding
//!
//! Decodes PNG images to tightly packed RGBA8 through the `image` crate.

use std::path::Path;

use super::AssetError;

/// Decoded RGBA8 image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    /// Raw RGBA pixel data, row-major
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl TextureImage {
    /// Load an image from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        log::debug!("Loading texture from {:?}", path);

        let img = image::open(path)
            .map_err(|e| AssetError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        log::info!("Loaded texture {}x{} from {:?}", width, height, path);
        Ok(Self {
            data: rgba.into_raw(),
            width,
            height,
        })
    }

    /// Decode an image held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AssetError::LoadFailed(format!("texture bytes: {}", e)))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            data: rgba.into_raw(),
            width,
            height,
        })
    }

    /// Single-colour image
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = (width * height) as usize;
        Self {
            data: color.repeat(pixels),
            width,
            height,
        }
    }

    /// Size of the pixel data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}
