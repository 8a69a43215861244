//! Image preprocessing before inference.
//!
//! Decodes any supported format, converts to 8-bit RGB and re-encodes as
//! PNG so the detector always receives the same pixel layout.

use std::io::Cursor;
use std::path::Path;

use defectlab_core::detection::InferenceError;
use image::ImageFormat;

/// An RGB image ready to be sent to the detector.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    /// PNG-encoded RGB8 pixels.
    pub png: Vec<u8>,
}

/// Load `path` and convert it to an RGB PNG.
pub fn prepare_image(path: &Path) -> Result<PreparedImage, InferenceError> {
    let bytes = std::fs::read(path)?;
    prepare_bytes(&bytes)
}

/// Convert encoded image bytes to an RGB PNG.
pub fn prepare_bytes(bytes: &[u8]) -> Result<PreparedImage, InferenceError> {
    let rgb = image::load_from_memory(bytes)
        .map_err(|e| InferenceError::Preprocess(e.to_string()))?
        .to_rgb8();

    let (width, height) = rgb.dimensions();
    let mut png = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| InferenceError::Preprocess(e.to_string()))?;

    Ok(PreparedImage { width, height, png })
}
