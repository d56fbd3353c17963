use image::imageops::FilterType;

use super::renderer::encode_png;
use super::{ExportError, ExportedImage};

/// Images above this size are shrunk before upload
pub const COMPRESSION_THRESHOLD_BYTES: usize = 2 * 1024 * 1024;

const SCALE_STEP: f32 = 0.8;
const MIN_DIMENSION: u32 = 64;

/// Re-encode with maximum compression, then downscale until the PNG fits `limit`.
///
/// Images already under the limit are returned untouched. The result can still
/// exceed the limit when the image cannot shrink below the minimum dimension.
pub fn compress_png(image: ExportedImage, limit: usize) -> Result<ExportedImage, ExportError> {
    if image.bytes.len() <= limit {
        return Ok(image);
    }

    let original_size = image.bytes.len();
    let mut current = image::load_from_memory(&image.bytes)
        .map_err(|e| ExportError::Decode(e.to_string()))?
        .to_rgba8();

    let mut bytes = encode_png(&current)?;

    while bytes.len() > limit {
        let width = (current.width() as f32 * SCALE_STEP) as u32;
        let height = (current.height() as f32 * SCALE_STEP) as u32;
        if width < MIN_DIMENSION || height < MIN_DIMENSION {
            log::warn!(
                "Cannot shrink image below {}px, keeping {} bytes",
                MIN_DIMENSION,
                bytes.len()
            );
            break;
        }

        current = image::imageops::resize(&current, width, height, FilterType::Triangle);
        bytes = encode_png(&current)?;
    }

    log::info!(
        "🗜️  Compressed map image from {} to {} bytes ({}x{})",
        original_size,
        bytes.len(),
        current.width(),
        current.height()
    );

    Ok(ExportedImage {
        width: current.width(),
        height: current.height(),
        bytes,
    })
}
