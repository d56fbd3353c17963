//! Map image export.
//!
//! The pipeline walks an ordered list of [`Renderer`]s and keeps the first PNG
//! that renders. The default order captures the markup directly and falls back
//! to a rewritten copy when the markup uses color syntax the rasterizer cannot
//! read.

pub mod compress;
pub mod css_color;
pub mod renderer;

use base64::{engine::general_purpose, Engine as _};

use crate::utils::format::format_bytes;
pub use compress::{compress_png, COMPRESSION_THRESHOLD_BYTES};
pub use css_color::ColorParseError;
pub use renderer::{CloneAndRewrite, DirectCapture, Renderer, SvgToCanvas};

/// Largest PNG the pipeline hands out
pub const MAX_EXPORT_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("markup uses color functions the rasterizer cannot parse")]
    UnsupportedColorSyntax,

    #[error("failed to resolve colors: {0}")]
    Color(#[from] ColorParseError),

    #[error("failed to parse SVG: {0}")]
    Parse(String),

    #[error("invalid scale factor {0}")]
    InvalidScale(f32),

    #[error("cannot allocate a {width}x{height} canvas")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("failed to encode PNG: {0}")]
    Encode(String),

    #[error("failed to decode PNG: {0}")]
    Decode(String),

    #[error("exported image is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("no renderer configured")]
    NoRenderer,
}

#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ExportedImage {
    pub fn data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    pub fn size_label(&self) -> String {
        format_bytes(self.bytes.len() as u64)
    }
}

pub struct ExportPipeline {
    renderers: Vec<Box<dyn Renderer>>,
    max_bytes: usize,
}

impl ExportPipeline {
    pub fn new(renderers: Vec<Box<dyn Renderer>>, max_bytes: usize) -> Self {
        Self {
            renderers,
            max_bytes,
        }
    }

    /// Direct capture first, clone-and-rewrite as the fallback
    pub fn with_pixel_ratio(pixel_ratio: f32) -> Self {
        Self::new(
            vec![
                Box::new(DirectCapture { pixel_ratio }),
                Box::new(CloneAndRewrite { pixel_ratio }),
            ],
            MAX_EXPORT_BYTES,
        )
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn export(&self, svg: &str) -> Result<ExportedImage, ExportError> {
        let mut last_error = ExportError::NoRenderer;

        for renderer in &self.renderers {
            match renderer.render(svg) {
                Ok(image) => {
                    if image.bytes.len() > self.max_bytes {
                        return Err(ExportError::TooLarge {
                            size: image.bytes.len(),
                            limit: self.max_bytes,
                        });
                    }

                    log::info!(
                        "🖼️  Exported {}x{} map with {} ({})",
                        image.width,
                        image.height,
                        renderer.name(),
                        image.size_label()
                    );
                    return Ok(image);
                }
                Err(e) => {
                    log::warn!("Renderer {} failed: {}", renderer.name(), e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
