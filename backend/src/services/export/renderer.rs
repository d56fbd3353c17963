use image::{ImageBuffer, ImageEncoder, RgbaImage};
use usvg::{TreeParsing, TreeTextToPath};

use super::css_color::{contains_modern_color_function, rewrite_modern_colors};
use super::{ExportError, ExportedImage};

/// Turns map SVG markup into a PNG
pub trait Renderer: Send + Sync {
    fn name(&self) -> &'static str;

    fn render(&self, svg: &str) -> Result<ExportedImage, ExportError>;
}

/// Rasterize the markup exactly as given
pub struct DirectCapture {
    pub pixel_ratio: f32,
}

impl Renderer for DirectCapture {
    fn name(&self) -> &'static str {
        "direct-capture"
    }

    fn render(&self, svg: &str) -> Result<ExportedImage, ExportError> {
        if contains_modern_color_function(svg) {
            return Err(ExportError::UnsupportedColorSyntax);
        }
        rasterize(svg, self.pixel_ratio, None)
    }
}

/// Copy the markup with every modern color function resolved to a plain
/// literal, then rasterize the copy
pub struct CloneAndRewrite {
    pub pixel_ratio: f32,
}

impl Renderer for CloneAndRewrite {
    fn name(&self) -> &'static str {
        "clone-and-rewrite"
    }

    fn render(&self, svg: &str) -> Result<ExportedImage, ExportError> {
        let rewritten = rewrite_modern_colors(svg)?;
        rasterize(&rewritten, self.pixel_ratio, None)
    }
}

/// Draw the SVG onto an opaque canvas at `scale`
pub struct SvgToCanvas {
    pub scale: f32,
    pub background: tiny_skia::Color,
}

impl Default for SvgToCanvas {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: tiny_skia::Color::WHITE,
        }
    }
}

impl Renderer for SvgToCanvas {
    fn name(&self) -> &'static str {
        "svg-to-canvas"
    }

    fn render(&self, svg: &str) -> Result<ExportedImage, ExportError> {
        let rewritten = rewrite_modern_colors(svg)?;
        rasterize(&rewritten, self.scale, Some(self.background))
    }
}

fn rasterize(
    svg: &str,
    scale: f32,
    background: Option<tiny_skia::Color>,
) -> Result<ExportedImage, ExportError> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(ExportError::InvalidScale(scale));
    }

    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();

    let opts = usvg::Options::default();
    let mut tree = usvg::Tree::from_data(svg.as_bytes(), &opts)
        .map_err(|e| ExportError::Parse(e.to_string()))?;
    tree.convert_text(&fontdb);

    let size = tree.size.to_int_size();
    let width = (size.width() as f32 * scale).round() as u32;
    let height = (size.height() as f32 * scale).round() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or(ExportError::EmptyCanvas { width, height })?;

    if let Some(color) = background {
        pixmap.fill(color);
    }

    let transform = tiny_skia::Transform::from_scale(scale, scale);
    resvg::Tree::from_usvg(&tree).render(transform, &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha
    let mut pixels = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let img: RgbaImage = ImageBuffer::from_raw(width, height, pixels)
        .ok_or_else(|| ExportError::Encode("pixel buffer size mismatch".to_string()))?;

    let bytes = encode_png(&img)?;

    Ok(ExportedImage {
        bytes,
        width,
        height,
    })
}

pub(super) fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new_with_quality(
        &mut buffer,
        image::codecs::png::CompressionType::Best,
        image::codecs::png::FilterType::Adaptive,
    );
    encoder
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ColorType::Rgba8,
        )
        .map_err(|e| ExportError::Encode(e.to_string()))?;

    Ok(buffer)
}
