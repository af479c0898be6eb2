//! Image decoding, SVG rasterization and resizing
//!
//! Every decoded image is an [`RgbaImage`]: width, height and row-major RGBA
//! bytes, top row first.

use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ColorType, ImageEncoder, ImageFormat, RgbaImage};
use resvg::{tiny_skia, usvg};
use thiserror::Error;

/// Source extensions that go through image conversion. Matching is
/// case-sensitive.
pub const IMAGE_EXTENSIONS: &[&str] =
    &["gif", "webp", "pbm", "jpeg", "jpg", "qoi", "tga", "tiff", "bmp", "png", "dds", "svg"];

/// Error decoding or encoding an image
#[derive(Debug, Error)]
pub enum RasterError {
    /// Raster decode or encode failure
    #[error("{0}")]
    Image(#[from] image::ImageError),
    /// SVG could not be parsed
    #[error("invalid SVG: {0}")]
    Svg(#[from] usvg::Error),
    /// SVG parsed but has nothing to draw into
    #[error("SVG has an empty canvas ({0}x{1})")]
    EmptyCanvas(u32, u32),
}

/// Check if an extension (without the dot) is a recognized image type.
pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}

/// Decode image bytes. `ext` picks the decoder; SVG is rasterized.
pub fn decode_image(bytes: &[u8], ext: &str) -> Result<RgbaImage, RasterError> {
    if ext == "svg" {
        return rasterize_svg(bytes);
    }

    // TGA has no magic number, so the extension decides the format when known
    let image = match ImageFormat::from_extension(ext) {
        Some(format) => image::load_from_memory_with_format(bytes, format)?,
        None => image::load_from_memory(bytes)?,
    };
    Ok(image.to_rgba8())
}

/// Rasterize an SVG at its intrinsic size.
///
/// usvg falls back to 100x100 when the document declares neither a size nor
/// a viewBox.
pub fn rasterize_svg(bytes: &[u8]) -> Result<RgbaImage, RasterError> {
    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())?;
    let size = tree.size().to_int_size();
    let (width, height) = (size.width(), size.height());

    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(RasterError::EmptyCanvas(width, height))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha
    let mut image = RgbaImage::new(width, height);
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        dst.0 = [color.red(), color.green(), color.blue(), color.alpha()];
    }
    Ok(image)
}

/// Resize to exactly `width` x `height` with a Lanczos filter.
pub fn resize(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    image::imageops::resize(image, width, height, FilterType::Lanczos3)
}

/// Encode as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RasterError> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgba8,
    )?;
    Ok(out)
}
