//! Image decoding and encoding through the `image` crate.

use crate::PipelineError;
use birdseye_core::Image;
use image::{ColorType, DynamicImage, ImageReader};
use std::path::Path;

/// Convert any decoded image to interleaved 8-bit RGB.
pub fn from_dynamic(img: &DynamicImage) -> Image {
    let rgb = img.to_rgb8();
    Image {
        width: rgb.width() as usize,
        height: rgb.height() as usize,
        channels: 3,
        data: rgb.into_raw(),
    }
}

/// Load an image from disk as RGB. Missing or undecodable files are
/// reported as [`PipelineError::ResourceUnavailable`].
pub fn load_image(path: impl AsRef<Path>) -> Result<Image, PipelineError> {
    let path = path.as_ref();
    let unavailable = |reason: String| PipelineError::ResourceUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    let decoded = ImageReader::open(path)
        .map_err(|e| unavailable(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| unavailable(e.to_string()))?
        .decode()
        .map_err(|e| unavailable(e.to_string()))?;

    let img = from_dynamic(&decoded);
    log::debug!(
        "loaded {} ({}x{})",
        path.display(),
        img.width,
        img.height
    );
    Ok(img)
}

/// Encode `img` to `path`; the format follows the file extension.
pub fn save_image(path: impl AsRef<Path>, img: &Image) -> Result<(), PipelineError> {
    let path = path.as_ref();
    let color = match img.channels {
        1 => ColorType::L8,
        3 => ColorType::Rgb8,
        4 => ColorType::Rgba8,
        c => return Err(PipelineError::UnsupportedChannels(c)),
    };

    image::save_buffer(
        path,
        &img.data,
        img.width as u32,
        img.height as u32,
        color,
    )
    .map_err(|source| PipelineError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("wrote {} ({}x{})", path.display(), img.width, img.height);
    Ok(())
}
