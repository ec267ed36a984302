//! Image decoding via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::util::{HomingError, HomingResult, Missing};
use crate::view::RawImage;
use std::path::Path;

/// Converts a decoded image into an RGB raw image.
pub fn raw_from_dynamic_image(img: &image::DynamicImage) -> HomingResult<RawImage> {
    let rgb = img.to_rgb8();
    let width = rgb.width() as usize;
    let height = rgb.height() as usize;
    RawImage::rgb(rgb.into_raw(), width, height)
}

/// Decodes an encoded image held in memory.
///
/// `source_name` is only used to label errors.
pub fn decode_image(bytes: &[u8], source_name: &str) -> HomingResult<RawImage> {
    let img = image::load_from_memory(bytes).map_err(|err| HomingError::Decode {
        source_name: source_name.to_owned(),
        reason: err.to_string(),
    })?;
    raw_from_dynamic_image(&img)
}

/// Reads and decodes an image file.
pub fn load_raw_image<P: AsRef<Path>>(path: P) -> HomingResult<RawImage> {
    let path = path.as_ref();
    let name = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => HomingError::NotFound(Missing::Image(name.clone())),
        _ => HomingError::Decode {
            source_name: name.clone(),
            reason: err.to_string(),
        },
    })?;
    decode_image(&bytes, &name)
}
