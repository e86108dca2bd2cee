//! PNG encoding of direction maps.
//!
//! Image files store their top row first while direction maps store `v = 0`
//! first, so rows are flipped on the way in and out.

use std::io::Cursor;

use bevy::prelude::*;
use image::{DynamicImage, ImageFormat, RgbImage};

use super::{PixelFormat, TextureError};

/// Texel data decoded from a PNG file.
pub(crate) struct DecodedPng {
    pub size: UVec2,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

/// Encode texels as an RGB PNG. Alpha is not part of a direction map and
/// is dropped whatever the source layout.
pub(crate) fn encode(
    pixels: &[u8],
    size: UVec2,
    format: PixelFormat,
) -> Result<Vec<u8>, TextureError> {
    let rgb = pixels
        .chunks_exact(format.channels())
        .flat_map(|texel| format.read_rgb(texel))
        .collect();
    let image = RgbImage::from_raw(size.x, size.y, rgb).ok_or_else(|| {
        TextureError::PixelCountMismatch {
            expected: (size.x * size.y) as usize,
            found: pixels.len() / format.channels(),
        }
    })?;

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .flipv()
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<DecodedPng, TextureError> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.flipv();
    let size = UVec2::new(image.width(), image.height());

    let decoded = if image.color().has_alpha() {
        DecodedPng {
            size,
            format: PixelFormat::Rgba8,
            data: image.to_rgba8().into_raw(),
        }
    } else {
        DecodedPng {
            size,
            format: PixelFormat::Rgb8,
            data: image.to_rgb8().into_raw(),
        }
    };

    Ok(decoded)
}
