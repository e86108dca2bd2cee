//! Direction map validation.

use std::path::PathBuf;

use thiserror::Error;

use super::{FlowTexture, PixelFormat};

/// Errors that can occur when reading or writing a direction map.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Flow map is not readable on the CPU; enable main-world access for the texture")]
    NotReadable,

    #[error("Flow map has no texels ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("Flow map has unsupported format {found}; expected 8-bit RGB or RGBA")]
    UnsupportedFormat { found: String },

    #[error("Flow map pixel count mismatch: expected {expected} texels, got {found}")]
    PixelCountMismatch { expected: usize, found: usize },

    #[error("Flow map image codec error")]
    Codec(#[from] image::ImageError),

    #[error("Failed to read flow map from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Check that a texture can be sampled and written on the CPU.
///
/// Returns the texel layout on success.
pub fn validate_texture<T: FlowTexture + ?Sized>(texture: &T) -> Result<PixelFormat, TextureError> {
    if !texture.is_readable() {
        return Err(TextureError::NotReadable);
    }

    let size = texture.dimensions();
    if size.x == 0 || size.y == 0 {
        return Err(TextureError::Empty {
            width: size.x,
            height: size.y,
        });
    }

    let format = texture.pixel_format()?;
    let expected = (size.x * size.y) as usize * format.channels();
    let found = texture.pixels().map(<[u8]>::len).unwrap_or(0);
    if found != expected {
        return Err(TextureError::PixelCountMismatch {
            expected: expected / format.channels(),
            found: found / format.channels(),
        });
    }

    Ok(format)
}
