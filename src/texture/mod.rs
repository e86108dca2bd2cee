//! Direction map textures.
//!
//! A direction map stores one flow direction per texel, encoded as color
//! (see [`encoding`]). The [`FlowTexture`] trait is the narrow interface the
//! grid builder and the baker use to read and write such a texture, whether it
//! is a CPU-side [`DirectionMap`] or a Bevy [`Image`](bevy::image::Image).
//!
//! Pixel rows are stored with row 0 at `v = 0`, which is the back edge
//! (`z = 0`) of the painted grid.

use bevy::prelude::*;

mod bevy_image;
mod direction_map;
pub mod encoding;
mod png;
mod validation;

pub use direction_map::DirectionMap;
pub use encoding::{decode_direction, encode_direction, quantize_color, texel_to_color};
pub use validation::{TextureError, validate_texture};

/// 8-bit pixel layouts a direction map may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// Three channels, no alpha.
    Rgb8,
    /// Four channels, alpha last.
    Rgba8,
    /// Four channels, red and blue swapped.
    Bgra8,
}

impl PixelFormat {
    /// Bytes per texel.
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => 4,
        }
    }

    /// Read the red, green and blue bytes of one texel.
    #[inline]
    pub fn read_rgb(self, texel: &[u8]) -> [u8; 3] {
        match self {
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => [texel[0], texel[1], texel[2]],
            PixelFormat::Bgra8 => [texel[2], texel[1], texel[0]],
        }
    }

    /// Write an RGBA value into one texel, dropping alpha for [`PixelFormat::Rgb8`].
    #[inline]
    pub fn write_rgba(self, texel: &mut [u8], rgba: [u8; 4]) {
        match self {
            PixelFormat::Rgb8 => texel.copy_from_slice(&rgba[..3]),
            PixelFormat::Rgba8 => texel.copy_from_slice(&rgba),
            PixelFormat::Bgra8 => texel.copy_from_slice(&[rgba[2], rgba[1], rgba[0], rgba[3]]),
        }
    }
}

/// CPU access to a direction map.
///
/// Implementors only expose their raw storage; sampling, writing and PNG
/// encoding are provided on top of it.
pub trait FlowTexture {
    /// Width and height in texels.
    fn dimensions(&self) -> UVec2;

    /// Whether pixel data can be read and written on the CPU.
    fn is_readable(&self) -> bool;

    /// The texel layout, or [`TextureError::UnsupportedFormat`].
    fn pixel_format(&self) -> Result<PixelFormat, TextureError>;

    /// Raw texel bytes, row 0 first.
    fn pixels(&self) -> Option<&[u8]>;

    /// Mutable raw texel bytes, row 0 first.
    fn pixels_mut(&mut self) -> Option<&mut [u8]>;

    /// Sample the color at a normalized coordinate with bilinear filtering
    /// and clamp-to-edge addressing.
    ///
    /// Returns `None` if the texture fails [`validate_texture`].
    fn sample_bilinear(&self, uv: Vec2) -> Option<Vec3> {
        let format = validate_texture(self).ok()?;
        let pixels = self.pixels()?;
        Some(sample_bilinear(pixels, self.dimensions(), format, uv))
    }

    /// Replace every texel from an RGBA buffer of exactly `width * height` entries.
    fn write_pixels(&mut self, rgba: &[[u8; 4]]) -> Result<(), TextureError> {
        let format = validate_texture(self)?;
        let size = self.dimensions();
        let expected = (size.x * size.y) as usize;
        if rgba.len() != expected {
            return Err(TextureError::PixelCountMismatch {
                expected,
                found: rgba.len(),
            });
        }

        let pixels = self.pixels_mut().ok_or(TextureError::NotReadable)?;
        for (texel, value) in pixels.chunks_exact_mut(format.channels()).zip(rgba) {
            format.write_rgba(texel, *value);
        }
        Ok(())
    }

    /// Encode the texture as a PNG file.
    fn encode_png(&self) -> Result<Vec<u8>, TextureError> {
        let format = validate_texture(self)?;
        let pixels = self.pixels().ok_or(TextureError::NotReadable)?;
        png::encode(pixels, self.dimensions(), format)
    }
}

fn sample_bilinear(pixels: &[u8], size: UVec2, format: PixelFormat, uv: Vec2) -> Vec3 {
    let channels = format.channels();
    let texel = |x: i32, y: i32| -> Vec3 {
        let x = x.clamp(0, size.x as i32 - 1) as usize;
        let y = y.clamp(0, size.y as i32 - 1) as usize;
        let offset = (y * size.x as usize + x) * channels;
        texel_to_color(format.read_rgb(&pixels[offset..offset + channels]))
    };

    // Texel centers sit at half-integer coordinates.
    let p = uv * size.as_vec2() - Vec2::splat(0.5);
    let base = p.floor();
    let frac = p - base;
    let (x0, y0) = (base.x as i32, base.y as i32);

    let bottom = texel(x0, y0).lerp(texel(x0 + 1, y0), frac.x);
    let top = texel(x0, y0 + 1).lerp(texel(x0 + 1, y0 + 1), frac.x);
    bottom.lerp(top, frac.y)
}
