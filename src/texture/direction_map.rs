//! CPU-side direction map.

use std::path::Path;

use bevy::asset::RenderAssetUsages;
use bevy::image::{Image, ImageSampler};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use super::{FlowTexture, PixelFormat, TextureError, encode_direction, png, quantize_color};

/// A direction map held in CPU memory.
///
/// This is the persisted artifact between painting sessions: it is decoded
/// from PNG when the grid is built and rewritten by every bake.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_flowmap_painter::texture::{DirectionMap, FlowTexture};
///
/// let map = DirectionMap::neutral(16);
/// let color = map.sample_bilinear(Vec2::new(0.5, 0.5)).unwrap();
/// assert!((color.y - 1.0).abs() < 1e-6);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionMap {
    size: UVec2,
    format: PixelFormat,
    readable: bool,
    data: Vec<u8>,
}

impl DirectionMap {
    /// Create a black map.
    pub fn new(size: UVec2, format: PixelFormat) -> Self {
        Self {
            size,
            format,
            readable: true,
            data: vec![0; (size.x * size.y) as usize * format.channels()],
        }
    }

    /// Create a square RGB map where every texel encodes straight up.
    pub fn neutral(side: u32) -> Self {
        let [r, g, b, _] = quantize_color(encode_direction(Vec3::Y).extend(1.0));
        Self::filled(UVec2::splat(side), PixelFormat::Rgb8, [r, g, b])
    }

    /// Create a map with every texel set to one color.
    pub fn filled(size: UVec2, format: PixelFormat, rgb: [u8; 3]) -> Self {
        let mut map = Self::new(size, format);
        for texel in map.data.chunks_exact_mut(format.channels()) {
            format.write_rgba(texel, [rgb[0], rgb[1], rgb[2], 255]);
        }
        map
    }

    /// Wrap existing texel bytes, row 0 first.
    pub fn from_pixels(size: UVec2, format: PixelFormat, data: Vec<u8>) -> Result<Self, TextureError> {
        let expected = (size.x * size.y) as usize;
        let found = data.len() / format.channels();
        if data.len() != expected * format.channels() {
            return Err(TextureError::PixelCountMismatch { expected, found });
        }

        Ok(Self {
            size,
            format,
            readable: true,
            data,
        })
    }

    /// Mark the map as CPU readable or not.
    ///
    /// Unreadable maps are skipped when building a grid and rejected by the baker.
    pub fn with_readable(mut self, readable: bool) -> Self {
        self.readable = readable;
        self
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// RGB bytes of the texel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the map.
    pub fn texel(&self, x: u32, y: u32) -> [u8; 3] {
        assert!(
            x < self.size.x && y < self.size.y,
            "texel ({x}, {y}) outside {}x{} map",
            self.size.x,
            self.size.y
        );
        let channels = self.format.channels();
        let offset = (y * self.size.x + x) as usize * channels;
        self.format.read_rgb(&self.data[offset..offset + channels])
    }

    /// Decode a PNG file's bytes.
    pub fn decode_png(bytes: &[u8]) -> Result<Self, TextureError> {
        let decoded = png::decode(bytes)?;
        Self::from_pixels(decoded.size, decoded.format, decoded.data)
    }

    /// Read and decode a PNG file.
    pub fn load_png(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode_png(&bytes)
    }

    /// Convert to a linear RGBA Bevy image with bilinear sampling.
    ///
    /// The image keeps its main-world copy so it stays readable for
    /// subsequent rebuilds and bakes.
    pub fn to_image(&self) -> Image {
        let rgba = self
            .data
            .chunks_exact(self.format.channels())
            .flat_map(|texel| {
                let [r, g, b] = self.format.read_rgb(texel);
                [r, g, b, 255]
            })
            .collect();

        let mut image = Image::new(
            Extent3d {
                width: self.size.x,
                height: self.size.y,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            rgba,
            TextureFormat::Rgba8Unorm,
            RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
        );
        image.sampler = ImageSampler::linear();
        image
    }
}

impl FlowTexture for DirectionMap {
    fn dimensions(&self) -> UVec2 {
        self.size
    }

    fn is_readable(&self) -> bool {
        self.readable
    }

    fn pixel_format(&self) -> Result<PixelFormat, TextureError> {
        Ok(self.format)
    }

    fn pixels(&self) -> Option<&[u8]> {
        Some(&self.data)
    }

    fn pixels_mut(&mut self) -> Option<&mut [u8]> {
        Some(&mut self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_map() {
        let map = DirectionMap::neutral(8);
        assert_eq!(map.dimensions(), UVec2::splat(8));
        assert_eq!(map.texel(3, 5), [128, 255, 128]);
    }

    #[test]
    fn test_from_pixels_checks_length() {
        assert!(DirectionMap::from_pixels(UVec2::splat(2), PixelFormat::Rgb8, vec![0; 12]).is_ok());
        assert!(matches!(
            DirectionMap::from_pixels(UVec2::splat(2), PixelFormat::Rgba8, vec![0; 12]),
            Err(TextureError::PixelCountMismatch { expected: 4, found: 3 })
        ));
    }

    #[test]
    fn test_png_preserves_rows() {
        let mut map = DirectionMap::new(UVec2::new(2, 2), PixelFormat::Rgb8);
        map.write_pixels(&[
            [255, 0, 0, 255],
            [0, 255, 0, 255],
            [0, 0, 255, 255],
            [9, 9, 9, 255],
        ])
        .unwrap();

        let bytes = map.encode_png().unwrap();
        let decoded = DirectionMap::decode_png(&bytes).unwrap();
        assert_eq!(decoded, map);

        // The file itself is stored top row first.
        let file = ::image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(file.get_pixel(0, 0).0, [0, 0, 255]);
        assert_eq!(file.get_pixel(0, 1).0, [255, 0, 0]);
    }

    #[test]
    fn test_unreadable_map_cannot_be_written() {
        let mut map = DirectionMap::neutral(4).with_readable(false);
        let result = map.write_pixels(&[[0, 0, 0, 255]; 16]);
        assert!(matches!(result, Err(TextureError::NotReadable)));
        assert_eq!(map.texel(0, 0), [128, 255, 128]);
        assert!(map.sample_bilinear(Vec2::splat(0.5)).is_none());
    }

    #[test]
    #[should_panic(expected = "outside 4x4 map")]
    fn test_texel_outside_map_panics() {
        DirectionMap::neutral(4).texel(4, 0);
    }

    #[test]
    fn test_to_image_expands_to_rgba() {
        let image = DirectionMap::neutral(4).to_image();
        assert_eq!(image.width(), 4);
        assert_eq!(image.texture_descriptor.format, TextureFormat::Rgba8Unorm);
        let data = image.data.as_ref().unwrap();
        assert_eq!(data.len(), 4 * 4 * 4);
        assert_eq!(&data[..4], &[128, 255, 128, 255]);
    }
}
