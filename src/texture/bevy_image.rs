//! [`FlowTexture`] access to Bevy images.

use bevy::asset::RenderAssetUsages;
use bevy::image::Image;
use bevy::prelude::*;
use bevy::render::render_resource::TextureFormat;

use super::{FlowTexture, PixelFormat, TextureError};

impl FlowTexture for Image {
    fn dimensions(&self) -> UVec2 {
        UVec2::new(self.width(), self.height())
    }

    /// Images that were uploaded to the GPU and dropped from the main world
    /// cannot be painted.
    fn is_readable(&self) -> bool {
        self.data.is_some() && self.asset_usage.contains(RenderAssetUsages::MAIN_WORLD)
    }

    fn pixel_format(&self) -> Result<PixelFormat, TextureError> {
        match self.texture_descriptor.format {
            TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => Ok(PixelFormat::Rgba8),
            TextureFormat::Bgra8Unorm | TextureFormat::Bgra8UnormSrgb => Ok(PixelFormat::Bgra8),
            found => Err(TextureError::UnsupportedFormat {
                found: format!("{found:?}"),
            }),
        }
    }

    fn pixels(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    fn pixels_mut(&mut self) -> Option<&mut [u8]> {
        self.data.as_deref_mut()
    }
}

#[cfg(test)]
mod tests {
    use bevy::render::render_resource::{Extent3d, TextureDimension};

    use super::*;
    use crate::texture::{DirectionMap, validate_texture};

    fn image_with(format: TextureFormat, usage: RenderAssetUsages) -> Image {
        Image::new(
            Extent3d {
                width: 4,
                height: 4,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            vec![0; 4 * 4 * 4],
            format,
            usage,
        )
    }

    #[test]
    fn test_supported_formats() {
        let usage = RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD;
        assert_eq!(
            image_with(TextureFormat::Rgba8Unorm, usage).pixel_format().ok(),
            Some(PixelFormat::Rgba8)
        );
        assert_eq!(
            image_with(TextureFormat::Bgra8UnormSrgb, usage).pixel_format().ok(),
            Some(PixelFormat::Bgra8)
        );
        assert!(matches!(
            image_with(TextureFormat::R32Float, usage).pixel_format(),
            Err(TextureError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_render_only_image_is_unreadable() {
        let image = image_with(TextureFormat::Rgba8Unorm, RenderAssetUsages::RENDER_WORLD);
        assert!(!image.is_readable());
        assert!(matches!(validate_texture(&image), Err(TextureError::NotReadable)));
    }

    #[test]
    fn test_image_samples_like_its_map() {
        let map = DirectionMap::neutral(4);
        let image = map.to_image();
        let uv = Vec2::new(0.3, 0.8);
        assert_eq!(image.sample_bilinear(uv), map.sample_bilinear(uv));
    }
}
