//! Material extension that previews a baked flow map.

use bevy::ecs::system::{SystemParamItem, lifetimeless::SRes};
use bevy::pbr::{ExtendedMaterial, MaterialExtension, StandardMaterial};
use bevy::prelude::*;
use bevy::render::{
    render_asset::RenderAssets,
    render_resource::{
        AsBindGroup, AsBindGroupError, BindGroupLayout, BindGroupLayoutEntries,
        BindGroupLayoutEntry, BindingResources, BufferInitDescriptor, BufferUsages,
        OwnedBindingResource, SamplerBindingType, ShaderStages, ShaderType, TextureSampleType,
        TextureViewDimension, UnpreparedBindGroup,
        binding_types::{sampler, texture_2d, uniform_buffer},
    },
    renderer::RenderDevice,
    texture::{FallbackImage, GpuImage},
};
use bevy::shader::ShaderRef;
use bytemuck::{Pod, Zeroable};

/// Shader asset path (embedded).
const FLOW_MAP_SHADER_PATH: &str = "embedded://bevy_flowmap_painter/material/shaders/flow_map.wgsl";

/// A standard material whose base color follows a flow map.
pub type FlowViewerMaterial = ExtendedMaterial<StandardMaterial, FlowMapExtension>;

/// GPU-side settings for the flow preview.
#[derive(Clone, Copy, Debug, Default, PartialEq, ShaderType, Pod, Zeroable)]
#[repr(C)]
pub struct FlowMapSettings {
    pub speed: f32,
    pub strength: f32,
    pub tiling: f32,
    pub flags: u32,
}

impl FlowMapSettings {
    /// A background texture is bound; otherwise directions are shown as color.
    pub const FLAG_HAS_BACKGROUND: u32 = 1 << 0;
}

/// Scrolls a background texture along the directions stored in `flow_map`.
#[derive(Asset, TypePath, Clone, Debug)]
pub struct FlowMapExtension {
    pub flow_map: Handle<Image>,
    pub background: Option<Handle<Image>>,
    /// Flow cycles per second.
    pub speed: f32,
    /// UV distance the background travels per cycle.
    pub strength: f32,
    /// Background repetitions across the grid.
    pub tiling: f32,
}

impl Default for FlowMapExtension {
    fn default() -> Self {
        Self {
            flow_map: Handle::default(),
            background: None,
            speed: 0.25,
            strength: 0.2,
            tiling: 1.0,
        }
    }
}

impl FlowMapExtension {
    pub fn new(flow_map: Handle<Image>) -> Self {
        Self {
            flow_map,
            ..default()
        }
    }

    pub fn with_background(mut self, background: Handle<Image>) -> Self {
        self.background = Some(background);
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_tiling(mut self, tiling: f32) -> Self {
        self.tiling = tiling;
        self
    }

    pub fn build_settings(&self) -> FlowMapSettings {
        let mut flags = 0u32;
        if self.background.is_some() {
            flags |= FlowMapSettings::FLAG_HAS_BACKGROUND;
        }

        FlowMapSettings {
            speed: self.speed,
            strength: self.strength,
            tiling: self.tiling,
            flags,
        }
    }
}

impl AsBindGroup for FlowMapExtension {
    type Data = ();
    type Param = (SRes<RenderAssets<GpuImage>>, SRes<FallbackImage>);

    fn bind_group_data(&self) -> Self::Data {}

    fn unprepared_bind_group(
        &self,
        _layout: &BindGroupLayout,
        render_device: &RenderDevice,
        (gpu_images, fallback_image): &mut SystemParamItem<'_, '_, Self::Param>,
        _force_no_bindless: bool,
    ) -> Result<UnpreparedBindGroup, AsBindGroupError> {
        let flow_image = gpu_images
            .get(&self.flow_map)
            .ok_or(AsBindGroupError::RetryNextUpdate)?;

        let fallback = &fallback_image.d2;
        let background_image = self.background.as_ref().and_then(|h| gpu_images.get(h));

        let settings = self.build_settings();
        let settings_buffer = render_device.create_buffer_with_data(&BufferInitDescriptor {
            label: Some("flow_map_settings"),
            contents: bytemuck::bytes_of(&settings),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        Ok(UnpreparedBindGroup {
            bindings: BindingResources(vec![
                (100, OwnedBindingResource::Buffer(settings_buffer)),
                (
                    101,
                    OwnedBindingResource::TextureView(
                        TextureViewDimension::D2,
                        flow_image.texture_view.clone(),
                    ),
                ),
                (
                    102,
                    OwnedBindingResource::Sampler(
                        SamplerBindingType::Filtering,
                        flow_image.sampler.clone(),
                    ),
                ),
                (
                    103,
                    OwnedBindingResource::TextureView(
                        TextureViewDimension::D2,
                        background_image
                            .map(|i| i.texture_view.clone())
                            .unwrap_or_else(|| fallback.texture_view.clone()),
                    ),
                ),
                (
                    104,
                    OwnedBindingResource::Sampler(
                        SamplerBindingType::Filtering,
                        background_image
                            .map(|i| i.sampler.clone())
                            .unwrap_or_else(|| fallback.sampler.clone()),
                    ),
                ),
            ]),
        })
    }

    fn bind_group_layout_entries(
        _render_device: &RenderDevice,
        _force_no_bindless: bool,
    ) -> Vec<BindGroupLayoutEntry>
    where
        Self: Sized,
    {
        BindGroupLayoutEntries::with_indices(
            ShaderStages::FRAGMENT,
            (
                (100, uniform_buffer::<FlowMapSettings>(false)),
                (101, texture_2d(TextureSampleType::Float { filterable: true })),
                (102, sampler(SamplerBindingType::Filtering)),
                (103, texture_2d(TextureSampleType::Float { filterable: true })),
                (104, sampler(SamplerBindingType::Filtering)),
            ),
        )
        .to_vec()
    }

    fn label() -> Option<&'static str> {
        Some("flow_map_extension")
    }
}

impl MaterialExtension for FlowMapExtension {
    fn fragment_shader() -> ShaderRef {
        FLOW_MAP_SHADER_PATH.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extension() {
        let ext = FlowMapExtension::default();
        assert!(ext.background.is_none());
        assert_eq!(ext.tiling, 1.0);
        assert_eq!(ext.build_settings().flags, 0);
    }

    #[test]
    fn test_extension_builder() {
        let ext = FlowMapExtension::new(Handle::default())
            .with_background(Handle::default())
            .with_speed(0.5)
            .with_strength(0.1)
            .with_tiling(4.0);

        let settings = ext.build_settings();
        assert_eq!(settings.speed, 0.5);
        assert_eq!(settings.strength, 0.1);
        assert_eq!(settings.tiling, 4.0);
        assert_eq!(
            settings.flags & FlowMapSettings::FLAG_HAS_BACKGROUND,
            FlowMapSettings::FLAG_HAS_BACKGROUND
        );
    }

    #[test]
    fn test_settings_layout() {
        assert_eq!(std::mem::size_of::<FlowMapSettings>(), 16);
    }
}
