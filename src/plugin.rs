//! Plugin for painting and baking flow maps.
use bevy::prelude::*;

use crate::bake::FieldBaker;
use crate::brush::FlowPainter;
use crate::config::PainterConfig;
use crate::editor::{
    self, BakeFlowMap, BrushHover, FlowGridMesh, FlowMapImage, RebuildFlowGrid,
};
use crate::material::FlowViewerMaterial;

/// System set for the painter's update systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlowPainterSystems;

/// Plugin that adds flow map painting to Bevy.
///
/// This plugin registers:
/// - [`FlowViewerMaterial`] as a material type
/// - Embedded shader assets
/// - The [`FlowPainter`] session, the [`FieldBaker`] and the editor systems
///
/// # Example
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_flowmap_painter::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(FlowMapPainterPlugin::default())
///     .run();
/// ```
#[derive(Default)]
pub struct FlowMapPainterPlugin {
    pub config: PainterConfig,
}

impl FlowMapPainterPlugin {
    pub fn new(config: PainterConfig) -> Self {
        Self { config }
    }
}

impl Plugin for FlowMapPainterPlugin {
    fn build(&self, app: &mut App) {
        let config = match self.config.validate() {
            Ok(()) => self.config.clone(),
            Err(err) => {
                warn!("Invalid painter configuration, using defaults: {err}");
                PainterConfig {
                    map_path: self.config.map_path.clone(),
                    ..default()
                }
            }
        };

        // Embed the shader into the binary
        crate::material::register_embedded_assets(app);
        app.add_plugins(MaterialPlugin::<FlowViewerMaterial>::default())
            .insert_resource(config)
            .init_resource::<FlowPainter>()
            .init_resource::<FieldBaker>()
            .init_resource::<FlowMapImage>()
            .init_resource::<FlowGridMesh>()
            .init_resource::<BrushHover>()
            .add_message::<RebuildFlowGrid>()
            .add_message::<BakeFlowMap>()
            .add_systems(PreStartup, editor::load_flow_map)
            .add_systems(
                Update,
                (
                    editor::handle_shortcuts,
                    editor::apply_config_changes,
                    editor::handle_rebuild_requests,
                    editor::attach_grid_mesh,
                    editor::update_brush_hover,
                    editor::paint_with_pointer,
                    editor::handle_bake_requests,
                    editor::draw_flow_gizmos,
                )
                    .chain()
                    .in_set(FlowPainterSystems),
            );
    }
}
