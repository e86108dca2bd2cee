//! # bevy_flowmap_painter
//!
//! A Bevy plugin for painting flow (direction) maps onto a grid and baking
//! them into textures.
//!
//! ## Features
//!
//! - Subdivided grid meshes carrying a per-vertex flow direction
//! - Radial brush with hardness falloff, driven by mouse drags
//! - Top-down bake of the direction field into an RGB texture, saved as PNG
//! - Preview material that scrolls a background along the baked flow
//!
//! ## Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_flowmap_painter::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(FlowMapPainterPlugin::default())
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(
//!     mut commands: Commands,
//!     mut materials: ResMut<Assets<FlowViewerMaterial>>,
//!     flow_map: Res<FlowMapImage>,
//! ) {
//!     let material = FlowViewerMaterial {
//!         base: StandardMaterial::default(),
//!         extension: FlowMapExtension::new(flow_map.0.clone().unwrap_or_default()),
//!     };
//!
//!     // The plugin attaches the grid mesh to the surface.
//!     commands.spawn((
//!         FlowGridSurface,
//!         MeshMaterial3d(materials.add(material)),
//!         Transform::default(),
//!     ));
//!     commands.spawn((
//!         Camera3d::default(),
//!         FlowPainterCamera,
//!         Transform::from_xyz(0.5, 1.5, 1.5).looking_at(Vec3::new(0.5, 0.0, 0.5), Vec3::Y),
//!     ));
//! }
//! ```
//!
//! The computational core ([`mesh::FlowGrid`], [`brush`], [`bake`] and
//! [`texture`]) does not depend on the ECS and can be used on its own.

pub mod bake;
pub mod brush;
pub mod config;
pub mod editor;
pub mod material;
pub mod mesh;
mod plugin;
pub mod texture;

pub mod prelude {
    pub use crate::bake::{
        BakeError, BakeOutcome, FieldBaker, FileMapStore, FlowEncodeShader, MapStore,
        SoftwareRasterizer,
    };
    pub use crate::brush::{BrushHit, BrushSettings, FlowPainter, StrokeOutcome, StrokeState};
    pub use crate::config::PainterConfig;
    pub use crate::editor::{
        BakeFlowMap, BrushHover, FlowGridSurface, FlowMapImage, FlowPainterCamera,
        RebuildFlowGrid,
    };
    pub use crate::material::{FlowMapExtension, FlowMapSettings, FlowViewerMaterial};
    pub use crate::mesh::{ATTRIBUTE_FLOW_DIRECTION, FlowGrid, MeshFlowExt};
    pub use crate::plugin::{FlowMapPainterPlugin, FlowPainterSystems};
    pub use crate::texture::{DirectionMap, FlowTexture, TextureError};
}
