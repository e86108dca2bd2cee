//! Bevy front end for the painter.
//!
//! Connects [`FlowPainter`](crate::brush::FlowPainter) and
//! [`FieldBaker`](crate::bake::FieldBaker) to the pointer, the keyboard,
//! mesh and image assets, and the viewer materials.

use bevy::prelude::*;

use crate::brush::BrushHit;

mod gizmos;
mod raycast;
mod systems;

pub use raycast::{GridHit, raycast_grid};

pub(crate) use gizmos::draw_flow_gizmos;
pub(crate) use systems::{
    apply_config_changes, attach_grid_mesh, handle_bake_requests, handle_rebuild_requests,
    handle_shortcuts, load_flow_map, paint_with_pointer, update_brush_hover,
};

/// Marks an entity that displays the painted grid.
///
/// The grid mesh is attached to it as [`Mesh3d`]; its transform places the
/// unit-square grid in the world.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct FlowGridSurface;

/// Marks the camera whose cursor ray drives the brush.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct FlowPainterCamera;

/// The direction map image shared by the grid builder, the baker and the
/// viewer materials.
#[derive(Resource, Clone, Debug, Default)]
pub struct FlowMapImage(pub Option<Handle<Image>>);

/// The mesh asset currently holding the grid.
#[derive(Resource, Clone, Debug, Default)]
pub struct FlowGridMesh(pub Option<Handle<Mesh>>);

/// Where the cursor currently meets a grid surface.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct BrushHover(pub Option<HoverHit>);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverHit {
    pub surface: Entity,
    pub hit: GridHit,
}

impl BrushHover {
    /// The hit in grid space, if any.
    pub fn brush_hit(&self) -> Option<BrushHit> {
        self.0.map(|hover| hover.hit.local)
    }
}

/// Request to rebuild the grid from the configured division.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebuildFlowGrid {
    /// Decode directions from the current flow map instead of pointing up.
    pub use_flow_map: bool,
    /// Bake once the new grid is in place.
    pub bake_after: bool,
}

impl RebuildFlowGrid {
    /// Build from the current flow map.
    pub const CREATE: Self = Self {
        use_flow_map: true,
        bake_after: false,
    };

    /// Discard the flow map and bake a neutral one.
    pub const RESET: Self = Self {
        use_flow_map: false,
        bake_after: true,
    };
}

/// Request to bake the grid into the flow map.
#[derive(Message, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BakeFlowMap;
