//! Grid meshes carrying per-vertex flow directions.
//!
//! [`FlowGrid`] is the engine-independent grid; [`FlowGrid::to_mesh`] and
//! [`MeshFlowExt`] move its directions in and out of a Bevy [`Mesh`](bevy::mesh::Mesh)
//! through [`ATTRIBUTE_FLOW_DIRECTION`].

mod attributes;
mod builder;
mod grid;

pub use attributes::ATTRIBUTE_FLOW_DIRECTION;
pub use builder::{MeshFlowExt, flow_direction_values};
pub use grid::{FlowGrid, GRID_NORMAL};
