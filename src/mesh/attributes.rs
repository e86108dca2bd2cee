//! Custom vertex attributes for flow painting.

use bevy::mesh::MeshVertexAttribute;
use bevy::render::render_resource::VertexFormat;

/// Vertex attribute holding the painted flow direction of each vertex.
///
/// The direction is a unit vector in the grid's local space stored in the
/// `xyz` components. `w` is always 0 and carries no meaning.
///
/// # Example
/// ```ignore
/// // A vertex flowing along +X
/// let direction: [f32; 4] = [1.0, 0.0, 0.0, 0.0];
/// ```
pub const ATTRIBUTE_FLOW_DIRECTION: MeshVertexAttribute =
    MeshVertexAttribute::new("FlowDirection", 988540930, VertexFormat::Float32x4);
