//! Conversion between flow grids and Bevy meshes.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, Mesh, PrimitiveTopology, VertexAttributeValues};
use bevy::prelude::*;

use super::attributes::ATTRIBUTE_FLOW_DIRECTION;
use super::grid::{FlowGrid, GRID_NORMAL};

impl FlowGrid {
    /// Build a Bevy [`Mesh`] with positions, normals, UVs and
    /// [`ATTRIBUTE_FLOW_DIRECTION`].
    ///
    /// The mesh keeps its main-world copy so directions can be rewritten
    /// in place while painting.
    pub fn to_mesh(&self) -> Mesh {
        let positions: Vec<[f32; 3]> = self.positions().iter().map(|p| p.to_array()).collect();
        let normals = vec![GRID_NORMAL.to_array(); self.vertex_count()];
        let uvs: Vec<[f32; 2]> = self.uvs().iter().map(|uv| uv.to_array()).collect();

        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
        );

        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
        mesh.insert_attribute(
            ATTRIBUTE_FLOW_DIRECTION,
            flow_direction_values(self.directions()),
        );
        mesh.insert_indices(Indices::U32(self.indices().to_vec()));

        mesh
    }
}

/// Pack directions into the four-component attribute layout.
pub fn flow_direction_values(directions: &[Vec3]) -> Vec<[f32; 4]> {
    directions.iter().map(|d| d.extend(0.0).to_array()).collect()
}

/// Extension trait for reading and replacing flow directions on a mesh.
pub trait MeshFlowExt {
    /// The flow direction of every vertex, if the mesh carries them.
    fn flow_directions(&self) -> Option<Vec<Vec3>>;

    /// Replace the flow directions in place.
    ///
    /// # Panics
    /// Panics if `directions.len()` doesn't match the vertex count.
    fn set_flow_directions(&mut self, directions: &[Vec3]);
}

impl MeshFlowExt for Mesh {
    fn flow_directions(&self) -> Option<Vec<Vec3>> {
        match self.attribute(ATTRIBUTE_FLOW_DIRECTION)? {
            VertexAttributeValues::Float32x4(values) => {
                Some(values.iter().map(|v| Vec4::from_array(*v).truncate()).collect())
            }
            _ => None,
        }
    }

    fn set_flow_directions(&mut self, directions: &[Vec3]) {
        let vertex_count = self
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .map(|a| a.len())
            .unwrap_or(0);

        assert_eq!(
            directions.len(),
            vertex_count,
            "Direction count ({}) must match vertex count ({})",
            directions.len(),
            vertex_count
        );

        self.insert_attribute(ATTRIBUTE_FLOW_DIRECTION, flow_direction_values(directions));
    }
}
