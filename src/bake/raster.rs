//! CPU rasterization of a flow grid into an RGBA buffer.

use bevy::prelude::*;

use crate::mesh::FlowGrid;
use crate::texture::{encode_direction, quantize_color};

/// Fragment stage of the bake pass.
pub trait BakeShader: Send + Sync {
    /// Color written for an interpolated vertex direction, channels in `[0, 1]`.
    fn fragment(&self, direction: Vec3) -> Vec4;
}

/// Encodes the direction as color, the inverse of how grids decode it.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlowEncodeShader;

impl BakeShader for FlowEncodeShader {
    fn fragment(&self, direction: Vec3) -> Vec4 {
        let direction = direction.try_normalize().unwrap_or(Vec3::Y);
        encode_direction(direction).extend(1.0)
    }
}

/// Draws a grid into an offscreen buffer.
pub trait FieldRenderer: Send + Sync {
    /// Render `grid` into a `size` buffer cleared to opaque black.
    ///
    /// The buffer is row-major with row 0 at clip-space `y = -1`.
    fn render(
        &mut self,
        grid: &FlowGrid,
        shader: &dyn BakeShader,
        view_projection: Mat4,
        size: UVec2,
    ) -> Vec<[u8; 4]>;
}

/// Deterministic CPU rasterizer.
///
/// Each triangle covers the pixels whose centers fall inside it, edges
/// included. Triangles of either winding are drawn, and the direction is
/// interpolated with barycentric weights before shading.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftwareRasterizer;

const CLEAR: [u8; 4] = [0, 0, 0, 255];

/// Barycentric slack so pixel centers on a shared edge are never dropped.
const EDGE_TOLERANCE: f32 = 1e-5;

impl FieldRenderer for SoftwareRasterizer {
    fn render(
        &mut self,
        grid: &FlowGrid,
        shader: &dyn BakeShader,
        view_projection: Mat4,
        size: UVec2,
    ) -> Vec<[u8; 4]> {
        let mut buffer = vec![CLEAR; (size.x * size.y) as usize];
        if size.x == 0 || size.y == 0 {
            return buffer;
        }

        let extent = size.as_vec2();
        let screen: Vec<Vec2> = grid
            .positions()
            .iter()
            .map(|p| {
                let ndc = view_projection.project_point3(*p);
                (ndc.truncate() + Vec2::ONE) * 0.5 * extent
            })
            .collect();
        let directions = grid.directions();

        for triangle in grid.indices().chunks_exact(3) {
            let [a, b, c] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            let (pa, pb, pc) = (screen[a], screen[b], screen[c]);

            let area = edge(pa, pb, pc);
            if area.abs() <= f32::EPSILON {
                continue;
            }

            let min = pa.min(pb).min(pc).floor().max(Vec2::ZERO);
            let max = pa.max(pb).max(pc).ceil().min(extent);

            for y in min.y as u32..max.y as u32 {
                for x in min.x as u32..max.x as u32 {
                    let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let wa = edge(pb, pc, p) / area;
                    let wb = edge(pc, pa, p) / area;
                    let wc = edge(pa, pb, p) / area;
                    if wa < -EDGE_TOLERANCE || wb < -EDGE_TOLERANCE || wc < -EDGE_TOLERANCE {
                        continue;
                    }

                    let direction = directions[a] * wa + directions[b] * wb + directions[c] * wc;
                    let index = (y * size.x + x) as usize;
                    buffer[index] = quantize_color(shader.fragment(direction));
                }
            }
        }

        buffer
    }
}

/// Twice the signed area of `(a, b, p)`.
#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}
