//! Grid generation with per-vertex flow directions.

use bevy::log::{debug, warn};
use bevy::prelude::*;

use crate::config::{ConfigError, validate_division};
use crate::texture::{FlowTexture, decode_direction, validate_texture};

/// Normal shared by every grid vertex.
pub const GRID_NORMAL: Vec3 = Vec3::Y;

/// A flat square grid of `width * width` vertices carrying flow directions.
///
/// Vertices are laid out row-major, so the vertex at column `x` and row `y`
/// has index `y * width + x`. Positions span `[0, 1]` on the local XZ plane
/// and double as UVs.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_flowmap_painter::mesh::FlowGrid;
///
/// let grid = FlowGrid::build(2, None).unwrap();
/// assert_eq!(grid.vertex_count(), 16);
/// assert_eq!(grid.indices().len(), 54);
/// assert!(grid.directions().iter().all(|d| *d == Vec3::Y));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FlowGrid {
    division: u32,
    width: u32,
    positions: Vec<Vec3>,
    uvs: Vec<Vec2>,
    directions: Vec<Vec3>,
    indices: Vec<u32>,
}

impl FlowGrid {
    /// Build a grid of `2^division` vertices per side.
    ///
    /// When `source` is readable and uses a supported format, every vertex
    /// direction is decoded from a bilinear sample at its UV. Otherwise all
    /// directions point straight up.
    pub fn build(division: u32, source: Option<&dyn FlowTexture>) -> Result<Self, ConfigError> {
        validate_division(division)?;

        let source = source.filter(|texture| match validate_texture(*texture) {
            Ok(_) => true,
            Err(err) => {
                warn!("Ignoring flow map while building grid: {err}");
                false
            }
        });

        let width = 1u32 << division;
        let width0 = (width - 1) as f32;
        let vertex_count = (width * width) as usize;

        let mut positions = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);
        let mut directions = Vec::with_capacity(vertex_count);

        for v in 0..width {
            for u in 0..width {
                let x = u as f32 / width0;
                let y = v as f32 / width0;
                let uv = Vec2::new(x, y);

                positions.push(Vec3::new(x, 0.0, y));
                uvs.push(uv);
                directions.push(
                    source
                        .and_then(|texture| texture.sample_bilinear(uv))
                        .map(decode_direction)
                        .unwrap_or(Vec3::Y),
                );
            }
        }

        let indices = triangulate(width);

        debug!(
            "Built {width}x{width} flow grid ({} indices, decoded from map: {})",
            indices.len(),
            source.is_some()
        );

        Ok(Self {
            division,
            width,
            positions,
            uvs,
            directions,
            indices,
        })
    }

    pub fn division(&self) -> u32 {
        self.division
    }

    /// Vertices per side.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Index of the vertex at column `x`, row `y`.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn directions(&self) -> &[Vec3] {
        &self.directions
    }

    pub fn directions_mut(&mut self) -> &mut [Vec3] {
        &mut self.directions
    }

    #[inline]
    pub fn direction(&self, x: u32, y: u32) -> Vec3 {
        self.directions[self.index(x, y)]
    }
}

/// Two triangles per cell. Vertices in the last row or column only close
/// triangles started by their neighbours.
fn triangulate(width: u32) -> Vec<u32> {
    let last_row_start = width * (width - 1);
    let cells = ((width - 1) * (width - 1)) as usize;
    let mut indices = Vec::with_capacity(cells * 6);

    for id in 0..width * width {
        if (id + 1) % width == 0 || id >= last_row_start {
            continue;
        }

        indices.extend_from_slice(&[
            id,
            id + width,
            id + 1,
            id + width + 1,
            id + 1,
            id + width,
        ]);
    }

    indices
}
