//! Radial flow brush.
//!
//! The brush blends a drag direction into every grid vertex inside a disc
//! around the hit UV. Vertices inside the hard core take the full brush
//! strength; past it the weight falls off smoothly to zero at the rim.

use bevy::prelude::*;

use crate::mesh::FlowGrid;

mod stroke;

pub use stroke::{BrushHit, DRAG_EPSILON_SQ, FlowPainter, StrokeOutcome, StrokeState};

/// Floor applied to `hardness * pressure` so the core never vanishes.
pub const MIN_HARDNESS: f32 = 0.001;

/// Brush parameters, all in UV units or fractions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushSettings {
    /// Disc radius in UV units, `(0, 1]`.
    pub radius: f32,
    /// Blend factor at full weight, `[0, 1]`.
    pub strength: f32,
    /// Fraction of the radius kept at full weight, `[0, 1]`.
    pub hardness: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            radius: 0.1,
            strength: 0.1,
            hardness: 0.5,
        }
    }
}

/// Weight of the brush at normalized distance `t = distance / radius`.
///
/// Returns 1 for `t <= hardness`, eases to 0 with a cubic Hermite curve
/// between `hardness` and 1, and is 0 from `t >= 1` on.
#[inline]
pub fn brush_falloff(t: f32, hardness: f32) -> f32 {
    if t >= 1.0 {
        return 0.0;
    }
    if t <= hardness {
        return 1.0;
    }

    let s = ((t - hardness) / (1.0 - hardness)).clamp(0.0, 1.0);
    1.0 - s * s * (3.0 - 2.0 * s)
}

/// Blend `direction` into the vertices under the brush centered at `uv`.
///
/// Only vertices whose weight is positive are touched. Returns how many
/// vertices were rewritten.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_flowmap_painter::brush::{BrushSettings, paint_directions};
/// use bevy_flowmap_painter::mesh::FlowGrid;
///
/// let mut grid = FlowGrid::build(4, None).unwrap();
/// let brush = BrushSettings { radius: 0.2, strength: 1.0, hardness: 1.0 };
/// let touched = paint_directions(&mut grid, Vec2::splat(0.5), Vec3::X, &brush, 1.0);
/// assert!(touched > 0);
/// assert_eq!(grid.direction(8, 8), Vec3::X);
/// ```
pub fn paint_directions(
    grid: &mut FlowGrid,
    uv: Vec2,
    direction: Vec3,
    brush: &BrushSettings,
    pressure: f32,
) -> usize {
    let width = grid.width();
    let scale = width as f32;
    let extent = Vec2::splat(brush.radius);

    // Square pre-filter in grid coordinates; the disc test below trims it.
    let min = ((uv - extent).clamp(Vec2::ZERO, Vec2::ONE) * scale).as_uvec2();
    let max = ((uv + extent).clamp(Vec2::ZERO, Vec2::ONE) * scale)
        .as_uvec2()
        .min(UVec2::splat(width - 1));

    let radius_sq = brush.radius * brush.radius;
    let hardness = (brush.hardness * pressure).max(MIN_HARDNESS);
    let mut touched = 0;

    for y in min.y..=max.y {
        let yr = y as f32 / scale - uv.y;

        for x in min.x..=max.x {
            let xr = x as f32 / scale - uv.x;
            let dist_sq = xr * xr + yr * yr;
            if dist_sq > radius_sq {
                continue;
            }

            let weight = brush_falloff(dist_sq.sqrt() / brush.radius, hardness) * brush.strength;
            if weight <= 0.0 {
                continue;
            }

            let index = grid.index(x, y);
            let directions = grid.directions_mut();
            let old = directions[index];
            directions[index] = old.lerp(direction, weight).try_normalize().unwrap_or(direction);
            touched += 1;
        }
    }

    touched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_disc(grid: &FlowGrid, x: u32, y: u32, uv: Vec2, radius: f32) -> bool {
        let p = Vec2::new(x as f32, y as f32) / grid.width() as f32 - uv;
        p.length_squared() < radius * radius
    }

    #[test]
    fn test_falloff_is_monotonic() {
        for hardness in [MIN_HARDNESS, 0.25, 0.5, 0.9, 1.0] {
            let mut previous = brush_falloff(0.0, hardness);
            assert_eq!(previous, 1.0);
            for step in 1..=100 {
                let weight = brush_falloff(step as f32 / 100.0, hardness);
                assert!(weight <= previous, "falloff rose at step {step}");
                previous = weight;
            }
            assert_eq!(brush_falloff(1.0, hardness), 0.0);
        }
    }

    #[test]
    fn test_falloff_hard_core() {
        assert_eq!(brush_falloff(0.4, 0.5), 1.0);
        let edge = brush_falloff(0.75, 0.5);
        assert!(edge > 0.0 && edge < 1.0);
        assert!((edge - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_strength_changes_nothing() {
        let mut grid = FlowGrid::build(4, None).unwrap();
        let before = grid.clone();
        let brush = BrushSettings {
            radius: 0.5,
            strength: 0.0,
            hardness: 0.5,
        };

        let touched = paint_directions(&mut grid, Vec2::splat(0.5), Vec3::X, &brush, 1.0);
        assert_eq!(touched, 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_hard_brush_converges_inside_disc() {
        let mut grid = FlowGrid::build(3, None).unwrap();
        let uv = Vec2::splat(0.5);
        let brush = BrushSettings {
            radius: 0.1,
            strength: 1.0,
            hardness: 1.0,
        };

        paint_directions(&mut grid, uv, Vec3::X, &brush, 1.0);

        for y in 0..grid.width() {
            for x in 0..grid.width() {
                let expected = if in_disc(&grid, x, y, uv, brush.radius) {
                    Vec3::X
                } else {
                    Vec3::Y
                };
                assert_eq!(grid.direction(x, y), expected, "vertex ({x}, {y})");
            }
        }
        assert_eq!(grid.direction(4, 4), Vec3::X);
    }

    #[test]
    fn test_hard_brush_on_fine_grid() {
        let mut grid = FlowGrid::build(6, None).unwrap();
        let uv = Vec2::new(0.3, 0.6);
        let brush = BrushSettings {
            radius: 0.1,
            strength: 1.0,
            hardness: 1.0,
        };

        let touched = paint_directions(&mut grid, uv, Vec3::NEG_Z, &brush, 1.0);
        let mut inside = 0;
        for y in 0..grid.width() {
            for x in 0..grid.width() {
                if in_disc(&grid, x, y, uv, brush.radius) {
                    inside += 1;
                    assert_eq!(grid.direction(x, y), Vec3::NEG_Z);
                } else {
                    assert_eq!(grid.direction(x, y), Vec3::Y);
                }
            }
        }
        assert_eq!(touched, inside);
    }

    #[test]
    fn test_soft_brush_blends_less_at_rim() {
        let mut grid = FlowGrid::build(6, None).unwrap();
        let brush = BrushSettings {
            radius: 0.25,
            strength: 0.5,
            hardness: 0.0,
        };

        paint_directions(&mut grid, Vec2::splat(0.5), Vec3::X, &brush, 1.0);

        let center = grid.direction(32, 32);
        let rim = grid.direction(44, 32);
        assert!(center.x > rim.x);
        assert!(rim.x > 0.0);
        assert!((center.length() - 1.0).abs() < 1e-5);
        assert!((rim.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_brush_clamped_at_grid_edge() {
        let mut grid = FlowGrid::build(3, None).unwrap();
        let brush = BrushSettings {
            radius: 0.3,
            strength: 1.0,
            hardness: 1.0,
        };

        let touched = paint_directions(&mut grid, Vec2::ONE, Vec3::X, &brush, 1.0);
        assert!(touched > 0);
        assert_eq!(grid.direction(7, 7), Vec3::X);
        assert_eq!(grid.direction(0, 0), Vec3::Y);
    }

    #[test]
    fn test_opposite_direction_does_not_produce_nan() {
        let mut grid = FlowGrid::build(3, None).unwrap();
        let brush = BrushSettings {
            radius: 0.2,
            strength: 1.0,
            hardness: 1.0,
        };
        paint_directions(&mut grid, Vec2::splat(0.5), Vec3::X, &brush, 1.0);

        let half = BrushSettings {
            strength: 0.5,
            ..brush
        };
        paint_directions(&mut grid, Vec2::splat(0.5), Vec3::NEG_X, &half, 1.0);
        assert!(grid.directions().iter().all(|d| d.is_finite()));
        assert_eq!(grid.direction(4, 4), Vec3::NEG_X);
    }
}
