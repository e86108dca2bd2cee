//! Pointer ray against the grid surface.

use bevy::prelude::*;

use crate::brush::BrushHit;
use crate::mesh::GRID_NORMAL;

/// Rays closer than this to parallel with the grid never hit it.
const PARALLEL_EPSILON: f32 = 1e-6;

/// A ray hit on a grid, in both local and world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridHit {
    /// Hit in the grid's local space, ready for painting.
    pub local: BrushHit,
    pub world_point: Vec3,
    pub world_normal: Vec3,
    /// Distance from the ray origin, in world units.
    pub distance: f32,
}

/// Intersect `ray` with the unit-square grid placed by `transform`.
///
/// The grid lies on its local `y = 0` plane with `x` and `z` in `[0, 1]`;
/// the local `x` and `z` of the hit are its UV.
pub fn raycast_grid(ray: Ray3d, transform: &GlobalTransform) -> Option<GridHit> {
    let inverse = transform.affine().inverse();
    let origin = inverse.transform_point3(ray.origin);
    let direction = inverse.transform_vector3(*ray.direction);

    if direction.y.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = -origin.y / direction.y;
    if t < 0.0 {
        return None;
    }

    let mut point = origin + direction * t;
    point.y = 0.0;
    if !(0.0..=1.0).contains(&point.x) || !(0.0..=1.0).contains(&point.z) {
        return None;
    }

    let world_point = transform.transform_point(point);
    Some(GridHit {
        local: BrushHit {
            point,
            normal: GRID_NORMAL,
            uv: Vec2::new(point.x, point.z),
        },
        world_point,
        world_normal: *transform.up(),
        distance: ray.origin.distance(world_point),
    })
}
