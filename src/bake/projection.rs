//! Fixed camera for the top-down bake.
//!
//! The camera sits above the grid looking straight down so that local `x`
//! maps to clip-space `x` and local `z` maps to clip-space `y`, both from
//! `[0, 1]` to `[-1, 1]`.

use bevy::prelude::*;

/// Rows of the view matrix. The tiny terms come from rotating 90 degrees
/// about the x axis in single precision.
const VIEW_ROWS: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, -0.5],
    [0.0, -1.192093e-7, 1.0, -0.5],
    [0.0, 1.0, 1.192093e-7, -1.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Rows of an orthographic projection covering a unit square.
const PROJECTION_ROWS: [[f32; 4]; 4] = [
    [2.0, 0.0, 0.0, 0.0],
    [0.0, 2.0, 0.0, 0.0],
    [0.0, 0.0, -1.0, -1.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// View matrix of the bake camera.
pub fn top_down_view() -> Mat4 {
    Mat4::from_cols_array_2d(&VIEW_ROWS).transpose()
}

/// Projection matrix of the bake camera.
pub fn top_down_projection() -> Mat4 {
    Mat4::from_cols_array_2d(&PROJECTION_ROWS).transpose()
}

/// Combined projection and view.
pub fn top_down_view_projection() -> Mat4 {
    top_down_projection() * top_down_view()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ndc(point: Vec3) -> Vec3 {
        top_down_view_projection().project_point3(point)
    }

    #[test]
    fn test_corners_fill_clip_space() {
        let eps = 1e-5;
        assert!((ndc(Vec3::ZERO) - Vec3::new(-1.0, -1.0, 0.0)).length() < eps);
        assert!((ndc(Vec3::new(1.0, 0.0, 0.0)) - Vec3::new(1.0, -1.0, 0.0)).length() < eps);
        assert!((ndc(Vec3::new(0.0, 0.0, 1.0)) - Vec3::new(-1.0, 1.0, 0.0)).length() < eps);
        assert!((ndc(Vec3::new(1.0, 0.0, 1.0)) - Vec3::new(1.0, 1.0, 0.0)).length() < eps);
    }

    #[test]
    fn test_center_maps_to_origin() {
        assert!(ndc(Vec3::new(0.5, 0.0, 0.5)).length() < 1e-5);
    }

    #[test]
    fn test_view_translation_column() {
        let view = top_down_view();
        assert_eq!(view.w_axis, Vec4::new(-0.5, -0.5, -1.0, 1.0));
        assert_eq!(view.x_axis, Vec4::new(1.0, 0.0, 0.0, 0.0));
    }
}
