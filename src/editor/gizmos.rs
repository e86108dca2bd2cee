//! Debug drawing of the painted field and the brush.

use bevy::prelude::*;

use super::{BrushHover, FlowGridSurface};
use crate::brush::FlowPainter;
use crate::config::PainterConfig;

/// Directions closer to straight up than this are not drawn.
const UPRIGHT_DOT: f32 = 0.99;

/// Draw painted directions, the last drag and the brush outline.
pub(crate) fn draw_flow_gizmos(
    mut gizmos: Gizmos,
    config: Res<PainterConfig>,
    painter: Res<FlowPainter>,
    hover: Res<BrushHover>,
    surfaces: Query<&GlobalTransform, With<FlowGridSurface>>,
) {
    if let Some(grid) = painter.grid() {
        let length = 1.0 / grid.width() as f32;

        for transform in &surfaces {
            if config.show_debug_handles {
                for (position, direction) in grid.positions().iter().zip(grid.directions()) {
                    if direction.dot(Vec3::Y) > UPRIGHT_DOT {
                        continue;
                    }

                    let color = (*direction + Vec3::ONE) * 0.5;
                    gizmos.line(
                        transform.transform_point(*position),
                        transform.transform_point(*position + *direction * length),
                        Color::srgb(color.x, color.y, color.z),
                    );
                }
            }

            let drag = painter.current_direction();
            if drag != Vec3::ZERO {
                let start = painter.current_position();
                gizmos.line(
                    transform.transform_point(start),
                    transform.transform_point(start + drag * config.radius),
                    Color::srgb(1.0, 1.0, 0.0),
                );
            }
        }
    }

    if let Some(hover) = hover.0 {
        let Ok(transform) = surfaces.get(hover.surface) else {
            return;
        };
        let (scale, _, _) = transform.to_scale_rotation_translation();
        let rotation = Quat::from_rotation_arc(Vec3::Z, hover.hit.world_normal);
        gizmos.circle(
            Isometry3d::new(hover.hit.world_point, rotation),
            config.radius * scale.x,
            Color::WHITE,
        );
    }
}
