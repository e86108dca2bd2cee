//! Interactive flow map painter.
//!
//! Drag with the left mouse button to paint. Releasing the button bakes the
//! map to `assets/dirmap.png`.
//!
//! - `-` / `[` and `=` / `]` resize the brush
//! - `V` toggles per-vertex direction handles
//! - `C` rebuilds the grid from the saved map, `R` resets it

use bevy::prelude::*;
use bevy_flowmap_painter::prelude::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(FlowMapPainterPlugin::new(
            PainterConfig::default()
                .with_division(6)
                .with_radius(0.08)
                .with_strength(0.3),
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, grid_buttons.before(FlowPainterSystems))
        .run();
}

fn setup(
    mut commands: Commands,
    mut materials: ResMut<Assets<FlowViewerMaterial>>,
    flow_map: Res<FlowMapImage>,
) {
    let material = FlowViewerMaterial {
        base: StandardMaterial {
            base_color: Color::WHITE,
            unlit: true,
            ..default()
        },
        extension: FlowMapExtension::new(flow_map.0.clone().unwrap_or_default()),
    };

    // A 4x4 grid centered on the origin
    commands.spawn((
        FlowGridSurface,
        MeshMaterial3d(materials.add(material)),
        Transform::from_xyz(-2.0, 0.0, -2.0).with_scale(Vec3::splat(4.0)),
    ));

    commands.spawn((
        DirectionalLight::default(),
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Camera3d::default(),
        FlowPainterCamera,
        Transform::from_xyz(0.0, 5.0, 3.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn grid_buttons(keys: Res<ButtonInput<KeyCode>>, mut rebuild: MessageWriter<RebuildFlowGrid>) {
    if keys.just_pressed(KeyCode::KeyC) {
        rebuild.write(RebuildFlowGrid::CREATE);
    } else if keys.just_pressed(KeyCode::KeyR) {
        rebuild.write(RebuildFlowGrid::RESET);
    }
}
