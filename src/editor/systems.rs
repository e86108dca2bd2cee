//! Systems driving the painter from input, assets and messages.

use bevy::log::{debug, error, info, warn};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::{
    BakeFlowMap, BrushHover, FlowGridMesh, FlowGridSurface, FlowMapImage, FlowPainterCamera,
    HoverHit, RebuildFlowGrid, raycast_grid,
};
use crate::bake::{BakeOutcome, FieldBaker, FileMapStore, SkipReason, allocate_target};
use crate::brush::{FlowPainter, StrokeOutcome};
use crate::config::PainterConfig;
use crate::material::FlowViewerMaterial;
use crate::mesh::MeshFlowExt;
use crate::texture::{DirectionMap, FlowTexture};

/// Mice report no pressure; treat every sample as a full press.
const MOUSE_PRESSURE: f32 = 1.0;

const BLOCKING_KEYS: [KeyCode; 6] = [
    KeyCode::ShiftLeft,
    KeyCode::ShiftRight,
    KeyCode::AltLeft,
    KeyCode::AltRight,
    KeyCode::ControlLeft,
    KeyCode::ControlRight,
];

const BLOCKING_BUTTONS: [MouseButton; 2] = [MouseButton::Right, MouseButton::Middle];

/// Load the persisted flow map, or start from a neutral one, and request
/// the first grid.
pub(crate) fn load_flow_map(
    config: Res<PainterConfig>,
    mut images: ResMut<Assets<Image>>,
    mut flow_map: ResMut<FlowMapImage>,
    mut rebuild: MessageWriter<RebuildFlowGrid>,
) {
    let map = match DirectionMap::load_png(&config.map_path) {
        Ok(map) => {
            info!(
                "Loaded {}x{} flow map from {}",
                map.dimensions().x,
                map.dimensions().y,
                config.map_path.display()
            );
            map
        }
        Err(err) => {
            warn!("Starting with a neutral flow map: {err}");
            DirectionMap::neutral(1 << config.texel_size)
        }
    };

    flow_map.0 = Some(images.add(map.to_image()));
    rebuild.write(RebuildFlowGrid::CREATE);
}

/// Brush size and debug toggles.
pub(crate) fn handle_shortcuts(keys: Res<ButtonInput<KeyCode>>, mut config: ResMut<PainterConfig>) {
    if keys.any_just_pressed([KeyCode::Minus, KeyCode::BracketLeft]) {
        config.shrink_radius();
        debug!("Brush radius {}", config.radius);
    }
    if keys.any_just_pressed([KeyCode::Equal, KeyCode::BracketRight]) {
        config.grow_radius();
        debug!("Brush radius {}", config.radius);
    }
    if keys.just_pressed(KeyCode::KeyV) {
        config.toggle_debug_handles();
    }
}

/// Rebuild the grid when the division changes and rebake when the texel
/// size changes.
///
/// The first run only records the configuration; startup already requests
/// a grid.
pub(crate) fn apply_config_changes(
    config: Res<PainterConfig>,
    mut applied: Local<Option<(u32, u32)>>,
    mut rebuild: MessageWriter<RebuildFlowGrid>,
    mut bake: MessageWriter<BakeFlowMap>,
) {
    if !config.is_changed() {
        return;
    }

    let current = (config.division, config.texel_size);
    let Some((division, texel_size)) = *applied else {
        *applied = Some(current);
        return;
    };
    if current == (division, texel_size) {
        return;
    }
    if let Err(err) = config.validate() {
        warn!("Ignoring painter configuration change: {err}");
        return;
    }
    *applied = Some(current);

    if config.division != division {
        debug!("Flow grid division changed to {}", config.division);
        rebuild.write(RebuildFlowGrid::CREATE);
    }
    if config.texel_size != texel_size {
        debug!("Flow map texel size changed to {}", config.texel_size);
        bake.write(BakeFlowMap);
    }
}

/// Replace the grid and its mesh asset.
pub(crate) fn handle_rebuild_requests(
    mut commands: Commands,
    mut requests: MessageReader<RebuildFlowGrid>,
    mut bake: MessageWriter<BakeFlowMap>,
    config: Res<PainterConfig>,
    images: Res<Assets<Image>>,
    flow_map: Res<FlowMapImage>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut grid_mesh: ResMut<FlowGridMesh>,
    mut painter: ResMut<FlowPainter>,
    surfaces: Query<Entity, With<FlowGridSurface>>,
) {
    let Some(request) = requests.read().last().copied() else {
        return;
    };

    if let Some(old) = grid_mesh.0.take() {
        meshes.remove(&old);
    }

    let source = request
        .use_flow_map
        .then(|| flow_map.0.as_ref().and_then(|handle| images.get(handle)))
        .flatten()
        .map(|image| image as &dyn FlowTexture);

    match painter.rebuild(config.division, source) {
        Ok(grid) => {
            let handle = meshes.add(grid.to_mesh());
            for entity in &surfaces {
                commands.entity(entity).insert(Mesh3d(handle.clone()));
            }
            info!(
                "Rebuilt {}x{} flow grid",
                grid.width(),
                grid.width()
            );
            grid_mesh.0 = Some(handle);
        }
        Err(err) => {
            error!("Cannot rebuild flow grid: {err}");
            return;
        }
    }

    if request.bake_after {
        bake.write(BakeFlowMap);
    }
}

/// Give surfaces spawned after the last rebuild the current grid mesh.
pub(crate) fn attach_grid_mesh(
    mut commands: Commands,
    grid_mesh: Res<FlowGridMesh>,
    surfaces: Query<Entity, (With<FlowGridSurface>, Without<Mesh3d>)>,
) {
    let Some(handle) = grid_mesh.0.as_ref() else {
        return;
    };
    for entity in &surfaces {
        commands.entity(entity).insert(Mesh3d(handle.clone()));
    }
}

/// Cast the cursor ray against every grid surface and keep the nearest hit.
pub(crate) fn update_brush_hover(
    mut hover: ResMut<BrushHover>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<FlowPainterCamera>>,
    surfaces: Query<(Entity, &GlobalTransform), With<FlowGridSurface>>,
) {
    hover.0 = None;

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor) else {
        return;
    };

    hover.0 = surfaces
        .iter()
        .filter_map(|(surface, transform)| {
            raycast_grid(ray, transform).map(|hit| HoverHit { surface, hit })
        })
        .min_by(|a, b| a.hit.distance.total_cmp(&b.hit.distance));
}

/// Drive strokes from the left mouse button.
///
/// Holding a modifier or another button ends the stroke. A finished stroke
/// requests a bake.
pub(crate) fn paint_with_pointer(
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    hover: Res<BrushHover>,
    config: Res<PainterConfig>,
    grid_mesh: Res<FlowGridMesh>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut painter: ResMut<FlowPainter>,
    mut bake: MessageWriter<BakeFlowMap>,
) {
    let blocked = keys.any_pressed(BLOCKING_KEYS) || mouse.any_pressed(BLOCKING_BUTTONS);
    if blocked || mouse.just_released(MouseButton::Left) {
        if painter.end_stroke() {
            bake.write(BakeFlowMap);
        }
        return;
    }

    if mouse.just_pressed(MouseButton::Left) {
        painter.begin_stroke(hover.brush_hit());
        return;
    }

    if !mouse.pressed(MouseButton::Left) {
        return;
    }
    let Some(hit) = hover.brush_hit() else {
        return;
    };

    if let StrokeOutcome::Painted { touched } =
        painter.continue_stroke(hit, MOUSE_PRESSURE, &config.brush())
    {
        let Some(grid) = painter.grid() else {
            return;
        };
        if let Some(mesh) = grid_mesh.0.as_ref().and_then(|handle| meshes.get_mut(handle)) {
            mesh.set_flow_directions(grid.directions());
        }
        debug!("Painted {touched} flow vertices");
    }
}

/// Bake the grid into the flow map, persist it and rebind viewer materials.
///
/// A missing target, or one whose size no longer matches the configured
/// texel size, is replaced by a new one once the bake succeeds.
pub(crate) fn handle_bake_requests(
    mut requests: MessageReader<BakeFlowMap>,
    config: Res<PainterConfig>,
    painter: Res<FlowPainter>,
    mut baker: ResMut<FieldBaker>,
    mut flow_map: ResMut<FlowMapImage>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<FlowViewerMaterial>>,
) {
    if requests.read().count() == 0 {
        return;
    }

    // The target always has the configured resolution.
    let current = flow_map.0.clone().filter(|handle| {
        images
            .get(handle)
            .is_some_and(|image| has_texel_size(image, config.texel_size))
    });
    let fresh = current.is_none();
    let handle = match current {
        Some(handle) => handle,
        None => match allocate_target(config.texel_size) {
            Ok(target) => images.add(target.to_image()),
            Err(err) => {
                error!("Cannot allocate flow map: {err}");
                return;
            }
        },
    };

    let Some(image) = images.get_mut(&handle) else {
        warn!("Flow map image is not loaded; skipping bake");
        return;
    };

    let mut store = FileMapStore::new(config.map_path.clone());
    let baked = match baker.bake(painter.grid(), image, &mut store) {
        Ok(BakeOutcome::Baked { size, bytes }) => {
            info!("Baked {}x{} flow map ({bytes} bytes)", size.x, size.y);
            true
        }
        Ok(BakeOutcome::Skipped(SkipReason::NoGrid)) => {
            debug!("No flow grid to bake");
            false
        }
        Ok(BakeOutcome::Skipped(SkipReason::NoShader)) => {
            warn!("Flow baker has no shader; skipping bake");
            false
        }
        Err(err) => {
            error!("Flow map bake failed: {err}");
            false
        }
    };

    if !baked {
        if fresh {
            images.remove(&handle);
        }
        return;
    }
    if fresh {
        flow_map.0 = Some(handle.clone());
    }

    for (_, material) in materials.iter_mut() {
        material.extension.flow_map = handle.clone();
    }
}

fn has_texel_size(image: &Image, texel_size: u32) -> bool {
    1u32.checked_shl(texel_size)
        .is_some_and(|side| image.width() == side && image.height() == side)
}
