//! Flow map preview material.
//!
//! [`FlowMapExtension`] extends Bevy's [`StandardMaterial`](bevy::pbr::StandardMaterial)
//! with a baked flow map. Its fragment shader decodes the map and either
//! scrolls a background texture along the flow or shows the decoded
//! directions as color.

use bevy::asset::embedded_asset;
use bevy::prelude::*;

mod extension;

pub use extension::{FlowMapExtension, FlowMapSettings, FlowViewerMaterial};

pub(crate) fn register_embedded_assets(app: &mut App) {
    embedded_asset!(app, "shaders/flow_map.wgsl");
}
