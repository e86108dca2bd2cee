//! Baking the painted field into a direction map.
//!
//! A bake renders the grid from straight above with [`top_down_view`] and
//! [`top_down_projection`], shades every covered pixel with a [`BakeShader`],
//! copies the result into the target texture and hands a PNG encoding of it
//! to a [`MapStore`].

use std::path::{Path, PathBuf};

use bevy::log::{debug, info};
use bevy::prelude::*;
use thiserror::Error;

use crate::config::{ConfigError, validate_texel_size};
use crate::mesh::FlowGrid;
use crate::texture::{DirectionMap, FlowTexture, PixelFormat, TextureError, validate_texture};

mod projection;
mod raster;

pub use projection::{top_down_projection, top_down_view, top_down_view_projection};
pub use raster::{BakeShader, FieldRenderer, FlowEncodeShader, SoftwareRasterizer};

/// Errors that abort a bake.
#[derive(Error, Debug)]
pub enum BakeError {
    #[error("Cannot bake into flow map: {0}")]
    Texture(#[from] TextureError),

    #[error("Failed to write flow map to {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a bake did nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No grid has been built yet.
    NoGrid,
    /// The baker has no shader assigned.
    NoShader,
}

/// Result of a bake that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BakeOutcome {
    /// The target was rewritten and `bytes` of PNG were stored.
    Baked { size: UVec2, bytes: usize },
    Skipped(SkipReason),
}

/// Destination for the encoded direction map.
pub trait MapStore {
    fn store(&mut self, png: &[u8]) -> Result<(), BakeError>;
}

/// Writes the direction map to a file, creating parent directories.
#[derive(Clone, Debug, PartialEq)]
pub struct FileMapStore {
    path: PathBuf,
}

impl FileMapStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MapStore for FileMapStore {
    fn store(&mut self, png: &[u8]) -> Result<(), BakeError> {
        let io_error = |source| BakeError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        std::fs::write(&self.path, png).map_err(io_error)?;

        info!("Wrote flow map to {}", self.path.display());
        Ok(())
    }
}

/// Create an empty square RGB target of `2^texel_size` texels per side.
pub fn allocate_target(texel_size: u32) -> Result<DirectionMap, ConfigError> {
    validate_texel_size(texel_size)?;
    let side = 1u32 << texel_size;
    Ok(DirectionMap::new(UVec2::splat(side), PixelFormat::Rgb8))
}

/// Renders a flow grid into direction map textures.
///
/// # Example
/// ```
/// use bevy_flowmap_painter::bake::{BakeOutcome, FieldBaker, MapStore, BakeError, allocate_target};
/// use bevy_flowmap_painter::mesh::FlowGrid;
///
/// struct Discard;
/// impl MapStore for Discard {
///     fn store(&mut self, _png: &[u8]) -> Result<(), BakeError> {
///         Ok(())
///     }
/// }
///
/// let grid = FlowGrid::build(3, None).unwrap();
/// let mut target = allocate_target(4).unwrap();
/// let outcome = FieldBaker::default().bake(Some(&grid), &mut target, &mut Discard).unwrap();
/// assert!(matches!(outcome, BakeOutcome::Baked { .. }));
/// ```
#[derive(Resource)]
pub struct FieldBaker {
    renderer: Box<dyn FieldRenderer>,
    shader: Option<Box<dyn BakeShader>>,
}

impl Default for FieldBaker {
    fn default() -> Self {
        Self {
            renderer: Box::new(SoftwareRasterizer),
            shader: Some(Box::new(FlowEncodeShader)),
        }
    }
}

impl FieldBaker {
    /// A baker with the default renderer and no shader. Bakes are skipped
    /// until one is assigned.
    pub fn without_shader() -> Self {
        Self {
            shader: None,
            ..Default::default()
        }
    }

    pub fn with_renderer(mut self, renderer: impl FieldRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_shader(mut self, shader: impl BakeShader + 'static) -> Self {
        self.shader = Some(Box::new(shader));
        self
    }

    pub fn has_shader(&self) -> bool {
        self.shader.is_some()
    }

    /// Render `grid` into `target` and store the result.
    ///
    /// The target is validated before anything is rendered; on error neither
    /// the target nor the store is touched.
    pub fn bake(
        &mut self,
        grid: Option<&FlowGrid>,
        target: &mut dyn FlowTexture,
        store: &mut dyn MapStore,
    ) -> Result<BakeOutcome, BakeError> {
        let Some(grid) = grid else {
            return Ok(BakeOutcome::Skipped(SkipReason::NoGrid));
        };
        let Some(shader) = self.shader.as_deref() else {
            return Ok(BakeOutcome::Skipped(SkipReason::NoShader));
        };

        validate_texture(&*target)?;

        let size = target.dimensions();
        let rgba = self
            .renderer
            .render(grid, shader, top_down_view_projection(), size);
        target.write_pixels(&rgba)?;

        let png = target.encode_png()?;
        store.store(&png)?;

        debug!(
            "Baked {}x{} flow grid into {}x{} map",
            grid.width(),
            grid.width(),
            size.x,
            size.y
        );

        Ok(BakeOutcome::Baked {
            size,
            bytes: png.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::{BrushSettings, paint_directions};

    #[derive(Default)]
    struct MemoryStore {
        writes: Vec<Vec<u8>>,
    }

    impl MapStore for MemoryStore {
        fn store(&mut self, png: &[u8]) -> Result<(), BakeError> {
            self.writes.push(png.to_vec());
            Ok(())
        }
    }

    fn uniform_grid(division: u32, direction: Vec3) -> FlowGrid {
        let mut grid = FlowGrid::build(division, None).unwrap();
        grid.directions_mut().fill(direction);
        grid
    }

    #[test]
    fn test_allocate_target() {
        let target = allocate_target(3).unwrap();
        assert_eq!(target.dimensions(), UVec2::splat(8));
        assert_eq!(target.format(), PixelFormat::Rgb8);
        assert_eq!(
            allocate_target(11).unwrap_err(),
            ConfigError::TexelSizeOutOfRange { value: 11 }
        );
    }

    #[test]
    fn test_unreadable_target_stores_nothing() {
        let grid = FlowGrid::build(3, None).unwrap();
        let mut target = DirectionMap::new(UVec2::splat(8), PixelFormat::Rgb8).with_readable(false);
        let before = target.clone();
        let mut store = MemoryStore::default();

        let result = FieldBaker::default().bake(Some(&grid), &mut target, &mut store);

        assert!(matches!(
            result,
            Err(BakeError::Texture(TextureError::NotReadable))
        ));
        assert!(store.writes.is_empty());
        assert_eq!(target, before);
    }

    #[test]
    fn test_skips_without_grid_or_shader() {
        let grid = FlowGrid::build(2, None).unwrap();
        let mut target = allocate_target(2).unwrap();
        let mut store = MemoryStore::default();

        let outcome = FieldBaker::default().bake(None, &mut target, &mut store);
        assert_eq!(outcome.unwrap(), BakeOutcome::Skipped(SkipReason::NoGrid));

        let outcome = FieldBaker::without_shader().bake(Some(&grid), &mut target, &mut store);
        assert_eq!(outcome.unwrap(), BakeOutcome::Skipped(SkipReason::NoShader));

        assert!(store.writes.is_empty());
    }

    #[test]
    fn test_up_grid_bakes_neutral_map() {
        let grid = FlowGrid::build(3, None).unwrap();
        let mut target = allocate_target(4).unwrap();
        let mut store = MemoryStore::default();

        let outcome = FieldBaker::default()
            .bake(Some(&grid), &mut target, &mut store)
            .unwrap();

        assert!(matches!(outcome, BakeOutcome::Baked { size, .. } if size == UVec2::splat(16)));
        assert_eq!(store.writes.len(), 1);
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(target.texel(x, y), [128, 255, 128]);
            }
        }

        let stored = DirectionMap::decode_png(&store.writes[0]).unwrap();
        assert_eq!(stored.texel(5, 9), [128, 255, 128]);
    }

    #[test]
    fn test_sideways_grid_bakes_zero_red() {
        let grid = uniform_grid(3, Vec3::X);
        let mut target = allocate_target(3).unwrap();

        FieldBaker::default()
            .bake(Some(&grid), &mut target, &mut MemoryStore::default())
            .unwrap();

        assert_eq!(target.texel(0, 0), [0, 128, 128]);
        assert_eq!(target.texel(7, 7), [0, 128, 128]);
    }

    #[test]
    fn test_bake_preserves_format_of_rgba_target() {
        let grid = uniform_grid(2, Vec3::NEG_Z);
        let mut target = DirectionMap::new(UVec2::splat(4), PixelFormat::Bgra8);

        FieldBaker::default()
            .bake(Some(&grid), &mut target, &mut MemoryStore::default())
            .unwrap();

        assert_eq!(target.format(), PixelFormat::Bgra8);
        assert_eq!(target.texel(1, 2), [128, 128, 255]);
    }

    #[test]
    fn test_bake_then_rebuild_round_trips() {
        let direction = Vec3::new(1.0, 1.0, -0.5).normalize();
        let grid = uniform_grid(4, direction);
        let mut target = allocate_target(5).unwrap();

        FieldBaker::default()
            .bake(Some(&grid), &mut target, &mut MemoryStore::default())
            .unwrap();

        let rebuilt = FlowGrid::build(4, Some(&target)).unwrap();
        for decoded in rebuilt.directions() {
            assert!((decoded.x - direction.x).abs() < 0.01);
            assert!((decoded.z - direction.z).abs() < 0.01);
        }
    }

    #[test]
    fn test_painted_stroke_survives_bake() {
        let mut grid = FlowGrid::build(5, None).unwrap();
        let brush = BrushSettings {
            radius: 0.3,
            strength: 1.0,
            hardness: 1.0,
        };
        paint_directions(&mut grid, Vec2::splat(0.5), Vec3::X, &brush, 1.0);

        let mut target = allocate_target(6).unwrap();
        FieldBaker::default()
            .bake(Some(&grid), &mut target, &mut MemoryStore::default())
            .unwrap();

        // The disc center is painted, the corners are untouched.
        assert_eq!(target.texel(32, 32), [0, 128, 128]);
        assert_eq!(target.texel(0, 0), [128, 255, 128]);
        assert_eq!(target.texel(63, 63), [128, 255, 128]);
    }

    #[test]
    fn test_bake_is_deterministic() {
        let mut grid = FlowGrid::build(4, None).unwrap();
        paint_directions(
            &mut grid,
            Vec2::new(0.3, 0.7),
            Vec3::NEG_X,
            &BrushSettings::default(),
            1.0,
        );

        let bake = |grid: &FlowGrid| {
            let mut target = allocate_target(5).unwrap();
            let mut store = MemoryStore::default();
            FieldBaker::default()
                .bake(Some(grid), &mut target, &mut store)
                .unwrap();
            (target, store.writes)
        };

        assert_eq!(bake(&grid), bake(&grid));
    }

    #[test]
    fn test_file_store_creates_directories() {
        let dir = std::env::temp_dir().join(format!("flowmap-store-{}", std::process::id()));
        let path = dir.join("nested").join("dirmap.png");
        let mut store = FileMapStore::new(&path);

        store.store(&[1, 2, 3]).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
