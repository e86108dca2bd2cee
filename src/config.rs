//! Painter configuration surface.

use std::path::PathBuf;

use bevy::prelude::*;
use thiserror::Error;

use crate::brush::BrushSettings;

/// Smallest supported grid subdivision (4x4 vertices).
pub const MIN_DIVISION: u32 = 2;
/// Largest supported grid subdivision (256x256 vertices).
pub const MAX_DIVISION: u32 = 8;
/// Smallest supported flow map resolution exponent (4x4 texels).
pub const MIN_TEXEL_SIZE: u32 = 2;
/// Largest supported flow map resolution exponent (1024x1024 texels).
pub const MAX_TEXEL_SIZE: u32 = 10;
/// Lower bound applied when shrinking the brush from the keyboard.
pub const MIN_RADIUS: f32 = 0.001;
/// Fraction of the current radius added or removed per shortcut press.
pub const RADIUS_STEP: f32 = 0.1;
/// Conventional location of the persisted flow map.
pub const DEFAULT_MAP_PATH: &str = "assets/dirmap.png";

/// Errors produced when validating a [`PainterConfig`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Division {value} is outside {MIN_DIVISION}..={MAX_DIVISION}")]
    DivisionOutOfRange { value: u32 },

    #[error("Texel size {value} is outside {MIN_TEXEL_SIZE}..={MAX_TEXEL_SIZE}")]
    TexelSizeOutOfRange { value: u32 },

    #[error("Brush radius {value} must be in (0, 1]")]
    RadiusOutOfRange { value: f32 },

    #[error("Brush strength {value} must be in [0, 1]")]
    StrengthOutOfRange { value: f32 },

    #[error("Brush hardness {value} must be in [0, 1]")]
    HardnessOutOfRange { value: f32 },
}

/// User-facing settings for grid generation, painting and baking.
///
/// # Example
/// ```
/// use bevy_flowmap_painter::config::PainterConfig;
///
/// let config = PainterConfig::default()
///     .with_division(5)
///     .with_radius(0.2)
///     .with_strength(0.5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct PainterConfig {
    /// log2 of the baked flow map side length.
    pub texel_size: u32,
    /// log2 of the grid side length in vertices.
    pub division: u32,
    /// Brush radius in UV units.
    pub radius: f32,
    /// Blend strength at the brush center.
    pub strength: f32,
    /// Fraction of the radius painted at full strength.
    pub hardness: f32,
    /// Draw per-vertex direction gizmos.
    pub show_debug_handles: bool,
    /// Where the flow map is read from and baked to.
    pub map_path: PathBuf,
}

impl Default for PainterConfig {
    fn default() -> Self {
        Self {
            texel_size: 7,
            division: 7,
            radius: 0.1,
            strength: 0.1,
            hardness: 0.5,
            show_debug_handles: false,
            map_path: PathBuf::from(DEFAULT_MAP_PATH),
        }
    }
}

impl PainterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texel_size(mut self, texel_size: u32) -> Self {
        self.texel_size = texel_size;
        self
    }

    pub fn with_division(mut self, division: u32) -> Self {
        self.division = division;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_hardness(mut self, hardness: f32) -> Self {
        self.hardness = hardness;
        self
    }

    pub fn with_debug_handles(mut self, enable: bool) -> Self {
        self.show_debug_handles = enable;
        self
    }

    pub fn with_map_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.map_path = path.into();
        self
    }

    /// Check every option against its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_division(self.division)?;

        validate_texel_size(self.texel_size)?;

        if !(self.radius > 0.0 && self.radius <= 1.0) {
            return Err(ConfigError::RadiusOutOfRange { value: self.radius });
        }

        if !(0.0..=1.0).contains(&self.strength) {
            return Err(ConfigError::StrengthOutOfRange {
                value: self.strength,
            });
        }

        if !(0.0..=1.0).contains(&self.hardness) {
            return Err(ConfigError::HardnessOutOfRange {
                value: self.hardness,
            });
        }

        Ok(())
    }

    /// Brush parameters for the painter.
    pub fn brush(&self) -> BrushSettings {
        BrushSettings {
            radius: self.radius,
            strength: self.strength,
            hardness: self.hardness,
        }
    }

    /// Shrink the brush by [`RADIUS_STEP`] of its current size.
    pub fn shrink_radius(&mut self) {
        self.radius = (self.radius - self.radius * RADIUS_STEP).clamp(MIN_RADIUS, 1.0);
    }

    /// Grow the brush by [`RADIUS_STEP`] of its current size.
    pub fn grow_radius(&mut self) {
        self.radius = (self.radius + self.radius * RADIUS_STEP).clamp(MIN_RADIUS, 1.0);
    }

    pub fn toggle_debug_handles(&mut self) {
        self.show_debug_handles = !self.show_debug_handles;
    }
}

pub(crate) fn validate_division(division: u32) -> Result<(), ConfigError> {
    if (MIN_DIVISION..=MAX_DIVISION).contains(&division) {
        Ok(())
    } else {
        Err(ConfigError::DivisionOutOfRange { value: division })
    }
}

pub(crate) fn validate_texel_size(texel_size: u32) -> Result<(), ConfigError> {
    if (MIN_TEXEL_SIZE..=MAX_TEXEL_SIZE).contains(&texel_size) {
        Ok(())
    } else {
        Err(ConfigError::TexelSizeOutOfRange { value: texel_size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PainterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.division, 7);
        assert_eq!(config.texel_size, 7);
    }

    #[test]
    fn test_out_of_range_options() {
        assert_eq!(
            PainterConfig::default().with_division(9).validate(),
            Err(ConfigError::DivisionOutOfRange { value: 9 })
        );
        assert_eq!(
            PainterConfig::default().with_texel_size(1).validate(),
            Err(ConfigError::TexelSizeOutOfRange { value: 1 })
        );
        assert!(matches!(
            PainterConfig::default().with_radius(0.0).validate(),
            Err(ConfigError::RadiusOutOfRange { .. })
        ));
        assert!(matches!(
            PainterConfig::default().with_strength(1.5).validate(),
            Err(ConfigError::StrengthOutOfRange { .. })
        ));
        assert!(matches!(
            PainterConfig::default().with_hardness(-0.1).validate(),
            Err(ConfigError::HardnessOutOfRange { .. })
        ));
    }

    #[test]
    fn test_radius_shortcuts() {
        let mut config = PainterConfig::default().with_radius(0.5);
        config.grow_radius();
        assert!((config.radius - 0.55).abs() < 1e-6);
        config.shrink_radius();
        assert!((config.radius - 0.495).abs() < 1e-6);

        let mut config = PainterConfig::default().with_radius(1.0);
        config.grow_radius();
        assert_eq!(config.radius, 1.0);
    }

    #[test]
    fn test_toggle_debug_handles() {
        let mut config = PainterConfig::default();
        config.toggle_debug_handles();
        assert!(config.show_debug_handles);
        config.toggle_debug_handles();
        assert!(!config.show_debug_handles);
    }
}
