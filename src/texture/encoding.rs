//! Conversion between flow directions and direction map colors.
//!
//! Only red and blue carry information when decoding: red holds the inverted
//! x component, blue the inverted z component, and the height is rebuilt on
//! the upper unit hemisphere. Green stores the height when encoding so the
//! map stays readable by eye.

use bevy::prelude::*;

/// Decode a direction from a color with channels in `[0, 1]`.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_flowmap_painter::texture::decode_direction;
///
/// let up = decode_direction(Vec3::new(0.5, 1.0, 0.5));
/// assert!((up - Vec3::Y).length() < 1e-6);
/// ```
#[inline]
pub fn decode_direction(color: Vec3) -> Vec3 {
    let x = (1.0 - color.x) * 2.0 - 1.0;
    let z = (1.0 - color.z) * 2.0 - 1.0;
    let y = (1.0 - (x * x + z * z)).max(0.0).sqrt();
    Vec3::new(x, y, z)
}

/// Encode a direction as a color with channels in `[0, 1]`.
///
/// Exact inverse of [`decode_direction`] for the x and z components.
#[inline]
pub fn encode_direction(direction: Vec3) -> Vec3 {
    Vec3::new(
        (1.0 - direction.x) * 0.5,
        direction.y * 0.5 + 0.5,
        (1.0 - direction.z) * 0.5,
    )
}

/// Convert a normalized RGBA color to 8-bit channels, rounding to nearest.
#[inline]
pub fn quantize_color(color: Vec4) -> [u8; 4] {
    let c = (color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8, c.w as u8]
}

/// Convert 8-bit RGB channels to a normalized color.
#[inline]
pub fn texel_to_color(rgb: [u8; 3]) -> Vec3 {
    Vec3::new(rgb[0] as f32, rgb[1] as f32, rgb[2] as f32) / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_up_round_trips_to_neutral_midpoint() {
        let texel = quantize_color(encode_direction(Vec3::Y).extend(1.0));
        assert_eq!(texel, [128, 255, 128, 255]);

        let decoded = decode_direction(texel_to_color([texel[0], texel[1], texel[2]]));
        assert!((decoded - Vec3::Y).length() < 0.01);

        let again = quantize_color(encode_direction(decoded).extend(1.0));
        assert_eq!(again, texel);
    }

    #[test]
    fn test_green_is_ignored_on_decode() {
        let a = decode_direction(Vec3::new(0.2, 0.0, 0.7));
        let b = decode_direction(Vec3::new(0.2, 1.0, 0.7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_horizontal_directions() {
        let east = decode_direction(encode_direction(Vec3::X));
        assert!((east - Vec3::X).length() < 1e-6);

        let north = decode_direction(encode_direction(Vec3::NEG_Z));
        assert!((north - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_height_is_clamped_outside_unit_disc() {
        // x = z = -1 lies outside the unit disc.
        let dir = decode_direction(Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(dir.y, 0.0);
    }
}
