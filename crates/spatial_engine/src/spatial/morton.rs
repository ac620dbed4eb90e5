//! 30-bit Morton codes
//!
//! Each axis is quantized to 10 bits inside the scene bounds and the bits are
//! interleaved as `xyzxyz...`, x in the most significant position.

use crate::foundation::math::Vec3;
use crate::physics::collision::Aabb;

/// Largest quantized coordinate per axis
pub const MORTON_AXIS_MAX: u32 = 1023;

/// Spread the low 10 bits of `v` so two zero bits follow each one
pub fn expand_bits(v: u32) -> u32 {
    let mut v = v & MORTON_AXIS_MAX;
    v = v.wrapping_mul(0x0001_0001) & 0xFF00_00FF;
    v = v.wrapping_mul(0x0000_0101) & 0x0F00_F00F;
    v = v.wrapping_mul(0x0000_0011) & 0xC30C_30C3;
    v = v.wrapping_mul(0x0000_0005) & 0x4924_9249;
    v
}

/// Interleave three 10-bit coordinates into one 30-bit key
pub fn morton3d(x: u32, y: u32, z: u32) -> u32 {
    (expand_bits(x) << 2) | (expand_bits(y) << 1) | expand_bits(z)
}

/// Quantize `point` into `[0, 1023]^3` relative to `bounds`
///
/// Axes where `bounds` has no extent map to the middle of the range.
pub fn quantize(point: Vec3, bounds: &Aabb) -> [u32; 3] {
    let size = bounds.max - bounds.min;
    std::array::from_fn(|i| {
        let normalized = if size[i] > 0.0 {
            ((point[i] - bounds.min[i]) / size[i]).clamp(0.0, 1.0)
        } else {
            0.5
        };
        // Float to int casts saturate, and the clamp keeps NaN out of range
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let q = (normalized * MORTON_AXIS_MAX as f32) as u32;
        q.min(MORTON_AXIS_MAX)
    })
}

/// Morton code of `point` inside `bounds`
pub fn morton_code(point: Vec3, bounds: &Aabb) -> u32 {
    let [x, y, z] = quantize(point, bounds);
    morton3d(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_bits_spreads_every_third() {
        assert_eq!(expand_bits(0b1), 0b1);
        assert_eq!(expand_bits(0b11), 0b1001);
        assert_eq!(expand_bits(MORTON_AXIS_MAX), 0x0924_9249);
    }

    #[test]
    fn test_morton3d_axis_order() {
        assert_eq!(morton3d(1, 0, 0), 0b100);
        assert_eq!(morton3d(0, 1, 0), 0b010);
        assert_eq!(morton3d(0, 0, 1), 0b001);
        assert_eq!(morton3d(1023, 1023, 1023), (1 << 30) - 1);
    }

    #[test]
    fn test_quantize_corners_and_flat_axis() {
        let bounds = Aabb::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(10.0, 10.0, 5.0));
        assert_eq!(quantize(Vec3::new(0.0, 10.0, 5.0), &bounds), [0, 1023, 511]);
        assert_eq!(quantize(Vec3::new(-4.0, 20.0, 5.0), &bounds), [0, 1023, 511]);
    }

    #[test]
    fn test_nearby_points_share_prefix() {
        let bounds = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let a = morton_code(Vec3::new(0.10, 0.10, 0.10), &bounds);
        let b = morton_code(Vec3::new(0.11, 0.10, 0.10), &bounds);
        let far = morton_code(Vec3::new(0.9, 0.9, 0.9), &bounds);
        assert!(a.abs_diff(b) < a.abs_diff(far));
    }
}
