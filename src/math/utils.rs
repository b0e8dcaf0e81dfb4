//! Scalar helpers shared by geometry, picking and the game loop.
//!
//! Clamping, byte/float packing, planar distance and colour conversion.

use glam::{Vec2, Vec3};

/// Full turn in radians.
pub const TWO_PI: f32 = std::f32::consts::TAU;

/// Lengths below this are treated as zero.
pub const EPSILON: f32 = 1e-6;

/// Clamp a value to [min, max] range.
#[inline(always)]
pub fn clamp(v: f32, min: f32, max: f32) -> f32 {
    if v < min { min } else if v > max { max } else { v }
}

/// Pack a float to a byte [0, 255].
#[inline(always)]
pub fn float_to_byte(v: f32) -> u8 {
    let vi = (v * 255.0).round() as i32;
    if vi < 0 { 0 } else if vi > 255 { 255 } else { vi as u8 }
}

/// Unpack a byte [0, 255] to a float [0, 1].
#[inline(always)]
pub fn byte_to_float(v: u8) -> f32 {
    v as f32 / 255.0
}

/// Distance between two points in the display plane.
#[inline]
pub fn planar_distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// HSV (each in [0, 1]) to linear RGB.
///
/// Hue wraps, so 1.0 and 0.0 are both red.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    match (i as i32).rem_euclid(6) {
        0 => Vec3::new(v, t, p),
        1 => Vec3::new(q, v, p),
        2 => Vec3::new(p, v, t),
        3 => Vec3::new(p, q, v),
        4 => Vec3::new(t, p, v),
        _ => Vec3::new(v, p, q),
    }
}
