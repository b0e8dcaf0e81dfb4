//! Identity ↔ colour encoding for the off-screen picking pass.
//!
//! An identity is written as four little-endian bytes, each divided by
//! 255 into a colour channel. The picking target is cleared to all zeros,
//! so a pixel that decodes to 0 means no entity is under the cursor.

use glam::{UVec2, Vec2, Vec4};

use super::backend::CanvasSize;
use crate::math::utils;

/// Bytes of `id`, least significant first.
#[inline]
pub fn encode_id(id: u32) -> [u8; 4] {
    id.to_le_bytes()
}

/// Colour uniform for `id`.
pub fn id_to_color(id: u32) -> Vec4 {
    let [r, g, b, a] = encode_id(id);
    Vec4::new(
        utils::byte_to_float(r),
        utils::byte_to_float(g),
        utils::byte_to_float(b),
        utils::byte_to_float(a),
    )
}

/// Inverse of `encode_id` applied to a read-back pixel.
#[inline]
pub fn decode_pixel(pixel: [u8; 4]) -> u32 {
    u32::from_le_bytes(pixel)
}

/// Quantize a colour the way an 8-bit-per-channel target stores it.
pub fn color_to_pixel(color: Vec4) -> [u8; 4] {
    [
        utils::float_to_byte(color.x),
        utils::float_to_byte(color.y),
        utils::float_to_byte(color.z),
        utils::float_to_byte(color.w),
    ]
}

/// Convert a canvas-relative CSS-pixel position to framebuffer pixel
/// coordinates (origin bottom-left).
///
/// Returns `None` when the canvas has no size or the cursor is outside it.
pub fn cursor_to_pixel(cursor: Vec2, size: CanvasSize) -> Option<UVec2> {
    if size.is_empty() || size.display.x <= 0.0 || size.display.y <= 0.0 || !cursor.is_finite() {
        return None;
    }
    let width = size.backing.x as f32;
    let height = size.backing.y as f32;

    let x = (cursor.x * width / size.display.x).floor();
    let row = (cursor.y * height / size.display.y).floor();

    if x < 0.0 || row < 0.0 || x >= width || row >= height {
        return None;
    }
    Some(UVec2::new(x as u32, size.backing.y - 1 - row as u32))
}
