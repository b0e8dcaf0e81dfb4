//! Species colouring.
//!
//! Spreads `n` species over the hue wheel, stopping short of a full turn
//! so the last species is not red again.

use glam::Vec3;

use crate::math::utils;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeciesPalette {
    /// Fraction of the hue wheel used
    pub hue_range: f32,
    pub saturation: f32,
    pub value: f32,
}

impl Default for SpeciesPalette {
    fn default() -> Self {
        Self { hue_range: 0.95, saturation: 1.0, value: 1.0 }
    }
}

impl SpeciesPalette {
    /// Colour of species `index` out of `count`.
    pub fn sample(&self, index: usize, count: usize) -> Vec3 {
        let step = if count == 0 { 0.0 } else { self.hue_range / count as f32 };
        utils::hsv_to_rgb(step * index as f32, self.saturation, self.value)
    }
}
