//! Ambient + directional light.
//!
//! The shaded-pass vertex shader computes
//! `ambient + color * max(dot(n, normalize(direction)), 0)`; `shade` is the
//! same expression on the CPU so the lighting model can be checked without
//! a GPU.

use glam::Vec3;

use crate::config::LightingConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Ambient light colour
    pub ambient: Vec3,
    /// Directional light colour
    pub color: Vec3,
    /// Direction toward the light, not necessarily normalized
    pub direction: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.3),
            color: Vec3::ONE,
            direction: Vec3::new(0.0, 5.0, 2.0),
        }
    }
}

impl From<&LightingConfig> for DirectionalLight {
    fn from(config: &LightingConfig) -> Self {
        Self {
            ambient: Vec3::from_array(config.ambient),
            color: Vec3::from_array(config.directional_color),
            direction: Vec3::from_array(config.direction),
        }
    }
}

impl DirectionalLight {
    /// Lambert term for a surface normal.
    pub fn lambert(&self, normal: Vec3) -> f32 {
        let dir = self.direction.normalize_or_zero();
        normal.normalize_or_zero().dot(dir).max(0.0)
    }

    /// Light reaching a surface with the given normal.
    pub fn shade(&self, normal: Vec3) -> Vec3 {
        self.ambient + self.color * self.lambert(normal)
    }

    /// Final colour of a surface of `base` colour.
    pub fn shade_color(&self, base: Vec3, normal: Vec3) -> Vec3 {
        base * self.shade(normal)
    }
}
