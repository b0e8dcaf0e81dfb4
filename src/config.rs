//! Startup configuration.
//!
//! Passed once from the page as a plain object. Every field is optional;
//! missing ones take the defaults below.

use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::error::Result;
use crate::math::utils;

/// Gameplay tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameSettings {
    /// Nominal tick length pacing the miss timer (ms)
    pub tick_speed_ms: f64,
    /// Number of bacteria seeded on the host sphere
    pub species_count: usize,
    /// Growth/shrink rate; grows by `growth_ramp` on every hit
    pub growth_rate: f32,
    pub growth_ramp: f32,
    /// Points needed by either side to end the game
    pub win_condition: u32,
    /// Adversary points when a bacterium reaches full size
    pub threshold_points: u32,
    /// Time without a hit before the adversary scores (ms)
    pub miss_interval_ms: f64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            tick_speed_ms: 200.0,
            species_count: 10,
            growth_rate: 10.0,
            growth_ramp: 0.5,
            win_condition: 30,
            threshold_points: 2,
            miss_interval_ms: 1000.0,
        }
    }
}

/// Shortest tick length a configuration may ask for (ms).
pub const MIN_TICK_MS: f64 = 1.0;

/// Camera distance limits and current value.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub min: f32,
    pub max: f32,
    pub val: f32,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self { min: 3.0, max: 7.0, val: 5.0 }
    }
}

impl ZoomSettings {
    /// Set the zoom, clamped to [min, max].
    pub fn set(&mut self, val: f32) {
        self.val = if val.is_nan() { self.val } else { utils::clamp(val, self.min, self.max) };
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LightingConfig {
    pub ambient: [f32; 3],
    pub directional_color: [f32; 3],
    pub direction: [f32; 3],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient: [0.3, 0.3, 0.3],
            directional_color: [1.0, 1.0, 1.0],
            direction: [0.0, 5.0, 2.0],
        }
    }
}

/// GL state toggled once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlFeatures {
    pub depth_test: bool,
    pub cull_face: bool,
    pub polygon_offset: bool,
}

impl Default for GlFeatures {
    fn default() -> Self {
        Self { depth_test: true, cull_face: true, polygon_offset: true }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectionConfig {
    /// Vertical field of view (degrees)
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { fov_y_degrees: 60.0, near: 1.0, far: 50.0 }
    }
}

/// Everything the page can tune at startup.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub game: GameSettings,
    pub zoom: ZoomSettings,
    pub lighting: LightingConfig,
    pub clear_color: [f32; 4],
    pub features: GlFeatures,
    pub projection: ProjectionConfig,
    /// Run the off-screen identity pass
    pub picking: bool,
    /// Radius of the host sphere
    pub dish_radius: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game: GameSettings::default(),
            zoom: ZoomSettings::default(),
            lighting: LightingConfig::default(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            features: GlFeatures::default(),
            projection: ProjectionConfig::default(),
            picking: true,
            dish_radius: 1.0,
        }
    }
}

impl GameConfig {
    /// Decode a configuration object from the page. `undefined` and `null`
    /// give the defaults.
    pub fn from_js(value: JsValue) -> Result<Self> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        let config: Self = serde_wasm_bindgen::from_value(value)?;
        Ok(config.sanitized())
    }

    /// Fix up values that would break the game rather than reject them.
    pub fn sanitized(mut self) -> Self {
        if self.zoom.min > self.zoom.max {
            std::mem::swap(&mut self.zoom.min, &mut self.zoom.max);
        }
        let val = self.zoom.val;
        self.zoom.set(val);
        if !(self.dish_radius.is_finite() && self.dish_radius > 0.0) {
            log::warn!("dish radius {} is not positive, using 1.0", self.dish_radius);
            self.dish_radius = 1.0;
        }
        let defaults = GameSettings::default();
        if !(self.game.tick_speed_ms.is_finite() && self.game.tick_speed_ms >= MIN_TICK_MS) {
            log::warn!("tick length {} ms is unusable, using {}", self.game.tick_speed_ms, defaults.tick_speed_ms);
            self.game.tick_speed_ms = defaults.tick_speed_ms;
        }
        if !(self.game.growth_rate.is_finite() && self.game.growth_rate >= 0.0) {
            log::warn!("growth rate {} is unusable, using {}", self.game.growth_rate, defaults.growth_rate);
            self.game.growth_rate = defaults.growth_rate;
        }
        if !(self.game.growth_ramp.is_finite() && self.game.growth_ramp >= 0.0) {
            self.game.growth_ramp = defaults.growth_ramp;
        }
        if self.game.miss_interval_ms.is_nan() || self.game.miss_interval_ms <= 0.0 {
            self.game.miss_interval_ms = defaults.miss_interval_ms;
        }
        self
    }
}
