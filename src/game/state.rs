//! Scores, growth pacing and win/lose rules.

use glam::Vec2;

use crate::config::GameSettings;
use crate::math::utils;
use crate::scene::{EntityId, World};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
}

impl Outcome {
    pub fn text(self) -> &'static str {
        match self {
            Outcome::Win => "YOU WIN!",
            Outcome::Lose => "YOU LOSE!",
        }
    }

    /// CSS colour for the outcome banner.
    pub fn color(self) -> &'static str {
        match self {
            Outcome::Win => "green",
            Outcome::Lose => "red",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scores {
    pub player: u32,
    /// Points scored by the bacteria
    pub adversary: u32,
}

#[derive(Clone, Debug)]
pub struct GameState {
    settings: GameSettings,
    growth_rate: f32,
    scores: Scores,
    running: bool,
    paused: bool,
    /// Frame time not yet consumed by a whole tick (ms)
    tick_clock: f64,
    /// Time since the last hit, advanced in whole ticks (ms)
    miss_timer: f64,
    outcome: Option<Outcome>,
}

impl GameState {
    pub fn new(settings: GameSettings) -> Self {
        Self {
            growth_rate: settings.growth_rate,
            settings,
            scores: Scores::default(),
            running: true,
            paused: false,
            tick_clock: 0.0,
            miss_timer: 0.0,
            outcome: None,
        }
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn growth_rate(&self) -> f32 {
        self.growth_rate
    }

    pub fn miss_timer(&self) -> f64 {
        self.miss_timer
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.paused = true;
    }

    /// Advance growth by one step and the miss timer by `dt_ms`.
    pub fn tick(&mut self, world: &mut World, dt_ms: f64) {
        if !self.running || self.paused {
            return;
        }
        self.advance_miss_timer(dt_ms);

        let rate = self.growth_rate;
        let mut latched = 0u32;
        for bacterium in world.bacteria_mut() {
            if bacterium.step(rate) {
                latched += 1;
            }
        }
        if latched > 0 {
            self.scores.adversary += latched * self.settings.threshold_points;
            log::debug!("{latched} colonies reached full size");
        }
    }

    fn advance_miss_timer(&mut self, dt_ms: f64) {
        let tick = self.settings.tick_speed_ms;
        if !(dt_ms.is_finite() && dt_ms > 0.0) || !(tick.is_finite() && tick > 0.0) {
            return;
        }
        self.tick_clock += dt_ms;
        let ticks = (self.tick_clock / tick).floor();
        if ticks < 1.0 {
            return;
        }
        self.tick_clock = (self.tick_clock - ticks * tick).max(0.0);

        let interval = self.settings.miss_interval_ms;
        if !interval.is_finite() {
            self.miss_timer += ticks * tick;
            return;
        }
        // the adversary scores on every tick that carries the timer to the interval
        let per_point = (interval / tick).ceil().max(1.0);
        let elapsed = (self.miss_timer / tick).round() + ticks;
        let points = (elapsed / per_point).floor();
        self.scores.adversary = self.scores.adversary.saturating_add(points as u32);
        self.miss_timer = (elapsed - points * per_point) * tick;
    }

    /// Apply a click at `click` against the latest picking result.
    ///
    /// The click only counts when the pointer has not moved since the last
    /// cursor update and it lands on an active bacterium that is not
    /// already shrinking. Returns the bacterium hit.
    pub fn resolve_click(
        &mut self,
        world: &mut World,
        hit: Option<EntityId>,
        click: Vec2,
        cursor: Option<Vec2>,
    ) -> Option<EntityId> {
        if !self.running || self.paused {
            return None;
        }
        if utils::planar_distance(click, cursor?) > 0.0 {
            return None;
        }
        let id = hit?;
        let bacterium = world.get_mut(id).filter(|e| e.is_active())?.bacterium_mut()?;
        if !bacterium.attack() {
            return None;
        }

        self.growth_rate += self.settings.growth_ramp;
        self.miss_timer = 0.0;
        self.scores.player += 1;
        log::debug!("hit {id}, growth rate now {}", self.growth_rate);
        Some(id)
    }

    /// Check the thresholds; a decided game stops.
    pub fn determine_outcome(&mut self) -> Option<Outcome> {
        if self.outcome.is_some() {
            return self.outcome;
        }
        let target = self.settings.win_condition;
        let outcome = if self.scores.adversary >= target {
            Outcome::Lose
        } else if self.scores.player >= target {
            Outcome::Win
        } else {
            return None;
        };
        self.outcome = Some(outcome);
        self.stop();
        log::info!(
            "game over: {} (player {}, bacteria {})",
            outcome.text(),
            self.scores.player,
            self.scores.adversary
        );
        Some(outcome)
    }
}
