//! Game loop collaborators: camera and pointer input, scoring rules, and
//! world setup.

pub mod input;
pub mod state;

pub use input::{Camera, InputState};
pub use state::{GameState, Outcome, Scores};

use glam::Vec3;
use rand::Rng;

use crate::config::GameConfig;
use crate::scene::placement;
use crate::scene::{EntityDesc, World};

/// The dish: a white host sphere at the origin with
/// `config.game.species_count` colonies seeded on it.
pub fn setup_world<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> World {
    let mut world = World::new();
    let host = world.spawn(EntityDesc::sphere(Vec3::ZERO, config.dish_radius, None));
    placement::seed_bacteria(&mut world, host, config.game.species_count, rng);
    world
}
