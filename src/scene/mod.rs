//! Scene object model: entities, the registry arena, and bacterium seeding.

pub mod entity;
pub mod placement;
pub mod world;

pub use entity::{Bacterium, Entity, EntityDesc, EntityKind};
pub use world::{EntityId, World};
