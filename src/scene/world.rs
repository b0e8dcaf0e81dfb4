//! Entity arena.
//!
//! Entities live in a dense vector in creation order and are never
//! removed, so the n-th spawned entity has identity n for the life of the
//! world. "Removing" an entity clears its active flag.

use std::fmt;
use std::num::NonZeroU32;

use super::entity::{Bacterium, Entity, EntityDesc, EntityKind};

/// Stable 1-based identity. Zero is reserved for "no entity".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(NonZeroU32);

impl EntityId {
    /// `None` for the reserved value zero.
    pub fn from_raw(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(EntityId)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, Default)]
pub struct World {
    entities: Vec<Entity>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new entity at the end of the draw order.
    pub fn spawn(&mut self, desc: EntityDesc) -> EntityId {
        let raw = u32::try_from(self.entities.len() + 1).unwrap_or(u32::MAX);
        let id = EntityId::from_raw(raw).unwrap_or(EntityId(NonZeroU32::MAX));
        log::debug!("spawned {} {}", desc.kind.name(), id);
        self.entities.push(Entity::new(id, desc));
        id
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.index())
    }

    /// Look up by a raw identity as decoded from a picking pixel.
    pub fn resolve(&self, raw: u32) -> Option<EntityId> {
        EntityId::from_raw(raw).filter(|id| self.get(*id).is_some())
    }

    /// Clear the active flag. Returns false for unknown identities.
    pub fn deactivate(&mut self, id: EntityId) -> bool {
        match self.get_mut(id) {
            Some(entity) => {
                entity.set_active(false);
                true
            }
            None => false,
        }
    }

    /// All entities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// First entity whose kind satisfies `pred`, e.g. the host sphere.
    pub fn first_where(&self, pred: impl Fn(&EntityKind) -> bool) -> Option<EntityId> {
        self.entities.iter().find(|e| pred(e.kind())).map(Entity::id)
    }

    pub fn bacteria(&self) -> impl Iterator<Item = (EntityId, &Bacterium)> {
        self.entities.iter().filter_map(|e| match e.kind() {
            EntityKind::Bacterium(b) => Some((e.id(), b)),
            _ => None,
        })
    }

    /// Active bacteria, mutably.
    pub fn bacteria_mut(&mut self) -> impl Iterator<Item = &mut Bacterium> {
        self.entities
            .iter_mut()
            .filter(|e| e.is_active())
            .filter_map(Entity::bacterium_mut)
    }
}
