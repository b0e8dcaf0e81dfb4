//! Seeding bacteria on the host sphere.
//!
//! Each colony picks two angles in [0, 2π), maps them through the host's
//! own surface formula to a spawn site, and grows a cap from the host
//! centre toward that site.

use glam::Vec3;
use rand::Rng;

use super::entity::EntityDesc;
use super::world::{EntityId, World};
use crate::geometry::surface_point;
use crate::lighting::SpeciesPalette;
use crate::math::utils::TWO_PI;

/// Radius of colony `index` relative to its host, staggered so
/// overlapping caps never share a depth.
pub fn colony_radius(host_radius: f32, index: usize) -> f32 {
    host_radius * (1.004 + 0.001 * index as f32)
}

/// Random placement angles (phi, theta).
pub fn random_angles<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    (TWO_PI * rng.gen::<f32>(), TWO_PI * rng.gen::<f32>())
}

/// Seed one bacterium per (phi, theta) pair on `host`.
///
/// Returns the new identities, or an empty list if `host` is unknown.
pub fn seed_bacteria_at(world: &mut World, host: EntityId, angles: &[(f32, f32)]) -> Vec<EntityId> {
    let Some(host_entity) = world.get(host) else {
        log::warn!("cannot seed bacteria: host {} does not exist", host);
        return Vec::new();
    };
    let params = *host_entity.surface().params();
    let center = host_entity.position();
    let palette = SpeciesPalette::default();
    let count = angles.len();

    let ids: Vec<EntityId> = angles
        .iter()
        .enumerate()
        .map(|(i, &(phi, theta))| {
            let offset = surface_point(&params, phi, theta);
            let normal = offset.try_normalize().unwrap_or(Vec3::Y);
            let desc = EntityDesc::bacterium(
                center,
                normal,
                center + offset,
                colony_radius(params.radius, i),
                palette.sample(i, count),
            );
            world.spawn(desc)
        })
        .collect();

    log::info!("seeded {} bacteria on {}", ids.len(), host);
    ids
}

/// Seed `count` bacteria at random sites on `host`.
pub fn seed_bacteria<R: Rng + ?Sized>(world: &mut World, host: EntityId, count: usize, rng: &mut R) -> Vec<EntityId> {
    let angles: Vec<(f32, f32)> = (0..count).map(|_| random_angles(rng)).collect();
    seed_bacteria_at(world, host, &angles)
}
