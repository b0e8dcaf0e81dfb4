//! Drawable entities.
//!
//! One `Entity` struct carries what every kind shares (identity, position,
//! colour, surface, cached model matrix); `EntityKind` tags the variant and
//! carries kind-specific state. Behaviour that differs per kind is a match
//! on the tag.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat4, Vec3, Vec4};

use super::world::EntityId;
use crate::geometry::{AngleSpans, Denominators, Mesh, Segments, Surface, SurfaceParams};
use crate::math::transform;
use crate::math::utils::{self, TWO_PI};

pub const OPAQUE_WHITE: Vec4 = Vec4::ONE;

/// Gameplay state of a bacterial colony.
///
/// `size` is the angular radius of the colony cap on the host sphere.
#[derive(Clone, Debug, PartialEq)]
pub struct Bacterium {
    /// Outward direction from the host centre to the spawn site (unit)
    pub normal: Vec3,
    /// Spawn site on the host surface. This is the colony's position on
    /// the dish; the entity itself is placed at the host centre and rotated
    /// so its cap is centred on `site`.
    pub site: Vec3,
    size: f32,
    /// Shrinking after a hit
    pub attacked: bool,
    /// Latched once `size` reaches `MAX_SIZE`, cleared by a hit
    pub reached_threshold: bool,
}

impl Bacterium {
    /// Largest cap, a quarter turn from the pole.
    pub const MAX_SIZE: f32 = FRAC_PI_2;
    /// Size at which an attacked colony stops shrinking.
    pub const ATTACKED_MIN: f32 = -0.5;
    /// How much a full-grown colony is stretched along its local x axis.
    pub const ELONGATION: f32 = 0.1;

    pub fn new(normal: Vec3, site: Vec3) -> Self {
        Self {
            normal,
            site,
            size: 0.0,
            attacked: false,
            reached_threshold: false,
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Store a size, clamped to [ATTACKED_MIN, MAX_SIZE].
    pub fn set_size(&mut self, size: f32) {
        self.size = utils::clamp(size, Self::ATTACKED_MIN, Self::MAX_SIZE);
    }

    /// Cap arc actually rendered.
    pub fn arc(&self) -> f32 {
        utils::clamp(self.size, 0.0, Self::MAX_SIZE)
    }

    /// Denominator `b` for the current arc; shrinks toward `1 - ELONGATION`.
    pub fn denominator_b(&self) -> f32 {
        1.0 - Self::ELONGATION * self.arc() / Self::MAX_SIZE
    }

    /// Advance one tick. Returns true when the threshold latches.
    pub fn step(&mut self, growth_rate: f32) -> bool {
        if self.attacked {
            self.set_size(self.size - growth_rate / 1000.0);
            if self.size <= Self::ATTACKED_MIN {
                self.attacked = false;
            }
        } else {
            self.set_size(self.size + growth_rate / 10000.0);
        }

        if !self.reached_threshold && self.size >= Self::MAX_SIZE {
            self.reached_threshold = true;
            return true;
        }
        false
    }

    /// Register a hit. Returns false while already shrinking.
    pub fn attack(&mut self) -> bool {
        if self.attacked {
            return false;
        }
        self.attacked = true;
        self.reached_threshold = false;
        true
    }
}

/// Variant tag.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    Ellipsoid,
    /// Always drawn with the wireframe overlay
    Sphere,
    Hemisphere,
    Bacterium(Bacterium),
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Ellipsoid => "Ellipsoid",
            EntityKind::Sphere => "Sphere",
            EntityKind::Hemisphere => "Hemisphere",
            EntityKind::Bacterium(_) => "Bacterium",
        }
    }
}

/// Everything needed to create an entity; the world assigns the identity.
#[derive(Clone, Debug)]
pub struct EntityDesc {
    pub kind: EntityKind,
    pub position: Vec3,
    pub color: Vec4,
    pub surface: SurfaceParams,
}

impl EntityDesc {
    pub fn ellipsoid(position: Vec3, radius: f32, denominators: Denominators, color: Option<Vec4>) -> Self {
        Self {
            kind: EntityKind::Ellipsoid,
            position,
            color: color.unwrap_or(OPAQUE_WHITE),
            surface: SurfaceParams {
                radius,
                denominators,
                ..SurfaceParams::default()
            },
        }
    }

    /// Full sphere; colour alpha is forced opaque.
    pub fn sphere(position: Vec3, radius: f32, color: Option<Vec3>) -> Self {
        Self {
            kind: EntityKind::Sphere,
            position,
            color: color.unwrap_or(Vec3::ONE).extend(1.0),
            surface: SurfaceParams {
                radius,
                ..SurfaceParams::default()
            },
        }
    }

    /// Half turn of azimuth over the full polar range, 30×30 segments.
    pub fn hemisphere(position: Vec3, radius: f32, color: Option<Vec4>) -> Self {
        Self {
            kind: EntityKind::Hemisphere,
            position,
            color: color.unwrap_or(OPAQUE_WHITE),
            surface: SurfaceParams {
                radius,
                angle_spans: AngleSpans { horizontal: PI, vertical: PI },
                segments: Segments { horizontal: 30, vertical: 30 },
                ..SurfaceParams::default()
            },
        }
    }

    /// Colony cap centred on `host_center`, grown toward `normal`.
    pub fn bacterium(host_center: Vec3, normal: Vec3, site: Vec3, radius: f32, color: Vec3) -> Self {
        Self {
            kind: EntityKind::Bacterium(Bacterium::new(normal, site)),
            position: host_center,
            color: color.extend(1.0),
            surface: SurfaceParams {
                radius,
                angle_spans: AngleSpans { horizontal: TWO_PI, vertical: 0.0 },
                segments: Segments { horizontal: 30, vertical: 30 },
                ..SurfaceParams::default()
            },
        }
    }
}

/// A registered, drawable entity.
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    position: Vec3,
    color: Vec4,
    scale: Vec3,
    active: bool,
    surface: Surface,
    model: Option<Mat4>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, desc: EntityDesc) -> Self {
        Self {
            id,
            kind: desc.kind,
            position: desc.position,
            color: desc.color,
            scale: Vec3::ONE,
            active: true,
            surface: Surface::new(desc.surface, desc.position),
            model: None,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Moves the entity; mesh and model matrix follow lazily.
    pub fn set_position(&mut self, position: Vec3) {
        if self.position != position {
            self.position = position;
            self.surface.set_origin(position);
            self.model = None;
        }
    }

    pub fn color(&self) -> Vec4 {
        self.color
    }

    pub fn set_color(&mut self, color: Vec4) {
        self.color = color;
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        if self.scale != scale {
            self.scale = scale;
            self.model = None;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Logical removal: the entity keeps its identity but is not drawn.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn bacterium(&self) -> Option<&Bacterium> {
        match &self.kind {
            EntityKind::Bacterium(b) => Some(b),
            _ => None,
        }
    }

    pub fn bacterium_mut(&mut self) -> Option<&mut Bacterium> {
        match &mut self.kind {
            EntityKind::Bacterium(b) => Some(b),
            _ => None,
        }
    }

    /// Whether the wireframe overlay is drawn, given what the pass asked for.
    pub fn wireframe(&self, requested: bool) -> bool {
        matches!(self.kind, EntityKind::Sphere) || requested
    }

    /// Whether the entity takes part in either render pass.
    pub fn is_drawable(&self) -> bool {
        if !self.active {
            return false;
        }
        match &self.kind {
            EntityKind::Bacterium(b) => b.arc() > 0.0,
            _ => true,
        }
    }

    /// Push kind-specific state into the surface before drawing.
    ///
    /// Bacteria render their clamped size as the cap arc and elongate as
    /// they grow. Unchanged values leave the mesh untouched.
    pub fn prepare(&mut self) {
        if let EntityKind::Bacterium(b) = &self.kind {
            let arc = b.arc();
            let denominator_b = b.denominator_b();
            self.surface.set_angle_spans(TWO_PI, arc);
            if let Err(err) = self.surface.set_denominators(1.0, denominator_b, 1.0) {
                log::warn!("entity {}: {}", self.id, err);
            }
        }
    }

    /// Current mesh, regenerated if the surface changed.
    pub fn mesh(&mut self) -> &Mesh {
        self.surface.mesh()
    }

    pub fn mesh_with_revision(&mut self) -> (&Mesh, u64) {
        self.surface.mesh_with_revision()
    }

    /// Model matrix, computed on first use after a change.
    pub fn model_matrix(&mut self) -> Mat4 {
        if let Some(model) = self.model {
            return model;
        }
        let model = match &self.kind {
            EntityKind::Bacterium(b) => transform::model_matrix(self.position, Some(b.normal), Vec3::ONE),
            _ => transform::model_matrix(self.position, None, self.scale),
        };
        self.model = Some(model);
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::world::World;

    #[test]
    fn test_bacterium_grows_and_latches_once() {
        let mut b = Bacterium::new(Vec3::Y, Vec3::Y);
        let mut latched = 0;
        for _ in 0..5000 {
            if b.step(10.0) {
                latched += 1;
            }
        }
        assert_eq!(latched, 1);
        assert!(b.reached_threshold);
        assert_eq!(b.size(), Bacterium::MAX_SIZE);
    }

    #[test]
    fn test_attacked_bacterium_shrinks_to_minimum_then_regrows() {
        let mut b = Bacterium::new(Vec3::Y, Vec3::Y);
        b.set_size(1.0);
        b.reached_threshold = true;
        assert!(b.attack());
        assert!(!b.attack());
        assert!(!b.reached_threshold);

        let mut ticks = 0;
        while b.attacked {
            b.step(10.0);
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert_eq!(b.size(), Bacterium::ATTACKED_MIN);
        assert_eq!(b.arc(), 0.0);

        b.step(10.0);
        assert!(b.size() > Bacterium::ATTACKED_MIN);
    }

    #[test]
    fn test_stored_size_is_clamped() {
        let mut b = Bacterium::new(Vec3::Y, Vec3::Y);
        b.set_size(100.0);
        assert_eq!(b.size(), Bacterium::MAX_SIZE);
        b.set_size(-100.0);
        assert_eq!(b.size(), Bacterium::ATTACKED_MIN);
    }

    #[test]
    fn test_bacterium_without_arc_is_not_drawable() {
        let mut world = World::new();
        let id = world.spawn(EntityDesc::bacterium(Vec3::ZERO, Vec3::X, Vec3::X, 1.004, Vec3::X));
        let e = world.get_mut(id).unwrap();
        assert!(!e.is_drawable());

        e.bacterium_mut().unwrap().set_size(0.5);
        assert!(e.is_drawable());
        e.prepare();
        assert_eq!(e.surface().params().angle_spans.vertical, 0.5);
        assert!(e.surface().params().denominators.b < 1.0);
        assert!(!e.mesh().is_empty());
    }

    #[test]
    fn test_prepare_is_stable_when_size_unchanged() {
        let mut world = World::new();
        let id = world.spawn(EntityDesc::bacterium(Vec3::ZERO, Vec3::X, Vec3::X, 1.004, Vec3::X));
        let e = world.get_mut(id).unwrap();
        e.bacterium_mut().unwrap().set_size(0.3);
        e.prepare();
        e.mesh();
        let revision = e.surface().revision();
        e.prepare();
        e.mesh();
        assert_eq!(e.surface().revision(), revision);
    }

    #[test]
    fn test_bacterium_cap_points_along_normal() {
        let mut world = World::new();
        let normal = Vec3::new(1.0, 1.0, 0.0).normalize();
        let id = world.spawn(EntityDesc::bacterium(Vec3::ZERO, normal, normal, 1.0, Vec3::X));
        let e = world.get_mut(id).unwrap();
        e.bacterium_mut().unwrap().set_size(0.2);
        e.prepare();
        let model = e.model_matrix();
        let pole = e.mesh().position(0);
        assert!((model.transform_point3(pole) - normal).length() < 1e-5);
    }

    #[test]
    fn test_sphere_forces_wireframe() {
        let mut world = World::new();
        let sphere = world.spawn(EntityDesc::sphere(Vec3::ZERO, 1.0, None));
        let hemi = world.spawn(EntityDesc::hemisphere(Vec3::ZERO, 1.0, None));
        assert!(world.get(sphere).unwrap().wireframe(false));
        assert!(!world.get(hemi).unwrap().wireframe(false));
        assert!(world.get(hemi).unwrap().wireframe(true));
    }

    #[test]
    fn test_model_matrix_is_cached_until_moved() {
        let mut world = World::new();
        let id = world.spawn(EntityDesc::ellipsoid(Vec3::ZERO, 1.0, Denominators::UNIT, None));
        let e = world.get_mut(id).unwrap();
        e.set_scale(Vec3::splat(2.0));
        let m = e.model_matrix();
        assert_eq!(m.transform_point3(Vec3::X), Vec3::X * 2.0);

        e.set_position(Vec3::Y);
        let m = e.model_matrix();
        assert!((m.transform_point3(Vec3::Y) - Vec3::Y).length() < 1e-6);
        assert!(e.surface().is_dirty());
    }

    #[test]
    fn test_sphere_colour_is_opaque() {
        let desc = EntityDesc::sphere(Vec3::ZERO, 1.0, Some(Vec3::new(0.2, 0.4, 0.6)));
        assert_eq!(desc.color.w, 1.0);
        let desc = EntityDesc::ellipsoid(Vec3::ZERO, 1.0, Denominators::UNIT, None);
        assert_eq!(desc.color, OPAQUE_WHITE);
    }
}
