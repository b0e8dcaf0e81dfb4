//! Two-pass renderer.
//!
//! Every frame draws the world twice in registration order:
//!
//! 1. `RenderPass::Identity` into an off-screen target cleared to zero,
//!    each entity filled with its identity encoded as a colour. The pixel
//!    under the cursor is read back and resolved to an `EntityId`.
//! 2. `RenderPass::Shaded` onto the canvas with ambient + directional
//!    lighting and the optional wireframe overlay.
//!
//! GPU buffers are created lazily per (entity, attribute) and replaced in
//! full whenever the entity's mesh revision moves on.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use glam::{Mat4, Vec2};

use super::backend::{CanvasSize, GraphicsBackend, Primitive};
use super::picking;
use super::programs::ProgramCache;
use super::shaders::{self, RenderPass};
use super::shaders::{A_NORMAL, A_POSITION, U_AMBIENT, U_COLOR, U_LIGHT_COLOR, U_LIGHT_DIRECTION};
use super::shaders::{U_MVP, U_NORMAL_MATRIX, U_OBJECT_ID};
use crate::config::GameConfig;
use crate::error::{Error, Result};
use crate::lighting::DirectionalLight;
use crate::math::transform;
use crate::scene::{Entity, EntityId, World};

const INDEX_BUFFER: &str = "index";
const WIRE_BUFFER: &str = "index_Lines";

/// Polygon offset applied while the wireframe overlay is drawn.
const WIRE_OFFSET: f32 = 0.2;

/// Camera matrices for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameView {
    pub view: Mat4,
    pub projection: Mat4,
}

impl FrameView {
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self { view, projection }
    }

    fn model_view_projection(&self, model: &Mat4) -> Mat4 {
        self.projection * self.view * *model
    }
}

struct CachedBuffer<T> {
    buffer: T,
    revision: u64,
}

/// Buffers keyed by entity and attribute name.
pub struct BufferCache<B: GraphicsBackend> {
    entries: HashMap<(EntityId, &'static str), CachedBuffer<B::Buffer>>,
}

impl<B: GraphicsBackend> Default for BufferCache<B> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<B: GraphicsBackend> BufferCache<B> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn vertices(&mut self, backend: &B, id: EntityId, name: &'static str, revision: u64, data: &[f32]) -> Result<&B::Buffer> {
        self.ensure(backend, (id, name), revision, |buffer| backend.upload_vertices(buffer, data))
    }

    fn indices(&mut self, backend: &B, id: EntityId, name: &'static str, revision: u64, data: &[u32]) -> Result<&B::Buffer> {
        self.ensure(backend, (id, name), revision, |buffer| backend.upload_indices(buffer, data))
    }

    fn ensure(
        &mut self,
        backend: &B,
        key: (EntityId, &'static str),
        revision: u64,
        upload: impl FnOnce(&B::Buffer),
    ) -> Result<&B::Buffer> {
        match self.entries.entry(key) {
            Entry::Occupied(occupied) => {
                let cached = occupied.into_mut();
                if cached.revision != revision {
                    upload(&cached.buffer);
                    cached.revision = revision;
                }
                Ok(&cached.buffer)
            }
            Entry::Vacant(vacant) => {
                let buffer = backend.create_buffer()?;
                upload(&buffer);
                Ok(&vacant.insert(CachedBuffer { buffer, revision }).buffer)
            }
        }
    }
}

struct PickingTarget<T> {
    handle: T,
    width: u32,
    height: u32,
}

pub struct Renderer<B: GraphicsBackend> {
    backend: B,
    programs: ProgramCache<B>,
    buffers: BufferCache<B>,
    picking: Option<PickingTarget<B::Target>>,
    picking_enabled: bool,
    clear_color: [f32; 4],
    light: DirectionalLight,
    wireframe: bool,
}

impl<B: GraphicsBackend> Renderer<B> {
    /// Apply the startup GL state and wrap `backend`.
    pub fn new(backend: B, config: &GameConfig) -> Self {
        backend.configure(&config.features, config.clear_color);
        Self {
            backend,
            programs: ProgramCache::new(),
            buffers: BufferCache::default(),
            picking: None,
            picking_enabled: config.picking,
            clear_color: config.clear_color,
            light: DirectionalLight::from(&config.lighting),
            wireframe: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn canvas_size(&self) -> CanvasSize {
        self.backend.canvas_size()
    }

    /// Wireframe overlay for every kind, not just spheres.
    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.wireframe = wireframe;
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Draw both passes and return the entity under `cursor`, if any.
    ///
    /// A failing picking pass is logged and treated as a miss; the shaded
    /// pass is still drawn.
    pub fn render(&mut self, world: &mut World, frame: &FrameView, cursor: Option<Vec2>) -> Option<EntityId> {
        let size = self.backend.canvas_size();
        if size.is_empty() {
            return None;
        }
        for entity in world.iter_mut() {
            entity.prepare();
        }

        let hit = if self.picking_enabled {
            match self.pick(world, frame, size, cursor) {
                Ok(hit) => hit,
                Err(err) => {
                    log::warn!("picking pass skipped: {err}");
                    None
                }
            }
        } else {
            None
        };

        self.backend.bind_target(None, size.backing.x, size.backing.y);
        self.backend.clear(self.clear_color, true);
        self.draw_all(world, frame, RenderPass::Shaded);
        hit
    }

    fn pick(&mut self, world: &mut World, frame: &FrameView, size: CanvasSize, cursor: Option<Vec2>) -> Result<Option<EntityId>> {
        let (width, height) = (size.backing.x, size.backing.y);
        self.ensure_target(width, height)?;
        if let Some(target) = &self.picking {
            self.backend.bind_target(Some(&target.handle), width, height);
        }
        self.backend.clear([0.0; 4], true);
        self.draw_all(world, frame, RenderPass::Identity);

        let Some(pixel) = cursor.and_then(|c| picking::cursor_to_pixel(c, size)) else {
            return Ok(None);
        };
        let raw = picking::decode_pixel(self.backend.read_pixel(pixel.x, pixel.y)?);
        let hit = world.resolve(raw);
        if let Some(id) = hit {
            log::debug!("cursor over {id}");
        }
        Ok(hit)
    }

    fn ensure_target(&mut self, width: u32, height: u32) -> Result<()> {
        match &mut self.picking {
            Some(target) => {
                if target.width != width || target.height != height {
                    self.backend.resize_target(&target.handle, width, height)?;
                    target.width = width;
                    target.height = height;
                    log::debug!("picking target resized to {width}x{height}");
                }
            }
            None => {
                let handle = self.backend.create_target(width, height)?;
                self.picking = Some(PickingTarget { handle, width, height });
            }
        }
        Ok(())
    }

    fn draw_all(&mut self, world: &mut World, frame: &FrameView, pass: RenderPass) {
        for entity in world.iter_mut() {
            if !entity.is_drawable() {
                continue;
            }
            match self.draw_entity(entity, frame, pass) {
                Ok(()) => {}
                Err(Error::ProgramUnusable(alias)) => {
                    log::debug!("{} {} not drawn: program {alias} unusable", entity.kind().name(), entity.id())
                }
                Err(err) => log::warn!("{} {} not drawn: {err}", entity.kind().name(), entity.id()),
            }
        }
    }

    fn draw_entity(&mut self, entity: &mut Entity, frame: &FrameView, pass: RenderPass) -> Result<()> {
        let Self {
            backend,
            programs,
            buffers,
            light,
            wireframe,
            ..
        } = self;
        let backend = &*backend;

        let id = entity.id();
        let alias = shaders::program_alias(entity.kind(), pass);
        let set = shaders::shader_set(entity.kind(), pass);
        let color = entity.color().truncate();
        let wire = pass == RenderPass::Shaded && entity.wireframe(*wireframe);
        let model = entity.model_matrix();
        let (mesh, revision) = entity.mesh_with_revision();
        if mesh.indices.is_empty() {
            return Ok(());
        }

        let program = programs.bind(backend, &alias, set)?;

        if let Some(location) = program.uniform(U_MVP) {
            backend.set_mat4(location, &frame.model_view_projection(&model));
        }
        match pass {
            RenderPass::Identity => {
                if let Some(location) = program.uniform(U_OBJECT_ID) {
                    backend.set_vec4(location, picking::id_to_color(id.get()));
                }
            }
            RenderPass::Shaded => {
                if let Some(location) = program.uniform(U_NORMAL_MATRIX) {
                    backend.set_mat4(location, &transform::normal_matrix(&model));
                }
                for (name, value) in [
                    (U_AMBIENT, light.ambient),
                    (U_LIGHT_COLOR, light.color),
                    (U_LIGHT_DIRECTION, light.direction),
                    (U_COLOR, color),
                ] {
                    if let Some(location) = program.uniform(name) {
                        backend.set_vec3(location, value);
                    }
                }
            }
        }

        if let Some(location) = program.attribute(A_POSITION) {
            let buffer = buffers.vertices(backend, id, A_POSITION, revision, &mesh.positions)?;
            backend.bind_attribute(buffer, location, 3);
        }
        if let Some(location) = program.attribute(A_NORMAL) {
            let buffer = buffers.vertices(backend, id, A_NORMAL, revision, &mesh.normals)?;
            backend.bind_attribute(buffer, location, 3);
        }

        let triangles = buffers.indices(backend, id, INDEX_BUFFER, revision, &mesh.indices)?;
        backend.bind_indices(triangles);
        backend.draw(Primitive::Triangles, mesh.indices.len());

        if wire && !mesh.wires.is_empty() {
            let lines = buffers.indices(backend, id, WIRE_BUFFER, revision, &mesh.wires)?;
            if let Some(location) = program.uniform(U_COLOR) {
                backend.set_vec3(location, color * 0.5);
            }
            backend.polygon_offset(WIRE_OFFSET, WIRE_OFFSET);
            backend.bind_indices(lines);
            backend.draw(Primitive::Lines, mesh.wires.len());
            backend.polygon_offset(0.0, 0.0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::mock::{Call, MockBackend};
    use crate::scene::EntityDesc;
    use glam::{Vec3, Vec4};

    fn renderer() -> Renderer<MockBackend> {
        Renderer::new(MockBackend::new(), &GameConfig::default())
    }

    fn frame() -> FrameView {
        FrameView::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }

    fn ellipsoids(n: usize) -> World {
        let mut world = World::new();
        for i in 0..n {
            world.spawn(EntityDesc::ellipsoid(Vec3::X * i as f32, 1.0, Default::default(), None));
        }
        world
    }

    fn object_ids(backend: &MockBackend) -> Vec<Vec4> {
        backend
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SetVec4(name, value) if name == U_OBJECT_ID => Some(value),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_pixel_under_cursor_resolves_to_entity() {
        let mut r = renderer();
        let mut world = ellipsoids(3);
        r.backend().set_pixel(picking::encode_id(2));

        let hit = r.render(&mut world, &frame(), Some(Vec2::new(10.0, 10.0)));
        assert_eq!(hit.map(EntityId::get), Some(2));
        assert_eq!(r.backend().count(|c| *c == Call::ReadPixel(10, 89)), 1);
    }

    #[test]
    fn test_background_and_unknown_ids_miss() {
        let mut r = renderer();
        let mut world = ellipsoids(2);
        assert_eq!(r.render(&mut world, &frame(), Some(Vec2::new(5.0, 5.0))), None);
        r.backend().set_pixel(picking::encode_id(99));
        assert_eq!(r.render(&mut world, &frame(), Some(Vec2::new(5.0, 5.0))), None);
    }

    #[test]
    fn test_no_read_back_without_cursor() {
        let mut r = renderer();
        let mut world = ellipsoids(1);
        r.backend().set_pixel(picking::encode_id(1));
        assert_eq!(r.render(&mut world, &frame(), None), None);
        assert_eq!(r.render(&mut world, &frame(), Some(Vec2::new(500.0, 5.0))), None);
        assert_eq!(r.backend().count(|c| matches!(c, Call::ReadPixel(..))), 0);
    }

    #[test]
    fn test_pass_order_and_clears() {
        let mut r = renderer();
        let mut world = ellipsoids(1);
        r.render(&mut world, &frame(), None);
        let targets: Vec<Call> = r
            .backend()
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::BindTarget { .. } | Call::Clear(_)))
            .collect();
        assert_eq!(
            targets,
            vec![
                Call::BindTarget { offscreen: true, width: 200, height: 100 },
                Call::Clear([0.0; 4]),
                Call::BindTarget { offscreen: false, width: 200, height: 100 },
                Call::Clear([0.0, 0.0, 0.0, 1.0]),
            ]
        );
    }

    #[test]
    fn test_programs_compiled_once_and_switched_per_pass() {
        let mut r = renderer();
        let mut world = ellipsoids(3);
        r.render(&mut world, &frame(), None);
        r.render(&mut world, &frame(), None);
        r.render(&mut world, &frame(), None);
        assert_eq!(r.backend().count(|c| matches!(c, Call::Compile(_))), 2);
        assert_eq!(r.backend().count(|c| matches!(c, Call::UseProgram(_))), 6);
    }

    #[test]
    fn test_identity_colours_follow_registration_order() {
        let mut r = renderer();
        let mut world = ellipsoids(3);
        r.render(&mut world, &frame(), None);
        let expected: Vec<Vec4> = (1..=3).map(picking::id_to_color).collect();
        assert_eq!(object_ids(r.backend()), expected);
    }

    #[test]
    fn test_inactive_and_empty_bacteria_are_skipped() {
        let mut r = renderer();
        let mut world = World::new();
        world.spawn(EntityDesc::sphere(Vec3::ZERO, 1.0, None));
        let bug = world.spawn(EntityDesc::bacterium(Vec3::ZERO, Vec3::Y, Vec3::Y, 1.004, Vec3::X));
        let gone = world.spawn(EntityDesc::ellipsoid(Vec3::ZERO, 1.0, Default::default(), None));
        world.deactivate(gone);

        r.render(&mut world, &frame(), None);
        assert_eq!(object_ids(r.backend()), vec![picking::id_to_color(1)]);

        if let Some(b) = world.get_mut(bug).and_then(Entity::bacterium_mut) {
            b.set_size(0.3);
        }
        r.backend().clear_calls();
        r.render(&mut world, &frame(), None);
        assert_eq!(object_ids(r.backend()), vec![picking::id_to_color(1), picking::id_to_color(2)]);
    }

    #[test]
    fn test_sphere_wireframe_overlay() {
        let mut r = renderer();
        let mut world = World::new();
        let color = Vec3::new(0.4, 0.6, 0.8);
        world.spawn(EntityDesc::sphere(Vec3::ZERO, 1.0, Some(color)));
        r.render(&mut world, &frame(), None);

        let calls = r.backend().calls();
        let lines = calls
            .iter()
            .position(|c| matches!(c, Call::Draw(Primitive::Lines, _)))
            .unwrap();
        assert_eq!(calls.iter().filter(|c| matches!(c, Call::Draw(Primitive::Lines, _))).count(), 1);
        assert!(calls[..lines].contains(&Call::PolygonOffset(0.2, 0.2)));
        assert_eq!(calls[lines + 1], Call::PolygonOffset(0.0, 0.0));
        assert!(calls[..lines].contains(&Call::SetVec3(U_COLOR.to_owned(), color * 0.5)));
    }

    #[test]
    fn test_wireframe_requested_for_every_kind() {
        let mut r = renderer();
        let mut world = World::new();
        world.spawn(EntityDesc::hemisphere(Vec3::ZERO, 1.0, None));
        let lines = |b: &MockBackend| b.count(|c| matches!(c, Call::Draw(Primitive::Lines, _)));

        r.render(&mut world, &frame(), None);
        assert_eq!(lines(r.backend()), 0);
        r.set_wireframe(true);
        r.render(&mut world, &frame(), None);
        assert_eq!(lines(r.backend()), 1);
    }

    #[test]
    fn test_buffers_reuploaded_only_after_mesh_change() {
        let mut r = renderer();
        let mut world = World::new();
        world.spawn(EntityDesc::sphere(Vec3::ZERO, 1.0, None));
        let bug = world.spawn(EntityDesc::bacterium(Vec3::ZERO, Vec3::Y, Vec3::Y, 1.004, Vec3::X));
        if let Some(b) = world.get_mut(bug).and_then(Entity::bacterium_mut) {
            b.set_size(0.3);
        }
        let uploads = |b: &MockBackend| b.count(|c| matches!(c, Call::UploadVertices { .. } | Call::UploadIndices { .. }));
        let creates = |b: &MockBackend| b.count(|c| matches!(c, Call::CreateBuffer(_)));

        r.render(&mut world, &frame(), None);
        // sphere: positions, normals, index, index_Lines; bacterium: no wires
        assert_eq!(creates(r.backend()), 7);
        assert_eq!(uploads(r.backend()), 7);
        assert_eq!(r.buffer_count(), 7);

        r.backend().clear_calls();
        r.render(&mut world, &frame(), None);
        assert_eq!(uploads(r.backend()), 0);

        if let Some(b) = world.get_mut(bug).and_then(Entity::bacterium_mut) {
            b.set_size(0.4);
        }
        r.backend().clear_calls();
        r.render(&mut world, &frame(), None);
        assert_eq!(uploads(r.backend()), 3);
        assert_eq!(creates(r.backend()), 0);
    }

    #[test]
    fn test_target_follows_canvas_size() {
        let mut r = renderer();
        let mut world = ellipsoids(1);
        r.render(&mut world, &frame(), None);
        r.render(&mut world, &frame(), None);
        r.backend().set_size(CanvasSize::new(320, 240, 160.0, 120.0));
        r.render(&mut world, &frame(), None);

        assert_eq!(r.backend().count(|c| matches!(c, Call::CreateTarget(..))), 1);
        assert_eq!(r.backend().count(|c| matches!(c, Call::ResizeTarget(..))), 1);
        assert_eq!(r.backend().count(|c| *c == Call::ResizeTarget(320, 240)), 1);
    }

    #[test]
    fn test_failed_picking_program_leaves_shaded_pass_intact() {
        let backend = MockBackend::new();
        backend.fail_alias("EllipsoidPicking");
        backend.set_pixel(picking::encode_id(1));
        let mut r = Renderer::new(backend, &GameConfig::default());
        let mut world = ellipsoids(2);

        assert_eq!(r.render(&mut world, &frame(), None), None);
        r.render(&mut world, &frame(), None);

        let b = r.backend();
        assert_eq!(b.count(|c| *c == Call::Compile("EllipsoidPicking".to_owned())), 1);
        assert_eq!(b.count(|c| matches!(c, Call::Draw(Primitive::Triangles, _))), 4);
        assert!(object_ids(b).is_empty());
    }

    #[test]
    fn test_picking_disabled() {
        let config = GameConfig {
            picking: false,
            ..GameConfig::default()
        };
        let mut r = Renderer::new(MockBackend::new(), &config);
        r.backend().set_pixel(picking::encode_id(1));
        let mut world = ellipsoids(1);

        assert_eq!(r.render(&mut world, &frame(), Some(Vec2::new(10.0, 10.0))), None);
        assert_eq!(r.backend().count(|c| matches!(c, Call::CreateTarget(..) | Call::ReadPixel(..))), 0);
        assert_eq!(r.backend().count(|c| matches!(c, Call::Draw(Primitive::Triangles, _))), 1);
    }

    #[test]
    fn test_empty_canvas_draws_nothing() {
        let mut r = renderer();
        r.backend().set_size(CanvasSize::default());
        let mut world = ellipsoids(1);
        r.backend().clear_calls();
        assert_eq!(r.render(&mut world, &frame(), Some(Vec2::ZERO)), None);
        assert!(r.backend().calls().is_empty());
    }
}
