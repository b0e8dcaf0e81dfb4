use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

pub mod config;
pub mod error;
pub mod game;
pub mod geometry;
pub mod lighting;
pub mod math;
pub mod render;
pub mod scene;

use config::{GameConfig, ProjectionConfig};
use error::Error;
use game::{Camera, GameState, InputState};
use math::transform;
use render::{FrameView, Renderer, WebGlBackend};
use scene::World;

/// Initialize the WASM module (runs once on load).
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
}

fn find_canvas(id: &str) -> error::Result<HtmlCanvasElement> {
    web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(id))
        .and_then(|element| element.dyn_into::<HtmlCanvasElement>().ok())
        .ok_or_else(|| Error::CanvasNotFound(id.to_owned()))
}

/// One game: the dish, its colonies, the renderer and the player's input.
///
/// The page owns the DOM: it forwards pointer, wheel and key events with
/// canvas-relative CSS coordinates and calls `frame` from
/// `requestAnimationFrame` until it returns `false`.
#[wasm_bindgen]
pub struct PetriDish {
    renderer: Renderer<WebGlBackend>,
    world: World,
    state: GameState,
    camera: Camera,
    input: InputState,
    projection: ProjectionConfig,
    last_frame_ms: Option<f64>,
}

#[wasm_bindgen]
impl PetriDish {
    /// `config` is a plain object (see `GameConfig`), or `undefined`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, config: JsValue) -> Result<PetriDish, JsValue> {
        let config = GameConfig::from_js(config)?;
        let canvas = find_canvas(canvas_id)?;
        let renderer = Renderer::new(WebGlBackend::from_canvas(canvas)?, &config);

        let mut rng = SmallRng::seed_from_u64(js_sys::Math::random().to_bits());
        let world = game::setup_world(&config, &mut rng);
        log::info!("petri dish ready with {} colonies", config.game.species_count);

        Ok(PetriDish {
            renderer,
            world,
            state: GameState::new(config.game.clone()),
            camera: Camera::new(config.zoom),
            input: InputState::default(),
            projection: config.projection,
            last_frame_ms: None,
        })
    }

    /// Advance and draw one frame. Returns whether the game is still running.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if !self.state.is_running() {
            return false;
        }
        let dt = self.last_frame_ms.map_or(0.0, |last| (now_ms - last).max(0.0));
        self.last_frame_ms = Some(now_ms);

        if !self.state.is_paused() {
            self.state.tick(&mut self.world, dt);
            let view = self.frame_view();
            let hit = self.renderer.render(&mut self.world, &view, self.input.cursor());
            self.input.set_hit(hit);
            self.state.determine_outcome();
        }
        self.state.is_running()
    }

    #[wasm_bindgen(js_name = mouseMove)]
    pub fn mouse_move(&mut self, x: f32, y: f32) {
        let size = self.renderer.canvas_size();
        self.input.mouse_move(&mut self.camera, Vec2::new(x, y), size);
    }

    #[wasm_bindgen(js_name = mouseDown)]
    pub fn mouse_down(&mut self, x: f32, y: f32) -> bool {
        let size = self.renderer.canvas_size();
        self.input.mouse_down(Vec2::new(x, y), size)
    }

    #[wasm_bindgen(js_name = mouseUp)]
    pub fn mouse_up(&mut self) {
        self.input.mouse_up();
    }

    /// Returns whether the click hit a colony.
    pub fn click(&mut self, x: f32, y: f32) -> bool {
        let hit = self.state.resolve_click(
            &mut self.world,
            self.input.hit(),
            Vec2::new(x, y),
            self.input.cursor(),
        );
        hit.is_some()
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.input.wheel(&mut self.camera, delta_y);
    }

    /// `code` is a `KeyboardEvent.code`. Returns whether it was handled.
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, code: &str) -> bool {
        self.input.key_down(&mut self.camera, code)
    }

    #[wasm_bindgen(js_name = setWireframe)]
    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.renderer.set_wireframe(wireframe);
    }

    #[wasm_bindgen(js_name = playerPoints)]
    pub fn player_points(&self) -> u32 {
        self.state.scores().player
    }

    #[wasm_bindgen(js_name = adversaryPoints)]
    pub fn adversary_points(&self) -> u32 {
        self.state.scores().adversary
    }

    #[wasm_bindgen(js_name = outcomeText)]
    pub fn outcome_text(&self) -> Option<String> {
        self.state.outcome().map(|o| o.text().to_owned())
    }

    #[wasm_bindgen(js_name = outcomeColor)]
    pub fn outcome_color(&self) -> Option<String> {
        self.state.outcome().map(|o| o.color().to_owned())
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }
}

impl PetriDish {
    fn frame_view(&self) -> FrameView {
        let size = self.renderer.canvas_size();
        let projection = transform::perspective(
            self.projection.fov_y_degrees.to_radians(),
            size.backing.x,
            size.backing.y,
            self.projection.near,
            self.projection.far,
        );
        FrameView::new(self.camera.view_matrix(), projection)
    }
}
