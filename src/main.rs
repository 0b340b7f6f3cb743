//! Broadside entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::{Vec2, Vec3};
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlElement, KeyboardEvent, MouseEvent};

    use broadside::consts::*;
    use broadside::frame::{RenderConfig, RenderFrame};
    use broadside::hud::{HudSnapshot, game_over_lines};
    use broadside::platform::{InputState, storage};
    use broadside::sim::{CameraRig, World, tick};
    use broadside::water::RippleWindow;
    use broadside::{BestScore, Settings, Tuning};

    /// Optional JSON balance overrides
    const TUNING_KEY: &str = "broadside_tuning";
    /// Cycles the graphics quality preset
    const QUALITY_KEY: &str = "o";

    thread_local! {
        /// The running game, for calls coming from the page
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    // Hand the frame to the page's renderer, if it registered one
    #[wasm_bindgen(inline_js = "
        export function broadside_render(json) {
            const render = window.broadsideRender;
            if (typeof render === 'function') {
                render(json);
            }
        }
    ")]
    extern "C" {
        fn broadside_render(json: &str);
    }

    // Presentation settings for the renderer (water look, ripple grid size)
    #[wasm_bindgen(inline_js = "
        export function broadside_configure(json) {
            const configure = window.broadsideConfigure;
            if (typeof configure === 'function') {
                configure(json);
            }
        }
    ")]
    extern "C" {
        fn broadside_configure(json: &str);
    }

    /// Game instance holding all state
    struct Game {
        world: World,
        camera: CameraRig,
        ripples: RippleWindow,
        settings: Settings,
        input: InputState,
        best: BestScore,
        accumulator: f32,
        last_time: f64,
        viewport: Vec2,
        /// Game over screen is up and the best score was submitted
        game_over_shown: bool,
    }

    impl Game {
        fn new(tuning: Tuning, seed: u64) -> Self {
            let settings = Settings::load();
            let mut world = World::with_fleet(tuning, seed);
            world.particles.configure(settings.max_particles());
            let mut camera = CameraRig::new(world.tuning.camera.clone(), seed);
            camera.shake_enabled = settings.effective_screen_shake();
            camera.reset(&world);
            Self {
                ripples: RippleWindow::default(),
                settings,
                world,
                camera,
                input: InputState::new(),
                best: BestScore::load(),
                accumulator: 0.0,
                last_time: 0.0,
                viewport: Vec2::new(1.0, 1.0),
                game_over_shown: false,
            }
        }

        fn resize(&mut self, w: f32, h: f32) {
            if w > 0.0 && h > 0.0 {
                self.viewport = Vec2::new(w, h);
                self.camera.aspect = w / h;
            }
        }

        /// Send the presentation settings to the renderer
        fn configure_renderer(&self) {
            match RenderConfig::from_settings(&self.settings).to_json() {
                Ok(json) => broadside_configure(&json),
                Err(e) => log::warn!("Render config serialization failed: {}", e),
            }
        }

        /// Step to the next quality preset and persist it
        fn cycle_quality(&mut self) {
            self.settings.quality = self.settings.quality.next();
            self.world.particles.configure(self.settings.max_particles());
            self.settings.save();
            self.configure_renderer();
            log::info!("Quality: {}", self.settings.quality.as_str());
        }

        /// The renderer finished (or gave up) loading the ship model
        fn hull_reported(&mut self, bounds: Option<(Vec3, Vec3)>) {
            self.world.reload_hull(bounds);
            self.camera.reset(&self.world);
            self.ripples = RippleWindow::default();
            self.game_over_shown = false;
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(MAX_FRAME_DT);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.frame_input();
                tick(&mut self.world, &mut self.camera, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.clear_one_shots();

                if input.restart {
                    self.ripples = RippleWindow::default();
                    self.game_over_shown = false;
                }
            }
        }

        /// Push this frame to the renderer
        fn render(&mut self) {
            let effects = self.world.drain_effects();
            if let Some(p) = self.world.player.as_ref().filter(|p| !p.dead) {
                self.ripples.follow(p.planar());
            }

            let frame = RenderFrame::capture(&self.world, &self.camera, &self.ripples, effects);
            match frame.to_json() {
                Ok(json) => broadside_render(&json),
                Err(e) => log::warn!("Frame serialization failed: {}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = HudSnapshot::capture(&self.world, &self.camera, self.viewport);

            set_text(&document, "hud-score", &hud.score_text());
            set_text(&document, "hud-enemies", &hud.enemies_text());
            set_text(&document, "hud-kills", &hud.kills_text());

            if let (Some(bar), Some(pct), Some(band)) =
                (html_element(&document, "hud-health-bar"), hud.health_pct, hud.health_band)
            {
                let style = bar.style();
                let _ = style.set_property("width", &format!("{}%", pct));
                let _ = style.set_property("background", band.color());
            }

            if let Some(marker) = html_element(&document, "lockon-indicator") {
                let style = marker.style();
                match hud.lockon {
                    Some(p) => {
                        let _ = style.set_property("display", "block");
                        let _ = style.set_property("left", &format!("{}px", p.x));
                        let _ = style.set_property("top", &format!("{}px", p.y));
                    }
                    None => {
                        let _ = style.set_property("display", "none");
                    }
                }
            }

            if hud.game_over && !self.game_over_shown {
                self.game_over_shown = true;
                self.best.submit(self.world.score);
                let [score, kills, best] = game_over_lines(self.world.score, self.world.kills, self.best.score);
                set_text(&document, "go-score", &score);
                set_text(&document, "go-kills", &kills);
                set_text(&document, "go-highscore", &best);
                set_display(&document, "game-over-screen", "flex");
                log::info!("Game over: score {}, kills {}", self.world.score, self.world.kills);
            } else if !hud.game_over {
                set_display(&document, "game-over-screen", "none");
            }
        }
    }

    fn html_element(document: &Document, id: &str) -> Option<HtmlElement> {
        document.get_element_by_id(id)?.dyn_into::<HtmlElement>().ok()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_display(document: &Document, id: &str, display: &str) {
        if let Some(el) = html_element(document, id) {
            let _ = el.style().set_property("display", display);
        }
    }

    fn load_tuning() -> Tuning {
        let Some(json) = storage::load(TUNING_KEY) else {
            return Tuning::default();
        };
        match Tuning::from_json(&json) {
            Ok(tuning) => {
                log::info!("Using tuning overrides from LocalStorage");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning overrides: {}", e);
                Tuning::default()
            }
        }
    }

    fn window_size() -> (f32, f32) {
        let Some(window) = web_sys::window() else {
            return (1.0, 1.0);
        };
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
        (w as f32, h as f32)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Broadside starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(load_tuning(), seed)));
        let (w, h) = window_size();
        game.borrow_mut().resize(w, h);
        game.borrow().configure_renderer();
        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&window, game.clone());
        setup_restart_buttons(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Broadside running!");
    }

    /// Forward the renderer's ship model report to the running game
    pub fn report_hull(bounds: Option<(Vec3, Vec3)>) {
        GAME.with(|slot| match slot.borrow().as_ref() {
            Some(game) => game.borrow_mut().hull_reported(bounds),
            None => log::warn!("Hull report before the game started"),
        });
    }

    fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                if key.eq_ignore_ascii_case(QUALITY_KEY) && !event.repeat() {
                    g.cycle_quality();
                    return;
                }
                g.input.key_down(&key);
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.key());
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - cursor for aiming, movement for free-fly look
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let viewport = g.viewport;
                let movement = Vec2::new(event.movement_x() as f32, event.movement_y() as f32);
                g.input.mouse_move(
                    event.client_x() as f32,
                    event.client_y() as f32,
                    viewport.x,
                    viewport.y,
                    movement,
                );
            });
            let _ = window.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse click - fire
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut().input.mouse_down(event.button());
            });
            let _ = window.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let (w, h) = window_size();
                game.borrow_mut().resize(w, h);
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        for id in ["restart-btn", "go-restart-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    game.borrow_mut().input.request_restart();
                });
                let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Called by the renderer once the ship model has loaded, with its bounding box
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = shipModelLoaded)]
pub fn ship_model_loaded(min_x: f32, min_y: f32, min_z: f32, max_x: f32, max_y: f32, max_z: f32) {
    let bounds = (
        glam::Vec3::new(min_x, min_y, min_z),
        glam::Vec3::new(max_x, max_y, max_z),
    );
    wasm_game::report_hull(Some(bounds));
}

/// Called by the renderer when the ship model could not be loaded
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = shipModelFailed)]
pub fn ship_model_failed() {
    wasm_game::report_hull(None);
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Broadside (native) starting...");
    log::info!("Native mode runs a headless autopilot battle; serve the wasm build for the game");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let preset = args.next().unwrap_or_else(|| "classic".to_string());
    let tuning = broadside::Tuning::preset(&preset).unwrap_or_else(|| {
        log::warn!("Unknown preset {:?}, using classic", preset);
        broadside::Tuning::classic()
    });
    let quality = args
        .next()
        .and_then(|q| broadside::QualityPreset::parse(&q))
        .unwrap_or(broadside::QualityPreset::Low);

    headless_battle(tuning, quality, seed, 180.0);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Fight an autopilot battle without a renderer and log how it went
#[cfg(not(target_arch = "wasm32"))]
fn headless_battle(tuning: broadside::Tuning, quality: broadside::QualityPreset, seed: u64, seconds: f32) {
    use broadside::consts::SIM_DT;
    use broadside::frame::RenderFrame;
    use broadside::sim::{CameraRig, FrameInput, World, tick};
    use broadside::BestScore;
    use broadside::water::Water;

    let mut world = World::with_fleet(tuning, seed);
    let mut camera = CameraRig::new(world.tuning.camera.clone(), seed);
    camera.reset(&world);
    let mut water = Water::new(quality.ripple_resolution());
    world.particles.configure(quality.max_particles());
    log::info!("Quality {}, {} ripple cells per side", quality.as_str(), quality.ripple_resolution());
    let input = FrameInput {
        autopilot: true,
        ..Default::default()
    };

    let steps = (seconds / SIM_DT) as u32;
    let mut frame_bytes = 0;
    for step in 1..=steps {
        tick(&mut world, &mut camera, &input, SIM_DT);
        let effects = world.drain_effects();
        water.apply(&effects);
        water.update(world.player.as_ref().map(|p| p.planar()));

        if step % 600 == 0 {
            let frame = RenderFrame::capture(&world, &camera, &water.window, effects);
            frame_bytes = frame.to_json().map(|j| j.len()).unwrap_or(0);
            log::info!(
                "t={:>5.1}s score={} kills={} enemies={} shells={} particles={} wave energy={:.4}",
                world.time,
                world.score,
                world.kills,
                world.enemies.len(),
                world.projectiles.len(),
                world.particles.len(),
                water.field.energy()
            );
        }
        if world.game_over || (world.enemies.is_empty() && world.sinking.is_empty()) {
            break;
        }
    }

    let mut best = BestScore::load();
    best.submit(world.score);
    log::info!(
        "Battle over after {:.1}s: score {}, {} ships destroyed, player {} (last frame {} bytes)",
        world.time,
        world.score,
        world.kills,
        if world.player_alive() { "afloat" } else { "sunk" },
        frame_bytes
    );
}
