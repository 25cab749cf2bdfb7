//! Fakeout entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, TouchEvent};

    use fakeout::audio::{AudioManager, SoundEffect};
    use fakeout::consts::*;
    use fakeout::input::{InputState, canvas_touch_action};
    use fakeout::levels;
    use fakeout::renderer::{RenderState, scene_vertices};
    use fakeout::sim::{GameEvent, GamePhase, GameState, tick};
    use fakeout::taunt::{self, TauntBoard, TauntContext};
    use fakeout::{Progress, Settings};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<RenderState>,
        accumulator: f32,
        last_time: f64,
        input: InputState,
        settings: Settings,
        progress: Progress,
        audio: AudioManager,
        taunts: TauntBoard,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(state: GameState) -> Self {
            let settings = Settings::load();
            let audio = AudioManager::new(&settings);
            Self {
                state,
                render_state: None,
                accumulator: 0.0,
                last_time: 0.0,
                input: InputState::new(),
                settings,
                progress: Progress::load(),
                audio,
                taunts: TauntBoard::new(),
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run simulation ticks; returns taunt requests to dispatch
        fn update(&mut self, dt: f32, time: f64) -> Vec<(u64, TauntContext)> {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut requests = Vec::new();
            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.to_tick_input();
                for event in tick(&mut self.state, &input) {
                    if let Some(request) = self.handle_event(event) {
                        requests.push(request);
                    }
                }
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
            // Drop backlog beyond the substep cap
            if substeps == MAX_SUBSTEPS {
                self.accumulator = self.accumulator.min(SIM_DT);
            }

            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }

            requests
        }

        fn handle_event(&mut self, event: GameEvent) -> Option<(u64, TauntContext)> {
            let level_id = self.state.level.id;
            self.audio.play(SoundEffect::for_event(&event));
            match event {
                GameEvent::Died { cause, .. } => {
                    let deaths = self.progress.record_death(level_id);
                    self.progress.save();
                    let serial = self.taunts.begin();
                    return Some((
                        serial,
                        TauntContext {
                            level_name: self.state.level.name.clone(),
                            deaths,
                            cause,
                        },
                    ));
                }
                GameEvent::Won => {
                    if self.progress.record_win(level_id) {
                        log::info!("Level {} completed for the first time", level_id);
                    }
                    self.progress.save();
                }
                _ => {}
            }
            None
        }

        /// Render the current frame
        fn render(&mut self) {
            let vertices = scene_vertices(&self.state, &self.settings);
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        fn restart(&mut self) {
            self.taunts.dismiss();
            self.state.restart();
            self.accumulator = 0.0;
        }

        fn load_level(&mut self, id: u32) {
            let Some(state) = levels::start(id, js_sys::Date::now() as u64) else {
                log::warn!("No level with id {}", id);
                return;
            };
            self.taunts.dismiss();
            if let Some(ref mut render_state) = self.render_state {
                render_state.set_level_size(state.level.width, state.level.height);
            }
            self.state = state;
            self.accumulator = 0.0;
        }

        /// Enter after a win moves on; the last level loops to the first
        fn advance(&mut self) {
            let next = levels::next_after(self.state.level.id).unwrap_or(1);
            self.load_level(next);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let set_text = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    if el.text_content().as_deref() != Some(text) {
                        el.set_text_content(Some(text));
                    }
                }
            };
            let show = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            };

            let level = &self.state.level;
            let mark = if self.progress.is_completed(level.id) { " \u{2713}" } else { "" };
            set_text(
                "#hud-level .hud-value",
                &format!("{}. {}{}", level.id, level.name, mark),
            );
            set_text(
                "#hud-deaths .hud-value",
                &self.progress.deaths_for(level.id).to_string(),
            );
            show("hud-fps", self.settings.show_fps);
            if self.settings.show_fps {
                set_text("#hud-fps .hud-value", &self.fps.to_string());
            }

            let dead = self.state.phase == GamePhase::Dead;
            show("death-screen", dead);
            if dead {
                if let Some(cause) = self.state.death {
                    set_text("#death-cause", cause.message());
                }
                set_text("#death-taunt", self.taunts.text().unwrap_or("..."));
            }

            show("win-screen", self.state.phase == GamePhase::Won);
        }
    }

    /// Ask the page's optional `window.fakeoutTaunt(prompt)` for a line
    async fn fetch_taunt(prompt: String) -> Option<String> {
        let window = web_sys::window()?;
        let hook = js_sys::Reflect::get(&window, &JsValue::from_str("fakeoutTaunt")).ok()?;
        let hook: js_sys::Function = hook.dyn_into().ok()?;
        let value = hook.call1(&window, &JsValue::from_str(&prompt)).ok()?;
        let value = match value.dyn_into::<js_sys::Promise>() {
            Ok(promise) => JsFuture::from(promise).await.ok()?,
            Err(value) => value,
        };
        value.as_string()
    }

    fn dispatch_taunts(game: &Rc<RefCell<Game>>, requests: Vec<(u64, TauntContext)>) {
        for (serial, ctx) in requests {
            let game = game.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let response = fetch_taunt(ctx.prompt()).await;
                let mut rng = Pcg32::seed_from_u64(js_sys::Date::now() as u64 ^ serial);
                let text = taunt::resolve(response.as_deref(), &mut rng);
                game.borrow_mut().taunts.deliver(serial, text);
            });
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Fakeout starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let state = levels::start(1, seed).ok_or("no levels")?;
        let level_size = (state.level.width, state.level.height);
        let game = Rc::new(RefCell::new(Game::new(state)));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height, level_size)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        game.borrow_mut().render_state = Some(render_state);

        setup_keyboard(game.clone())?;
        setup_touch(&canvas, game.clone())?;
        setup_focus_loss(game.clone())?;

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Fakeout running!");
        Ok(())
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                let code = event.code();
                if g.input.key_down(&code) {
                    event.prevent_default();
                    return;
                }
                if event.repeat() {
                    return;
                }
                match code.as_str() {
                    "KeyR" => g.restart(),
                    "Enter" if g.state.phase == GamePhase::Won => g.advance(),
                    "Enter" if g.state.phase == GamePhase::Dead => g.restart(),
                    "KeyM" => {
                        let muted = g.settings.toggle_mute();
                        let settings = g.settings.clone();
                        g.audio.apply_settings(&settings);
                        settings.save();
                        log::info!("Muted: {}", muted);
                    }
                    "KeyF" => {
                        g.settings.show_fps = !g.settings.show_fps;
                        g.settings.save();
                    }
                    _ => {}
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().input.key_up(&event.code()) {
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_touch(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        // Touch start
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.audio.resume();
                if !g.settings.touch_controls {
                    g.settings.touch_controls = true;
                    g.settings.save();
                }
                let phase = g.state.phase;
                if phase == GamePhase::Won {
                    g.advance();
                    return;
                }
                if phase == GamePhase::Dead {
                    g.restart();
                    return;
                }
                let rect = canvas_clone.get_bounding_client_rect();
                let w = canvas_clone.client_width() as f32;
                let h = canvas_clone.client_height() as f32;
                let level = (g.state.level.width, g.state.level.height);
                let touches = event.changed_touches();
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        let x = touch.client_x() as f32 - rect.left() as f32;
                        let y = touch.client_y() as f32 - rect.top() as f32;
                        let action = canvas_touch_action(x, y, (w, h), level);
                        g.input.touch_start(touch.identifier(), action);
                    }
                }
            });
            canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch end and cancel
        for name in ["touchend", "touchcancel"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                let touches = event.changed_touches();
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        g.input.touch_end(touch.identifier());
                    }
                }
            });
            canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    /// Held keys never see their keyup once focus is gone
    fn setup_focus_loss(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().input.clear();
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().input.clear();
                log::debug!("Input cleared (window blur)");
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
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
        let requests = {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            let requests = g.update(dt, time);
            g.render();
            g.update_hud();
            requests
        };

        dispatch_taunts(&game, requests);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

/// Headless smoke run: hold right on every built-in level and report how
/// each one ends.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use fakeout::sim::{GameEvent, GameState, TickInput, tick};

    env_logger::init();
    log::info!("Fakeout (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    let input = TickInput {
        right: true,
        ..Default::default()
    };

    for level in fakeout::levels::builtin() {
        let name = level.name.clone();
        let rules = fakeout::levels::scripted_rules(level.id);
        let mut state = GameState::new(level, rules, 1);
        let mut ending = String::from("still running");
        'run: for _ in 0..600 {
            for event in tick(&mut state, &input) {
                match event {
                    GameEvent::Died { cause, .. } => {
                        ending = format!("died: {}", cause.message());
                        break 'run;
                    }
                    GameEvent::Won => {
                        ending = "won".to_string();
                        break 'run;
                    }
                    _ => {}
                }
            }
        }
        println!("{:<14} frame {:>4}: {}", name, state.frame, ending);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
