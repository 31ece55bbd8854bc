//! Orchard Dash entry point
//!
//! Web builds expose a `WebGame` handle to the page script; native builds run
//! a headless autopilot session and print the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use wasm_bindgen::prelude::*;

    use orchard_dash::audio::{WebAudio, dispatch_events};
    use orchard_dash::consts::*;
    use orchard_dash::renderer::{AssetCache, AssetKey, draw_list};
    use orchard_dash::sim::{ArcadeOverlap, FixedStep, RoundController, TickInput, tick};
    use orchard_dash::ui::Hud;
    use orchard_dash::{GameConfig, Settings};

    fn js_err(e: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&e.to_string())
    }

    /// Game instance driven by the page's animation frame callback
    #[wasm_bindgen]
    pub struct WebGame {
        ctrl: RoundController,
        cache: AssetCache,
        audio: WebAudio,
        settings: Settings,
        hud: Hud,
        input: TickInput,
        stepper: FixedStep,
    }

    #[wasm_bindgen]
    impl WebGame {
        /// Both arguments are optional JSON documents
        #[wasm_bindgen(constructor)]
        pub fn new(config_json: Option<String>, settings_json: Option<String>) -> Result<WebGame, JsValue> {
            let config = match config_json {
                Some(json) => GameConfig::from_json(&json).map_err(js_err)?,
                None => GameConfig::default(),
            };
            let settings = match settings_json {
                Some(json) => Settings::from_json(&json).map_err(js_err)?,
                None => Settings::default(),
            };

            let seed = js_sys::Date::now() as u64;
            log::info!("Orchard Dash starting, seed {}", seed);
            let mut game = WebGame {
                hud: Hud::new(config.total_apples),
                ctrl: RoundController::new(config, seed),
                cache: AssetCache::new(),
                audio: WebAudio::new(),
                settings,
                input: TickInput::default(),
                stepper: FixedStep::default(),
            };
            game.cache.init(game.ctrl.area.width, game.ctrl.area.height);
            game.ctrl.start_session();
            game.flush_events();
            Ok(game)
        }

        /// Start a fresh session with a new layout
        pub fn restart(&mut self) {
            let config = self.ctrl.config.clone();
            self.hud = Hud::new(config.total_apples);
            self.ctrl = RoundController::new(config, js_sys::Date::now() as u64);
            self.cache.teardown();
            self.cache.init(self.ctrl.area.width, self.ctrl.area.height);
            self.stepper.reset();
            self.input = TickInput::default();
            self.ctrl.start_session();
            self.flush_events();
        }

        pub fn set_directions(&mut self, up: bool, down: bool, left: bool, right: bool) {
            self.input.intent = TickInput::from_directions(up, down, left, right).intent;
        }

        pub fn press_drop(&mut self) {
            self.input.drop = true;
        }

        pub fn toggle_pause(&mut self) {
            self.input.pause = true;
        }

        pub fn set_idle(&mut self, idle: bool) {
            self.input.idle_mode = idle;
        }

        pub fn set_focused(&mut self, focused: bool) {
            self.settings.blurred = !focused;
        }

        /// Call from the first user gesture; browsers start audio suspended
        pub fn resume_audio(&self) {
            self.audio.resume();
        }

        /// Advance by the wall-clock seconds since the last frame
        pub fn frame(&mut self, dt: f32) {
            for _ in 0..self.stepper.advance(dt) {
                tick(&mut self.ctrl, &self.input, SIM_DT, &ArcadeOverlap);

                // Clear one-shot inputs after processing
                self.input.drop = false;
                self.input.pause = false;
            }
            self.flush_events();
        }

        pub fn draw_list_json(&self) -> Result<String, JsValue> {
            serde_json::to_string(&draw_list(&self.ctrl)).map_err(js_err)
        }

        pub fn hud_json(&self) -> Result<String, JsValue> {
            serde_json::to_string(&self.hud).map_err(js_err)
        }

        /// Final score line and rating, once the session has ended
        pub fn summary(&self) -> Option<String> {
            self.hud.summary().map(|(line, rating)| format!("{line}\n{rating}"))
        }

        /// SVG source for a sprite key (placeholder if unknown)
        pub fn texture_svg(&mut self, key: &str) -> String {
            let key = AssetKey::ALL
                .into_iter()
                .find(|k| k.as_str() == key)
                .unwrap_or(AssetKey::Background);
            self.cache.get_or_placeholder(key).svg.clone()
        }

        pub fn is_over(&self) -> bool {
            self.ctrl.session_over
        }

        fn flush_events(&mut self) {
            let events = self.ctrl.drain_events();
            dispatch_events(&mut self.audio, &self.settings, &events);
            self.hud.apply(&events);
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialised".into());
        }
        log::info!("Orchard Dash wasm module loaded");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Orchard Dash (native) starting...");

    if let Err(e) = native::run(std::env::args().skip(1).collect()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::Path;

    use orchard_dash::audio::{RecordingSink, dispatch_events};
    use orchard_dash::consts::*;
    use orchard_dash::renderer::{AssetCache, Sprite, SpriteSink, Texture, render_frame};
    use orchard_dash::sim::{ArcadeOverlap, RoundController, TickInput, tick};
    use orchard_dash::ui::Hud;
    use orchard_dash::{ConfigError, GameConfig, GameVariant, Settings};

    /// Give up on a demo session after ten simulated minutes
    const MAX_TICKS: u32 = 60 * 60 * 10;

    /// Counts sprites instead of drawing them
    #[derive(Default)]
    struct NullCanvas {
        sprites: usize,
    }

    impl SpriteSink for NullCanvas {
        fn draw(&mut self, _sprite: &Sprite, _texture: &Texture) {
            self.sprites += 1;
        }
    }

    /// `orchard-dash [config.json] [--variant chase|pickup] [--seed N]`
    pub fn run(args: Vec<String>) -> Result<(), ConfigError> {
        let mut config = None;
        let mut variant = None;
        let mut seed = 0x5eed_u64;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--variant" => variant = args.next().as_deref().and_then(GameVariant::from_str),
                "--seed" => seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(seed),
                path => config = Some(GameConfig::load(Path::new(path))?),
            }
        }
        let config = match (config, variant) {
            (Some(config), _) => config,
            (None, Some(variant)) => GameConfig::for_variant(variant),
            (None, None) => GameConfig::default(),
        };

        let mut ctrl = RoundController::new(config, seed);
        let mut hud = Hud::new(ctrl.config.total_apples);
        let mut audio = RecordingSink::default();
        let settings = Settings::default();
        let mut cache = AssetCache::new();
        let mut canvas = NullCanvas::default();
        cache.init(ctrl.area.width, ctrl.area.height);

        ctrl.start_session();
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        let mut ticks = 0;
        while !ctrl.session_over && ticks < MAX_TICKS {
            tick(&mut ctrl, &input, SIM_DT, &ArcadeOverlap);
            let events = ctrl.drain_events();
            dispatch_events(&mut audio, &settings, &events);
            hud.apply(&events);
            render_frame(&ctrl, &mut cache, &mut canvas);
            ticks += 1;
        }
        cache.teardown();

        log::info!(
            "{} ticks, {} sprites drawn, {} sounds played",
            ticks,
            canvas.sprites,
            audio.played.len()
        );
        match hud.summary() {
            Some((line, rating)) => println!("{line}\n{rating}"),
            None => println!("Session still running after {ticks} ticks: {}", hud.score_text()),
        }
        for (round, outcome) in ctrl.outcomes.iter().enumerate() {
            log::info!("round {}: {:?}", round + 1, outcome);
        }
        Ok(())
    }
}
