//! Flux Snake entry point
//!
//! Handles platform-specific initialization and runs the frame loop.
//! The loop repaints every frame and only advances the simulation once
//! the speed controller's interval has elapsed.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, TouchEvent};

    use flux_snake::consts::*;
    use flux_snake::highscores::{self, BestScore};
    use flux_snake::renderer::{Frame, render};
    use flux_snake::settings::Settings;
    use flux_snake::sim::{
        Direction, GameOptions, GameRuntime, GameStatus, compute_speed_interval, step,
    };

    /// Minimum swipe distance in pixels before it counts as a direction
    const SWIPE_THRESHOLD: f64 = 24.0;

    /// Game instance holding all host-side state
    struct Game {
        runtime: GameRuntime,
        frame: Frame,
        ctx: CanvasRenderingContext2d,
        settings: Settings,
        best: u32,
        /// Terminal transition already persisted for this run
        over_handled: bool,
        touch_start: Option<(f64, f64)>,
    }

    impl Game {
        fn new(ctx: CanvasRenderingContext2d, now: f64) -> Self {
            let settings = Settings::load();
            let best = highscores::get_high_score()
                .map(|record| record.score)
                .unwrap_or(0);
            let runtime = Self::bootstrap_runtime(&settings, best, now);
            Self {
                runtime,
                frame: Frame::new(CANVAS_SIZE),
                ctx,
                settings,
                best,
                over_handled: false,
                touch_start: None,
            }
        }

        fn bootstrap_runtime(settings: &Settings, best: u32, now: f64) -> GameRuntime {
            GameRuntime::new(
                GameOptions {
                    best_score: best,
                    fx_enabled: settings.fx_enabled,
                    seed: rand::random(),
                    ..GameOptions::default()
                },
                now,
            )
        }

        fn restart(&mut self, now: f64) {
            self.best = highscores::get_high_score()
                .map(|record| record.score)
                .unwrap_or(self.best);
            self.runtime = Self::bootstrap_runtime(&self.settings, self.best, now);
            self.over_handled = false;
            log::info!("Flux amorcé.");
        }

        /// One animation-loop callback: maybe step, always repaint
        fn frame_tick(&mut self, time: f64) {
            let interval = compute_speed_interval(&self.runtime, time);
            if time - self.runtime.last_tick >= interval {
                let snapshot = step(&mut self.runtime, time);
                if let Some(message) = &snapshot.message {
                    log::info!("{}", message);
                }
                if snapshot.status == GameStatus::Over && !self.over_handled {
                    self.handle_game_over(snapshot.score);
                }
            }
            render(&mut self.frame, &self.runtime);
            self.blit();
        }

        fn handle_game_over(&mut self, score: u32) {
            self.over_handled = true;
            let stored = highscores::get_high_score();
            if BestScore::beaten_by(stored.as_ref(), score) {
                highscores::persist_high_score(score);
                self.best = score;
                self.runtime.best_score = score;
            }
            let played = highscores::bump_games_played();
            log::info!("Run over: score {}, best {}, games played {}", score, self.best, played);
        }

        /// Copy the software frame onto the canvas
        fn blit(&mut self) {
            let size = self.frame.size();
            if let Ok(image) = web_sys::ImageData::new_with_u8_clamped_array_and_sh(
                wasm_bindgen::Clamped(self.frame.data()),
                size,
                size,
            ) {
                let _ = self.ctx.put_image_data(&image, 0.0, 0.0);
            }
        }

        fn key_down(&mut self, event: &KeyboardEvent, now: f64) {
            let key = event.key();
            match key.as_str() {
                "p" | "P" => {
                    event.prevent_default();
                    self.runtime.toggle_pause();
                    return;
                }
                " " => {
                    if self.runtime.status == GameStatus::Over {
                        event.prevent_default();
                        self.restart(now);
                    }
                    return;
                }
                _ => {}
            }
            if let Some(direction) = map_key(&key) {
                event.prevent_default();
                self.runtime.queue_direction(direction);
            }
        }

        fn on_touch_start(&mut self, event: &TouchEvent) {
            if let Some(touch) = event.touches().get(0) {
                self.touch_start = Some((touch.client_x() as f64, touch.client_y() as f64));
            }
        }

        fn on_touch_end(&mut self, event: &TouchEvent) {
            let Some((start_x, start_y)) = self.touch_start.take() else {
                return;
            };
            let Some(touch) = event.changed_touches().get(0) else {
                return;
            };
            let dx = touch.client_x() as f64 - start_x;
            let dy = touch.client_y() as f64 - start_y;
            if dx.abs().max(dy.abs()) < SWIPE_THRESHOLD {
                return;
            }
            let direction = if dx.abs() > dy.abs() {
                if dx > 0.0 { Direction::Right } else { Direction::Left }
            } else if dy > 0.0 {
                Direction::Down
            } else {
                Direction::Up
            };
            self.runtime.queue_direction(direction);
        }
    }

    /// Arrows plus WASD and ZQSD (AZERTY)
    fn map_key(key: &str) -> Option<Direction> {
        match key {
            "ArrowUp" | "w" | "W" | "z" | "Z" => Some(Direction::Up),
            "ArrowDown" | "s" | "S" => Some(Direction::Down),
            "ArrowLeft" | "a" | "A" | "q" | "Q" => Some(Direction::Left),
            "ArrowRight" | "d" | "D" => Some(Direction::Right),
            _ => None,
        }
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn request_animation_frame(callback: &Closure<dyn FnMut(f64)>) {
        web_sys::window()
            .expect("no window")
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .expect("requestAnimationFrame failed");
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(|e| JsValue::from_str(&e.to_string()))?;

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("missing #canvas element")
            .dyn_into()?;
        canvas.set_width(CANVAS_SIZE);
        canvas.set_height(CANVAS_SIZE);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .expect("2d context unavailable")
            .dyn_into()?;

        let game = Rc::new(RefCell::new(Game::new(ctx, now_ms())));

        // Keyboard input
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().key_down(&event, now_ms());
            });
            document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch swipe input
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(TouchEvent)>::new(move |event: TouchEvent| {
                game.borrow_mut().on_touch_start(&event);
            });
            canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(TouchEvent)>::new(move |event: TouchEvent| {
                game.borrow_mut().on_touch_end(&event);
            });
            canvas.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Animation loop: repaint every frame, step when the interval is due
        let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let starter = callback.clone();
        *starter.borrow_mut() = Some(Closure::new(move |time: f64| {
            game.borrow_mut().frame_tick(time);
            request_animation_frame(callback.borrow().as_ref().expect("loop closure"));
        }));
        request_animation_frame(starter.borrow().as_ref().expect("loop closure"));

        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is start, this is just to satisfy the compiler
}

/// Native build: headless autopilot run for profiling and smoke tests.
/// The policy greedily chases the fruit while refusing stepping into a
/// wall or its own body.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use flux_snake::sim::{
        Direction, GameOptions, GameRuntime, GameStatus, Position, compute_speed_interval, step,
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let max_ticks: u64 = std::env::args()
        .skip_while(|arg| arg != "--ticks")
        .nth(1)
        .and_then(|value| value.parse().ok())
        .unwrap_or(2000);

    let seed: u64 = rand::random();
    let mut runtime = GameRuntime::new(
        GameOptions {
            seed,
            ..GameOptions::default()
        },
        0.0,
    );
    log::info!("Autopilot run, seed {seed}, up to {max_ticks} ticks");

    fn survives(runtime: &GameRuntime, direction: Direction) -> bool {
        let next = direction.advance(runtime.head());
        !next.hits_wall(runtime.grid_size) && !runtime.snake.contains(&next)
    }

    fn pick_direction(runtime: &GameRuntime) -> Direction {
        let head = runtime.head();
        let fruit: Position = runtime.fruit.position;
        let mut candidates = [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ];
        candidates.sort_by_key(|d| d.advance(head).manhattan(&fruit));
        candidates
            .into_iter()
            .filter(|d| *d != runtime.direction.opposite())
            .find(|d| survives(runtime, *d))
            .unwrap_or(runtime.direction)
    }

    let mut now = 0.0;
    for tick in 0..max_ticks {
        runtime.queue_direction(pick_direction(&runtime));
        now += compute_speed_interval(&runtime, now);
        let snapshot = step(&mut runtime, now);
        if let Some(message) = &snapshot.message {
            log::debug!("tick {tick}: {message}");
        }
        if snapshot.status != GameStatus::Running {
            break;
        }
    }

    log::info!(
        "Finished: status {:?}, score {}, length {}, speed level {}",
        runtime.status,
        runtime.score,
        runtime.snake.len(),
        runtime.speed_level
    );
}
