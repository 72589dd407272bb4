//! Disco Catch entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlElement, KeyboardEvent};

    use disco_catch::audio::{AudioManager, SoundEffect};
    use disco_catch::scene::SceneEvent;
    use disco_catch::sim::{GameEvent, PowerUpKind, RhythmSession, SceneBounds, TickInput, tick};
    use disco_catch::{HighScores, SceneFlow, Settings};

    /// Frames a hit burst stays on screen (~0.5s at 60 Hz)
    const HIT_EFFECT_FRAMES: u32 = 30;
    /// Frames the stage shakes after a bomb
    const SHAKE_FRAMES: u32 = 20;

    /// Game instance holding all state
    struct Game {
        session: RhythmSession,
        flow: SceneFlow,
        audio: AudioManager,
        settings: Settings,
        highscores: HighScores,
        held: HashSet<String>,
        /// Presentation handles keyed by note id
        note_els: HashMap<u32, HtmlElement>,
        effects: Vec<(HtmlElement, u32)>,
        shake_frames: u32,
        /// Room whose result is pending when the stop event drains
        last_room: Option<u8>,
        document: Document,
    }

    impl Game {
        fn new(seed: u64, document: Document) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);
            Self {
                session: RhythmSession::new(seed),
                flow: SceneFlow::new(),
                audio,
                settings,
                highscores: HighScores::load(),
                held: HashSet::new(),
                note_els: HashMap::new(),
                effects: Vec::new(),
                shake_frames: 0,
                last_room: None,
                document,
            }
        }

        fn element(&self, id: &str) -> Option<HtmlElement> {
            self.document.get_element_by_id(id)?.dyn_into().ok()
        }

        fn bounds(&self) -> SceneBounds {
            match self.element("game-container") {
                Some(el) => SceneBounds::new(el.client_width() as f32, el.client_height() as f32),
                None => SceneBounds::default(),
            }
        }

        fn move_dir(&self) -> Vec2 {
            let held = |keys: &[&str]| keys.iter().any(|k| self.held.contains(*k));
            let mut dir = Vec2::ZERO;
            if held(&["ArrowUp", "w"]) {
                dir.y -= 1.0;
            }
            if held(&["ArrowDown", "s"]) {
                dir.y += 1.0;
            }
            if held(&["ArrowLeft", "a"]) {
                dir.x -= 1.0;
            }
            if held(&["ArrowRight", "d"]) {
                dir.x += 1.0;
            }
            dir
        }

        fn update(&mut self, now: f64) {
            let bounds = self.bounds();

            if let Some(event) = self.flow.update(now, &mut self.session, bounds) {
                self.on_scene_event(event);
            }

            let input = TickInput {
                now_ms: now,
                bounds,
                move_dir: self.move_dir(),
                autopilot: false,
            };
            tick(&mut self.session, &input);

            for event in self.session.drain_events() {
                self.on_game_event(event);
            }
        }

        fn on_scene_event(&mut self, event: SceneEvent) {
            if let Some(sound) = SoundEffect::for_scene_event(&event) {
                self.audio.play(sound);
            }
            let overlay = self.element("transition-overlay");
            let hud = self.element("rhythm-hud");
            match event {
                SceneEvent::TransitionStarted { .. } | SceneEvent::LeftRoom { .. } => {
                    if let SceneEvent::LeftRoom { room } = event {
                        self.last_room = Some(room);
                    }
                    if let Some(el) = overlay {
                        let _ = el.class_list().remove_1("hidden");
                    }
                    if let Some(el) = hud {
                        let _ = el.class_list().add_1("hidden");
                    }
                }
                SceneEvent::RoomLoaded { .. } => {
                    if let Some(el) = overlay {
                        let _ = el.class_list().add_1("hidden");
                    }
                    if let Some(el) = hud {
                        let _ = el.class_list().remove_1("hidden");
                    }
                }
                SceneEvent::LobbyShown => {
                    if let Some(el) = overlay {
                        let _ = el.class_list().add_1("hidden");
                    }
                    self.render_lobby();
                }
                SceneEvent::DoorOpened { .. } => {}
            }
        }

        fn on_game_event(&mut self, event: GameEvent) {
            if let Some(sound) = SoundEffect::for_game_event(&event) {
                self.audio.play(sound);
            }

            match event {
                GameEvent::NoteSpawned { id, kind, pos } => {
                    if let Some(el) = self.create_div(&format!("note {}", kind.as_str())) {
                        el.set_text_content(Some(kind.symbol()));
                        place(&el, pos);
                        self.note_els.insert(id, el);
                    }
                }
                GameEvent::NoteRemoved { id } => {
                    if let Some(el) = self.note_els.remove(&id) {
                        el.remove();
                    }
                }
                GameEvent::Feedback(feedback) => {
                    if let Some(msg) = self.element("rhythm-message") {
                        msg.set_text_content(Some(feedback.label));
                        let _ = msg.style().set_property("color", feedback.color);
                        let _ = msg.class_list().remove_1("pop");
                        // Force reflow so the animation restarts
                        let _ = msg.offset_width();
                        let _ = msg.class_list().add_1("pop");
                    }
                }
                GameEvent::HitEffect { pos } if self.settings.effective_hit_effects() => {
                    if let Some(el) = self.create_div("hit-effect") {
                        place(&el, pos - Vec2::splat(30.0));
                        self.effects.push((el, HIT_EFFECT_FRAMES));
                    }
                }
                GameEvent::ScreenShake if self.settings.effective_screen_shake() => {
                    self.shake_frames = SHAKE_FRAMES;
                }
                GameEvent::SessionStopped { score, max_combo } => {
                    if let Some(room) = self.last_room.take() {
                        let now = js_sys::Date::now();
                        // The room record changes even when the board doesn't
                        self.highscores.add_score(score, room, max_combo, now);
                        self.highscores.save();
                    }
                }
                _ => {}
            }
        }

        fn create_div(&self, class: &str) -> Option<HtmlElement> {
            let layer = self.document.get_element_by_id("scene-layer")?;
            let el: HtmlElement = self.document.create_element("div").ok()?.dyn_into().ok()?;
            el.set_class_name(class);
            layer.append_child(&el).ok()?;
            Some(el)
        }

        /// Visited doors and records shown in the lobby
        fn render_lobby(&self) {
            if let Some(el) = self.element("rooms-visited") {
                let text = format!("{}/{}", self.flow.visited.len(), disco_catch::ROOMS.len());
                el.set_text_content(Some(&text));
                let _ = el.class_list().toggle_with_force("complete", self.flow.all_visited());
            }
            for room in disco_catch::ROOMS.iter() {
                let Some(el) = self.element(&format!("door-best-{}", room.id)) else {
                    continue;
                };
                let text = self
                    .highscores
                    .best_for_room(room.id)
                    .map(|r| format!("{} (x{})", r.best_score, r.best_combo))
                    .unwrap_or_default();
                el.set_text_content(Some(&text));
            }
            if let Some(el) = self.element("best-score") {
                let text = self.highscores.top_score().map(|s| s.to_string()).unwrap_or_default();
                el.set_text_content(Some(&text));
            }
        }

        /// Flip a preference, persist it and push it to the audio graph
        fn toggle_setting(&mut self, toggle: fn(&mut Settings)) {
            toggle(&mut self.settings);
            self.settings.save();
            self.audio.apply_settings(&self.settings);
            if !self.settings.effective_screen_shake() {
                self.shake_frames = 0;
            }
        }

        /// Sync DOM with engine state
        fn render(&mut self, now: f64) {
            for note in self.session.active_notes() {
                if let Some(el) = self.note_els.get(&note.id) {
                    let _ = el.style().set_property("top", &format!("{}px", note.pos.y));
                }
            }

            self.effects.retain_mut(|(el, frames)| {
                *frames = frames.saturating_sub(1);
                if *frames == 0 {
                    el.remove();
                }
                *frames > 0
            });

            if let Some(player) = self.element("player") {
                place(&player, self.session.player.pos);
                let classes = player.class_list();
                let power = self.session.power_up();
                let _ = classes.toggle_with_force("big", power == PowerUpKind::Big);
                let _ = classes.toggle_with_force("star", power == PowerUpKind::Star);
                let _ = classes.toggle_with_force("walking", self.move_dir() != Vec2::ZERO);
            }

            if let Some(layer) = self.element("scene-layer") {
                let frozen = self.session.power.is_frozen();
                let _ = layer.class_list().toggle_with_force("frozen", frozen);
                let shake = if self.shake_frames > 0 {
                    self.shake_frames -= 1;
                    let amp = self.shake_frames as f32 * 0.5;
                    format!("translate({}px, {}px)", if self.shake_frames % 2 == 0 { amp } else { -amp }, 0)
                } else {
                    "none".to_string()
                };
                let _ = layer.style().set_property("transform", &shake);
            }

            if let Some(el) = self.element("rhythm-score") {
                el.set_text_content(Some(&self.session.score().to_string()));
            }
            if let Some(el) = self.element("rhythm-combo") {
                el.set_text_content(Some(&self.session.combo().to_string()));
            }
            if let Some(el) = self.element("rhythm-power") {
                let left = self.session.power.remaining_ms(now);
                let text = if left > 0.0 {
                    format!("{} {:.0}s", self.session.power_up().as_str(), (left / 1000.0).ceil())
                } else {
                    String::new()
                };
                el.set_text_content(Some(&text));
            }
        }

        fn on_key_down(&mut self, key: String, now: f64) {
            self.audio.resume();
            match key.as_str() {
                "Escape" => {
                    if let Some(event) = self.flow.leave_room(now, &mut self.session) {
                        self.on_scene_event(event);
                        for event in self.session.drain_events() {
                            self.on_game_event(event);
                        }
                    }
                }
                "m" => self.toggle_setting(|s| s.muted = !s.muted),
                "r" => self.toggle_setting(|s| s.reduced_motion = !s.reduced_motion),
                // Door selection stand-in: number keys pick a room from the lobby
                digit if digit.len() == 1 && !self.flow.is_transitioning() => {
                    if let Ok(room) = digit.parse::<u8>() {
                        if let Some(event) = self.flow.enter_room(room, now) {
                            self.on_scene_event(event);
                        }
                    }
                }
                _ => {}
            }
            self.held.insert(key);
        }
    }

    fn place(el: &HtmlElement, pos: Vec2) {
        let style = el.style();
        let _ = style.set_property("left", &format!("{}px", pos.x));
        let _ = style.set_property("top", &format!("{}px", pos.y));
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Disco Catch starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            web_sys::console::error_1(&"No document - cannot start".into());
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, document)));
        game.borrow().render_lobby();
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        request_animation_frame(game);

        log::info!("Disco Catch running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().on_key_down(event.key(), now());
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            game.borrow_mut().held.remove(&event.key());
        });
        let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            let now = now();
            g.update(now);
            g.render(now);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Disco Catch (native) starting...");
    log::info!("Native mode runs a headless autopilot round; build for wasm32 to play in the browser");

    demo::run();
}

/// Headless round: walk into a room, let the autopilot play, walk out
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use disco_catch::scene::SceneEvent;
    use disco_catch::sim::{RhythmSession, SceneBounds, TickInput, tick};
    use disco_catch::{HighScores, Room, SceneFlow, Tuning};

    /// 60 Hz frame time in milliseconds
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Length of the demo round
    const ROUND_MS: f64 = 60_000.0;

    fn load_tuning() -> Tuning {
        let Ok(path) = std::env::var("DISCO_CATCH_TUNING") else {
            return Tuning::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json_or_default(&json),
            Err(e) => {
                log::warn!("Cannot read tuning file {}: {}", path, e);
                Tuning::default()
            }
        }
    }

    pub fn run() {
        let seed = std::env::args()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0x5EED);
        let room_id = std::env::args()
            .nth(2)
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        let bounds = SceneBounds::new(1280.0, 720.0);
        let mut session = RhythmSession::with_tuning(seed, load_tuning());
        let mut flow = SceneFlow::new();
        let mut highscores = HighScores::load();

        let mut now = 0.0;
        if flow.enter_room(room_id, now).is_none() {
            log::error!("Room {} does not exist", room_id);
            return;
        }

        let mut round_end = None;
        loop {
            now += FRAME_MS;
            if let Some(event) = flow.update(now, &mut session, bounds) {
                log::info!("Scene: {:?}", event);
                match event {
                    SceneEvent::RoomLoaded { .. } => round_end = Some(now + ROUND_MS),
                    SceneEvent::LobbyShown => break,
                    _ => {}
                }
            }

            let input = TickInput {
                now_ms: now,
                bounds,
                autopilot: true,
                ..Default::default()
            };
            tick(&mut session, &input);
            session.drain_events();

            if round_end.is_some_and(|end| now >= end) {
                round_end = None;
                flow.leave_room(now, &mut session);
            }
        }

        let ledger = &session.ledger;
        let name = Room::by_id(room_id).map(|r| r.name).unwrap_or("?");
        println!("\nRoom {} ({})", room_id, name);
        println!("  score:     {}", ledger.score);
        println!("  max combo: {}", ledger.max_combo);
        println!("  caught:    {}", ledger.catches);
        println!("  missed:    {}", ledger.misses);

        if let Some(rank) = highscores.add_score(ledger.score, room_id, ledger.max_combo, 0.0) {
            println!("  rank:      #{}", rank);
        }
        highscores.save();
        if let Some(record) = highscores.best_for_room(room_id) {
            println!(
                "  room best: {} (best combo {}, {} sessions)",
                record.best_score, record.best_combo, record.sessions
            );
        }
        if let Some(top) = highscores.top_score() {
            println!("  top score: {}", top);
        }
    }
}
