//! Feedback sounds using the Web Audio API
//!
//! Procedurally generated effects - no external files needed. Any failure in
//! the audio graph is swallowed; gameplay never depends on it.

use crate::scene::SceneEvent;
use crate::sim::GameEvent;
use crate::sim::PowerUpKind;
use crate::sim::scoring::{
    FEEDBACK_BOOM, FEEDBACK_DESTROY, FEEDBACK_DODGE, FEEDBACK_FREEZE, FEEDBACK_MISS,
    FEEDBACK_POWER_DOWN, FEEDBACK_RICH,
};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ordinary catch - two-note chime
    Catch,
    /// Coin catch - bright ding
    Coin,
    /// Note fell off screen
    Miss,
    /// Unguarded bomb catch
    Boom,
    /// Bomb smashed while invincible
    Destroy,
    /// Big or star power-up gained
    PowerUp,
    /// Power-up lost
    PowerDown,
    /// Ice caught
    Freeze,
    /// Door opening / UI click
    Click,
    /// Room transition
    DiskChange,
}

impl SoundEffect {
    /// Sound for an engine event, if any
    pub fn for_game_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Feedback(feedback) => match *feedback {
                FEEDBACK_MISS => Some(SoundEffect::Miss),
                FEEDBACK_BOOM => Some(SoundEffect::Boom),
                FEEDBACK_DESTROY => Some(SoundEffect::Destroy),
                FEEDBACK_POWER_DOWN => Some(SoundEffect::PowerDown),
                FEEDBACK_FREEZE => Some(SoundEffect::Freeze),
                FEEDBACK_RICH => Some(SoundEffect::Coin),
                // A dodged bomb stays silent
                FEEDBACK_DODGE => None,
                _ => Some(SoundEffect::Catch),
            },
            GameEvent::PowerUpChanged {
                kind: PowerUpKind::Big | PowerUpKind::Star,
            } => Some(SoundEffect::PowerUp),
            _ => None,
        }
    }

    /// Sound for a scene transition, if any
    pub fn for_scene_event(event: &SceneEvent) -> Option<Self> {
        match event {
            SceneEvent::DoorOpened { .. } => Some(SoundEffect::Click),
            SceneEvent::TransitionStarted { .. } | SceneEvent::LeftRoom { .. } => {
                Some(SoundEffect::DiskChange)
            }
            SceneEvent::RoomLoaded { .. } | SceneEvent::LobbyShown => None,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::SoundEffect;
    use crate::settings::Settings;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx, volume: 0.8 }
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume();
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn play(&self, effect: SoundEffect) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Catch => {
                    self.tone(ctx, 600.0, OscillatorType::Sine, 0.0, 0.1, vol);
                    self.tone(ctx, 800.0, OscillatorType::Sine, 0.1, 0.2, vol);
                }
                SoundEffect::Coin => {
                    self.tone(ctx, 988.0, OscillatorType::Square, 0.0, 0.08, vol * 0.5);
                    self.tone(ctx, 1319.0, OscillatorType::Square, 0.08, 0.25, vol * 0.5);
                }
                SoundEffect::Miss => self.tone(ctx, 150.0, OscillatorType::Sawtooth, 0.0, 0.3, vol),
                SoundEffect::Boom => {
                    self.noise(ctx, 0.5, vol * 2.0);
                    self.tone(ctx, 60.0, OscillatorType::Square, 0.0, 0.3, vol);
                }
                SoundEffect::Destroy => {
                    self.noise(ctx, 0.2, vol);
                    self.tone(ctx, 1046.0, OscillatorType::Triangle, 0.05, 0.15, vol);
                }
                SoundEffect::PowerUp => {
                    for (i, freq) in [523.0, 659.0, 784.0, 1046.0].into_iter().enumerate() {
                        self.tone(ctx, freq, OscillatorType::Triangle, i as f64 * 0.07, 0.1, vol);
                    }
                }
                SoundEffect::PowerDown => {
                    for (i, freq) in [784.0, 523.0, 330.0].into_iter().enumerate() {
                        self.tone(ctx, freq, OscillatorType::Square, i as f64 * 0.09, 0.12, vol * 0.6);
                    }
                }
                SoundEffect::Freeze => self.sweep(ctx, 1400.0, 500.0, 0.4, vol),
                SoundEffect::Click => self.tone(ctx, 400.0, OscillatorType::Triangle, 0.0, 0.05, vol),
                SoundEffect::DiskChange => {
                    self.noise(ctx, 1.5, vol);
                    self.tone(ctx, 50.0, OscillatorType::Square, 0.0, 0.1, vol);
                }
            }
        }

        // === Sound generators ===

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Single decaying tone starting `delay` seconds from now
        fn tone(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
            delay: f64,
            duration: f64,
            vol: f32,
        ) {
            let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
                return;
            };
            let t = ctx.current_time() + delay;

            gain.gain().set_value_at_time(0.1 * vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + duration)
                .ok();

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + duration).ok();
        }

        /// Pitch sweep (ice crackle)
        fn sweep(&self, ctx: &AudioContext, from: f32, to: f32, duration: f64, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, from, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(0.08 * vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + duration)
                .ok();
            osc.frequency().set_value_at_time(from, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(to, t + duration)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + duration).ok();
        }

        /// White noise burst with a linear fade
        fn noise(&self, ctx: &AudioContext, duration: f64, vol: f32) {
            let rate = ctx.sample_rate();
            let len = (rate as f64 * duration) as u32;
            let Ok(buffer) = ctx.create_buffer(1, len, rate) else {
                return;
            };
            let data: Vec<f32> = (0..len)
                .map(|_| (js_sys::Math::random() * 2.0 - 1.0) as f32)
                .collect();
            if buffer.copy_to_channel(&data, 0).is_err() {
                return;
            }

            let Ok(source) = ctx.create_buffer_source() else {
                return;
            };
            let Ok(gain) = ctx.create_gain() else { return };
            source.set_buffer(Some(&buffer));

            let t = ctx.current_time();
            gain.gain().set_value_at_time(0.05 * vol, t).ok();
            gain.gain().linear_ramp_to_value_at_time(0.0, t + duration).ok();

            if source.connect_with_audio_node(&gain).is_err()
                || gain.connect_with_audio_node(&ctx.destination()).is_err()
            {
                return;
            }
            source.start().ok();
        }
    }
}
