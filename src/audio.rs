//! Audio: procedural tone recipes and the sinks that play them
//!
//! Every sound is a handful of oscillator voices, no sample files needed.
//! The simulation only emits `GameEvent::Sound`/`Ambient`; a sink turns those
//! into noise. Playback failures are logged and otherwise ignored.

use thiserror::Error;

use crate::settings::Settings;
use crate::sim::{GameEvent, SoundCue};

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio context unavailable")]
    Unavailable,
    #[error("failed to play {cue}: {reason}")]
    Playback { cue: &'static str, reason: String },
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One oscillator in a sound: frequency glides from `start_hz` to `end_hz`
/// while the gain decays from `gain`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    pub gain: f32,
    /// Seconds after the trigger
    pub delay: f64,
    pub duration: f64,
}

impl Voice {
    const fn new(waveform: Waveform, start_hz: f32, end_hz: f32, gain: f32, delay: f64, duration: f64) -> Self {
        Self {
            waveform,
            start_hz,
            end_hz,
            gain,
            delay,
            duration,
        }
    }

    pub fn end_time(&self) -> f64 {
        self.delay + self.duration
    }
}

use Waveform::*;

/// Falling tone as the fruit leaves the branch
const DROP: &[Voice] = &[Voice::new(Sine, 800.0, 400.0, 0.4, 0.0, 0.5)];

const PICKUP: &[Voice] = &[
    Voice::new(Triangle, 500.0, 900.0, 0.3, 0.0, 0.12),
    Voice::new(Sine, 1000.0, 1200.0, 0.15, 0.05, 0.1),
];

/// Rising chime with a fifth on top
const COLLECT: &[Voice] = &[
    Voice::new(Sine, 400.0, 800.0, 0.35, 0.0, 0.6),
    Voice::new(Sine, 600.0, 1200.0, 0.18, 0.0, 0.6),
];

/// Buzzy slither
const SNAKE_HISS: &[Voice] = &[
    Voice::new(Sawtooth, 3200.0, 2600.0, 0.06, 0.0, 1.0),
    Voice::new(Square, 4100.0, 3800.0, 0.03, 0.1, 0.8),
];

/// Crunch, then slurp
const EAT: &[Voice] = &[
    Voice::new(Sawtooth, 140.0, 70.0, 0.3, 0.0, 0.3),
    Voice::new(Sine, 300.0, 100.0, 0.3, 0.3, 0.4),
];

/// Descending wah-wah
const GAME_OVER: &[Voice] = &[
    Voice::new(Sine, 400.0, 200.0, 0.4, 0.0, 1.5),
    Voice::new(Sine, 600.0, 300.0, 0.15, 0.0, 1.5),
];

/// Soft garden drone for the ambient loop
pub const AMBIENT: &[Voice] = &[
    Voice::new(Sine, 220.0, 220.0, 0.03, 0.0, f64::INFINITY),
    Voice::new(Triangle, 330.0, 330.0, 0.015, 0.0, f64::INFINITY),
];

/// Voices for a one-shot cue
pub fn recipe(cue: SoundCue) -> &'static [Voice] {
    match cue {
        SoundCue::Drop => DROP,
        SoundCue::Pickup => PICKUP,
        SoundCue::Collect => COLLECT,
        SoundCue::SnakeHiss => SNAKE_HISS,
        SoundCue::Eat => EAT,
        SoundCue::GameOver => GAME_OVER,
    }
}

/// Something that can make the game's sounds
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue, volume: f32) -> Result<(), AudioError>;
    fn set_ambient(&mut self, playing: bool, volume: f32) -> Result<(), AudioError>;
}

/// Sink that only remembers what it was asked to play (headless runs, tests)
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub played: Vec<(SoundCue, f32)>,
    pub ambient: bool,
}

impl AudioSink for RecordingSink {
    fn play(&mut self, cue: SoundCue, volume: f32) -> Result<(), AudioError> {
        log::debug!("sound: {} at {:.2}", cue.as_str(), volume);
        self.played.push((cue, volume));
        Ok(())
    }

    fn set_ambient(&mut self, playing: bool, _volume: f32) -> Result<(), AudioError> {
        self.ambient = playing;
        Ok(())
    }
}

/// Forward the sound events of one frame to `sink`, honoring volume settings
pub fn dispatch_events(sink: &mut dyn AudioSink, settings: &Settings, events: &[GameEvent]) {
    for event in events {
        let result = match event {
            GameEvent::Sound { cue } => {
                let volume = settings.effective_sfx_volume();
                if volume <= 0.0 {
                    continue;
                }
                sink.play(*cue, volume)
            }
            GameEvent::Ambient { playing } => sink.set_ambient(*playing, settings.effective_music_volume()),
            _ => continue,
        };
        if let Err(e) = result {
            log::warn!("audio skipped: {e}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AMBIENT, AudioError, AudioSink, Voice, Waveform, recipe};
    use crate::sim::SoundCue;

    /// Web Audio oscillator playback
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        ambient: Vec<(OscillatorNode, GainNode)>,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                ambient: Vec::new(),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn context(&self) -> Result<&AudioContext, AudioError> {
            let ctx = self.ctx.as_ref().ok_or(AudioError::Unavailable)?;
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            Ok(ctx)
        }
    }

    fn osc_type(waveform: Waveform) -> OscillatorType {
        match waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
            Waveform::Triangle => OscillatorType::Triangle,
        }
    }

    /// Create an oscillator routed through its own gain node
    fn create_osc(ctx: &AudioContext, voice: &Voice) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type(voice.waveform));
        osc.frequency().set_value(voice.start_hz);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    fn schedule_voice(ctx: &AudioContext, voice: &Voice, vol: f32) -> Option<()> {
        let (osc, gain) = create_osc(ctx, voice)?;
        let t = ctx.current_time() + voice.delay;
        let end = t + voice.duration;

        gain.gain().set_value_at_time(vol * voice.gain, t).ok()?;
        gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok()?;
        osc.frequency().set_value_at_time(voice.start_hz, t).ok()?;
        if voice.end_hz != voice.start_hz {
            osc.frequency().exponential_ramp_to_value_at_time(voice.end_hz, end).ok()?;
        }

        osc.start_with_when(t).ok()?;
        osc.stop_with_when(end + 0.05).ok()?;
        Some(())
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, cue: SoundCue, volume: f32) -> Result<(), AudioError> {
            let ctx = self.context()?;
            for voice in recipe(cue) {
                schedule_voice(ctx, voice, volume).ok_or_else(|| AudioError::Playback {
                    cue: cue.as_str(),
                    reason: "oscillator setup failed".into(),
                })?;
            }
            Ok(())
        }

        fn set_ambient(&mut self, playing: bool, volume: f32) -> Result<(), AudioError> {
            for (osc, _) in self.ambient.drain(..) {
                osc.stop_with_when(0.0).ok();
            }
            if !playing || volume <= 0.0 {
                return Ok(());
            }

            let ctx = self.ctx.as_ref().ok_or(AudioError::Unavailable)?;
            for voice in AMBIENT {
                let (osc, gain) = create_osc(ctx, voice).ok_or_else(|| AudioError::Playback {
                    cue: "ambient",
                    reason: "oscillator setup failed".into(),
                })?;
                gain.gain().set_value(volume * voice.gain);
                osc.start().ok();
                self.ambient.push((osc, gain));
            }
            Ok(())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;
