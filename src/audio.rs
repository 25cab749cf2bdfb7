//! Audio system using Web Audio API
//!
//! Procedurally generated cues, no asset files. Every Web Audio call can fail
//! (no context, autoplay policy, closed context); failures are dropped and
//! never reach the game.

use rand::Rng;
#[cfg(target_arch = "wasm32")]
use rand::SeedableRng;
#[cfg(target_arch = "wasm32")]
use rand_pcg::Pcg32;
#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, BiquadFilterType, GainNode, OscillatorNode, OscillatorType};

#[cfg(target_arch = "wasm32")]
use crate::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Filtered noise burst
    Death,
    Jump,
    /// Decoy burst open
    Pop,
    Win,
    /// Trap platform giving way
    Crumble,
    /// Hazard starting to fall
    Drop,
    /// Hidden piece appearing
    Reveal,
}

impl SoundEffect {
    /// Cue for a simulation event
    pub fn for_event(event: &GameEvent) -> Self {
        match event {
            GameEvent::Jumped => SoundEffect::Jump,
            GameEvent::DecoyPopped { .. } => SoundEffect::Pop,
            GameEvent::Collapsed { .. } => SoundEffect::Crumble,
            GameEvent::Dropped { .. } => SoundEffect::Drop,
            GameEvent::Revealed { .. } => SoundEffect::Reveal,
            GameEvent::Died { .. } => SoundEffect::Death,
            GameEvent::Won => SoundEffect::Win,
        }
    }
}

/// Length of the death noise burst in seconds
#[cfg(target_arch = "wasm32")]
const DEATH_NOISE_SECS: f32 = 0.35;

/// White noise in [-1, 1) with a linear fade to silence
pub fn noise_burst(rng: &mut impl Rng, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let fade = 1.0 - i as f32 / len as f32;
            rng.random_range(-1.0f32..1.0) * fade
        })
        .collect()
}

/// Audio manager for the game
#[cfg(target_arch = "wasm32")]
pub struct AudioManager {
    ctx: Option<AudioContext>,
    volume: f32,
}

#[cfg(target_arch = "wasm32")]
impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: settings.effective_volume(),
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.volume = settings.effective_volume();
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.volume;
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let played = match effect {
            SoundEffect::Death => play_death(ctx, vol),
            SoundEffect::Jump => play_jump(ctx, vol),
            SoundEffect::Pop => play_pop(ctx, vol),
            SoundEffect::Win => play_win(ctx, vol),
            SoundEffect::Crumble => play_crumble(ctx, vol),
            SoundEffect::Drop => play_drop(ctx, vol),
            SoundEffect::Reveal => play_reveal(ctx, vol),
        };
        if played.is_none() {
            log::debug!("Could not play {:?}", effect);
        }
    }
}

/// Create an oscillator with gain envelope
#[cfg(target_arch = "wasm32")]
fn create_osc(
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

/// Death - white noise through a closing lowpass
#[cfg(target_arch = "wasm32")]
fn play_death(ctx: &AudioContext, vol: f32) -> Option<()> {
    let rate = ctx.sample_rate();
    let len = (rate * DEATH_NOISE_SECS) as u32;
    let buffer = ctx.create_buffer(1, len, rate).ok()?;

    let mut rng = Pcg32::seed_from_u64((js_sys::Math::random() * u64::MAX as f64) as u64);
    let mut samples = noise_burst(&mut rng, len as usize);
    buffer.copy_to_channel(&mut samples, 0).ok()?;

    let source = ctx.create_buffer_source().ok()?;
    source.set_buffer(Some(&buffer));

    let filter = ctx.create_biquad_filter().ok()?;
    filter.set_type(BiquadFilterType::Lowpass);
    let gain = ctx.create_gain().ok()?;

    source.connect_with_audio_node(&filter).ok()?;
    filter.connect_with_audio_node(&gain).ok()?;
    gain.connect_with_audio_node(&ctx.destination()).ok()?;

    let t = ctx.current_time();
    filter.frequency().set_value_at_time(2400.0, t).ok()?;
    filter
        .frequency()
        .exponential_ramp_to_value_at_time(200.0, t + DEATH_NOISE_SECS as f64)
        .ok()?;
    gain.gain().set_value_at_time(vol * 0.6, t).ok()?;
    gain.gain()
        .exponential_ramp_to_value_at_time(0.01, t + DEATH_NOISE_SECS as f64)
        .ok()?;

    source.start().ok()?;
    Some(())
}

/// Jump - quick upward chirp
#[cfg(target_arch = "wasm32")]
fn play_jump(ctx: &AudioContext, vol: f32) -> Option<()> {
    let (osc, gain) = create_osc(ctx, 300.0, OscillatorType::Square)?;
    let t = ctx.current_time();

    gain.gain().set_value_at_time(vol * 0.12, t).ok();
    gain.gain()
        .exponential_ramp_to_value_at_time(0.01, t + 0.12)
        .ok();
    osc.frequency().set_value_at_time(300.0, t).ok();
    osc.frequency()
        .exponential_ramp_to_value_at_time(600.0, t + 0.1)
        .ok();

    osc.start().ok()?;
    osc.stop_with_when(t + 0.12).ok()
}

/// Decoy pop - bright two-note blip
#[cfg(target_arch = "wasm32")]
fn play_pop(ctx: &AudioContext, vol: f32) -> Option<()> {
    for (i, freq) in [880.0, 1320.0].iter().enumerate() {
        let (osc, gain) = create_osc(ctx, *freq, OscillatorType::Triangle)?;
        let t = ctx.current_time() + i as f64 * 0.06;
        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();
        osc.start_with_when(t).ok()?;
        osc.stop_with_when(t + 0.12).ok()?;
    }
    Some(())
}

/// Win - rising arpeggio
#[cfg(target_arch = "wasm32")]
fn play_win(ctx: &AudioContext, vol: f32) -> Option<()> {
    for (i, freq) in [523.0, 659.0, 784.0, 1047.0].iter().enumerate() {
        let (osc, gain) = create_osc(ctx, *freq, OscillatorType::Sine)?;
        let t = ctx.current_time() + i as f64 * 0.1;
        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.25)
            .ok();
        osc.start_with_when(t).ok()?;
        osc.stop_with_when(t + 0.3).ok()?;
    }
    Some(())
}

/// Crumble - low sawtooth sagging in pitch
#[cfg(target_arch = "wasm32")]
fn play_crumble(ctx: &AudioContext, vol: f32) -> Option<()> {
    let (osc, gain) = create_osc(ctx, 110.0, OscillatorType::Sawtooth)?;
    let t = ctx.current_time();

    gain.gain().set_value_at_time(vol * 0.2, t).ok();
    gain.gain()
        .exponential_ramp_to_value_at_time(0.01, t + 0.3)
        .ok();
    osc.frequency()
        .exponential_ramp_to_value_at_time(40.0, t + 0.3)
        .ok();

    osc.start().ok()?;
    osc.stop_with_when(t + 0.3).ok()
}

/// Drop - falling whistle
#[cfg(target_arch = "wasm32")]
fn play_drop(ctx: &AudioContext, vol: f32) -> Option<()> {
    let (osc, gain) = create_osc(ctx, 900.0, OscillatorType::Sine)?;
    let t = ctx.current_time();

    gain.gain().set_value_at_time(vol * 0.15, t).ok();
    gain.gain()
        .exponential_ramp_to_value_at_time(0.01, t + 0.25)
        .ok();
    osc.frequency()
        .exponential_ramp_to_value_at_time(250.0, t + 0.25)
        .ok();

    osc.start().ok()?;
    osc.stop_with_when(t + 0.25).ok()
}

/// Reveal - soft single ping
#[cfg(target_arch = "wasm32")]
fn play_reveal(ctx: &AudioContext, vol: f32) -> Option<()> {
    let (osc, gain) = create_osc(ctx, 660.0, OscillatorType::Triangle)?;
    let t = ctx.current_time();

    gain.gain().set_value_at_time(vol * 0.2, t).ok();
    gain.gain()
        .exponential_ramp_to_value_at_time(0.01, t + 0.2)
        .ok();

    osc.start().ok()?;
    osc.stop_with_when(t + 0.2).ok()
}
