//! Procedural sound cues. Each cue is described as a list of oscillator voices
//! with an envelope; `audio` turns the plan into Web Audio nodes. Keeping the
//! plan as plain data lets the gameplay layer and tests stay off the browser.

use crate::level::Level;

/// Envelope floor; exponential ramps cannot reach exactly zero.
pub const ENVELOPE_FLOOR: f32 = 0.0001;

const MAJOR_THIRD: f32 = 1.259_921; // 2^(4/12)
const PERFECT_FIFTH: f32 = 1.498_307; // 2^(7/12)
const CHORD_STAGGER_SECS: f64 = 0.06;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cue {
    Celebrate { chord_root_hz: f32 },
    Wrong,
    Click,
}

impl Cue {
    pub fn celebrate(level: &Level) -> Self {
        Cue::Celebrate {
            chord_root_hz: level.chord_root_hz,
        }
    }

    /// Voices making up this cue, offsets relative to the moment it fires.
    pub fn voices(&self) -> Vec<Voice> {
        match *self {
            Cue::Celebrate { chord_root_hz } => [1.0, MAJOR_THIRD, PERFECT_FIFTH]
                .iter()
                .enumerate()
                .map(|(i, ratio)| Voice {
                    waveform: Waveform::Triangle,
                    freq_start_hz: chord_root_hz * ratio,
                    freq_end_hz: chord_root_hz * ratio,
                    sweep_secs: 0.0,
                    offset_secs: i as f64 * CHORD_STAGGER_SECS,
                    attack_secs: 0.03,
                    peak: 0.45,
                    stop_secs: 0.25,
                })
                .collect(),
            Cue::Wrong => vec![Voice {
                waveform: Waveform::Sawtooth,
                freq_start_hz: 200.0,
                freq_end_hz: 90.0,
                sweep_secs: 0.25,
                offset_secs: 0.0,
                attack_secs: 0.02,
                peak: 0.3,
                stop_secs: 0.36,
            }],
            Cue::Click => vec![Voice {
                waveform: Waveform::Sine,
                freq_start_hz: 880.0,
                freq_end_hz: 880.0,
                sweep_secs: 0.0,
                offset_secs: 0.0,
                attack_secs: 0.005,
                peak: 0.15,
                stop_secs: 0.08,
            }],
        }
    }

    /// Seconds from firing until the last voice stops.
    pub fn duration_secs(&self) -> f64 {
        self.voices()
            .iter()
            .map(|v| v.offset_secs + v.stop_secs)
            .fold(0.0, f64::max)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
}

/// One oscillator with an attack/decay envelope:
/// floor → `peak` over `attack_secs` → floor at `stop_secs`, then stop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Voice {
    pub waveform: Waveform,
    pub freq_start_hz: f32,
    pub freq_end_hz: f32,
    pub sweep_secs: f64, // 0 = constant pitch
    pub offset_secs: f64,
    pub attack_secs: f64,
    pub peak: f32,
    pub stop_secs: f64,
}

/// Master amplitude for the given settings.
pub fn master_gain(volume: f32, muted: bool) -> f32 {
    if muted { 0.0 } else { volume.clamp(0.0, 1.0) }
}

/// Anything that can voice a cue. Implementations must not block and must
/// swallow their own failures.
pub trait CueSink {
    fn play(&mut self, cue: Cue);
    fn set_master_gain(&mut self, gain: f32);
}

/// Sink that keeps everything it is asked to play; handy off-browser.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub played: Vec<Cue>,
    pub gain: Option<f32>,
}

impl CueSink for RecordingSink {
    fn play(&mut self, cue: Cue) {
        self.played.push(cue);
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.gain = Some(gain);
    }
}
