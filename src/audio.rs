//! Web Audio backend for the tone plans in `tone`.
//!
//! One `AudioContext` and one master `GainNode` per page, created lazily on the
//! first cue (browsers refuse to start audio before a user gesture, so creating
//! it at load time would just fail). Every failure is logged at debug level and
//! dropped: sound is optional for gameplay.

use std::cell::RefCell;

use crate::error::AudioError;
use crate::tone::{Cue, CueSink};

/// Time constant of the master volume ramp.
pub const GAIN_RAMP_SECS: f64 = 0.01;

thread_local! {
    static GRAPH: RefCell<Option<backend::AudioGraph>> = RefCell::new(None);
}

/// [`CueSink`] backed by the shared audio graph.
#[derive(Debug)]
pub struct ToneGenerator {
    gain: f32,
}

impl ToneGenerator {
    pub fn new(gain: f32) -> Self {
        Self { gain }
    }

    #[cfg(test)]
    fn is_ready() -> bool {
        GRAPH.with(|cell| cell.borrow().is_some())
    }
}

impl CueSink for ToneGenerator {
    fn play(&mut self, cue: Cue) {
        if let Err(err) = with_graph(self.gain, |graph| graph.play(&cue)) {
            log::debug!("cue {cue:?} dropped: {err}");
        }
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.gain = gain;
        // Only ramp an existing graph; volume changes alone never open a context.
        GRAPH.with(|cell| {
            if let Some(graph) = cell.borrow().as_ref() {
                graph.ramp_gain(gain);
            }
        });
    }
}

fn with_graph<T>(
    gain: f32,
    f: impl FnOnce(&backend::AudioGraph) -> Result<T, AudioError>,
) -> Result<T, AudioError> {
    GRAPH.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(backend::AudioGraph::new(gain)?);
        }
        match slot.as_ref() {
            Some(graph) => f(graph),
            None => Err(AudioError::Unsupported),
        }
    })
}

#[cfg(target_arch = "wasm32")]
mod backend {
    use wasm_bindgen::JsValue;
    use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorType};

    use super::GAIN_RAMP_SECS;
    use crate::error::AudioError;
    use crate::tone::{Cue, ENVELOPE_FLOOR, Voice, Waveform};

    fn node_err(err: JsValue) -> AudioError {
        AudioError::Node(format!("{err:?}"))
    }

    pub(super) struct AudioGraph {
        ctx: AudioContext,
        master: GainNode,
    }

    impl AudioGraph {
        pub(super) fn new(gain: f32) -> Result<Self, AudioError> {
            let ctx = AudioContext::new().map_err(|e| AudioError::Context(format!("{e:?}")))?;
            let master = ctx.create_gain().map_err(node_err)?;
            master.gain().set_value(gain);
            master
                .connect_with_audio_node(&ctx.destination())
                .map_err(node_err)?;
            log::info!("audio context ready");
            Ok(Self { ctx, master })
        }

        pub(super) fn ramp_gain(&self, gain: f32) {
            let now = self.ctx.current_time();
            let _ = self.master.gain().set_target_at_time(gain, now, GAIN_RAMP_SECS);
        }

        pub(super) fn play(&self, cue: &Cue) -> Result<(), AudioError> {
            if self.ctx.state() == AudioContextState::Suspended {
                let _ = self.ctx.resume();
            }
            let now = self.ctx.current_time();
            for voice in cue.voices() {
                self.voice(&voice, now)?;
            }
            Ok(())
        }

        fn voice(&self, v: &Voice, now: f64) -> Result<(), AudioError> {
            let osc = self.ctx.create_oscillator().map_err(node_err)?;
            let env = self.ctx.create_gain().map_err(node_err)?;
            osc.set_type(match v.waveform {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Triangle => OscillatorType::Triangle,
                Waveform::Sawtooth => OscillatorType::Sawtooth,
            });

            let start = now + v.offset_secs;
            let end = start + v.stop_secs;
            let freq = osc.frequency();
            freq.set_value_at_time(v.freq_start_hz, start)
                .map_err(node_err)?;
            if v.sweep_secs > 0.0 {
                freq.exponential_ramp_to_value_at_time(v.freq_end_hz, start + v.sweep_secs)
                    .map_err(node_err)?;
            }

            let g = env.gain();
            g.set_value_at_time(ENVELOPE_FLOOR, start).map_err(node_err)?;
            g.exponential_ramp_to_value_at_time(v.peak, start + v.attack_secs)
                .map_err(node_err)?;
            g.exponential_ramp_to_value_at_time(ENVELOPE_FLOOR, end)
                .map_err(node_err)?;

            osc.connect_with_audio_node(&env).map_err(node_err)?;
            env.connect_with_audio_node(&self.master).map_err(node_err)?;
            osc.start_with_when(start).map_err(node_err)?;
            osc.stop_with_when(end).map_err(node_err)?;
            Ok(())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod backend {
    use crate::error::AudioError;
    use crate::tone::Cue;

    pub(super) struct AudioGraph;

    impl AudioGraph {
        pub(super) fn new(_gain: f32) -> Result<Self, AudioError> {
            Err(AudioError::Unsupported)
        }

        pub(super) fn ramp_gain(&self, _gain: f32) {}

        pub(super) fn play(&self, _cue: &Cue) -> Result<(), AudioError> {
            Ok(())
        }
    }
}
