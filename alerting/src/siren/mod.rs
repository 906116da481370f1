//! Siren synthesis and streaming.
//!
//! `synth` is the pure waveform generator; `stream` owns the blocking render
//! loop that feeds an audio sink until cancelled.

pub mod stream;
pub mod synth;

pub use stream::{run_render_loop, spawn_render_loop};
pub use synth::{generate_cycle, generate_tone_pulse, MAX_AMPLITUDE};
