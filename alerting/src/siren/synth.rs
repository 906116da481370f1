//! Two-tone siren waveform synthesis.
//!
//! Pure functions, no I/O, no shared state. One cycle sweeps linearly from
//! the low tone up to the high tone over the first half of the buffer and
//! back down over the second half; the render loop repeats the buffer, so the
//! output is periodic with the cycle length.

use crate::config::SirenParams;

/// Peak amplitude as a fraction of `i16::MAX`, leaving 5% headroom so the
/// output never clips.
pub const MAX_AMPLITUDE: f64 = 0.95;

/// Amplitude of the fallback tone pulse. Quieter than the siren on purpose:
/// the pulse is the degraded signal and should be recognizable as such.
const PULSE_AMPLITUDE: f64 = 0.8;

/// Generate one full hi-lo siren cycle as signed 16-bit PCM.
///
/// The buffer holds `sample_rate * cycle_ms / 1000` samples. Phase
/// accumulates `2π·f(i)/sample_rate` per sample and is wrapped modulo `2π`
/// so it never grows without bound.
pub fn generate_cycle(params: &SirenParams) -> Vec<i16> {
    let samples = params.samples_per_cycle();
    let half = samples / 2;
    let mut buffer = Vec::with_capacity(samples);
    let mut phase = 0.0_f64;

    for i in 0..samples {
        let frequency = if i < half {
            // Rising sweep: low → high
            let progress = i as f64 / half as f64;
            params.low_hz + (params.high_hz - params.low_hz) * progress
        } else {
            // Falling sweep: high → low
            let progress = (i - half) as f64 / half as f64;
            params.high_hz - (params.high_hz - params.low_hz) * progress
        };

        phase += 2.0 * std::f64::consts::PI * frequency / params.sample_rate as f64;
        if phase > 2.0 * std::f64::consts::PI {
            phase -= 2.0 * std::f64::consts::PI;
        }

        buffer.push((phase.sin() * i16::MAX as f64 * MAX_AMPLITUDE) as i16);
    }

    buffer
}

/// Generate the fallback tone pulse: two alternating fixed-frequency bursts
/// separated by short gaps.
///
/// Used when the primary audio sink cannot be opened. Deliberately simpler
/// and quieter than the siren, but never silent.
pub fn generate_tone_pulse(sample_rate: u32) -> Vec<i16> {
    let mut buffer = Vec::new();
    append_burst(&mut buffer, sample_rate, 880.0, 600);
    append_gap(&mut buffer, sample_rate, 150);
    append_burst(&mut buffer, sample_rate, 660.0, 500);
    append_gap(&mut buffer, sample_rate, 150);
    buffer
}

fn append_burst(buffer: &mut Vec<i16>, sample_rate: u32, frequency: f64, duration_ms: u64) {
    let samples = (sample_rate as u64 * duration_ms / 1000) as usize;
    let mut phase = 0.0_f64;
    for _ in 0..samples {
        phase += 2.0 * std::f64::consts::PI * frequency / sample_rate as f64;
        if phase > 2.0 * std::f64::consts::PI {
            phase -= 2.0 * std::f64::consts::PI;
        }
        buffer.push((phase.sin() * i16::MAX as f64 * PULSE_AMPLITUDE) as i16);
    }
}

fn append_gap(buffer: &mut Vec<i16>, sample_rate: u32, duration_ms: u64) {
    let samples = (sample_rate as u64 * duration_ms / 1000) as usize;
    buffer.extend(std::iter::repeat(0).take(samples));
}
