//! Allpass element with periodically modulated fractional delay.
//!
//! The workhorse of the diffuser network. A Schroeder-style allpass whose
//! delay center drifts sinusoidally: every [`MODULATION_UPDATE_RATE`]
//! samples the phase advances and two adjacent integer taps with
//! complementary linear gains are derived from the fractional delay. The
//! allpass recurrence then uses the (optionally interpolated) modulated
//! read as its delayed value:
//!
//! ```text
//! write = in + feedback * delayed
//! out   = delayed - feedback * write
//! ```

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

use libm::{fmodf, sinf};

use crate::rand::LcgRandom;
use crate::{ALLPASS_BUFFER_SIZE, MODULATION_UPDATE_RATE};

/// Modulated fractional-delay allpass filter.
///
/// The buffer capacity is the fixed [`ALLPASS_BUFFER_SIZE`] constant; it
/// accommodates the maximum base delay plus modulation excursion and is
/// deliberately not derived from the sample rate.
#[derive(Debug, Clone)]
pub struct ModulatedAllpass {
    buffer: Vec<f32>,
    index: usize,
    samples_since_update: usize,

    mod_phase: f32,
    delay_a: usize,
    delay_b: usize,
    gain_a: f32,
    gain_b: f32,

    /// Base delay in samples.
    pub sample_delay: usize,
    /// Allpass feedback coefficient.
    pub feedback: f32,
    /// Modulation depth in samples.
    pub mod_amount: f32,
    /// Modulation rate in cycles per sample.
    pub mod_rate: f32,
    /// Blend both taps (true) or read only the lower tap (false).
    pub interpolation_enabled: bool,
    /// Run the modulated path (true) or the fixed-tap path (false).
    pub modulation_enabled: bool,
}

impl ModulatedAllpass {
    /// Create an allpass with a deterministic initial modulation phase.
    ///
    /// The phase lands in [0.01, 0.99] so stages constructed with different
    /// `phase_seed` values start decorrelated but reproducibly so.
    pub fn new(phase_seed: u64) -> Self {
        let mut rng = LcgRandom::new(phase_seed);
        let mut ap = Self {
            buffer: vec![0.0; ALLPASS_BUFFER_SIZE],
            index: ALLPASS_BUFFER_SIZE - 1,
            samples_since_update: 0,
            mod_phase: 0.01 + 0.98 * rng.next_f32(),
            delay_a: 0,
            delay_b: 0,
            gain_a: 0.0,
            gain_b: 0.0,
            sample_delay: 100,
            feedback: 0.5,
            mod_amount: 0.0,
            mod_rate: 0.0,
            interpolation_enabled: true,
            modulation_enabled: true,
        };
        ap.update_taps();
        ap
    }

    /// Advance the modulation phase and re-derive the two read taps.
    fn update_taps(&mut self) {
        self.mod_phase += self.mod_rate * MODULATION_UPDATE_RATE as f32;
        if self.mod_phase > 1.0 {
            self.mod_phase = fmodf(self.mod_phase, 1.0);
        }

        let modulation = sinf(self.mod_phase * core::f32::consts::TAU);

        // Depth may never reach the base delay, or the total could go
        // non-positive at the trough.
        let mut amount = self.mod_amount;
        if amount >= self.sample_delay as f32 {
            amount = self.sample_delay as f32 - 1.0;
        }

        let mut total_delay = self.sample_delay as f32 + amount * modulation;
        if total_delay <= 0.0 {
            total_delay = 1.0;
        }

        self.delay_a = total_delay as usize;
        self.delay_b = self.delay_a + 1;

        let partial = total_delay - self.delay_a as f32;
        self.gain_a = 1.0 - partial;
        self.gain_b = partial;
    }

    /// Process a block in place.
    pub fn process(&mut self, block: &mut [f32]) {
        if self.modulation_enabled {
            self.process_modulated(block);
        } else {
            self.process_fixed(block);
        }
    }

    fn process_fixed(&mut self, block: &mut [f32]) {
        let len = self.buffer.len();
        let mut delayed_index = (self.index + len - self.sample_delay) % len;

        for sample in block.iter_mut() {
            let delayed = self.buffer[delayed_index];
            let written = *sample + delayed * self.feedback;

            self.buffer[self.index] = written;
            *sample = delayed - written * self.feedback;

            self.index += 1;
            delayed_index += 1;
            if self.index >= len {
                self.index -= len;
            }
            if delayed_index >= len {
                delayed_index -= len;
            }
            self.samples_since_update += 1;
        }
    }

    fn process_modulated(&mut self, block: &mut [f32]) {
        let len = self.buffer.len();

        for sample in block.iter_mut() {
            if self.samples_since_update >= MODULATION_UPDATE_RATE {
                self.update_taps();
                self.samples_since_update = 0;
            }

            let delayed = if self.interpolation_enabled {
                let idx_a = (self.index + len - self.delay_a) % len;
                let idx_b = (self.index + len - self.delay_b) % len;
                self.buffer[idx_a] * self.gain_a + self.buffer[idx_b] * self.gain_b
            } else {
                let idx_a = (self.index + len - self.delay_a) % len;
                self.buffer[idx_a]
            };

            let written = *sample + delayed * self.feedback;
            self.buffer[self.index] = written;
            *sample = delayed - written * self.feedback;

            self.index += 1;
            if self.index >= len {
                self.index -= len;
            }
            self.samples_since_update += 1;
        }
    }

    /// Zero the delay buffer.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(ap: &mut ModulatedAllpass, input: &[f32]) -> Vec<f32> {
        let mut block = input.to_vec();
        ap.process(&mut block);
        block
    }

    #[test]
    fn zero_feedback_outputs_delayed_input() {
        // With feedback = 0 the written value equals the input and the
        // output equals the buffer read: a pure delay.
        let mut ap = ModulatedAllpass::new(1);
        ap.feedback = 0.0;
        ap.modulation_enabled = false;
        ap.sample_delay = 10;

        let mut input = vec![0.0f32; 64];
        input[0] = 1.0;
        let out = feed(&mut ap, &input);

        assert_eq!(out[10], 1.0);
        for (i, s) in out.iter().enumerate() {
            if i != 10 {
                assert_eq!(*s, 0.0, "unexpected energy at {i}");
            }
        }
    }

    #[test]
    fn modulated_zero_amount_matches_fixed_delay() {
        let mut ap = ModulatedAllpass::new(7);
        ap.feedback = 0.0;
        ap.modulation_enabled = true;
        ap.mod_amount = 0.0;
        ap.mod_rate = 0.0;
        ap.sample_delay = 25;

        let mut input = vec![0.0f32; 128];
        input[0] = 1.0;
        let out = feed(&mut ap, &input);
        assert!((out[25] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn impulse_response_is_allpass_shaped() {
        let mut ap = ModulatedAllpass::new(3);
        ap.feedback = 0.5;
        ap.modulation_enabled = false;
        ap.sample_delay = 8;

        let mut input = vec![0.0f32; 32];
        input[0] = 1.0;
        let out = feed(&mut ap, &input);

        // Direct term: -feedback * input at n=0, then the delayed impulse.
        assert!((out[0] + 0.5).abs() < 1e-6);
        assert!(out[8].abs() > 0.5);
    }

    #[test]
    fn deterministic_given_same_seed() {
        let make = || {
            let mut ap = ModulatedAllpass::new(42);
            ap.sample_delay = 50;
            ap.mod_amount = 10.0;
            ap.mod_rate = 0.003;
            ap
        };
        let mut a = make();
        let mut b = make();
        let input: Vec<f32> = (0..512).map(|i| libm::sinf(i as f32 * 0.1)).collect();
        assert_eq!(feed(&mut a, &input), feed(&mut b, &input));
    }

    #[test]
    fn modulation_stays_finite_and_bounded() {
        let mut ap = ModulatedAllpass::new(9);
        ap.sample_delay = 200;
        ap.mod_amount = 150.0;
        ap.mod_rate = 0.01;
        ap.feedback = 0.7;

        let mut block: Vec<f32> = (0..4096).map(|i| if i < 64 { 0.5 } else { 0.0 }).collect();
        ap.process(&mut block);
        for s in block {
            assert!(s.is_finite());
            assert!(s.abs() < 4.0);
        }
    }

    #[test]
    fn depth_clamped_below_base_delay() {
        // Depth larger than the base delay must not read ahead of the
        // write cursor; total delay is floored to at least one sample.
        let mut ap = ModulatedAllpass::new(5);
        ap.sample_delay = 4;
        ap.mod_amount = 100.0;
        ap.mod_rate = 0.05;

        let mut block = vec![0.1f32; 1024];
        ap.process(&mut block);
        assert!(block.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn clear_silences_tail() {
        let mut ap = ModulatedAllpass::new(11);
        ap.sample_delay = 20;
        ap.modulation_enabled = false;
        let mut block = vec![1.0f32; 64];
        ap.process(&mut block);
        ap.clear();
        ap.feedback = 0.0;
        let mut silent = vec![0.0f32; 64];
        ap.process(&mut silent);
        assert!(silent.iter().all(|s| *s == 0.0));
    }
}
