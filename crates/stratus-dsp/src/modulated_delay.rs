//! Feedback-free modulated fractional delay.
//!
//! Same phase and tap mechanics as the modulated allpass, but a pure delay
//! read: two adjacent integer taps blended by the fractional part, with the
//! tap center recomputed every [`MODULATION_UPDATE_RATE`] samples. Used
//! standalone for pre-delay and as the main delay inside each delay line.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

use libm::{fmodf, sinf};

use crate::rand::LcgRandom;
use crate::{DELAY_BUFFER_SIZE, MODULATION_UPDATE_RATE};

/// Modulated fractional delay line.
///
/// Capacity is the fixed [`DELAY_BUFFER_SIZE`] constant - twice the allpass
/// capacity class - to support long pre-delay and line-delay ranges.
#[derive(Debug, Clone)]
pub struct ModulatedDelay {
    buffer: Vec<f32>,
    write_index: usize,
    samples_since_update: usize,

    mod_phase: f32,
    delay_a: usize,
    delay_b: usize,
    gain_a: f32,
    gain_b: f32,

    /// Base delay in samples.
    pub sample_delay: usize,
    /// Modulation depth in samples.
    pub mod_amount: f32,
    /// Modulation rate in cycles per sample.
    pub mod_rate: f32,
}

impl ModulatedDelay {
    /// Create a delay with a deterministic initial modulation phase.
    pub fn new(phase_seed: u64) -> Self {
        let mut rng = LcgRandom::new(phase_seed);
        let mut d = Self {
            buffer: vec![0.0; DELAY_BUFFER_SIZE],
            write_index: 0,
            samples_since_update: 0,
            mod_phase: 0.01 + 0.98 * rng.next_f32(),
            delay_a: 0,
            delay_b: 0,
            gain_a: 0.0,
            gain_b: 0.0,
            sample_delay: 100,
            mod_amount: 0.0,
            mod_rate: 0.0,
        };
        d.update_taps();
        d
    }

    fn update_taps(&mut self) {
        self.mod_phase += self.mod_rate * MODULATION_UPDATE_RATE as f32;
        if self.mod_phase > 1.0 {
            self.mod_phase = fmodf(self.mod_phase, 1.0);
        }

        let modulation = sinf(self.mod_phase * core::f32::consts::TAU);
        let total_delay = self.sample_delay as f32 + self.mod_amount * modulation;

        self.delay_a = total_delay as usize;
        self.delay_b = self.delay_a + 1;

        let partial = total_delay - self.delay_a as f32;
        self.gain_a = 1.0 - partial;
        self.gain_b = partial;
    }

    /// Process a block in place.
    pub fn process(&mut self, block: &mut [f32]) {
        let len = self.buffer.len();

        for sample in block.iter_mut() {
            if self.samples_since_update >= MODULATION_UPDATE_RATE {
                self.update_taps();
                self.samples_since_update = 0;
            }

            self.buffer[self.write_index] = *sample;

            let idx_a = (self.write_index + len - self.delay_a) % len;
            let idx_b = (self.write_index + len - self.delay_b) % len;
            *sample = self.buffer[idx_a] * self.gain_a + self.buffer[idx_b] * self.gain_b;

            self.write_index += 1;
            if self.write_index >= len {
                self.write_index -= len;
            }
            self.samples_since_update += 1;
        }
    }

    /// Zero the delay buffer.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
    }
}
