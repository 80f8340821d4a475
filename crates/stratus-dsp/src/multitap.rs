//! Randomized multi-tap delay for early-reflection clusters.
//!
//! Up to 256 taps read from one delay buffer. Each tap draws a triple from
//! the seeded random buffer: a sign, a gain in [-20, 0] dB, and a fractional
//! position offset. A position-dependent exponential envelope (scaled by the
//! `decay` control) shapes the cluster: flat at `decay = 0`, full falloff at
//! `decay = 1`.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

use libm::{expf, sqrtf};

use crate::DELAY_BUFFER_SIZE;
use crate::math::db_to_gain;
use crate::rand::RandomBuffer;

/// Maximum number of taps.
pub const MAX_TAPS: usize = 256;

/// Seed values consumed per tap: sign, gain, position offset.
const SEEDS_PER_TAP: usize = 3;

/// Randomized-gain/position multi-tap delay.
#[derive(Debug, Clone)]
pub struct MultitapDelay {
    buffer: Vec<f32>,
    tap_gains: [f32; MAX_TAPS],
    tap_positions: [f32; MAX_TAPS],
    seed_values: [f32; MAX_TAPS * SEEDS_PER_TAP],

    write_index: usize,
    seed: u64,
    cross_seed: f32,
    tap_count: usize,
    length_samples: f32,
    decay: f32,
}

impl MultitapDelay {
    /// Create a multitap delay with a single tap and a 1000-sample span.
    pub fn new() -> Self {
        let mut mt = Self {
            buffer: vec![0.0; DELAY_BUFFER_SIZE],
            tap_gains: [0.0; MAX_TAPS],
            tap_positions: [0.0; MAX_TAPS],
            seed_values: [0.0; MAX_TAPS * SEEDS_PER_TAP],
            write_index: 0,
            seed: 0,
            cross_seed: 0.0,
            tap_count: 1,
            length_samples: 1000.0,
            decay: 1.0,
        };
        mt.update_seeds();
        mt
    }

    /// Re-seed all tap attributes.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.update_seeds();
    }

    /// Set the cross-seed blend factor and re-derive tap attributes.
    pub fn set_cross_seed(&mut self, cross_seed: f32) {
        self.cross_seed = cross_seed;
        self.update_seeds();
    }

    /// Set the number of active taps (floored to 1).
    pub fn set_tap_count(&mut self, count: usize) {
        self.tap_count = count.clamp(1, MAX_TAPS);
        self.update_taps();
    }

    /// Set the total span of the tap cluster in samples (floored to 10).
    pub fn set_tap_length(&mut self, samples: usize) {
        self.length_samples = samples.max(10) as f32;
        self.update_taps();
    }

    /// Set the envelope decay amount in [0, 1].
    pub fn set_tap_decay(&mut self, decay: f32) {
        self.decay = decay;
    }

    fn update_seeds(&mut self) {
        RandomBuffer::fill_cross(self.seed, self.cross_seed, &mut self.seed_values);
        self.update_taps();
    }

    fn update_taps(&mut self) {
        let mut s = 0;
        for i in 0..MAX_TAPS {
            let sign = if self.seed_values[s] < 0.5 { 1.0 } else { -1.0 };
            s += 1;
            self.tap_gains[i] = db_to_gain(-20.0 + self.seed_values[s] * 20.0) * sign;
            s += 1;
            self.tap_positions[i] = i as f32 + self.seed_values[s];
            s += 1;
        }
    }

    /// Process a block in place.
    pub fn process(&mut self, block: &mut [f32]) {
        let len = self.buffer.len();
        let length_scaler = self.length_samples / self.tap_count as f32;
        let total_gain =
            3.0 / sqrtf(1.0 + self.tap_count as f32) * (1.0 + self.decay * 2.0);

        for sample in block.iter_mut() {
            self.buffer[self.write_index] = *sample;
            let mut acc = 0.0;

            for j in 0..self.tap_count {
                let offset = self.tap_positions[j] * length_scaler;
                let decay_effective = expf(-offset / self.length_samples * 3.3) * self.decay
                    + (1.0 - self.decay);
                let read_index = (self.write_index + len - offset as usize) % len;
                acc += self.buffer[read_index] * self.tap_gains[j] * decay_effective * total_gain;
            }

            *sample = acc;
            self.write_index = (self.write_index + 1) % len;
        }
    }

    /// Zero the delay buffer.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
    }
}

impl Default for MultitapDelay {
    fn default() -> Self {
        Self::new()
    }
}
