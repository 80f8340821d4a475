//! Late-reverb delay line: modulated delay, in-loop diffusion, and
//! feedback damping.
//!
//! The feedback path is block-granular. Each processed block is pushed onto
//! a small queue and popped one call later, so the loop gain is applied to
//! the signal from the previous block. This keeps the feedback read causal
//! without per-sample bookkeeping and reproduces a one-block loop latency.

use crate::BLOCK_SIZE;
use crate::diffuser::AllpassDiffuser;
use crate::modulated_delay::ModulatedDelay;
use crate::one_pole::OnePoleLowpass;
use crate::shelf::{ShelfFilter, ShelfType};

/// Fixed-capacity FIFO holding up to two blocks of samples.
///
/// Popping from an empty queue yields silence, which seeds the feedback
/// loop on the first block after a reset.
#[derive(Debug, Clone)]
pub struct BlockQueue {
    buffer: [f32; 2 * BLOCK_SIZE],
    read: usize,
    count: usize,
}

impl BlockQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            buffer: [0.0; 2 * BLOCK_SIZE],
            read: 0,
            count: 0,
        }
    }

    /// Append a block of samples. Panics if the queue is full.
    pub fn push(&mut self, block: &[f32]) {
        debug_assert!(self.count + block.len() <= self.buffer.len());
        let mut write = (self.read + self.count) % self.buffer.len();
        for &sample in block {
            self.buffer[write] = sample;
            write = (write + 1) % self.buffer.len();
        }
        self.count += block.len();
    }

    /// Remove up to `out.len()` samples; slots with no queued data are zeroed.
    pub fn pop(&mut self, out: &mut [f32]) {
        for slot in out.iter_mut() {
            if self.count == 0 {
                *slot = 0.0;
            } else {
                *slot = self.buffer[self.read];
                self.read = (self.read + 1) % self.buffer.len();
                self.count -= 1;
            }
        }
    }

    /// Drop all queued samples.
    pub fn clear(&mut self) {
        self.read = 0;
        self.count = 0;
        self.buffer.fill(0.0);
    }
}

impl Default for BlockQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// One feedback delay line of the late reverb network.
#[derive(Debug, Clone)]
pub struct DelayLine {
    delay: ModulatedDelay,
    diffuser: AllpassDiffuser,
    low_shelf: ShelfFilter,
    high_shelf: ShelfFilter,
    lowpass: OnePoleLowpass,
    feedback_queue: BlockQueue,

    feedback: f32,

    /// Run the in-loop diffuser.
    pub diffuser_enabled: bool,
    /// Apply the low-shelf filter inside the loop.
    pub low_shelf_enabled: bool,
    /// Apply the high-shelf filter inside the loop.
    pub high_shelf_enabled: bool,
    /// Apply the one-pole damping filter inside the loop.
    pub cutoff_enabled: bool,
    /// Tap the line output after diffusion and filtering rather than
    /// directly off the modulated delay.
    pub late_stage_tap: bool,
}

impl DelayLine {
    /// Create a delay line at `sample_rate`, seeding the modulation phases
    /// of the delay and the in-loop diffuser from `phase_seed`.
    pub fn new(sample_rate: f32, phase_seed: u64) -> Self {
        let mut low_shelf = ShelfFilter::new(ShelfType::LowShelf, sample_rate);
        low_shelf.set_frequency(20.0);
        low_shelf.set_gain_db(-20.0);
        let mut high_shelf = ShelfFilter::new(ShelfType::HighShelf, sample_rate);
        high_shelf.set_frequency(19_000.0);
        high_shelf.set_gain_db(-20.0);

        Self {
            delay: ModulatedDelay::new(phase_seed),
            diffuser: AllpassDiffuser::new(sample_rate, phase_seed.wrapping_add(101)),
            low_shelf,
            high_shelf,
            lowpass: OnePoleLowpass::new(sample_rate, 1000.0),
            feedback_queue: BlockQueue::new(),
            feedback: 0.0,
            diffuser_enabled: false,
            low_shelf_enabled: false,
            high_shelf_enabled: false,
            cutoff_enabled: false,
            late_stage_tap: false,
        }
    }

    /// Set the base delay in samples.
    pub fn set_delay(&mut self, samples: usize) {
        self.delay.sample_delay = samples;
    }

    /// Set the loop gain applied to the fed-back block.
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback;
    }

    /// Set the delay modulation depth in samples.
    pub fn set_mod_amount(&mut self, amount: f32) {
        self.delay.mod_amount = amount;
    }

    /// Set the delay modulation rate in cycles per sample.
    pub fn set_mod_rate(&mut self, rate: f32) {
        self.delay.mod_rate = rate;
    }

    /// Set the in-loop diffuser stage delay in samples.
    pub fn set_diffuser_delay(&mut self, samples: usize) {
        self.diffuser.set_delay(samples);
    }

    /// Set the in-loop diffuser feedback.
    pub fn set_diffuser_feedback(&mut self, feedback: f32) {
        self.diffuser.set_feedback(feedback);
    }

    /// Set the number of active diffuser stages.
    pub fn set_diffuser_stages(&mut self, stages: usize) {
        self.diffuser.stages = stages;
    }

    /// Re-seed the in-loop diffuser.
    pub fn set_diffuser_seed(&mut self, seed: u64) {
        self.diffuser.set_seed(seed);
    }

    /// Set the diffuser cross-seed blend.
    pub fn set_diffuser_cross_seed(&mut self, cross_seed: f32) {
        self.diffuser.set_cross_seed(cross_seed);
    }

    /// Set the diffuser modulation depth in samples.
    pub fn set_diffuser_mod_amount(&mut self, amount: f32) {
        self.diffuser.set_mod_amount(amount);
        self.diffuser.set_modulation(amount > 0.0);
    }

    /// Set the diffuser modulation rate in Hz.
    pub fn set_diffuser_mod_rate(&mut self, rate_hz: f32) {
        self.diffuser.set_mod_rate(rate_hz);
    }

    /// Configure the in-loop low shelf.
    pub fn set_low_shelf(&mut self, frequency_hz: f32, gain_db: f32) {
        self.low_shelf.set_frequency(frequency_hz);
        self.low_shelf.set_gain_db(gain_db);
    }

    /// Configure the in-loop high shelf.
    pub fn set_high_shelf(&mut self, frequency_hz: f32, gain_db: f32) {
        self.high_shelf.set_frequency(frequency_hz);
        self.high_shelf.set_gain_db(gain_db);
    }

    /// Set the one-pole damping cutoff in Hz.
    pub fn set_cutoff(&mut self, frequency_hz: f32) {
        self.lowpass.set_cutoff(frequency_hz);
    }

    /// Update the sample rate for the in-loop diffuser and filters.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.diffuser.set_sample_rate(sample_rate);
        self.low_shelf.set_sample_rate(sample_rate);
        self.high_shelf.set_sample_rate(sample_rate);
        self.lowpass.set_sample_rate(sample_rate);
    }

    /// Process one block, writing the tapped line output to `output`.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());
        debug_assert!(input.len() <= BLOCK_SIZE);
        let n = input.len();

        let mut mixed = [0.0f32; BLOCK_SIZE];
        self.feedback_queue.pop(&mut mixed[..n]);
        for i in 0..n {
            mixed[i] = input[i] + mixed[i] * self.feedback;
        }

        self.delay.process(&mut mixed[..n]);

        if !self.late_stage_tap {
            output[..n].copy_from_slice(&mixed[..n]);
        }

        if self.diffuser_enabled {
            self.diffuser.process(&mut mixed[..n]);
        }
        if self.low_shelf_enabled {
            self.low_shelf.process(&mut mixed[..n]);
        }
        if self.high_shelf_enabled {
            self.high_shelf.process(&mut mixed[..n]);
        }
        if self.cutoff_enabled {
            self.lowpass.process(&mut mixed[..n]);
        }

        self.feedback_queue.push(&mixed[..n]);

        if self.late_stage_tap {
            output[..n].copy_from_slice(&mixed[..n]);
        }
    }

    /// Reset all internal state, including the feedback queue.
    pub fn clear(&mut self) {
        self.delay.clear();
        self.diffuser.clear();
        self.low_shelf.clear();
        self.high_shelf.clear();
        self.lowpass.clear();
        self.feedback_queue.clear();
    }
}
