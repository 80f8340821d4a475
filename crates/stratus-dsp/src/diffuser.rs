//! Series cascade of randomized modulated allpass stages.
//!
//! Up to twelve allpasses in series smear a transient into a dense,
//! directionless texture. Identical delay and modulation across stages
//! would comb-filter audibly; instead each stage draws its delay scale and
//! modulation detuning from disjoint offsets of one seeded random buffer,
//! so the stages decorrelate into smooth diffusion while remaining fully
//! reproducible from (seed, cross-seed).

use libm::powf;

use crate::modulated_allpass::ModulatedAllpass;
use crate::rand::RandomBuffer;

/// Maximum number of allpass stages in the cascade.
pub const MAX_STAGE_COUNT: usize = 12;

/// Seed values consumed per stage: delay scale, mod-amount scale, mod-rate
/// scale, at disjoint offsets.
const SEEDS_PER_STAGE: usize = 3;

/// Randomized series allpass diffuser.
#[derive(Debug, Clone)]
pub struct AllpassDiffuser {
    filters: [ModulatedAllpass; MAX_STAGE_COUNT],
    seed_values: [f32; MAX_STAGE_COUNT * SEEDS_PER_STAGE],
    sample_rate: f32,
    delay: usize,
    mod_rate: f32,
    seed: u64,
    cross_seed: f32,
    /// Number of participating stages (1..=12).
    pub stages: usize,
}

impl AllpassDiffuser {
    /// Create a diffuser; `phase_seed` decorrelates the stage LFO phases
    /// between diffuser instances.
    pub fn new(sample_rate: f32, phase_seed: u64) -> Self {
        let mut i = 0u64;
        let filters = core::array::from_fn(|_| {
            i += 1;
            ModulatedAllpass::new(phase_seed.wrapping_add(i))
        });

        let mut d = Self {
            filters,
            seed_values: [0.0; MAX_STAGE_COUNT * SEEDS_PER_STAGE],
            sample_rate,
            delay: 100,
            mod_rate: 0.0,
            seed: 23456,
            cross_seed: 0.0,
            stages: 1,
        };
        d.update_seeds();
        d
    }

    /// Re-seed the per-stage randomization and re-derive stage delays.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.update_seeds();
    }

    /// Set the cross-seed blend factor and re-derive stage delays.
    pub fn set_cross_seed(&mut self, cross_seed: f32) {
        self.cross_seed = cross_seed;
        self.update_seeds();
    }

    /// Set the total diffuser delay; each stage takes a log-distributed
    /// share in [0.1, 1.0] of it.
    pub fn set_delay(&mut self, samples: usize) {
        self.delay = samples;
        self.update_stage_delays();
    }

    /// Set the feedback coefficient on every stage.
    pub fn set_feedback(&mut self, feedback: f32) {
        for f in &mut self.filters {
            f.feedback = feedback;
        }
    }

    /// Enable or disable tap interpolation on every stage.
    pub fn set_interpolation(&mut self, enabled: bool) {
        for f in &mut self.filters {
            f.interpolation_enabled = enabled;
        }
    }

    /// Enable or disable modulation on every stage.
    pub fn set_modulation(&mut self, enabled: bool) {
        for f in &mut self.filters {
            f.modulation_enabled = enabled;
        }
    }

    /// Set the modulation depth; each stage is detuned by ±15%.
    pub fn set_mod_amount(&mut self, amount: f32) {
        for i in 0..MAX_STAGE_COUNT {
            let scale = 0.85 + 0.3 * self.seed_values[MAX_STAGE_COUNT + i];
            self.filters[i].mod_amount = amount * scale;
        }
    }

    /// Set the modulation rate in Hz; each stage is detuned by ±15%.
    pub fn set_mod_rate(&mut self, rate_hz: f32) {
        self.mod_rate = rate_hz;
        for i in 0..MAX_STAGE_COUNT {
            let scale = 0.85 + 0.3 * self.seed_values[MAX_STAGE_COUNT * 2 + i];
            self.filters[i].mod_rate = rate_hz * scale / self.sample_rate;
        }
    }

    /// Update the sample rate; per-sample modulation rates depend on it.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.set_mod_rate(self.mod_rate);
    }

    fn update_seeds(&mut self) {
        RandomBuffer::fill_cross(self.seed, self.cross_seed, &mut self.seed_values);
        self.update_stage_delays();
    }

    fn update_stage_delays(&mut self) {
        for i in 0..MAX_STAGE_COUNT {
            let r = self.seed_values[i];
            // 10^r * 0.1 spans [0.1, 1.0], log-distributed.
            let scale = powf(10.0, r) * 0.1;
            let stage_delay = (self.delay as f32 * scale) as usize;
            self.filters[i].sample_delay = stage_delay.max(1);
        }
    }

    /// Process a block in place through the first `stages` allpasses.
    pub fn process(&mut self, block: &mut [f32]) {
        for filter in self.filters.iter_mut().take(self.stages) {
            filter.process(block);
        }
    }

    /// Zero all stage buffers.
    pub fn clear(&mut self) {
        for f in &mut self.filters {
            f.clear();
        }
    }
}
