//! Deterministic pseudo-random source for per-stage decorrelation.
//!
//! Every randomized aspect of the reverb - stage delays, modulation
//! detuning, tap gains and positions - is drawn from sequences produced
//! here. The generator is purely a function of seed and call count, so the
//! entire diffusion character is reproducible from the seeds.
//!
//! The LCG update `x = (22695477*x + 1) mod 2^32` is a compatibility
//! contract, not an implementation detail: substituting another generator
//! changes the sound of every preset.

/// Linear-congruential pseudo-random generator.
///
/// 64-bit register, 32-bit modulus. Outputs are normalized to [0, 1] by
/// dividing the low 32 bits by `u32::MAX`.
#[derive(Debug, Clone)]
pub struct LcgRandom {
    x: u64,
}

const LCG_A: u64 = 22_695_477;
const LCG_C: u64 = 1;

impl LcgRandom {
    /// Create a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self { x: seed }
    }

    /// Advance the register and return the next 32-bit value.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.x = (LCG_A.wrapping_mul(self.x).wrapping_add(LCG_C)) & 0xFFFF_FFFF;
        self.x as u32
    }

    /// Advance the register and return a float in [0, 1].
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        self.next_u32() as f32 / u32::MAX as f32
    }
}

/// Seeded random sequence generation into caller-provided storage.
///
/// Consumers hold fixed-size seed-value arrays and refill them whenever
/// their seed or cross-seed changes; nothing here ever touches the audio
/// path.
pub struct RandomBuffer;

impl RandomBuffer {
    /// Fill `output` with the sequence produced by `seed`.
    pub fn fill(seed: u64, output: &mut [f32]) {
        let mut rng = LcgRandom::new(seed);
        for slot in output.iter_mut() {
            *slot = rng.next_f32();
        }
    }

    /// Fill `output` by blending the `seed` sequence with the sequence of
    /// the bitwise-complement seed.
    ///
    /// At `cross_seed = 0` this equals `fill(seed, ..)`; at `cross_seed = 1`
    /// it equals `fill(!seed, ..)`. Both generators are streamed in
    /// lockstep, so no temporary storage is needed.
    pub fn fill_cross(seed: u64, cross_seed: f32, output: &mut [f32]) {
        let mut rng_a = LcgRandom::new(seed);
        let mut rng_b = LcgRandom::new(!seed);
        for slot in output.iter_mut() {
            let a = rng_a.next_f32();
            let b = rng_b.next_f32();
            *slot = a * (1.0 - cross_seed) + b * cross_seed;
        }
    }
}
