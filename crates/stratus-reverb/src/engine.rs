//! Stereo engine: parameter mapping and block processing.
//!
//! The engine owns two [`ReverbChannel`]s and a normalized parameter set.
//! Every structural parameter change re-derives the full signal network
//! from the stored controls; the derivation is pure, so setting the same
//! values always produces the same network.

use stratus_dsp::{BLOCK_SIZE, resp2dec, resp3dec, resp4oct};

use crate::channel::ReverbChannel;
use crate::params::{ParamKey, ReverbParams};

/// Modulation phase seed for the left channel's components.
const LEFT_PHASE_SEED: u64 = 1;
/// Modulation phase seed for the right channel's components. Spaced far
/// enough from the left seed that no component on either side shares a
/// phase seed with any component on the other.
const RIGHT_PHASE_SEED: u64 = 1000;

/// The stereo reverb.
pub struct ReverbEngine {
    params: ReverbParams,
    left: ReverbChannel,
    right: ReverbChannel,
    sample_rate: f32,
}

impl ReverbEngine {
    /// Create an engine at the given sample rate with default parameters,
    /// with the network fully derived and ready to process.
    pub fn new(sample_rate: f32) -> Self {
        let mut engine = Self {
            params: ReverbParams::default(),
            left: ReverbChannel::new(sample_rate, false, LEFT_PHASE_SEED),
            right: ReverbChannel::new(sample_rate, true, RIGHT_PHASE_SEED),
            sample_rate,
        };
        engine.apply_parameters();
        engine
    }

    /// Sample rate the engine was built for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// The current normalized parameter set.
    pub fn params(&self) -> &ReverbParams {
        &self.params
    }

    /// Read one normalized parameter.
    pub fn get_param(&self, key: ParamKey) -> f32 {
        self.params.get(key)
    }

    /// Store one normalized parameter (clamped to `[0, 1]`) and, for all
    /// keys except `mix`, re-derive the signal network.
    pub fn set_param(&mut self, key: ParamKey, value: f32) {
        self.params.set(key, value);
        if key.reshapes_network() {
            self.apply_parameters();
        }
    }

    /// Map the normalized controls onto the signal network.
    ///
    /// Perceptual response curves spread each control's useful range over
    /// the full knob travel: two-decade curves for times and rates, three
    /// decades for decay, four octaves for the filter cutoffs.
    fn apply_parameters(&mut self) {
        let sr = self.sample_rate;
        let p = self.params;

        // Pre-delay: 0-500 ms.
        let predelay_ms = resp2dec(p.predelay) * 500.0;
        let mut predelay_samples = (predelay_ms / 1000.0 * sr) as usize;
        if predelay_samples < 1 {
            predelay_samples = 1;
        }

        // Room size: 20-1000 ms base line delay.
        let line_size_ms = 20.0 + resp2dec(p.size) * 980.0;
        let line_delay_samples = (line_size_ms / 1000.0 * sr) as usize;

        // Decay: 0.05-60 seconds.
        let decay_seconds = 0.05 + resp3dec(p.decay) * 59.95;
        let line_decay_samples = decay_seconds * sr;

        // Modulation: up to 2.5 ms of depth, up to 5 Hz of rate. The same
        // settings drive the line delays and the in-loop diffusers.
        let mod_amount = p.mod_amount * 2.5 * sr / 1000.0;
        let mod_rate = resp2dec(p.mod_rate) * 5.0;

        let diffuser_stages = 4 + (p.diffusion * 7.999) as usize;
        let diffuser_delay = ((10.0 + p.size * 90.0) / 1000.0 * sr) as usize;

        let low_cut_hz = 20.0 + resp4oct(p.low_cut) * 980.0;
        let high_cut_hz = 400.0 + resp4oct(p.high_cut) * 19_600.0;
        let damping_hz = 400.0 + resp4oct(p.high_cut * 0.8) * 19_600.0;

        for channel in [&mut self.left, &mut self.right] {
            channel.set_predelay(predelay_samples);
            channel.update_lines(
                line_delay_samples,
                line_decay_samples,
                mod_amount,
                mod_rate,
                mod_amount,
                mod_rate,
            );

            channel.set_diffuser_stages(diffuser_stages);
            channel.set_diffuser_delay(diffuser_delay);
            channel.set_diffuser_feedback(p.diffusion);
            channel.set_diffuser_mod_amount(mod_amount);
            channel.set_diffuser_mod_rate(mod_rate);

            channel.set_low_cut(low_cut_hz);
            channel.set_high_cut(high_cut_hz);

            channel.set_cross_seed(p.cross_seed);
            channel.update_post_diffusion();

            channel.set_line_damping(damping_hz);

            channel.dry_out = 0.0;
            channel.line_out = 1.0;
        }
    }

    /// Process a stereo block in place, applying the dry/wet mix and
    /// clamping the result to `[-1, 1]`.
    ///
    /// `left` and `right` must be the same length; any length is accepted
    /// and chunked internally into sub-blocks of at most [`BLOCK_SIZE`].
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());
        let mix = self.params.mix;
        let dry = 1.0 - mix;

        let mut offset = 0;
        while offset < left.len() {
            let n = (left.len() - offset).min(BLOCK_SIZE);
            let mut wet_l = [0.0f32; BLOCK_SIZE];
            let mut wet_r = [0.0f32; BLOCK_SIZE];

            self.left.process(&left[offset..offset + n], &mut wet_l[..n]);
            self.right.process(&right[offset..offset + n], &mut wet_r[..n]);

            for i in 0..n {
                left[offset + i] =
                    (left[offset + i] * dry + wet_l[i] * mix).clamp(-1.0, 1.0);
                right[offset + i] =
                    (right[offset + i] * dry + wet_r[i] * mix).clamp(-1.0, 1.0);
            }
            offset += n;
        }
    }

    /// Silence both channels without disturbing parameters or seeds.
    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}
