//! One-pole tone filters for input shaping and in-loop damping.
//!
//! A single-pole IIR pair with the recurrence:
//!
//! ```text
//! y[n] = b0 * x[n] + a1 * y[n-1]
//! ```
//!
//! where `nn = 2 - cos(2π f / fs)`, `a1 = nn - sqrt(nn² - 1)`, `b0 = 1 - a1`.
//! The highpass runs the same recurrence as an internal lowpass tap and
//! outputs `x[n] - lowpass[n]`.
//!
//! Both filters carry an exact-silence shortcut: when the input sample is
//! exactly zero and the internal state has decayed below a small epsilon,
//! the output is forced to exactly 0.0 instead of computing the recurrence.
//! This avoids denormal-float slowdowns and guarantees digital silence on
//! sustained silent input. The shortcut is part of the sound contract and
//! must not be "fixed".

use libm::{cosf, sqrtf};

/// Cutoff ceiling relative to the sample rate, to avoid instability near
/// Nyquist.
const MAX_CUTOFF_RATIO: f32 = 0.499;

fn pole_coefficients(cutoff_hz: f32, sample_rate: f32) -> (f32, f32) {
    let mut hz = cutoff_hz;
    if hz >= sample_rate * 0.5 {
        hz = sample_rate * MAX_CUTOFF_RATIO;
    }
    let x = core::f32::consts::TAU * hz / sample_rate;
    let nn = 2.0 - cosf(x);
    let alpha = nn - sqrtf(nn * nn - 1.0);
    // (b0, a1)
    (1.0 - alpha, alpha)
}

/// One-pole (6 dB/oct) lowpass filter.
///
/// # Example
///
/// ```rust
/// use stratus_dsp::OnePoleLowpass;
///
/// let mut lp = OnePoleLowpass::new(48000.0, 2000.0);
/// let out = lp.process_sample(1.0);
/// assert!(out < 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct OnePoleLowpass {
    sample_rate: f32,
    cutoff_hz: f32,
    b0: f32,
    a1: f32,
    output: f32,
}

impl OnePoleLowpass {
    /// Create a lowpass at the given sample rate and cutoff.
    pub fn new(sample_rate: f32, cutoff_hz: f32) -> Self {
        let mut f = Self {
            sample_rate,
            cutoff_hz,
            b0: 1.0,
            a1: 0.0,
            output: 0.0,
        };
        f.update();
        f
    }

    /// Set the cutoff frequency and recompute the coefficients.
    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz;
        self.update();
    }

    /// Current cutoff frequency in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    /// Change the sample rate and recompute the coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update();
    }

    fn update(&mut self) {
        let (b0, a1) = pole_coefficients(self.cutoff_hz, self.sample_rate);
        self.b0 = b0;
        self.a1 = a1;
    }

    /// Process one sample.
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        if input == 0.0 && self.output < 1e-7 {
            self.output = 0.0;
        } else {
            self.output = self.b0 * input + self.a1 * self.output;
        }
        self.output
    }

    /// Process a block in place.
    pub fn process(&mut self, block: &mut [f32]) {
        for sample in block.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Reset internal state to silence.
    pub fn clear(&mut self) {
        self.output = 0.0;
    }
}

/// One-pole highpass filter.
///
/// Runs an internal lowpass tap with the same coefficients and outputs
/// `input - lowpass`.
#[derive(Debug, Clone)]
pub struct OnePoleHighpass {
    sample_rate: f32,
    cutoff_hz: f32,
    b0: f32,
    a1: f32,
    lp_state: f32,
    output: f32,
}

impl OnePoleHighpass {
    /// Create a highpass at the given sample rate and cutoff.
    pub fn new(sample_rate: f32, cutoff_hz: f32) -> Self {
        let mut f = Self {
            sample_rate,
            cutoff_hz,
            b0: 1.0,
            a1: 0.0,
            lp_state: 0.0,
            output: 0.0,
        };
        f.update();
        f
    }

    /// Set the cutoff frequency and recompute the coefficients.
    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz;
        self.update();
    }

    /// Current cutoff frequency in Hz.
    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    /// Change the sample rate and recompute the coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update();
    }

    fn update(&mut self) {
        let (b0, a1) = pole_coefficients(self.cutoff_hz, self.sample_rate);
        self.b0 = b0;
        self.a1 = a1;
    }

    /// Process one sample.
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        if input == 0.0 && self.lp_state < 1e-6 {
            self.output = 0.0;
        } else {
            self.lp_state = self.b0 * input + self.a1 * self.lp_state;
            self.output = input - self.lp_state;
        }
        self.output
    }

    /// Process a block in place.
    pub fn process(&mut self, block: &mut [f32]) {
        for sample in block.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Reset internal state to silence.
    pub fn clear(&mut self) {
        self.lp_state = 0.0;
        self.output = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowpass_passes_dc() {
        let mut lp = OnePoleLowpass::new(48000.0, 1000.0);
        let mut out = 0.0;
        for _ in 0..48000 {
            out = lp.process_sample(1.0);
        }
        assert!((out - 1.0).abs() < 1e-3, "DC should pass, got {out}");
    }

    #[test]
    fn lowpass_attenuates_nyquist() {
        let mut lp = OnePoleLowpass::new(48000.0, 100.0);
        let mut sum = 0.0f32;
        for i in 0..4800 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            sum += lp.process_sample(x).abs();
        }
        assert!(sum / 4800.0 < 0.05);
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut hp = OnePoleHighpass::new(48000.0, 200.0);
        let mut out = 1.0;
        for _ in 0..48000 {
            out = hp.process_sample(1.0);
        }
        assert!(out.abs() < 1e-3, "DC should be blocked, got {out}");
    }

    #[test]
    fn silence_shortcut_is_bit_exact() {
        let mut lp = OnePoleLowpass::new(48000.0, 500.0);
        for _ in 0..100 {
            lp.process_sample(0.7);
        }
        // Decay on zero input until the state drops below epsilon, then
        // every further output must be exactly 0.0 forever.
        let mut engaged = false;
        for _ in 0..200_000 {
            let out = lp.process_sample(0.0);
            if engaged {
                assert!(out.to_bits() == 0.0f32.to_bits(), "expected exact zero");
            } else if out == 0.0 {
                engaged = true;
            }
        }
        assert!(engaged, "shortcut never engaged");
    }

    #[test]
    fn highpass_silence_shortcut() {
        let mut hp = OnePoleHighpass::new(48000.0, 500.0);
        for _ in 0..100 {
            hp.process_sample(0.7);
        }
        let mut engaged = false;
        for _ in 0..200_000 {
            let out = hp.process_sample(0.0);
            if engaged {
                assert_eq!(out.to_bits(), 0.0f32.to_bits());
            } else if out == 0.0 {
                engaged = true;
            }
        }
        assert!(engaged);
    }

    #[test]
    fn cutoff_clamped_below_nyquist() {
        // Must not produce NaN coefficients at or above Nyquist.
        let mut lp = OnePoleLowpass::new(48000.0, 48000.0);
        let out = lp.process_sample(1.0);
        assert!(out.is_finite());
    }

    #[test]
    fn clear_resets_state() {
        let mut lp = OnePoleLowpass::new(48000.0, 1000.0);
        lp.process_sample(1.0);
        lp.clear();
        assert_eq!(lp.process_sample(0.0), 0.0);
    }
}
