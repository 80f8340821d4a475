//! Shelving biquad for tilt EQ inside the delay-line feedback loops.
//!
//! Second-order direct-form filter with low-shelf and high-shelf coefficient
//! sets in the Robert Bristow-Johnson tradition. Boost and cut use different
//! normalization branches for numerical stability, and Q is fixed at 0.5 -
//! the gentle slope wanted inside a feedback loop, where a resonant shelf
//! would ring on every pass.

use libm::{powf, sqrtf, tanf};

/// Shelf orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShelfType {
    /// Boost/cut below the corner frequency.
    LowShelf,
    /// Boost/cut above the corner frequency.
    HighShelf,
}

/// Low/high shelving biquad filter.
///
/// Gain is clamped to ±60 dB. Coefficients are cached and recomputed only
/// when frequency, gain, or sample rate changes.
///
/// # Example
///
/// ```rust
/// use stratus_dsp::{ShelfFilter, ShelfType};
///
/// let mut shelf = ShelfFilter::new(ShelfType::HighShelf, 48000.0);
/// shelf.set_gain_db(-6.0);
/// shelf.set_frequency(8000.0);
///
/// let mut block = [1.0, 0.0, 0.0, 0.0];
/// shelf.process(&mut block);
/// ```
#[derive(Debug, Clone)]
pub struct ShelfFilter {
    shelf_type: ShelfType,
    sample_rate: f32,
    gain_db: f32,
    frequency: f32,

    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

/// Fixed shelf Q. Gentler than Butterworth on purpose; see module docs.
const SHELF_Q: f32 = 0.5;

impl ShelfFilter {
    /// Create a shelf filter with unity gain and a corner at a quarter of
    /// the sample rate.
    pub fn new(shelf_type: ShelfType, sample_rate: f32) -> Self {
        let mut f = Self {
            shelf_type,
            sample_rate,
            gain_db: 0.0,
            frequency: sample_rate * 0.25,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        };
        f.update();
        f
    }

    /// Fixed filter Q.
    pub fn q(&self) -> f32 {
        SHELF_Q
    }

    /// Set shelf gain in dB, clamped to ±60.
    pub fn set_gain_db(&mut self, db: f32) {
        self.gain_db = db.clamp(-60.0, 60.0);
        self.update();
    }

    /// Current shelf gain in dB.
    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    /// Set the corner frequency in Hz.
    pub fn set_frequency(&mut self, hz: f32) {
        self.frequency = hz;
        self.update();
    }

    /// Current corner frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Update the sample rate and recompute coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update();
    }

    fn update(&mut self) {
        let v = powf(10.0, self.gain_db.abs() / 20.0);
        let k = tanf(core::f32::consts::PI * self.frequency / self.sample_rate);
        let sqrt2 = sqrtf(2.0);

        match self.shelf_type {
            ShelfType::LowShelf => {
                if self.gain_db >= 0.0 {
                    let norm = 1.0 / (1.0 + sqrt2 * k + k * k);
                    self.b0 = (1.0 + sqrtf(2.0 * v) * k + v * k * k) * norm;
                    self.b1 = 2.0 * (v * k * k - 1.0) * norm;
                    self.b2 = (1.0 - sqrtf(2.0 * v) * k + v * k * k) * norm;
                    self.a1 = 2.0 * (k * k - 1.0) * norm;
                    self.a2 = (1.0 - sqrt2 * k + k * k) * norm;
                } else {
                    let norm = 1.0 / (1.0 + sqrtf(2.0 * v) * k + v * k * k);
                    self.b0 = (1.0 + sqrt2 * k + k * k) * norm;
                    self.b1 = 2.0 * (k * k - 1.0) * norm;
                    self.b2 = (1.0 - sqrt2 * k + k * k) * norm;
                    self.a1 = 2.0 * (v * k * k - 1.0) * norm;
                    self.a2 = (1.0 - sqrtf(2.0 * v) * k + v * k * k) * norm;
                }
            }
            ShelfType::HighShelf => {
                if self.gain_db >= 0.0 {
                    let norm = 1.0 / (1.0 + sqrt2 * k + k * k);
                    self.b0 = (v + sqrtf(2.0 * v) * k + k * k) * norm;
                    self.b1 = 2.0 * (k * k - v) * norm;
                    self.b2 = (v - sqrtf(2.0 * v) * k + k * k) * norm;
                    self.a1 = 2.0 * (k * k - 1.0) * norm;
                    self.a2 = (1.0 - sqrt2 * k + k * k) * norm;
                } else {
                    let norm = 1.0 / (v + sqrtf(2.0 * v) * k + k * k);
                    self.b0 = (1.0 + sqrt2 * k + k * k) * norm;
                    self.b1 = 2.0 * (k * k - 1.0) * norm;
                    self.b2 = (1.0 - sqrt2 * k + k * k) * norm;
                    self.a1 = 2.0 * (k * k - v) * norm;
                    self.a2 = (v - sqrtf(2.0 * v) * k + k * k) * norm;
                }
            }
        }
    }

    /// Process one sample through the direct-form recurrence.
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let y = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.y2 = self.y1;
        self.x1 = input;
        self.y1 = y;
        y
    }

    /// Process a block in place.
    pub fn process(&mut self, block: &mut [f32]) {
        for sample in block.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Reset filter history to silence without touching the coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}
