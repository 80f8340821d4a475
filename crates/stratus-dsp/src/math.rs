//! Math utilities shared across the reverb graph.
//!
//! Level conversion, the perceptual response curves used by the parameter
//! mapping layer, and denormal protection. All functions are allocation-free
//! and `no_std` compatible.

use libm::powf;

/// Convert decibels to linear gain (`10^(dB/20)`).
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    powf(10.0, db * 0.05)
}

/// Two-decade response curve.
///
/// Maps [0, 1] onto [0, 1] with 100:1 dynamic range, so equal knob
/// movements feel perceptually even across the range. Used for pre-delay
/// time and modulation rate.
#[inline]
pub fn resp2dec(x: f32) -> f32 {
    (powf(10.0, 2.0 * x) - 1.0) * (100.0 / 99.0) * 0.01
}

/// Three-decade response curve.
///
/// Steeper than [`resp2dec`], with 1000:1 dynamic range. Used for decay
/// time, which spans 0.05 s to 60 s.
#[inline]
pub fn resp3dec(x: f32) -> f32 {
    (powf(10.0, 3.0 * x) - 1.0) * (1000.0 / 999.0) * 0.001
}

/// Four-octave response curve.
///
/// Octave-scaled mapping of [0, 1] onto [0, 1]. Used for the low-cut and
/// high-cut corner frequencies.
#[inline]
pub fn resp4oct(x: f32) -> f32 {
    (powf(2.0, 4.0 * x) - 1.0) * (16.0 / 15.0) * 0.0625
}

/// Flush near-zero samples to exact zero.
///
/// Any sample whose square is below 1e-9 is forced to 0.0. Subnormal floats
/// cause severe CPU slowdowns on most architectures; signals decaying inside
/// feedback loops must be flushed before they reach that range.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x * x < 1e-9 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_conversion() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_gain(-20.0) - 0.1).abs() < 1e-6);
        assert!((db_to_gain(20.0) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn response_curves_span_unit_interval() {
        for f in [resp2dec, resp3dec, resp4oct] {
            assert!(f(0.0).abs() < 1e-6);
            assert!((f(1.0) - 1.0).abs() < 1e-5);
            // Monotonic
            let mut prev = -1.0;
            for i in 0..=100 {
                let y = f(i as f32 / 100.0);
                assert!(y > prev);
                prev = y;
            }
        }
    }

    #[test]
    fn curves_are_sub_linear() {
        // The whole point: the midpoint maps well below 0.5.
        assert!(resp2dec(0.5) < 0.2);
        assert!(resp3dec(0.5) < resp2dec(0.5));
    }

    #[test]
    fn denormal_flush() {
        assert_eq!(flush_denormal(1e-6), 0.0);
        assert_eq!(flush_denormal(0.0), 0.0);
        assert_eq!(flush_denormal(0.5), 0.5);
        assert_eq!(flush_denormal(-0.5), -0.5);
    }
}
