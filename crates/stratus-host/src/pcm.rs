//! 16-bit PCM conversion.
//!
//! The host exchanges interleaved stereo `i16` frames. Decoding divides by
//! 32768 so the most negative sample maps exactly to -1.0; encoding scales
//! by 32767 so +1.0 maps to the most positive sample. The asymmetry is
//! intentional and matches the usual fixed-point convention.

/// Convert one 16-bit sample to float in `[-1.0, 1.0)`.
#[inline]
pub fn sample_to_f32(sample: i16) -> f32 {
    f32::from(sample) / 32768.0
}

/// Convert one float sample in `[-1.0, 1.0]` back to 16 bits.
///
/// The input is clamped before scaling, so out-of-range floats saturate
/// instead of wrapping.
#[inline]
pub fn f32_to_sample(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * 32767.0) as i16
}

/// Split interleaved stereo frames into two channel buffers.
///
/// `left` and `right` must each hold `interleaved.len() / 2` samples.
pub fn deinterleave(interleaved: &[i16], left: &mut [f32], right: &mut [f32]) {
    debug_assert_eq!(interleaved.len(), left.len() + right.len());
    for (i, frame) in interleaved.chunks_exact(2).enumerate() {
        left[i] = sample_to_f32(frame[0]);
        right[i] = sample_to_f32(frame[1]);
    }
}

/// Merge two channel buffers back into interleaved stereo frames.
pub fn interleave(left: &[f32], right: &[f32], interleaved: &mut [i16]) {
    debug_assert_eq!(interleaved.len(), left.len() + right.len());
    for (i, frame) in interleaved.chunks_exact_mut(2).enumerate() {
        frame[0] = f32_to_sample(left[i]);
        frame[1] = f32_to_sample(right[i]);
    }
}
