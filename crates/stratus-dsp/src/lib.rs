//! Stratus DSP - primitives for the stratus algorithmic reverb
//!
//! This crate provides the leaf components of the reverb signal graph,
//! designed for real-time processing with zero allocation in the audio path.
//! All buffers are sized at construction; `process` never allocates.
//!
//! # Components
//!
//! - [`LcgRandom`] / [`RandomBuffer`] - deterministic randomization source
//! - [`OnePoleLowpass`] / [`OnePoleHighpass`] - one-pole tone filters with exact-silence shortcut
//! - [`ShelfFilter`] - low/high shelving biquad for in-loop tilt EQ
//! - [`ModulatedAllpass`] - fractional-delay allpass with periodic modulation
//! - [`AllpassDiffuser`] - randomized cascade of up to 12 allpass stages
//! - [`ModulatedDelay`] - feedback-free modulated fractional delay
//! - [`MultitapDelay`] - randomized early-reflection tap cluster
//! - [`DelayLine`] - composite delay line with one-block-delayed feedback
//!
//! # Determinism
//!
//! The reverb's diffusion character is entirely reproducible from its seeds.
//! The linear-congruential generator in [`rand`] is a compatibility contract:
//! substituting another generator changes the sound.
//!
//! # Processing model
//!
//! Components process in-place on sample blocks of at most [`BLOCK_SIZE`]
//! frames. Blocks larger than that are the caller's responsibility to chunk
//! (the engine crate does this transparently).
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! stratus-dsp = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod delay_line;
pub mod diffuser;
pub mod math;
pub mod modulated_allpass;
pub mod modulated_delay;
pub mod multitap;
pub mod one_pole;
pub mod rand;
pub mod shelf;

pub use delay_line::{BlockQueue, DelayLine};
pub use diffuser::AllpassDiffuser;
pub use math::{db_to_gain, flush_denormal, resp2dec, resp3dec, resp4oct};
pub use modulated_allpass::ModulatedAllpass;
pub use modulated_delay::ModulatedDelay;
pub use multitap::MultitapDelay;
pub use one_pole::{OnePoleHighpass, OnePoleLowpass};
pub use rand::{LcgRandom, RandomBuffer};
pub use shelf::{ShelfFilter, ShelfType};

/// Processing sub-block size in frames.
///
/// The engine chunks arbitrary host block lengths into sub-blocks of this
/// size; all scratch buffers are sized accordingly.
pub const BLOCK_SIZE: usize = 128;

/// Capacity of allpass-stage delay buffers, in samples.
///
/// Fixed constant (100 ms at 192 kHz), independent of the host sample rate.
pub const ALLPASS_BUFFER_SIZE: usize = 19_200;

/// Capacity of delay-line and pre-delay buffers, in samples.
///
/// Two seconds at 192 kHz, covering the full pre-delay and line-delay
/// ranges. Fixed constant, independent of the host sample rate.
pub const DELAY_BUFFER_SIZE: usize = 384_000;

/// Interval, in samples, between recomputations of modulated tap positions.
///
/// Modulation is smooth enough at sub-audio rates that updating the delay
/// center every 8 samples is inaudible but far cheaper than a per-sample
/// LFO evaluation.
pub const MODULATION_UPDATE_RATE: usize = 8;
