//! Stratus - a stereo algorithmic reverb
//!
//! A feedback-delay-network reverb with randomized, seeded topology: up to
//! twelve modulated delay lines per channel, allpass diffusion in and around
//! the loop, and an early-reflection multitap. All randomness is drawn from
//! deterministic seeds, so the same settings always produce the same sound,
//! and the two stereo channels decorrelate by blending their seed streams
//! rather than by running different algorithms.
//!
//! # Quick start
//!
//! ```rust
//! use stratus_reverb::{ParamKey, ReverbEngine};
//!
//! let mut engine = ReverbEngine::new(48_000.0);
//! engine.set_param(ParamKey::Size, 0.8);
//! engine.set_param(ParamKey::Mix, 0.5);
//!
//! let mut left = vec![0.0f32; 256];
//! let mut right = vec![0.0f32; 256];
//! left[0] = 1.0;
//! right[0] = 1.0;
//! engine.process(&mut left, &mut right);
//! ```
//!
//! All parameters are normalized to `[0, 1]`; see [`ParamKey`] for the set
//! and [`ReverbEngine::set_param`] for the mapping behavior.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod channel;
pub mod engine;
pub mod params;

pub use channel::{MAX_LINE_COUNT, ReverbChannel};
pub use engine::ReverbEngine;
pub use params::{ParamKey, ReverbParams};

pub use stratus_dsp::BLOCK_SIZE;
