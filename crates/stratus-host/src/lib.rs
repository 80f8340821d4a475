//! Host integration surface for the stratus reverb.
//!
//! Audio hosts drive effects through a small capability surface: create an
//! instance (optionally from a JSON configuration), push interleaved 16-bit
//! stereo PCM through it, and get/set parameters as strings. This crate
//! adapts [`stratus_reverb::ReverbEngine`] to that surface.
//!
//! ```rust
//! use stratus_host::{AudioFx, ReverbFx};
//!
//! let mut fx = ReverbFx::new();
//! fx.set_param("mix", "0.5");
//!
//! let mut frames = vec![0i16; 256]; // 128 interleaved stereo frames
//! frames[0] = 16000;
//! frames[1] = 16000;
//! fx.process_block(&mut frames);
//! assert_eq!(fx.get_param("mix").as_deref(), Some("0.50"));
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use stratus_reverb::{BLOCK_SIZE, ParamKey, ReverbEngine};

pub mod pcm;

/// The one sample rate the host runs at. The PCM stream carries no rate
/// information, so the engine is pinned to this.
pub const INTERNAL_SAMPLE_RATE: f32 = 48_000.0;

/// Name reported for the `name` parameter key.
const PRODUCT_NAME: &str = "Stratus";

/// String-driven effect surface the host talks to.
///
/// Implementations own their audio state; the host serializes calls, so no
/// method needs interior synchronization. Dropping the value releases the
/// instance.
pub trait AudioFx {
    /// Process interleaved stereo frames in place. The slice length must be
    /// even; each frame is a left sample followed by a right sample.
    fn process_block(&mut self, audio: &mut [i16]);

    /// Set a parameter from its string value. Unknown keys are ignored;
    /// unparseable values fall back to 0.
    fn set_param(&mut self, key: &str, value: &str);

    /// Read a parameter formatted as a string, or `None` for unknown keys.
    fn get_param(&self, key: &str) -> Option<String>;
}

/// Error building an effect instance from a JSON configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration was not valid JSON of the expected shape.
    #[error("invalid effect configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// A configuration value: hosts hand parameters through JSON as either
/// numbers or strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConfigValue {
    Number(f64),
    Text(String),
}

impl ConfigValue {
    fn as_f32(&self) -> f32 {
        match self {
            Self::Number(n) => *n as f32,
            Self::Text(s) => parse_value(s),
        }
    }
}

/// Leading-number parse with a zero fallback, so malformed host values
/// degrade to a defined setting instead of being rejected mid-stream.
///
/// Like C's `atof`, the longest numeric prefix is taken and any trailing
/// garbage is ignored; a value with no numeric prefix reads as 0.
fn parse_value(value: &str) -> f32 {
    let text = value.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(&(b'+' | b'-'))) {
        end += 1;
    }
    let mut seen_digit = false;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
        seen_digit = true;
    }
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
            seen_digit = true;
        }
    }
    if !seen_digit {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(&(b'e' | b'E'))) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(&(b'+' | b'-'))) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            end = exp;
            while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                end += 1;
            }
        }
    }
    text[..end].parse().unwrap_or(0.0)
}

/// The stratus reverb behind the [`AudioFx`] surface.
///
/// The scratch buffers are fixed at one block; `process_block` walks larger
/// calls block by block, so processing never allocates.
pub struct ReverbFx {
    engine: ReverbEngine,
    left: [f32; BLOCK_SIZE],
    right: [f32; BLOCK_SIZE],
}

impl ReverbFx {
    /// Create an instance with default parameters.
    pub fn new() -> Self {
        debug!(sample_rate = INTERNAL_SAMPLE_RATE, "creating reverb instance");
        Self {
            engine: ReverbEngine::new(INTERNAL_SAMPLE_RATE),
            left: [0.0; BLOCK_SIZE],
            right: [0.0; BLOCK_SIZE],
        }
    }

    /// Create an instance from a JSON object of parameter overrides, e.g.
    /// `{"decay": 0.7, "mix": "0.4"}`. An empty string applies no overrides.
    /// Unknown keys are logged and skipped.
    pub fn from_config(config_json: &str) -> Result<Self, ConfigError> {
        let mut fx = Self::new();
        if config_json.trim().is_empty() {
            return Ok(fx);
        }

        let overrides: BTreeMap<String, ConfigValue> = serde_json::from_str(config_json)?;
        for (name, value) in &overrides {
            match ParamKey::parse(name) {
                Some(key) => fx.engine.set_param(key, value.as_f32()),
                None => warn!(key = %name, "ignoring unknown configuration key"),
            }
        }
        Ok(fx)
    }

    /// Direct access to the engine, for hosts that bypass the string
    /// surface.
    pub fn engine_mut(&mut self) -> &mut ReverbEngine {
        &mut self.engine
    }

    /// Reset all audio state, keeping parameters.
    pub fn reset(&mut self) {
        self.engine.clear();
    }
}

impl Default for ReverbFx {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioFx for ReverbFx {
    fn process_block(&mut self, audio: &mut [i16]) {
        let frames = audio.len() / 2;
        for chunk in audio[..frames * 2].chunks_mut(2 * BLOCK_SIZE) {
            let n = chunk.len() / 2;
            pcm::deinterleave(chunk, &mut self.left[..n], &mut self.right[..n]);
            self.engine.process(&mut self.left[..n], &mut self.right[..n]);
            pcm::interleave(&self.left[..n], &self.right[..n], chunk);
        }
    }

    fn set_param(&mut self, key: &str, value: &str) {
        match ParamKey::parse(key) {
            Some(param) => {
                let v = parse_value(value);
                debug!(key, value = v, "setting parameter");
                self.engine.set_param(param, v);
            }
            None => debug!(key, "ignoring unknown parameter"),
        }
    }

    fn get_param(&self, key: &str) -> Option<String> {
        if key == "name" {
            return Some(PRODUCT_NAME.to_string());
        }
        ParamKey::parse(key).map(|param| format!("{:.2}", self.engine.get_param(param)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_reported() {
        let fx = ReverbFx::new();
        assert_eq!(fx.get_param("decay").as_deref(), Some("0.50"));
        assert_eq!(fx.get_param("mix").as_deref(), Some("0.30"));
        assert_eq!(fx.get_param("high_cut").as_deref(), Some("1.00"));
        assert_eq!(fx.get_param("name").as_deref(), Some("Stratus"));
        assert_eq!(fx.get_param("bogus"), None);
    }

    #[test]
    fn set_param_clamps_and_round_trips() {
        let mut fx = ReverbFx::new();
        fx.set_param("decay", "5");
        assert_eq!(fx.get_param("decay").as_deref(), Some("1.00"));
        fx.set_param("decay", "-5");
        assert_eq!(fx.get_param("decay").as_deref(), Some("0.00"));
        fx.set_param("decay", "0.25");
        assert_eq!(fx.get_param("decay").as_deref(), Some("0.25"));
    }

    #[test]
    fn malformed_values_become_zero() {
        let mut fx = ReverbFx::new();
        fx.set_param("size", "not-a-number");
        assert_eq!(fx.get_param("size").as_deref(), Some("0.00"));
    }

    #[test]
    fn trailing_garbage_keeps_the_numeric_prefix() {
        let mut fx = ReverbFx::new();
        fx.set_param("decay", "0.7junk");
        assert_eq!(fx.get_param("decay").as_deref(), Some("0.70"));
        fx.set_param("decay", "  .5x");
        assert_eq!(fx.get_param("decay").as_deref(), Some("0.50"));
        fx.set_param("decay", "2e-1 tail");
        assert_eq!(fx.get_param("decay").as_deref(), Some("0.20"));
        // A bare exponent marker is not part of the number.
        fx.set_param("decay", "1e");
        assert_eq!(fx.get_param("decay").as_deref(), Some("1.00"));
        fx.set_param("decay", "-0.3abc");
        assert_eq!(fx.get_param("decay").as_deref(), Some("0.00"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut fx = ReverbFx::new();
        fx.set_param("bogus", "0.5");
        assert_eq!(fx.get_param("decay").as_deref(), Some("0.50"));
    }

    #[test]
    fn config_overrides_defaults() {
        let fx =
            ReverbFx::from_config(r#"{"decay": 0.8, "mix": "0.4", "mystery": 1}"#).unwrap();
        assert_eq!(fx.get_param("decay").as_deref(), Some("0.80"));
        assert_eq!(fx.get_param("mix").as_deref(), Some("0.40"));
    }

    #[test]
    fn empty_config_is_accepted() {
        let fx = ReverbFx::from_config("").unwrap();
        assert_eq!(fx.get_param("decay").as_deref(), Some("0.50"));
    }

    #[test]
    fn invalid_config_is_an_error() {
        assert!(ReverbFx::from_config("{not json").is_err());
    }
}
