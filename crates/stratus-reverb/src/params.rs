//! Normalized parameter model.
//!
//! Every control is a `f32` in `[0, 1]`. The engine maps normalized values
//! onto physical ranges (milliseconds, Hz, seconds) with perceptual response
//! curves when parameters are applied; this module only stores and names
//! them.

/// Identifies one reverb control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    /// Late-field decay time.
    Decay,
    /// Dry/wet output blend.
    Mix,
    /// Delay before the reverb onset.
    Predelay,
    /// Room size (late-line delay spread).
    Size,
    /// Early diffusion density and feedback.
    Diffusion,
    /// Input highpass cutoff.
    LowCut,
    /// Input lowpass cutoff.
    HighCut,
    /// Stereo decorrelation between the two channels.
    CrossSeed,
    /// Modulation LFO rate.
    ModRate,
    /// Modulation depth.
    ModAmount,
}

impl ParamKey {
    /// All keys, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Decay,
        Self::Mix,
        Self::Predelay,
        Self::Size,
        Self::Diffusion,
        Self::LowCut,
        Self::HighCut,
        Self::CrossSeed,
        Self::ModRate,
        Self::ModAmount,
    ];

    /// The wire name of this key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Decay => "decay",
            Self::Mix => "mix",
            Self::Predelay => "predelay",
            Self::Size => "size",
            Self::Diffusion => "diffusion",
            Self::LowCut => "low_cut",
            Self::HighCut => "high_cut",
            Self::CrossSeed => "cross_seed",
            Self::ModRate => "mod_rate",
            Self::ModAmount => "mod_amount",
        }
    }

    /// Look up a key by its wire name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }

    /// Whether changing this key requires re-deriving the signal network.
    ///
    /// `mix` is applied per-sample at the output stage and takes effect
    /// without touching delay lengths, seeds, or filter coefficients.
    pub fn reshapes_network(self) -> bool {
        !matches!(self, Self::Mix)
    }
}

/// The full normalized control set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParams {
    /// Late-field decay time.
    pub decay: f32,
    /// Dry/wet output blend.
    pub mix: f32,
    /// Delay before the reverb onset.
    pub predelay: f32,
    /// Room size.
    pub size: f32,
    /// Early diffusion density and feedback.
    pub diffusion: f32,
    /// Input highpass cutoff.
    pub low_cut: f32,
    /// Input lowpass cutoff.
    pub high_cut: f32,
    /// Stereo decorrelation.
    pub cross_seed: f32,
    /// Modulation LFO rate.
    pub mod_rate: f32,
    /// Modulation depth.
    pub mod_amount: f32,
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self {
            decay: 0.5,
            mix: 0.3,
            predelay: 0.0,
            size: 0.5,
            diffusion: 0.7,
            low_cut: 0.0,
            high_cut: 1.0,
            cross_seed: 0.5,
            mod_rate: 0.3,
            mod_amount: 0.3,
        }
    }
}

impl ReverbParams {
    /// Read the value stored for `key`.
    pub fn get(&self, key: ParamKey) -> f32 {
        match key {
            ParamKey::Decay => self.decay,
            ParamKey::Mix => self.mix,
            ParamKey::Predelay => self.predelay,
            ParamKey::Size => self.size,
            ParamKey::Diffusion => self.diffusion,
            ParamKey::LowCut => self.low_cut,
            ParamKey::HighCut => self.high_cut,
            ParamKey::CrossSeed => self.cross_seed,
            ParamKey::ModRate => self.mod_rate,
            ParamKey::ModAmount => self.mod_amount,
        }
    }

    /// Store `value` for `key`, clamped to `[0, 1]`.
    pub fn set(&mut self, key: ParamKey, value: f32) {
        let v = value.clamp(0.0, 1.0);
        match key {
            ParamKey::Decay => self.decay = v,
            ParamKey::Mix => self.mix = v,
            ParamKey::Predelay => self.predelay = v,
            ParamKey::Size => self.size = v,
            ParamKey::Diffusion => self.diffusion = v,
            ParamKey::LowCut => self.low_cut = v,
            ParamKey::HighCut => self.high_cut = v,
            ParamKey::CrossSeed => self.cross_seed = v,
            ParamKey::ModRate => self.mod_rate = v,
            ParamKey::ModAmount => self.mod_amount = v,
        }
    }
}
