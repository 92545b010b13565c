//! Per-layer tunables and their layered resolution.
//!
//! Precedence, lowest first:
//! - built-in defaults (audio and background layers differ only in `fuzzy`)
//! - scene-level overrides
//! - per-layer overrides

use serde::Deserialize;

use crate::error::ConfigError;
use crate::noise::{FieldShaping, DEFAULT_FREQ_BASE};

/// Optional tunables as they appear in a config file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerOverrides {
    pub window: Option<f64>,
    pub window_bias: Option<f64>,
    pub fuzzy: Option<f64>,
    pub low_freq: Option<f64>,
    pub brighten: Option<f64>,
    pub gain: Option<f64>,
    pub vignette: Option<f64>,
    pub vignette_sharpness: Option<f64>,
    pub fade_in: Option<f64>,
    pub fade_out: Option<f64>,
    pub freq_base: Option<f64>,
}

impl LayerOverrides {
    /// Overwrite every field of `options` that is set here
    pub fn apply_to(&self, options: &mut LayerOptions) {
        let set = |target: &mut f64, value: Option<f64>| {
            if let Some(value) = value {
                *target = value;
            }
        };
        set(&mut options.window_s, self.window);
        set(&mut options.window_bias, self.window_bias);
        set(&mut options.fuzzy, self.fuzzy);
        set(&mut options.low_freq_hz, self.low_freq);
        set(&mut options.brighten, self.brighten);
        set(&mut options.gain, self.gain);
        set(&mut options.vignette, self.vignette);
        set(&mut options.vignette_sharpness, self.vignette_sharpness);
        set(&mut options.fade_in_s, self.fade_in);
        set(&mut options.fade_out_s, self.fade_out);
        set(&mut options.freq_base, self.freq_base);
    }
}

/// Fully resolved, validated options for one layer
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOptions {
    /// Audio analysis window length (seconds)
    pub window_s: f64,

    /// Window skew exponent (1 = classic Hann, >1 weights the recent past)
    pub window_bias: f64,

    /// Soft edge width in units of field std (0 = hard threshold)
    pub fuzzy: f64,

    /// Frequencies below this are attenuated linearly (Hz)
    pub low_freq_hz: f64,

    /// Spectral tilt exponent applied as `freq^brighten`
    pub brighten: f64,

    /// Density multiplier
    pub gain: f64,

    /// Centre-to-edge threshold shift in units of field std
    pub vignette: f64,

    /// Vignette curve exponent
    pub vignette_sharpness: f64,

    /// Background fade-in ramp (seconds, 0 = none)
    pub fade_in_s: f64,

    /// Background fade-out ramp (seconds, 0 = none)
    pub fade_out_s: f64,

    /// Hz per unit of spectral radius
    pub freq_base: f64,
}

impl LayerOptions {
    /// Built-in defaults; backgrounds get a much softer edge
    pub fn defaults(has_audio: bool) -> Self {
        Self {
            window_s: 0.15,
            window_bias: 3.0,
            fuzzy: if has_audio { 0.5 } else { 3.0 },
            low_freq_hz: 50.0,
            brighten: 0.5,
            gain: 1.0,
            vignette: 1.0,
            vignette_sharpness: 0.5,
            fade_in_s: 0.0,
            fade_out_s: 0.0,
            freq_base: DEFAULT_FREQ_BASE,
        }
    }

    /// Merge defaults < scene < layer, then validate
    pub fn resolve(
        has_audio: bool,
        scene: &LayerOverrides,
        layer: &LayerOverrides,
    ) -> Result<Self, ConfigError> {
        let mut options = Self::defaults(has_audio);
        scene.apply_to(&mut options);
        layer.apply_to(&mut options);
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("window", self.window_s)?;
        positive("windowBias", self.window_bias)?;
        positive("lowFreq", self.low_freq_hz)?;
        positive("freqBase", self.freq_base)?;
        non_negative("fuzzy", self.fuzzy)?;
        non_negative("gain", self.gain)?;
        non_negative("vignetteSharpness", self.vignette_sharpness)?;
        non_negative("fadeIn", self.fade_in_s)?;
        non_negative("fadeOut", self.fade_out_s)?;
        finite("brighten", self.brighten)?;
        finite("vignette", self.vignette)?;
        Ok(())
    }

    pub fn shaping(&self) -> FieldShaping {
        FieldShaping {
            fuzzy: self.fuzzy,
            vignette: self.vignette,
            vignette_sharpness: self.vignette_sharpness,
        }
    }
}

pub(crate) fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "finite and > 0",
            value,
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "finite and >= 0",
            value,
        })
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "finite",
            value,
        })
    }
}
