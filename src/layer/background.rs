//! Audio-free envelope for background layers.

use crate::audio::low_freq_attenuation;
use crate::params::LayerOptions;

/// Default length of a background layer (seconds)
pub const DEFAULT_BACKGROUND_DURATION_S: f64 = 1.0;

/// Fixed spectrum with fade-in/fade-out on density
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundEnvelope {
    low_freq_hz: f64,
    brighten: f64,
    gain: f64,
    fade_in_s: f64,
    fade_out_s: f64,
    duration_s: f64,
}

impl BackgroundEnvelope {
    pub fn new(options: &LayerOptions, duration_s: Option<f64>) -> Self {
        Self {
            low_freq_hz: options.low_freq_hz,
            brighten: options.brighten,
            gain: options.gain,
            fade_in_s: options.fade_in_s,
            fade_out_s: options.fade_out_s,
            duration_s: duration_s.unwrap_or(DEFAULT_BACKGROUND_DURATION_S),
        }
    }

    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    /// `lowCut(f) · f^brighten / f`, a gentler slope than the audio layers
    pub fn amplitude(&self, freq: f64) -> f64 {
        if freq <= 0.0 {
            return 0.0;
        }
        low_freq_attenuation(freq, self.low_freq_hz) * freq.powf(self.brighten) / freq
    }

    /// Half coverage scaled by gain, ramped at both ends of the render
    pub fn density(&self, time: f64, overall_duration_s: f64) -> f64 {
        let mut density = 0.5 * self.gain;
        if self.fade_in_s > 0.0 && time < self.fade_in_s {
            density *= time.max(0.0) / self.fade_in_s;
        }
        if self.fade_out_s > 0.0 {
            let remaining = overall_duration_s - time;
            if remaining < self.fade_out_s {
                density *= remaining.max(0.0) / self.fade_out_s;
            }
        }
        density
    }
}
