//! Render layers: a noise generator plus whatever drives its envelope.

mod background;

pub use background::{BackgroundEnvelope, DEFAULT_BACKGROUND_DURATION_S};

use crate::audio::AudioEnvelope;
use crate::error::NoiseError;
use crate::noise::{NoiseField, SpectralNoise};

/// Where a layer's amplitude function and density come from
pub enum LayerSource {
    /// Short-time spectrum of an audio track
    Audio(AudioEnvelope),

    /// Fixed spectrum with optional fades
    Background(BackgroundEnvelope),
}

impl LayerSource {
    pub fn duration_s(&self) -> f64 {
        match self {
            LayerSource::Audio(envelope) => envelope.duration_s(),
            LayerSource::Background(envelope) => envelope.duration_s(),
        }
    }
}

/// One coloured noise layer, immutable once built
pub struct Layer {
    rgb: [u8; 3],
    source: LayerSource,
    synth: SpectralNoise,
}

impl Layer {
    pub fn new(rgb: [u8; 3], source: LayerSource, synth: SpectralNoise) -> Self {
        Self { rgb, source, synth }
    }

    pub fn rgb(&self) -> [u8; 3] {
        self.rgb
    }

    pub fn source(&self) -> &LayerSource {
        &self.source
    }

    pub fn synth(&self) -> &SpectralNoise {
        &self.synth
    }

    pub fn duration_s(&self) -> f64 {
        self.source.duration_s()
    }

    /// Noise field at `time`; backgrounds fade against `overall_duration_s`
    pub fn noise(&self, time: f64, overall_duration_s: f64) -> Result<NoiseField, NoiseError> {
        match &self.source {
            LayerSource::Audio(envelope) => {
                let spectrum = envelope.analyse(time);
                self.synth
                    .noise(time, |freq| spectrum.amplitude(freq), spectrum.density())
            }
            LayerSource::Background(envelope) => self.synth.noise(
                time,
                |freq| envelope.amplitude(freq),
                envelope.density(time, overall_duration_s),
            ),
        }
    }
}
