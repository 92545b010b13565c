//! Render session: every layer of a scene, ready to produce frames.
//!
//! Building a session resolves configuration, loads audio and generates the
//! phase fields for each distinct seed. After that the session is read-only
//! and frames can be rendered from any number of threads.

use std::path::Path;

use crate::audio::{AudioEnvelope, AudioSource};
use crate::compositor::{composite, BlendMode, Frame, LayerPaint};
use crate::error::{ConfigError, NoiseError, RenderError};
use crate::layer::{BackgroundEnvelope, Layer, LayerSource};
use crate::noise::{PhaseCache, SpectralNoise};
use crate::params::{LayerOptions, SceneConfig};

/// Immutable state shared by all frames of one render
pub struct RenderSession {
    width: usize,
    height: usize,
    layers: Vec<Layer>,
    combine: BlendMode,
    start_colour: [u8; 3],
    duration_s: f64,
    phases: PhaseCache,
}

impl RenderSession {
    /// Resolve and validate every layer, then load audio and phase fields.
    ///
    /// Wav paths are resolved against `base_dir`. Any layer failing to load
    /// aborts the whole session.
    pub fn build<S: AudioSource + ?Sized>(
        scene: &SceneConfig,
        base_dir: &Path,
        width: usize,
        height: usize,
        audio: &S,
    ) -> Result<Self, RenderError> {
        if scene.layers.is_empty() {
            return Err(ConfigError::NoLayers.into());
        }

        // Validate everything before touching audio or generating phases
        let resolved = scene
            .layers
            .iter()
            .map(|spec| {
                let options =
                    LayerOptions::resolve(spec.wav.is_some(), &scene.overrides, &spec.overrides)?;
                if let Some(duration) = spec.duration {
                    if !(duration.is_finite() && duration > 0.0) {
                        return Err(ConfigError::OutOfRange {
                            field: "duration",
                            expected: "finite and > 0",
                            value: duration,
                        });
                    }
                }
                Ok(options)
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let phases = PhaseCache::new();
        let mut layers = Vec::with_capacity(scene.layers.len());
        for (index, (spec, options)) in scene.layers.iter().zip(&resolved).enumerate() {
            let seed = scene.layer_seed(index);
            let fields = phases.get_or_generate(&seed, width, height);
            let synth = SpectralNoise::new(fields, options.freq_base, options.shaping());

            let source = match &spec.wav {
                Some(wav) => {
                    let path = base_dir.join(wav);
                    let pcm = audio.load(&path).map_err(|source| RenderError::Audio {
                        layer: index,
                        path: path.clone(),
                        source,
                    })?;
                    LayerSource::Audio(AudioEnvelope::new(pcm, options))
                }
                None => LayerSource::Background(BackgroundEnvelope::new(options, spec.duration)),
            };

            let layer = Layer::new(spec.colour(), source, synth);
            log::info!(
                "layer {}: {} seed '{}' rgb {:?}, {:.2}s",
                index,
                if spec.wav.is_some() { "audio" } else { "background" },
                seed,
                layer.rgb(),
                layer.duration_s()
            );
            layers.push(layer);
        }

        let duration_s = layers
            .iter()
            .map(Layer::duration_s)
            .fold(0.0_f64, f64::max);

        log::info!(
            "session ready: {} layers, {} seeds, {}x{}, {:.2}s",
            layers.len(),
            phases.len(),
            width,
            height,
            duration_s
        );

        Ok(Self {
            width,
            height,
            layers,
            combine: scene.combine,
            start_colour: scene.start_colour(),
            duration_s,
            phases,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Longest layer duration
    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    pub fn phase_cache(&self) -> &PhaseCache {
        &self.phases
    }

    /// Compute every layer at `time` and blend them
    pub fn render_frame(&self, time: f64) -> Result<Frame, NoiseError> {
        let fields = self
            .layers
            .iter()
            .map(|layer| layer.noise(time, self.duration_s))
            .collect::<Result<Vec<_>, _>>()?;

        let paints: Vec<LayerPaint<'_>> = self
            .layers
            .iter()
            .zip(&fields)
            .map(|(layer, noise)| LayerPaint {
                rgb: layer.rgb(),
                noise,
            })
            .collect();

        Ok(composite(
            self.width,
            self.height,
            &paints,
            self.combine,
            self.start_colour,
        ))
    }
}
