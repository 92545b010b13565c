//! Error types for configuration, audio decoding, synthesis and output.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid or unreadable configuration, reported before rendering starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },

    #[error("scene has no layers")]
    NoLayers,

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Audio source could not provide usable PCM
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to decode wav: {0}")]
    Wav(#[from] hound::Error),

    #[error("audio has no channels")]
    NoChannels,

    #[error("audio sample rate must be > 0")]
    ZeroSampleRate,

    #[error("channel {channel} has {found} samples, expected {expected}")]
    RaggedChannels {
        channel: usize,
        found: usize,
        expected: usize,
    },
}

/// Internal numeric failure inside the synthesizer
#[derive(Debug, Error)]
pub enum NoiseError {
    #[error(
        "geometry failure: annulus at radius {dist} does not fit edges {short_edge}/{long_edge}"
    )]
    Geometry {
        dist: f64,
        short_edge: f64,
        long_edge: f64,
    },
}

/// Frame could not be written by the image sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write frame {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Anything that aborts a render run
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("layer {layer} ({path}): {source}")]
    Audio {
        layer: usize,
        path: PathBuf,
        #[source]
        source: AudioError,
    },

    #[error(transparent)]
    Noise(#[from] NoiseError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}
