//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::error::ConfigError;
use crate::params::{RenderSettings, SceneConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "noisescape")]
#[command(about = "Render audio-driven spectral noise as a PNG frame sequence", long_about = None)]
pub struct Args {
    /// Scene config (.json) or a single audio track (.wav)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory receiving frameNNNNN.png
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Frame width in pixels (default 320, or 16:9 from height)
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<usize>,

    /// Frame height in pixels (default 16:9 from width, rounded to 16)
    #[arg(long, value_name = "PIXELS")]
    pub height: Option<usize>,

    /// Frames per second
    #[arg(long, value_name = "FPS", default_value_t = 30.0)]
    pub frame_rate: f64,

    /// Number of partitions the frame range is split into
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub workers: usize,

    /// Render only this partition (0-based), for multi-process renders
    #[arg(long, value_name = "INDEX")]
    pub worker_index: Option<usize>,
}

impl Args {
    /// Rendering settings from the command line
    pub fn render_settings(&self) -> RenderSettings {
        let (width, height) = RenderSettings::dimensions(self.width, self.height);
        RenderSettings {
            width,
            height,
            frame_rate: self.frame_rate,
            workers: self.workers,
            worker_index: self.worker_index,
            output_dir: self.output_dir.clone(),
        }
    }

    /// Load the scene and the directory its wav paths are relative to
    pub fn load_scene(&self) -> Result<(SceneConfig, PathBuf), ConfigError> {
        let is_json = self
            .input
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            let scene = SceneConfig::load(&self.input)?;
            let base_dir = self
                .input
                .parent()
                .map(PathBuf::from)
                .unwrap_or_default();
            log::info!("scene: {} ({} layers)", self.input.display(), scene.layers.len());
            Ok((scene, base_dir))
        } else {
            log::info!("single track: {}", self.input.display());
            Ok((SceneConfig::single_wav(self.input.clone()), PathBuf::new()))
        }
    }
}
