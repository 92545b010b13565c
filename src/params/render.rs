//! Output and scheduling configuration.

use std::path::PathBuf;

use super::layer::positive;
use crate::error::ConfigError;
use crate::noise::{default_height, DEFAULT_WIDTH};

/// Rendering configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Frame width (pixels)
    pub width: usize,

    /// Frame height (pixels)
    pub height: usize,

    /// Frame rate (FPS)
    pub frame_rate: f64,

    /// Number of partitions the frame range is split into
    pub workers: usize,

    /// Render only this partition, taken modulo `workers`
    pub worker_index: Option<usize>,

    /// Directory receiving `frameNNNNN.png`
    pub output_dir: PathBuf,
}

impl RenderSettings {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: default_height(DEFAULT_WIDTH),
            frame_rate: 30.0,
            workers: 1,
            worker_index: None,
            output_dir,
        }
    }

    /// Fill in whichever of width/height is missing, keeping ~16:9
    pub fn dimensions(width: Option<usize>, height: Option<usize>) -> (usize, usize) {
        match (width, height) {
            (Some(width), Some(height)) => (width, height),
            (Some(width), None) => (width, default_height(width)),
            (None, Some(height)) => ((height as f64 / 9.0).round() as usize * 16, height),
            (None, None) => (DEFAULT_WIDTH, default_height(DEFAULT_WIDTH)),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::OutOfRange {
                field: "width",
                expected: "> 0",
                value: 0.0,
            });
        }
        if self.height == 0 {
            return Err(ConfigError::OutOfRange {
                field: "height",
                expected: "> 0",
                value: 0.0,
            });
        }
        positive("frameRate", self.frame_rate)?;
        if self.workers == 0 {
            return Err(ConfigError::OutOfRange {
                field: "workers",
                expected: ">= 1",
                value: 0.0,
            });
        }
        Ok(())
    }
}
