//! Frame output.

use std::path::{Path, PathBuf};

use crate::compositor::Frame;
use crate::error::SinkError;

/// Destination for rendered frames, shared by all partitions
pub trait FrameSink: Sync {
    /// Persist frame `frame_index` (1-based)
    fn write(&self, frame_index: u64, frame: &Frame) -> Result<(), SinkError>;
}

/// Writes `frameNNNNN.png` files into one directory
#[derive(Debug, Clone)]
pub struct PngSequenceSink {
    dir: PathBuf,
}

impl PngSequenceSink {
    /// Create the output directory if needed
    pub fn create(dir: &Path) -> Result<Self, SinkError> {
        std::fs::create_dir_all(dir).map_err(|source| SinkError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn frame_path(&self, frame_index: u64) -> PathBuf {
        self.dir.join(format!("frame{:05}.png", frame_index))
    }
}

impl FrameSink for PngSequenceSink {
    fn write(&self, frame_index: u64, frame: &Frame) -> Result<(), SinkError> {
        let path = self.frame_path(frame_index);
        image::save_buffer(
            &path,
            &frame.data,
            frame.width as u32,
            frame.height as u32,
            image::ColorType::Rgb8,
        )
        .map_err(|source| SinkError::Encode {
            path: path.clone(),
            source,
        })?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }
}
