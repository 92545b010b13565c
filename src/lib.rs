//! Noisescape - audio-driven spectral noise frame renderer
//!
//! Each layer's noise is shaped by the short-time spectrum of an audio
//! track (or a fixed background spectrum), then layers are blended into
//! RGB frames and written out as a PNG sequence.

pub mod audio;
pub mod cli;
pub mod compositor;
pub mod error;
pub mod layer;
pub mod noise;
pub mod params;
pub mod progress;
pub mod rendering;
pub mod schedule;
pub mod session;
