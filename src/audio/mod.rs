//! Audio input and short-time spectral analysis.
//!
//! Decoded PCM comes in through an [`AudioSource`]; [`AudioEnvelope`] turns a
//! window of it into the amplitude function and density that drive a layer.

mod envelope;
mod pcm;
mod window;

// Re-export public types
pub use envelope::{low_freq_attenuation, AudioEnvelope, WindowSpectrum};
pub use pcm::{AudioSource, PcmAudio, WavLoader};
pub use window::{biased_hann, window_offset, window_samples};
