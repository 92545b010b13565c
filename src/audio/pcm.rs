//! Decoded PCM buffers and the WAV loader that produces them.

use std::io::Read;
use std::path::Path;

use crate::error::AudioError;

/// Decoded audio: one sample vector per channel, normalised to [-1, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct PcmAudio {
    channels: Vec<Vec<f64>>,
    sample_rate: u32,
}

impl PcmAudio {
    /// Wrap channel data, checking it is non-empty and rectangular
    pub fn new(channels: Vec<Vec<f64>>, sample_rate: u32) -> Result<Self, AudioError> {
        if channels.is_empty() {
            return Err(AudioError::NoChannels);
        }
        if sample_rate == 0 {
            return Err(AudioError::ZeroSampleRate);
        }
        let expected = channels[0].len();
        for (channel, samples) in channels.iter().enumerate() {
            if samples.len() != expected {
                return Err(AudioError::RaggedChannels {
                    channel,
                    found: samples.len(),
                    expected,
                });
            }
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    pub fn mono(samples: Vec<f64>, sample_rate: u32) -> Result<Self, AudioError> {
        Self::new(vec![samples], sample_rate)
    }

    /// Decode a WAV file from disk
    pub fn from_wav(path: &Path) -> Result<Self, AudioError> {
        let reader = hound::WavReader::open(path)?;
        Self::from_wav_reader(reader)
    }

    /// Decode from an open reader, de-interleaving and normalising samples
    pub fn from_wav_reader<R: Read>(mut reader: hound::WavReader<R>) -> Result<Self, AudioError> {
        let spec = reader.spec();
        let channel_count = spec.channels as usize;
        if channel_count == 0 {
            return Err(AudioError::NoChannels);
        }

        let interleaved: Vec<f64> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .map(|s| s.map(f64::from))
                .collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = (1_i64 << (spec.bits_per_sample - 1)) as f64;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f64 / scale))
                    .collect::<Result<_, _>>()?
            }
        };

        let frames = interleaved.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in interleaved.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Self::new(channels, spec.sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channel(&self, index: usize) -> &[f64] {
        &self.channels[index]
    }

    /// Left and right channels; mono audio is used for both
    pub fn stereo(&self) -> (&[f64], &[f64]) {
        let right = if self.channels.len() > 1 { 1 } else { 0 };
        (&self.channels[0], &self.channels[right])
    }

    pub fn duration_s(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }
}

/// Collaborator that turns an audio path into decoded PCM
pub trait AudioSource {
    fn load(&self, path: &Path) -> Result<PcmAudio, AudioError>;
}

/// Loads WAV files from disk via hound
#[derive(Debug, Clone, Copy, Default)]
pub struct WavLoader;

impl AudioSource for WavLoader {
    fn load(&self, path: &Path) -> Result<PcmAudio, AudioError> {
        let audio = PcmAudio::from_wav(path)?;
        log::info!(
            "loaded {} ({} ch @ {}Hz, {:.2}s)",
            path.display(),
            audio.channel_count(),
            audio.sample_rate(),
            audio.duration_s()
        );
        Ok(audio)
    }
}
