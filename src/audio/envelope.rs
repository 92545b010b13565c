//! Short-time spectral envelope of an audio track.
//!
//! Both channels are windowed and transformed together as one complex
//! signal (left = real, right = imaginary), then separated per bin using the
//! conjugate symmetry of real-input spectra.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::pcm::PcmAudio;
use super::window::{biased_hann, window_offset, window_samples};
use crate::params::LayerOptions;

/// Linear roll-off below `cutoff_hz`
#[inline]
pub fn low_freq_attenuation(freq: f64, cutoff_hz: f64) -> f64 {
    if freq < cutoff_hz {
        freq / cutoff_hz
    } else {
        1.0
    }
}

/// `x.round()` with halves rounded up, matching sample-index rounding
#[inline]
fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Audio analysis state for one layer
pub struct AudioEnvelope {
    audio: PcmAudio,
    window_s: f64,
    window_bias: f64,
    window_offset_s: f64,
    transform_len: usize,
    low_freq_hz: f64,
    brighten: f64,
    gain: f64,
    fft: Arc<dyn Fft<f64>>,
}

impl AudioEnvelope {
    pub fn new(audio: PcmAudio, options: &LayerOptions) -> Self {
        let transform_len = window_samples(options.window_s, audio.sample_rate());
        let fft = FftPlanner::new().plan_fft_forward(transform_len);

        Self {
            window_s: options.window_s,
            window_bias: options.window_bias,
            window_offset_s: window_offset(options.window_s, options.window_bias),
            transform_len,
            low_freq_hz: options.low_freq_hz,
            brighten: options.brighten,
            gain: options.gain,
            fft,
            audio,
        }
    }

    pub fn duration_s(&self) -> f64 {
        self.audio.duration_s()
    }

    pub fn transform_len(&self) -> usize {
        self.transform_len
    }

    pub fn sample_rate(&self) -> u32 {
        self.audio.sample_rate()
    }

    /// Window the audio around `time` and transform it
    pub fn analyse(&self, time: f64) -> WindowSpectrum {
        let sample_rate = self.audio.sample_rate() as f64;
        let (left, right) = self.audio.stereo();
        let available = self.audio.len() as i64;

        let sample = (time + self.window_offset_s) * sample_rate;
        let start = round_half_up(sample);
        let end = round_half_up(sample + self.window_s * sample_rate);
        let span = (end - start).clamp(0, self.transform_len as i64);

        let mut buffer = vec![Complex::new(0.0, 0.0); self.transform_len];
        let mut sum2 = 0.0;
        let mut window_sum2 = 0.0;
        for offset in 0..span {
            let ratio = (offset as f64 + 0.5) / span as f64;
            let weight = biased_hann(ratio, self.window_bias);
            window_sum2 += weight * weight;

            let i = start + offset;
            if (0..available).contains(&i) {
                let l = left[i as usize] * weight;
                let r = right[i as usize] * weight;
                buffer[offset as usize] = Complex::new(l, r);
                sum2 += l * l + r * r;
            }
        }

        let rms = if window_sum2 > 0.0 {
            (sum2 / 2.0 / window_sum2).sqrt()
        } else {
            0.0
        };

        self.fft.process(&mut buffer);

        WindowSpectrum {
            bins: buffer,
            rms,
            sample_rate,
            low_freq_hz: self.low_freq_hz,
            brighten: self.brighten,
            gain: self.gain,
        }
    }
}

/// Packed stereo spectrum of one analysis window
#[derive(Debug, Clone)]
pub struct WindowSpectrum {
    bins: Vec<Complex<f64>>,
    rms: f64,
    sample_rate: f64,
    low_freq_hz: f64,
    brighten: f64,
    gain: f64,
}

impl WindowSpectrum {
    /// Window-power normalised RMS over both channels
    pub fn rms(&self) -> f64 {
        self.rms
    }

    /// Target active fraction for the synthesizer
    pub fn density(&self) -> f64 {
        self.rms * std::f64::consts::SQRT_2 * self.gain
    }

    /// Combined left/right magnitude of the bin nearest `freq`.
    ///
    /// Zero at DC, at or above Nyquist, and for negative frequencies.
    pub fn magnitude(&self, freq: f64) -> f64 {
        let ratio = freq / self.sample_rate;
        if !(ratio > 0.0 && ratio < 0.5) {
            return 0.0;
        }
        let n = self.bins.len();
        let k = ((ratio * n as f64).round() as usize).min(n - 1);
        let mirror = (n - k) % n;

        let (x_k, y_k) = (self.bins[k].re, self.bins[k].im);
        let (x_m, y_m) = (self.bins[mirror].re, self.bins[mirror].im);
        let left_re = (x_k + x_m) / 2.0;
        let left_im = (y_k - y_m) / 2.0;
        let right_re = (y_k + y_m) / 2.0;
        let right_im = (-x_k + x_m) / 2.0;

        (left_re * left_re + left_im * left_im + right_re * right_re + right_im * right_im).sqrt()
    }

    /// Amplitude function handed to the synthesizer
    pub fn amplitude(&self, freq: f64) -> f64 {
        let magnitude = self.magnitude(freq);
        if magnitude == 0.0 {
            return 0.0;
        }
        low_freq_attenuation(freq, self.low_freq_hz) * freq.powf(self.brighten) * magnitude
    }
}
