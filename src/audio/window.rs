//! Analysis window shape and sizing.

use std::f64::consts::PI;

/// Raised-cosine weight at normalised position `ratio` in [0, 1).
///
/// The position is warped by `ratio^bias` before the cosine, which moves the
/// window's mass towards the end of the span for `bias > 1`.
#[inline]
pub fn biased_hann(ratio: f64, bias: f64) -> f64 {
    0.5 - 0.5 * (ratio.powf(bias) * PI * 2.0).cos()
}

/// Transform length: smallest power of two covering the window
pub fn window_samples(window_s: f64, sample_rate: u32) -> usize {
    let samples = (window_s * sample_rate as f64).ceil().max(1.0) as usize;
    samples.next_power_of_two()
}

/// Start offset (seconds) that puts the window peak on the query time
pub fn window_offset(window_s: f64, bias: f64) -> f64 {
    -window_s * 0.5_f64.powf(1.0 / bias)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biased_hann_symmetric_when_unbiased() {
        assert!(biased_hann(0.0, 1.0).abs() < 1e-15);
        assert!((biased_hann(0.5, 1.0) - 1.0).abs() < 1e-15);
        assert!((biased_hann(0.25, 1.0) - biased_hann(0.75, 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_biased_hann_peak_moves_with_bias() {
        let bias = 3.0;
        let peak = 0.5_f64.powf(1.0 / bias);
        assert!((biased_hann(peak, bias) - 1.0).abs() < 1e-12);
        // Mass shifts late: the first quarter is almost silent
        assert!(biased_hann(0.25, bias) < 0.01);
        assert!(biased_hann(0.9, bias) > 0.5);
    }

    #[test]
    fn test_window_samples_power_of_two() {
        assert_eq!(window_samples(0.2, 44100), 16384);
        assert_eq!(window_samples(0.2, 8000), 2048);
        assert_eq!(window_samples(0.25, 8192), 2048);
        assert_eq!(window_samples(0.0, 8000), 1);
    }

    #[test]
    fn test_window_offset_centres_peak() {
        let offset = window_offset(0.2, 3.0);
        let peak = 0.5_f64.powf(1.0 / 3.0);
        assert!((offset + 0.2 * peak).abs() < 1e-15);
        assert!((window_offset(0.2, 1.0) + 0.1).abs() < 1e-15);
    }
}
