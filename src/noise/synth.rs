//! Isotropic band-limited noise synthesised in the frequency domain.
//!
//! Each frame builds a complex spectrum whose magnitude follows a caller
//! supplied amplitude-vs-frequency function and whose phases drift linearly
//! with time, inverse-transforms it, and thresholds the result so that a
//! requested fraction of pixels reads as active.

use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::seed::{centred_offset, PhaseFields};
use super::stats::{normal_inv, saturating_tanh};
use crate::error::NoiseError;

/// Default output width (pixels)
pub const DEFAULT_WIDTH: usize = 320;

/// Default base frequency scale (Hz per unit of spectral radius)
pub const DEFAULT_FREQ_BASE: f64 = 40.0;

/// Height giving roughly 16:9 for `width`, rounded to a multiple of 16
pub fn default_height(width: usize) -> usize {
    (width as f64 / 16.0 * 9.0 / 16.0).round() as usize * 16
}

/// Per-layer mapping from raw noise to pixel intensity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldShaping {
    /// Width of the soft edge in units of field std (0 = hard threshold)
    pub fuzzy: f64,

    /// Threshold shift between centre and corners in units of field std
    pub vignette: f64,

    /// Exponent of the radial vignette curve
    pub vignette_sharpness: f64,
}

impl Default for FieldShaping {
    fn default() -> Self {
        Self {
            fuzzy: 0.5,
            vignette: 1.0,
            vignette_sharpness: 0.5,
        }
    }
}

/// Noise intensities in [0, 1], row-major (`y * width + x`)
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseField {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl NoiseField {
    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        Self {
            width,
            height,
            values: vec![value; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.width + x]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Fraction of pixels strictly above `level`
    pub fn fraction_above(&self, level: f64) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let count = self.values.iter().filter(|&&v| v > level).count();
        count as f64 / self.values.len() as f64
    }
}

/// Annuli spanning less than this (radians) only touch a corner bin
const DEGENERATE_SPAN: f64 = 1e-9;

/// Radial weight making energy per unit radius independent of direction.
///
/// On a rectangular grid an annulus of radius `dist` only spans
/// `[start, end]` of each quadrant once it passes the inscribed radius.
/// An annulus through the exact corner of a square grid has no span and
/// gets zero weight.
pub fn space_factor(dist: f64, width: usize, height: usize) -> Result<f64, NoiseError> {
    if dist == 0.0 {
        return Ok(0.0);
    }
    let short_edge = width.min(height) as f64 / 2.0;
    let long_edge = width.max(height) as f64 / 2.0;

    let start_angle = if dist <= short_edge {
        0.0
    } else {
        (short_edge / dist).acos()
    };
    let end_angle = if dist <= long_edge {
        FRAC_PI_2
    } else {
        (long_edge / dist).asin()
    };

    let span = end_angle - start_angle;
    if span.abs() < DEGENERATE_SPAN {
        return Ok(0.0);
    }
    if span < 0.0 || span > FRAC_PI_2 {
        return Err(NoiseError::Geometry {
            dist,
            short_edge,
            long_edge,
        });
    }
    Ok(1.0 / dist / span)
}

/// Centred frequency offset scaled so both axes share one sampling density
#[inline]
fn scaled_offset(index: usize, size: usize, mid_side: f64) -> f64 {
    centred_offset(index, size) as f64 * mid_side / size as f64
}

/// Spectral noise generator bound to one set of phase fields
pub struct SpectralNoise {
    width: usize,
    height: usize,
    freq_base: f64,
    shaping: FieldShaping,
    phases: Arc<PhaseFields>,
    row_fft: Arc<dyn Fft<f64>>,
    column_fft: Arc<dyn Fft<f64>>,
}

impl SpectralNoise {
    /// Create a generator; output dimensions follow the phase fields
    pub fn new(phases: Arc<PhaseFields>, freq_base: f64, shaping: FieldShaping) -> Self {
        let mut planner = FftPlanner::new();
        let row_fft = planner.plan_fft_inverse(phases.width);
        let column_fft = planner.plan_fft_inverse(phases.height);

        Self {
            width: phases.width,
            height: phases.height,
            freq_base,
            shaping,
            phases,
            row_fft,
            column_fft,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn phases(&self) -> &Arc<PhaseFields> {
        &self.phases
    }

    /// Render the field at `time`.
    ///
    /// `amplitude` maps a frequency (Hz) to spectral magnitude; `density` is
    /// the target fraction of active pixels. Densities outside (0, 1) short
    /// circuit to a constant field.
    pub fn noise<F>(&self, time: f64, amplitude: F, density: f64) -> Result<NoiseField, NoiseError>
    where
        F: Fn(f64) -> f64,
    {
        if density <= 0.0 {
            return Ok(NoiseField::filled(self.width, self.height, 0.0));
        }
        if density >= 1.0 {
            return Ok(NoiseField::filled(self.width, self.height, 1.0));
        }

        let mut spectrum = self.spectrum(time, &amplitude)?;
        self.inverse_transform(&mut spectrum);
        let raw: Vec<f64> = spectrum.iter().map(|c| c.re).collect();
        Ok(self.shape(&raw, density))
    }

    fn spectrum<F>(&self, time: f64, amplitude: &F) -> Result<Vec<Complex<f64>>, NoiseError>
    where
        F: Fn(f64) -> f64,
    {
        let (width, height) = (self.width, self.height);
        let mid_side = ((width * height) as f64).sqrt();
        let mut spectrum = Vec::with_capacity(width * height);

        for y in 0..height {
            let dy = scaled_offset(y, height, mid_side);
            for x in 0..width {
                let dx = scaled_offset(x, width, mid_side);
                let dist = (dx * dx + dy * dy).sqrt();
                let amp = amplitude(self.freq_base * dist) * space_factor(dist, width, height)?;

                let i = self.phases.index(x, y);
                let phase = self.phases.base[i] + time * self.phases.rate[i];
                spectrum.push(Complex::from_polar(amp, phase));
            }
        }
        Ok(spectrum)
    }

    /// 2D inverse DFT: every row, then every column (via a transpose)
    fn inverse_transform(&self, data: &mut [Complex<f64>]) {
        let (width, height) = (self.width, self.height);
        self.row_fft.process(data);

        let mut columns = vec![Complex::new(0.0, 0.0); width * height];
        for y in 0..height {
            for x in 0..width {
                columns[x * height + y] = data[y * width + x];
            }
        }
        self.column_fft.process(&mut columns);

        let scale = 1.0 / (width * height) as f64;
        for y in 0..height {
            for x in 0..width {
                data[y * width + x] = columns[x * height + y] * scale;
            }
        }
    }

    /// Threshold the raw field against `density`, with vignette and soft edge
    fn shape(&self, raw: &[f64], density: f64) -> NoiseField {
        let (width, height) = (self.width, self.height);
        let pixels = (width * height) as f64;

        let sum2: f64 = raw.iter().map(|v| v * v).sum();
        let std = if sum2 > 0.0 { (sum2 / pixels).sqrt() } else { 1.0 };

        let fuzzy_width = self.shaping.fuzzy * std;
        let vignette_offset = self.shaping.vignette * std;
        let vignette_distance2 = pixels / 4.0;
        let sharpness = self.shaping.vignette_sharpness;
        let vignette_midpoint = vignette_offset * 0.25_f64.powf(sharpness);
        let threshold = normal_inv(density, 0.0, std) + vignette_midpoint;

        let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
        let mut values = Vec::with_capacity(raw.len());
        for y in 0..height {
            let dy = y as f64 - cy;
            for x in 0..width {
                let dx = x as f64 - cx;
                let centre_dist2 = dx * dx + dy * dy;
                let relative = raw[y * width + x] + threshold
                    - vignette_offset * (centre_dist2 / vignette_distance2).powf(sharpness);

                let value = if fuzzy_width == 0.0 {
                    if relative > 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    saturating_tanh(relative / fuzzy_width) * 0.5 + 0.5
                };
                values.push(value);
            }
        }

        NoiseField {
            width,
            height,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_4, PI};

    const HARD: FieldShaping = FieldShaping {
        fuzzy: 0.0,
        vignette: 0.0,
        vignette_sharpness: 0.5,
    };

    fn generator(seed: &str, width: usize, height: usize, shaping: FieldShaping) -> SpectralNoise {
        let phases = Arc::new(PhaseFields::generate(seed, width, height));
        SpectralNoise::new(phases, DEFAULT_FREQ_BASE, shaping)
    }

    /// Cancels the radial weight inside the inscribed radius (white noise)
    fn white(freq: f64) -> f64 {
        freq
    }

    fn pink(freq: f64) -> f64 {
        if freq > 0.0 {
            1.0 / freq
        } else {
            0.0
        }
    }

    #[test]
    fn test_default_height() {
        assert_eq!(default_height(320), 176);
        assert_eq!(default_height(1280), 720);
        assert_eq!(default_height(1920), 1088);
    }

    #[test]
    fn test_degenerate_density() {
        let noise = generator("degenerate", 24, 16, FieldShaping::default());
        for time in [0.0, 1.5, -3.0] {
            let zero = noise.noise(time, pink, 0.0).unwrap();
            assert!(zero.values().iter().all(|&v| v == 0.0));
            let negative = noise.noise(time, pink, -0.5).unwrap();
            assert!(negative.values().iter().all(|&v| v == 0.0));
            let one = noise.noise(time, pink, 1.0).unwrap();
            assert!(one.values().iter().all(|&v| v == 1.0));
        }
    }

    #[test]
    fn test_noise_is_deterministic() {
        let a = generator("repeatable", 32, 18, FieldShaping::default());
        let b = generator("repeatable", 32, 18, FieldShaping::default());
        assert_eq!(a.phases().as_ref(), b.phases().as_ref());

        let fa = a.noise(0.75, pink, 0.4).unwrap();
        let fb = b.noise(0.75, pink, 0.4).unwrap();
        let bits_a: Vec<u64> = fa.values().iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u64> = fb.values().iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }

    #[test]
    fn test_noise_evolves_with_time() {
        let noise = generator("evolving", 32, 18, FieldShaping::default());
        let early = noise.noise(0.0, pink, 0.5).unwrap();
        let later = noise.noise(2.0, pink, 0.5).unwrap();
        assert_ne!(early, later);
    }

    #[test]
    fn test_output_ranges() {
        let hard = generator("ranges", 32, 18, HARD);
        let field = hard.noise(0.3, pink, 0.5).unwrap();
        assert!(field.values().iter().all(|&v| v == 0.0 || v == 1.0));

        let fuzzy = generator("ranges", 32, 18, FieldShaping::default());
        let field = fuzzy.noise(0.3, pink, 0.5).unwrap();
        assert!(field.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!(field.values().iter().any(|&v| v > 0.0 && v < 1.0));
    }

    #[test]
    fn test_density_tracks_active_fraction() {
        let noise = generator("density", 64, 64, HARD);

        let mut previous = 0.0;
        for density in [0.1, 0.3, 0.5, 0.7, 0.9] {
            let fraction = noise.noise(1.0, white, density).unwrap().fraction_above(0.5);
            assert!(
                (fraction - density).abs() < 0.1,
                "density {} gave active fraction {}",
                density,
                fraction
            );
            assert!(fraction >= previous);
            previous = fraction;
        }
    }

    #[test]
    fn test_threshold_monotonic_across_seeds() {
        for seed in ["mono-a", "mono-b", "mono-c"] {
            let noise = generator(seed, 40, 24, FieldShaping::default());
            let low = noise.noise(0.5, pink, 0.25).unwrap().fraction_above(0.5);
            let mid = noise.noise(0.5, pink, 0.5).unwrap().fraction_above(0.5);
            let high = noise.noise(0.5, pink, 0.75).unwrap().fraction_above(0.5);
            assert!(low <= mid && mid <= high, "{}: {} {} {}", seed, low, mid, high);
        }
    }

    #[test]
    fn test_vignette_darkens_edges() {
        let shaping = FieldShaping {
            fuzzy: 0.0,
            vignette: 3.0,
            vignette_sharpness: 0.5,
        };
        let noise = generator("vignette", 64, 36, shaping);
        let field = noise.noise(0.0, white, 0.5).unwrap();

        let (mut centre, mut centre_n, mut edge, mut edge_n) = (0.0, 0, 0.0, 0);
        for y in 0..36 {
            for x in 0..64 {
                let dx = x as f64 - 32.0;
                let dy = y as f64 - 18.0;
                let r2 = (dx * dx + dy * dy) / (64.0 * 36.0 / 4.0);
                if r2 < 0.1 {
                    centre += field.get(x, y);
                    centre_n += 1;
                } else if r2 > 1.0 {
                    edge += field.get(x, y);
                    edge_n += 1;
                }
            }
        }
        assert!(centre / centre_n as f64 > edge / edge_n as f64 + 0.3);
    }

    #[test]
    fn test_space_factor_inside_inscribed_radius() {
        let f = space_factor(10.0, 64, 36).unwrap();
        assert!((f - 1.0 / 10.0 / FRAC_PI_2).abs() < 1e-15);
        assert_eq!(space_factor(0.0, 64, 36).unwrap(), 0.0);
        // Exact edge radii stay on the cheap branch
        assert!(space_factor(18.0, 64, 36).is_ok());
        assert!(space_factor(32.0, 64, 36).is_ok());
    }

    #[test]
    fn test_space_factor_square_corner_has_no_weight() {
        let corner = (2.0_f64 * 32.0 * 32.0).sqrt();
        assert_eq!(space_factor(corner, 64, 64).unwrap(), 0.0);
        assert!(space_factor(corner - 0.5, 64, 64).unwrap() > 0.0);
        assert!(matches!(
            space_factor(corner + 1.0, 64, 64),
            Err(NoiseError::Geometry { .. })
        ));
    }

    #[test]
    fn test_space_factor_partial_annulus() {
        // Between the edges the annulus starts at acos(short/dist)
        let dist = 25.0;
        let span = FRAC_PI_2 - (18.0_f64 / dist).acos();
        let f = space_factor(dist, 64, 36).unwrap();
        assert!((f * dist * span - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_radial_shells_carry_equal_weight() {
        // Square grid: bin density is 1 per unit area, so the summed weight of
        // a shell of width 4 should be ~4 * 4 at every radius.
        let size = 64;
        let mid_side = size as f64;
        let shell = 4.0;
        let mut sums = vec![0.0; 12];
        for y in 0..size {
            let dy = scaled_offset(y, size, mid_side);
            for x in 0..size {
                let dx = scaled_offset(x, size, mid_side);
                let dist = (dx * dx + dy * dy).sqrt();
                let bucket = (dist / shell) as usize;
                if bucket < sums.len() {
                    sums[bucket] += space_factor(dist, size, size).unwrap();
                }
            }
        }
        for (bucket, sum) in sums.iter().enumerate().skip(3).take(7) {
            assert!(
                (sum - 4.0 * shell).abs() < 0.2 * 4.0 * shell,
                "shell {} carries {}",
                bucket,
                sum
            );
        }
    }

    #[test]
    fn test_octants_carry_equal_weight_per_shell() {
        // Flat amplitude on a 16:9 grid: within every radius shell, each of
        // the eight angular octants should receive the same spectral
        // magnitude, averaged over seeds. Bins on the axes sit on octant
        // boundaries and are left out.
        let (width, height) = (96, 54);
        let mid_side = ((width * height) as f64).sqrt();
        let shell = 6.0;
        let shells = 6;
        let seeds = ["octant-a", "octant-b", "octant-c"];

        let mut sums = vec![[0.0_f64; 8]; shells];
        for seed in seeds {
            let noise = generator(seed, width, height, FieldShaping::default());
            let spectrum = noise.spectrum(0.7, &|_: f64| 1.0).unwrap();
            for y in 0..height {
                let dy = scaled_offset(y, height, mid_side);
                for x in 0..width {
                    let dx = scaled_offset(x, width, mid_side);
                    if dx == 0.0 || dy == 0.0 {
                        continue;
                    }
                    let bucket = ((dx * dx + dy * dy).sqrt() / shell) as usize;
                    if bucket == 0 || bucket >= shells {
                        continue;
                    }
                    let angle = dy.atan2(dx) + PI;
                    let octant = (angle / FRAC_PI_4) as usize % 8;
                    sums[bucket][octant] += spectrum[y * width + x].norm() / seeds.len() as f64;
                }
            }
        }

        for (bucket, octants) in sums.iter().enumerate().skip(1) {
            let mean = octants.iter().sum::<f64>() / 8.0;
            for (octant, sum) in octants.iter().enumerate() {
                assert!(
                    (sum / mean - 1.0).abs() < 0.08,
                    "shell {} octant {}: {} vs mean {}",
                    bucket,
                    octant,
                    sum,
                    mean
                );
            }
        }
    }
}
