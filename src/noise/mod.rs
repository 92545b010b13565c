//! Seeded spectral noise synthesis.

mod seed;
mod stats;
mod synth;

pub use seed::{centred_offset, deterministic_unit, PhaseCache, PhaseFields};
pub use stats::{normal_inv, probit, saturating_tanh};
pub use synth::{
    default_height, space_factor, FieldShaping, NoiseField, SpectralNoise, DEFAULT_FREQ_BASE,
    DEFAULT_WIDTH,
};
