//! Seeded phase fields derived from a SHA-256 hash of the seed string.
//!
//! Every frequency bin gets an initial phase and an angular velocity. The key
//! for a bin is its centred frequency offset, so the same physical frequency
//! always draws the same random values regardless of array layout.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};

/// Half-range of the per-bin angular velocity (radians per second)
pub const PHASE_RATE_RANGE: f64 = 3.5;

/// Deterministic value in [0, 1) from `seed` and `key`.
///
/// First 32 bits of `sha256(seed ++ key)`, big-endian, divided by 2^32.
pub fn deterministic_unit(seed: &str, key: &str) -> f64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();
    let word = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    word as f64 / 4_294_967_296.0
}

/// Wrap an array index past the midpoint to a negative frequency offset
pub fn centred_offset(index: usize, size: usize) -> i64 {
    if index as f64 > size as f64 / 2.0 {
        index as i64 - size as i64
    } else {
        index as i64
    }
}

/// Per-bin initial phase and phase velocity, row-major (`y * width + x`)
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseFields {
    pub width: usize,
    pub height: usize,
    /// Initial phase in [0, 2π)
    pub base: Vec<f64>,
    /// Angular velocity in [-3.5, 3.5]
    pub rate: Vec<f64>,
}

impl PhaseFields {
    /// Hash out both fields for every bin of a `width` × `height` spectrum
    pub fn generate(seed: &str, width: usize, height: usize) -> Self {
        let mut base = Vec::with_capacity(width * height);
        let mut rate = Vec::with_capacity(width * height);

        for y in 0..height {
            let dy = centred_offset(y, height);
            for x in 0..width {
                let dx = centred_offset(x, width);
                let base_key = format!("{}_{}_phaseBase", dx, dy);
                let rate_key = format!("{}_{}_phaseRate", dx, dy);
                base.push(deterministic_unit(seed, &base_key) * PI * 2.0);
                rate.push((deterministic_unit(seed, &rate_key) - 0.5) * PHASE_RATE_RANGE * 2.0);
            }
        }

        Self {
            width,
            height,
            base,
            rate,
        }
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PhaseKey {
    seed: String,
    width: usize,
    height: usize,
}

/// Seed → phase fields memo shared by every layer of a render session.
///
/// Filled while the session is being built; afterwards layers only hold
/// `Arc` clones and never touch the map again.
#[derive(Debug, Default)]
pub struct PhaseCache {
    entries: Mutex<HashMap<PhaseKey, Arc<PhaseFields>>>,
}

impl PhaseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the fields for `seed`, generating them on first use.
    ///
    /// The lock is held across generation so concurrent first requests for
    /// the same seed produce a single set of fields.
    pub fn get_or_generate(&self, seed: &str, width: usize, height: usize) -> Arc<PhaseFields> {
        let key = PhaseKey {
            seed: seed.to_string(),
            width,
            height,
        };
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(fields) = entries.get(&key) {
            log::debug!("phase fields for seed '{}' reused", seed);
            return Arc::clone(fields);
        }

        log::debug!("generating {}x{} phase fields for seed '{}'", width, height, seed);
        let fields = Arc::new(PhaseFields::generate(seed, width, height));
        entries.insert(key, Arc::clone(&fields));
        fields
    }

    /// Number of distinct seeds generated so far
    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
