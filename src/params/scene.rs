//! Scene description: the layers to stack and scene-wide settings.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::layer::LayerOverrides;
use crate::compositor::BlendMode;
use crate::error::ConfigError;

fn default_seed() -> String {
    "seed".to_string()
}

/// One entry of the `layers` array
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSpec {
    /// Audio driving this layer; absent for background layers
    pub wav: Option<PathBuf>,

    /// Layer colour (default black)
    pub rgb: Option<[u8; 3]>,

    /// Suffix appended to the seed; layers sharing a group share phases
    pub group: Option<String>,

    /// Length of a background layer (seconds, default 1)
    pub duration: Option<f64>,

    #[serde(flatten)]
    pub overrides: LayerOverrides,
}

impl LayerSpec {
    pub fn colour(&self) -> [u8; 3] {
        self.rgb.unwrap_or([0, 0, 0])
    }
}

/// Whole-scene configuration, usually read from JSON
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneConfig {
    #[serde(default = "default_seed")]
    pub seed: String,

    /// Give every layer its own seed even without a group
    #[serde(default)]
    pub independent: bool,

    #[serde(default)]
    pub combine: BlendMode,

    /// Colour of the frame before any layer is applied
    pub rgb: Option<[u8; 3]>,

    /// Defaults applied to every layer before its own overrides
    #[serde(flatten)]
    pub overrides: LayerOverrides,

    pub layers: Vec<LayerSpec>,
}

impl SceneConfig {
    /// A scene with one black audio layer, used for a bare WAV input
    pub fn single_wav(path: PathBuf) -> Self {
        Self {
            seed: default_seed(),
            independent: false,
            combine: BlendMode::default(),
            rgb: None,
            overrides: LayerOverrides::default(),
            layers: vec![LayerSpec {
                wav: Some(path),
                rgb: Some([0, 0, 0]),
                ..Default::default()
            }],
        }
    }

    pub fn from_json(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.layers.is_empty() {
            return Err(ConfigError::NoLayers);
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    /// Seed for layer `index`: scene seed, then index if independent, then group
    pub fn layer_seed(&self, index: usize) -> String {
        let mut seed = self.seed.clone();
        if self.independent {
            seed.push_str(&index.to_string());
        }
        if let Some(group) = self.layers.get(index).and_then(|l| l.group.as_deref()) {
            seed.push_str(group);
        }
        seed
    }

    pub fn start_colour(&self) -> [u8; 3] {
        self.rgb.unwrap_or_else(|| self.combine.start_colour())
    }
}
