//! Parameter definitions with physical units and documented semantics.
//!
//! Layer tunables are resolved once from defaults, scene settings and layer
//! overrides into immutable structs before rendering begins.

mod layer;
mod render;
mod scene;

// Re-export all types
pub use layer::{LayerOptions, LayerOverrides};
pub use render::RenderSettings;
pub use scene::{LayerSpec, SceneConfig};
