//! Render settings read from JSON.

use anyhow::{Context, Result};
use prism_renderer::{Integrator, RenderConfig, DEFAULT_BUCKET_SIZE};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Which estimator produces the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tracer {
    #[default]
    Path,
    /// One bounce, surfaces flat-shaded by albedo
    Direct,
    /// Wireframes of bounds, BVH and camera paths seen from the side
    Debug,
}

/// User-facing render settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub max_depth: u32,
    pub seed: u64,
    pub bucket_size: u32,
    /// OBJ file for the `mesh` scene
    pub mesh: Option<PathBuf>,
    /// Image wrapped onto the textured sphere in `cornell`
    pub texture: Option<PathBuf>,
    /// Lens diameter; 0 keeps a pinhole camera
    pub aperture: f32,
    pub tracer: Tracer,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            samples: 64,
            max_depth: 16,
            seed: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
            mesh: None,
            texture: None,
            aperture: 0.0,
            tracer: Tracer::Path,
        }
    }
}

impl RenderSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        let settings = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse settings {}", path.display()))?;
        Ok(settings)
    }

    /// Integrator configuration; scenes fill in the background.
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            width: self.width.max(1),
            height: self.height.max(1),
            samples_per_pixel: self.samples.max(1),
            max_depth: self.max_depth,
            seed: self.seed,
            bucket_size: self.bucket_size.max(1),
            integrator: match self.tracer {
                Tracer::Path => Integrator::PathTrace,
                Tracer::Direct | Tracer::Debug => Integrator::Direct,
            },
            ..RenderConfig::default()
        }
    }
}
