//! prism command line renderer.
//!
//! Usage: `prism_cli <scene> <output-image> [settings.json]`

mod scenes;
mod settings;

use anyhow::{bail, Context, Result};
use settings::RenderSettings;
use std::path::PathBuf;

struct Args {
    scene: String,
    output: PathBuf,
    settings: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let program = args.next().unwrap_or_else(|| "prism_cli".to_string());
        let usage = format!(
            "usage: {} <scene> <output-image> [settings.json]\n  scenes: {}",
            program,
            scenes::SCENE_NAMES.join(", ")
        );

        let (Some(scene), Some(output)) = (args.next(), args.next()) else {
            bail!(usage);
        };
        let settings = args.next().map(PathBuf::from);
        if args.next().is_some() {
            bail!(usage);
        }

        Ok(Self {
            scene,
            output: PathBuf::from(output),
            settings,
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse(std::env::args())?;

    let settings = match &args.settings {
        Some(path) => RenderSettings::load(path)?,
        None => RenderSettings::default(),
    };
    log::debug!("Settings: {:?}", settings);

    let setup = scenes::build(&args.scene, &settings)?;
    let image = prism_renderer::render(&setup.camera, &setup.scene, &setup.config);

    image
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    log::info!("Wrote {}", args.output.display());

    Ok(())
}
