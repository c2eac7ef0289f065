// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use ndvi_calc::batch::process_batch;
use ndvi_calc::cli::{Cli, Commands, SceneArgs};
use ndvi_calc::config::{ClassSpec, NdviConfig};
use ndvi_calc::pipeline::{NdviPipeline, OutputOptions};

fn load_config(path: Option<&std::path::Path>) -> Result<NdviConfig> {
    match path {
        Some(path) => NdviConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(NdviConfig::default()),
    }
}

/// Config file values with command-line overrides applied.
fn scene_config(scene: &SceneArgs) -> Result<NdviConfig> {
    let mut config = load_config(scene.config.as_deref())?;
    config.apply_overrides(scene);
    Ok(config)
}

fn build_pipeline(scene: &SceneArgs) -> Result<(NdviPipeline, NdviConfig)> {
    let config = scene_config(scene)?;
    let pipeline = NdviPipeline::new(config.clone())?.with_satellite(scene.satellite);
    Ok((pipeline, config))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run {
            scene,
            output,
            geotiff,
            fixed_point,
            no_csv,
        } => {
            let (pipeline, config) = build_pipeline(scene)?;
            let product = pipeline
                .run(&scene.red, &scene.nir)
                .context("NDVI calculation failed")?;

            let mut raster = config.raster.clone();
            raster.fixed_point |= *fixed_point;
            let options = OutputOptions {
                csv: !no_csv,
                geotiff: *geotiff,
                raster,
                ..OutputOptions::default()
            };
            product
                .write_outputs(output, &options)
                .with_context(|| format!("writing outputs to {}", output.display()))?;

            println!("Processing complete: {}", output.display());
        }
        Commands::Stats { scene } => {
            let (pipeline, _) = build_pipeline(scene)?;
            let product = pipeline
                .run(&scene.red, &scene.nir)
                .context("NDVI calculation failed")?;
            println!("{}", product.report.to_json()?);
        }
        Commands::Batch { config } => {
            let summary = process_batch(config)?;
            println!(
                "Batch complete: {} succeeded, {} failed",
                summary.succeeded,
                summary.failed.len()
            );
            if !summary.failed.is_empty() {
                anyhow::bail!("{} scenes failed", summary.failed.len());
            }
        }
        Commands::Bins { config } => {
            let config = load_config(config.as_deref())?;
            let classifier = config.classifier()?;
            let classes: Vec<ClassSpec> = classifier.bins().iter().map(ClassSpec::from).collect();
            println!("{}", serde_json::to_string_pretty(&classes)?);
        }
    }

    Ok(())
}
