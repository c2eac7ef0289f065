// src/batch.rs
use anyhow::{Context, Result};
use log::{error, info};
use std::path::Path;

use crate::config::BatchConfig;
use crate::pipeline::NdviPipeline;

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: Vec<(usize, String)>,
}

/// Runs every scene in the batch file. A failing scene is logged and
/// recorded; the remaining scenes still run.
pub fn process_batch(config_path: &Path) -> Result<BatchSummary> {
    let config = BatchConfig::from_file(config_path)
        .with_context(|| format!("reading batch file {}", config_path.display()))?;

    info!(
        "Starting batch processing with {} scenes...",
        config.scenes.len()
    );

    let mut summary = BatchSummary::default();
    let total = config.scenes.len();

    for (i, scene) in config.scenes.iter().enumerate() {
        info!(
            "[{}/{}] {} + {} -> {}",
            i + 1,
            total,
            scene.red.display(),
            scene.nir.display(),
            scene.output.display()
        );

        let scene_config = config.scene_config(scene);
        let options = config.scene_outputs(scene);

        let result = NdviPipeline::new(scene_config)
            .map(|pipeline| pipeline.with_satellite(scene.satellite))
            .and_then(|pipeline| pipeline.run(&scene.red, &scene.nir))
            .and_then(|product| product.write_outputs(&scene.output, &options));

        match result {
            Ok(_) => summary.succeeded += 1,
            Err(e) => {
                error!("[{}/{}] skipped: {}", i + 1, total, e);
                summary.failed.push((i, e.to_string()));
            }
        }
    }

    info!(
        "Batch processing complete: {} succeeded, {} failed",
        summary.succeeded,
        summary.failed.len()
    );
    Ok(summary)
}
