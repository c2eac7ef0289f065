// src/config.rs
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::SceneArgs;
use crate::error::{NdviError, Result};
use crate::io::RasterOutput;
use crate::pipeline::OutputOptions;
use crate::present::colormap::{parse_hex_color, to_hex_color};
use crate::processing::classify::{default_bins, ClassBin, Classifier};

/// Sensor that produced the bands; only used to label outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Satellite {
    /// Landsat 8/9 OLI (Red = B4, NIR = B5)
    Landsat,
    /// Sentinel-2 MSI (Red = B4, NIR = B8)
    Sentinel2,
}

impl Satellite {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Landsat => "Landsat 8/9",
            Self::Sentinel2 => "Sentinel-2",
        }
    }

    pub fn red_band(&self) -> &'static str {
        "B4"
    }

    pub fn nir_band(&self) -> &'static str {
        match self {
            Self::Landsat => "B5",
            Self::Sentinel2 => "B8",
        }
    }
}

/// A classification bin as written in the config file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ClassSpec {
    pub lower: f32,
    pub upper: f32,
    pub label: String,
    /// `#rrggbb`
    pub color: String,
}

impl From<&ClassBin> for ClassSpec {
    fn from(bin: &ClassBin) -> Self {
        Self {
            lower: bin.lower,
            upper: bin.upper,
            label: bin.label.clone(),
            color: to_hex_color(bin.color),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct NdviConfig {
    #[serde(default = "default_classes")]
    pub classes: Vec<ClassSpec>,
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    #[serde(default = "default_histogram_stride")]
    pub histogram_stride: usize,
    #[serde(default)]
    pub clip: bool,
    /// Longest side of the colour map image; full resolution when unset.
    #[serde(default)]
    pub preview_size: Option<u32>,
    #[serde(default)]
    pub raster: RasterOutput,
}

fn default_classes() -> Vec<ClassSpec> {
    default_bins().iter().map(ClassSpec::from).collect()
}

fn default_histogram_bins() -> usize {
    50
}

fn default_histogram_stride() -> usize {
    1
}

impl Default for NdviConfig {
    fn default() -> Self {
        Self {
            classes: default_classes(),
            histogram_bins: default_histogram_bins(),
            histogram_stride: default_histogram_stride(),
            clip: false,
            preview_size: None,
            raster: RasterOutput::default(),
        }
    }
}

impl NdviConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        // reject bad class lists at load time rather than mid-run
        config.classifier()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Applies command-line flags on top of file values. Flags left unset keep
    /// the file value; `--clip` can only turn clipping on.
    pub fn apply_overrides(&mut self, args: &SceneArgs) {
        if args.clip {
            self.clip = true;
        }
        if let Some(bins) = args.histogram_bins {
            self.histogram_bins = bins;
        }
        if let Some(stride) = args.histogram_stride {
            self.histogram_stride = stride;
        }
        if args.preview_size.is_some() {
            self.preview_size = args.preview_size;
        }
    }

    pub fn classifier(&self) -> Result<Classifier> {
        let bins = self
            .classes
            .iter()
            .map(|spec| {
                let color = parse_hex_color(&spec.color).ok_or_else(|| {
                    NdviError::InvalidClassification(format!(
                        "class '{}' has invalid color '{}'",
                        spec.label, spec.color
                    ))
                })?;
                Ok(ClassBin::new(spec.lower, spec.upper, spec.label.clone(), color))
            })
            .collect::<Result<Vec<_>>>()?;
        Classifier::new(bins)
    }
}

/// Several scenes processed with shared settings.
#[derive(Deserialize, Serialize, Debug)]
pub struct BatchConfig {
    #[serde(default)]
    pub global: NdviConfig,
    pub scenes: Vec<Scene>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Scene {
    pub red: PathBuf,
    pub nir: PathBuf,
    /// Output directory for this scene.
    pub output: PathBuf,
    pub satellite: Option<Satellite>,
    pub clip: Option<bool>,
    pub geotiff: Option<bool>,
}

impl BatchConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        config.global.classifier()?;
        Ok(config)
    }

    /// Scene settings with per-scene overrides applied.
    pub fn scene_config(&self, scene: &Scene) -> NdviConfig {
        let mut config = self.global.clone();
        if let Some(clip) = scene.clip {
            config.clip = clip;
        }
        config
    }

    /// Artifacts for one scene: CSV always, GeoTIFF only when the scene asks.
    pub fn scene_outputs(&self, scene: &Scene) -> OutputOptions {
        OutputOptions {
            geotiff: scene.geotiff.unwrap_or(false),
            raster: self.global.raster.clone(),
            ..OutputOptions::default()
        }
    }
}
