// src/present/report.rs
use serde::{Deserialize, Serialize};

use super::colormap::to_hex_color;
use super::histogram::Histogram;
use crate::config::Satellite;
use crate::processing::{Classifier, Grid};

/// Legend entry with the share of defined pixels in the class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub label: String,
    pub lower: f32,
    pub upper: f32,
    pub color: String,
    pub pixels: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdviReport {
    pub satellite: Option<String>,
    pub red_band: Option<String>,
    pub nir_band: Option<String>,
    pub width: usize,
    pub height: usize,
    pub valid_pixels: usize,
    pub undefined_pixels: usize,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub mean: Option<f64>,
    pub clipped: bool,
    pub classes: Vec<ClassSummary>,
    pub histogram: Histogram,
}

impl NdviReport {
    pub fn build(
        ndvi: &Grid<f32>,
        classes: &Grid<Option<usize>>,
        classifier: &Classifier,
        histogram: Histogram,
        satellite: Option<Satellite>,
        clipped: bool,
    ) -> Self {
        let mut valid_pixels = 0usize;
        let mut sum = 0f64;
        let mut min: Option<f32> = None;
        let mut max: Option<f32> = None;

        for &value in ndvi.data().iter().filter(|v| !v.is_nan()) {
            valid_pixels += 1;
            sum += value as f64;
            min = Some(min.map_or(value, |m| m.min(value)));
            max = Some(max.map_or(value, |m| m.max(value)));
        }

        let counts = classifier.counts(classes);
        let legend = classifier
            .bins()
            .iter()
            .zip(counts)
            .map(|(bin, pixels)| ClassSummary {
                label: bin.label.clone(),
                lower: bin.lower,
                upper: bin.upper,
                color: to_hex_color(bin.color),
                pixels,
                percent: if valid_pixels > 0 {
                    pixels as f64 * 100.0 / valid_pixels as f64
                } else {
                    0.0
                },
            })
            .collect();

        Self {
            satellite: satellite.map(|s| s.name().to_string()),
            red_band: satellite.map(|s| s.red_band().to_string()),
            nir_band: satellite.map(|s| s.nir_band().to_string()),
            width: ndvi.width(),
            height: ndvi.height(),
            valid_pixels,
            undefined_pixels: ndvi.len() - valid_pixels,
            min,
            max,
            mean: (valid_pixels > 0).then(|| sum / valid_pixels as f64),
            clipped,
            classes: legend,
            histogram,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
