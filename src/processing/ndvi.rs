// src/processing/ndvi.rs
use log::{debug, warn};
use rayon::prelude::*;

use super::grid::Grid;
use crate::error::{NdviError, Result};
use crate::io::reader::{Band, BandPair};

/// Sentinel stored for pixels whose NDVI is undefined.
pub const NDVI_UNDEFINED: f32 = f32::NAN;

/// Normalized Difference Vegetation Index calculator: (NIR - RED) / (NIR + RED)
#[derive(Debug, Clone, Copy, Default)]
pub struct NdviEngine {
    clip: bool,
}

impl NdviEngine {
    pub fn new() -> Self {
        Self { clip: false }
    }

    /// Clamp results to [-1, 1]. Off by default so out-of-range values from
    /// bad input data remain visible.
    pub fn with_clip(clip: bool) -> Self {
        Self { clip }
    }

    pub fn clips(&self) -> bool {
        self.clip
    }

    /// NDVI of a single pixel; `NaN` when undefined.
    pub fn pixel(&self, red: f32, nir: f32) -> f32 {
        if !red.is_finite() || !nir.is_finite() {
            return NDVI_UNDEFINED;
        }
        let denominator = nir + red;
        if denominator == 0.0 {
            return NDVI_UNDEFINED;
        }
        let ndvi = (nir - red) / denominator;
        if !ndvi.is_finite() {
            NDVI_UNDEFINED
        } else if self.clip {
            ndvi.clamp(-1.0, 1.0)
        } else {
            ndvi
        }
    }

    pub fn compute(&self, red: &Band, nir: &Band) -> Result<Grid<f32>> {
        if red.shape() != nir.shape() {
            return Err(NdviError::ShapeMismatch {
                red: red.shape(),
                nir: nir.shape(),
            });
        }

        let (width, height) = red.shape();
        let red_data = red.grid.data();
        let nir_data = nir.grid.data();

        let mut result_data = vec![NDVI_UNDEFINED; width * height];
        result_data
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, result)| {
                let red_val = red_data[i];
                let nir_val = nir_data[i];

                *result = if red.is_nodata(red_val) || nir.is_nodata(nir_val) {
                    NDVI_UNDEFINED
                } else {
                    self.pixel(red_val, nir_val)
                };
            });

        let out_of_range = result_data
            .par_iter()
            .filter(|v| v.abs() > 1.0)
            .count();
        if out_of_range > 0 {
            warn!(
                "{} pixels have NDVI outside [-1, 1]; check that the inputs are reflectance values",
                out_of_range
            );
        }
        debug!("Computed NDVI for {}x{} pixels (clip={})", width, height, self.clip);

        Ok(Grid::new(width, height, result_data))
    }

    pub fn compute_pair(&self, bands: &BandPair) -> Result<Grid<f32>> {
        self.compute(&bands.red, &bands.nir)
    }
}
