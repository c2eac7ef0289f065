// src/io/reader.rs
use gdal::Dataset;
use log::debug;
use std::path::Path;

use crate::error::{NdviError, Result};
use crate::processing::grid::Grid;

/// Geo-referencing carried from the red band to any raster output.
#[derive(Debug, Clone, Default)]
pub struct GeoInfo {
    pub projection: String,
    pub geo_transform: Option<[f64; 6]>,
}

/// A single-channel reflectance raster.
#[derive(Debug, Clone)]
pub struct Band {
    pub grid: Grid<f32>,
    pub nodata: Option<f64>,
    pub geo: GeoInfo,
}

impl Band {
    /// In-memory band without geo-referencing.
    pub fn new(grid: Grid<f32>, nodata: Option<f64>) -> Self {
        Self {
            grid,
            nodata,
            geo: GeoInfo::default(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    /// True when `value` is this band's nodata marker.
    pub fn is_nodata(&self, value: f32) -> bool {
        match self.nodata {
            Some(nodata) if nodata.is_nan() => value.is_nan(),
            Some(nodata) => value == nodata as f32,
            None => false,
        }
    }
}

/// Red and NIR bands with identical dimensions.
#[derive(Debug, Clone)]
pub struct BandPair {
    pub red: Band,
    pub nir: Band,
}

impl BandPair {
    pub fn new(red: Band, nir: Band) -> Result<Self> {
        if red.shape() != nir.shape() {
            return Err(NdviError::ShapeMismatch {
                red: red.shape(),
                nir: nir.shape(),
            });
        }
        Ok(Self { red, nir })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.red.shape()
    }
}

/// Reads band 1 of a raster as `f32`.
pub fn load_band(path: &Path) -> Result<Band> {
    let decode_error = |reason: String| NdviError::Decode {
        path: path.to_path_buf(),
        reason,
    };

    let dataset = Dataset::open(path).map_err(|e| decode_error(e.to_string()))?;
    let band = dataset
        .rasterband(1)
        .map_err(|e| decode_error(format!("no readable raster band ({e})")))?;

    let (width, height) = band.size();
    if width == 0 || height == 0 {
        return Err(decode_error("raster has no pixels".to_string()));
    }
    let nodata = band.no_data_value();

    let buffer = band
        .read_as::<f32>((0, 0), (width, height), (width, height), None)
        .map_err(|e| decode_error(e.to_string()))?;
    let grid = Grid::try_new(width, height, buffer.data().to_vec())
        .map_err(|e| decode_error(e.to_string()))?;

    let geo = GeoInfo {
        projection: dataset.projection(),
        geo_transform: dataset.geo_transform().ok(),
    };

    debug!(
        "Read {}: {}x{} pixels, nodata={:?}",
        path.display(),
        width,
        height,
        nodata
    );

    Ok(Band {
        grid,
        nodata,
        geo,
    })
}

/// Loads the red and NIR bands and checks that their dimensions agree.
pub fn load_band_pair(red_path: &Path, nir_path: &Path) -> Result<BandPair> {
    let red = load_band(red_path)?;
    let nir = load_band(nir_path)?;
    BandPair::new(red, nir)
}
