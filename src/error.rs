// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the NDVI pipeline.
///
/// `Decode`, `ShapeMismatch` and `NoData` are input-data problems: the caller
/// reports them and the user fixes the input and retries.
#[derive(Debug, Error)]
pub enum NdviError {
    #[error("cannot read raster {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error(
        "band dimensions differ: red is {}x{}, nir is {}x{}",
        red.0, red.1, nir.0, nir.1
    )]
    ShapeMismatch {
        red: (usize, usize),
        nir: (usize, usize),
    },

    #[error("grid of {width}x{height} cannot hold {len} values")]
    GridSize {
        width: usize,
        height: usize,
        len: usize,
    },

    #[error("no valid NDVI pixels: every pixel is nodata or has a zero denominator")]
    NoData,

    #[error("invalid classification scheme: {0}")]
    InvalidClassification(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
}

pub type Result<T> = std::result::Result<T, NdviError>;
