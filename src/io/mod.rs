// src/io/mod.rs
pub mod reader;
pub mod writer;

pub use reader::{load_band, load_band_pair, Band, BandPair, GeoInfo};
pub use writer::{write_ndvi_raster, RasterOutput};
