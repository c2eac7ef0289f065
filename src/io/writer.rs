// src/io/writer.rs
use gdal::raster::{Buffer, RasterCreationOptions};
use gdal::{DriverManager, Metadata};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::reader::GeoInfo;
use crate::error::Result;
use crate::processing::grid::Grid;
use crate::utils::fixed_point::{to_fixed_point, FIXED_POINT_NODATA};

/// GeoTIFF encoding options.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RasterOutput {
    /// Write scaled `i16` instead of `f32`.
    #[serde(default)]
    pub fixed_point: bool,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: i32,
    #[serde(default = "default_compress")]
    pub compress: String,
    #[serde(default = "default_compress_level")]
    pub compress_level: u8,
    #[serde(default = "default_true")]
    pub tiled: bool,
}

impl Default for RasterOutput {
    fn default() -> Self {
        Self {
            fixed_point: false,
            scale_factor: default_scale_factor(),
            compress: default_compress(),
            compress_level: default_compress_level(),
            tiled: true,
        }
    }
}

fn default_compress() -> String {
    "DEFLATE".to_string()
}

fn default_compress_level() -> u8 {
    6
}

fn default_scale_factor() -> i32 {
    10000
}

fn default_true() -> bool {
    true
}

impl RasterOutput {
    fn creation_options(&self) -> Vec<String> {
        let mut options = Vec::new();
        let compress = self.compress.to_uppercase();

        if compress != "NONE" {
            options.push(format!("COMPRESS={compress}"));
            match compress.as_str() {
                "DEFLATE" => options.push(format!("ZLEVEL={}", self.compress_level.min(9))),
                "ZSTD" => options.push(format!("ZSTD_LEVEL={}", self.compress_level.min(22))),
                _ => {}
            }
        }

        if self.tiled {
            options.push("TILED=YES".to_string());
        }
        options.push("NUM_THREADS=ALL_CPUS".to_string());
        options
    }
}

/// Writes the NDVI grid as a single-band GeoTIFF. Sentinel pixels become the
/// band's nodata value (`NaN` for float output).
pub fn write_ndvi_raster(
    ndvi: &Grid<f32>,
    geo_info: &GeoInfo,
    output_path: &Path,
    output: &RasterOutput,
) -> Result<()> {
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let creation_options = RasterCreationOptions::from_iter(output.creation_options());
    let (width, height) = ndvi.shape();

    let mut out_ds = if output.fixed_point {
        driver.create_with_band_type_with_options::<i16, _>(
            output_path,
            width,
            height,
            1,
            &creation_options,
        )?
    } else {
        driver.create_with_band_type_with_options::<f32, _>(
            output_path,
            width,
            height,
            1,
            &creation_options,
        )?
    };

    if !geo_info.projection.is_empty() {
        out_ds.set_projection(&geo_info.projection)?;
    }
    if let Some(geo_transform) = &geo_info.geo_transform {
        out_ds.set_geo_transform(geo_transform)?;
    }

    let mut band = out_ds.rasterband(1)?;
    if output.fixed_point {
        band.set_no_data_value(Some(FIXED_POINT_NODATA as f64))?;
        band.set_metadata_item(
            "SCALE",
            &format!("{}", 1.0 / output.scale_factor as f64),
            "",
        )?;
        band.set_metadata_item("OFFSET", "0", "")?;
        band.set_description(&format!("NDVI (scaled by {})", output.scale_factor))?;

        let fixed = to_fixed_point(ndvi.data(), output.scale_factor, FIXED_POINT_NODATA);
        if fixed.clamped > 0 {
            warn!(
                "{} pixels do not fit in int16 at scale {} and were clamped",
                fixed.clamped, output.scale_factor
            );
        }
        let mut buffer = Buffer::new((width, height), fixed.data);
        band.write((0, 0), (width, height), &mut buffer)?;
    } else {
        band.set_no_data_value(Some(f64::NAN))?;
        band.set_description("NDVI")?;

        let mut buffer = Buffer::new((width, height), ndvi.data().to_vec());
        band.write((0, 0), (width, height), &mut buffer)?;
    }

    out_ds.flush_cache()?;
    debug!("Wrote NDVI raster: {}", output_path.display());
    Ok(())
}
