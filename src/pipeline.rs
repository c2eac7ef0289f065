// src/pipeline.rs
use image::RgbaImage;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{NdviConfig, Satellite};
use crate::error::{NdviError, Result};
use crate::io::{load_band_pair, write_ndvi_raster, BandPair, GeoInfo, RasterOutput};
use crate::present::colormap::{preview, render_class_map};
use crate::present::export::{export_rows, write_csv_file, ExportRow};
use crate::present::{Histogram, NdviReport};
use crate::processing::{Classifier, Grid, NdviEngine};

pub const MAP_FILE: &str = "ndvi_map.png";
pub const HISTOGRAM_FILE: &str = "ndvi_histogram.png";
pub const CSV_FILE: &str = "ndvi_values.csv";
pub const REPORT_FILE: &str = "ndvi_report.json";
pub const RASTER_FILE: &str = "ndvi.tif";

/// Which artifacts `NdviProduct::write_outputs` produces.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub csv: bool,
    pub geotiff: bool,
    pub raster: RasterOutput,
    pub histogram_size: (u32, u32),
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            csv: true,
            geotiff: false,
            raster: RasterOutput::default(),
            histogram_size: (800, 400),
        }
    }
}

/// Load → compute → classify → present, once per call.
pub struct NdviPipeline {
    engine: NdviEngine,
    classifier: Classifier,
    config: NdviConfig,
    satellite: Option<Satellite>,
}

impl NdviPipeline {
    pub fn new(config: NdviConfig) -> Result<Self> {
        Ok(Self {
            engine: NdviEngine::with_clip(config.clip),
            classifier: config.classifier()?,
            config,
            satellite: None,
        })
    }

    pub fn with_satellite(mut self, satellite: Option<Satellite>) -> Self {
        self.satellite = satellite;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn run(&self, red_path: &Path, nir_path: &Path) -> Result<NdviProduct> {
        info!(
            "Loading red {} and NIR {}",
            red_path.display(),
            nir_path.display()
        );
        let bands = load_band_pair(red_path, nir_path)?;
        self.run_bands(bands)
    }

    pub fn run_bands(&self, bands: BandPair) -> Result<NdviProduct> {
        let (width, height) = bands.shape();
        info!("Computing NDVI for {}x{} pixels", width, height);

        let ndvi = self.engine.compute_pair(&bands)?;
        let valid = ndvi.data().iter().filter(|v| !v.is_nan()).count();
        if valid == 0 {
            return Err(NdviError::NoData);
        }
        debug!("{} of {} pixels defined", valid, ndvi.len());

        let classes = self.classifier.classify(&ndvi);
        let histogram = Histogram::from_grid(
            &ndvi,
            self.config.histogram_bins,
            self.config.histogram_stride,
        );
        let report = NdviReport::build(
            &ndvi,
            &classes,
            &self.classifier,
            histogram.clone(),
            self.satellite,
            self.engine.clips(),
        );

        Ok(NdviProduct {
            ndvi,
            classes,
            classifier: self.classifier.clone(),
            histogram,
            report,
            geo: bands.red.geo,
            preview_size: self.config.preview_size,
        })
    }
}

/// Everything one pipeline run produces, held in memory until written.
#[derive(Debug, Clone)]
pub struct NdviProduct {
    pub ndvi: Grid<f32>,
    pub classes: Grid<Option<usize>>,
    pub classifier: Classifier,
    pub histogram: Histogram,
    pub report: NdviReport,
    pub geo: GeoInfo,
    preview_size: Option<u32>,
}

impl NdviProduct {
    pub fn class_map(&self) -> RgbaImage {
        let image = render_class_map(&self.classes, &self.classifier);
        match self.preview_size {
            Some(max_dim) => preview(&image, max_dim),
            None => image,
        }
    }

    pub fn histogram_chart(&self, width: u32, height: u32) -> RgbaImage {
        self.histogram.render(width, height, &self.classifier)
    }

    pub fn export_rows(&self) -> impl Iterator<Item = ExportRow> + '_ {
        export_rows(&self.ndvi)
    }

    /// Writes the artifacts into `dir`, creating it if needed. Returns the
    /// paths written.
    ///
    /// All or nothing: if any artifact fails, the files already written by
    /// this call are removed before the error is returned.
    pub fn write_outputs(&self, dir: &Path, options: &OutputOptions) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        if let Err(e) = self.write_artifacts(dir, options, &mut written) {
            for path in &written {
                if fs::remove_file(path).is_ok() {
                    warn!("Removed partial output {}", path.display());
                }
            }
            return Err(e);
        }

        for path in &written {
            info!("Wrote {}", path.display());
        }
        Ok(written)
    }

    /// Each path is recorded before its file is written so a half-written
    /// file is cleaned up too.
    fn write_artifacts(
        &self,
        dir: &Path,
        options: &OutputOptions,
        written: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let map_path = dir.join(MAP_FILE);
        written.push(map_path.clone());
        self.class_map().save(&map_path)?;

        let histogram_path = dir.join(HISTOGRAM_FILE);
        written.push(histogram_path.clone());
        let (chart_width, chart_height) = options.histogram_size;
        self.histogram_chart(chart_width, chart_height)
            .save(&histogram_path)?;

        if options.csv {
            let csv_path = dir.join(CSV_FILE);
            written.push(csv_path.clone());
            let rows = write_csv_file(&self.ndvi, &csv_path)?;
            debug!("Exported {} rows to {}", rows, csv_path.display());
        }

        let report_path = dir.join(REPORT_FILE);
        written.push(report_path.clone());
        fs::write(&report_path, self.report.to_json()?)?;

        if options.geotiff {
            let raster_path = dir.join(RASTER_FILE);
            written.push(raster_path.clone());
            write_ndvi_raster(&self.ndvi, &self.geo, &raster_path, &options.raster)?;
        }

        Ok(())
    }
}
