use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Satellite;

#[derive(Parser)]
#[command(name = "ndvi-calc")]
#[command(about = "NDVI calculator and vegetation health classifier", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute NDVI and write the map, histogram, CSV and report
    Run {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output directory
        #[arg(short, long, default_value = "ndvi_output")]
        output: PathBuf,

        /// Also write the NDVI grid as a GeoTIFF
        #[arg(long)]
        geotiff: bool,

        /// Write the GeoTIFF as scaled int16 instead of float32
        #[arg(long)]
        fixed_point: bool,

        /// Skip the CSV export
        #[arg(long)]
        no_csv: bool,
    },

    /// Print the NDVI report as JSON without writing files
    Stats {
        #[command(flatten)]
        scene: SceneArgs,
    },

    /// Process the scenes listed in a JSON batch file
    Batch {
        /// Batch configuration file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Print the active classification scheme
    Bins {
        /// Configuration file with a custom scheme
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct SceneArgs {
    /// Red band raster (Landsat/Sentinel-2 B4)
    #[arg(short = 'r', long)]
    pub red: PathBuf,

    /// Near-infrared band raster (Landsat B5, Sentinel-2 B8)
    #[arg(short = 'n', long)]
    pub nir: PathBuf,

    /// Sensor the bands come from
    #[arg(short, long, value_enum)]
    pub satellite: Option<Satellite>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Clamp NDVI to [-1, 1]
    #[arg(long)]
    pub clip: bool,

    /// Number of histogram bins
    #[arg(long)]
    pub histogram_bins: Option<usize>,

    /// Sample every n-th row and column for the histogram
    #[arg(long)]
    pub histogram_stride: Option<usize>,

    /// Longest side of the colour map image in pixels
    #[arg(long)]
    pub preview_size: Option<u32>,
}
