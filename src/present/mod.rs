// src/present/mod.rs
pub mod colormap;
pub mod export;
pub mod histogram;
pub mod report;

pub use colormap::{preview, render_class_map};
pub use export::{export_rows, read_csv, write_csv, ExportRow};
pub use histogram::Histogram;
pub use report::{ClassSummary, NdviReport};
