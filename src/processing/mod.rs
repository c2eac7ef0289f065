// src/processing/mod.rs
pub mod classify;
pub mod grid;
pub mod ndvi;

// Re-export main components
pub use classify::{ClassBin, Classifier};
pub use grid::Grid;
pub use ndvi::{NdviEngine, NDVI_UNDEFINED};
