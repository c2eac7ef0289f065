// src/processing/classify.rs
use rayon::prelude::*;

use super::grid::Grid;
use crate::error::{NdviError, Result};

/// Label reported for sentinel pixels.
pub const UNDEFINED_LABEL: &str = "Undefined";

/// A labelled NDVI range with its display colour.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBin {
    pub lower: f32,
    pub upper: f32,
    pub label: String,
    pub color: [u8; 3],
}

impl ClassBin {
    pub fn new(lower: f32, upper: f32, label: impl Into<String>, color: [u8; 3]) -> Self {
        Self {
            lower,
            upper,
            label: label.into(),
            color,
        }
    }
}

/// Maps NDVI values onto an ordered, gapless partition of [-1, 1].
///
/// The first bin is closed, `[lower, upper]`; every later bin is
/// `(lower, upper]`. A value sitting on a boundary therefore belongs to the
/// bin whose upper edge it is: 0.2 is "Sparse Vegetation" under the default
/// scheme, not "Moderate Vegetation".
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    bins: Vec<ClassBin>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            bins: default_bins(),
        }
    }
}

/// Four-class vegetation scheme used when no configuration is given.
pub fn default_bins() -> Vec<ClassBin> {
    vec![
        ClassBin::new(-1.0, 0.0, "No Vegetation / Water", [140, 81, 10]),
        ClassBin::new(0.0, 0.2, "Sparse Vegetation", [246, 232, 160]),
        ClassBin::new(0.2, 0.5, "Moderate Vegetation", [145, 207, 96]),
        ClassBin::new(0.5, 1.0, "Dense Vegetation", [26, 150, 65]),
    ]
}

impl Classifier {
    pub fn new(bins: Vec<ClassBin>) -> Result<Self> {
        validate_bins(&bins)?;
        Ok(Self { bins })
    }

    pub fn bins(&self) -> &[ClassBin] {
        &self.bins
    }

    /// Bin index for a value, `None` for the `NaN` sentinel. Finite values
    /// outside [-1, 1] fall into the nearest end bin.
    pub fn classify_value(&self, value: f32) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let index = self.bins.partition_point(|bin| bin.upper < value);
        Some(index.min(self.bins.len() - 1))
    }

    pub fn classify(&self, ndvi: &Grid<f32>) -> Grid<Option<usize>> {
        let classes = ndvi
            .data()
            .par_iter()
            .map(|&value| self.classify_value(value))
            .collect();
        Grid::new(ndvi.width(), ndvi.height(), classes)
    }

    pub fn label(&self, class: Option<usize>) -> &str {
        class
            .and_then(|index| self.bins.get(index))
            .map(|bin| bin.label.as_str())
            .unwrap_or(UNDEFINED_LABEL)
    }

    /// Pixel count per bin, in bin order.
    pub fn counts(&self, classes: &Grid<Option<usize>>) -> Vec<usize> {
        let mut counts = vec![0; self.bins.len()];
        for index in classes.data().iter().flatten() {
            counts[*index] += 1;
        }
        counts
    }
}

fn validate_bins(bins: &[ClassBin]) -> Result<()> {
    let invalid = |msg: String| Err(NdviError::InvalidClassification(msg));

    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return invalid("at least one class is required".to_string());
    };
    if first.lower != -1.0 {
        return invalid(format!(
            "first class '{}' must start at -1, not {}",
            first.label, first.lower
        ));
    }
    if last.upper != 1.0 {
        return invalid(format!(
            "last class '{}' must end at 1, not {}",
            last.label, last.upper
        ));
    }

    for bin in bins {
        if !(bin.lower < bin.upper) {
            return invalid(format!(
                "class '{}' has an empty range ({}, {}]",
                bin.label, bin.lower, bin.upper
            ));
        }
    }

    for pair in bins.windows(2) {
        if pair[1].lower != pair[0].upper {
            return invalid(format!(
                "class '{}' ends at {} but '{}' starts at {}",
                pair[0].label, pair[0].upper, pair[1].label, pair[1].lower
            ));
        }
    }

    for (i, bin) in bins.iter().enumerate() {
        if let Some(other) = bins[..i].iter().find(|other| other.color == bin.color) {
            return invalid(format!(
                "classes '{}' and '{}' share the colour #{:02x}{:02x}{:02x}",
                other.label, bin.label, bin.color[0], bin.color[1], bin.color[2]
            ));
        }
    }

    Ok(())
}
