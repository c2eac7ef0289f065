// src/present/histogram.rs
use image::{Rgba, RgbaImage};
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

use crate::processing::{Classifier, Grid};

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const AXIS: Rgba<u8> = Rgba([60, 60, 60, 255]);
const MARGIN: u32 = 20;

/// Equal-width histogram of defined NDVI values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges.
    pub edges: Vec<f32>,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Builds `bins` equal-width bins over [-1, 1], widened to the data range
    /// when unclipped values fall outside it. `stride` samples every n-th row
    /// and column. The last bin includes its upper edge.
    pub fn from_grid(ndvi: &Grid<f32>, bins: usize, stride: usize) -> Self {
        let bins = bins.max(1);
        let stride = stride.max(1);

        let samples: Vec<f32> = (0..ndvi.height())
            .step_by(stride)
            .flat_map(move |row| {
                (0..ndvi.width())
                    .step_by(stride)
                    .filter_map(move |column| ndvi.get(row, column).copied())
            })
            .filter(|v| !v.is_nan())
            .collect();

        let (lower, upper) = match samples.iter().minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => (-1.0, 1.0),
            MinMaxResult::OneElement(v) => (v.min(-1.0), v.max(1.0)),
            MinMaxResult::MinMax(min, max) => (min.min(-1.0), max.max(1.0)),
        };

        let width = (upper - lower) / bins as f32;
        let edges = (0..=bins)
            .map(|i| if i == bins { upper } else { lower + width * i as f32 })
            .collect();

        let mut counts = vec![0u64; bins];
        for value in samples {
            let index = (((value - lower) / width) as usize).min(bins - 1);
            counts[index] += 1;
        }

        Self { edges, counts }
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn centers(&self) -> impl Iterator<Item = f32> + '_ {
        self.edges.windows(2).map(|pair| (pair[0] + pair[1]) / 2.0)
    }

    /// Bar chart of the counts; each bar takes the colour of the class its
    /// centre falls in.
    pub fn render(&self, width: u32, height: u32, classifier: &Classifier) -> RgbaImage {
        let width = width.max(2 * MARGIN + 1);
        let height = height.max(2 * MARGIN + 1);
        let mut image = RgbaImage::from_pixel(width, height, BACKGROUND);

        let plot_width = width - 2 * MARGIN;
        let plot_height = height - 2 * MARGIN;
        let baseline = height - MARGIN;
        let max_count = self.counts.iter().copied().max().unwrap_or(0);

        if max_count > 0 {
            let bar_width = plot_width as f64 / self.bins() as f64;
            for (i, (&count, center)) in self.counts.iter().zip(self.centers()).enumerate() {
                let color = classifier
                    .classify_value(center)
                    .and_then(|index| classifier.bins().get(index))
                    .map(|bin| Rgba([bin.color[0], bin.color[1], bin.color[2], 255]))
                    .unwrap_or(AXIS);

                let bar_height =
                    (count as f64 / max_count as f64 * plot_height as f64).round() as u32;
                let x0 = MARGIN + (i as f64 * bar_width).round() as u32;
                // one pixel gap between bars
                let x1 = (MARGIN + ((i + 1) as f64 * bar_width).round() as u32)
                    .saturating_sub(1)
                    .max(x0 + 1);

                for x in x0..x1.min(width - MARGIN) {
                    for y in (baseline - bar_height)..baseline {
                        image.put_pixel(x, y, color);
                    }
                }
            }
        }

        for x in MARGIN..(width - MARGIN) {
            image.put_pixel(x, baseline, AXIS);
        }
        for y in MARGIN..=baseline {
            image.put_pixel(MARGIN, y, AXIS);
        }

        image
    }
}
