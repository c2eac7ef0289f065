// src/processing/grid.rs
use crate::error::{NdviError, Result};

/// Row-major 2-D grid of `width × height` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Grid<T> {
    /// Builds a grid from row-major data.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != width * height`. Use [`Grid::try_new`] for
    /// data whose length is not known to match.
    pub fn new(width: usize, height: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "grid data length does not match {width}x{height}"
        );
        Self { width, height, data }
    }

    pub fn try_new(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != width * height {
            return Err(NdviError::GridSize {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// # Panics
    ///
    /// Panics if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        assert!(rows.iter().all(|r| r.len() == width), "ragged rows");
        Self::new(width, height, rows.into_iter().flatten().collect())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`, the same order GDAL uses for raster sizes.
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&T> {
        if row < self.height && column < self.width {
            self.data.get(row * self.width + column)
        } else {
            None
        }
    }

    /// `(row, column)` of a flat index.
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.width, index % self.width)
    }
}
