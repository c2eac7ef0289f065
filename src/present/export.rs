// src/present/export.rs
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::error::Result;
use crate::processing::Grid;

pub const CSV_HEADER: [&str; 3] = ["row", "column", "ndvi_value"];

/// One defined NDVI pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub row: usize,
    pub column: usize,
    pub ndvi_value: f32,
}

/// Defined pixels in row-major order; sentinels are skipped.
pub fn export_rows(ndvi: &Grid<f32>) -> impl Iterator<Item = ExportRow> + '_ {
    ndvi.data()
        .iter()
        .enumerate()
        .filter(|(_, value)| !value.is_nan())
        .map(move |(index, &ndvi_value)| {
            let (row, column) = ndvi.position(index);
            ExportRow {
                row,
                column,
                ndvi_value,
            }
        })
}

/// Writes the header and one line per row. Returns the number of rows.
pub fn write_csv<W, I>(rows: I, writer: W) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = ExportRow>,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    let mut written = 0;
    for row in rows {
        // Display for f32 is plain decimal and round-trips exactly
        wtr.write_record(&[
            row.row.to_string(),
            row.column.to_string(),
            row.ndvi_value.to_string(),
        ])?;
        written += 1;
    }
    wtr.flush()?;
    Ok(written)
}

pub fn write_csv_file(ndvi: &Grid<f32>, path: &Path) -> Result<usize> {
    let file = BufWriter::new(File::create(path)?);
    write_csv(export_rows(ndvi), file)
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ExportRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}
