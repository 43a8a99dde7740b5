//! CSV input and output for grids

use anyhow::{Context, Result};
use gridcalc::{CellCoordinate, FormulaEngine, Grid};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Read a CSV file into a grid
pub fn read_file(path: &Path, delimiter: u8) -> Result<Grid> {
    let file =
        File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;
    read(file, delimiter).with_context(|| format!("Failed to read CSV from '{}'", path.display()))
}

/// Read CSV into a grid; empty fields become absent cells
pub fn read<R: Read>(reader: R, delimiter: u8) -> Result<Grid> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|field| (!field.is_empty()).then(|| field.to_string()))
                .collect::<Vec<_>>(),
        );
    }

    Ok(Grid::from(rows))
}

/// Write the grid as CSV, replacing formula cells with their cached values
pub fn write<W: Write>(
    grid: &Grid,
    engine: &FormulaEngine,
    writer: W,
    delimiter: u8,
) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(writer);

    let cols = grid.col_count() as u32;
    for row in 0..grid.row_count() as u32 {
        let mut record = Vec::with_capacity(cols as usize);
        for col in 0..cols {
            let text = match engine.cached_result(row, col) {
                Some(result) => result.value.to_string(),
                None => grid.get(row, col).unwrap_or_default().to_string(),
            };
            record.push(text);
        }
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Register every field starting with `=` as a formula; returns how many
pub fn load_formulas(grid: &Grid, engine: &mut FormulaEngine) -> usize {
    let formulas: Vec<(CellCoordinate, &str)> = grid
        .cells()
        .filter(|(_, text)| text.starts_with('='))
        .collect();

    for (coord, text) in &formulas {
        engine.set_formula(coord.row, coord.col, *text);
    }
    formulas.len()
}
