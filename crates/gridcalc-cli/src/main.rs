//! gridcalc CLI - evaluate formulas over CSV grids

mod grid_csv;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gridcalc::{FormulaEngine, Grid};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gridcalc")]
#[command(author, version, about = "Evaluate spreadsheet-style formulas over CSV grids")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one formula and print its value
    Eval {
        /// Formula text, e.g. "=SUM(A1:A3)"
        formula: String,

        /// CSV file providing the cells the formula reads
        #[arg(short, long)]
        grid: Option<PathBuf>,

        /// Print the whole result as JSON
        #[arg(long)]
        json: bool,

        /// Field delimiter (default: comma)
        #[arg(short, long, default_value = ",")]
        delimiter: char,
    },

    /// Recompute every formula in a CSV file and write the computed values
    Recompute {
        /// Input CSV file; fields starting with '=' are formulas
        input: PathBuf,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report error cells on stderr as JSON
        #[arg(long)]
        json_errors: bool,

        /// Field delimiter (default: comma)
        #[arg(short, long, default_value = ",")]
        delimiter: char,
    },
}

/// An error cell as reported by `--json-errors`
#[derive(Serialize)]
struct CellErrorReport<'a> {
    cell: String,
    formula: &'a str,
    message: &'a str,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Eval {
            formula,
            grid,
            json,
            delimiter,
        } => eval(&formula, grid.as_deref(), json, delimiter_byte(delimiter)?),
        Commands::Recompute {
            input,
            output,
            json_errors,
            delimiter,
        } => recompute(
            &input,
            output.as_deref(),
            json_errors,
            delimiter_byte(delimiter)?,
        ),
    }
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }
    Ok(delimiter as u8)
}

fn eval(formula: &str, grid: Option<&Path>, json: bool, delimiter: u8) -> Result<()> {
    let grid = match grid {
        Some(path) => grid_csv::read_file(path, delimiter)?,
        None => Grid::new(),
    };

    let engine = FormulaEngine::new();
    let result = engine.evaluate(formula, &grid);

    if json {
        let text = serde_json::to_string_pretty(&result).context("Failed to encode result")?;
        println!("{}", text);
    } else if let Some(message) = result.error_message() {
        println!("{}", result.value);
        eprintln!("Error: {}", message);
    } else {
        println!("{}", result.value);
    }

    Ok(())
}

fn recompute(
    input: &Path,
    output: Option<&Path>,
    json_errors: bool,
    delimiter: u8,
) -> Result<()> {
    let grid = grid_csv::read_file(input, delimiter)?;

    let mut engine = FormulaEngine::new();
    let loaded = grid_csv::load_formulas(&grid, &mut engine);
    log::debug!("loaded {} formulas from '{}'", loaded, input.display());

    let stats = engine.recompute_all(&grid);

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create '{}'", path.display()))?;
            grid_csv::write(&grid, &engine, file, delimiter)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            grid_csv::write(&grid, &engine, stdout.lock(), delimiter)
                .context("Failed to write to stdout")?;
        }
    }

    eprintln!(
        "Recomputed {} formulas ({} circular references, {} errors)",
        stats.cells_calculated + stats.circular_references,
        stats.circular_references,
        stats.errors
    );

    if json_errors {
        let reports: Vec<CellErrorReport> = engine
            .formulas()
            .into_iter()
            .filter_map(|(coord, formula)| {
                let message = engine.cached_result(coord.row, coord.col)?.error_message()?;
                Some(CellErrorReport {
                    cell: coord.to_a1_string(),
                    formula,
                    message,
                })
            })
            .collect();

        let text = serde_json::to_string(&reports).context("Failed to encode errors")?;
        writeln!(io::stderr(), "{}", text).context("Failed to write to stderr")?;
    }

    Ok(())
}
