//! CLI tool to query ISIN and equirectangular grids.
//!
//! Usage:
//!   cargo run --bin grid-query -- locate --grid isin_2004 --lat 51.5 --lon -0.12
//!   cargo run --bin grid-query -- --config config/grids.yaml rows --grid isin_2004 --every 100
//!   cargo run --bin grid-query -- --json bin --grid isin_4320 --id 12000000
//!
//! Without --config the built-in grids are available.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use grid_common::{BoundingBox, GeoPoint, GridCatalog, GridCell};
use projection::{Grid, GridRegistry};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "grid-query")]
#[command(about = "Look up cells, bins and rows of discrete global grids", long_about = None)]
struct Cli {
    /// Grid catalog YAML file (defaults to the built-in grids)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the grids in the catalog
    List,

    /// Find the cell containing a coordinate
    Locate {
        #[arg(short, long)]
        grid: String,

        /// Latitude in degrees [-90, 90]
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees [-180, 180]
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Show the centre and bounds of a cell
    Center {
        #[arg(short, long)]
        grid: String,

        #[arg(long)]
        row: u32,

        #[arg(long)]
        col: u32,
    },

    /// Show the cell for a bin (cell) id
    Bin {
        #[arg(short, long)]
        grid: String,

        #[arg(long)]
        id: u64,
    },

    /// Print the row table
    Rows {
        #[arg(short, long)]
        grid: String,

        /// Print every Nth row
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        every: u32,
    },
}

#[derive(Serialize)]
struct GridSummary<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    grid_type: &'static str,
    rows: u32,
    cells: u64,
}

#[derive(Serialize)]
struct CellReport<'a> {
    grid: &'a str,
    row: u32,
    col: u32,
    id: u64,
    center: GeoPoint,
    bounds: BoundingBox,
}

#[derive(Serialize)]
struct RowLine {
    row: u32,
    center_lat: f64,
    columns: u32,
    first_id: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let registry = load_registry(cli.config.as_ref())?;

    match cli.command {
        Commands::List => {
            let summaries: Vec<GridSummary> = registry
                .iter()
                .map(|(name, grid)| GridSummary {
                    name,
                    grid_type: grid.type_name(),
                    rows: grid.rows(),
                    cells: grid.total_cells(),
                })
                .collect();

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                for s in summaries {
                    println!("{:<20} {:<9} rows={:<6} cells={}", s.name, s.grid_type, s.rows, s.cells);
                }
            }
        }
        Commands::Locate { grid, lat, lon } => {
            let g = registry.get(&grid)?;
            let cell = g
                .lat_lon_to_grid_cell(lat, lon)
                .with_context(|| format!("Failed to locate ({}, {}) in {}", lat, lon, grid))?;
            print_cell(&grid, g, cell, cli.json)?;
        }
        Commands::Center { grid, row, col } => {
            let g = registry.get(&grid)?;
            print_cell(&grid, g, GridCell::new(row, col), cli.json)?;
        }
        Commands::Bin { grid, id } => {
            let g = registry.get(&grid)?;
            let cell = g
                .cell_for_id(id)
                .with_context(|| format!("Bin {} is not in {}", id, grid))?;
            print_cell(&grid, g, cell, cli.json)?;
        }
        Commands::Rows { grid, every } => {
            let g = registry.get(&grid)?;
            let lines = row_lines(g, every as usize);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&lines)?);
            } else {
                println!("{:>6} {:>12} {:>8} {:>12}", "row", "center_lat", "columns", "first_id");
                for l in lines {
                    println!("{:>6} {:>12.6} {:>8} {:>12}", l.row, l.center_lat, l.columns, l.first_id);
                }
            }
        }
    }

    Ok(())
}

fn load_registry(config: Option<&PathBuf>) -> Result<GridRegistry> {
    let registry = match config {
        Some(path) => {
            let catalog = GridCatalog::from_file(path)
                .with_context(|| format!("Failed to load grid catalog {}", path.display()))?;
            GridRegistry::from_catalog(&catalog)?
        }
        None => GridRegistry::builtin()?,
    };
    debug!(grids = ?registry.names(), "Loaded grids");
    Ok(registry)
}

fn cell_report<'a>(name: &'a str, grid: &Grid, cell: GridCell) -> Result<CellReport<'a>> {
    Ok(CellReport {
        grid: name,
        row: cell.row,
        col: cell.col,
        id: grid.cell_id(cell)?,
        center: grid.grid_cell_to_lat_lon(cell)?,
        bounds: grid.cell_bounds(cell)?,
    })
}

fn print_cell(name: &str, grid: &Grid, cell: GridCell, json: bool) -> Result<()> {
    let report = cell_report(name, grid, cell)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("grid:   {}", report.grid);
        println!("cell:   {}", cell);
        println!("id:     {}", report.id);
        println!("center: {}", report.center);
        println!(
            "bounds: lat [{:.6}, {:.6}] lon [{:.6}, {:.6}]",
            report.bounds.min_y, report.bounds.max_y, report.bounds.min_x, report.bounds.max_x
        );
    }
    Ok(())
}

fn row_lines(grid: &Grid, every: usize) -> Vec<RowLine> {
    match grid {
        Grid::Isin(g) => g
            .row_infos()
            .step_by(every)
            .map(|r| RowLine {
                row: r.row,
                center_lat: r.center_lat,
                columns: r.columns,
                first_id: r.bin_offset,
            })
            .collect(),
        Grid::Equirect(g) => (0..g.row_count)
            .step_by(every)
            .filter_map(|row| {
                g.get_lat(row).ok().map(|center_lat| RowLine {
                    row,
                    center_lat,
                    columns: g.col_count,
                    first_id: u64::from(row) * u64::from(g.col_count),
                })
            })
            .collect(),
    }
}
