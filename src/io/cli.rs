//! Command-line interface for comparing two categorical maps
//!
//! Orchestrates the full pipeline: load the PNG pair, extract window
//! signatures, build validated collections, compute the divergence
//! matrix, reduce to best-match distances, and report the most locally
//! distinctive tiles on each side.

use crate::analysis::extremal::{self, ExtremalTile, ReducedDistances};
use crate::analysis::matrix::{DivergenceMatrix, MatrixOptions};
use crate::io::configuration::{DEFAULT_TOP_COUNT, DEFAULT_WINDOW_SIZE, MAP_SUFFIX};
use crate::io::error::{Result, computation_error};
use crate::io::image::{CategoryMaps, NODATA_CODE, export_distinctiveness_map, load_category_maps};
use crate::io::progress::RowProgress;
use crate::math::divergence::MAX_DIVERGENCE;
use crate::signature::extract::extract_signatures;
use crate::signature::{MissingPolicy, SignatureCollection, TileLocation};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Missing-data policy as a command-line choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PolicyArg {
    /// Drop tiles whose signature has undefined entries
    #[default]
    Exclude,
    /// Keep partial signatures, compare over jointly-defined categories
    Joint,
}

impl PolicyArg {
    /// Convert the CLI choice to the collection-layer policy
    pub const fn to_policy(self) -> MissingPolicy {
        match self {
            Self::Exclude => MissingPolicy::ExcludeTile,
            Self::Joint => MissingPolicy::JointCategories,
        }
    }
}

impl std::fmt::Display for PolicyArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Exclude => "exclude",
            Self::Joint => "joint",
        })
    }
}

#[derive(Parser)]
#[command(name = "tilesig")]
#[command(
    author,
    version,
    about = "Compare categorical maps through local signature divergence"
)]
/// Command-line arguments for the map comparison tool
pub struct Cli {
    /// Categorical map of the first region (PNG)
    #[arg(value_name = "LEFT")]
    pub left: PathBuf,

    /// Categorical map of the second region (PNG)
    #[arg(value_name = "RIGHT")]
    pub right: PathBuf,

    /// Edge length of a signature window in grid cells
    #[arg(short, long, default_value_t = DEFAULT_WINDOW_SIZE)]
    pub window: usize,

    /// Policy for tiles with undefined category entries
    #[arg(short, long, value_enum, default_value_t = PolicyArg::Exclude)]
    pub policy: PolicyArg,

    /// Number of most distinctive tiles listed per region
    #[arg(short, long, default_value_t = DEFAULT_TOP_COUNT)]
    pub top: usize,

    /// Write per-region grayscale distinctiveness maps next to the inputs
    #[arg(short, long)]
    pub map: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

// One region's share of the comparison result
struct RegionReport {
    input: PathBuf,
    tiles: usize,
    excluded_undefined: usize,
    excluded_invalid: usize,
    ranked: Vec<(ExtremalTile, TileLocation)>,
    window_rows: usize,
    window_cols: usize,
}

/// Orchestrates a single map comparison from CLI arguments
pub struct ComparisonRunner {
    cli: Cli,
}

impl ComparisonRunner {
    /// Create a runner from parsed CLI arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the comparison pipeline end to end
    ///
    /// # Errors
    ///
    /// Returns an error if map loading, signature extraction, collection
    /// validation, matrix computation, or map export fails.
    pub fn process(self) -> Result<()> {
        let maps = load_category_maps(&self.cli.left, &self.cli.right)?;
        let policy = self.cli.policy.to_policy();

        let (left_vectors, left_locations) = extract_signatures(
            &maps.left,
            &maps.categories,
            self.cli.window,
            Some(NODATA_CODE),
        )?;
        let (right_vectors, right_locations) = extract_signatures(
            &maps.right,
            &maps.categories,
            self.cli.window,
            Some(NODATA_CODE),
        )?;

        let left = SignatureCollection::from_vectors(left_vectors, policy)?;
        let right = SignatureCollection::from_vectors(right_vectors, policy)?;

        let matrix = self.compute_matrix(&left, &right)?;
        let reduced = ReducedDistances::from_matrix(&matrix);

        let left_report = Self::summarize_region(
            &self.cli.left,
            &left,
            &left_locations,
            reduced.row_min(),
            self.cli.top,
            window_grid(&maps, self.cli.window, true),
        )?;
        let right_report = Self::summarize_region(
            &self.cli.right,
            &right,
            &right_locations,
            reduced.col_min(),
            self.cli.top,
            window_grid(&maps, self.cli.window, false),
        )?;

        print_report(
            &self.cli,
            maps.categories.len(),
            &left_report,
            &right_report,
        );

        if self.cli.map {
            export_region_map(&left, &left_locations, reduced.row_min(), &left_report)?;
            export_region_map(&right, &right_locations, reduced.col_min(), &right_report)?;
        }

        Ok(())
    }

    fn compute_matrix(
        &self,
        left: &SignatureCollection,
        right: &SignatureCollection,
    ) -> Result<DivergenceMatrix> {
        if self.cli.quiet {
            return DivergenceMatrix::compute(left, right);
        }

        let progress = RowProgress::new(left.len());
        let observer = |_row: usize| progress.tick_row();
        let options = MatrixOptions {
            cancel: None,
            row_observer: Some(&observer),
        };
        let matrix = DivergenceMatrix::compute_with(left, right, &options);
        progress.finish();
        matrix
    }

    fn summarize_region(
        input: &Path,
        collection: &SignatureCollection,
        locations: &[TileLocation],
        best_match: &[f64],
        top: usize,
        (window_rows, window_cols): (usize, usize),
    ) -> Result<RegionReport> {
        let mut ranked = Vec::new();
        for tile in extremal::top_distinct(best_match, top) {
            ranked.push((tile, locate(collection, locations, tile.index)?));
        }

        Ok(RegionReport {
            input: input.to_path_buf(),
            tiles: collection.len(),
            excluded_undefined: collection.excluded_undefined(),
            excluded_invalid: collection.excluded_invalid(),
            ranked,
            window_rows,
            window_cols,
        })
    }
}

// Window-grid dimensions of one side's map
fn window_grid(maps: &CategoryMaps, window: usize, left_side: bool) -> (usize, usize) {
    let (rows, cols) = if left_side {
        maps.left.dim()
    } else {
        maps.right.dim()
    };
    (rows / window, cols / window)
}

// Map a retained signature index back to its window location
fn locate(
    collection: &SignatureCollection,
    locations: &[TileLocation],
    index: usize,
) -> Result<TileLocation> {
    collection
        .source_index(index)
        .and_then(|source| locations.get(source).copied())
        .ok_or_else(|| {
            computation_error(
                "tile lookup",
                &format!("retained index {index} has no source location"),
            )
        })
}

fn export_region_map(
    collection: &SignatureCollection,
    locations: &[TileLocation],
    best_match: &[f64],
    report: &RegionReport,
) -> Result<()> {
    let mut tiles = Vec::with_capacity(best_match.len());
    for (index, &distance) in best_match.iter().enumerate() {
        tiles.push((locate(collection, locations, index)?, distance));
    }

    export_distinctiveness_map(
        &tiles,
        report.window_rows,
        report.window_cols,
        &map_output_path(&report.input),
    )
}

// Output path for a distinctiveness map, next to its input
fn map_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let map_name = format!("{}{MAP_SUFFIX}.png", stem.to_string_lossy());

    input
        .parent()
        .map_or_else(|| PathBuf::from(&map_name), |parent| parent.join(&map_name))
}

// Allow print for the user-facing comparison report
#[allow(clippy::print_stdout)]
fn print_report(cli: &Cli, categories: usize, left: &RegionReport, right: &RegionReport) {
    println!(
        "Window {}x{} cells, {categories} categories, policy {}",
        cli.window, cli.window, cli.policy
    );
    print_region("Left", left);
    print_region("Right", right);
}

#[allow(clippy::print_stdout)]
fn print_region(side: &str, report: &RegionReport) {
    println!(
        "{side} {}: {} tiles compared ({} excluded: {} undefined, {} invalid)",
        report.input.display(),
        report.tiles,
        report.excluded_undefined + report.excluded_invalid,
        report.excluded_undefined,
        report.excluded_invalid
    );

    if let Some(&(tile, location)) = report.ranked.first() {
        println!(
            "  most distinctive tile: window ({}, {}), distance {:.4} ({:.1}% of bound)",
            location.row,
            location.col,
            tile.distance,
            tile.distance / MAX_DIVERGENCE * 100.0
        );
    }

    for (rank, &(tile, location)) in report.ranked.iter().enumerate() {
        println!(
            "  {}. window ({}, {})  {:.4}",
            rank + 1,
            location.row,
            location.col,
            tile.distance
        );
    }
}
