//! CLI entry point for the map signature comparison tool

use clap::Parser;
use tilesig::io::cli::{Cli, ComparisonRunner};

fn main() -> tilesig::Result<()> {
    let cli = Cli::parse();
    let runner = ComparisonRunner::new(cli);
    runner.process()
}
