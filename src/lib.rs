//! Local spatial-signature comparison of categorical raster regions
//!
//! The system extracts per-window category composition signatures from
//! two categorical grids, builds a dense Jensen–Shannon divergence
//! matrix between the two signature collections, and reduces it to
//! per-tile best-match distances to surface the most locally
//! distinctive tile on each side.

#![forbid(unsafe_code)]

/// Divergence matrix computation and extremal search
pub mod analysis;
/// Input/output operations and error handling
pub mod io;
/// Mathematical utilities for divergence measures
pub mod math;
/// Signature collections and window extraction
pub mod signature;

pub use io::error::{CompareError, Result};
