//! Comparison constants and runtime configuration defaults

/// Default edge length of a signature window in grid cells
pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// Tolerance when validating that defined signature entries sum to one
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

/// Default number of most distinctive tiles listed per region
pub const DEFAULT_TOP_COUNT: usize = 5;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed grid dimension in cells
pub const MAX_GRID_DIMENSION: usize = 50_000;

// Output settings
/// Suffix added to distinctiveness map filenames
pub const MAP_SUFFIX: &str = "_distinct";
