//! Progress display for the pairwise comparison pass

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static ROW_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Rows: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Progress bar over the rows of the divergence matrix
///
/// The bar is shared with the computation through a row observer
/// closure; `ProgressBar` increments are thread-safe, so the same
/// observer serves the sequential and row-parallel passes.
pub struct RowProgress {
    bar: ProgressBar,
}

impl RowProgress {
    /// Create a progress bar expecting the given number of rows
    pub fn new(total_rows: usize) -> Self {
        let bar = ProgressBar::new(total_rows as u64);
        bar.set_style(ROW_STYLE.clone());
        Self { bar }
    }

    /// Record one completed row
    pub fn tick_row(&self) {
        self.bar.inc(1);
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
