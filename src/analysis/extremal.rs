//! Reduction and extremal search over the divergence matrix
//!
//! Reduces the R×C matrix to per-tile best-match distances (row and
//! column minima) and selects the tile whose best match is worst: the
//! most locally distinctive pattern relative to the other region. Pure
//! reductions, no side effects.

use crate::analysis::matrix::DivergenceMatrix;

/// Best-match distances derived from a divergence matrix
///
/// `row_min[i]` is the smallest divergence from left tile `i` to any
/// right tile; `col_min[j]` the smallest divergence from right tile `j`
/// to any left tile.
#[derive(Debug, Clone)]
pub struct ReducedDistances {
    row_min: Vec<f64>,
    col_min: Vec<f64>,
}

impl ReducedDistances {
    /// Reduce a divergence matrix to row and column minima in one pass
    pub fn from_matrix(matrix: &DivergenceMatrix) -> Self {
        let mut row_min = vec![f64::INFINITY; matrix.rows()];
        let mut col_min = vec![f64::INFINITY; matrix.cols()];

        for ((row, col), &value) in matrix.values().indexed_iter() {
            if let Some(entry) = row_min.get_mut(row) {
                if value < *entry {
                    *entry = value;
                }
            }
            if let Some(entry) = col_min.get_mut(col) {
                if value < *entry {
                    *entry = value;
                }
            }
        }

        Self { row_min, col_min }
    }

    /// Best-match distance per left tile
    pub fn row_min(&self) -> &[f64] {
        &self.row_min
    }

    /// Best-match distance per right tile
    pub fn col_min(&self) -> &[f64] {
        &self.col_min
    }
}

/// A tile index paired with its best-match distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtremalTile {
    /// Position within the retained collection
    pub index: usize,
    /// Divergence to the tile's closest counterpart in the other region
    pub distance: f64,
}

/// Find the tile whose best-match distance is largest
///
/// Ties break by first occurrence (strict `>` scan), so repeated runs on
/// identical input ordering select the same tile. Returns `None` only
/// for an empty slice, which cannot arise from a constructed matrix.
pub fn most_distinct(best_match: &[f64]) -> Option<ExtremalTile> {
    let mut best: Option<ExtremalTile> = None;

    for (index, &distance) in best_match.iter().enumerate() {
        let improves = best.is_none_or(|current| distance > current.distance);
        if improves {
            best = Some(ExtremalTile { index, distance });
        }
    }

    best
}

/// Rank tiles by descending best-match distance
///
/// Equal distances keep their index order, so the ranking is
/// deterministic. At most `count` entries are returned.
pub fn top_distinct(best_match: &[f64], count: usize) -> Vec<ExtremalTile> {
    let mut ranked: Vec<ExtremalTile> = best_match
        .iter()
        .enumerate()
        .map(|(index, &distance)| ExtremalTile { index, distance })
        .collect();

    ranked.sort_by(|a, b| {
        b.distance
            .partial_cmp(&a.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });
    ranked.truncate(count);

    ranked
}
