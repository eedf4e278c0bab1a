//! Window-based signature extraction from categorical grids
//!
//! Slides a non-overlapping square window over a grid of category codes
//! and produces one composition vector per window: the share of each
//! category among the window's valid cells, aligned to a caller-supplied
//! sorted category set. Partial windows at the right and bottom edges
//! are not emitted.

use crate::io::error::{Result, invalid_parameter};
use ndarray::Array2;
use num_traits::PrimInt;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Window coordinates of an extracted signature within its source grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLocation {
    /// Window row index (0 at the top)
    pub row: usize,
    /// Window column index (0 at the left)
    pub col: usize,
}

/// Collect the distinct category codes present in a grid
///
/// The result is sorted, so two grids sharing codes produce identically
/// ordered category sets and their signatures align by index. Callers
/// comparing two grids should extract both against the union of the two
/// sets.
pub fn category_set<T>(grid: &Array2<T>, nodata: Option<T>) -> Vec<T>
where
    T: PrimInt + Hash,
{
    let mut seen = HashSet::new();
    for &value in grid {
        if Some(value) != nodata {
            seen.insert(value);
        }
    }

    let mut categories: Vec<T> = seen.into_iter().collect();
    categories.sort_unstable();
    categories
}

/// Merge two sorted category sets into their sorted union
pub fn category_union<T>(left: &[T], right: &[T]) -> Vec<T>
where
    T: PrimInt + Hash,
{
    let mut seen: HashSet<T> = left.iter().copied().collect();
    seen.extend(right.iter().copied());

    let mut categories: Vec<T> = seen.into_iter().collect();
    categories.sort_unstable();
    categories
}

/// Extract per-window composition signatures from a categorical grid
///
/// Each emitted vector has one entry per category in `categories`, in
/// order: the fraction of the window's valid cells carrying that code.
/// Cells equal to `nodata`, or carrying a code absent from `categories`,
/// do not count as valid. A window with zero valid cells yields an
/// all-NaN vector, resolved later by the collection's missing-data
/// policy. The returned locations parallel the returned vectors.
///
/// # Errors
///
/// Returns an error if:
/// - `window` is zero
/// - `categories` is empty or contains duplicate codes
pub fn extract_signatures<T>(
    grid: &Array2<T>,
    categories: &[T],
    window: usize,
    nodata: Option<T>,
) -> Result<(Vec<Vec<f64>>, Vec<TileLocation>)>
where
    T: PrimInt + Hash,
{
    if window == 0 {
        return Err(invalid_parameter(
            "window",
            &0,
            &"window edge must be at least one cell",
        ));
    }
    if categories.is_empty() {
        return Err(invalid_parameter(
            "categories",
            &"[]",
            &"at least one category code is required",
        ));
    }

    let mut index_of: HashMap<T, usize> = HashMap::with_capacity(categories.len());
    for (index, &code) in categories.iter().enumerate() {
        if index_of.insert(code, index).is_some() {
            return Err(invalid_parameter(
                "categories",
                &index,
                &"category codes must be unique",
            ));
        }
    }

    let (rows, cols) = grid.dim();
    let window_rows = rows / window;
    let window_cols = cols / window;

    let mut signatures = Vec::with_capacity(window_rows * window_cols);
    let mut locations = Vec::with_capacity(window_rows * window_cols);

    for window_row in 0..window_rows {
        for window_col in 0..window_cols {
            let mut counts = vec![0usize; categories.len()];
            let mut valid = 0usize;

            for row in window_row * window..(window_row + 1) * window {
                for col in window_col * window..(window_col + 1) * window {
                    let Some(&value) = grid.get((row, col)) else {
                        continue;
                    };
                    if Some(value) == nodata {
                        continue;
                    }
                    // Codes outside the category set are treated as nodata
                    let Some(&category) = index_of.get(&value) else {
                        continue;
                    };
                    if let Some(count) = counts.get_mut(category) {
                        *count += 1;
                        valid += 1;
                    }
                }
            }

            let signature = if valid == 0 {
                vec![f64::NAN; categories.len()]
            } else {
                counts
                    .iter()
                    .map(|&count| count as f64 / valid as f64)
                    .collect()
            };

            signatures.push(signature);
            locations.push(TileLocation {
                row: window_row,
                col: window_col,
            });
        }
    }

    Ok((signatures, locations))
}
