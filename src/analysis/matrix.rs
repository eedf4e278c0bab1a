//! Pairwise divergence matrix computation
//!
//! Builds the dense R×C matrix of Jensen–Shannon divergences between two
//! signature collections as a flat nested pass over the Cartesian product
//! of tile indices. Every cell is independent, so the pass is expressed
//! as row-disjoint writes into a preallocated buffer; with the `threading`
//! feature enabled, rows are distributed across rayon workers with no
//! shared mutable state and no locking.

use crate::io::error::{CompareError, Result, computation_error};
use crate::math::divergence::{jensen_shannon, jensen_shannon_joint};
use crate::signature::{MissingPolicy, SignatureCollection};
use ndarray::Array2;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag checked between row batches
///
/// Cloning shares the underlying flag, so a token handed to another
/// thread cancels the computation it was passed to.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the computation holding this token
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Options controlling matrix computation
#[derive(Default)]
pub struct MatrixOptions<'a> {
    /// Cooperative cancellation, checked between rows
    pub cancel: Option<&'a CancelToken>,
    /// Invoked with the row index after each completed row
    pub row_observer: Option<&'a (dyn Fn(usize) + Sync)>,
}

/// Dense matrix of divergences between two signature collections
///
/// Entry `(i, j)` is the divergence between signature `i` of the left
/// collection and signature `j` of the right collection. All entries are
/// finite and non-negative; emptiness and dimensionality are rejected
/// before any cell is computed.
#[derive(Debug, Clone)]
pub struct DivergenceMatrix {
    values: Array2<f64>,
}

impl DivergenceMatrix {
    /// Compute the full divergence matrix between two collections
    ///
    /// # Errors
    ///
    /// Returns an error if the two collections disagree on signature
    /// dimensionality.
    pub fn compute(left: &SignatureCollection, right: &SignatureCollection) -> Result<Self> {
        Self::compute_with(left, right, &MatrixOptions::default())
    }

    /// Compute the divergence matrix with cancellation and row observation
    ///
    /// The divergence measure is selected from the collections' policies:
    /// if either side retains partial signatures (joint-categories
    /// policy), each pair is compared over jointly-defined categories.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the two collections disagree on signature dimensionality
    /// - cancellation is requested before the pass completes
    pub fn compute_with(
        left: &SignatureCollection,
        right: &SignatureCollection,
        options: &MatrixOptions<'_>,
    ) -> Result<Self> {
        if left.dimensions() != right.dimensions() {
            return Err(CompareError::DimensionMismatch {
                expected: left.dimensions(),
                found: right.dimensions(),
                detail: "between the two collections".to_string(),
            });
        }

        let rows = left.len();
        let cols = right.len();
        let joint = left.policy() == MissingPolicy::JointCategories
            || right.policy() == MissingPolicy::JointCategories;

        let mut buffer = vec![0.0f64; rows * cols];
        fill_rows(left, right, joint, options, &mut buffer, cols)?;

        let values = Array2::from_shape_vec((rows, cols), buffer)
            .map_err(|e| computation_error("divergence matrix assembly", &e))?;
        Ok(Self { values })
    }

    /// Wrap externally produced divergence values
    ///
    /// For consumers that derive reductions from a matrix computed
    /// elsewhere. The shape and entries are validated the same way the
    /// pairwise pass guarantees them.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix has a zero dimension or contains a
    /// negative or non-finite entry.
    pub fn from_values(values: Array2<f64>) -> Result<Self> {
        let (rows, cols) = values.dim();
        if rows == 0 || cols == 0 {
            return Err(CompareError::EmptyCollection {
                reason: "divergence matrix has a zero dimension",
            });
        }
        for &value in &values {
            if !value.is_finite() || value < 0.0 {
                return Err(computation_error(
                    "divergence matrix validation",
                    &format!("entry {value} is not a finite non-negative divergence"),
                ));
            }
        }
        Ok(Self { values })
    }

    /// Number of rows (left-collection tiles)
    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns (right-collection tiles)
    pub fn cols(&self) -> usize {
        self.values.ncols()
    }

    /// Divergence at `(row, col)`, if in bounds
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get((row, col)).copied()
    }

    /// Borrow the underlying matrix
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

// Fills one output row with divergences from `left_signature` to every
// signature of the right collection.
fn fill_row(
    left_signature: &[f64],
    right: &SignatureCollection,
    joint: bool,
    row: &mut [f64],
) {
    for (col, cell) in row.iter_mut().enumerate() {
        if let Some(right_signature) = right.get(col) {
            *cell = if joint {
                jensen_shannon_joint(left_signature, right_signature)
            } else {
                jensen_shannon(left_signature, right_signature)
            };
        }
    }
}

#[cfg(not(feature = "threading"))]
fn fill_rows(
    left: &SignatureCollection,
    right: &SignatureCollection,
    joint: bool,
    options: &MatrixOptions<'_>,
    buffer: &mut [f64],
    cols: usize,
) -> Result<()> {
    for (row_index, row) in buffer.chunks_mut(cols).enumerate() {
        if let Some(token) = options.cancel {
            if token.is_cancelled() {
                return Err(CompareError::Cancelled {
                    completed_rows: row_index,
                });
            }
        }

        if let Some(left_signature) = left.get(row_index) {
            fill_row(left_signature, right, joint, row);
        }

        if let Some(observer) = options.row_observer {
            observer(row_index);
        }
    }

    Ok(())
}

#[cfg(feature = "threading")]
fn fill_rows(
    left: &SignatureCollection,
    right: &SignatureCollection,
    joint: bool,
    options: &MatrixOptions<'_>,
    buffer: &mut [f64],
    cols: usize,
) -> Result<()> {
    use rayon::prelude::*;
    use std::sync::atomic::AtomicUsize;

    let completed = AtomicUsize::new(0);

    buffer
        .par_chunks_mut(cols)
        .enumerate()
        .for_each(|(row_index, row)| {
            if let Some(token) = options.cancel {
                if token.is_cancelled() {
                    return;
                }
            }

            if let Some(left_signature) = left.get(row_index) {
                fill_row(left_signature, right, joint, row);
            }
            completed.fetch_add(1, Ordering::Relaxed);

            if let Some(observer) = options.row_observer {
                observer(row_index);
            }
        });

    if let Some(token) = options.cancel {
        if token.is_cancelled() {
            return Err(CompareError::Cancelled {
                completed_rows: completed.load(Ordering::Relaxed),
            });
        }
    }

    Ok(())
}
