//! Signature collections with boundary validation and missing-data policy
//!
//! All input validation happens here, at construction time, so the
//! pairwise divergence pass can run over the full Cartesian product
//! without per-cell error handling. Tiles rejected by the data-quality
//! rules are counted rather than failing the run.

use crate::io::configuration::DISTRIBUTION_TOLERANCE;
use crate::io::error::{CompareError, Result, invalid_parameter};

/// How signatures with undefined category entries are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Drop any signature containing an undefined entry at construction time
    #[default]
    ExcludeTile,
    /// Keep partial signatures and compare each pair over jointly-defined
    /// categories only
    JointCategories,
}

// Per-vector classification outcome during construction
enum Classified {
    Retained,
    Undefined,
    Invalid,
}

/// An ordered collection of fixed-dimensionality composition vectors
///
/// Each retained vector is a probability-like distribution over a shared
/// category set, one per spatial tile. The collection remembers which
/// original input index each retained signature came from, so extremal
/// results can be mapped back to tile positions after exclusions.
#[derive(Debug, Clone)]
pub struct SignatureCollection {
    signatures: Vec<Vec<f64>>,
    source_indices: Vec<usize>,
    dimensions: usize,
    policy: MissingPolicy,
    excluded_undefined: usize,
    excluded_invalid: usize,
}

impl SignatureCollection {
    /// Build a validated collection from raw signature vectors
    ///
    /// Validation order per vector: dimensionality (fatal on mismatch),
    /// undefined entries (resolved by `policy`), then the distribution
    /// check (non-negative entries whose defined mass sums near one).
    /// Vectors failing the latter two checks are excluded and counted.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `vectors` is empty, or every vector was excluded (`EmptyCollection`)
    /// - any vector's length differs from the first (`DimensionMismatch`)
    /// - the shared dimensionality is zero (`InvalidParameter`)
    pub fn from_vectors(vectors: Vec<Vec<f64>>, policy: MissingPolicy) -> Result<Self> {
        let Some(first) = vectors.first() else {
            return Err(CompareError::EmptyCollection {
                reason: "no signatures supplied",
            });
        };

        let dimensions = first.len();
        if dimensions == 0 {
            return Err(invalid_parameter(
                "dimensions",
                &0,
                &"signatures need at least one category",
            ));
        }

        let mut signatures = Vec::with_capacity(vectors.len());
        let mut source_indices = Vec::with_capacity(vectors.len());
        let mut excluded_undefined = 0;
        let mut excluded_invalid = 0;

        for (index, vector) in vectors.into_iter().enumerate() {
            if vector.len() != dimensions {
                return Err(CompareError::DimensionMismatch {
                    expected: dimensions,
                    found: vector.len(),
                    detail: format!("signature at input index {index}"),
                });
            }

            match Self::classify(&vector, policy) {
                Classified::Retained => {
                    signatures.push(vector);
                    source_indices.push(index);
                }
                Classified::Undefined => excluded_undefined += 1,
                Classified::Invalid => excluded_invalid += 1,
            }
        }

        if signatures.is_empty() {
            return Err(CompareError::EmptyCollection {
                reason: "every signature was excluded by the validation policy",
            });
        }

        Ok(Self {
            signatures,
            source_indices,
            dimensions,
            policy,
            excluded_undefined,
            excluded_invalid,
        })
    }

    fn classify(vector: &[f64], policy: MissingPolicy) -> Classified {
        let mut defined = 0usize;
        let mut defined_sum = 0.0;
        let mut invalid_entry = false;

        for &entry in vector {
            if entry.is_nan() {
                continue;
            }
            if !entry.is_finite() || entry < 0.0 {
                invalid_entry = true;
            }
            defined += 1;
            defined_sum += entry;
        }

        // A signature with no defined mass cannot be compared under any policy
        if defined == 0 {
            return Classified::Undefined;
        }

        if invalid_entry {
            return Classified::Invalid;
        }

        if defined < vector.len() {
            return match policy {
                MissingPolicy::ExcludeTile => Classified::Undefined,
                MissingPolicy::JointCategories => {
                    // Partial signatures carry a subset of a full distribution;
                    // their defined mass must stay positive and within the unit
                    if defined_sum > 0.0 && defined_sum <= 1.0 + DISTRIBUTION_TOLERANCE {
                        Classified::Retained
                    } else {
                        Classified::Invalid
                    }
                }
            };
        }

        if (defined_sum - 1.0).abs() <= DISTRIBUTION_TOLERANCE {
            Classified::Retained
        } else {
            Classified::Invalid
        }
    }

    /// Number of retained signatures
    pub const fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Whether the collection holds no signatures (never true once constructed)
    pub const fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Shared dimensionality of every retained signature
    pub const fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Missing-data policy the collection was built with
    pub const fn policy(&self) -> MissingPolicy {
        self.policy
    }

    /// Retained signature at the given position
    pub fn get(&self, index: usize) -> Option<&[f64]> {
        self.signatures.get(index).map(Vec::as_slice)
    }

    /// Original input index of the retained signature at `index`
    pub fn source_index(&self, index: usize) -> Option<usize> {
        self.source_indices.get(index).copied()
    }

    /// Count of signatures excluded for undefined entries
    pub const fn excluded_undefined(&self) -> usize {
        self.excluded_undefined
    }

    /// Count of signatures excluded by the distribution validity check
    pub const fn excluded_invalid(&self) -> usize {
        self.excluded_invalid
    }
}
