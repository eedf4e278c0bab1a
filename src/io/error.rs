//! Error types for signature comparison operations

use std::fmt;
use std::path::PathBuf;

/// Main error type for all comparison operations
#[derive(Debug)]
pub enum CompareError {
    /// Failed to load a categorical map from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a distinctiveness map to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Signature vectors do not share a common dimensionality
    ///
    /// Raised at the input boundary, before any matrix cell is computed.
    DimensionMismatch {
        /// Dimensionality established by the first vector seen
        expected: usize,
        /// Dimensionality of the offending vector
        found: usize,
        /// Where the mismatch was detected
        detail: String,
    },

    /// A signature collection has no tiles to compare
    ///
    /// Either no vectors were supplied, or every vector was excluded
    /// by the validation and missing-data policies.
    EmptyCollection {
        /// Why the collection ended up empty
        reason: &'static str,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Matrix computation was cancelled through a cancellation token
    Cancelled {
        /// Number of matrix rows completed before cancellation
        completed_rows: usize,
    },

    /// Numerical computation produced an invalid result
    Computation {
        /// Name of the computation that failed
        operation: &'static str,
        /// Description of the failure
        reason: String,
    },
}

impl fmt::Display for CompareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::DimensionMismatch {
                expected,
                found,
                detail,
            } => {
                write!(
                    f,
                    "Signature dimensionality mismatch ({detail}): expected {expected}, found {found}"
                )
            }
            Self::EmptyCollection { reason } => {
                write!(f, "Empty signature collection: {reason}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::Cancelled { completed_rows } => {
                write!(
                    f,
                    "Divergence computation cancelled after {completed_rows} completed rows"
                )
            }
            Self::Computation { operation, reason } => {
                write!(f, "Computation error in {operation}: {reason}")
            }
        }
    }
}

impl std::error::Error for CompareError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for comparison results
pub type Result<T> = std::result::Result<T, CompareError>;

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> CompareError {
    CompareError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a computation error
pub fn computation_error(operation: &'static str, reason: &impl ToString) -> CompareError {
    CompareError::Computation {
        operation,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = CompareError::DimensionMismatch {
            expected: 9,
            found: 7,
            detail: "signature at input index 3".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("expected 9"));
        assert!(rendered.contains("found 7"));
        assert!(rendered.contains("index 3"));
    }

    #[test]
    fn test_helper_constructors() {
        let err = invalid_parameter("window", &0, &"must be at least 1");
        match err {
            CompareError::InvalidParameter {
                parameter, value, ..
            } => {
                assert_eq!(parameter, "window");
                assert_eq!(value, "0");
            }
            _ => unreachable!("Expected InvalidParameter error type"),
        }
    }
}
