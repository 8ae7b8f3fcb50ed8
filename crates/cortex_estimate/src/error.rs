//! Error types for estimator construction and volume header reading.

use std::path::PathBuf;

/// Errors rejecting an [`EstimatorPolicy`](crate::EstimatorPolicy) at build time.
#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    /// A weight multiplier is negative, infinite, or NaN.
    #[error("multiplier for input '{input}' must be finite and non-negative, got {multiplier}")]
    InvalidMultiplier {
        /// The declared input name.
        input: String,
        /// The rejected multiplier.
        multiplier: f64,
    },

    /// The same input is declared twice.
    #[error("input '{0}' is declared more than once")]
    DuplicateInput(String),

    /// The fixed overhead is not a finite number.
    #[error("overhead must be finite, got {0}")]
    InvalidOverhead(f64),

    /// A bound is not a finite number.
    #[error("{name} must be finite, got {value}")]
    InvalidBound {
        /// `min_gb` or `max_gb`.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The lower bound exceeds the upper bound.
    #[error("min_gb ({min}) is greater than max_gb ({max})")]
    InvertedBounds {
        /// The lower bound.
        min: f64,
        /// The upper bound.
        max: f64,
    },
}

/// Reasons a file could not be read as an image volume.
///
/// The estimator treats every variant as "this file contributes nothing".
#[derive(Debug, thiserror::Error)]
pub enum VolumeError {
    /// The header could not be opened or read.
    #[error("cannot read volume header {}: {source}", path.display())]
    Io {
        /// The header path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file extension is not a known volume format.
    #[error("unsupported volume format: {}", path.display())]
    UnsupportedFormat {
        /// The file path.
        path: PathBuf,
    },

    /// The header bytes do not describe a valid volume.
    #[error("invalid volume header in {}: {reason}", path.display())]
    InvalidHeader {
        /// The header path.
        path: PathBuf,
        /// What was wrong.
        reason: String,
    },
}
