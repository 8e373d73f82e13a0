//! Error types for TrackPrep
//!
//! Only missing inputs are fatal. Malformed rows, unmatched focus rows and
//! over-wide windows are handled in place and never surface as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for TrackPrep operations
#[derive(Debug, Error)]
pub enum TrackPrepError {
    /// Coordinate resolution errors
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// File readiness errors
    #[error("Readiness error: {0}")]
    Readiness(#[from] ReadinessError),

    /// Interval list errors
    #[error("Interval list error: {0}")]
    IntervalList(#[from] IntervalListError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while resolving view/focus coordinates
#[derive(Debug, Error)]
pub enum ResolveError {
    /// View or focus source does not exist
    #[error("Interval source not found: {0}")]
    SourceNotFound(PathBuf),

    /// max_width must be a positive number of bases
    #[error("max_width must be positive, got {0}")]
    InvalidMaxWidth(u64),

    /// I/O error while reading a source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while querying file readiness
#[derive(Debug, Error)]
pub enum ReadinessError {
    /// Path does not reference an existing regular file
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error while probing a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while rewriting an intervals list
#[derive(Debug, Error)]
pub enum IntervalListError {
    /// The intervals list itself does not exist
    #[error("Intervals list not found: {0}")]
    ListNotFound(PathBuf),

    /// Planning a referenced file failed for a reason other than absence
    #[error("Failed to plan {path}: {source}")]
    Planning {
        path: PathBuf,
        #[source]
        source: ReadinessError,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for TrackPrep operations
pub type Result<T> = std::result::Result<T, TrackPrepError>;

/// Result type alias for coordinate resolution
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Result type alias for readiness queries
pub type ReadinessResult<T> = std::result::Result<T, ReadinessError>;

/// Result type alias for interval list rewriting
pub type IntervalListResult<T> = std::result::Result<T, IntervalListError>;
