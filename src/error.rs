//! Unified error handling for the trackweave library.
//!
//! Only structural problems abort a reconstruction. Data-quality issues
//! (a malformed sample field, a field with zero observations, a GPS track
//! that does not bracket the workout) are absorbed with deterministic
//! fallbacks and surfaced as log warnings instead.

use thiserror::Error;

/// Unified error type for reconstruction operations.
#[derive(Debug, Clone, Error)]
pub enum ReconError {
    /// Workout interval ends before it starts; the reconstruction for this
    /// workout is aborted.
    #[error("workout interval ends at {end} before it starts at {start}")]
    InvalidInterval { start: i64, end: i64 },

    /// The assembled document tree could not be rendered to XML.
    #[error("xml rendering failed: {message}")]
    Xml { message: String },
}

/// Result type alias for reconstruction operations.
pub type Result<T> = std::result::Result<T, ReconError>;
