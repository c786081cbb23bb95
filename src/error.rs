//! Error types for unlayout library.

use thiserror::Error;

/// Result type alias for unlayout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during structure reconstruction.
///
/// Only violations of the input contract are fatal. Malformed elements,
/// missing calibration samples and validation mismatches are recovered
/// locally and reported in [`crate::pipeline::PipelineReport`].
#[derive(Error, Debug)]
pub enum Error {
    /// The input sequence itself is absent or not a sequence.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error during rendering (JSON, Markdown).
    #[error("Rendering error: {0}")]
    Render(String),
}
