//! Error types for reading exports and writing parsed output.
//!
//! The entry parser itself never fails; only the I/O around it does.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The export has no column holding the raw entry text.
    #[error("Input is missing required column `{0}`")]
    MissingColumn(String),

    #[error("A parser worker thread panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, Error>;
