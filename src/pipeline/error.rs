//! Error types for loading the study's input files.
//!
//! Every variant is fatal: the pipeline aborts before anything is written.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while reading and validating input tables.
#[derive(Error, Debug)]
pub enum PrepareError {
    /// An expected input file does not exist.
    #[error("Input file not found: {}", .path.display())]
    MissingFile { path: PathBuf },

    /// A required column is absent from the header.
    #[error("Required column '{column}' missing from {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// A row carries a value the pipeline cannot interpret.
    #[error("Malformed row {row} in {}: {message}", .path.display())]
    MalformedRow {
        path: PathBuf,
        /// Zero-based data row (header excluded)
        row: usize,
        message: String,
    },

    /// A key column that must be unique contains a repeated value.
    #[error("Duplicate key '{key}' in column '{column}' of {}", .path.display())]
    DuplicateKey {
        path: PathBuf,
        column: String,
        key: String,
    },

    /// The CSV reader rejected the file.
    #[error("Failed to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PrepareError>;
