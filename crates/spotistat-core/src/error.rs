//! Error types for spotistat
//!
//! This module defines the error types used throughout the spotistat library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! Loading errors ([`SpotistatError::Parse`], [`SpotistatError::Schema`]) are
//! fatal for a run. [`SpotistatError::Validation`] and
//! [`SpotistatError::InvalidDate`] describe bad user input and are recovered
//! from by the interactive selector.
//!
//! # Example
//!
//! ```
//! use spotistat_core::error::{SpotistatError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to SpotistatError
//!     let _file = std::fs::read_to_string("nonexistent.json")?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for spotistat operations
#[derive(Error, Debug)]
pub enum SpotistatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// No streaming history files were found
    #[error("No streaming history files found in {}", .0.display())]
    NoHistoryFiles(PathBuf),

    /// Malformed input file or unparseable timestamp
    #[error("Parse error in {}: {error}", .file.display())]
    Parse {
        /// The file that caused the error
        file: PathBuf,
        /// The error message
        error: String,
    },

    /// A record does not match any known export schema
    #[error("Schema error in {} (record {record}): {error}", .file.display())]
    Schema {
        /// The file that caused the error
        file: PathBuf,
        /// Zero-based index of the offending record
        record: usize,
        /// The error message
        error: String,
    },

    /// Requested window is not covered by the loaded data
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl SpotistatError {
    /// Whether the interactive selector can recover by prompting again
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidDate(_))
    }
}

/// Convenience type alias for Results in spotistat
///
/// # Example
///
/// ```
/// use spotistat_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, SpotistatError>;
