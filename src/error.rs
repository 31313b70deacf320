//! # Error Types
//!
//! This module defines all error types for the TMB to MIDI converter.
//!
//! The conversion core never fails: overlapping notes, jittery deltas and
//! pass-limit exhaustion are reported through [`crate::Diagnostic`] records.
//! Errors only come from the boundaries around it: reading the chart,
//! loading settings and writing the MIDI container.
//!
//! ## Error Types
//! - `Io` - A file could not be read or written
//! - `ChartParse` - The `.tmb` file is not valid chart JSON
//! - `InvalidChart` - The chart parsed, but holds values the converter cannot use
//! - `Settings` - Invalid YAML settings or out-of-range setting values
//! - `Midi` - The MIDI container could not be encoded
//!
//! ## Usage
//! ```rust
//! use tmb_midi::{TmbChart, TmbError};
//!
//! match TmbChart::from_json_str("{ \"tempo\": 0 }") {
//!     Ok(chart) => println!("Loaded {}", chart.name),
//!     Err(TmbError::InvalidChart(message)) => eprintln!("Bad chart: {}", message),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TmbError {
    /// File system error with the offending path.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The chart is not valid JSON or does not match the `.tmb` schema.
    ///
    /// # Example
    /// ```
    /// # use tmb_midi::TmbChart;
    /// let err = TmbChart::from_json_str("not json").unwrap_err();
    /// assert!(err.to_string().starts_with("Chart parse error"));
    /// ```
    #[error("Chart parse error: {0}")]
    ChartParse(#[from] serde_json::Error),

    /// The chart parsed but contains values the converter cannot work with.
    ///
    /// # Example
    /// ```
    /// # use tmb_midi::TmbError;
    /// let err = TmbError::InvalidChart("tempo must be positive, got 0".to_string());
    /// assert_eq!(err.to_string(), "Invalid chart: tempo must be positive, got 0");
    /// ```
    #[error("Invalid chart: {0}")]
    InvalidChart(String),

    /// Settings file could not be parsed or holds an invalid value.
    #[error("Invalid settings: {0}")]
    Settings(String),

    /// The MIDI container writer rejected the converted tracks.
    #[error("MIDI error: {0}")]
    Midi(String),
}

impl TmbError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TmbError::Io {
            path: path.into(),
            source,
        }
    }
}
