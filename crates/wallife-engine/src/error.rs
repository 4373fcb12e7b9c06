//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup so `main` can
//! propagate with `?`. Host commands that fail to parse are reported per
//! line as [`CommandError`] and never stop the engine.

use std::path::PathBuf;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: wallife_core::config::ConfigError,
    },

    /// The startup properties file could not be read.
    #[error("failed to read properties file {}: {source}", path.display())]
    PropertiesRead {
        /// File that was requested.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The startup properties file is not a JSON object.
    #[error("failed to parse properties file {}: {source}", path.display())]
    PropertiesParse {
        /// File that was requested.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// Why a host command line was not understood.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The line was blank.
    #[error("empty command")]
    Empty,

    /// The first word is not a known command.
    #[error("unknown command: {word}")]
    Unknown {
        /// The unrecognized word.
        word: String,
    },

    /// `resize` needs two non-negative integer dimensions.
    #[error("usage: resize <width> <height>")]
    BadResize,

    /// A property line was not valid JSON.
    #[error("invalid property JSON: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
