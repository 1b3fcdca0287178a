//! Error types and handling for batch-resize

use std::path::PathBuf;
use thiserror::Error;

use crate::parallel::ErrorReport;

/// Result type alias for batch-resize operations
pub type Result<T> = std::result::Result<T, BatchResizeError>;

/// Main error type for batch-resize operations
#[derive(Debug, Error)]
pub enum BatchResizeError {
    /// Size string is not of the form `WIDTHxHEIGHT`
    #[error("Malformed size spec {input:?}: {reason}")]
    MalformedSizeSpec { input: String, reason: String },

    /// Output directory could not be created
    #[error("Cannot create output directory {path:?}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input directory could not be listed
    #[error("Cannot read input directory {path:?}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file could not be opened for reading
    #[error("Cannot open {path:?}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output file could not be created
    #[error("Cannot create {path:?}: {source}")]
    FileCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input decoded as something other than JPEG
    #[error("Unsupported image format: {format} (only JPEG is accepted)")]
    UnsupportedFormat { format: String },

    /// Input bytes could not be decoded
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// Resized image could not be encoded or written
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// One or more files of a batch failed
    #[error("{0}")]
    Batch(ErrorReport),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serde(String),

    /// A worker task died before draining the queue
    #[error("Worker failure: {message}")]
    Worker { message: String },
}

impl BatchResizeError {
    /// Create a new malformed size error
    pub fn malformed_size<S: Into<String>, R: Into<String>>(input: S, reason: R) -> Self {
        Self::MalformedSizeSpec {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Create a new worker error
    pub fn worker<S: Into<String>>(message: S) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }

    /// Whether this error belongs to a single file (the batch keeps going)
    /// rather than to the run as a whole.
    pub fn is_per_file(&self) -> bool {
        match self {
            Self::FileOpen { .. }
            | Self::FileCreate { .. }
            | Self::UnsupportedFormat { .. }
            | Self::Decode(_)
            | Self::Encode(_) => true,

            Self::MalformedSizeSpec { .. }
            | Self::DirectoryCreation { .. }
            | Self::DirectoryRead { .. }
            | Self::Batch(_)
            | Self::Config { .. }
            | Self::Serde(_)
            | Self::Worker { .. } => false,
        }
    }

    /// Get the associated file path if the error carries one
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::DirectoryCreation { path, .. }
            | Self::DirectoryRead { path, .. }
            | Self::FileOpen { path, .. }
            | Self::FileCreate { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedSizeSpec { input, reason } => {
                format!("Invalid size {input:?} ({reason}). Expected WIDTHxHEIGHT, e.g. 500x500")
            }
            Self::DirectoryCreation { path, source } => {
                format!("Could not create output folder {}: {source}", path.display())
            }
            Self::DirectoryRead { path, source } => {
                format!("Could not list input folder {}: {source}", path.display())
            }
            other => other.to_string(),
        }
    }
}

impl From<toml::de::Error> for BatchResizeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serde(format!("TOML parsing error: {err}"))
    }
}

impl From<toml::ser::Error> for BatchResizeError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serde(format!("TOML serialization error: {err}"))
    }
}

impl From<serde_yaml::Error> for BatchResizeError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serde(format!("YAML error: {err}"))
    }
}
