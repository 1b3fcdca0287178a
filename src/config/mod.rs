//! Configuration management for batch-resize

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BatchResizeError, Result};

pub mod size;
pub use size::*;

/// Default number of concurrent workers
pub const DEFAULT_WORKERS: usize = 3;

/// Upper bound for auto-detected worker counts
pub const MAX_AUTO_WORKERS: usize = 16;

/// Sub-directory of the input folder used when no output folder is given
pub const DEFAULT_OUTPUT_SUBDIR: &str = "resized";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// What to resize and where to put it
    pub batch: BatchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Settings for one batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Folder scanned (non-recursively) for JPEG files
    pub input_dir: PathBuf,

    /// Folder receiving resized copies (None = `<input_dir>/resized`)
    pub output_dir: Option<PathBuf>,

    /// Bounding box every output must fit in
    pub size: Size,

    /// Number of concurrent workers (0 = auto-detect)
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./"),
            output_dir: None,
            size: Size::default(),
            workers: DEFAULT_WORKERS,
        }
    }
}

impl BatchConfig {
    /// Create a batch config for the given folders and size
    pub fn new<P: Into<PathBuf>>(input_dir: P, output_dir: Option<P>, size: Size) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.map(Into::into),
            size,
            ..Self::default()
        }
    }

    /// Set the number of workers
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Output folder, falling back to `<input_dir>/resized` when unset or empty
    pub fn resolved_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) if !dir.as_os_str().is_empty() => dir.clone(),
            _ => self.input_dir.join(DEFAULT_OUTPUT_SUBDIR),
        }
    }

    /// Number of workers the pool will actually start
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get().clamp(1, MAX_AUTO_WORKERS)
        } else {
            self.workers
        }
    }

    /// Validate batch settings
    pub fn validate(&self) -> Result<()> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(BatchResizeError::config("Input directory must not be empty"));
        }

        let output_dir = self.resolved_output_dir();
        if same_directory(&self.input_dir, &output_dir) {
            return Err(BatchResizeError::config(format!(
                "Output directory {} must differ from the input directory",
                output_dir.display()
            )));
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            BatchResizeError::config(format!(
                "Failed to read config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        match config_extension(path.as_ref()).as_str() {
            "toml" => toml::from_str(&content).map_err(Into::into),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(Into::into),
            _ => Err(BatchResizeError::config(
                "Unsupported config file format. Use .toml or .yaml",
            )),
        }
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = match config_extension(path.as_ref()).as_str() {
            "toml" => toml::to_string_pretty(self)?,
            "yaml" | "yml" => serde_yaml::to_string(self)?,
            _ => {
                return Err(BatchResizeError::config(
                    "Unsupported config file format. Use .toml or .yaml",
                ))
            }
        };

        std::fs::write(&path, content).map_err(|e| {
            BatchResizeError::config(format!(
                "Failed to write config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.batch.validate()?;

        if self.logging.level.trim().is_empty() {
            return Err(BatchResizeError::config("Logging level must not be empty"));
        }

        Ok(())
    }
}

fn config_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Compare directories by canonical path when both exist, lexically otherwise
fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.components().eq(b.components()),
    }
}
