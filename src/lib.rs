//! batch-resize - bounded-concurrency JPEG batch resizer
//!
//! Shrinks every JPEG in a folder so that it fits inside a bounding box,
//! preserving aspect ratio, and writes the results to another folder.
//! Files are processed by a fixed pool of workers; a file that fails does
//! not stop the others, and all failures are reported together at the end.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use batch_resize::{BatchConfig, BatchResizer, Size};
//!
//! # async fn demo() -> batch_resize::Result<()> {
//! let size: Size = "500x500".parse()?;
//! let config = BatchConfig::new("photos", Some("photos-small"), size).workers(3);
//!
//! let summary = BatchResizer::new(config).run().await?;
//! println!("Resized {} images", summary.succeeded);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod config;
pub mod error;
pub mod parallel;
pub mod processing;

// Re-export commonly used types
pub use batch::{BatchResizer, BatchSummary};
pub use config::{BatchConfig, Config, LoggingConfig, Size};
pub use error::{BatchResizeError, Result};
pub use parallel::{ErrorReport, FileFailure};
pub use processing::{ImageResizer, ProcessingEngine, ResizeJob};

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.level` when set. Logs go to stderr so that
/// stdout stays free for `--json` output. Calling this again is a no-op.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if config.json_format {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        debug!("batch-resize v{} logging initialized", VERSION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_init_logging_twice() {
        // Should not fail on multiple calls
        init_logging(&LoggingConfig::default());
        init_logging(&LoggingConfig {
            level: "debug".to_string(),
            json_format: true,
        });
    }
}
