//! Core image processing functionality

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::Size;
use crate::error::{BatchResizeError, Result};

pub mod formats;
pub mod resize;

pub use formats::*;
pub use resize::*;

/// One file to resize: where to read, where to write, what box to fit.
///
/// Created by the batch orchestrator and consumed exactly once by a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeJob {
    /// Submission index within the batch
    pub index: usize,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub size: Size,
}

impl ResizeJob {
    pub fn new(index: usize, input_path: PathBuf, output_path: PathBuf, size: Size) -> Self {
        Self {
            index,
            input_path,
            output_path,
            size,
        }
    }
}

/// Result of processing one job
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub outcome: FitOutcome,
    pub processing_time: Duration,
}

/// Runs resize jobs against the filesystem
#[derive(Debug, Clone, Default)]
pub struct ProcessingEngine {
    resizer: ImageResizer,
}

impl ProcessingEngine {
    /// Create a new processing engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a single job.
    ///
    /// Both file handles live only inside this call and are closed on every
    /// return path. If the resize fails after the output file was created,
    /// the partial output is removed.
    pub fn process_job(&self, job: &ResizeJob) -> Result<ProcessingResult> {
        let start_time = Instant::now();
        debug!("Processing job {}: {:?} -> {:?}", job.index, job.input_path, job.output_path);

        let input = File::open(&job.input_path).map_err(|source| BatchResizeError::FileOpen {
            path: job.input_path.clone(),
            source,
        })?;

        let output = File::create(&job.output_path).map_err(|source| BatchResizeError::FileCreate {
            path: job.output_path.clone(),
            source,
        })?;

        let outcome = self
            .resizer
            .fit(job.size, BufReader::new(input), BufWriter::new(output));

        match outcome {
            Ok(outcome) => Ok(ProcessingResult {
                input_path: job.input_path.clone(),
                output_path: job.output_path.clone(),
                outcome,
                processing_time: start_time.elapsed(),
            }),
            Err(e) => {
                remove_partial_output(&job.output_path);
                Err(e)
            }
        }
    }
}

fn remove_partial_output(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!("Could not remove partial output {:?}: {}", path, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use image::{DynamicImage, RgbImage};
    use tempfile::TempDir;

    fn write_jpeg(path: &Path, width: u32, height: u32) {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([10, 120, 200])));
        let mut buf = Vec::new();
        image
            .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, 90))
            .unwrap();
        std::fs::write(path, buf).unwrap();
    }

    fn job(dir: &TempDir, name: &str) -> ResizeJob {
        ResizeJob::new(
            0,
            dir.path().join("in").join(name),
            dir.path().join("out").join(name),
            Size::new(100, 100).unwrap(),
        )
    }

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("in")).unwrap();
        std::fs::create_dir(dir.path().join("out")).unwrap();
        dir
    }

    #[test]
    fn test_process_job_writes_resized_output() {
        let dir = setup();
        let job = job(&dir, "wide.jpg");
        write_jpeg(&job.input_path, 400, 200);

        let result = ProcessingEngine::new().process_job(&job).unwrap();
        assert_eq!(result.outcome.resized, (100, 50));

        let written = image::open(&job.output_path).unwrap();
        assert_eq!((written.width(), written.height()), (100, 50));
    }

    #[test]
    fn test_missing_input_is_open_error() {
        let dir = setup();
        let job = job(&dir, "missing.jpg");

        let err = ProcessingEngine::new().process_job(&job).unwrap_err();
        assert!(matches!(err, BatchResizeError::FileOpen { ref path, .. } if *path == job.input_path));
        assert!(!job.output_path.exists());
    }

    #[test]
    fn test_uncreatable_output_is_create_error() {
        let dir = setup();
        let mut job = job(&dir, "ok.jpg");
        write_jpeg(&job.input_path, 50, 50);
        job.output_path = dir.path().join("no_such_dir").join("ok.jpg");

        let err = ProcessingEngine::new().process_job(&job).unwrap_err();
        assert!(matches!(err, BatchResizeError::FileCreate { ref path, .. } if *path == job.output_path));
    }

    #[test]
    fn test_corrupt_input_leaves_no_output() {
        let dir = setup();
        let job = job(&dir, "broken.jpg");
        std::fs::write(&job.input_path, b"\xFF\xD8\xFFgarbage").unwrap();

        let err = ProcessingEngine::new().process_job(&job).unwrap_err();
        assert!(matches!(err, BatchResizeError::Decode(_)));
        assert!(!job.output_path.exists());
    }
}
