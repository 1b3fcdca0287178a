//! Batch orchestration: enumerate, dispatch, drain, report

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::fs;
use tracing::{debug, info};

use crate::config::{BatchConfig, Size};
use crate::error::{BatchResizeError, Result};
use crate::parallel::{error_channel, WorkerPool};
use crate::processing::{is_jpeg_path, ProcessingEngine, ResizeJob};

/// Outcome of a batch in which every file succeeded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed_ms: u64,
}

/// Resizes every JPEG in one folder into another
pub struct BatchResizer {
    config: BatchConfig,
    engine: Arc<ProcessingEngine>,
}

impl BatchResizer {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            engine: Arc::new(ProcessingEngine::new()),
        }
    }

    /// List the jobs a run would submit, without touching the output folder
    pub async fn plan(&self) -> Result<Vec<ResizeJob>> {
        let output_dir = self.config.resolved_output_dir();
        let inputs = list_inputs(&self.config.input_dir).await?;
        Ok(build_jobs(inputs, &output_dir, self.config.size))
    }

    /// Run the batch to completion.
    ///
    /// Pre-flight failures (output folder, input listing) abort before any
    /// file is touched. Per-file failures never stop the batch; if any occur,
    /// they are all returned together as [`BatchResizeError::Batch`].
    pub async fn run(&self) -> Result<BatchSummary> {
        let start_time = Instant::now();
        self.config.validate()?;
        let output_dir = self.config.resolved_output_dir();

        info!(
            "Resizing JPEGs in {:?} into {:?} (max {})",
            self.config.input_dir, output_dir, self.config.size
        );

        // A missing input must fail before create_dir_all can create it as
        // the parent of `<input>/resized`
        let inputs = list_inputs(&self.config.input_dir).await?;

        fs::create_dir_all(&output_dir)
            .await
            .map_err(|source| BatchResizeError::DirectoryCreation {
                path: output_dir.clone(),
                source,
            })?;

        let jobs = build_jobs(inputs, &output_dir, self.config.size);
        info!("Found {} files to process", jobs.len());

        let (reporter, collector) = error_channel();
        let pool = WorkerPool::start(self.config.worker_count(), Arc::clone(&self.engine), reporter);

        let mut submit_error = None;
        for job in jobs {
            if let Err(e) = pool.submit(job) {
                submit_error = Some(e);
                break;
            }
        }

        let stats = pool.close_and_join().await?;
        let mut report = collector.finish().await?;
        if let Some(e) = submit_error {
            return Err(e);
        }

        let elapsed = start_time.elapsed();
        info!(
            "Batch finished in {:.2}s: {} succeeded, {} failed",
            elapsed.as_secs_f64(),
            stats.succeeded,
            report.len()
        );

        if !report.is_empty() {
            report.submitted = stats.submitted;
            return Err(BatchResizeError::Batch(report));
        }

        Ok(BatchSummary {
            submitted: stats.submitted,
            succeeded: stats.succeeded,
            failed: 0,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        })
    }
}

/// Eligible input files directly inside `input_dir`, sorted by name
async fn list_inputs(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let read_error = |source| BatchResizeError::DirectoryRead {
        path: input_dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(input_dir).await.map_err(read_error)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
        let file_type = entry.file_type().await.map_err(read_error)?;
        let path = entry.path();

        let is_dir = if file_type.is_symlink() {
            // Dangling links stay in and fail per file on open
            fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false)
        } else {
            file_type.is_dir()
        };
        if is_dir {
            continue;
        }
        if is_jpeg_path(&path) {
            files.push(path);
        } else {
            debug!("Skipping {:?}", path);
        }
    }

    files.sort();
    Ok(files)
}

fn build_jobs(inputs: Vec<PathBuf>, output_dir: &Path, size: Size) -> Vec<ResizeJob> {
    inputs
        .into_iter()
        .enumerate()
        .filter_map(|(index, input)| {
            let output = output_dir.join(input.file_name()?);
            Some(ResizeJob::new(index, input, output, size))
        })
        .collect()
}
