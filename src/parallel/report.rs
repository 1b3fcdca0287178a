//! Fan-in collection of per-file failures

use std::fmt;
use std::path::PathBuf;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::{BatchResizeError, Result};

/// One file that could not be resized
#[derive(Debug)]
pub struct FileFailure {
    /// Index of the job that failed
    pub index: usize,

    /// Path the failure is tagged with (input, or output for create errors)
    pub path: PathBuf,

    pub error: BatchResizeError,
}

impl FileFailure {
    pub fn new(index: usize, path: PathBuf, error: BatchResizeError) -> Self {
        Self { index, path, error }
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.index, self.path.display(), self.error)
    }
}

impl Serialize for FileFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FileFailure", 3)?;
        state.serialize_field("index", &self.index)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("message", &self.error.to_string())?;
        state.end()
    }
}

/// Every failure of a batch, in arrival order
#[derive(Debug, Default, Serialize)]
pub struct ErrorReport {
    /// Jobs submitted in the batch the failures belong to
    pub submitted: usize,

    failures: Vec<FileFailure>,
}

impl ErrorReport {
    pub fn push(&mut self, failure: FileFailure) {
        self.failures.push(failure);
    }

    pub fn failures(&self) -> &[FileFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures sorted by job index, for stable display
    pub fn sorted(&self) -> Vec<&FileFailure> {
        let mut failures: Vec<_> = self.failures.iter().collect();
        failures.sort_by_key(|f| f.index);
        failures
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} files failed", self.len(), self.submitted)?;
        for failure in self.sorted() {
            write!(f, "\n  {failure}")?;
        }
        Ok(())
    }
}

/// Sending half handed to each worker
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    sender: mpsc::UnboundedSender<FileFailure>,
}

impl ErrorReporter {
    /// Record a failure. Never blocks.
    pub fn report(&self, failure: FileFailure) {
        if let Err(mpsc::error::SendError(failure)) = self.sender.send(failure) {
            // Collector already finished; keep the failure visible in logs
            warn!("Dropped failure report after collection ended: {}", failure);
        }
    }
}

/// Single consumer task that owns the report while workers run
pub struct ErrorCollector {
    handle: JoinHandle<ErrorReport>,
}

impl ErrorCollector {
    /// Wait until every [`ErrorReporter`] is dropped and return the report
    pub async fn finish(self) -> Result<ErrorReport> {
        self.handle
            .await
            .map_err(|e| BatchResizeError::worker(format!("error collector failed: {e}")))
    }
}

/// Start a collector task. Must be called inside a Tokio runtime.
pub fn error_channel() -> (ErrorReporter, ErrorCollector) {
    let (sender, mut receiver) = mpsc::unbounded_channel::<FileFailure>();

    let handle = tokio::spawn(async move {
        let mut report = ErrorReport::default();
        while let Some(failure) = receiver.recv().await {
            warn!("{}", failure);
            report.push(failure);
        }
        report
    });

    (ErrorReporter { sender }, ErrorCollector { handle })
}
