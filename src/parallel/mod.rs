//! Bounded worker pool for batch resizing
//!
//! A fixed number of blocking workers pull [`ResizeJob`]s from one shared
//! [`job_queue`] and push failures into one [`ErrorReporter`]. A failed job
//! never stops its worker; workers exit only when the queue is closed and
//! drained.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{BatchResizeError, Result};
use crate::processing::{ProcessingEngine, ResizeJob};

pub mod report;
pub mod scheduler;

pub use report::*;
pub use scheduler::*;

/// Per-worker tally returned when a worker exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub succeeded: usize,
    pub failed: usize,
}

/// Totals for a drained pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub workers: usize,
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Fixed-size pool of resize workers
pub struct WorkerPool {
    sender: JobSender,
    workers: Vec<JoinHandle<WorkerStats>>,
}

impl WorkerPool {
    /// Start `workers` workers (at least one).
    ///
    /// The pool takes ownership of `reporter`; once the pool is joined every
    /// reporter clone is gone and the matching [`ErrorCollector`] completes.
    pub fn start(workers: usize, engine: Arc<ProcessingEngine>, reporter: ErrorReporter) -> Self {
        let workers = workers.max(1);
        info!("Starting worker pool with {} workers", workers);

        let (sender, receiver) = job_queue();
        let handles = (0..workers)
            .map(|worker_id| {
                let receiver = receiver.clone();
                let engine = Arc::clone(&engine);
                let reporter = reporter.clone();
                tokio::task::spawn_blocking(move || run_worker(worker_id, &receiver, &engine, &reporter))
            })
            .collect();

        Self {
            sender,
            workers: handles,
        }
    }

    /// Queue a job for the next free worker
    pub fn submit(&self, job: ResizeJob) -> Result<()> {
        self.sender.submit(job)
    }

    /// Close the queue and wait until every worker has exited
    pub async fn close_and_join(self) -> Result<PoolStats> {
        let start_time = Instant::now();
        let queue_stats = self.sender.stats();
        self.sender.close();

        let results = futures::future::join_all(self.workers).await;

        let mut stats = PoolStats {
            workers: results.len(),
            submitted: usize::try_from(queue_stats.submitted()).unwrap_or(usize::MAX),
            ..PoolStats::default()
        };

        let mut first_error = None;
        for result in results {
            match result {
                Ok(worker) => {
                    stats.succeeded += worker.succeeded;
                    stats.failed += worker.failed;
                }
                Err(e) => {
                    first_error.get_or_insert_with(|| {
                        BatchResizeError::worker(format!("Task join error: {e}"))
                    });
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        debug!(
            "Worker pool drained in {:.2}s ({} of {} jobs taken): {:?}",
            start_time.elapsed().as_secs_f64(),
            queue_stats.taken(),
            queue_stats.submitted(),
            stats
        );
        Ok(stats)
    }
}

fn run_worker(
    worker_id: usize,
    receiver: &JobReceiver,
    engine: &ProcessingEngine,
    reporter: &ErrorReporter,
) -> WorkerStats {
    let mut stats = WorkerStats::default();

    while let Some(job) = receiver.next_job() {
        match catch_job_panic(&job, || engine.process_job(&job)) {
            Ok(result) => {
                stats.succeeded += 1;
                debug!(
                    "Worker {} resized {:?} {:?} -> {:?} in {:.1}ms",
                    worker_id,
                    result.input_path,
                    result.outcome.original,
                    result.outcome.resized,
                    result.processing_time.as_secs_f64() * 1000.0
                );
            }
            Err(error) => {
                stats.failed += 1;
                let path = error.file_path().cloned().unwrap_or_else(|| job.input_path.clone());
                reporter.report(FileFailure::new(job.index, path, error));
            }
        }
    }

    debug!("Worker {} exiting: {:?}", worker_id, stats);
    stats
}

/// Run one job, turning a panic into that job's failure so the worker
/// keeps draining the queue
fn catch_job_panic<T>(job: &ResizeJob, run: impl FnOnce() -> Result<T>) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(BatchResizeError::worker(format!(
            "panic while processing {}: {reason}",
            job.input_path.display()
        )))
    })
}
