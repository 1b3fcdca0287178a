//! Closeable multi-consumer job queue

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam::channel::{unbounded, Receiver, Sender};
use tracing::debug;

use crate::error::{BatchResizeError, Result};
use crate::processing::ResizeJob;

/// Counters shared by both ends of a queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Jobs submitted by the producer
    pub submitted: AtomicU64,

    /// Jobs taken by workers
    pub taken: AtomicU64,
}

impl QueueStats {
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn taken(&self) -> u64 {
        self.taken.load(Ordering::Relaxed)
    }
}

/// Create an unbounded FIFO of resize jobs, returning its producer and
/// consumer ends.
///
/// The queue is closed by dropping the [`JobSender`]; receivers keep
/// draining whatever was already queued and then see `None`.
pub fn job_queue() -> (JobSender, JobReceiver) {
    let (sender, receiver) = unbounded();
    let stats = Arc::new(QueueStats::default());

    (
        JobSender {
            sender,
            stats: Arc::clone(&stats),
        },
        JobReceiver { receiver, stats },
    )
}

/// Producer end of a [`job_queue`]
pub struct JobSender {
    sender: Sender<ResizeJob>,
    stats: Arc<QueueStats>,
}

impl JobSender {
    /// Submit a job. Fails only when every receiver is gone.
    pub fn submit(&self, job: ResizeJob) -> Result<()> {
        let index = job.index;
        self.sender
            .send(job)
            .map_err(|_| BatchResizeError::worker(format!("no workers left to take job {index}")))?;
        self.stats.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Close the queue; no more jobs will be submitted
    pub fn close(self) {
        debug!("Closing job queue after {} jobs", self.stats.submitted());
    }

    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }
}

/// Consumer end of a [`job_queue`], cloned once per worker
#[derive(Clone)]
pub struct JobReceiver {
    receiver: Receiver<ResizeJob>,
    stats: Arc<QueueStats>,
}

impl JobReceiver {
    /// Block until a job is available, or return `None` once the queue is
    /// closed and drained
    pub fn next_job(&self) -> Option<ResizeJob> {
        let job = self.receiver.recv().ok()?;
        self.stats.taken.fetch_add(1, Ordering::Relaxed);
        Some(job)
    }
}
