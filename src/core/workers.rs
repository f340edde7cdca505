//! Background worker pool for image decoding.
//!
//! A small fixed pool of named threads draining a shared job channel.
//! The epoch mechanism cancels stale jobs: each resample bumps the shared
//! counter, and jobs enqueued under an older epoch are skipped at execution
//! time instead of decoding textures nobody will show.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Sender};
use log::trace;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size worker pool with epoch-checked job execution.
///
/// # Example
/// ```ignore
/// let epoch = Arc::new(AtomicU64::new(0));
/// let workers = Workers::new(4, Arc::clone(&epoch));
/// workers.execute_with_epoch(epoch.load(Ordering::Relaxed), move || {
///     // decode an image, send the result over a channel
/// });
/// ```
pub struct Workers {
    tx: Option<Sender<Job>>,
    handles: Vec<thread::JoinHandle<()>>,
    current_epoch: Arc<AtomicU64>,
}

impl Workers {
    /// Create the pool with a shared epoch counter.
    ///
    /// Recommended size: `num_cpus::get() / 2`, at least 1. Decoding a
    /// display set's worth of thumbnails never needs more.
    pub fn new(num_threads: usize, epoch: Arc<AtomicU64>) -> Self {
        let (tx, rx) = unbounded::<Job>();
        let mut handles = Vec::with_capacity(num_threads);

        for worker_id in 0..num_threads {
            let rx = rx.clone();
            let handle = thread::Builder::new()
                .name(format!("pawsphere-worker-{worker_id}"))
                .spawn(move || {
                    trace!("Worker {worker_id} started");
                    // Channel closes when the pool drops its sender.
                    while let Ok(job) = rx.recv() {
                        job();
                    }
                    trace!("Worker {worker_id} stopped");
                })
                .expect("Failed to spawn worker thread");
            handles.push(handle);
        }

        trace!("Workers initialized: {num_threads} threads");

        Self {
            tx: Some(tx),
            handles,
            current_epoch: epoch,
        }
    }

    /// Execute a closure on a worker thread.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Some(tx) = &self.tx {
            let _ = tx.send(Box::new(f));
        }
    }

    /// Get current epoch
    pub fn current_epoch(&self) -> u64 {
        self.current_epoch.load(Ordering::Relaxed)
    }

    /// Execute a closure only if the epoch still matches at execution time.
    ///
    /// The check runs when a worker picks the job up, not at enqueue time,
    /// so a resample or teardown between the two silently drops the job.
    pub fn execute_with_epoch<F>(&self, epoch: u64, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let current_epoch = Arc::clone(&self.current_epoch);
        self.execute(move || {
            if current_epoch.load(Ordering::Relaxed) == epoch {
                f();
            }
            // Otherwise the request is stale; skip silently.
        });
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        use std::time::{Duration, Instant};

        let num_threads = self.handles.len();
        trace!("Workers shutting down ({num_threads} threads)...");

        // Closing the channel ends each worker's recv loop.
        self.tx = None;

        // Wait with a timeout; pending epoch-checked jobs are skipped after
        // teardown bumps the epoch, so threads should finish quickly.
        let deadline = Instant::now() + Duration::from_millis(500);
        let handles = std::mem::take(&mut self.handles);
        for handle in handles {
            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    trace!("Shutdown timeout reached, exiting anyway");
                    return;
                }
                thread::sleep(Duration::from_millis(1));
            }
            let _ = handle.join();
        }

        trace!("All {num_threads} workers stopped gracefully");
    }
}
