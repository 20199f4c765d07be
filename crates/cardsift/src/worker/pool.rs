use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use log::{debug, error, info};

use crate::config::Settings;
use crate::error::WorkerError;
use crate::pipeline::{ChunkResult, Pipeline, PipelineError};
use crate::worker::job::{PipelineOutcome, WorkUnit};

/// Workers per CPU when no parallelism is requested. Files spend most of their time in
/// blocking I/O, so the pool runs more workers than there are cores.
pub const IO_WAIT_FACTOR: f64 = 1.7;

/// Upper bound on the dispatch queue length; the channel allocates every slot up front.
pub const MAX_QUEUED_UNITS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Workers started on demand, one per submitted file, until this many are alive.
    pub core_workers: usize,
    /// Extra workers allowed while the dispatch queue is full.
    pub burst_workers: usize,
    /// Idle time after which a worker exits.
    pub keep_alive: Duration,
}

impl PoolConfig {
    pub fn new(core_workers: usize, burst_workers: usize, keep_alive: Duration) -> Self {
        Self {
            core_workers: core_workers.max(1),
            burst_workers,
            keep_alive,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            resolve_parallelism(settings.parallelism),
            settings.burst_workers,
            Duration::from_millis(settings.keep_alive_ms),
        )
    }

    pub fn max_workers(&self) -> usize {
        self.core_workers.saturating_add(self.burst_workers)
    }

    /// Units that can wait for a worker before a burst worker is considered.
    pub fn queue_capacity(&self) -> usize {
        self.core_workers.min(MAX_QUEUED_UNITS)
    }
}

/// The requested degree of parallelism if positive, otherwise one derived from the CPU count.
pub fn resolve_parallelism(requested: Option<usize>) -> usize {
    match requested {
        Some(n) if n > 0 => n,
        _ => default_parallelism(),
    }
}

pub fn default_parallelism() -> usize {
    ((num_cpus::get() as f64 * IO_WAIT_FACTOR) as usize).max(1)
}

/// A bounded pool of threads, each running one [`Pipeline`] at a time.
///
/// Workers are spawned lazily as files are submitted and exit on their own after
/// `keep_alive` without work, so an idle pool holds no threads.
pub struct WorkerPool {
    config: PoolConfig,
    pipeline: Arc<Pipeline>,
    job_sender: Sender<WorkUnit>,
    job_receiver: Receiver<WorkUnit>,
    result_sender: Sender<PipelineOutcome>,
    result_receiver: Receiver<PipelineOutcome>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    live_workers: Arc<AtomicUsize>,
    next_worker_id: AtomicUsize,
}

impl WorkerPool {
    pub fn new(pipeline: Arc<Pipeline>, config: PoolConfig) -> Self {
        let (job_sender, job_receiver) = bounded::<WorkUnit>(config.queue_capacity());
        let (result_sender, result_receiver) = unbounded::<PipelineOutcome>();

        info!(
            "Worker pool ready: {} core workers, {} burst, {:?} keep-alive",
            config.core_workers, config.burst_workers, config.keep_alive
        );

        Self {
            config,
            pipeline,
            job_sender,
            job_receiver,
            result_sender,
            result_receiver,
            workers: Mutex::new(Vec::new()),
            live_workers: Arc::new(AtomicUsize::new(0)),
            next_worker_id: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn live_workers(&self) -> usize {
        self.live_workers.load(Ordering::SeqCst)
    }

    /// Queues a unit, growing the pool first if it is below its core size and again,
    /// up to the burst limit, if the queue is full. Blocks while the queue is full and
    /// the pool is at its limit.
    pub fn submit(&self, unit: WorkUnit) -> Result<(), WorkerError> {
        if self.live_workers() < self.config.core_workers {
            self.spawn_worker()?;
        }

        match self.job_sender.try_send(unit) {
            Ok(()) => {}
            Err(TrySendError::Full(unit)) => {
                if self.live_workers() < self.config.max_workers() {
                    debug!("Dispatch queue full, adding a burst worker");
                    self.spawn_worker()?;
                }
                self.job_sender
                    .send(unit)
                    .map_err(|_| WorkerError::ChannelClosed)?;
            }
            Err(TrySendError::Disconnected(_)) => return Err(WorkerError::ChannelClosed),
        }

        // Every worker may have timed out between the size check and the send.
        if self.live_workers() == 0 {
            self.spawn_worker()?;
        }

        Ok(())
    }

    pub fn recv_outcome_timeout(&self, timeout: Duration) -> Option<PipelineOutcome> {
        self.result_receiver.recv_timeout(timeout).ok()
    }

    /// Closes the queue, waits for every worker to drain it and exit, and returns the
    /// outcomes not yet received.
    pub fn finish(self) -> Vec<PipelineOutcome> {
        let WorkerPool {
            job_sender,
            result_sender,
            result_receiver,
            workers,
            ..
        } = self;

        // Drop senders to signal workers to exit once the queue is empty
        drop(job_sender);
        drop(result_sender);

        let handles = workers
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for (i, worker) in handles.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {:?}", i, e);
            }
        }

        info!("All workers have stopped");
        result_receiver.try_iter().collect()
    }

    fn spawn_worker(&self) -> Result<(), WorkerError> {
        let worker_id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
        let ctx = WorkerContext {
            worker_id,
            job_receiver: self.job_receiver.clone(),
            result_sender: self.result_sender.clone(),
            pipeline: Arc::clone(&self.pipeline),
            live_workers: Arc::clone(&self.live_workers),
            keep_alive: self.config.keep_alive,
        };

        self.live_workers.fetch_add(1, Ordering::SeqCst);
        let spawned = thread::Builder::new()
            .name(format!("cardsift-worker-{}", worker_id))
            .spawn(move || run_worker(ctx));

        match spawned {
            Ok(handle) => {
                let mut workers = self
                    .workers
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                workers.push(handle);
                Ok(())
            }
            Err(e) => {
                self.live_workers.fetch_sub(1, Ordering::SeqCst);
                Err(WorkerError::SpawnFailed(e.to_string()))
            }
        }
    }
}

struct WorkerContext {
    worker_id: usize,
    job_receiver: Receiver<WorkUnit>,
    result_sender: Sender<PipelineOutcome>,
    pipeline: Arc<Pipeline>,
    live_workers: Arc<AtomicUsize>,
    keep_alive: Duration,
}

fn run_worker(ctx: WorkerContext) {
    let worker_id = ctx.worker_id;
    debug!("Worker {} started", worker_id);

    loop {
        match ctx.job_receiver.recv_timeout(ctx.keep_alive) {
            Ok(unit) => {
                debug!("Worker {} processing: {}", worker_id, unit.file_name());

                let outcome = run_guarded(&ctx.pipeline, unit);

                if let Err(e) = ctx.result_sender.send(outcome) {
                    error!("Worker {} failed to send outcome: {}", worker_id, e);
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                ctx.live_workers.fetch_sub(1, Ordering::SeqCst);
                if ctx.job_receiver.is_empty() {
                    debug!("Worker {} idle for {:?}, exiting", worker_id, ctx.keep_alive);
                    return;
                }
                // A unit arrived after the timeout; stay alive for it.
                ctx.live_workers.fetch_add(1, Ordering::SeqCst);
            }
            Err(RecvTimeoutError::Disconnected) => {
                debug!("Worker {} job channel disconnected", worker_id);
                break;
            }
        }
    }

    ctx.live_workers.fetch_sub(1, Ordering::SeqCst);
    debug!("Worker {} stopped", worker_id);
}

/// Runs the pipeline, turning a panic into a failed outcome so the worker survives.
fn run_guarded(pipeline: &Pipeline, unit: WorkUnit) -> PipelineOutcome {
    let fallback = unit.clone();
    match panic::catch_unwind(AssertUnwindSafe(|| pipeline.run(unit))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!("Pipeline for {} panicked: {}", fallback.file_name(), message);
            PipelineOutcome::failure(
                fallback,
                PipelineError::Panicked(message),
                ChunkResult::default(),
                None,
            )
        }
    }
}
