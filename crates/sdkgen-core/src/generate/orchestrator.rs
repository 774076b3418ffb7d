use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};

use crate::error::JobFailure;

use super::artifact::ArtifactMap;
use super::job::GenerationJob;
use super::Emitter;

/// Fans generation jobs out to a fixed pool of worker threads.
#[derive(Debug, Clone, Copy)]
pub struct Orchestrator {
    workers: usize,
    queue_capacity: usize,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(3, 8)
    }
}

impl Orchestrator {
    /// Both sizes are clamped to at least one.
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        Self {
            workers: workers.max(1),
            queue_capacity: queue_capacity.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every job to completion, writing artifacts into `artifacts`.
    ///
    /// Returns once all workers have drained the queue and exited. A job
    /// that errors, panics, or collides with an existing artifact is
    /// recorded as a failure; the remaining jobs still run.
    pub fn run<'d, E: Emitter>(
        &self,
        emitter: &E,
        jobs: Vec<GenerationJob<'d>>,
        artifacts: &ArtifactMap,
    ) -> Vec<JobFailure> {
        let (job_tx, job_rx) = bounded::<GenerationJob<'d>>(self.queue_capacity);
        let (failure_tx, failure_rx) = unbounded::<JobFailure>();
        let total = jobs.len();

        thread::scope(|scope| {
            for id in 0..self.workers {
                let job_rx = job_rx.clone();
                let failure_tx = failure_tx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("sdkgen-worker-{id}"))
                    .spawn_scoped(scope, move || {
                        worker_loop(id, emitter, job_rx, failure_tx, artifacts)
                    });
                if let Err(e) = spawned {
                    log::error!("failed to spawn worker {id}: {e}");
                }
            }
            // Workers hold the only receivers now, so sends fail instead of
            // blocking if none could be spawned.
            drop(job_rx);

            for job in jobs {
                if let Err(unsent) = job_tx.send(job) {
                    let kind = unsent.into_inner().kind;
                    log::error!("no worker available for {kind}");
                    let _ = failure_tx.send(JobFailure {
                        kind,
                        message: "no worker available".to_string(),
                    });
                }
            }
            drop(job_tx);
        });
        drop(failure_tx);

        let mut failures: Vec<JobFailure> = failure_rx.into_iter().collect();
        failures.sort_by_key(|f| f.kind);
        log::info!(
            "ran {total} generation jobs on {} workers, {} failed",
            self.workers,
            failures.len()
        );
        failures
    }
}

fn worker_loop<E: Emitter>(
    id: usize,
    emitter: &E,
    jobs: Receiver<GenerationJob<'_>>,
    failures: Sender<JobFailure>,
    artifacts: &ArtifactMap,
) {
    for job in jobs {
        let kind = job.kind;
        log::debug!("worker {id}: generating {kind}");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| emitter.emit(&job)));
        let failure = match outcome {
            Ok(Ok(artifact)) => artifacts.insert_once(artifact).err().map(|e| e.to_string()),
            Ok(Err(e)) => Some(e.to_string()),
            Err(payload) => Some(panic_message(payload.as_ref())),
        };

        match failure {
            None => log::debug!("worker {id}: finished {kind}"),
            Some(message) => {
                log::error!("worker {id}: {kind} failed: {message}");
                let _ = failures.send(JobFailure { kind, message });
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
