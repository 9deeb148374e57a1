//! Worker Pool Implementation
//!
//! Spawns background workers that continuously poll the orchestrator for tasks.
//!
//! ## Responsibilities
//! - **Polling**: fetching the next ready task, sleeping when none is available.
//! - **Execution**: waiting out the task's processing-time hint, then evaluating it.
//! - **Reporting**: submitting the value or the failure back to the orchestrator.
//!
//! Once the shutdown signal flips to `true`, an idle worker stops at once and a
//! busy one stops after reporting the task it holds.

use super::calculator::perform_operation;
use super::client::OrchestratorClient;
use crate::orchestrator::protocol::TaskAssignment;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct WorkerPool {
    client: Arc<OrchestratorClient>,
    /// Number of concurrent workers.
    worker_count: usize,
    /// Pause after an empty fetch or a transport error.
    poll_interval: Duration,
}

impl WorkerPool {
    pub fn new(
        client: Arc<OrchestratorClient>,
        worker_count: usize,
        poll_interval: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            client,
            worker_count,
            poll_interval,
        })
    }

    /// Spawns the workers and returns their handles immediately.
    pub fn start(self: Arc<Self>, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        tracing::info!(
            "Starting {} workers against {}",
            self.worker_count,
            self.client.base_url()
        );

        (0..self.worker_count)
            .map(|worker_id| {
                let pool = self.clone();
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    pool.worker_loop(worker_id, shutdown).await;
                })
            })
            .collect()
    }

    async fn worker_loop(&self, worker_id: usize, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("Worker {} started", worker_id);

        loop {
            if *shutdown.borrow() {
                break;
            }

            // The server dequeues a task before its response arrives, so a fetch
            // is never cancelled; only the idle pause races the shutdown signal.
            let pause = match self.client.fetch_task().await {
                Ok(Some(task)) => match self.process(worker_id, task).await {
                    Ok(()) => None,
                    Err(e) => {
                        tracing::warn!("Worker {}: {}", worker_id, e);
                        Some(self.poll_interval)
                    }
                },
                Ok(None) => {
                    tracing::trace!("Worker {}: no tasks available, waiting", worker_id);
                    Some(self.poll_interval)
                }
                Err(e) => {
                    tracing::warn!("Worker {}: {}", worker_id, e);
                    Some(self.poll_interval)
                }
            };

            if let Some(pause) = pause {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = tokio::time::sleep(pause) => {}
                }
            }
        }

        tracing::info!("Worker {} stopped", worker_id);
    }

    /// Waits out the processing-time hint, computes the task and reports it.
    async fn process(&self, worker_id: usize, task: TaskAssignment) -> Result<()> {
        tracing::info!(
            "Worker {}: processing task {}: {:?} {} {:?}",
            worker_id,
            task.id,
            task.arg1,
            task.operation,
            task.arg2
        );

        tokio::time::sleep(Duration::from_millis(task.operation_time)).await;

        let computed = perform_operation(&task);
        match &computed {
            Ok(value) => tracing::info!("Worker {}: task {} = {}", worker_id, task.id, value),
            Err(e) => tracing::warn!("Worker {}: task {} failed: {}", worker_id, task.id, e),
        }

        self.client.submit_result(&task.id, &computed).await
    }
}
