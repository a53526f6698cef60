use std::sync::Arc;
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
};
use tracing::{error, info, warn};

use crate::{
    enrich::{EnrichmentFailure, EnrichmentStatus, Enricher},
    error::{Result, ScraperError},
    fetcher::PageFetcher,
    types::Game,
};

/// A game handed to exactly one worker, together with its detail page URL.
#[derive(Debug, Clone)]
pub struct EnrichmentJob {
    pub index: usize,
    pub url: String,
    pub game: Game,
}

#[derive(Debug, Clone)]
pub struct EnrichmentResult {
    pub index: usize,
    pub game: Game,
    pub status: EnrichmentStatus,
}

/// Fixed set of workers draining one FIFO job queue.
///
/// The pool lives for one run: `start` spawns the workers, `submit` enqueues,
/// and `drain` closes the queue, waits for every worker to finish what is
/// left and hands back all results.
pub struct EnrichmentPool {
    jobs: mpsc::UnboundedSender<EnrichmentJob>,
    results: mpsc::UnboundedReceiver<EnrichmentResult>,
    workers: Vec<JoinHandle<()>>,
}

impl EnrichmentPool {
    /// Must be called from within a tokio runtime.
    pub fn start(fetcher: Arc<dyn PageFetcher>, enricher: Arc<Enricher>, workers: usize) -> Self {
        let workers = workers.max(1);
        let (jobs, queue) = mpsc::unbounded_channel::<EnrichmentJob>();
        let (results_tx, results) = mpsc::unbounded_channel();
        let queue = Arc::new(Mutex::new(queue));

        info!("Starting {} enrichment workers", workers);
        let handles = (0..workers)
            .map(|worker_id| {
                let queue = Arc::clone(&queue);
                let fetcher = Arc::clone(&fetcher);
                let enricher = Arc::clone(&enricher);
                let results = results_tx.clone();

                tokio::spawn(async move {
                    loop {
                        // Hold the lock only while waiting for the next job.
                        let job = { queue.lock().await.recv().await };
                        let Some(job) = job else { break };

                        let result = process_job(worker_id, fetcher.as_ref(), &enricher, job).await;
                        if results.send(result).is_err() {
                            warn!(worker_id, "Result receiver dropped, stopping worker");
                            break;
                        }
                    }
                    info!(worker_id, "Worker finished");
                })
            })
            .collect();

        Self {
            jobs,
            results,
            workers: handles,
        }
    }

    pub fn submit(&self, job: EnrichmentJob) -> Result<()> {
        self.jobs.send(job).map_err(|_| ScraperError::QueueClosed)
    }

    /// Closes the queue, waits for every worker and returns the results in completion order.
    pub async fn drain(self) -> Vec<EnrichmentResult> {
        let Self {
            jobs,
            mut results,
            workers,
        } = self;
        drop(jobs);

        info!("Waiting for workers to complete");
        for handle in workers {
            if let Err(e) = handle.await {
                error!(error = %e, "Enrichment worker panicked");
            }
        }

        let mut collected = Vec::new();
        while let Some(result) = results.recv().await {
            collected.push(result);
        }
        info!("All workers completed ({} results)", collected.len());
        collected
    }
}

async fn process_job(
    worker_id: usize,
    fetcher: &dyn PageFetcher,
    enricher: &Enricher,
    job: EnrichmentJob,
) -> EnrichmentResult {
    let EnrichmentJob { index, url, mut game } = job;
    info!(worker_id, url = %url, "Worker processing game");

    let status = match fetcher.fetch_page(&url).await {
        Ok(html) => enricher.enrich(&html, &mut game),
        Err(e) => {
            error!(worker_id, url = %url, error = %e, "Failed to fetch detail page");
            EnrichmentStatus::failed(EnrichmentFailure::Fetch(e.to_string()))
        }
    };

    EnrichmentResult { index, game, status }
}
