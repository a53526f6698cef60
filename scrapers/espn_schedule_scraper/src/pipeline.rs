use chrono::{Local, NaiveDate};
use std::{fs, path::PathBuf, sync::Arc};
use tracing::{error, info, instrument, warn};

use crate::{
    config::ScraperConfig,
    enrich::{EnrichmentFailure, EnrichmentStatus, Enricher},
    error::{Result, ScheduleError},
    fetcher::{HttpFetcher, PageFetcher},
    payload::PayloadExtractor,
    pool::{EnrichmentJob, EnrichmentPool},
    report::EnrichmentReport,
    schedule::parse_schedule,
    snapshot::SnapshotWriter,
    types::{Game, Schedule, Team},
    utils::{detail_url, schedule_url},
};

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub league: String,
    pub games: Vec<Game>,
    pub teams: Vec<Team>,
    pub report: EnrichmentReport,
}

/// Runs the schedule fetch, parse and enrichment stages for one league.
pub struct SchedulePipeline {
    config: ScraperConfig,
    fetcher: Arc<dyn PageFetcher>,
    extractor: PayloadExtractor,
    snapshots: Option<SnapshotWriter>,
}

impl SchedulePipeline {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.scraping, config.retry.policy())?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    pub fn with_fetcher(config: ScraperConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        let snapshots = config.output.snapshot_dir.clone().map(SnapshotWriter::new);
        Self {
            config,
            fetcher,
            extractor: PayloadExtractor::default(),
            snapshots,
        }
    }

    pub async fn run(&self, league: &str) -> RunOutput {
        self.run_on(league, Local::now().date_naive()).await
    }

    /// Same as [`run`](Self::run) with an explicit "today" for the college date offset.
    #[instrument(skip(self))]
    pub async fn run_on(&self, league: &str, today: NaiveDate) -> RunOutput {
        let mut report = EnrichmentReport::new(league);
        let url = schedule_url(&self.config.scraping.base_url, league, today);
        info!("Fetching schedule from {}", url);

        let Schedule { mut games, teams } = match self.load_schedule(league, &url).await {
            Ok(schedule) => schedule,
            Err(e) => {
                error!(url = %url, error = %e, "Could not read schedule, continuing with no games");
                return RunOutput {
                    league: league.to_string(),
                    games: Vec::new(),
                    teams: Vec::new(),
                    report,
                };
            }
        };
        info!("Parsed {} games and {} teams", games.len(), teams.len());

        let enricher = Arc::new(Enricher::new(self.snapshots.clone()));
        let pool = EnrichmentPool::start(Arc::clone(&self.fetcher), enricher, self.config.pool.workers);

        let mut queued = 0;
        for (index, game) in games.iter().enumerate() {
            if game.completed {
                report.record(index, &game.espn_link, EnrichmentStatus::Skipped);
                continue;
            }
            let job = EnrichmentJob {
                index,
                url: detail_url(&self.config.scraping.base_url, &game.espn_link),
                game: game.clone(),
            };
            match pool.submit(job) {
                Ok(()) => queued += 1,
                Err(e) => report.record(
                    index,
                    &game.espn_link,
                    EnrichmentStatus::failed(EnrichmentFailure::NotQueued(e.to_string())),
                ),
            }
        }
        info!("Queued {} games for enrichment", queued);

        for result in pool.drain().await {
            report.record(result.index, &result.game.espn_link, result.status);
            games[result.index] = result.game;
        }

        // A worker that died takes its job with it; the base game stays in place.
        for (index, game) in games.iter().enumerate() {
            if !report.contains(index) {
                warn!(link = %game.espn_link, "No enrichment result for game");
                report.record(index, &game.espn_link, EnrichmentStatus::failed(EnrichmentFailure::WorkerLost));
            }
        }

        report.log_summary();
        RunOutput {
            league: league.to_string(),
            games,
            teams,
            report,
        }
    }

    async fn load_schedule(&self, league: &str, url: &str) -> std::result::Result<Schedule, ScheduleLoadError> {
        let html = self.fetcher.fetch_page(url).await?;
        let raw = self
            .extractor
            .extract(&html)
            .ok_or(ScheduleError::PayloadNotFound)?;

        if let Some(snapshots) = &self.snapshots {
            snapshots.write(&format!("{}_schedule", league), &raw);
        }

        Ok(parse_schedule(&raw, self.config.season_year)?)
    }

    /// Runs the pipeline and writes `<output_dir>/<league>.json`.
    pub async fn run_and_write(&self, league: &str) -> Result<(RunOutput, PathBuf)> {
        let output = self.run(league).await;
        let path = write_games(&self.config.output.output_dir, league, &output.games)?;
        Ok((output, path))
    }
}

#[derive(Debug, thiserror::Error)]
enum ScheduleLoadError {
    #[error(transparent)]
    Fetch(#[from] crate::error::FetchError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

pub fn write_games(dir: &std::path::Path, league: &str, games: &[Game]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", league));
    fs::write(&path, serde_json::to_string_pretty(games)?)?;
    info!("Wrote {} games to {:?}", games.len(), path);
    Ok(path)
}
