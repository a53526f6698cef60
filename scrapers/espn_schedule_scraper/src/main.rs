use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::{fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use espn_schedule_scraper::{logos::download_logos, HttpFetcher, SchedulePipeline, ScraperConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "Scrape an ESPN league schedule and enrich upcoming games", long_about = None)]
struct Cli {
    /// League path segment, e.g. nba, nfl or college-football
    #[arg(short, long, default_value = "nba")]
    league: String,

    /// Directory for `<league>.json`
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of enrichment workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Don't write raw payload snapshots
    #[arg(long)]
    no_snapshots: bool,

    /// Write the per-game enrichment report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Download team logos into this directory
    #[arg(long)]
    logos_dir: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut ScraperConfig) {
        if let Some(dir) = &self.output_dir {
            config.output.output_dir = dir.clone();
        }
        if let Some(workers) = self.workers {
            config.pool.workers = workers.max(1);
        }
        if self.no_snapshots {
            config.output.snapshot_dir = None;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("espn_schedule_scraper=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ScraperConfig::from_env();
    cli.apply(&mut config);

    let pipeline = SchedulePipeline::new(config.clone())?;
    let (output, path) = pipeline.run_and_write(&cli.league).await?;
    info!("Saved {} {} games to {:?}", output.games.len(), cli.league, path);

    if let Some(report_path) = &cli.report {
        fs::write(report_path, serde_json::to_string_pretty(&output.report)?)
            .with_context(|| format!("writing report to {:?}", report_path))?;
        info!("Wrote enrichment report to {:?}", report_path);
    }

    if let Some(dir) = &cli.logos_dir {
        let fetcher = HttpFetcher::new(&config.scraping, config.retry.policy())?;
        download_logos(&fetcher, &output.teams, dir).await?;
    }

    Ok(())
}
