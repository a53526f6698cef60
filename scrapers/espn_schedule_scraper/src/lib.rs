pub mod config;
pub mod enrich;
pub mod error;
pub mod fetcher;
pub mod logos;
pub mod payload;
pub mod pipeline;
pub mod pool;
pub mod report;
pub mod schedule;
pub mod snapshot;
pub mod types;
pub mod utils;

pub use config::ScraperConfig;
pub use enrich::{EnrichmentFailure, EnrichmentStatus, Enricher};
pub use error::{FetchError, Result, ScheduleError, ScraperError};
pub use fetcher::{HttpFetcher, PageFetcher, RetryPolicy};
pub use pipeline::{RunOutput, SchedulePipeline};
pub use report::EnrichmentReport;
pub use types::{Game, Schedule, Team};
