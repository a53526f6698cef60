use thiserror::Error;

/// Failures of a single page fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("gave up on {url} after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },

    #[error("deadline exceeded for {url} after {attempts} attempts")]
    DeadlineExceeded { url: String, attempts: u32 },
}

/// Structural failures while reading the schedule page.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("schedule page has no embedded payload")]
    PayloadNotFound,

    #[error("schedule payload is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("schedule payload is missing `{0}`")]
    MissingKey(&'static str),

    #[error("schedule events have an unexpected shape: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("event {link} has {home} home and {away} away competitors")]
    Competitors { link: String, home: usize, away: usize },
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("enrichment queue is closed")]
    QueueClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScraperError>;
