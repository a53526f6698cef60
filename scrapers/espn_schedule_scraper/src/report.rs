use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::enrich::EnrichmentStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub espn_link: String,
    #[serde(flatten)]
    pub status: EnrichmentStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub enriched: usize,
    pub partial: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Per-game enrichment outcomes for one run, keyed by the game's position in the schedule.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentReport {
    pub league: String,
    pub generated_at: DateTime<Utc>,
    entries: BTreeMap<usize, ReportEntry>,
}

impl EnrichmentReport {
    pub fn new(league: &str) -> Self {
        Self {
            league: league.to_string(),
            generated_at: Utc::now(),
            entries: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, index: usize, espn_link: &str, status: EnrichmentStatus) {
        self.entries.insert(
            index,
            ReportEntry {
                espn_link: espn_link.to_string(),
                status,
            },
        );
    }

    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    pub fn get(&self, index: usize) -> Option<&ReportEntry> {
        self.entries.get(&index)
    }

    /// Entries in schedule order.
    pub fn entries(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.values()
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            total: self.entries.len(),
            ..ReportSummary::default()
        };
        for entry in self.entries.values() {
            match entry.status {
                EnrichmentStatus::Enriched => summary.enriched += 1,
                EnrichmentStatus::Partial { .. } => summary.partial += 1,
                EnrichmentStatus::Failed { .. } => summary.failed += 1,
                EnrichmentStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }

    pub fn log_summary(&self) {
        let summary = self.summary();
        info!(
            league = %self.league,
            total = summary.total,
            enriched = summary.enriched,
            partial = summary.partial,
            failed = summary.failed,
            skipped = summary.skipped,
            "Enrichment finished"
        );
        for entry in self.entries.values() {
            for failure in entry.status.failures() {
                warn!(link = %entry.espn_link, "Incomplete enrichment: {}", failure);
            }
        }
    }
}
