//! Odds and team records taken from a game's detail page.
//!
//! Both steps are best-effort and independent of each other: a missing odds
//! section does not stop records from being applied, and neither ever turns
//! into an error for the caller. What happened is described by the returned
//! [`EnrichmentStatus`].

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::{payload::PayloadExtractor, snapshot::SnapshotWriter, types::Game};

const DETAIL_SNAPSHOT: &str = "event";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum EnrichmentFailure {
    #[error("detail page fetch failed: {0}")]
    Fetch(String),

    #[error("detail page has no embedded payload")]
    PayloadNotFound,

    #[error("detail payload is not valid JSON: {0}")]
    InvalidPayload(String),

    #[error("detail payload has no `{0}` section")]
    MissingSection(&'static str),

    #[error("no {0} entry matched either team name")]
    NoTeamMatch(&'static str),

    #[error("matched {0} entry has no usable values")]
    MissingField(&'static str),

    #[error("game was not queued for enrichment: {0}")]
    NotQueued(String),

    #[error("worker exited before reporting a result")]
    WorkerLost,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrichmentStatus {
    /// Odds and records were both applied.
    Enriched,
    /// One step applied fields, the other failed.
    Partial { failures: Vec<EnrichmentFailure> },
    Failed { failures: Vec<EnrichmentFailure> },
    /// Completed games are never sent for enrichment.
    Skipped,
}

impl EnrichmentStatus {
    pub fn failed(failure: EnrichmentFailure) -> Self {
        Self::Failed {
            failures: vec![failure],
        }
    }

    fn from_steps(steps: [Result<(), EnrichmentFailure>; 2]) -> Self {
        let failures: Vec<EnrichmentFailure> =
            steps.into_iter().filter_map(Result::err).collect();
        match failures.len() {
            0 => Self::Enriched,
            1 => Self::Partial { failures },
            _ => Self::Failed { failures },
        }
    }

    pub fn failures(&self) -> &[EnrichmentFailure] {
        match self {
            Self::Partial { failures } | Self::Failed { failures } => failures.as_slice(),
            Self::Enriched | Self::Skipped => &[],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Enricher {
    extractor: PayloadExtractor,
    snapshots: Option<SnapshotWriter>,
}

impl Enricher {
    pub fn new(snapshots: Option<SnapshotWriter>) -> Self {
        Self {
            extractor: PayloadExtractor::default(),
            snapshots,
        }
    }

    /// Applies whatever odds and records the detail page offers onto `game`.
    pub fn enrich(&self, detail_html: &str, game: &mut Game) -> EnrichmentStatus {
        let raw = match self.extractor.extract(detail_html) {
            Some(raw) => raw,
            None => return EnrichmentStatus::failed(EnrichmentFailure::PayloadNotFound),
        };

        let payload: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => return EnrichmentStatus::failed(EnrichmentFailure::InvalidPayload(e.to_string())),
        };

        if let Some(snapshots) = &self.snapshots {
            snapshots.write(DETAIL_SNAPSHOT, &raw);
        }

        match payload.pointer("/page/content/gamepackage") {
            Some(package) => enrich_from_package(package, game),
            None => EnrichmentStatus::failed(EnrichmentFailure::MissingSection("gamepackage")),
        }
    }
}

/// Runs both steps against an already located `gamepackage` object.
pub fn enrich_from_package(package: &Value, game: &mut Game) -> EnrichmentStatus {
    EnrichmentStatus::from_steps([apply_odds(package, game), apply_records(package, game)])
}

fn text_at(value: &Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Clone, Copy)]
enum Side {
    Home,
    Away,
}

fn side_of(game: &Game, label: &str) -> Option<Side> {
    if label == game.home_team {
        Some(Side::Home)
    } else if label == game.away_team {
        Some(Side::Away)
    } else {
        None
    }
}

fn set_if_some(field: &mut Option<String>, value: Option<String>, applied: &mut bool) {
    if let Some(value) = value {
        *field = Some(value);
        *applied = true;
    }
}

fn apply_odds(package: &Value, game: &mut Game) -> Result<(), EnrichmentFailure> {
    let lines = package
        .pointer("/gameOdds/odds")
        .and_then(Value::as_array)
        .ok_or(EnrichmentFailure::MissingSection("gameOdds.odds"))?;

    let mut matched = false;
    let mut applied = false;
    for line in lines {
        let side = match line
            .pointer("/line/primaryTextFullWide")
            .and_then(Value::as_str)
            .and_then(|label| side_of(game, label))
        {
            Some(side) => side,
            None => continue,
        };
        matched = true;

        let spread = text_at(line, "/pointSpread/primary");
        let total = text_at(line, "/total/primary");
        match side {
            Side::Home => {
                set_if_some(&mut game.home_spread, spread, &mut applied);
                set_if_some(&mut game.home_total, total, &mut applied);
            }
            Side::Away => {
                set_if_some(&mut game.away_spread, spread, &mut applied);
                set_if_some(&mut game.away_total, total, &mut applied);
            }
        }
    }

    match (applied, matched) {
        (true, _) => Ok(()),
        (false, true) => Err(EnrichmentFailure::MissingField("odds")),
        (false, false) => Err(EnrichmentFailure::NoTeamMatch("odds")),
    }
}

fn apply_records(package: &Value, game: &mut Game) -> Result<(), EnrichmentFailure> {
    let teams = package
        .pointer("/gmStrp/tms")
        .and_then(Value::as_array)
        .ok_or(EnrichmentFailure::MissingSection("gmStrp.tms"))?;

    let mut matched = false;
    let mut applied = false;
    for team in teams {
        let side = match team
            .get("displayName")
            .and_then(Value::as_str)
            .and_then(|name| side_of(game, name))
        {
            Some(side) => side,
            None => continue,
        };
        matched = true;

        let overall = text_at(team, "/records/0/summary");
        let extended = overall
            .as_ref()
            .zip(text_at(team, "/records/1/summary"))
            .map(|(overall, split)| format!("{}, {}", overall, split));

        match side {
            Side::Home => {
                set_if_some(&mut game.home_record, overall, &mut applied);
                set_if_some(&mut game.home_record_extended, extended, &mut applied);
            }
            Side::Away => {
                set_if_some(&mut game.away_record, overall, &mut applied);
                set_if_some(&mut game.away_record_extended, extended, &mut applied);
            }
        }
    }

    match (applied, matched) {
        (true, _) => Ok(()),
        (false, true) => Err(EnrichmentFailure::MissingField("records")),
        (false, false) => Err(EnrichmentFailure::NoTeamMatch("records")),
    }
}
