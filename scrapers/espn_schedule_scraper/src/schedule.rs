use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use crate::{
    error::ScheduleError,
    types::{Game, Schedule, Team},
};

#[derive(Debug, Deserialize)]
struct Event {
    date: String,
    competitors: Vec<Competitor>,
    venue: Venue,
    completed: bool,
    link: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Venue {
    full_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Competitor {
    #[serde(default, deserialize_with = "optional_text")]
    id: Option<String>,
    display_name: String,
    short_display_name: String,
    abbrev: String,
    logo: String,
    team_color: String,
    is_home: bool,
    #[serde(default, deserialize_with = "score")]
    score: u32,
    #[serde(default, deserialize_with = "optional_text")]
    links: Option<String>,
}

impl Competitor {
    fn team(&self) -> Team {
        Team {
            id: self.id.clone(),
            href: self.links.clone(),
            name: self.display_name.clone(),
            short_name: self.short_display_name.clone(),
            abbrev: self.abbrev.clone(),
            logo: self.logo.clone(),
        }
    }
}

/// Scores arrive as strings ("102"), numbers, empty strings or null.
/// Anything else ("W", "1.5") reads as 0 for that competitor only.
fn score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed: Result<u32, Value> = match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::Number(n) => match n.as_u64().and_then(|v| u32::try_from(v).ok()) {
            Some(v) => Ok(v),
            None => Err(Value::Number(n)),
        },
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => match s.trim().parse::<u32>() {
            Ok(v) => Ok(v),
            Err(_) => Err(Value::String(s)),
        },
        other => Err(other),
    };

    Ok(parsed.unwrap_or_else(|raw| {
        warn!(score = %raw, "Unreadable score, using 0");
        0
    }))
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Parses the schedule payload into games, keeping the page's order.
///
/// Events are grouped under arbitrary keys (usually a date); groups are
/// visited in key order and events keep their order within a group. Any
/// structural mismatch fails the whole page.
pub fn parse_schedule(raw_json: &str, season_year: i32) -> Result<Schedule, ScheduleError> {
    let payload: Value = serde_json::from_str(raw_json).map_err(ScheduleError::InvalidJson)?;
    let events = payload
        .pointer("/page/content/events")
        .ok_or(ScheduleError::MissingKey("page.content.events"))?;
    let groups: BTreeMap<String, Vec<Event>> =
        serde_json::from_value(events.clone()).map_err(ScheduleError::Shape)?;

    let mut games = Vec::new();
    let mut teams = BTreeMap::new();

    for event in groups.into_values().flatten() {
        let (home, away) = split_competitors(&event)?;

        for competitor in [home, away] {
            teams
                .entry(competitor.abbrev.clone())
                .or_insert_with(|| competitor.team());
        }

        games.push(Game {
            date: event.date.clone(),
            season_year,
            home_team: home.display_name.clone(),
            home_team_abbr: home.abbrev.clone(),
            home_team_short_name: home.short_display_name.clone(),
            home_team_logo: home.logo.clone(),
            home_team_color: home.team_color.clone(),
            away_team: away.display_name.clone(),
            away_team_abbr: away.abbrev.clone(),
            away_team_short_name: away.short_display_name.clone(),
            away_team_logo: away.logo.clone(),
            away_team_color: away.team_color.clone(),
            home_score: home.score,
            away_score: away.score,
            venue: event.venue.full_name.clone(),
            completed: event.completed,
            espn_link: event.link.clone(),
            ..Game::default()
        });
    }

    Ok(Schedule {
        games,
        teams: teams.into_values().collect(),
    })
}

/// Home and away come from the `isHome` flag only, never from list position.
fn split_competitors(event: &Event) -> Result<(&Competitor, &Competitor), ScheduleError> {
    let (home, away): (Vec<&Competitor>, Vec<&Competitor>) =
        event.competitors.iter().partition(|c| c.is_home);

    match (home.as_slice(), away.as_slice()) {
        ([home], [away]) => Ok((*home, *away)),
        _ => Err(ScheduleError::Competitors {
            link: event.link.clone(),
            home: home.len(),
            away: away.len(),
        }),
    }
}
