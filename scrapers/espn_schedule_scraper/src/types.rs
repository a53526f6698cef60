use serde::{Deserialize, Serialize};

/// One scheduled or completed game, flattened the way it is written to the league file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub date: String,
    pub season_year: i32,
    pub home_team: String,
    pub home_team_abbr: String,
    pub home_team_short_name: String,
    pub home_team_logo: String,
    pub home_team_color: String,
    pub away_team: String,
    pub away_team_abbr: String,
    pub away_team_short_name: String,
    pub away_team_logo: String,
    pub away_team_color: String,
    pub home_score: u32,
    pub away_score: u32,
    pub venue: String,
    pub completed: bool,
    pub espn_link: String,
    pub home_spread: Option<String>,
    pub away_spread: Option<String>,
    pub home_total: Option<String>,
    pub away_total: Option<String>,
    pub home_record: Option<String>,
    pub home_record_extended: Option<String>,
    pub away_record: Option<String>,
    pub away_record_extended: Option<String>,
}

impl Game {
    /// True once any odds or record field has been filled in.
    pub fn has_enrichment(&self) -> bool {
        [
            &self.home_spread,
            &self.away_spread,
            &self.home_total,
            &self.away_total,
            &self.home_record,
            &self.home_record_extended,
            &self.away_record,
            &self.away_record_extended,
        ]
        .iter()
        .any(|field| field.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: Option<String>,
    pub href: Option<String>,
    pub name: String,
    pub short_name: String,
    pub abbrev: String,
    pub logo: String,
}

/// Everything read from one schedule page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    pub games: Vec<Game>,
    /// One entry per distinct abbreviation, sorted by abbreviation.
    pub teams: Vec<Team>,
}
