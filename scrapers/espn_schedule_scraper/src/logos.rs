use serde::Serialize;
use std::{fs, path::Path};
use tracing::{info, warn};

use crate::{error::Result, fetcher::HttpFetcher, types::Team, utils::image_extension};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamLogo {
    #[serde(flatten)]
    pub team: Team,
    /// File name under the logos directory, `None` if the download failed.
    pub logo_file: Option<String>,
}

/// Downloads every team's logo into `dir` and writes `dir/teams.json`.
///
/// A failed download is logged and recorded with no file; it does not stop the others.
pub async fn download_logos(fetcher: &HttpFetcher, teams: &[Team], dir: &Path) -> Result<Vec<TeamLogo>> {
    fs::create_dir_all(dir)?;

    let mut manifest = Vec::with_capacity(teams.len());
    for team in teams {
        let logo_file = if team.logo.is_empty() {
            warn!(abbrev = %team.abbrev, "Team has no logo URL");
            None
        } else {
            match fetcher.fetch_bytes(&team.logo).await {
                Ok(bytes) => {
                    let file = format!("{}.{}", team.abbrev, image_extension(&team.logo));
                    fs::write(dir.join(&file), bytes)?;
                    Some(file)
                }
                Err(e) => {
                    warn!(abbrev = %team.abbrev, url = %team.logo, error = %e, "Failed to download logo");
                    None
                }
            }
        };
        manifest.push(TeamLogo {
            team: team.clone(),
            logo_file,
        });
    }

    fs::write(dir.join("teams.json"), serde_json::to_string_pretty(&manifest)?)?;
    let downloaded = manifest.iter().filter(|t| t.logo_file.is_some()).count();
    info!("Downloaded {} of {} team logos to {:?}", downloaded, teams.len(), dir);
    Ok(manifest)
}
