use chrono::{Duration, NaiveDate};

/// College schedules are requested for a date this many days ahead.
pub const COLLEGE_DATE_OFFSET_DAYS: i64 = 2;

/// Builds the schedule URL for `league`, e.g. `https://www.espn.com/nba/schedule`.
pub fn schedule_url(base_url: &str, league: &str, today: NaiveDate) -> String {
    let mut url = format!("{}/{}/schedule", base_url.trim_end_matches('/'), league);
    if league.contains("college") {
        let target = today + Duration::days(COLLEGE_DATE_OFFSET_DAYS);
        url.push_str(&format!("/_/date/{}", target.format("%Y%m%d")));
    }
    url
}

/// Resolves a game link from the schedule payload against the site base URL.
pub fn detail_url(base_url: &str, link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        return link.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if link.starts_with('/') {
        format!("{}{}", base, link)
    } else {
        format!("{}/{}", base, link)
    }
}

/// File extension of a logo URL, falling back to `png`.
pub fn image_extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            ext.to_ascii_lowercase()
        }
        _ => "png".to_string(),
    }
}
