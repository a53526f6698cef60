use anyhow::Result;
use pretty_assertions::assert_eq;
use std::{fs, path::Path};

use espn_schedule_scraper::{
    config::ScraperConfig, EnrichmentFailure, EnrichmentStatus, Game, SchedulePipeline,
};

const SCHEDULE_HTML: &str = include_str!("fixtures/schedule_nba.html");
const DETAIL_HTML: &str = include_str!("fixtures/game_detail.html");

fn test_config(base_url: &str, root: &Path) -> ScraperConfig {
    let mut config = ScraperConfig::default();
    config.scraping.base_url = base_url.to_string();
    config.retry.max_attempts = 2;
    config.retry.initial_backoff_ms = 1;
    config.retry.max_backoff_ms = 5;
    config.retry.deadline_secs = 10;
    config.pool.workers = 4;
    config.output.output_dir = root.join("out");
    config.output.snapshot_dir = Some(root.join("data"));
    config.season_year = 2024;
    config
}

async fn mock_schedule(server: &mut mockito::ServerGuard, body: &str) -> mockito::Mock {
    server
        .mock("GET", "/nba/schedule")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(body)
        .create_async()
        .await
}

#[test_log::test(tokio::test)]
async fn test_completed_games_skip_enrichment_and_upcoming_games_are_enriched() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let schedule = mock_schedule(&mut server, SCHEDULE_HTML).await;
    let completed_detail = server
        .mock("GET", "/nba/game/_/gameId/401001")
        .expect(0)
        .create_async()
        .await;
    let upcoming_detail = server
        .mock("GET", "/nba/game/_/gameId/401002")
        .with_status(200)
        .with_body(DETAIL_HTML)
        .expect(1)
        .create_async()
        .await;

    let root = tempfile::tempdir()?;
    let pipeline = SchedulePipeline::new(test_config(&server.url(), root.path()))?;
    let (output, path) = pipeline.run_and_write("nba").await?;

    schedule.assert_async().await;
    completed_detail.assert_async().await;
    upcoming_detail.assert_async().await;

    assert_eq!(output.games.len(), 2);

    let finished = &output.games[0];
    assert_eq!(finished.espn_link, "/nba/game/_/gameId/401001");
    assert_eq!(finished.home_team, "Boston Celtics");
    assert_eq!(finished.away_team, "New York Knicks");
    assert_eq!((finished.home_score, finished.away_score), (102, 98));
    assert!(finished.completed);
    assert!(!finished.has_enrichment());

    let upcoming = &output.games[1];
    assert_eq!(upcoming.home_team, "Los Angeles Lakers");
    assert_eq!(upcoming.away_team_abbr, "GS");
    assert_eq!(upcoming.venue, "Crypto.com Arena");
    assert_eq!(upcoming.season_year, 2024);
    assert_eq!(upcoming.home_spread.as_deref(), Some("-3.5"));
    assert_eq!(upcoming.away_spread.as_deref(), Some("+3.5"));
    assert_eq!(upcoming.home_total.as_deref(), Some("o228.5"));
    assert_eq!(upcoming.away_total.as_deref(), Some("u228.5"));
    assert_eq!(upcoming.home_record.as_deref(), Some("10-4"));
    assert_eq!(upcoming.home_record_extended.as_deref(), Some("10-4, 6-1 Home"));
    assert_eq!(upcoming.away_record.as_deref(), Some("8-6"));
    assert_eq!(upcoming.away_record_extended.as_deref(), Some("8-6, 3-4 Road"));

    assert_eq!(output.report.get(0).map(|e| &e.status), Some(&EnrichmentStatus::Skipped));
    assert_eq!(output.report.get(1).map(|e| &e.status), Some(&EnrichmentStatus::Enriched));

    let abbrevs: Vec<&str> = output.teams.iter().map(|t| t.abbrev.as_str()).collect();
    assert_eq!(abbrevs, vec!["BOS", "GS", "LAL", "NY"]);

    assert_eq!(path, root.path().join("out/nba.json"));
    let written: Vec<Game> = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(written, output.games);

    Ok(())
}

#[tokio::test]
async fn test_output_file_has_null_enrichment_for_completed_games() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _schedule = mock_schedule(&mut server, SCHEDULE_HTML).await;
    let _detail = server
        .mock("GET", "/nba/game/_/gameId/401002")
        .with_body(DETAIL_HTML)
        .create_async()
        .await;

    let root = tempfile::tempdir()?;
    let pipeline = SchedulePipeline::new(test_config(&server.url(), root.path()))?;
    let (_, path) = pipeline.run_and_write("nba").await?;

    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    let finished = &written[0];
    assert_eq!(finished["home_score"], 102);
    assert_eq!(finished["completed"], true);
    for field in [
        "home_spread",
        "away_spread",
        "home_total",
        "away_total",
        "home_record",
        "home_record_extended",
        "away_record",
        "away_record_extended",
    ] {
        assert!(finished[field].is_null(), "{} should be null", field);
    }
    assert_eq!(written[1]["home_spread"], "-3.5");

    Ok(())
}

#[tokio::test]
async fn test_payload_snapshots_are_written() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _schedule = mock_schedule(&mut server, SCHEDULE_HTML).await;
    let _detail = server
        .mock("GET", "/nba/game/_/gameId/401002")
        .with_body(DETAIL_HTML)
        .create_async()
        .await;

    let root = tempfile::tempdir()?;
    let pipeline = SchedulePipeline::new(test_config(&server.url(), root.path()))?;
    pipeline.run("nba").await;

    let schedule: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.path().join("data/nba_schedule.json"))?)?;
    assert_eq!(schedule["page"]["type"], "schedule");

    let event: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.path().join("data/event.json"))?)?;
    assert_eq!(event["page"]["content"]["gamepackage"]["gmStrp"]["gid"], "401002");

    Ok(())
}

#[tokio::test]
async fn test_schedule_without_payload_writes_empty_list() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _schedule = mock_schedule(&mut server, "<html><body><h1>Schedule</h1></body></html>").await;

    let root = tempfile::tempdir()?;
    let mut config = test_config(&server.url(), root.path());
    config.output.snapshot_dir = None;
    let pipeline = SchedulePipeline::new(config)?;
    let (output, path) = pipeline.run_and_write("nba").await?;

    assert!(output.games.is_empty());
    assert!(output.teams.is_empty());
    assert_eq!(fs::read_to_string(path)?.trim(), "[]");
    assert!(!root.path().join("data").exists());

    Ok(())
}

#[tokio::test]
async fn test_failing_detail_page_still_emits_game() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _schedule = mock_schedule(&mut server, SCHEDULE_HTML).await;
    let detail = server
        .mock("GET", "/nba/game/_/gameId/401002")
        .with_status(500)
        .expect(2)
        .create_async()
        .await;

    let root = tempfile::tempdir()?;
    let pipeline = SchedulePipeline::new(test_config(&server.url(), root.path()))?;
    let output = pipeline.run("nba").await;

    detail.assert_async().await;
    assert_eq!(output.games.len(), 2);

    let upcoming = &output.games[1];
    assert_eq!(upcoming.home_team, "Los Angeles Lakers");
    assert!(!upcoming.has_enrichment());

    let failures = output.report.get(1).map(|e| e.status.failures());
    assert!(matches!(failures, Some([EnrichmentFailure::Fetch(_)])));
    assert_eq!(output.report.summary().failed, 1);
    assert_eq!(output.report.summary().skipped, 1);

    Ok(())
}

fn upcoming_schedule_html(game_ids: &[u32]) -> String {
    let competitor = |name: &str, abbrev: &str, is_home: bool| {
        serde_json::json!({
            "displayName": name,
            "shortDisplayName": name.rsplit(' ').next().unwrap_or(name),
            "abbrev": abbrev,
            "logo": format!("https://a.espncdn.com/i/teamlogos/nba/500/{}.png", abbrev.to_lowercase()),
            "teamColor": "552583",
            "isHome": is_home,
            "score": "",
        })
    };
    let events: Vec<serde_json::Value> = game_ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "date": "2024-10-23T02:00Z",
                "completed": false,
                "link": format!("/nba/game/_/gameId/{}", id),
                "venue": { "fullName": "Crypto.com Arena" },
                "competitors": [
                    competitor("Golden State Warriors", "GS", false),
                    competitor("Los Angeles Lakers", "LAL", true),
                ],
            })
        })
        .collect();
    let payload = serde_json::json!({ "page": { "content": { "events": { "20241023": events } } } });
    format!("<html><script>window['__espnfitt__']={};</script></html>", payload)
}

#[tokio::test]
async fn test_every_game_is_enriched_when_first_attempts_fail() -> Result<()> {
    let game_ids: Vec<u32> = (500..508).collect();
    let mut server = mockito::Server::new_async().await;
    let _schedule = mock_schedule(&mut server, &upcoming_schedule_html(&game_ids)).await;

    let mut mocks = Vec::new();
    for id in &game_ids {
        let path = format!("/nba/game/_/gameId/{}", id);
        // Mocks for the same path are served in creation order until each has its hits.
        let failing = server
            .mock("GET", path.as_str())
            .with_status(503)
            .expect(1)
            .create_async()
            .await;
        let recovered = server
            .mock("GET", path.as_str())
            .with_status(200)
            .with_body(DETAIL_HTML)
            .expect(1)
            .create_async()
            .await;
        mocks.push((failing, recovered));
    }

    let root = tempfile::tempdir()?;
    let mut config = test_config(&server.url(), root.path());
    config.retry.max_attempts = 3;
    config.pool.workers = 3;
    let pipeline = SchedulePipeline::new(config)?;
    let output = pipeline.run("nba").await;

    for (failing, recovered) in &mocks {
        failing.assert_async().await;
        recovered.assert_async().await;
    }
    assert_eq!(output.games.len(), game_ids.len());
    assert_eq!(output.report.summary().enriched, game_ids.len());
    for (game, id) in output.games.iter().zip(&game_ids) {
        assert_eq!(game.espn_link, format!("/nba/game/_/gameId/{}", id));
        assert_eq!(game.home_spread.as_deref(), Some("-3.5"));
        assert_eq!(game.away_record_extended.as_deref(), Some("8-6, 3-4 Road"));
    }

    Ok(())
}
