//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the catalog site and drive the
//! full pipeline end-to-end: discovery, worker pool, extraction, CSV sink,
//! completion log, and resume behavior.

use specsweep::config::{Config, DelayRange};
use specsweep::crawler::{run_harvest, HarvestJob};
use specsweep::storage::{SqliteStateStore, StateStore};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a config with near-zero delays pointing at a scratch directory
fn test_config(data_dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawl.worker_count = 3;
    config.crawl.fetch_retries = 2;
    config.crawl.page_delay = DelayRange { min_ms: 0, max_ms: 1 };
    config.crawl.retry_delay = DelayRange { min_ms: 0, max_ms: 1 };
    config.session.user_agents = vec!["TestAgent/1.0".to_string()];
    config.output.data_dir = data_dir.to_string_lossy().into_owned();
    config
}

fn job(manufacturer: &str, start_url: String) -> HarvestJob {
    HarvestJob {
        manufacturer: manufacturer.to_string(),
        start_url,
        max_pages: None,
        fresh: false,
        config_hash: None,
    }
}

fn listing_page(hrefs: &[&str], next: Option<&str>) -> String {
    let items: String = hrefs
        .iter()
        .map(|href| format!(r#"<li><a href="{href}"><span>item</span></a></li>"#))
        .collect();
    let next_control = next
        .map(|href| format!(r#"<a class="prevnextbutton" title="Next page" href="{href}">›</a>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body><div class="makers"><ul>{items}</ul></div>{next_control}</body></html>"#
    )
}

fn detail_page(title: &str, extra: &str) -> String {
    format!(
        r#"<html><body>
        <h1 class="specs-phone-name-title">{title}</h1>
        {extra}
        </body></html>"#
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_end_to_end() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/nokia-phones-1.php",
        listing_page(
            &["nokia_one-100.php", "nokia_two-101.php"],
            Some("nokia-phones-2.php"),
        ),
    )
    .await;
    mount_page(
        &server,
        "/nokia-phones-2.php",
        listing_page(&["nokia_watch-102.php"], None),
    )
    .await;

    mount_page(
        &server,
        "/nokia_one-100.php",
        detail_page(
            "Nokia One",
            r#"<table>
               <tr><td>OS</td><td>Android 10, MIUI 12, upgradable to Android 13, MIUI 14</td></tr>
               <tr><td>Chipset</td><td>Snapdragon 888</td></tr>
               </table>
               <table><tr><td>Models</td><td class="nfo" data-spec="models">TA-1, TA-2</td></tr></table>"#,
        ),
    )
    .await;
    mount_page(
        &server,
        "/nokia_two-101.php",
        detail_page(
            "Nokia Two",
            r#"<table>
               <tr><td>Announced</td><td class="nfo" data-spec="year">Released 2021, September 14</td></tr>
               <tr><td>GPU</td><td>Adreno 660</td></tr>
               </table>"#,
        ),
    )
    .await;
    mount_page(
        &server,
        "/nokia_watch-102.php",
        detail_page("Nokia Watch 2", ""),
    )
    .await;

    let config = test_config(dir.path());
    let start_url = format!("{}/nokia-phones-1.php", server.uri());
    let summary = run_harvest(&config, &job("Nokia", start_url)).await.unwrap();

    assert_eq!(summary.universe, 3);
    assert_eq!(summary.completed_this_run, 3);
    assert_eq!(summary.failed_this_run, 0);
    assert_eq!(summary.remaining, 0);

    // Fan-out: two model numbers plus one plain page, the watch filtered out.
    let csv_path = dir.path().join("Nokia").join("Nokia.csv");
    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.get(0), Some("Manufacturer"));
    assert_eq!(headers.get(2), Some("Model No"));

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);

    let model_nos: Vec<&str> = rows.iter().map(|r| r.get(2).unwrap()).collect();
    assert!(model_nos.contains(&"TA-1"));
    assert!(model_nos.contains(&"TA-2"));
    assert!(model_nos.contains(&""));

    let one_row = rows.iter().find(|r| r.get(2) == Some("TA-1")).unwrap();
    assert_eq!(one_row.get(1), Some("One"));
    assert_eq!(one_row.get(5), Some("Android 10"));
    assert_eq!(one_row.get(6), Some("Android 13"));
    assert_eq!(one_row.get(7), Some("MIUI 14"));
    assert_eq!(one_row.get(11), Some("Snapdragon 888"));
    assert_eq!(one_row.get(13), Some("True"));

    let two_row = rows.iter().find(|r| r.get(1) == Some("Two")).unwrap();
    assert_eq!(two_row.get(3), Some("14/09/2021"));
    assert_eq!(two_row.get(12), Some("Adreno 660"));

    // Completion log lists all three links, including the filtered watch page.
    let log = std::fs::read_to_string(dir.path().join("Nokia").join("Nokia_completed.txt")).unwrap();
    assert_eq!(log.lines().count(), 3);
    assert!(log.contains("nokia_watch-102.php"));
}

#[tokio::test]
async fn test_rerun_fetches_nothing_new() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Every mock expects exactly one hit across BOTH runs; wiremock verifies
    // the counts when the server drops.
    mount_page(
        &server,
        "/acme-phones-1.php",
        listing_page(&["acme_one-1.php", "acme_two-2.php"], None),
    )
    .await;
    mount_page(&server, "/acme_one-1.php", detail_page("Acme One", "")).await;
    mount_page(&server, "/acme_two-2.php", detail_page("Acme Two", "")).await;

    let config = test_config(dir.path());
    let start_url = format!("{}/acme-phones-1.php", server.uri());

    let first = run_harvest(&config, &job("Acme", start_url.clone())).await.unwrap();
    assert_eq!(first.completed_this_run, 2);
    assert_eq!(first.remaining, 0);

    let second = run_harvest(&config, &job("Acme", start_url)).await.unwrap();
    assert_eq!(second.universe, 2);
    assert_eq!(second.completed_this_run, 0);
    assert_eq!(second.remaining, 0);

    // No duplicate rows from the re-run.
    let csv = std::fs::read_to_string(dir.path().join("Acme").join("Acme.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
}

#[tokio::test]
async fn test_failed_link_stays_remaining() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/acme-phones-1.php",
        listing_page(&["acme_ok-1.php", "acme_bad-2.php"], None),
    )
    .await;
    mount_page(&server, "/acme_ok-1.php", detail_page("Acme Ok", "")).await;
    Mock::given(method("GET"))
        .and(path("/acme_bad-2.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = test_config(dir.path());
    let start_url = format!("{}/acme-phones-1.php", server.uri());
    let summary = run_harvest(&config, &job("Acme", start_url)).await.unwrap();

    assert_eq!(summary.universe, 2);
    assert_eq!(summary.completed_this_run, 1);
    assert_eq!(summary.failed_this_run, 1);
    assert_eq!(summary.remaining, 1);

    // The failed link is still in the queue for the next run.
    let store = SqliteStateStore::open(&dir.path().join("Acme").join("state.db")).unwrap();
    let state = store.load_state().unwrap();
    let remaining = state.remaining();
    assert_eq!(remaining.len(), 1);
    assert!(remaining[0].ends_with("/acme_bad-2.php"));

    // And it left no trace in the outputs.
    let csv = std::fs::read_to_string(dir.path().join("Acme").join("Acme.csv")).unwrap();
    assert!(!csv.contains("Bad"));
    let log =
        std::fs::read_to_string(dir.path().join("Acme").join("Acme_completed.txt")).unwrap();
    assert_eq!(log.lines().count(), 1);
}

#[tokio::test]
async fn test_fresh_flag_rediscovers() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/acme-phones-1.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            &["acme_one-1.php"],
            None,
        )))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/acme_one-1.php"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(detail_page("Acme One", "")),
        )
        .expect(2)
        .mount(&server)
        .await;

    let config = test_config(dir.path());
    let start_url = format!("{}/acme-phones-1.php", server.uri());

    run_harvest(&config, &job("Acme", start_url.clone())).await.unwrap();

    let mut fresh_job = job("Acme", start_url);
    fresh_job.fresh = true;
    let summary = run_harvest(&config, &fresh_job).await.unwrap();
    assert_eq!(summary.completed_this_run, 1);
}

#[tokio::test]
async fn test_discovery_respects_page_bound() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/acme-phones-1.php",
        listing_page(&["acme_one-1.php"], Some("acme-phones-2.php")),
    )
    .await;
    // Page 2 exists but must never be visited.
    Mock::given(method("GET"))
        .and(path("/acme-phones-2.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(
            &["acme_two-2.php"],
            None,
        )))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "/acme_one-1.php", detail_page("Acme One", "")).await;

    let config = test_config(dir.path());
    let mut bounded_job = job("Acme", format!("{}/acme-phones-1.php", server.uri()));
    bounded_job.max_pages = Some(1);

    let summary = run_harvest(&config, &bounded_job).await.unwrap();
    assert_eq!(summary.universe, 1);
    assert_eq!(summary.remaining, 0);
}
