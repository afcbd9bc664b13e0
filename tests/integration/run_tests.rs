//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! real reqwest transport through a full run.

use crm_harvest::config::{Config, RangeConfig, SinkFormat};
use crm_harvest::fetcher::{harvest, RunController};
use crm_harvest::storage::SqliteSink;
use crm_harvest::RunState;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_USER_AGENT: &str = "TestHarvester/1.0";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, output: &Path, start: u64, end: u64) -> Config {
    let mut config = Config::default();
    config.range = RangeConfig { start, end };
    config.fetch.base_url = format!("{}/crm", base_url);
    config.fetch.user_agent = TEST_USER_AGENT.to_string();
    config.fetch.timeout_secs = 2.0;
    config.fetch.delay_secs = 0.0;
    config.fetch.concurrency = 2;
    config.output.directory = output.to_string_lossy().into_owned();
    config
}

fn read_summary(dir: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(dir.join("summary.json")).expect("summary missing");
    serde_json::from_str(&text).expect("summary is not JSON")
}

fn record_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("output dir missing")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("record_"))
        .collect();
    names.sort();
    names
}

async fn mount_record(server: &MockServer, id: u64, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/crm/{}", id)))
        .and(header("user-agent", TEST_USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/plain"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_single_record_is_persisted() {
    let mock_server = MockServer::start().await;
    mount_record(&mock_server, 1, "hello").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path(), 1, 1);

    let report = harvest(&config, CancellationToken::new())
        .await
        .expect("Harvest failed");

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("record_1.txt")).unwrap(),
        "hello"
    );

    let summary = read_summary(dir.path());
    assert_eq!(summary["successful"], 1);
    assert_eq!(summary["failed"], 0);
    assert_eq!(summary["total_attempted"], 1);
    assert_eq!(summary["errors"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_missing_record_is_reported_as_http_error() {
    let mock_server = MockServer::start().await;
    mount_record(&mock_server, 1, "one").await;
    mount_record(&mock_server, 3, "three").await;
    // Unmatched requests get wiremock's default 404

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path(), 1, 3);

    let report = harvest(&config, CancellationToken::new())
        .await
        .expect("Harvest failed");

    assert_eq!(report.statistics.successful, 2);
    assert_eq!(report.statistics.failed, 1);
    assert_eq!(record_files(dir.path()), vec!["record_1.txt", "record_3.txt"]);

    let summary = read_summary(dir.path());
    assert_eq!(summary["successful"], 2);
    assert_eq!(summary["failed"], 1);
    assert_eq!(summary["errors"][0]["id"], 2);
    assert_eq!(summary["errors"][0]["message"], "HTTP 404");
}

#[tokio::test]
async fn test_no_save_writes_no_records() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("payload"))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path(), 1, 5);
    config.output.save_records = false;

    let report = harvest(&config, CancellationToken::new())
        .await
        .expect("Harvest failed");

    assert_eq!(report.statistics.successful, 5);
    assert!(record_files(dir.path()).is_empty());
    assert_eq!(read_summary(dir.path())["successful"], 5);
}

#[tokio::test]
async fn test_rerun_overwrites_records() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("same"))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path(), 10, 14);

    harvest(&config, CancellationToken::new()).await.unwrap();
    harvest(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(record_files(dir.path()).len(), 5);
    assert_eq!(read_summary(dir.path())["total_attempted"], 5);
}

#[tokio::test]
async fn test_slow_response_is_classified_as_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path(), 1, 1);
    config.fetch.timeout_secs = 0.2;

    let report = harvest(&config, CancellationToken::new())
        .await
        .expect("Harvest failed");

    assert_eq!(report.statistics.failed, 1);
    assert_eq!(report.statistics.errors()[0].message, "Request timeout");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_connection_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("http://127.0.0.1:{}", port), dir.path(), 1, 3);

    let report = harvest(&config, CancellationToken::new())
        .await
        .expect("Harvest failed");

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.statistics.failed, 3);
    assert!(report
        .statistics
        .errors()
        .iter()
        .all(|e| e.message == "Connection error"));
}

#[tokio::test]
async fn test_sqlite_sink_stores_one_row_per_id() {
    let mock_server = MockServer::start().await;
    mount_record(&mock_server, 1, "first").await;
    mount_record(&mock_server, 2, "second").await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path(), 1, 2);
    config.output.format = SinkFormat::Sqlite;

    harvest(&config, CancellationToken::new()).await.unwrap();
    harvest(&config, CancellationToken::new()).await.unwrap();

    let sink = SqliteSink::new(&config.output.database_path()).unwrap();
    assert_eq!(sink.count().unwrap(), 2);
    let record = sink.get(2).unwrap().unwrap();
    assert_eq!(record.payload, b"second");
    assert_eq!(record.content_type, "text/plain");
    assert!(record_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_interrupted_run_writes_partial_summary() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("slow")
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path(), 1, 1000);
    config.fetch.concurrency = 1;

    let mut controller = RunController::from_config(&config).unwrap();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(350)).await;
        trigger.cancel();
    });

    let report = controller.run(cancel).await.expect("Harvest failed");
    let stats = &report.statistics;

    assert_eq!(report.state, RunState::Interrupted);
    assert!(stats.total_attempted > 0);
    assert!(stats.total_attempted < 1000);
    assert_eq!(stats.successful + stats.failed, stats.total_attempted);
    assert_eq!(record_files(dir.path()).len() as u64, stats.successful);

    let summary = read_summary(dir.path());
    assert_eq!(summary["total_attempted"], stats.total_attempted);
    assert_eq!(summary["end_id"], 1000);
}
