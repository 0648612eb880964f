//! End-to-end scans against mock servers

use crate::create_test_config;
use std::time::{Duration, Instant};
use subseek::dispatch::{run_scan, Shutdown};
use subseek::output::save_results;
use subseek::target::PathEnumerator;
use subseek::StatusCategory;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a GET mock for `route` answering `status`
async fn mount_status(mock_server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_scan_collects_matching_paths() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/admin", 200).await;
    mount_status(&mock_server, "/login", 302).await;
    mount_status(&mock_server, "/missing", 404).await;

    let config = create_test_config(&mock_server.uri(), 10);
    let targets = PathEnumerator::new(&config.base_url, ["admin", "login", "missing"]);

    let report = run_scan(&config, &targets, Shutdown::new())
        .await
        .expect("Scan failed");

    let mut found: Vec<_> = report
        .records
        .iter()
        .map(|r| (r.url.clone(), r.status_code))
        .collect();
    found.sort();

    let base = mock_server.uri();
    assert_eq!(
        found,
        vec![(format!("{}/admin", base), 200), (format!("{}/login", base), 302)]
    );
    assert_eq!(report.summary.completed, 3);
    assert_eq!(report.summary.matched, 2);
    assert_eq!(
        report.summary.by_category.get(&StatusCategory::ClientError),
        Some(&1)
    );
}

#[tokio::test]
async fn test_trailing_slash_base_url() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/admin", 200).await;

    let config = create_test_config(&format!("{}/", mock_server.uri()), 2);
    let targets = PathEnumerator::new(&config.base_url, ["admin"]);

    let report = run_scan(&config, &targets, Shutdown::new())
        .await
        .expect("Scan failed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].url, format!("{}/admin", mock_server.uri()));
}

#[tokio::test]
async fn test_match_count_independent_of_concurrency() {
    let mock_server = MockServer::start().await;

    let words: Vec<String> = (0..60).map(|i| format!("path{}", i)).collect();
    for (i, word) in words.iter().enumerate() {
        let status = match i % 3 {
            0 => 200,
            1 => 404,
            _ => 403,
        };
        mount_status(&mock_server, &format!("/{}", word), status).await;
    }

    let mut runs = Vec::new();
    for threads in [1, 50] {
        let config = create_test_config(&mock_server.uri(), threads);
        let targets = PathEnumerator::new(&config.base_url, &words);
        let report = run_scan(&config, &targets, Shutdown::new())
            .await
            .expect("Scan failed");

        assert_eq!(report.summary.dispatched, 60);
        let mut urls: Vec<_> = report.records.into_iter().map(|r| r.url).collect();
        urls.sort();
        runs.push(urls);
    }

    assert_eq!(runs[0].len(), 40);
    assert_eq!(runs[0], runs[1]);

    // Every path was requested exactly once per run
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 120);
}

#[tokio::test]
async fn test_unreachable_host_does_not_abort_scan() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let mut config = create_test_config(&format!("http://127.0.0.1:{}", port), 4);
    config.retry.max_retries = 1;
    let targets = PathEnumerator::new(&config.base_url, ["a", "b", "c"]);

    let report = run_scan(&config, &targets, Shutdown::new())
        .await
        .expect("Scan failed");

    assert_eq!(report.summary.completed, 3);
    assert_eq!(report.summary.network_errors, 3);
    assert!(report.records.is_empty());
}

#[tokio::test]
async fn test_delay_paces_requests() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), 1);
    config.scan.delay = 0.1;
    let targets = PathEnumerator::new(&config.base_url, ["a", "b", "c", "d", "e"]);

    let start = Instant::now();
    run_scan(&config, &targets, Shutdown::new())
        .await
        .expect("Scan failed");

    assert!(start.elapsed() >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_cancelled_scan_sends_no_requests() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 4);
    let targets = PathEnumerator::new(&config.base_url, ["a", "b", "c"]);

    let shutdown = Shutdown::new();
    shutdown.trigger();
    let report = run_scan(&config, &targets, shutdown)
        .await
        .expect("Scan failed");

    assert!(report.summary.cancelled);
    assert_eq!(report.summary.dispatched, 0);
}

#[tokio::test]
async fn test_scan_results_can_be_saved() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/admin", 200).await;
    mount_status(&mock_server, "/secret", 403).await;

    let config = create_test_config(&mock_server.uri(), 1);
    let targets = PathEnumerator::new(&config.base_url, ["admin", "secret", "nothing"]);
    let report = run_scan(&config, &targets, Shutdown::new())
        .await
        .expect("Scan failed");

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("results.txt");
    save_results(&out, &report.records).expect("Failed to save results");

    let content = std::fs::read_to_string(&out).unwrap();
    let base = mock_server.uri();
    // A single worker completes targets in wordlist order
    assert_eq!(
        content,
        format!(
            "[+] Found valid path (200): {base}/admin\n[+] Found valid path (403): {base}/secret\n"
        )
    );
}

#[tokio::test]
async fn test_empty_wordlist_completes_with_empty_results() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 4);
    let targets = PathEnumerator::new(&config.base_url, ["", "   ", "\t"]);
    assert!(targets.is_empty());

    let report = run_scan(&config, &targets, Shutdown::new())
        .await
        .expect("Scan failed");

    assert_eq!(report.summary.dispatched, 0);
    assert!(!report.summary.cancelled);
    assert!(report.records.is_empty());

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("results.txt");
    save_results(&out, &report.records).expect("Failed to save results");
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "");
}

#[tokio::test]
async fn test_shutdown_during_backoff_counts_only_sent_requests() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), 1);
    config.retry.backoff_factor = 60.0;
    let targets = PathEnumerator::new(&config.base_url, ["down"]);

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.trigger();
    });

    let start = Instant::now();
    let report = run_scan(&config, &targets, shutdown)
        .await
        .expect("Scan failed");

    assert!(start.elapsed() < Duration::from_secs(30));
    assert_eq!(report.summary.network_errors, 1);
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
}
