//! Retry and transport behavior of the HTTP prober

use std::time::{Duration, Instant};
use subseek::config::{RetryPolicy, ScanSettings};
use subseek::probe::{build_http_client, HttpProber, OutcomeKind, Probe};
use subseek::target::Target;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        backoff_factor: 0.0,
        ..RetryPolicy::default()
    }
}

fn prober(retry: RetryPolicy) -> HttpProber {
    let client = build_http_client(&ScanSettings::default()).expect("Failed to build client");
    HttpProber::new(client, retry)
}

#[tokio::test]
async fn test_retries_until_success() {
    let mock_server = MockServer::start().await;

    // Three transient failures, then the real answer
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(3)
        .expect(3)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let target = Target::new(format!("{}/flaky", mock_server.uri()));
    let outcome = prober(fast_retry(3))
        .probe(&target, Duration::from_secs(2))
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Success { status_code: 200 });
    assert_eq!(outcome.attempts, 4, "expected exactly 3 retries");
}

#[tokio::test]
async fn test_persistent_503_is_reported_as_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&mock_server)
        .await;

    let target = Target::new(format!("{}/down", mock_server.uri()));
    let outcome = prober(fast_retry(3))
        .probe(&target, Duration::from_secs(2))
        .await;

    assert_eq!(
        outcome.kind,
        OutcomeKind::NetworkError {
            message: "too many 503 error responses".to_string()
        }
    );
    assert_eq!(outcome.attempts, 4);
}

#[tokio::test]
async fn test_persistent_503_returns_last_status_when_not_raising() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let retry = RetryPolicy {
        raise_on_status: false,
        ..fast_retry(2)
    };
    let target = Target::new(format!("{}/down", mock_server.uri()));
    let outcome = prober(retry).probe(&target, Duration::from_secs(2)).await;

    assert_eq!(outcome.kind, OutcomeKind::Success { status_code: 503 });
    assert_eq!(outcome.attempts, 3);
}

#[tokio::test]
async fn test_non_retryable_status_is_final() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let target = Target::new(format!("{}/missing", mock_server.uri()));
    let outcome = prober(fast_retry(3))
        .probe(&target, Duration::from_secs(2))
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Success { status_code: 404 });
    assert_eq!(outcome.attempts, 1);
}

#[tokio::test]
async fn test_retry_after_header_overrides_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    // Without the header this backoff would take a minute
    let retry = RetryPolicy {
        backoff_factor: 60.0,
        ..fast_retry(1)
    };
    let target = Target::new(format!("{}/busy", mock_server.uri()));

    let start = Instant::now();
    let outcome = prober(retry).probe(&target, Duration::from_secs(2)).await;

    assert_eq!(outcome.kind, OutcomeKind::Success { status_code: 200 });
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_timeout_is_retried_then_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let target = Target::new(format!("{}/slow", mock_server.uri()));
    let outcome = prober(fast_retry(1))
        .probe(&target, Duration::from_millis(100))
        .await;

    match outcome.kind {
        OutcomeKind::NetworkError { message } => {
            assert!(message.starts_with("request timed out"), "{}", message)
        }
        other => panic!("expected a network error, got {:?}", other),
    }
    assert_eq!(outcome.attempts, 2);
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", "subseek-test/1.0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let settings = ScanSettings {
        user_agent: "subseek-test/1.0".to_string(),
        ..ScanSettings::default()
    };
    let client = build_http_client(&settings).expect("Failed to build client");
    let target = Target::new(format!("{}/ua", mock_server.uri()));
    let outcome = HttpProber::new(client, fast_retry(0))
        .probe(&target, Duration::from_secs(2))
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Success { status_code: 200 });
}

#[tokio::test]
async fn test_redirects_are_reported_not_followed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let target = Target::new(format!("{}/old", mock_server.uri()));
    let outcome = prober(fast_retry(0))
        .probe(&target, Duration::from_secs(2))
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Success { status_code: 301 });
}

#[tokio::test]
async fn test_redirects_followed_when_enabled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let settings = ScanSettings {
        follow_redirects: true,
        ..ScanSettings::default()
    };
    let client = build_http_client(&settings).expect("Failed to build client");
    let target = Target::new(format!("{}/old", mock_server.uri()));
    let outcome = HttpProber::new(client, fast_retry(0))
        .probe(&target, Duration::from_secs(2))
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Success { status_code: 200 });
}

#[tokio::test]
async fn test_retry_after_ignored_for_other_statuses() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).insert_header("retry-after", "60"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let target = Target::new(format!("{}/flaky", mock_server.uri()));

    let start = Instant::now();
    let outcome = prober(fast_retry(1))
        .probe(&target, Duration::from_secs(2))
        .await;

    assert_eq!(outcome.kind, OutcomeKind::Success { status_code: 200 });
    assert_eq!(outcome.attempts, 2);
    assert!(start.elapsed() < Duration::from_secs(10));
}
