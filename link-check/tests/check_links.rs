use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use link_check::checker::Checker;
use link_check::config::Config;
use link_check::report::{Report, FAILURE_EXIT_CODE};

async fn flaky(State(hits): State<Arc<AtomicUsize>>) -> StatusCode {
    if hits.fetch_add(1, Ordering::SeqCst) < 2 {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

async fn spawn_site() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/ok", get(|| async { "ok" }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/no-head",
            get(|| async { "ok" }).head(|| async { StatusCode::METHOD_NOT_ALLOWED }),
        )
        .route("/moved", get(|| async { Redirect::permanent("/ok") }))
        .route("/flaky", get(flaky))
        .route("/down", get(|| async { StatusCode::BAD_GATEWAY }))
        .with_state(Arc::clone(&hits));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), hits)
}

#[derive(Clone, Default)]
struct Gauge {
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

async fn slow(State(gauge): State<Gauge>) -> &'static str {
    let now = gauge.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    gauge.peak.fetch_max(now, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;
    gauge.in_flight.fetch_sub(1, Ordering::SeqCst);
    "ok"
}

async fn spawn_slow_site() -> (String, Gauge) {
    let gauge = Gauge::default();
    let app = Router::new()
        .route("/slow", get(slow))
        .with_state(gauge.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), gauge)
}

fn checker() -> Checker {
    let config = Config {
        timeout: Duration::from_secs(5),
        retries: 2,
        backoff: Duration::from_millis(10),
        ..Config::default()
    };
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(config.timeout)
        .build()
        .unwrap();
    Checker::with_client(client, &config)
}

#[tokio::test]
async fn test_reachable_link_passes() {
    let (base, _) = spawn_site().await;
    let outcome = checker().check(&format!("{}/ok", base)).await;
    assert_eq!(outcome.status, Some(200));
    assert!(!outcome.is_failure());
}

#[tokio::test]
async fn test_missing_page_fails() {
    let (base, _) = spawn_site().await;
    let outcome = checker().check(&format!("{}/missing", base)).await;
    assert_eq!(outcome.status, Some(404));
    assert!(outcome.is_failure());
}

#[tokio::test]
async fn test_head_refusal_falls_back_to_get() {
    let (base, _) = spawn_site().await;
    let outcome = checker().check(&format!("{}/no-head", base)).await;
    assert_eq!(outcome.status, Some(200));
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let (base, _) = spawn_site().await;
    let outcome = checker().check(&format!("{}/moved", base)).await;
    assert_eq!(outcome.status, Some(200));
    assert_eq!(outcome.detail, format!("{}/ok", base));
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let (base, hits) = spawn_site().await;
    let outcome = checker().check(&format!("{}/flaky", base)).await;
    assert_eq!(outcome.status, Some(200));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_persistent_server_error_fails() {
    let (base, _) = spawn_site().await;
    let outcome = checker().check(&format!("{}/down", base)).await;
    assert_eq!(outcome.status, Some(502));
    assert!(outcome.is_failure());
}

#[tokio::test]
async fn test_unreachable_host_has_no_status() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let outcome = checker().check(&format!("http://{}/", addr)).await;
    assert_eq!(outcome.status, None);
    assert!(!outcome.detail.is_empty());
    assert!(outcome.is_failure());
}

#[tokio::test]
async fn test_check_all_reports_every_link() {
    let (base, _) = spawn_site().await;
    let urls: Vec<String> = ["/ok", "/missing", "/no-head", "/moved"]
        .iter()
        .map(|path| format!("{}{}", base, path))
        .collect();

    let report = Report::new(checker().check_all(&urls, 2).await);
    assert_eq!(report.outcomes().len(), 4);
    let failures: Vec<&str> = report.failures().map(|o| o.url.as_str()).collect();
    assert_eq!(failures, vec![format!("{}/missing", base).as_str()]);
    assert_eq!(report.exit_code(), FAILURE_EXIT_CODE);
}

#[tokio::test]
async fn test_check_all_respects_concurrency_limit() {
    let (base, gauge) = spawn_slow_site().await;
    let urls: Vec<String> = (0..12).map(|n| format!("{}/slow?page={}", base, n)).collect();

    let outcomes = checker().check_all(&urls, 3).await;
    assert_eq!(outcomes.len(), 12);
    assert!(outcomes.iter().all(|outcome| outcome.status == Some(200)));

    let peak = gauge.peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "{} requests ran at once", peak);
    assert!(peak >= 2, "checks never overlapped");
}
