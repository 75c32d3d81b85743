//! HttpFetcher against a local axum server.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{http::StatusCode, response::Html, routing::get, Router};
use project_scout::{ErrorKind, FetchConfig, Fetcher, HttpFetcher};

const PAGE: &str = r#"<html><head><title>Public Works</title>
<meta name="description" content="Capital projects"></head>
<body><h1>Construction   projects</h1><script>ignored()</script></body></html>"#;

/// Serve a few fixed routes on an ephemeral port.
async fn spawn_server() -> SocketAddr {
    let app = Router::new()
        .route("/page", get(|| async { Html(PAGE) }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route("/created", get(|| async { (StatusCode::CREATED, "made") }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Html(PAGE)
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn fetcher(timeout: Duration) -> HttpFetcher {
    let config = FetchConfig {
        timeout,
        ..FetchConfig::default()
    };
    HttpFetcher::new(&config).unwrap()
}

#[tokio::test]
async fn test_fetch_text_and_html() {
    let addr = spawn_server().await;
    let fetcher = fetcher(Duration::from_secs(5));
    let url = format!("http://{addr}/page");

    let text = fetcher.fetch_text(&url).await;
    assert_eq!(text.body(), Some("Public Works Construction projects"));

    let html = fetcher.fetch_html(&url).await;
    assert_eq!(html.body(), Some(PAGE));
    assert_eq!(html.url, url);
}

#[tokio::test]
async fn test_non_200_is_http_status_error() {
    let addr = spawn_server().await;
    let fetcher = fetcher(Duration::from_secs(5));

    let missing = fetcher.fetch_text(&format!("http://{addr}/missing")).await;
    assert_eq!(missing.error_kind(), Some(&ErrorKind::HttpStatus(404)));

    // Only 200 counts, other 2xx included.
    let created = fetcher.fetch_html(&format!("http://{addr}/created")).await;
    assert_eq!(created.error_kind(), Some(&ErrorKind::HttpStatus(201)));
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let addr = spawn_server().await;
    let fetcher = fetcher(Duration::from_millis(200));

    let result = fetcher.fetch_text(&format!("http://{addr}/slow")).await;

    match result.error_kind() {
        Some(ErrorKind::Network(cause)) => assert!(cause.starts_with("timed out")),
        other => panic!("expected network error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = fetcher(Duration::from_secs(2))
        .fetch_html(&format!("http://{addr}/"))
        .await;
    assert!(matches!(result.error_kind(), Some(ErrorKind::Network(_))));
}
