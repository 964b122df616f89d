//! Integration tests for the source adapters against mock providers.

use chrono::{Duration, Utc};
use daily_digest::config::{ArxivConfig, GitHubConfig};
use daily_digest::sources::{http_client, ArxivSource, GitHubSource};
use daily_digest::{Category, SourceAdapter, SourceFailure};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn github(server: &MockServer, token: Option<&str>) -> GitHubSource {
    GitHubSource::new(
        http_client(),
        GitHubConfig {
            api_base: server.uri(),
            token: token.map(ToString::to_string),
        },
        24,
    )
}

fn arxiv(server: &MockServer) -> ArxivSource {
    ArxivSource::new(
        http_client(),
        ArxivConfig {
            api_base: server.uri(),
        },
    )
}

// =============================================================================
// GitHub
// =============================================================================

#[tokio::test]
async fn test_github_search_request_and_mapping() {
    let server = MockServer::start().await;
    let since = (Utc::now() - Duration::hours(24)).date_naive();

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param(
            "q",
            format!("load forecasting pushed:>{}", since.format("%Y-%m-%d")),
        ))
        .and(query_param("sort", "updated"))
        .and(query_param("order", "desc"))
        .and(query_param("per_page", "3"))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("authorization", "Bearer ghp_test"))
        .and(header(
            "user-agent",
            concat!("daily-digest/", env!("CARGO_PKG_VERSION")),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 2,
            "incomplete_results": false,
            "items": [
                {
                    "full_name": "Foo/bar",
                    "html_url": "https://github.com/Foo/bar",
                    "description": "Load forecasting toolkit",
                    "stargazers_count": 42,
                    "pushed_at": "2026-10-18T21:04:11Z",
                    "updated_at": "2026-10-18T21:04:11Z"
                },
                {
                    "full_name": "baz/qux",
                    "html_url": "https://github.com/baz/qux",
                    "description": null,
                    "stargazers_count": 0,
                    "pushed_at": "2026-10-18T08:00:00Z"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let items = github(&server, Some("ghp_test"))
        .fetch("load forecasting", 3)
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].category(), Category::Repository);
    assert_eq!(items[0].title(), "Foo/bar");
    assert_eq!(items[0].metric(), Some(42));
    assert_eq!(items[1].summary(), None);
}

#[tokio::test]
async fn test_github_rate_limit_is_status_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "message": "API rate limit exceeded" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = github(&server, None).fetch("load forecasting", 3).await.unwrap_err();

    assert_eq!(err.provider, "github");
    assert_eq!(err.keyword, "load forecasting");
    match err.cause {
        SourceFailure::Status { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("rate limit"));
        }
        other => panic!("expected status failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_github_garbage_body_is_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = github(&server, None).fetch("k", 3).await.unwrap_err();
    assert!(matches!(err.cause, SourceFailure::Parse(_)));
}

// =============================================================================
// arXiv
// =============================================================================

const ARXIV_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:load forecasting</title>
  <entry>
    <id>http://arxiv.org/abs/2610.01234v1</id>
    <updated>2026-10-17T17:59:59Z</updated>
    <published>2026-10-17T17:59:59Z</published>
    <title>Probabilistic Load Forecasting</title>
    <summary>We propose a model.</summary>
  </entry>
</feed>"#;

#[tokio::test]
async fn test_arxiv_query_and_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("search_query", "all:load forecasting"))
        .and(query_param("start", "0"))
        .and(query_param("max_results", "3"))
        .and(query_param("sortBy", "submittedDate"))
        .and(query_param("sortOrder", "descending"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/atom+xml")
                .set_body_string(ARXIV_FEED),
        )
        .expect(1)
        .mount(&server)
        .await;

    let items = arxiv(&server).fetch("load forecasting", 3).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].category(), Category::Paper);
    assert_eq!(items[0].title(), "Probabilistic Load Forecasting");
    assert_eq!(items[0].url(), "http://arxiv.org/abs/2610.01234v1");
    assert_eq!(items[0].summary(), Some("We propose a model."));
}

#[tokio::test]
async fn test_arxiv_server_error_is_status_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(1)
        .mount(&server)
        .await;

    let err = arxiv(&server).fetch("load forecasting", 3).await.unwrap_err();

    assert_eq!(err.provider, "arxiv");
    assert!(matches!(err.cause, SourceFailure::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_unreachable_provider_is_transport_failure() {
    // Nothing listens on port 1.
    let uri = "http://127.0.0.1:1".to_string();
    let source = ArxivSource::new(http_client(), ArxivConfig { api_base: uri });

    let err = source.fetch("load forecasting", 3).await.unwrap_err();
    assert!(matches!(err.cause, SourceFailure::Transport(_)));
}
