use crate::{PostSource, RedditSearchClient};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use zenith_core::{CoreError, RedditApiError};

#[derive(Debug, Clone)]
struct CapturedRequest {
    subreddit: String,
    query: HashMap<String, String>,
    user_agent: Option<String>,
    cache_control: Option<String>,
}

#[derive(Clone)]
struct Upstream {
    status: StatusCode,
    body: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

async fn search_handler(
    State(upstream): State<Upstream>,
    Path(subreddit): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    upstream.captured.lock().unwrap().push(CapturedRequest {
        subreddit,
        query,
        user_agent: header("user-agent"),
        cache_control: header("cache-control"),
    });
    (upstream.status, upstream.body.clone())
}

async fn spawn_upstream(
    status: StatusCode,
    body: String,
) -> (String, Arc<Mutex<Vec<CapturedRequest>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let upstream = Upstream {
        status,
        body,
        captured: captured.clone(),
    };
    let app = Router::new()
        .route("/r/:subreddit/search.json", get(search_handler))
        .with_state(upstream);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), captured)
}

fn client(base_url: &str) -> RedditSearchClient {
    RedditSearchClient::new(base_url, "zenith-test/1.0".to_string(), None).unwrap()
}

fn one_post_listing() -> Value {
    json!({
        "kind": "Listing",
        "data": {
            "children": [{
                "kind": "t3",
                "data": {
                    "id": "a",
                    "title": "Server components",
                    "author": "someone",
                    "subreddit": "reactjs",
                    "score": 7,
                    "url": "https://example.com/rsc",
                    "created_utc": 1700000123.0,
                    "permalink": "/r/reactjs/comments/a/server_components/",
                    "num_comments": 2
                }
            }]
        }
    })
}

#[tokio::test]
async fn test_fetch_sends_search_query() {
    let (base_url, captured) = spawn_upstream(StatusCode::OK, one_post_listing().to_string()).await;

    let posts = client(&base_url)
        .fetch_posts("reactjs", "server components")
        .await
        .unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].permalink,
        format!("{}/r/reactjs/comments/a/server_components/", base_url)
    );
    assert_eq!(posts[0].created_utc, 1_700_000_123);

    let requests = captured.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.subreddit, "reactjs");
    assert_eq!(request.query.get("q").map(String::as_str), Some("server components"));
    assert_eq!(request.query.get("sort").map(String::as_str), Some("new"));
    assert_eq!(request.query.get("t").map(String::as_str), Some("week"));
    assert_eq!(request.query.get("restrict_sr").map(String::as_str), Some("on"));
    assert_eq!(request.query.get("limit").map(String::as_str), Some("100"));
    assert_eq!(request.user_agent.as_deref(), Some("zenith-test/1.0"));
    assert_eq!(request.cache_control.as_deref(), Some("no-cache, no-store"));
}

#[tokio::test]
async fn test_empty_keywords_are_sent() {
    let (base_url, captured) =
        spawn_upstream(StatusCode::OK, r#"{"data":{"children":[]}}"#.to_string()).await;

    let posts = client(&base_url).fetch_posts("rust", "").await.unwrap();
    assert!(posts.is_empty());

    let requests = captured.lock().unwrap().clone();
    assert_eq!(requests[0].query.get("q").map(String::as_str), Some(""));
}

#[tokio::test]
async fn test_listing_without_children_is_empty() {
    let (base_url, _) = spawn_upstream(StatusCode::OK, r#"{"data":{}}"#.to_string()).await;
    let posts = client(&base_url).fetch_posts("rust", "").await.unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn test_upstream_status_is_reported() {
    let (base_url, _) = spawn_upstream(StatusCode::SERVICE_UNAVAILABLE, "down".to_string()).await;

    let result = client(&base_url).fetch_posts("rust", "").await;
    match result {
        Err(CoreError::RedditApi(RedditApiError::UpstreamStatus {
            status_code,
            status_text,
        })) => {
            assert_eq!(status_code, 503);
            assert_eq!(status_text, "Service Unavailable");
        }
        other => panic!("Expected UpstreamStatus error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_body_is_invalid_response() {
    let (base_url, _) = spawn_upstream(StatusCode::OK, "<html>nope</html>".to_string()).await;

    let result = client(&base_url).fetch_posts("rust", "").await;
    assert!(matches!(
        result,
        Err(CoreError::RedditApi(RedditApiError::InvalidResponse { .. }))
    ));
}

#[tokio::test]
async fn test_unreachable_upstream_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = client(&format!("http://{}", addr)).fetch_posts("rust", "").await;
    assert!(matches!(
        result,
        Err(CoreError::RedditApi(RedditApiError::Transport { .. }))
    ));
}

#[tokio::test]
async fn test_json_content_type_is_accepted() {
    let app = Router::new().route(
        "/r/:subreddit/search.json",
        get(|| async { Json(one_post_listing()) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let posts = client(&format!("http://{}", addr))
        .fetch_posts("reactjs", "")
        .await
        .unwrap();
    assert_eq!(posts[0].id, "a");
}
