use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use tracing::{debug, info};
use zenith_core::{ApiResponse, CoreError, DeletedMonitor, Monitor, MonitorDraft, RedditPost};

use crate::{error::ApiError, state::AppState};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Pull `subreddit`/`keywords` out of a request body. The body is read as JSON whatever
/// its content type. Non-string values count as absent.
fn parse_draft(body: &[u8]) -> Result<MonitorDraft, CoreError> {
    let body: Value = serde_json::from_slice(body).map_err(|e| {
        debug!("Rejected monitor body: {}", e);
        CoreError::InvalidInput {
            message: "Invalid JSON body".to_string(),
        }
    })?;

    MonitorDraft::parse(
        body.get("subreddit").and_then(Value::as_str),
        body.get("keywords").and_then(Value::as_str),
    )
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn list_monitors(State(state): State<AppState>) -> ApiResult<Vec<Monitor>> {
    let monitors = state.store.list().await?;
    Ok(Json(ApiResponse::ok(monitors)))
}

pub async fn create_monitor(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Monitor> {
    let draft = parse_draft(&body)?;
    let monitor = state.store.create(&draft).await?;
    Ok(Json(ApiResponse::ok(monitor)))
}

pub async fn get_monitor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Monitor> {
    let monitor = state.store.get(&id).await?;
    Ok(Json(ApiResponse::ok(monitor)))
}

pub async fn update_monitor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Monitor> {
    let draft = parse_draft(&body)?;
    let monitor = state.store.update(&id, &draft).await?;
    Ok(Json(ApiResponse::ok(monitor)))
}

pub async fn delete_monitor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeletedMonitor> {
    if !state.store.delete(&id).await? {
        return Err(CoreError::NotFound {
            resource: "Monitor".to_string(),
        }
        .into());
    }
    Ok(Json(ApiResponse::ok(DeletedMonitor { id })))
}

pub async fn list_posts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<RedditPost>> {
    let monitor = state.store.get(&id).await?;
    let posts = state
        .posts
        .fetch_posts(&monitor.subreddit, &monitor.keywords)
        .await?;

    info!(
        "Serving {} posts for monitor {} (r/{})",
        posts.len(),
        monitor.id,
        monitor.subreddit
    );
    Ok(Json(ApiResponse::ok(posts)))
}
