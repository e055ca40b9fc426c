use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};
use url::Url;
use zenith_core::{ApiResponse, CoreError, DeletedMonitor, Monitor, MonitorDraft, RedditPost};

/// Calls the monitor API. Every method settles exactly once and never retries.
#[async_trait]
pub trait FeedApi: Send + Sync {
    async fn list_monitors(&self) -> Result<Vec<Monitor>, CoreError>;
    async fn create_monitor(&self, draft: &MonitorDraft) -> Result<Monitor, CoreError>;
    async fn update_monitor(&self, id: &str, draft: &MonitorDraft) -> Result<Monitor, CoreError>;
    async fn delete_monitor(&self, id: &str) -> Result<DeletedMonitor, CoreError>;
    async fn list_posts(&self, monitor_id: &str) -> Result<Vec<RedditPost>, CoreError>;
}

#[derive(Debug, Serialize)]
struct MonitorPayload<'a> {
    subreddit: &'a str,
    keywords: &'a str,
}

impl<'a> From<&'a MonitorDraft> for MonitorPayload<'a> {
    fn from(draft: &'a MonitorDraft) -> Self {
        Self {
            subreddit: draft.subreddit(),
            keywords: draft.keywords(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpFeedApi {
    http_client: Client,
    base_url: Url,
}

impl HttpFeedApi {
    pub fn new(base_url: &str) -> Result<Self, CoreError> {
        let base_url = Url::parse(base_url).map_err(|e| CoreError::InvalidInput {
            message: format!("invalid API base URL {}: {}", base_url, e),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CoreError::InvalidInput {
                message: format!("invalid API base URL {}", base_url),
            });
        }

        Ok(Self {
            http_client: Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn call<T, B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, CoreError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        debug!("{} {}", method, url.path());
        let mut request = self.http_client.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("Network error for {} {}: {}", method, url.path(), e);
            CoreError::Network(e)
        })?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let envelope: ApiResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(CoreError::Serialization(e)),
            Err(_) => {
                return Err(CoreError::RequestFailed {
                    message: format!("Request failed with status {}", status),
                    status_code: Some(status.as_u16()),
                })
            }
        };

        match envelope {
            ApiResponse {
                success: true,
                data: Some(data),
                ..
            } => Ok(data),
            ApiResponse { error, .. } => Err(CoreError::RequestFailed {
                message: error.unwrap_or_else(|| "Request failed".to_string()),
                status_code: Some(status.as_u16()),
            }),
        }
    }
}

#[async_trait]
impl FeedApi for HttpFeedApi {
    async fn list_monitors(&self) -> Result<Vec<Monitor>, CoreError> {
        let url = self.endpoint(&["api", "monitors"]);
        self.call::<_, ()>(Method::GET, url, None).await
    }

    async fn create_monitor(&self, draft: &MonitorDraft) -> Result<Monitor, CoreError> {
        let url = self.endpoint(&["api", "monitors"]);
        self.call(Method::POST, url, Some(&MonitorPayload::from(draft)))
            .await
    }

    async fn update_monitor(&self, id: &str, draft: &MonitorDraft) -> Result<Monitor, CoreError> {
        let url = self.endpoint(&["api", "monitors", id]);
        self.call(Method::PUT, url, Some(&MonitorPayload::from(draft)))
            .await
    }

    async fn delete_monitor(&self, id: &str) -> Result<DeletedMonitor, CoreError> {
        let url = self.endpoint(&["api", "monitors", id]);
        self.call::<_, ()>(Method::DELETE, url, None).await
    }

    async fn list_posts(&self, monitor_id: &str) -> Result<Vec<RedditPost>, CoreError> {
        let url = self.endpoint(&["api", "monitors", monitor_id, "posts"]);
        self.call::<_, ()>(Method::GET, url, None).await
    }
}
