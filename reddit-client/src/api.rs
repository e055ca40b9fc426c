use crate::listing::SearchListing;
use crate::PostSource;
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use url::Url;
use zenith_core::{AppConfig, CoreError, RedditApiError, RedditPost};

const SEARCH_SORT: &str = "new";
const SEARCH_WINDOW: &str = "week";
const SEARCH_LIMIT: &str = "100";

/// Client for the public, unauthenticated subreddit search endpoint.
#[derive(Debug, Clone)]
pub struct RedditSearchClient {
    http_client: Client,
    base_url: Url,
    user_agent: String,
}

impl RedditSearchClient {
    pub fn new(
        base_url: &str,
        user_agent: String,
        timeout: Option<Duration>,
    ) -> Result<Self, CoreError> {
        let mut base_url = Url::parse(base_url).map_err(|e| CoreError::InvalidInput {
            message: format!("invalid Reddit base URL {}: {}", base_url, e),
        })?;
        // `Url::join` replaces the last path segment unless the base ends in a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder().user_agent(&user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Self {
            http_client,
            base_url,
            user_agent,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        Self::new(
            &config.reddit_base_url,
            config.user_agent.clone(),
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn search_url(&self, subreddit: &str) -> Result<Url, CoreError> {
        self.base_url
            .join(&format!("r/{}/search.json", subreddit))
            .map_err(|e| CoreError::InvalidInput {
                message: format!("cannot build search URL for r/{}: {}", subreddit, e),
            })
    }

    pub fn search_params(keywords: &str) -> [(&'static str, &str); 5] {
        [
            ("q", keywords),
            ("sort", SEARCH_SORT),
            ("t", SEARCH_WINDOW),
            ("restrict_sr", "on"),
            ("limit", SEARCH_LIMIT),
        ]
    }

    async fn make_request(&self, url: Url, keywords: &str) -> Result<Response, CoreError> {
        let start_time = Instant::now();

        info!("Making Reddit search request: GET {}", url.path());
        let response = self
            .http_client
            .get(url.clone())
            .query(&Self::search_params(keywords))
            .header("User-Agent", &self.user_agent)
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| {
                error!("Network error for GET {}: {}", url.path(), e);
                RedditApiError::Transport {
                    details: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Request failed with status: {} for {}", status, url.path());
            return Err(RedditApiError::UpstreamStatus {
                status_code: status.as_u16(),
                status_text: status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.as_u16().to_string()),
            }
            .into());
        }

        debug!(
            "Request successful: {} for {} in {:?}",
            status,
            url.path(),
            start_time.elapsed()
        );
        Ok(response)
    }

    pub async fn search_subreddit(
        &self,
        subreddit: &str,
        keywords: &str,
    ) -> Result<Vec<RedditPost>, CoreError> {
        let url = self.search_url(subreddit)?;
        let response = self.make_request(url, keywords).await?;

        let body = response.bytes().await.map_err(|e| {
            error!("Failed to read search response for r/{}: {}", subreddit, e);
            RedditApiError::Transport {
                details: e.to_string(),
            }
        })?;

        let listing = SearchListing::parse(&body).map_err(|e| {
            error!("Failed to parse search response for r/{}: {}", subreddit, e);
            e
        })?;

        let posts = listing.into_posts(&self.base_url);
        info!("Retrieved {} posts from r/{}", posts.len(), subreddit);
        Ok(posts)
    }
}

#[async_trait]
impl PostSource for RedditSearchClient {
    async fn fetch_posts(
        &self,
        subreddit: &str,
        keywords: &str,
    ) -> Result<Vec<RedditPost>, CoreError> {
        self.search_subreddit(subreddit, keywords).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client =
            RedditSearchClient::new("https://www.reddit.com", "test-agent/1.0".to_string(), None)
                .unwrap();
        assert_eq!(client.user_agent, "test-agent/1.0");
        assert_eq!(client.base_url().as_str(), "https://www.reddit.com/");
    }

    #[test]
    fn test_search_url() {
        let client =
            RedditSearchClient::new("https://www.reddit.com", "agent".to_string(), None).unwrap();
        assert_eq!(
            client.search_url("reactjs").unwrap().as_str(),
            "https://www.reddit.com/r/reactjs/search.json"
        );
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let client =
            RedditSearchClient::new("http://127.0.0.1:9000/proxy", "agent".to_string(), None)
                .unwrap();
        assert_eq!(
            client.search_url("rust").unwrap().as_str(),
            "http://127.0.0.1:9000/proxy/r/rust/search.json"
        );
    }

    #[test]
    fn test_search_params() {
        let params = RedditSearchClient::search_params("");
        assert_eq!(
            params,
            [
                ("q", ""),
                ("sort", "new"),
                ("t", "week"),
                ("restrict_sr", "on"),
                ("limit", "100"),
            ]
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = RedditSearchClient::new("not a url", "agent".to_string(), None);
        assert!(matches!(result, Err(CoreError::InvalidInput { .. })));
    }

    #[test]
    fn test_from_config() {
        let config = AppConfig {
            request_timeout_secs: Some(5),
            ..AppConfig::default()
        };
        let client = RedditSearchClient::from_config(&config).unwrap();
        assert_eq!(client.user_agent, config.user_agent);
    }
}
