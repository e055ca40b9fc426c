//! Wire shapes of the public search endpoint.
//!
//! The endpoint is loosely typed: a listing may come back without `data`, without
//! `children`, or with individual fields set to `null`. Everything is checked here so
//! only [`RedditPost`] values leave this module.

use serde::{Deserialize, Deserializer};
use tracing::warn;
use url::Url;
use zenith_core::{RedditApiError, RedditPost};

#[derive(Debug, Clone, Deserialize)]
pub struct RedditListing<T> {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: Option<RedditListingData<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditListingData<T> {
    #[serde(default)]
    pub children: Option<Vec<RedditListingChild<T>>>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditListingChild<T> {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: T,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RedditPostData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subreddit: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_utc: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub permalink: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub num_comments: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Outcome of decoding a successful search response.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchListing {
    Posts(Vec<RedditPostData>),
    /// The body had no `data.children` list. Treated as "no results".
    Empty,
}

impl SearchListing {
    /// Decode a response body. Only a body that is not JSON at all is an error.
    pub fn parse(body: &[u8]) -> Result<Self, RedditApiError> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| RedditApiError::InvalidResponse {
                details: format!("search response is not JSON: {}", e),
            })?;

        let listing: RedditListing<serde_json::Value> = match serde_json::from_value(value) {
            Ok(listing) => listing,
            Err(e) => {
                warn!("Unexpected search listing shape, treating as empty: {}", e);
                return Ok(SearchListing::Empty);
            }
        };

        let Some(children) = listing.data.and_then(|data| data.children) else {
            return Ok(SearchListing::Empty);
        };

        let posts = children
            .into_iter()
            .filter_map(
                |child| match serde_json::from_value::<RedditPostData>(child.data) {
                    Ok(post) => Some(post),
                    Err(e) => {
                        warn!("Skipping malformed search result: {}", e);
                        None
                    }
                },
            )
            .collect();

        Ok(SearchListing::Posts(posts))
    }

    /// Normalize into posts, resolving permalinks against `origin`.
    pub fn into_posts(self, origin: &Url) -> Vec<RedditPost> {
        match self {
            SearchListing::Posts(posts) => posts
                .into_iter()
                .map(|post| post.into_post(origin))
                .collect(),
            SearchListing::Empty => Vec::new(),
        }
    }
}

impl RedditPostData {
    pub fn into_post(self, origin: &Url) -> RedditPost {
        let permalink = absolute_permalink(origin, &self.permalink);
        RedditPost {
            id: self.id,
            title: self.title,
            author: self.author,
            subreddit: self.subreddit,
            score: self.score,
            url: self.url,
            created_utc: self.created_utc as i64,
            permalink,
            num_comments: self.num_comments,
        }
    }
}

/// Prefixes the permalink with the origin's scheme, host and port. The permalink is
/// never resolved as a URL reference, so upstream data cannot move it to another host.
fn absolute_permalink(origin: &Url, permalink: &str) -> String {
    let origin = origin.origin().ascii_serialization();
    if permalink.is_empty() || permalink.starts_with('/') {
        format!("{}{}", origin, permalink)
    } else {
        format!("{}/{}", origin, permalink)
    }
}
