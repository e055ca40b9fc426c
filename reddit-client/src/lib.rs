use async_trait::async_trait;
use zenith_core::{CoreError, RedditPost};

pub mod api;
pub mod listing;

#[cfg(test)]
mod tests;

pub use api::RedditSearchClient;
pub use listing::{
    RedditListing, RedditListingChild, RedditListingData, RedditPostData, SearchListing,
};

/// Source of fresh posts for a subreddit + keyword filter.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_posts(
        &self,
        subreddit: &str,
        keywords: &str,
    ) -> Result<Vec<RedditPost>, CoreError>;
}
