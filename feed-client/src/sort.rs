use zenith_core::{RedditPost, SortKey};

/// Sorted copy of `posts`, highest first. Ties keep their original order.
pub fn sort_posts(posts: &[RedditPost], key: SortKey) -> Vec<RedditPost> {
    let mut sorted = posts.to_vec();
    match key {
        SortKey::New => sorted.sort_by(|a, b| b.created_utc.cmp(&a.created_utc)),
        SortKey::Score => sorted.sort_by(|a, b| b.score.cmp(&a.score)),
        SortKey::Comments => sorted.sort_by(|a, b| b.num_comments.cmp(&a.num_comments)),
    }
    sorted
}
