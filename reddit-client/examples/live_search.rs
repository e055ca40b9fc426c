use reddit_client::{PostSource, RedditSearchClient};
use std::io::{self, Write};
use zenith_core::{AppConfig, ErrorExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Reddit Search Manual Test ===\n");

    print!("Subreddit: ");
    io::stdout().flush()?;
    let mut subreddit = String::new();
    io::stdin().read_line(&mut subreddit)?;
    let subreddit = subreddit.trim().to_string();

    if subreddit.is_empty() {
        println!("❌ Subreddit cannot be empty.");
        return Ok(());
    }

    print!("Keywords (optional): ");
    io::stdout().flush()?;
    let mut keywords = String::new();
    io::stdin().read_line(&mut keywords)?;
    let keywords = keywords.trim().to_string();

    let client = RedditSearchClient::from_config(&AppConfig::default())?;

    println!("\n📰 Searching r/{} for {:?}...", subreddit, keywords);
    match client.fetch_posts(&subreddit, &keywords).await {
        Ok(posts) => {
            println!("✅ Found {} posts:", posts.len());
            for (i, post) in posts.iter().take(10).enumerate() {
                println!(
                    "   {}. {} (score {}, {} comments)",
                    i + 1,
                    post.title,
                    post.score,
                    post.num_comments
                );
                println!("      {}", post.permalink);
            }
        }
        Err(e) => {
            println!("❌ {}", e.user_friendly_message());
        }
    }

    Ok(())
}
