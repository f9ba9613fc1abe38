use reddit_client::{ListingQuery, RedditClient, Sort};
use std::env;
use viewer_core::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Reddit Listing Fetch ===\n");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            println!("❌ {}", e);
            println!("Set REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET, or point");
            println!("REDDIT_VIEWER_CONFIG at a config file.");
            return Ok(());
        }
    };

    let subreddit = env::args().nth(1).unwrap_or_else(|| "rust".to_string());
    let sort: Sort = env::args()
        .nth(2)
        .unwrap_or_else(|| "hot".to_string())
        .parse()?;

    let client = RedditClient::new(&config)?;
    println!("✅ Reddit client created\n");

    let token = client.access_token().await?;
    println!("🔑 Token type: {}, expires in {}s\n", token.token_type, token.expires_in);

    let query = ListingQuery::default().with_limit(10);
    let now = chrono::Utc::now().timestamp();
    let listing = client
        .fetch_post_summaries(&subreddit, sort, &query, now)
        .await?;

    println!("📋 r/{} ({}): {} posts", subreddit, sort, listing.items.len());
    for post in &listing.items {
        println!(
            "  [{:>5}] {} ({}, {} comments)",
            post.score, post.title, post.time_ago, post.num_comments
        );
        println!("          /r/{}/comments/{}/{}", post.subreddit, post.id, post.slug);
        if let Some(thumbnail) = &post.thumbnail {
            println!("          🖼  {}x{} {}", thumbnail.width, thumbnail.height, thumbnail.url);
        }
    }

    match listing.after {
        Some(after) => println!("\nNext page cursor: {}", after),
        None => println!("\nNo more pages"),
    }
    println!(
        "Requests on current token: {}",
        client.token_cache().get_request_count()
    );

    Ok(())
}
