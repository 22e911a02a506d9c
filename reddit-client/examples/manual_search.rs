use memescout_core::{merge_results, split_keywords, AppConfig, ErrorExt};
use reddit_client::RedditClient;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    println!("=== Reddit Image Search Manual Test ===\n");

    let mut args = env::args().skip(1);
    let keywords = args.next().unwrap_or_else(|| "fool, tower".to_string());
    let config = AppConfig::from_env();
    let subreddit = args.next().unwrap_or_else(|| config.default_subreddit.clone());

    println!("📋 Setup Instructions:");
    println!("1. Go to https://www.reddit.com/prefs/apps");
    println!("2. Create a new app (type: 'script')");
    println!("3. Put REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET in your environment or a .env file");
    println!();

    let client = match RedditClient::from_app_config(&config) {
        Ok(client) => client,
        Err(e) => {
            println!("❌ {}", e.user_friendly_message());
            return Ok(());
        }
    };
    println!("✅ Reddit client created ({:?})\n", config);

    println!("🔄 Requesting access token...");
    let token = match client.authenticate().await {
        Ok(token) => token,
        Err(e) => {
            println!("❌ Authentication failed: {}", e);
            return Ok(());
        }
    };
    println!("✅ Authentication successful!\n");

    let mut batches = Vec::new();
    for keyword in split_keywords(&keywords) {
        println!("🔍 Searching r/{} for '{}'...", subreddit, keyword);
        let images = client.search_images(&token, &subreddit, &keyword, 10).await;
        println!("   {} images", images.len());
        batches.push(images);
    }

    let results = merge_results(batches, 10);
    println!("\n📊 {} unique images found:", results.total_found);
    for (i, image) in results.images.iter().enumerate() {
        println!("   {}. [{}] {} ({})", i + 1, image.score, image.title, image.url);
        println!("      {}", image.permalink);
    }

    println!("\n🎉 Manual search completed!");
    Ok(())
}
