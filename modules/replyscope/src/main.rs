use std::sync::Arc;

use ai_client::Gemini;
use anyhow::{bail, Result};
use apify_client::ApifyClient;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use replyscope::{is_post_id, Analyzer, Config, ConversationFetcher, ConversationReport, Vocabulary};

/// Fetch the replies and quotes of an X/Twitter post and print a JSON report.
#[derive(Parser, Debug)]
#[command(name = "replyscope", version)]
struct Args {
    /// Numeric id of the post.
    #[arg(long)]
    post_id: String,

    /// What the post is about. Passed to the model as context.
    #[arg(long, default_value = "")]
    context: String,

    /// Run topic extraction and sentiment classification.
    #[arg(long)]
    analyze: bool,

    /// Per-side item cap for the scrapers. Overrides REPLYSCOPE_MAX_ITEMS.
    #[arg(long)]
    max_items: Option<u32>,

    /// Concurrent classification calls. Overrides REPLYSCOPE_CONCURRENCY.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Prompt and parse in Spanish.
    #[arg(long)]
    spanish: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the report.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if args.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!("replyscope starting...");

    let mut config = Config::from_env()?;
    if let Some(max_items) = args.max_items {
        config.max_items = max_items;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    config.log_redacted();

    if !is_post_id(&args.post_id) {
        bail!("post id must be numeric, got {:?}", args.post_id);
    }

    let apify = ApifyClient::new(&config.apify_token);
    let fetcher = ConversationFetcher::new(Arc::new(apify), &config.cache_settings())
        .max_items(config.max_items);

    let conversation = fetcher.fetch(&args.post_id).await;
    if conversation.is_empty() {
        warn!(post_id = args.post_id.as_str(), "No replies or quotes found");
    }
    let mut rows = conversation.all();

    let topics = match (args.analyze, config.gemini_api_key.as_deref()) {
        (true, Some(key)) if !rows.is_empty() => {
            let vocabulary = if args.spanish {
                Vocabulary::Spanish
            } else {
                Vocabulary::English
            };
            let model = Gemini::new(key, &config.gemini_model);
            info!(model = model.model(), rows = rows.len(), "Running analysis");
            Analyzer::new(Arc::new(model))
                .vocabulary(vocabulary)
                .concurrency(config.concurrency)
                .run(&mut rows, &args.context)
                .await
        }
        (true, None) => {
            warn!("GEMINI_API_KEY not set, skipping analysis");
            None
        }
        _ => None,
    };

    let report = ConversationReport::build(&args.post_id, &rows, topics);
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!(
        replies = report.reply_count,
        quotes = report.quote_count,
        "Done"
    );
    Ok(())
}
