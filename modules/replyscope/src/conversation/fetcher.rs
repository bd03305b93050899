use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use apify_client::{ApifyClient, Tweet};
use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, info, warn};

use super::{clean_tweets, is_post_id, Conversation, ConversationTweet, TweetKind};

/// Per-side item cap passed to the scraping actors.
pub const DEFAULT_MAX_ITEMS: u32 = 3000;

// ---------------------------------------------------------------------------
// TweetSource
// ---------------------------------------------------------------------------

#[async_trait]
pub trait TweetSource: Send + Sync {
    /// Replies in the conversation rooted at `post_id`.
    async fn replies(&self, post_id: &str, max_items: u32) -> Result<Vec<Tweet>>;

    /// Posts quoting `post_id`.
    async fn quotes(&self, post_id: &str, max_items: u32) -> Result<Vec<Tweet>>;
}

#[async_trait]
impl TweetSource for ApifyClient {
    async fn replies(&self, post_id: &str, max_items: u32) -> Result<Vec<Tweet>> {
        Ok(self.scrape_replies(post_id, max_items).await?)
    }

    async fn quotes(&self, post_id: &str, max_items: u32) -> Result<Vec<Tweet>> {
        Ok(self.scrape_quotes(post_id, max_items).await?)
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Bounds for the fetch cache.
///
/// Entries are keyed by `(post_id, kind)` and expire `ttl` after insertion.
/// Once `max_entries` is reached the least recently used entries are evicted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub max_entries: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            max_entries: 64,
        }
    }
}

type CacheKey = (String, TweetKind);

// ---------------------------------------------------------------------------
// ConversationFetcher
// ---------------------------------------------------------------------------

/// Fetches and cleans the replies and quotes of a post.
///
/// Source failures never escape: the failing side comes back empty and is
/// not cached, so the next fetch tries again.
pub struct ConversationFetcher {
    source: Arc<dyn TweetSource>,
    cache: Cache<CacheKey, Arc<Vec<ConversationTweet>>>,
    max_items: u32,
}

impl ConversationFetcher {
    pub fn new(source: Arc<dyn TweetSource>, settings: &CacheSettings) -> Self {
        let cache = Cache::builder()
            .max_capacity(settings.max_entries)
            .time_to_live(settings.ttl)
            .build();
        Self {
            source,
            cache,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }

    pub fn max_items(mut self, max_items: u32) -> Self {
        self.max_items = max_items;
        self
    }

    pub async fn fetch(&self, post_id: &str) -> Conversation {
        if !is_post_id(post_id) {
            warn!(post_id, "Not a numeric post id, nothing to fetch");
            return Conversation::empty(post_id);
        }

        let (replies, quotes) = tokio::join!(
            self.fetch_kind(post_id, TweetKind::Reply),
            self.fetch_kind(post_id, TweetKind::Quote),
        );

        let conversation = Conversation {
            post_id: post_id.to_string(),
            replies: clean_tweets(replies, post_id),
            quotes: clean_tweets(quotes, post_id),
        };
        info!(
            post_id,
            replies = conversation.replies.len(),
            quotes = conversation.quotes.len(),
            "Conversation fetched"
        );
        conversation
    }

    async fn fetch_kind(&self, post_id: &str, kind: TweetKind) -> Vec<ConversationTweet> {
        let key = (post_id.to_string(), kind);
        if let Some(rows) = self.cache.get(&key).await {
            debug!(post_id, ?kind, rows = rows.len(), "Cache hit");
            return rows.as_ref().clone();
        }

        let result = match kind {
            TweetKind::Reply => self.source.replies(post_id, self.max_items).await,
            TweetKind::Quote => self.source.quotes(post_id, self.max_items).await,
        };

        match result {
            Ok(tweets) => {
                let rows: Vec<ConversationTweet> = tweets
                    .into_iter()
                    .map(|t| ConversationTweet::from_raw(t, kind))
                    .collect();
                self.cache.insert(key, Arc::new(rows.clone())).await;
                rows
            }
            Err(e) => {
                warn!(post_id, ?kind, error = %e, "Fetch failed, continuing without these posts");
                Vec::new()
            }
        }
    }
}
