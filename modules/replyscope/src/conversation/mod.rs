//! Replies and quotes of a single post, flattened into rows.

mod fetcher;

pub use fetcher::{CacheSettings, ConversationFetcher, TweetSource, DEFAULT_MAX_ITEMS};

use std::collections::HashSet;

use apify_client::Tweet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sentiment::Sentiment;

/// Format of `createdAt` in the X/Twitter legacy API: `Tue Oct 14 12:00:00 +0000 2025`.
const LEGACY_CREATED_AT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TweetKind {
    Reply,
    Quote,
}

/// One reply or quote with author fields pulled up and counts coerced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationTweet {
    pub id: Option<String>,
    pub text: Option<String>,
    pub url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub author_user_name: Option<String>,
    pub author_followers: u64,
    pub author_profile_picture: Option<String>,
    pub view_count: u64,
    pub like_count: u64,
    pub reply_count: u64,
    pub retweet_count: u64,
    pub quote_count: u64,
    pub bookmark_count: u64,
    pub kind: TweetKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

impl ConversationTweet {
    pub fn from_raw(tweet: Tweet, kind: TweetKind) -> Self {
        let author = tweet.author.unwrap_or_default();
        Self {
            id: tweet.id,
            text: tweet.text,
            url: tweet.url,
            created_at: tweet.created_at.as_deref().and_then(parse_created_at),
            author_user_name: author.user_name,
            author_followers: author.followers.unwrap_or(0),
            author_profile_picture: author.profile_picture,
            view_count: tweet.view_count.unwrap_or(0),
            like_count: tweet.like_count.unwrap_or(0),
            reply_count: tweet.reply_count.unwrap_or(0),
            retweet_count: tweet.retweet_count.unwrap_or(0),
            quote_count: tweet.quote_count.unwrap_or(0),
            bookmark_count: tweet.bookmark_count.unwrap_or(0),
            kind,
            sentiment: None,
        }
    }

    /// Likes, replies, retweets, quotes and bookmarks combined. Saturates at `u64::MAX`.
    pub fn interactions(&self) -> u64 {
        [
            self.like_count,
            self.reply_count,
            self.retweet_count,
            self.quote_count,
            self.bookmark_count,
        ]
        .into_iter()
        .fold(0, u64::saturating_add)
    }
}

/// Parse RFC 3339 or the legacy X/Twitter timestamp format.
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, LEGACY_CREATED_AT))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// A post id is a non-empty run of ASCII digits.
pub fn is_post_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Drop the original post if the scraper returned it, then deduplicate by URL.
///
/// The first row for each URL wins. Rows without a URL share one key, so at
/// most one of them survives.
pub fn clean_tweets(rows: Vec<ConversationTweet>, post_id: &str) -> Vec<ConversationTweet> {
    let mut seen: HashSet<Option<String>> = HashSet::new();
    rows.into_iter()
        .filter(|row| row.id.as_deref() != Some(post_id))
        .filter(|row| seen.insert(row.url.clone()))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    pub post_id: String,
    pub replies: Vec<ConversationTweet>,
    pub quotes: Vec<ConversationTweet>,
}

impl Conversation {
    pub fn empty(post_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            ..Default::default()
        }
    }

    /// Replies followed by quotes.
    pub fn all(&self) -> Vec<ConversationTweet> {
        self.replies.iter().chain(&self.quotes).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty() && self.quotes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apify_client::TweetAuthor;
    use chrono::TimeZone;

    fn row(id: &str, url: Option<&str>) -> ConversationTweet {
        ConversationTweet::from_raw(
            Tweet {
                id: Some(id.to_string()),
                url: url.map(str::to_string),
                ..Default::default()
            },
            TweetKind::Reply,
        )
    }

    #[test]
    fn from_raw_flattens_author_and_defaults_counts() {
        let tweet = Tweet {
            id: Some("2".into()),
            text: Some("hello".into()),
            created_at: Some("Tue Oct 14 12:30:00 +0000 2025".into()),
            author: Some(TweetAuthor {
                user_name: Some("ana".into()),
                followers: Some(900),
                profile_picture: Some("https://img/ana.jpg".into()),
            }),
            view_count: Some(40),
            like_count: Some(3),
            ..Default::default()
        };

        let row = ConversationTweet::from_raw(tweet, TweetKind::Quote);

        assert_eq!(row.author_user_name.as_deref(), Some("ana"));
        assert_eq!(row.author_followers, 900);
        assert_eq!(row.view_count, 40);
        assert_eq!(row.reply_count, 0);
        assert_eq!(row.kind, TweetKind::Quote);
        assert_eq!(
            row.created_at,
            Some(Utc.with_ymd_and_hms(2025, 10, 14, 12, 30, 0).unwrap())
        );
    }

    #[test]
    fn missing_author_gives_empty_author_fields() {
        let row = ConversationTweet::from_raw(Tweet::default(), TweetKind::Reply);
        assert_eq!(row.author_user_name, None);
        assert_eq!(row.author_followers, 0);
        assert_eq!(row.author_profile_picture, None);
    }

    #[test]
    fn interactions_sum_engagement_counts() {
        let mut row = row("1", None);
        row.view_count = 1000;
        row.like_count = 1;
        row.reply_count = 2;
        row.retweet_count = 3;
        row.quote_count = 4;
        row.bookmark_count = 5;
        assert_eq!(row.interactions(), 15);
    }

    #[test]
    fn interactions_saturate_on_huge_counts() {
        let tweet: Tweet = serde_json::from_value(serde_json::json!({
            "likeCount": "1e30",
            "replyCount": 1
        }))
        .unwrap();
        let row = ConversationTweet::from_raw(tweet, TweetKind::Reply);

        assert_eq!(row.like_count, u64::MAX);
        assert_eq!(row.interactions(), u64::MAX);
    }

    #[test]
    fn created_at_accepts_rfc3339_and_rejects_garbage() {
        assert_eq!(
            parse_created_at("2025-10-14T08:00:00.000Z"),
            Some(Utc.with_ymd_and_hms(2025, 10, 14, 8, 0, 0).unwrap())
        );
        assert_eq!(
            parse_created_at("2025-10-14T10:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2025, 10, 14, 8, 0, 0).unwrap())
        );
        assert_eq!(parse_created_at("yesterday"), None);
        assert_eq!(parse_created_at(""), None);
    }

    #[test]
    fn post_id_must_be_digits() {
        assert!(is_post_id("1790000000000000001"));
        assert!(!is_post_id(""));
        assert!(!is_post_id("https://x.com/a/status/1"));
        assert!(!is_post_id("12a"));
    }

    #[test]
    fn clean_drops_original_and_duplicate_urls() {
        let rows = vec![
            row("100", Some("https://x.com/op/status/100")),
            row("101", Some("https://x.com/a/status/101")),
            row("102", Some("https://x.com/b/status/102")),
            row("101", Some("https://x.com/a/status/101")),
            row("103", None),
            row("104", None),
        ];

        let cleaned = clean_tweets(rows, "100");
        let ids: Vec<_> = cleaned.iter().filter_map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, vec!["101", "102", "103"]);
    }

    #[test]
    fn all_lists_replies_before_quotes() {
        let mut quote = row("9", Some("q"));
        quote.kind = TweetKind::Quote;
        let conversation = Conversation {
            post_id: "1".into(),
            replies: vec![row("5", Some("r"))],
            quotes: vec![quote],
        };
        let kinds: Vec<_> = conversation.all().iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![TweetKind::Reply, TweetKind::Quote]);
        assert!(!conversation.is_empty());
        assert!(Conversation::empty("1").is_empty());
    }
}
