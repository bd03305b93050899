use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Input for the kaitoeasyapi/twitter-reply actor.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyScraperInput {
    pub conversation_ids: Vec<String>,
    #[serde(rename = "maxItems")]
    pub max_items: u32,
}

/// Input for the kaitoeasyapi tweet scraper in quote-search mode.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteScraperInput {
    #[serde(rename = "filter:quote")]
    pub filter_quote: bool,
    pub quoted_tweet_id: String,
    #[serde(rename = "maxItems")]
    pub max_items: u32,
}

/// Author info nested inside a Tweet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetAuthor {
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub followers: Option<u64>,
    #[serde(rename = "profilePicture")]
    pub profile_picture: Option<String>,
}

/// A single tweet from the Apify dataset.
///
/// Count fields arrive as numbers, numeric strings or garbage depending on
/// the actor version. Anything that isn't a non-negative number decodes as `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tweet {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    pub text: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    pub author: Option<TweetAuthor>,
    #[serde(rename = "viewCount", default, deserialize_with = "lenient_count")]
    pub view_count: Option<u64>,
    #[serde(rename = "likeCount", default, deserialize_with = "lenient_count")]
    pub like_count: Option<u64>,
    #[serde(rename = "replyCount", default, deserialize_with = "lenient_count")]
    pub reply_count: Option<u64>,
    #[serde(rename = "retweetCount", default, deserialize_with = "lenient_count")]
    pub retweet_count: Option<u64>,
    #[serde(rename = "quoteCount", default, deserialize_with = "lenient_count")]
    pub quote_count: Option<u64>,
    #[serde(rename = "bookmarkCount", default, deserialize_with = "lenient_count")]
    pub bookmark_count: Option<u64>,
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_from_value))
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn count_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| non_negative(n.as_f64()?)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| non_negative(s.parse::<f64>().ok()?))
        }
        _ => None,
    }
}

fn non_negative(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0).then_some(f as u64)
}
