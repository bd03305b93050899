//! Summary metrics over a fetched (and optionally classified) conversation.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::conversation::{ConversationTweet, TweetKind};
use crate::sentiment::Sentiment;
use crate::topics::TopicSummary;

const TOP_N: usize = 10;

/// Span (in days) up to which the timeline is bucketed by hour.
const HOURLY_MAX_DAYS: i64 = 3;
/// Span (in days) up to which the timeline is bucketed by day.
const DAILY_MAX_DAYS: i64 = 150;

#[derive(Debug, Clone, Serialize)]
pub struct ConversationReport {
    pub post_id: String,
    pub reply_count: usize,
    pub quote_count: usize,
    pub total_views: u64,
    pub total_interactions: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<TopicSummary>,
    pub top_viewed: Vec<ConversationTweet>,
    pub top_authors: Vec<AuthorReach>,
    pub sentiment: Vec<SentimentShare>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Timeline>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorReach {
    pub user_name: String,
    pub followers: u64,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentShare {
    pub sentiment: Sentiment,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    Hour,
    Day,
    Month,
}

impl TimeBucket {
    fn for_span_days(days: i64) -> Self {
        if days <= HOURLY_MAX_DAYS {
            TimeBucket::Hour
        } else if days <= DAILY_MAX_DAYS {
            TimeBucket::Day
        } else {
            TimeBucket::Month
        }
    }

    fn format(self) -> &'static str {
        match self {
            TimeBucket::Hour => "%Y-%m-%d %H:00",
            TimeBucket::Day => "%Y-%m-%d",
            TimeBucket::Month => "%Y-%m",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub bucket: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub granularity: TimeBucket,
    pub points: Vec<TimelinePoint>,
}

impl ConversationReport {
    pub fn build(post_id: &str, rows: &[ConversationTweet], topics: Option<TopicSummary>) -> Self {
        Self {
            post_id: post_id.to_string(),
            reply_count: rows.iter().filter(|r| r.kind == TweetKind::Reply).count(),
            quote_count: rows.iter().filter(|r| r.kind == TweetKind::Quote).count(),
            total_views: rows.iter().map(|r| r.view_count).fold(0, u64::saturating_add),
            total_interactions: rows
                .iter()
                .map(ConversationTweet::interactions)
                .fold(0, u64::saturating_add),
            topics,
            top_viewed: top_viewed(rows, TOP_N),
            top_authors: top_authors(rows, TOP_N),
            sentiment: sentiment_distribution(rows),
            timeline: timeline(rows),
        }
    }
}

/// Most viewed rows first. Ties keep input order.
pub fn top_viewed(rows: &[ConversationTweet], n: usize) -> Vec<ConversationTweet> {
    let mut sorted: Vec<&ConversationTweet> = rows.iter().collect();
    sorted.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    sorted.into_iter().take(n).cloned().collect()
}

/// Authors by their highest follower count across rows. Ties sort by name.
pub fn top_authors(rows: &[ConversationTweet], n: usize) -> Vec<AuthorReach> {
    let mut by_name: BTreeMap<&str, AuthorReach> = BTreeMap::new();
    for row in rows {
        let Some(name) = row.author_user_name.as_deref() else {
            continue;
        };
        let entry = by_name.entry(name).or_insert_with(|| AuthorReach {
            user_name: name.to_string(),
            followers: 0,
            profile_picture: None,
        });
        entry.followers = entry.followers.max(row.author_followers);
        if entry.profile_picture.is_none() {
            entry.profile_picture = row.author_profile_picture.clone();
        }
    }

    let mut authors: Vec<AuthorReach> = by_name.into_values().collect();
    authors.sort_by(|a, b| b.followers.cmp(&a.followers));
    authors.truncate(n);
    authors
}

/// Label counts over classified rows, largest first. Empty when nothing was classified.
pub fn sentiment_distribution(rows: &[ConversationTweet]) -> Vec<SentimentShare> {
    let mut counts: HashMap<Sentiment, usize> = HashMap::new();
    for sentiment in rows.iter().filter_map(|r| r.sentiment) {
        *counts.entry(sentiment).or_default() += 1;
    }

    let total: usize = counts.values().sum();
    let mut shares: Vec<SentimentShare> = counts
        .into_iter()
        .map(|(sentiment, count)| SentimentShare {
            sentiment,
            count,
            percentage: round2(count as f64 / total as f64 * 100.0),
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count).then(a.sentiment.cmp(&b.sentiment)));
    shares
}

/// Post counts over time, bucketed by a granularity chosen from the date span.
pub fn timeline(rows: &[ConversationTweet]) -> Option<Timeline> {
    let dates: Vec<DateTime<Utc>> = rows.iter().filter_map(|r| r.created_at).collect();
    let first = dates.iter().min()?;
    let last = dates.iter().max()?;

    let span_days = (last.date_naive() - first.date_naive()).num_days();
    let granularity = TimeBucket::for_span_days(span_days);

    let mut buckets: BTreeMap<String, usize> = BTreeMap::new();
    for date in &dates {
        *buckets
            .entry(date.format(granularity.format()).to_string())
            .or_default() += 1;
    }

    Some(Timeline {
        granularity,
        points: buckets
            .into_iter()
            .map(|(bucket, count)| TimelinePoint { bucket, count })
            .collect(),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
