pub mod analysis;
pub mod config;
pub mod conversation;
pub mod report;
pub mod sentiment;
pub mod topics;

pub use analysis::Analyzer;
pub use config::Config;
pub use conversation::{
    clean_tweets, is_post_id, CacheSettings, Conversation, ConversationFetcher, ConversationTweet,
    TweetKind, TweetSource,
};
pub use report::ConversationReport;
pub use sentiment::{
    BatchClassifier, ClassifyOutcome, ClassifyProgress, LlmSentiment, Sentiment, SentimentModel,
    Vocabulary,
};
pub use topics::{extract_topics, TopicSummary};
