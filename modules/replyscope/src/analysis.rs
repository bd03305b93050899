//! AI pass over a conversation: topic summary, then per-post sentiment.

use std::sync::Arc;

use ai_client::TextModel;
use tracing::{info, warn};

use crate::conversation::ConversationTweet;
use crate::sentiment::{BatchClassifier, LlmSentiment, Vocabulary, DEFAULT_CONCURRENCY};
use crate::topics::{extract_topics, TopicSummary};

const NUM_TOPICS: usize = 5;

pub struct Analyzer {
    model: Arc<dyn TextModel>,
    vocabulary: Vocabulary,
    concurrency: usize,
}

impl Analyzer {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self {
            model,
            vocabulary: Vocabulary::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Summarize topics across all rows, then label every row's sentiment.
    ///
    /// A failed topic summary is logged and returned as `None`; it does not
    /// stop classification.
    pub async fn run(&self, rows: &mut [ConversationTweet], context: &str) -> Option<TopicSummary> {
        let texts: Vec<Option<&str>> = rows.iter().map(|r| r.text.as_deref()).collect();

        let hint = match self.vocabulary {
            Vocabulary::English => "mixed",
            Vocabulary::Spanish => "mixto",
        };
        let present: Vec<&str> = texts.iter().flatten().copied().collect();
        let topics = match extract_topics(
            self.model.as_ref(),
            &present,
            hint,
            context,
            NUM_TOPICS,
            self.vocabulary,
        )
        .await
        {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(error = %e, "Topic extraction failed");
                None
            }
        };

        let sentiment = LlmSentiment::new(Arc::clone(&self.model)).with_vocabulary(self.vocabulary);
        let classifier = BatchClassifier::new(Arc::new(sentiment))
            .concurrency(self.concurrency)
            .on_progress(|p| info!(completed = p.completed, total = p.total, "Classification progress"));

        let labels = classifier.classify_batch(&texts, context).await;
        for (row, label) in rows.iter_mut().zip(labels) {
            row.sentiment = Some(label);
        }
        info!(rows = rows.len(), "Sentiment classification complete");

        topics
    }
}
