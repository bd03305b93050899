use std::sync::Arc;

use ai_client::TextModel;
use anyhow::Result;
use async_trait::async_trait;

use super::{Sentiment, Vocabulary};

/// Temperature for single-post classification. Low so repeated runs agree.
const CLASSIFY_TEMPERATURE: f32 = 0.2;

/// Per-item classification capability used by [`BatchClassifier`](super::BatchClassifier).
///
/// Returns the model's raw answer; normalization happens in the classifier.
#[async_trait]
pub trait SentimentModel: Send + Sync {
    async fn classify(&self, text: &str, context: &str) -> Result<String>;

    /// Category words the model was asked to answer with.
    fn vocabulary(&self) -> Vocabulary {
        Vocabulary::English
    }
}

/// Prompt-based sentiment over a hosted text model.
pub struct LlmSentiment {
    model: Arc<dyn TextModel>,
    vocabulary: Vocabulary,
}

impl LlmSentiment {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self {
            model,
            vocabulary: Vocabulary::default(),
        }
    }

    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub(crate) fn prompt(&self, text: &str, context: &str) -> String {
        let v = self.vocabulary;
        let (pos, neg, neu) = (
            v.token(Sentiment::Positive),
            v.token(Sentiment::Negative),
            v.token(Sentiment::Neutral),
        );
        match v {
            Vocabulary::English => format!(
                "CONTEXT: {context}\n\
                 Classify the sentiment of the following post as {pos}, {neg} or {neu}.\n\
                 Answer with exactly one word: {pos}, {neg} or {neu}.\n\
                 Post: \"{text}\"\nSentiment:"
            ),
            Vocabulary::Spanish => format!(
                "CONTEXTO: {context}\n\
                 Clasifica el sentimiento del siguiente tweet en {pos}, {neg} o {neu}.\n\
                 Responde únicamente con {pos}, {neg} o {neu}.\n\
                 Tweet: \"{text}\"\nSentimiento:"
            ),
        }
    }
}

#[async_trait]
impl SentimentModel for LlmSentiment {
    async fn classify(&self, text: &str, context: &str) -> Result<String> {
        let prompt = self.prompt(text, context);
        Ok(self.model.generate(&prompt, CLASSIFY_TEMPERATURE).await?)
    }

    fn vocabulary(&self) -> Vocabulary {
        self.vocabulary
    }
}
