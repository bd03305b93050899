//! Sentiment labels and the batch classifier that produces them.
//!
//! The hosted model answers with free text. [`Sentiment::from_response`]
//! folds that text into the closed [`Sentiment`] set; anything it does not
//! recognize is `Neutral`.

mod classifier;
mod model;

pub use classifier::{BatchClassifier, ClassifyOutcome, ClassifyProgress, DEFAULT_CONCURRENCY};
pub use model::{LlmSentiment, SentimentModel};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of characters of the normalized response that are inspected.
pub const RESPONSE_PREFIX_CHARS: usize = 8;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
        }
    }

    /// Normalize a raw model answer.
    ///
    /// Trims, upper-cases and keeps the first [`RESPONSE_PREFIX_CHARS`]
    /// characters. The prefix is then checked against the vocabulary's
    /// positive token, then its negative token; the first one the prefix
    /// starts with wins. Everything else is `Neutral`.
    ///
    /// | vocabulary | positive | negative | neutral |
    /// |---|---|---|---|
    /// | English | `POSITIVE` | `NEGATIVE` | `NEUTRAL` |
    /// | Spanish | `POSITIVO` | `NEGATIVO` | `NEUTRO` |
    pub fn from_response(raw: &str, vocabulary: Vocabulary) -> Self {
        let prefix: String = raw
            .trim()
            .to_uppercase()
            .chars()
            .take(RESPONSE_PREFIX_CHARS)
            .collect();

        [Sentiment::Positive, Sentiment::Negative]
            .into_iter()
            .find(|candidate| prefix.starts_with(vocabulary.token(*candidate)))
            .unwrap_or(Sentiment::Neutral)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language of the prompts and of the category words the model is asked to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Vocabulary {
    #[default]
    English,
    Spanish,
}

impl Vocabulary {
    /// The word the model is asked to answer with for `sentiment`.
    pub fn token(self, sentiment: Sentiment) -> &'static str {
        match (self, sentiment) {
            (Vocabulary::English, s) => s.as_str(),
            (Vocabulary::Spanish, Sentiment::Positive) => "POSITIVO",
            (Vocabulary::Spanish, Sentiment::Negative) => "NEGATIVO",
            (Vocabulary::Spanish, Sentiment::Neutral) => "NEUTRO",
        }
    }
}
