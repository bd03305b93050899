//! Topic summarization over a set of posts.

use ai_client::{truncate_to_char_boundary, TextModel};
use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::sentiment::Vocabulary;

/// Only the first posts are sent; the rest add cost without changing the summary much.
pub const MAX_TOPIC_TEXTS: usize = 500;

/// Upper bound on the joined post text sent in one prompt.
pub const MAX_TOPIC_PROMPT_BYTES: usize = 200_000;

const TOPIC_TEMPERATURE: f32 = 0.4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "summary", rename_all = "snake_case")]
pub enum TopicSummary {
    Topics(String),
    NotEnoughData,
}

/// Ask the model for the main topics in `texts`.
///
/// `sentiment_hint` labels the set in the prompt ("mixed", "NEGATIVE", ...).
/// Blank texts are dropped; if none remain the model is not called.
pub async fn extract_topics<S: AsRef<str>>(
    model: &dyn TextModel,
    texts: &[S],
    sentiment_hint: &str,
    context: &str,
    num_topics: usize,
    vocabulary: Vocabulary,
) -> Result<TopicSummary> {
    let kept: Vec<&str> = texts
        .iter()
        .filter_map(|t| {
            let t: &str = t.as_ref();
            (!t.trim().is_empty()).then_some(t)
        })
        .take(MAX_TOPIC_TEXTS)
        .collect();

    if kept.is_empty() {
        return Ok(TopicSummary::NotEnoughData);
    }

    let joined = kept.join("\n");
    let joined = truncate_to_char_boundary(&joined, MAX_TOPIC_PROMPT_BYTES);
    debug!(texts = kept.len(), bytes = joined.len(), "Extracting topics");

    let prompt = match vocabulary {
        Vocabulary::English => format!(
            "CONTEXT: {context}\n\
             Here are posts classified as {sentiment_hint}. Extract the {num_topics} main topics.\n\
             Posts:\n{joined}"
        ),
        Vocabulary::Spanish => format!(
            "CONTEXTO: {context}\n\
             Aquí hay tweets clasificados como {sentiment_hint}. Extrae {num_topics} temas principales.\n\
             Tweets:\n{joined}"
        ),
    };

    let text = model.generate(&prompt, TOPIC_TEMPERATURE).await?;
    Ok(TopicSummary::Topics(text.trim().to_string()))
}
