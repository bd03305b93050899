use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::{Sentiment, SentimentModel, Vocabulary};

/// In-flight classification requests allowed at once. Kept small for
/// provider rate limits.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Result of one classification unit before it is folded into a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyOutcome {
    Labeled(Sentiment),
    Failed(String),
}

impl ClassifyOutcome {
    /// Failures degrade to `Neutral`.
    pub fn into_sentiment(self) -> Sentiment {
        match self {
            ClassifyOutcome::Labeled(sentiment) => sentiment,
            ClassifyOutcome::Failed(_) => Sentiment::Neutral,
        }
    }
}

/// Completed units over eligible units, reported after every completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyProgress {
    pub completed: usize,
    pub total: usize,
}

type ProgressFn = Arc<dyn Fn(ClassifyProgress) + Send + Sync>;

/// Classifies a batch of texts with bounded parallelism.
///
/// The result always has one label per input, in input order. Blank or
/// missing texts are `Neutral` and never reach the model. A failed or
/// panicked unit is `Neutral` and does not affect its siblings. There
/// are no retries.
pub struct BatchClassifier {
    model: Arc<dyn SentimentModel>,
    concurrency: usize,
    progress: Option<ProgressFn>,
}

impl BatchClassifier {
    pub fn new(model: Arc<dyn SentimentModel>) -> Self {
        Self {
            model,
            concurrency: DEFAULT_CONCURRENCY,
            progress: None,
        }
    }

    /// Maximum simultaneous model calls. Clamped to at least 1.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn on_progress(mut self, f: impl Fn(ClassifyProgress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(f));
        self
    }

    pub async fn classify_batch<S: AsRef<str>>(
        &self,
        texts: &[Option<S>],
        context: &str,
    ) -> Vec<Sentiment> {
        let mut labels = vec![Sentiment::Neutral; texts.len()];

        let eligible: Vec<(usize, String)> = texts
            .iter()
            .enumerate()
            .filter_map(|(index, text)| {
                let text: &str = text.as_ref()?.as_ref();
                (!text.trim().is_empty()).then(|| (index, text.to_string()))
            })
            .collect();

        let total = eligible.len();
        if total == 0 {
            return labels;
        }
        debug!(
            total,
            skipped = texts.len() - total,
            concurrency = self.concurrency,
            "Classifying batch"
        );

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let context: Arc<str> = Arc::from(context);
        let vocabulary = self.model.vocabulary();

        let mut units = JoinSet::new();
        for (index, text) in eligible {
            let model = Arc::clone(&self.model);
            let permits = Arc::clone(&permits);
            let context = Arc::clone(&context);
            units.spawn(async move {
                let outcome = match permits.acquire().await {
                    Ok(_permit) => classify_one(model.as_ref(), &text, &context, vocabulary).await,
                    Err(closed) => ClassifyOutcome::Failed(closed.to_string()),
                };
                (index, outcome)
            });
        }

        let mut completed = 0;
        while let Some(joined) = units.join_next().await {
            completed += 1;
            match joined {
                Ok((index, outcome)) => {
                    if let ClassifyOutcome::Failed(ref reason) = outcome {
                        warn!(index, error = %reason, "Sentiment classification failed, defaulting to NEUTRAL");
                    }
                    labels[index] = outcome.into_sentiment();
                }
                Err(e) => {
                    warn!(error = %e, "Classification task aborted, slot stays NEUTRAL");
                }
            }
            if let Some(progress) = &self.progress {
                progress(ClassifyProgress { completed, total });
            }
        }

        labels
    }
}

async fn classify_one(
    model: &dyn SentimentModel,
    text: &str,
    context: &str,
    vocabulary: Vocabulary,
) -> ClassifyOutcome {
    match model.classify(text, context).await {
        Ok(raw) => ClassifyOutcome::Labeled(Sentiment::from_response(&raw, vocabulary)),
        Err(e) => ClassifyOutcome::Failed(e.to_string()),
    }
}
