use async_trait::async_trait;

use crate::error::Result;

// =============================================================================
// TextModel Trait
// =============================================================================

/// A hosted model that turns a single prompt into text.
///
/// Shared read-only across tasks, so implementations must be `Send + Sync`.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String>;
}
