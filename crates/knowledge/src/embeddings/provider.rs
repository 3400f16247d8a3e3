//! Embedding provider trait and factory.

use lifecapsule_core::config::EmbeddingSettings;
use lifecapsule_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

use super::providers::{ollama::OllamaProvider, trigram::TrigramProvider};

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "ollama", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions (0 until known)
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }
}

/// Create an embedding provider from settings.
///
/// `endpoint` and `timeout` are shared with the completion client.
pub fn create_provider(
    settings: &EmbeddingSettings,
    endpoint: &str,
    timeout: Option<Duration>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match settings.provider.as_str() {
        "ollama" => {
            let provider = OllamaProvider::new(
                endpoint,
                settings.model.clone(),
                settings.dimensions,
                timeout,
            )?;
            Ok(Arc::new(provider))
        }

        "trigram" => {
            let dimensions = settings
                .dimensions
                .unwrap_or(TrigramProvider::DEFAULT_DIMENSIONS);
            Ok(Arc::new(TrigramProvider::new(dimensions)))
        }

        other => Err(AppError::Knowledge(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, trigram",
            other
        ))),
    }
}
