//! Building and swapping the diary knowledge base.

use crate::chunker::Segmenter;
use crate::embeddings::EmbeddingProvider;
use crate::rag::{RagResponse, RetrievalAnswerer};
use crate::types::{KnowledgeChunk, KnowledgeStats};
use crate::vector_index::{InMemoryIndex, VectorIndex};
use chrono::Utc;
use lifecapsule_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// A searchable snapshot of the diary bound to the answering chain.
pub struct KnowledgeBase {
    index: InMemoryIndex,
    embedder: Arc<dyn EmbeddingProvider>,
    answerer: Arc<RetrievalAnswerer>,
    stats: KnowledgeStats,
}

impl KnowledgeBase {
    /// Answer a question from the diary passages in this snapshot.
    pub async fn answer(&self, question: &str) -> AppResult<RagResponse> {
        self.answerer
            .answer(question, &self.index, self.embedder.as_ref())
            .await
    }

    pub fn stats(&self) -> &KnowledgeStats {
        &self.stats
    }

    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    pub fn chunks(&self) -> &[KnowledgeChunk] {
        self.index.chunks()
    }
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("chunks", &self.index.len())
            .field("embedder", &self.embedder)
            .finish()
    }
}

/// Turns diary text into a fresh knowledge base.
pub struct KnowledgeBuilder {
    segmenter: Segmenter,
    embedder: Arc<dyn EmbeddingProvider>,
    answerer: Arc<RetrievalAnswerer>,
}

impl KnowledgeBuilder {
    pub fn new(
        segmenter: Segmenter,
        embedder: Arc<dyn EmbeddingProvider>,
        answerer: RetrievalAnswerer,
    ) -> Self {
        Self {
            segmenter,
            embedder,
            answerer: Arc::new(answerer),
        }
    }

    /// Split, embed and index the whole diary.
    ///
    /// Returns `None` when the diary has no content.
    pub async fn rebuild(&self, diary_text: &str) -> AppResult<Option<KnowledgeBase>> {
        let start = Instant::now();
        let candidates = self.segmenter.split(diary_text);

        if candidates.is_empty() {
            tracing::info!("Diary is empty, knowledge base cleared");
            return Ok(None);
        }

        tracing::info!(
            chunks = candidates.len(),
            provider = self.embedder.provider_name(),
            model = self.embedder.model_name(),
            "Rebuilding knowledge base"
        );

        let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != candidates.len() {
            return Err(AppError::Knowledge(format!(
                "Embedding provider returned {} vectors for {} chunks",
                embeddings.len(),
                candidates.len()
            )));
        }

        let mut index = InMemoryIndex::new();
        for (candidate, embedding) in candidates.into_iter().zip(embeddings) {
            let metadata = serde_json::json!({
                "start": candidate.start,
                "end": candidate.end(),
            });
            index.upsert_chunk(KnowledgeChunk {
                id: uuid::Uuid::new_v4().to_string(),
                position: candidate.position,
                text: candidate.text,
                embedding: Some(embedding),
                metadata,
            })?;
        }

        let stats = KnowledgeStats {
            chunks_count: index.len(),
            bytes_indexed: diary_text.len(),
            embedding_dim: index.dimensions().unwrap_or(0),
            embedding_model: format!(
                "{}/{}",
                self.embedder.provider_name(),
                self.embedder.model_name()
            ),
            built_at: Utc::now(),
            duration_secs: start.elapsed().as_secs_f64(),
        };

        tracing::info!(
            "Knowledge base ready: {} chunks, {} dimensions ({:.2}s)",
            stats.chunks_count,
            stats.embedding_dim,
            stats.duration_secs
        );

        Ok(Some(KnowledgeBase {
            index,
            embedder: Arc::clone(&self.embedder),
            answerer: Arc::clone(&self.answerer),
            stats,
        }))
    }
}

/// Shared slot holding the current knowledge base.
///
/// Readers clone an `Arc` snapshot and release the lock immediately, so a
/// long-running question never blocks a rebuild from being swapped in.
#[derive(Clone, Default)]
pub struct KnowledgeBaseHandle {
    inner: Arc<RwLock<Option<Arc<KnowledgeBase>>>>,
}

impl KnowledgeBaseHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current knowledge base, if any.
    pub async fn current(&self) -> Option<Arc<KnowledgeBase>> {
        self.inner.read().await.clone()
    }

    /// Swap in a new knowledge base (or clear it), returning the previous one.
    pub async fn replace(&self, kb: Option<KnowledgeBase>) -> Option<Arc<KnowledgeBase>> {
        let mut slot = self.inner.write().await;
        std::mem::replace(&mut *slot, kb.map(Arc::new))
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_none()
    }

    pub async fn stats(&self) -> Option<KnowledgeStats> {
        self.inner.read().await.as_ref().map(|kb| kb.stats().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::trigram::TrigramProvider;
    use async_trait::async_trait;
    use lifecapsule_llm::{LlmClient, LlmRequest, LlmResponse};
    use lifecapsule_prompt::{defaults::builtin_source, parse_prompt, RETRIEVAL_PROMPT_ID};

    struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        fn provider_name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            Ok(LlmResponse::text(request.prompt.clone(), request.model.clone()))
        }
    }

    #[derive(Debug)]
    struct BrokenEmbedder;

    #[async_trait]
    impl EmbeddingProvider for BrokenEmbedder {
        fn provider_name(&self) -> &str {
            "broken"
        }

        fn model_name(&self) -> &str {
            "none"
        }

        fn dimensions(&self) -> usize {
            0
        }

        async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            Err(AppError::Llm("embedding server unavailable".to_string()))
        }
    }

    fn builder_with(
        embedder: Arc<dyn EmbeddingProvider>,
        size: usize,
        overlap: usize,
    ) -> KnowledgeBuilder {
        let prompt = parse_prompt(builtin_source(RETRIEVAL_PROMPT_ID).unwrap()).unwrap();
        let answerer = RetrievalAnswerer::new(Arc::new(EchoLlm), "llama3.2", prompt, 4);
        KnowledgeBuilder::new(Segmenter::new(size, overlap).unwrap(), embedder, answerer)
    }

    fn builder() -> KnowledgeBuilder {
        builder_with(Arc::new(TrigramProvider::new(128)), 1000, 200)
    }

    #[tokio::test]
    async fn test_empty_diary_builds_nothing() {
        let builder = builder();
        assert!(builder.rebuild("").await.unwrap().is_none());
        assert!(builder.rebuild("\n\n   \n").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rebuild_indexes_every_chunk() {
        let builder = builder_with(Arc::new(TrigramProvider::new(64)), 120, 20);
        let diary: String = (1..=10)
            .map(|d| {
                format!(
                    "June {:02}, 2024:\nSpent the afternoon painting the fence, day {}.\n\n",
                    d, d
                )
            })
            .collect();

        let kb = builder.rebuild(&diary).await.unwrap().unwrap();
        assert!(kb.chunk_count() > 1);
        assert_eq!(kb.stats().chunks_count, kb.chunk_count());
        assert_eq!(kb.stats().embedding_dim, 64);
        assert_eq!(kb.stats().bytes_indexed, diary.len());
        assert_eq!(kb.stats().embedding_model, "trigram/trigram-v1");

        for (i, chunk) in kb.chunks().iter().enumerate() {
            assert_eq!(chunk.position as usize, i);
            assert!(chunk.metadata["start"].is_u64());
        }
    }

    #[tokio::test]
    async fn test_rebuild_is_deterministic_in_content() {
        let builder = builder();
        let diary =
            "June 01, 2024:\nQuiet day at home.\n\nJune 02, 2024:\nLong run by the lake.\n\n";

        let a = builder.rebuild(diary).await.unwrap().unwrap();
        let b = builder.rebuild(diary).await.unwrap().unwrap();

        let texts = |kb: &KnowledgeBase| {
            kb.chunks().iter().map(|c| c.text.clone()).collect::<Vec<_>>()
        };
        assert_eq!(texts(&a), texts(&b));
    }

    #[tokio::test]
    async fn test_answer_sees_indexed_text() {
        let builder = builder();
        let kb = builder
            .rebuild("June 05, 2024:\nAdopted a grey kitten named Pebble.\n\n")
            .await
            .unwrap()
            .unwrap();

        let response = kb.answer("What is my kitten called?").await.unwrap();
        assert!(response.answer.contains("Pebble"));
        assert_eq!(response.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let builder = builder_with(Arc::new(BrokenEmbedder), 1000, 200);
        let result = builder.rebuild("June 01, 2024:\nSomething happened.\n\n").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_handle_replace_and_snapshot() {
        let handle = KnowledgeBaseHandle::new();
        assert!(handle.is_empty().await);
        assert!(handle.stats().await.is_none());

        let builder = builder();
        let kb = builder
            .rebuild("June 01, 2024:\nFirst entry.\n\n")
            .await
            .unwrap();
        assert!(handle.replace(kb).await.is_none());

        let snapshot = handle.current().await.unwrap();
        assert_eq!(handle.stats().await.unwrap().chunks_count, 1);

        // Old snapshot stays usable after the slot is cleared
        let previous = handle.replace(None).await;
        assert!(previous.is_some());
        assert!(handle.is_empty().await);
        assert_eq!(snapshot.chunk_count(), 1);
    }
}
