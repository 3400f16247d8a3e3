//! Retrieval-augmented answering.
//!
//! Embeds the question, pulls the closest diary passages from the index,
//! stuffs them into the retrieval prompt and asks the language model.

use crate::embeddings::EmbeddingProvider;
use crate::rag::types::{RagResponse, RagSourceRef};
use crate::types::KnowledgeChunk;
use crate::vector_index::VectorIndex;
use lifecapsule_core::{AppError, AppResult};
use lifecapsule_llm::{LlmClient, LlmRequest};
use lifecapsule_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum snippet length for source references, in characters.
const MAX_SNIPPET_CHARS: usize = 150;

/// Template variable holding the user's question.
const QUESTION_VARIABLE: &str = "question";

/// Answers questions from retrieved diary passages.
pub struct RetrievalAnswerer {
    llm: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    top_k: usize,
}

impl RetrievalAnswerer {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
        top_k: usize,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            prompt,
            top_k: top_k.max(1),
        }
    }

    /// Answer a question against an index built with `embedder`.
    pub async fn answer(
        &self,
        question: &str,
        index: &dyn VectorIndex,
        embedder: &dyn EmbeddingProvider,
    ) -> AppResult<RagResponse> {
        tracing::info!(top_k = self.top_k, "Answering diary question");

        let query_embedding = embedder.embed(question).await?;
        let results = index.search(&query_embedding, self.top_k)?;

        tracing::debug!("Retrieved {} passages", results.len());

        let chunks: Vec<&KnowledgeChunk> = results.iter().map(|(chunk, _)| chunk).collect();
        let context = build_context(&chunks);

        let mut variables = HashMap::new();
        variables.insert(QUESTION_VARIABLE.to_string(), question.to_string());
        let built = build_prompt(&self.prompt, variables, Some(context))?;

        let request = LlmRequest::new(built.user, self.model.clone());

        let response = self
            .llm
            .complete(&request)
            .await
            .map_err(|e| AppError::Knowledge(format!("LLM request failed: {}", e)))?;

        let sources = results
            .iter()
            .map(|(chunk, score)| RagSourceRef {
                position: chunk.position,
                snippet: truncate_snippet(&chunk.text),
                score: *score,
            })
            .collect();

        Ok(RagResponse::new(response.content, sources))
    }
}

/// Join retrieved passages with blank lines, in retrieval order.
fn build_context(chunks: &[&KnowledgeChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn truncate_snippet(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(MAX_SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
