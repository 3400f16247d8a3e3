//! The diary service: one owned state object behind every front end.

use crate::analyzer::DiaryAnalyzer;
use crate::forwarder::PromptForwarder;
use crate::sentiment::{LexiconScorer, SentimentScorer};
use crate::store::{entries, DiaryEntry, DiaryStore};
use lifecapsule_core::{AppConfig, AppError, AppResult};
use lifecapsule_knowledge::{
    create_provider, KnowledgeBaseHandle, KnowledgeBuilder, KnowledgeStats, RetrievalAnswerer,
    Segmenter,
};
use lifecapsule_prompt::{load_prompt, QUERY_PROMPT_ID, RETRIEVAL_PROMPT_ID};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Result of saving an entry.
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub entry: DiaryEntry,
    /// Whether the knowledge base was rebuilt to include the entry
    pub indexed: bool,
}

/// Snapshot of the diary and its knowledge base.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryStats {
    pub diary_path: PathBuf,
    pub diary_bytes: usize,
    pub entries: usize,
    pub knowledge_base: Option<KnowledgeStats>,
}

/// Owns the diary store and everything derived from it.
///
/// Saves are serialized; questions run against a snapshot of the knowledge
/// base taken when they start.
pub struct DiaryService {
    store: DiaryStore,
    knowledge: KnowledgeBaseHandle,
    builder: KnowledgeBuilder,
    analyzer: DiaryAnalyzer,
    forwarder: PromptForwarder,
    write_lock: Mutex<()>,
}

impl DiaryService {
    pub fn new(
        store: DiaryStore,
        builder: KnowledgeBuilder,
        scorer: Arc<dyn SentimentScorer>,
        forwarder: PromptForwarder,
    ) -> Self {
        let knowledge = KnowledgeBaseHandle::new();
        let analyzer = DiaryAnalyzer::new(store.clone(), knowledge.clone(), scorer);

        Self {
            store,
            knowledge,
            builder,
            analyzer,
            forwarder,
            write_lock: Mutex::new(()),
        }
    }

    /// Wire up the service from configuration. The knowledge base starts
    /// empty; call [`rebuild_knowledge_base`](Self::rebuild_knowledge_base)
    /// to index an existing diary.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let llm = lifecapsule_llm::client_from_config(config)?;
        let timeout = config.timeout_secs.map(Duration::from_secs);
        let embedder = create_provider(&config.embeddings, config.llm_endpoint(), timeout)?;
        let segmenter = Segmenter::new(
            config.knowledge.chunk_size,
            config.knowledge.chunk_overlap,
        )?;

        let retrieval_prompt = load_prompt(&config.prompts_dir(), RETRIEVAL_PROMPT_ID)?;
        let answerer = RetrievalAnswerer::new(
            Arc::clone(&llm),
            config.model.clone(),
            retrieval_prompt,
            config.knowledge.top_k,
        );

        let forwarder = PromptForwarder::from_config(config, llm, QUERY_PROMPT_ID)?;
        let builder = KnowledgeBuilder::new(segmenter, embedder, answerer);

        tracing::debug!(
            diary = ?config.diary_file(),
            model = %config.model,
            embeddings = %config.embeddings.provider,
            "Diary service configured"
        );

        Ok(Self::new(
            DiaryStore::new(config.diary_file()),
            builder,
            Arc::new(LexiconScorer::new()),
            forwarder,
        ))
    }

    pub fn store(&self) -> &DiaryStore {
        &self.store
    }

    pub fn knowledge(&self) -> &KnowledgeBaseHandle {
        &self.knowledge
    }

    /// Re-index the whole diary and swap the result in.
    pub async fn rebuild_knowledge_base(&self) -> AppResult<Option<KnowledgeStats>> {
        let _guard = self.write_lock.lock().await;
        self.rebuild_locked().await
    }

    async fn rebuild_locked(&self) -> AppResult<Option<KnowledgeStats>> {
        let text = self.store.load().await;
        let kb = self.builder.rebuild(&text).await?;
        let stats = kb.as_ref().map(|kb| kb.stats().clone());
        self.knowledge.replace(kb).await;
        Ok(stats)
    }

    /// Append an entry and re-index the diary.
    ///
    /// A failed append is an error. A failed re-index is not: the entry is
    /// on disk, the previous knowledge base stays in place, and the outcome
    /// reports `indexed: false`.
    pub async fn save_entry(&self, text: &str) -> AppResult<SaveOutcome> {
        if text.trim().is_empty() {
            return Err(AppError::Diary("No entry provided.".to_string()));
        }

        let _guard = self.write_lock.lock().await;
        let entry = self.store.append(text).await?;

        let indexed = match self.rebuild_locked().await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Knowledge base rebuild failed, keeping previous: {}", e);
                false
            }
        };

        Ok(SaveOutcome { entry, indexed })
    }

    /// Answer a question about the diary.
    pub async fn analyze(&self, query: &str) -> String {
        self.analyzer.analyze(query).await
    }

    /// Forward a prompt to the model.
    pub async fn prompt(&self, prompt: &str) -> String {
        self.forwarder.ask(prompt).await
    }

    pub async fn stats(&self) -> DiaryStats {
        let text = self.store.load().await;
        DiaryStats {
            diary_path: self.store.path().to_path_buf(),
            diary_bytes: text.len(),
            entries: entries(&text).len(),
            knowledge_base: self.knowledge.stats().await,
        }
    }
}
