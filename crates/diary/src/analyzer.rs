//! Routes diary questions to a mood report or to retrieval.

use crate::sentiment::SentimentScorer;
use crate::store::{entries, DiaryStore};
use lifecapsule_core::AppResult;
use lifecapsule_knowledge::KnowledgeBaseHandle;
use std::sync::Arc;

pub const EMPTY_QUERY_MESSAGE: &str = "Please provide a valid question.";
pub const EMPTY_KNOWLEDGE_BASE_MESSAGE: &str =
    "The knowledge base is empty. Please add diary entries first.";
pub const NO_ANSWER_MESSAGE: &str =
    "I couldn't find a relevant answer in your diary. Perhaps rephrasing your question could help.";
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Something went wrong while analyzing your diary. Please try again later.";

/// Emotion a question can ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Calm,
}

impl Mood {
    /// Checked in this order; the first match wins.
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Sad, Mood::Angry, Mood::Calm];

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Mood::Happy => &["happy", "joy"],
            Mood::Sad => &["sad", "down"],
            Mood::Angry => &["angry", "frustrated"],
            Mood::Calm => &["calm", "peaceful"],
        }
    }

    /// Wording used when entries are found.
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "happy or joyful",
            Mood::Sad => "sad or down",
            Mood::Angry => "angry or frustrated",
            Mood::Calm => "calm or peaceful",
        }
    }

    /// Wording used when nothing is found.
    pub fn noun(&self) -> &'static str {
        match self {
            Mood::Happy => "happiness",
            Mood::Sad => "sadness",
            Mood::Angry => "anger",
            Mood::Calm => "calmness",
        }
    }

    /// Whether an entry with this polarity shows the mood.
    pub fn matches(&self, polarity: f32) -> bool {
        match self {
            Mood::Happy => polarity > 0.5,
            Mood::Sad => polarity < -0.5,
            Mood::Angry => (-0.5..0.0).contains(&polarity),
            Mood::Calm => (0.0..=0.5).contains(&polarity),
        }
    }

    /// Find the mood a question asks about, by case-insensitive substring.
    pub fn detect(query: &str) -> Option<Mood> {
        let query = query.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|mood| mood.keywords().iter().any(|k| query.contains(k)))
    }

    /// Report the entries of `diary_text` showing this mood.
    pub fn report(&self, diary_text: &str, scorer: &dyn SentimentScorer) -> String {
        let matching: Vec<&str> = entries(diary_text)
            .into_iter()
            .filter(|entry| self.matches(scorer.polarity(entry)))
            .collect();

        tracing::debug!(mood = ?self, matches = matching.len(), "Mood report");

        if matching.is_empty() {
            format!(
                "I couldn't find any clear indications of {} in your diary.",
                self.noun()
            )
        } else {
            format!(
                "You seemed {} on the following days:\n{}",
                self.label(),
                matching.join("\n")
            )
        }
    }
}

/// Answers questions about the diary.
#[derive(Clone)]
pub struct DiaryAnalyzer {
    store: DiaryStore,
    knowledge: KnowledgeBaseHandle,
    scorer: Arc<dyn SentimentScorer>,
}

impl DiaryAnalyzer {
    pub fn new(
        store: DiaryStore,
        knowledge: KnowledgeBaseHandle,
        scorer: Arc<dyn SentimentScorer>,
    ) -> Self {
        Self {
            store,
            knowledge,
            scorer,
        }
    }

    /// Answer a question. Never fails: errors become a fixed apology.
    pub async fn analyze(&self, query: &str) -> String {
        if query.trim().is_empty() {
            return EMPTY_QUERY_MESSAGE.to_string();
        }

        match self.try_analyze(query).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("Error analyzing diary: {}", e);
                ANALYSIS_FAILED_MESSAGE.to_string()
            }
        }
    }

    async fn try_analyze(&self, query: &str) -> AppResult<String> {
        let Some(kb) = self.knowledge.current().await else {
            return Ok(EMPTY_KNOWLEDGE_BASE_MESSAGE.to_string());
        };

        if let Some(mood) = Mood::detect(query) {
            tracing::info!(mood = ?mood, "Answering from sentiment");
            let diary_text = self.store.load().await;
            return Ok(mood.report(&diary_text, self.scorer.as_ref()));
        }

        tracing::info!("Answering from retrieval");
        let response = kb.answer(query).await?;
        if response.is_blank() {
            return Ok(NO_ANSWER_MESSAGE.to_string());
        }
        Ok(response.answer)
    }
}
