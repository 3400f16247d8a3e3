//! The diary itself: storage, mood analysis, and the service that ties the
//! store to the knowledge base and the language model.

pub mod analyzer;
pub mod forwarder;
pub mod sentiment;
pub mod service;
pub mod store;

pub use analyzer::{DiaryAnalyzer, Mood};
pub use forwarder::PromptForwarder;
pub use sentiment::{LexiconScorer, SentimentScorer};
pub use service::{DiaryService, DiaryStats, SaveOutcome};
pub use store::{entries, DiaryEntry, DiaryStore};
