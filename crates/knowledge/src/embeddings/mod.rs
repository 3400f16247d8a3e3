//! Embedding providers for the diary knowledge base.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
