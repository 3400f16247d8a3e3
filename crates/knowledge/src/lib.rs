//! Knowledge base for diary question answering.
//!
//! The diary text is split into overlapping chunks, embedded, and held in an
//! in-memory similarity index. Questions are answered by retrieving the
//! closest chunks and handing them to the language model. The whole
//! knowledge base is rebuilt from scratch whenever the diary changes.

pub mod chunker;
pub mod embeddings;
pub mod knowledge_base;
pub mod rag;
pub mod types;
pub mod vector_index;

// Re-export commonly used types
pub use chunker::Segmenter;
pub use embeddings::{create_provider, EmbeddingProvider};
pub use knowledge_base::{KnowledgeBase, KnowledgeBaseHandle, KnowledgeBuilder};
pub use rag::{RagResponse, RagSourceRef, RetrievalAnswerer};
pub use types::{ChunkCandidate, KnowledgeChunk, KnowledgeStats};
pub use vector_index::{InMemoryIndex, VectorIndex};
