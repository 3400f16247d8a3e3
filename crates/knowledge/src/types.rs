//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A text chunk with embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    /// Chunk identifier, unique within one build
    pub id: String,

    /// Position within the diary (0-based)
    pub position: u32,

    /// Text content
    pub text: String,

    /// Embedding vector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// Metadata (byte range within the diary)
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Chunk produced by the segmenter, before embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkCandidate {
    pub position: u32,
    pub text: String,
    /// Byte offset of the chunk in the source text
    pub start: usize,
}

impl ChunkCandidate {
    /// Byte offset one past the end of the chunk.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Statistics for a built knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeStats {
    /// Number of chunks in the index
    #[serde(rename = "chunks")]
    pub chunks_count: usize,

    /// Bytes of diary text indexed
    #[serde(rename = "bytesIndexed")]
    pub bytes_indexed: usize,

    /// Embedding vector dimension
    #[serde(rename = "dimensions")]
    pub embedding_dim: usize,

    /// Embedding provider/model
    #[serde(rename = "embeddingModel")]
    pub embedding_model: String,

    /// When the knowledge base was built
    #[serde(rename = "builtAt")]
    pub built_at: DateTime<Utc>,

    /// Build duration in seconds
    #[serde(rename = "durationSecs")]
    pub duration_secs: f64,
}
