//! Vector index abstraction for knowledge chunks.

use crate::types::KnowledgeChunk;
use lifecapsule_core::{AppError, AppResult};
use std::cmp::Ordering;

/// Trait for vector index backends.
pub trait VectorIndex: Send + Sync {
    /// Insert or update a chunk with its embedding in the index.
    fn upsert_chunk(&mut self, chunk: KnowledgeChunk) -> AppResult<()>;

    /// Search for the top-k most similar chunks to the query embedding.
    ///
    /// Returns chunks ordered by descending similarity score.
    fn search(&self, query_embedding: &[f32], top_k: usize)
        -> AppResult<Vec<(KnowledgeChunk, f32)>>;

    /// Number of chunks held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cosine similarity of two vectors; 0.0 when either is all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Brute-force cosine index held entirely in memory.
///
/// A diary is small enough that a linear scan beats maintaining an ANN
/// structure, and the index is thrown away on every rebuild anyway.
#[derive(Debug, Default, Clone)]
pub struct InMemoryIndex {
    dimensions: Option<usize>,
    chunks: Vec<KnowledgeChunk>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vector dimension, fixed by the first inserted chunk.
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    pub fn chunks(&self) -> &[KnowledgeChunk] {
        &self.chunks
    }
}

impl VectorIndex for InMemoryIndex {
    fn upsert_chunk(&mut self, chunk: KnowledgeChunk) -> AppResult<()> {
        let dims = chunk
            .embedding
            .as_ref()
            .map(Vec::len)
            .ok_or_else(|| AppError::Knowledge(format!("Chunk {} has no embedding", chunk.id)))?;

        match self.dimensions {
            Some(expected) if expected != dims => {
                return Err(AppError::Knowledge(format!(
                    "Embedding dimension mismatch: index has {}, chunk {} has {}",
                    expected, chunk.id, dims
                )));
            }
            Some(_) => {}
            None => self.dimensions = Some(dims),
        }

        match self.chunks.iter_mut().find(|c| c.id == chunk.id) {
            Some(existing) => *existing = chunk,
            None => self.chunks.push(chunk),
        }
        Ok(())
    }

    fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> AppResult<Vec<(KnowledgeChunk, f32)>> {
        if let Some(expected) = self.dimensions {
            if query_embedding.len() != expected {
                return Err(AppError::Knowledge(format!(
                    "Query embedding has {} dimensions, index expects {}",
                    query_embedding.len(),
                    expected
                )));
            }
        }

        let mut scored: Vec<(&KnowledgeChunk, f32)> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let embedding = chunk.embedding.as_deref()?;
                Some((chunk, cosine_similarity(query_embedding, embedding)))
            })
            .collect();

        // Ties keep diary order
        scored.sort_by(|(a, sa), (b, sb)| {
            sb.partial_cmp(sa)
                .unwrap_or(Ordering::Equal)
                .then(a.position.cmp(&b.position))
        });

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(chunk, score)| (chunk.clone(), score))
            .collect())
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }
}
