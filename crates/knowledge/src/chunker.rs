//! Diary segmentation into overlapping chunks.

use crate::types::ChunkCandidate;
use lifecapsule_core::{AppError, AppResult};
use text_splitter::{ChunkConfig, Characters, TextSplitter};

/// Splits diary text into bounded-size, overlapping chunks.
///
/// Sizes are counted in characters. The splitter prefers paragraph, then
/// sentence, then word boundaries before falling back to characters, and
/// neighbouring chunks share up to `overlap` characters.
pub struct Segmenter {
    splitter: TextSplitter<Characters>,
    chunk_size: usize,
    overlap: usize,
}

impl Segmenter {
    /// Create a segmenter; `overlap` must be smaller than `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> AppResult<Self> {
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(overlap)
            .map_err(|e| {
                AppError::Knowledge(format!(
                    "Invalid chunking parameters (size {}, overlap {}): {}",
                    chunk_size, overlap, e
                ))
            })?;

        Ok(Self {
            splitter: TextSplitter::new(config),
            chunk_size,
            overlap,
        })
    }

    /// Split text into chunks. Empty or whitespace-only text yields no chunks.
    pub fn split(&self, text: &str) -> Vec<ChunkCandidate> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let chunks: Vec<ChunkCandidate> = self
            .splitter
            .chunk_indices(text)
            .filter(|(_, chunk)| !chunk.trim().is_empty())
            .enumerate()
            .map(|(position, (start, chunk))| ChunkCandidate {
                position: position as u32,
                text: chunk.to_string(),
                start,
            })
            .collect();

        tracing::debug!(
            "Chunked text into {} chunks (size: {}, overlap: {})",
            chunks.len(),
            self.chunk_size,
            self.overlap
        );

        chunks
    }
}
