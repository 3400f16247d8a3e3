//! Offline embedding provider built from character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use lifecapsule_core::AppResult;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Deterministic, content-dependent embeddings without a model server.
///
/// Words are hashed into buckets together with their character trigrams, so
/// texts sharing vocabulary land close together. Not semantic, but stable,
/// which makes it useful offline and in tests.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

fn stop_words() -> &'static HashSet<&'static str> {
    static STOP_WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    STOP_WORDS.get_or_init(|| {
        [
            "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to",
            "of", "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have",
            "has", "had", "it", "its", "their", "they", "them", "did", "how", "what", "when",
            "you", "your", "my", "me",
        ]
        .into_iter()
        .collect()
    })
}

fn hash_str(s: &str, multiplier: u64) -> usize {
    s.bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(b as u64)) as usize
}

impl TrigramProvider {
    pub const DEFAULT_DIMENSIONS: usize = 384;

    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !stop_words().contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                embedding[hash_str(&trigram, 37) % self.dimensions] += (*freq as f32).sqrt();
            }
            embedding[hash_str(word, 31) % self.dimensions] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }
        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.vectorize(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_index::cosine_similarity;

    #[tokio::test]
    async fn test_unit_length_and_dimensions() {
        let provider = TrigramProvider::new(128);
        let embedding = provider.embed("walked along the beach at sunset").await.unwrap();

        assert_eq!(embedding.len(), 128);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let provider = TrigramProvider::new(TrigramProvider::DEFAULT_DIMENSIONS);
        let a = provider.embed("deterministic diary").await.unwrap();
        let b = provider.embed("deterministic diary").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_shared_vocabulary_scores_higher() {
        let provider = TrigramProvider::new(TrigramProvider::DEFAULT_DIMENSIONS);
        let texts = vec![
            "Went hiking in the mountains with Sam, the trail was steep".to_string(),
            "Baked sourdough bread and cleaned the kitchen".to_string(),
        ];
        let docs = provider.embed_batch(&texts).await.unwrap();
        let query = provider.embed("Where did I go hiking?").await.unwrap();

        assert!(cosine_similarity(&query, &docs[0]) > cosine_similarity(&query, &docs[1]));
    }

    #[tokio::test]
    async fn test_only_stop_words_gives_zero_vector() {
        let provider = TrigramProvider::new(16);
        let embedding = provider.embed("the and of").await.unwrap();
        assert!(embedding.iter().all(|v| *v == 0.0));
    }
}
