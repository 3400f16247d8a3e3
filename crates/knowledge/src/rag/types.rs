//! Retrieval answer types.

use serde::{Deserialize, Serialize};

/// A diary passage used to answer a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagSourceRef {
    /// Chunk position within the diary
    pub position: u32,

    /// Start of the passage, truncated
    pub snippet: String,

    /// Cosine similarity to the question
    pub score: f32,
}

/// Answer produced by the retrieval chain, with the passages it was given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    pub answer: String,
    pub sources: Vec<RagSourceRef>,
}

impl RagResponse {
    pub fn new(answer: String, sources: Vec<RagSourceRef>) -> Self {
        Self { answer, sources }
    }

    /// Whether the model returned nothing usable.
    pub fn is_blank(&self) -> bool {
        self.answer.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank() {
        let response = RagResponse::new(
            "  \n".to_string(),
            vec![
                RagSourceRef {
                    position: 0,
                    snippet: "a".to_string(),
                    score: 0.2,
                },
                RagSourceRef {
                    position: 1,
                    snippet: "b".to_string(),
                    score: 0.7,
                },
            ],
        );

        assert!(response.is_blank());
        assert!(!RagResponse::new("ok".into(), vec![]).is_blank());
    }
}
