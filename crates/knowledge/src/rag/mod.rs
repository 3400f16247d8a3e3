//! Retrieval-augmented answering over the diary.

pub mod ask;
pub mod types;

pub use ask::RetrievalAnswerer;
pub use types::{RagResponse, RagSourceRef};
