//! Prompt templates for LifeCapsule.
//!
//! This crate provides:
//! - YAML-based prompt definitions
//! - Built-in templates for the diary service and the chat loop
//! - Per-workspace overrides in `.lifecapsule/prompts/<id>.yml`
//! - Handlebars rendering with optional knowledge context injection

pub mod builder;
pub mod defaults;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use defaults::{CHAT_PROMPT_ID, QUERY_PROMPT_ID, RETRIEVAL_PROMPT_ID};
pub use loader::{load_prompt, parse_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptContextConfig, PromptDefinition};
