//! Command handlers for the LifeCapsule CLI.

pub mod chat;
pub mod diary;
pub mod serve;
pub mod stats;

pub use chat::ChatCommand;
pub use diary::{AnalyzeCommand, PromptCommand, SaveCommand};
pub use serve::ServeCommand;
pub use stats::StatsCommand;
