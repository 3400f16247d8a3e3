//! One-shot diary commands: save, analyze, prompt.

use clap::Args;
use lifecapsule_core::{AppConfig, AppResult};
use lifecapsule_diary::DiaryService;

/// Save a diary entry
#[derive(Args, Debug)]
pub struct SaveCommand {
    /// Entry text
    #[arg(required = true, trailing_var_arg = true)]
    pub text: Vec<String>,
}

impl SaveCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let service = DiaryService::from_config(config)?;
        let outcome = service.save_entry(&self.text.join(" ")).await?;

        println!("Your diary entry has been saved.");
        if !outcome.indexed {
            println!("(The knowledge base could not be updated; see the log for details.)");
        }
        Ok(())
    }
}

/// Ask a question about the diary
#[derive(Args, Debug)]
pub struct AnalyzeCommand {
    /// The question
    #[arg(required = true, trailing_var_arg = true)]
    pub query: Vec<String>,
}

impl AnalyzeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let service = DiaryService::from_config(config)?;
        println!("{}", self.answer(&service).await);
        Ok(())
    }

    /// Index the diary, then answer. An indexing failure is logged and the
    /// question is still answered against whatever could be built.
    async fn answer(&self, service: &DiaryService) -> String {
        if let Err(e) = service.rebuild_knowledge_base().await {
            tracing::warn!("Could not index diary: {}", e);
        }

        service.analyze(&self.query.join(" ")).await
    }
}

/// Send a single prompt to the model
#[derive(Args, Debug)]
pub struct PromptCommand {
    /// Prompt text
    #[arg(required = true, trailing_var_arg = true)]
    pub prompt: Vec<String>,
}

impl PromptCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let service = DiaryService::from_config(config)?;
        println!("{}", service.prompt(&self.prompt.join(" ")).await);
        Ok(())
    }
}
