//! Forwards free-form prompts to the language model.

use lifecapsule_core::{AppConfig, AppResult};
use lifecapsule_llm::{LlmClient, LlmRequest};
use lifecapsule_prompt::{build_prompt, load_prompt, PromptDefinition};
use std::collections::HashMap;
use std::sync::Arc;

pub const FORWARD_FAILED_MESSAGE: &str =
    "I encountered an error while processing your request. Please try again.";

/// Template variable holding the user's text.
const PROMPT_VARIABLE: &str = "prompt";

/// Renders a prompt template around user text and returns the model's reply.
#[derive(Clone)]
pub struct PromptForwarder {
    llm: Arc<dyn LlmClient>,
    model: String,
    template: PromptDefinition,
}

impl PromptForwarder {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        template: PromptDefinition,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            template,
        }
    }

    /// Forwarder for the configured model using prompt template `prompt_id`.
    pub fn from_config(
        config: &AppConfig,
        llm: Arc<dyn LlmClient>,
        prompt_id: &str,
    ) -> AppResult<Self> {
        let template = load_prompt(&config.prompts_dir(), prompt_id)?;
        Ok(Self::new(llm, config.model.clone(), template))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model. Never fails: errors become a fixed apology.
    pub async fn ask(&self, prompt: &str) -> String {
        match self.try_ask(prompt).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(provider = self.llm.provider_name(), "Error invoking model: {}", e);
                FORWARD_FAILED_MESSAGE.to_string()
            }
        }
    }

    async fn try_ask(&self, prompt: &str) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert(PROMPT_VARIABLE.to_string(), prompt.to_string());
        let built = build_prompt(&self.template, variables, None)?;

        let request = LlmRequest::new(built.user, self.model.clone());

        let response = self.llm.complete(&request).await?;
        Ok(response.content)
    }
}
