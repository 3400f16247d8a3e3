//! Chat command handler: the interactive prompt loop.

use clap::Args;
use lifecapsule_core::{AppConfig, AppResult};
use lifecapsule_diary::PromptForwarder;
use lifecapsule_prompt::CHAT_PROMPT_ID;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Chat with the model interactively
///
/// Each line is sent on its own; nothing is remembered between prompts.
/// Use the global `--model` flag to pick the model.
#[derive(Args, Debug)]
pub struct ChatCommand {}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let llm = lifecapsule_llm::client_from_config(config)?;
        let forwarder = PromptForwarder::from_config(config, llm, CHAT_PROMPT_ID)?;

        tracing::info!(model = forwarder.model(), "Starting chat loop");

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout();
        run_chat_loop(&forwarder, stdin, &mut stdout).await
    }
}

/// Read prompts from `input` until `exit` or end of input, writing model
/// responses to `output`.
pub async fn run_chat_loop<R, W>(
    forwarder: &PromptForwarder,
    mut input: R,
    output: &mut W,
) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(output, "Model is ready! Type your prompts below (type 'exit' to quit):")?;

    let mut line = String::new();
    loop {
        write!(output, "Your prompt: ")?;
        output.flush()?;

        line.clear();
        let read = input.read_line(&mut line).await?;
        let prompt = line.trim();

        if read == 0 || prompt.eq_ignore_ascii_case("exit") {
            writeln!(output, "Exiting...")?;
            break;
        }

        let response = forwarder.ask(prompt).await;
        writeln!(output, "Model response:\n{}", response)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lifecapsule_llm::{LlmClient, LlmRequest, LlmResponse};
    use lifecapsule_prompt::{defaults::builtin_source, parse_prompt};
    use std::sync::Arc;

    struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        fn provider_name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            Ok(LlmResponse::text(format!("echo: {}", request.prompt), "m"))
        }
    }

    fn forwarder() -> PromptForwarder {
        let template = parse_prompt(builtin_source(CHAT_PROMPT_ID).unwrap()).unwrap();
        PromptForwarder::new(Arc::new(EchoLlm), "llama3.2", template)
    }

    async fn run(input: &str) -> String {
        let mut output = Vec::new();
        run_chat_loop(&forwarder(), input.as_bytes(), &mut output)
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_prompt_then_exit() {
        let output = run("hello\n  EXIT  \nnever read\n").await;
        assert_eq!(
            output,
            "Model is ready! Type your prompts below (type 'exit' to quit):\n\
             Your prompt: Model response:\n\
             echo: User input: hello. Please provide a response.\n\
             Your prompt: Exiting...\n"
        );
    }

    #[tokio::test]
    async fn test_end_of_input_exits() {
        let output = run("first\nsecond").await;
        assert_eq!(output.matches("Model response:").count(), 2);
        assert!(output.ends_with("Your prompt: Exiting...\n"));
    }

    #[tokio::test]
    async fn test_empty_input_exits_immediately() {
        let output = run("").await;
        assert!(!output.contains("Model response:"));
        assert!(output.ends_with("Exiting...\n"));
    }
}
