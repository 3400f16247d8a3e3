//! Prompt loader for built-in and workspace prompt definitions.

use crate::defaults;
use crate::types::PromptDefinition;
use lifecapsule_core::{AppError, AppResult};
use std::path::Path;

/// Load a prompt definition by ID.
///
/// A file named `<id>.yml` in `prompts_dir` takes precedence over the
/// built-in definition with the same ID.
///
/// # Example
/// ```no_run
/// use lifecapsule_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new(".lifecapsule/prompts"), "chat.prompt.default")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(prompts_dir: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir.join(format!("{}.yml", prompt_id));

    if prompt_file.exists() {
        tracing::debug!("Loading prompt override from: {:?}", prompt_file);

        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;

        let definition = parse_prompt(&contents)
            .map_err(|e| AppError::Prompt(format!("{} ({:?})", e, prompt_file)))?;

        if definition.id != prompt_id {
            return Err(AppError::Prompt(format!(
                "Prompt file {:?} declares id '{}'",
                prompt_file, definition.id
            )));
        }

        tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);
        return Ok(definition);
    }

    let source = defaults::builtin_source(prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))?;

    parse_prompt(source)
}

/// Parse and validate a YAML prompt definition.
pub fn parse_prompt(contents: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML: {}", e)))?;

    validate_prompt(&definition)?;

    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    if def.context.include_knowledge_base && !def.template.contains("{{context}}") {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' includes the knowledge base but has no {{{{context}}}} placeholder",
            def.id
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{CHAT_PROMPT_ID, QUERY_PROMPT_ID, RETRIEVAL_PROMPT_ID};
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(format!("{}.yml", id)), content).unwrap();
    }

    #[test]
    fn test_builtins_parse() {
        let temp_dir = TempDir::new().unwrap();
        for id in [QUERY_PROMPT_ID, CHAT_PROMPT_ID, RETRIEVAL_PROMPT_ID] {
            let prompt = load_prompt(temp_dir.path(), id).unwrap();
            assert_eq!(prompt.id, id);
        }

        let retrieval = load_prompt(temp_dir.path(), RETRIEVAL_PROMPT_ID).unwrap();
        assert!(retrieval.context.include_knowledge_base);
        assert!(retrieval.template.ends_with("Helpful Answer:"));
    }

    #[test]
    fn test_override_takes_precedence() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            CHAT_PROMPT_ID,
            concat!(
                "id: chat.prompt.default\ntitle: Terse\n",
                "apiVersion: \"1.1\"\ntemplate: \"Q: {{prompt}}\"\n",
            ),
        );

        let prompt = load_prompt(temp_dir.path(), CHAT_PROMPT_ID).unwrap();
        assert_eq!(prompt.title, "Terse");
        assert_eq!(prompt.template, "Q: {{prompt}}");
    }

    #[test]
    fn test_override_with_mismatched_id_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            QUERY_PROMPT_ID,
            "id: something.else\ntitle: X\napiVersion: \"1.0\"\ntemplate: \"{{prompt}}\"\n",
        );

        assert!(load_prompt(temp_dir.path(), QUERY_PROMPT_ID).is_err());
    }

    #[test]
    fn test_load_unknown_prompt() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_prompt(temp_dir.path(), "nonexistent").is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "broken", "invalid: yaml: content:");
        assert!(load_prompt(temp_dir.path(), "broken").is_err());
    }

    #[test]
    fn test_knowledge_prompt_requires_context_placeholder() {
        let result = parse_prompt(concat!(
            "id: kb\ntitle: KB\napiVersion: \"1.0\"\n",
            "context:\n  includeKnowledgeBase: true\ntemplate: \"{{question}}\"\n",
        ));
        assert!(result.is_err());
    }
}
