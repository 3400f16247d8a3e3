//! Prompt builder for rendering templates and injecting context.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use lifecapsule_core::{AppError, AppResult};
use std::collections::HashMap;

/// Template variable that receives retrieved diary passages.
pub const CONTEXT_VARIABLE: &str = "context";

/// Build a prompt from a definition and input variables.
///
/// Renders the template with Handlebars. When the definition asks for
/// knowledge base context, `knowledge_context` is injected as `{{context}}`.
///
/// # Example
/// ```no_run
/// use lifecapsule_prompt::{build_prompt, PromptDefinition};
/// use std::collections::HashMap;
///
/// # fn example(def: PromptDefinition) -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("prompt".to_string(), "How was my week?".to_string());
///
/// let built = build_prompt(&def, vars, None)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    mut variables: HashMap<String, String>,
    knowledge_context: Option<String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let knowledge_context_included = if definition.context.include_knowledge_base {
        match knowledge_context {
            Some(ctx) => {
                variables.insert(CONTEXT_VARIABLE.to_string(), ctx);
                tracing::debug!("Injected knowledge base context");
                true
            }
            None => {
                tracing::warn!("Knowledge base context requested but not provided");
                false
            }
        }
    } else {
        false
    };

    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(
        user,
        definition.id.clone(),
        knowledge_context_included,
        variables,
    ))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Diary text is plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
