//! Built-in prompt definitions.
//!
//! Each entry is a YAML document in the same format as a workspace override
//! file, so overriding a built-in is a matter of copying it into
//! `.lifecapsule/prompts/<id>.yml` and editing the template.

/// Template used by the HTTP prompt endpoint: the prompt verbatim.
pub const QUERY_PROMPT_ID: &str = "diary.prompt.query";

/// Template used by the interactive chat loop.
pub const CHAT_PROMPT_ID: &str = "chat.prompt.default";

/// Template used to answer questions from retrieved diary passages.
pub const RETRIEVAL_PROMPT_ID: &str = "diary.ask.retrieval";

const QUERY_PROMPT: &str = r#"
id: diary.prompt.query
title: Forward a prompt to the model
apiVersion: "1.0"
template: "{{prompt}}"
"#;

const CHAT_PROMPT: &str = r#"
id: chat.prompt.default
title: Interactive chat prompt
apiVersion: "1.0"
template: "User input: {{prompt}}. Please provide a response."
"#;

const RETRIEVAL_PROMPT: &str = r#"
id: diary.ask.retrieval
title: Answer a question from diary passages
apiVersion: "1.0"
context:
  includeKnowledgeBase: true
template: |-
  Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.

  {{context}}

  Question: {{question}}
  Helpful Answer:
"#;

/// Look up the YAML source of a built-in prompt.
pub fn builtin_source(prompt_id: &str) -> Option<&'static str> {
    match prompt_id {
        QUERY_PROMPT_ID => Some(QUERY_PROMPT),
        CHAT_PROMPT_ID => Some(CHAT_PROMPT),
        RETRIEVAL_PROMPT_ID => Some(RETRIEVAL_PROMPT),
        _ => None,
    }
}
