//! Enhancement prompt templates

use serde::{Deserialize, Serialize};

/// Prompt used when the selected template cannot be found
pub const DEFAULT_ENHANCEMENT_PROMPT: &str = "Fix grammar and punctuation in the following text.
Keep the original meaning and tone. Output only the corrected text, nothing else.

Text: {text}";

/// Identifier of the template selected out of the box
pub const DEFAULT_PROMPT_ID: &str = "fix-grammar";

/// A named enhancement prompt. `{text}` is replaced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: String,
    pub name: String,
    pub template: String,
}

/// Built-in templates as `(id, name, template)`
const BUILTIN_PROMPTS: &[(&str, &str, &str)] = &[
    ("fix-grammar", "Fix Grammar", DEFAULT_ENHANCEMENT_PROMPT),
    (
        "make-professional",
        "Make Professional",
        "Rewrite the following text in a clear, professional tone suitable for work email.
Output only the rewritten text, nothing else.

Text: {text}",
    ),
    (
        "make-casual",
        "Make Casual",
        "Rewrite the following text in a relaxed, friendly tone.
Output only the rewritten text, nothing else.

Text: {text}",
    ),
    (
        "simplify",
        "Simplify",
        "Rewrite the following text using short sentences and plain words.
Output only the rewritten text, nothing else.

Text: {text}",
    ),
    (
        "summarise",
        "Summarise",
        "Summarise the following text in one or two sentences.
Output only the summary, nothing else.

Text: {text}",
    ),
    (
        "expand",
        "Expand",
        "Expand the following notes into complete, well-formed sentences.
Output only the expanded text, nothing else.

Text: {text}",
    ),
];

/// All built-in templates
pub fn builtin_prompts() -> Vec<PromptTemplate> {
    BUILTIN_PROMPTS
        .iter()
        .map(|(id, name, template)| PromptTemplate {
            id: (*id).to_string(),
            name: (*name).to_string(),
            template: (*template).to_string(),
        })
        .collect()
}

/// Resolve a template id to prompt text.
///
/// Custom templates shadow built-ins with the same id.
pub fn resolve_prompt(prompt_id: &str, custom: &[PromptTemplate]) -> String {
    if let Some(prompt) = custom.iter().find(|p| p.id == prompt_id) {
        return prompt.template.clone();
    }

    BUILTIN_PROMPTS
        .iter()
        .find(|(id, _, _)| *id == prompt_id)
        .map(|(_, _, template)| (*template).to_string())
        .unwrap_or_else(|| DEFAULT_ENHANCEMENT_PROMPT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_all_contain_placeholder() {
        for prompt in builtin_prompts() {
            assert!(prompt.template.contains("{text}"), "{} lacks placeholder", prompt.id);
        }
    }

    #[test]
    fn resolves_builtin() {
        let prompt = resolve_prompt("summarise", &[]);
        assert!(prompt.starts_with("Summarise"));
    }

    #[test]
    fn custom_shadows_builtin() {
        let custom = vec![PromptTemplate {
            id: "summarise".to_string(),
            name: "Mine".to_string(),
            template: "TL;DR: {text}".to_string(),
        }];
        assert_eq!(resolve_prompt("summarise", &custom), "TL;DR: {text}");
    }

    #[test]
    fn unknown_id_falls_back_to_default() {
        assert_eq!(resolve_prompt("nope", &[]), DEFAULT_ENHANCEMENT_PROMPT);
    }
}
