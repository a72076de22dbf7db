//! Built-in prompt definitions.

use crate::types::{PromptDefinition, PromptOutputSpec};

/// Identifier of the answer prompt used by the retrieval pipeline.
pub const ANSWER_PROMPT_ID: &str = "rag.answer.default";

const ANSWER_TEMPLATE: &str = "Answer based on legal context:
{{context}}

Question: {{question}}

Provide detailed answer with citations:";

/// The default answer prompt: retrieved context first, then the question,
/// then an instruction to answer in detail with citations.
pub fn default_answer_prompt() -> PromptDefinition {
    PromptDefinition {
        id: ANSWER_PROMPT_ID.to_string(),
        title: "Grounded answer with citations".to_string(),
        api_version: "1.0".to_string(),
        created_by: "casebook".to_string(),
        system: None,
        template: ANSWER_TEMPLATE.to_string(),
        output: PromptOutputSpec {
            format: "markdown".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_answer_prompt_variables() {
        let def = default_answer_prompt();
        assert_eq!(def.id, ANSWER_PROMPT_ID);
        assert!(def.template.contains("{{context}}"));
        assert!(def.template.contains("{{question}}"));
        assert!(def.template.ends_with("Provide detailed answer with citations:"));
    }
}
