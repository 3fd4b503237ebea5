use super::react::ReactAgent;
use crate::llm::ChatProvider;
use std::sync::Arc;

pub const TRANSLATION_AGENT: &str = "translation_agent";

pub const TRANSLATION_PROMPT: &str = "You are a translation agent.

INSTRUCTIONS:
- Your task is to translate the content provided by the analysis agent into the target language specified by the supervisor.
- Translate accurately and fluently while preserving the original meaning and tone.
- Do NOT add any explanations, commentary, or formatting.
- Do NOT perform any analysis or research.
- If the target language is not specified, ask the supervisor for clarification.
- After translating, respond directly to the supervisor with ONLY the translated content.";

pub fn translation_agent(provider: Arc<dyn ChatProvider>) -> ReactAgent {
    ReactAgent::new(TRANSLATION_AGENT, TRANSLATION_PROMPT, provider)
        .with_description("Translates analysis output into a requested language.")
}
