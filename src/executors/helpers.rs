//! Behavior shared across multiple executors: merging upstream text,
//! extracting personas from adapter inputs, and weaving them back in.

use crate::graph::{NodeExecutionContext, NodeOutput};
use crate::providers::ProviderRegistry;

use super::ExecutorError;
use super::prompts;

/// `max_tokens` used for persona-injection calls, per the component design.
pub const PERSONA_INJECTION_MAX_TOKENS: u32 = 2500;

/// A persona surfaced by an adapter input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub name: String,
    pub description: String,
}

/// Concatenate, blank-line separated, the non-empty `text`, `replace_prompt`,
/// `injected_prompt`, and `persona_description` fields of each input, in
/// input order and field order. Empty or missing fields are skipped.
#[must_use]
pub fn merge_input_text(inputs: &[NodeOutput]) -> String {
    let mut parts = Vec::new();
    for input in inputs {
        for field in [&input.text, &input.replace_prompt, &input.injected_prompt, &input.persona_description] {
            if let Some(value) = field {
                if !value.is_empty() {
                    parts.push(value.clone());
                }
            }
        }
    }
    parts.join("\n\n")
}

/// Pull out one persona per adapter input that carries a non-empty
/// `persona_description`, preserving order. `persona_name` defaults to
/// `"Unknown"` when absent.
#[must_use]
pub fn extract_personas(adapter_inputs: &[NodeOutput]) -> Vec<Persona> {
    adapter_inputs
        .iter()
        .filter_map(|input| {
            let description = input.persona_description.as_ref()?;
            if description.is_empty() {
                return None;
            }
            Some(Persona {
                name: input.persona_name.clone().unwrap_or_else(|| "Unknown".to_string()),
                description: description.clone(),
            })
        })
        .collect()
}

/// If `ctx`'s adapter inputs yield any personas, weave them into `text` via
/// the resolved text provider; otherwise return `text` unchanged.
pub async fn inject_personas_if_present(
    text: &str,
    ctx: &NodeExecutionContext,
    providers: &ProviderRegistry,
) -> Result<String, ExecutorError> {
    let personas = extract_personas(&ctx.adapter_inputs);
    if personas.is_empty() {
        return Ok(text.to_string());
    }
    let provider = providers.text(&ctx.provider_id)?;
    let messages = prompts::inject_persona(&personas, text);
    let result = provider.chat(&messages, &ctx.model, ctx.temperature, PERSONA_INJECTION_MAX_TOKENS).await?;
    Ok(result)
}
