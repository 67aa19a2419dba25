use async_trait::async_trait;

use crate::graph::{NodeExecutionContext, NodeOutput};
use crate::providers::ProviderRegistry;

use super::helpers::{inject_personas_if_present, merge_input_text};
use super::{Executor, ExecutorError};

/// The graph's entry point for a text pipeline: takes an explicit prompt or
/// merges upstream text, then weaves in any adapter personas.
pub struct InitialPrompt;

#[async_trait]
impl Executor for InitialPrompt {
    async fn execute(&self, ctx: &NodeExecutionContext, providers: &ProviderRegistry) -> Result<NodeOutput, ExecutorError> {
        let base = ctx
            .data_str("text")
            .map(str::to_string)
            .unwrap_or_else(|| merge_input_text(&ctx.text_inputs));

        let injected = inject_personas_if_present(&base, ctx, providers).await?;

        Ok(NodeOutput {
            text: Some(injected.clone()),
            injected_prompt: Some(injected),
            ..Default::default()
        })
    }
}
