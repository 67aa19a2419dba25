use async_trait::async_trait;

use crate::graph::{NodeExecutionContext, NodeOutput};
use crate::providers::ProviderRegistry;

use super::helpers::{inject_personas_if_present, merge_input_text};
use super::prompts;
use super::{Executor, ExecutorError};

pub struct PromptEnhancer;

#[async_trait]
impl Executor for PromptEnhancer {
    async fn execute(&self, ctx: &NodeExecutionContext, providers: &ProviderRegistry) -> Result<NodeOutput, ExecutorError> {
        let base = merge_input_text(&ctx.text_inputs);
        let notes = ctx.data_str("notes");

        let provider = providers.text(&ctx.provider_id)?;
        let messages = prompts::enhance(&base, notes);
        let enhanced = provider.chat(&messages, &ctx.model, ctx.temperature, prompts::PROVIDER_OUTPUT_CHAR_CAP as u32).await?;

        let injected = inject_personas_if_present(&enhanced, ctx, providers).await?;

        Ok(NodeOutput { text: Some(injected), ..Default::default() })
    }
}
