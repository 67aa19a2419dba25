use async_trait::async_trait;

use crate::graph::{NodeExecutionContext, NodeOutput};
use crate::providers::ProviderRegistry;

use super::helpers::{inject_personas_if_present, merge_input_text};
use super::prompts::{self, PROVIDER_OUTPUT_CHAR_CAP};
use super::{Executor, ExecutorError};

pub struct StoryTeller;

#[async_trait]
impl Executor for StoryTeller {
    async fn execute(&self, ctx: &NodeExecutionContext, providers: &ProviderRegistry) -> Result<NodeOutput, ExecutorError> {
        let merged = merge_input_text(&ctx.text_inputs);
        let idea = if merged.is_empty() { ctx.data_str("idea").unwrap_or_default().to_string() } else { merged };
        let tags = ctx.data_str("tags");

        let provider = providers.text(&ctx.provider_id)?;
        let messages = prompts::storyteller(&idea, tags);
        let story = provider.chat(&messages, &ctx.model, ctx.temperature, PROVIDER_OUTPUT_CHAR_CAP as u32).await?;

        let injected = inject_personas_if_present(&story, ctx, providers).await?;
        Ok(NodeOutput { text: Some(injected), ..Default::default() })
    }
}
