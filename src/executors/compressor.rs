use async_trait::async_trait;

use crate::graph::{NodeExecutionContext, NodeOutput};
use crate::providers::ProviderRegistry;

use super::helpers::merge_input_text;
use super::prompts::{self, PROVIDER_OUTPUT_CHAR_CAP};
use super::{Executor, ExecutorError};

/// Texts at or under this length pass through unchanged rather than
/// spending a provider call compressing something already short.
pub const COMPRESSION_THRESHOLD_CHARS: usize = 2500;

pub struct Compressor;

#[async_trait]
impl Executor for Compressor {
    async fn execute(&self, ctx: &NodeExecutionContext, providers: &ProviderRegistry) -> Result<NodeOutput, ExecutorError> {
        let base = merge_input_text(&ctx.text_inputs);
        if base.chars().count() <= COMPRESSION_THRESHOLD_CHARS {
            return Ok(NodeOutput { text: Some(base), ..Default::default() });
        }

        let provider = providers.text(&ctx.provider_id)?;
        let messages = prompts::compress(&base);
        let compressed = provider.chat(&messages, &ctx.model, ctx.temperature, PROVIDER_OUTPUT_CHAR_CAP as u32).await?;

        Ok(NodeOutput { text: Some(compressed), ..Default::default() })
    }
}
