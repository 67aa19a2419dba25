use async_trait::async_trait;

use crate::graph::{NodeExecutionContext, NodeOutput};
use crate::providers::ProviderRegistry;

use super::helpers::merge_input_text;
use super::prompts::{self, PROVIDER_OUTPUT_CHAR_CAP};
use super::{Executor, ExecutorError};

pub struct GrammarFix;

#[async_trait]
impl Executor for GrammarFix {
    async fn execute(&self, ctx: &NodeExecutionContext, providers: &ProviderRegistry) -> Result<NodeOutput, ExecutorError> {
        let base = merge_input_text(&ctx.text_inputs);
        let style = ctx.data_str("style");

        let provider = providers.text(&ctx.provider_id)?;
        let messages = prompts::grammar_fix(&base, style);
        let fixed = provider.chat(&messages, &ctx.model, ctx.temperature, PROVIDER_OUTPUT_CHAR_CAP as u32).await?;

        Ok(NodeOutput { text: Some(fixed), ..Default::default() })
    }
}
