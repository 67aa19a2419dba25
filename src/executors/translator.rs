use async_trait::async_trait;

use crate::graph::{NodeExecutionContext, NodeOutput};
use crate::providers::ProviderRegistry;

use super::helpers::merge_input_text;
use super::prompts::{self, PROVIDER_OUTPUT_CHAR_CAP};
use super::{Executor, ExecutorError};

pub struct Translator;

#[async_trait]
impl Executor for Translator {
    async fn execute(&self, ctx: &NodeExecutionContext, providers: &ProviderRegistry) -> Result<NodeOutput, ExecutorError> {
        let base = merge_input_text(&ctx.text_inputs);
        let Some(language) = ctx.data_str("language") else {
            return Ok(NodeOutput { text: Some(base), ..Default::default() });
        };

        let language_name = prompts::language_name(language);
        let provider = providers.text(&ctx.provider_id)?;
        let messages = prompts::translate(&base, language_name);
        let translated = provider.chat(&messages, &ctx.model, ctx.temperature, PROVIDER_OUTPUT_CHAR_CAP as u32).await?;

        Ok(NodeOutput { text: Some(translated), ..Default::default() })
    }
}
