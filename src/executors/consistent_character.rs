use async_trait::async_trait;

use crate::graph::{NodeExecutionContext, NodeOutput};
use crate::providers::ProviderRegistry;

use super::{Executor, ExecutorError};

/// A pure data-shape executor: reframes a character sheet as a persona,
/// without any provider call.
pub struct ConsistentCharacter;

#[async_trait]
impl Executor for ConsistentCharacter {
    async fn execute(&self, ctx: &NodeExecutionContext, _providers: &ProviderRegistry) -> Result<NodeOutput, ExecutorError> {
        let Some(description) = ctx.data_str("characterDescription") else {
            return Ok(NodeOutput::error("No character selected"));
        };
        let name = ctx.data_str("characterName").unwrap_or("Unknown");

        Ok(NodeOutput {
            text: Some(description.to_string()),
            persona_description: Some(description.to_string()),
            persona_name: Some(name.to_string()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderRegistry as Registry;
    use rustc_hash::FxHashMap;

    fn ctx(data: &[(&str, serde_json::Value)]) -> NodeExecutionContext {
        NodeExecutionContext {
            node_id: "p".to_string(),
            node_type: "consistentCharacter".to_string(),
            node_data: data.iter().map(|(k, v)| (k.to_string(), v.clone())).collect::<FxHashMap<_, _>>(),
            text_inputs: vec![],
            adapter_inputs: vec![],
            provider_id: "unused".to_string(),
            model: String::new(),
            temperature: 0.7,
            run_id: "r".to_string(),
            user_id: 1,
        }
    }

    #[tokio::test]
    async fn missing_description_errors() {
        let providers = Registry::new();
        let out = ConsistentCharacter.execute(&ctx(&[]), &providers).await.unwrap();
        assert_eq!(out.error.as_deref(), Some("No character selected"));
    }

    #[tokio::test]
    async fn shapes_persona_from_character_sheet() {
        let providers = Registry::new();
        let c = ctx(&[("characterName", serde_json::json!("Ada")), ("characterDescription", serde_json::json!("red hair"))]);
        let out = ConsistentCharacter.execute(&c, &providers).await.unwrap();
        assert_eq!(out.persona_name.as_deref(), Some("Ada"));
        assert_eq!(out.persona_description.as_deref(), Some("red hair"));
    }
}
