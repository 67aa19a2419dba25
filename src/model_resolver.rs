//! Resolves the `(provider_id, model, temperature)` triple a node's executor
//! should use, by the three-tier priority chain in the component design.

use crate::graph::{Node, ResolvedModel};
use crate::scene::model_default;

const DEFAULT_TEMPERATURE: f64 = 0.7;

fn node_str(node: &Node, key: &str) -> Option<&str> {
    node.data.get(key).and_then(serde_json::Value::as_str).filter(|s| !s.is_empty())
}

/// Resolve the model triple for `node`, falling back to `flow_provider_id`
/// when neither the node nor the per-type defaults supply one.
#[must_use]
pub fn resolve(node: &Node, flow_provider_id: &str) -> ResolvedModel {
    let node_type = node.resolved_type();
    let node_provider = node_str(node, "providerId");
    let node_model = node_str(node, "model");
    let default = model_default(&node_type);

    if let (Some(provider_id), Some(model)) = (node_provider, node_model) {
        let temperature = default.map_or(DEFAULT_TEMPERATURE, |d| d.temperature);
        return ResolvedModel {
            provider_id: provider_id.to_string(),
            model: model.to_string(),
            temperature,
        };
    }

    if let Some(default) = default {
        return ResolvedModel {
            provider_id: node_provider.unwrap_or(default.provider_id).to_string(),
            model: node_model.unwrap_or(default.model).to_string(),
            temperature: default.temperature,
        };
    }

    ResolvedModel {
        provider_id: flow_provider_id.to_string(),
        model: String::new(),
        temperature: DEFAULT_TEMPERATURE,
    }
}
