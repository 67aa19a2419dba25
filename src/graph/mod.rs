//! Core data model for the graph execution engine.
//!
//! A run operates over a fixed set of [`Node`]s and [`Edge`]s supplied by the
//! caller. Everything downstream — the scheduler, the executors, the
//! runner — is built on the types in this module.

pub mod edges;
pub mod scheduler;
pub mod traversal;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The type tag reserved for layout-only group nodes.
///
/// Group nodes exist in the client's flow editor to visually cluster other
/// nodes; they carry no executable behavior and are excluded from every
/// stage of planning.
pub const GROUP_NODE_TYPE: &str = "group";

/// A single node in a client-submitted graph.
///
/// `data` is an untyped bag because node shapes vary per `type` and are
/// defined by an external flow editor this crate does not control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type", default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub data: FxHashMap<String, Value>,
}

impl Node {
    /// Resolve this node's effective type: the top-level `type` field takes
    /// precedence over `data.type`; absent both, the empty string.
    #[must_use]
    pub fn resolved_type(&self) -> String {
        if let Some(t) = &self.node_type {
            if !t.is_empty() {
                return t.clone();
            }
        }
        self.data
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        self.resolved_type() == GROUP_NODE_TYPE
    }
}

/// A directed data-flow dependency between two nodes.
///
/// `target_handle` beginning with the literal `adapter-` marks this as an
/// adapter (structured side-channel) edge rather than a text edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(rename = "targetHandle", default)]
    pub target_handle: Option<String>,
}

impl Edge {
    pub const ADAPTER_HANDLE_PREFIX: &'static str = "adapter-";

    #[must_use]
    pub fn is_adapter(&self) -> bool {
        self.target_handle
            .as_deref()
            .is_some_and(|h| h.starts_with(Self::ADAPTER_HANDLE_PREFIX))
    }
}

/// One node's position in a schedule, with its classified dependencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub node_id: String,
    pub node_type: String,
    pub input_node_ids: Vec<String>,
    pub adapter_node_ids: Vec<String>,
}

impl ExecutionStep {
    /// All dependency ids, text then adapter, in the order used for level
    /// computation and upstream-error inspection.
    pub fn all_dependencies(&self) -> impl Iterator<Item = &String> {
        self.input_node_ids.iter().chain(self.adapter_node_ids.iter())
    }
}

/// The result of one executor invocation.
///
/// Every field is optional; absence means "not produced". `error` being
/// set marks the node as failed/skipped for downstream dependents
/// regardless of any other field also being populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub injected_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

impl NodeOutput {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Serialize to a JSON object containing only the fields that were set,
    /// matching the `model_dump(exclude_none=True)` shape expected in
    /// outbound events.
    pub fn to_sparse_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Object(serde_json::Map::new()))
    }
}

/// The per-node execution context built immediately before an executor is
/// invoked, and discarded after.
#[derive(Debug, Clone)]
pub struct NodeExecutionContext {
    pub node_id: String,
    pub node_type: String,
    pub node_data: FxHashMap<String, Value>,
    pub text_inputs: Vec<NodeOutput>,
    pub adapter_inputs: Vec<NodeOutput>,
    pub provider_id: String,
    pub model: String,
    pub temperature: f64,
    pub run_id: String,
    pub user_id: i64,
}

impl NodeExecutionContext {
    /// Read a string field from `node_data`, treating absence and an empty
    /// string identically (both yield `None`).
    #[must_use]
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.node_data.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn data_u64(&self, key: &str) -> Option<u64> {
        self.node_data.get(key).and_then(|v| {
            v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        })
    }
}

/// Drop group nodes and duplicate ids (first occurrence wins), preserving order.
///
/// Shared by the scheduler and the traversal utilities so both operate over
/// the identical filtered node set.
pub(crate) fn filter_nodes(nodes: &[Node]) -> Vec<&Node> {
    let mut seen = rustc_hash::FxHashSet::default();
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        if node.is_group() {
            continue;
        }
        if seen.insert(node.id.clone()) {
            out.push(node);
        }
    }
    out
}

/// The resolved `(provider, model, temperature)` triple for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    pub provider_id: String,
    pub model: String,
    pub temperature: f64,
}
