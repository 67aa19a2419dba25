//! The wire-format event every domain occurrence is expressed as.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// `execution.started` — the run's existence is now public.
pub const EXECUTION_STARTED: &str = "execution.started";
/// `execution.completed` — every dispatched task in the run has settled.
pub const EXECUTION_COMPLETED: &str = "execution.completed";
/// `execution.failed` — the run could not proceed at all (e.g. a cycle).
pub const EXECUTION_FAILED: &str = "execution.failed";
/// `execution.node.status` with `status: "pending"` — a node has been queued.
pub const NODE_PENDING: &str = "execution.node.status";
/// `execution.node.status` with `status: "running"` — a node's executor has started.
pub const NODE_RUNNING: &str = "execution.node.status";
/// `execution.node.status` with `status: "skipped"` — a node was skipped.
pub const NODE_SKIPPED: &str = "execution.node.status";
/// `execution.node.completed` — a node's executor returned a non-error output.
pub const NODE_COMPLETED: &str = "execution.node.completed";
/// `execution.node.failed` — a node's executor returned or threw an error.
pub const NODE_FAILED: &str = "execution.node.failed";

/// Dotted event type carried alongside the event so fire-and-forget handlers
/// can tell `NODE_PENDING`/`NODE_RUNNING`/`NODE_SKIPPED` apart even though
/// they share the same outbound message `type` in §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Pending,
    Running,
    Skipped,
}

impl NodeStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NodeStatus::Pending => "pending",
            NodeStatus::Running => "running",
            NodeStatus::Skipped => "skipped",
        }
    }
}

/// One occurrence published on the event bus.
///
/// `payload` is an untyped string-keyed map: the bus and its handlers never
/// need to know a payload's shape beyond what a given `event_type` promises,
/// the same way the node `data` bag in the graph model is untyped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub payload: FxHashMap<String, Value>,
}

impl Event {
    #[must_use]
    pub fn new(event_type: impl Into<String>, payload: FxHashMap<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Build an event's payload from `(key, value)` pairs without repeating
/// `.to_string()`/`json!` boilerplate at every call site.
#[macro_export]
macro_rules! event_payload {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut map = ::rustc_hash::FxHashMap::default();
        $(map.insert($key.to_string(), ::serde_json::json!($value));)*
        map
    }};
}
