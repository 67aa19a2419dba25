//! Transport bridge: wires the event bus to an external channel.
//!
//! The bridge owns no execution state; it is a set of event handlers
//! registered at startup, each translating one domain event into one
//! outbound message for the user named in the event's payload. It also
//! decodes the two inbound client message shapes (§6) and delegates
//! `execution.start` to the run manager.

use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{instrument, warn};

use crate::event_bus::{
    EXECUTION_COMPLETED, EXECUTION_FAILED, EXECUTION_STARTED, Event, EventBus, NODE_COMPLETED,
    NODE_FAILED, NODE_PENDING,
};
use crate::executors::ExecutorRegistry;
use crate::graph::{Edge, Node, NodeOutput};
use crate::providers::ProviderRegistry;
use crate::run_manager::{RunRequest, run};

/// One outbound `{type, data}` message, shaped per §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub data: Value,
}

/// Abstraction over the active external channel. Implementations deliver
/// `message` to whichever transport session belongs to `user_id`; a user
/// with no active connection is a silent drop, not an error.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    async fn send_to_user(&self, user_id: i64, message: OutboundMessage);
}

/// A client → server message as decoded off the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub data: Value,
}

/// The fields of an `execution.start` inbound message's `data` object.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionStartData {
    pub flow_id: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub provider_id: String,
    #[serde(default)]
    pub trigger_node_id: Option<String>,
    #[serde(default)]
    pub cached_outputs: FxHashMap<String, NodeOutput>,
}

/// `connection.ready` message type, sent once per accepted connection. Not a
/// domain event routed through the bus — the transport layer that owns
/// connection accept/drop calls this directly when it authenticates a user.
pub const CONNECTION_READY: &str = "connection.ready";

/// Build the `connection.ready` message a transport sends right after
/// accepting and authenticating a connection for `user_id`.
#[must_use]
pub fn connection_ready(user_id: i64) -> OutboundMessage {
    OutboundMessage {
        message_type: CONNECTION_READY.to_string(),
        data: serde_json::json!({ "user_id": user_id }),
    }
}

/// Subscribe every domain-event → outbound-message handler on `events`.
/// Call once at startup, after the event bus and `sender` are constructed.
///
/// `NODE_PENDING`/`NODE_RUNNING`/`NODE_SKIPPED` all alias the same wire type
/// (`execution.node.status`, distinguished by payload `status`), so this
/// list names each distinct event-bus key exactly once — subscribing under
/// an alias twice would forward the same occurrence to the client twice.
pub fn install(events: &EventBus, sender: Arc<dyn ChannelSender>) {
    for event_type in [EXECUTION_STARTED, EXECUTION_COMPLETED, EXECUTION_FAILED, NODE_PENDING, NODE_COMPLETED, NODE_FAILED] {
        let sender = sender.clone();
        events.on(event_type, move |event| {
            let sender = sender.clone();
            async move {
                forward(&sender, event).await;
                Ok(())
            }
        });
    }
}

async fn forward(sender: &Arc<dyn ChannelSender>, event: Event) {
    let Some(user_id) = event.payload.get("user_id").and_then(Value::as_i64) else {
        return;
    };
    let message = OutboundMessage {
        message_type: event.event_type.clone(),
        data: Value::Object(event.payload.into_iter().filter(|(k, _)| k != "user_id").collect()),
    };
    sender.send_to_user(user_id, message).await;
}

/// Decode and act on one inbound message. `user_id` is the identity the
/// transport layer has already authenticated for this connection.
#[instrument(skip_all, fields(message_type = %message.message_type, user_id))]
pub async fn handle_inbound(
    message: InboundMessage,
    user_id: i64,
    sender: &Arc<dyn ChannelSender>,
    executors: Arc<ExecutorRegistry>,
    providers: Arc<ProviderRegistry>,
    events: EventBus,
) {
    match message.message_type.as_str() {
        "ping" => {
            sender
                .send_to_user(user_id, OutboundMessage { message_type: "pong".to_string(), data: Value::Object(serde_json::Map::new()) })
                .await;
        }
        "execution.start" => {
            let start: ExecutionStartData = match serde_json::from_value(message.data) {
                Ok(start) => start,
                Err(err) => {
                    warn!(%err, "malformed execution.start payload");
                    return;
                }
            };
            let request = RunRequest {
                flow_id: start.flow_id,
                user_id,
                nodes: start.nodes,
                edges: start.edges,
                provider_id: start.provider_id,
                trigger_node_id: start.trigger_node_id,
                cached_outputs: start.cached_outputs,
            };
            let run_id = run(request, executors, providers, events.clone());
            sender
                .send_to_user(
                    user_id,
                    OutboundMessage {
                        message_type: EXECUTION_STARTED.to_string(),
                        data: serde_json::json!({ "run_id": run_id }),
                    },
                )
                .await;
        }
        other => {
            warn!(message_type = other, "ignoring unknown inbound message type");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    struct RecordingSender(Arc<Mutex<Vec<(i64, OutboundMessage)>>>);

    #[async_trait]
    impl ChannelSender for RecordingSender {
        async fn send_to_user(&self, user_id: i64, message: OutboundMessage) {
            self.0.lock().await.push((user_id, message));
        }
    }

    #[test]
    fn connection_ready_carries_user_id() {
        let message = connection_ready(7);
        assert_eq!(message.message_type, CONNECTION_READY);
        assert_eq!(message.data, serde_json::json!({ "user_id": 7 }));
    }

    #[tokio::test]
    async fn ping_replies_with_pong() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let sender: Arc<dyn ChannelSender> = Arc::new(RecordingSender(sent.clone()));
        let events = EventBus::new();
        handle_inbound(
            InboundMessage { message_type: "ping".to_string(), data: Value::Null },
            1,
            &sender,
            Arc::new(ExecutorRegistry::new()),
            Arc::new(ProviderRegistry::new()),
            events,
        )
        .await;

        let captured = sent.lock().await;
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].1.message_type, "pong");
    }

    #[tokio::test]
    async fn unknown_type_is_ignored_without_reply() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let sender: Arc<dyn ChannelSender> = Arc::new(RecordingSender(sent.clone()));
        let events = EventBus::new();
        handle_inbound(
            InboundMessage { message_type: "bogus".to_string(), data: Value::Null },
            1,
            &sender,
            Arc::new(ExecutorRegistry::new()),
            Arc::new(ProviderRegistry::new()),
            events,
        )
        .await;

        assert!(sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn execution_started_is_forwarded_to_the_right_user() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let sender: Arc<dyn ChannelSender> = Arc::new(RecordingSender(sent.clone()));
        let events = EventBus::new();
        install(&events, sender.clone());

        events.emit(Event::new(
            EXECUTION_STARTED,
            crate::event_payload! { "run_id" => "r1", "user_id" => 42, "flow_id" => "f1" },
        ));
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let captured = sent.lock().await;
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].0, 42);
        assert_eq!(captured[0].1.message_type, EXECUTION_STARTED);
    }

    #[tokio::test]
    async fn node_status_event_is_forwarded_exactly_once() {
        // NODE_PENDING/NODE_RUNNING/NODE_SKIPPED share one wire type; install
        // must not subscribe a separate handler per alias.
        let sent = Arc::new(Mutex::new(Vec::new()));
        let sender: Arc<dyn ChannelSender> = Arc::new(RecordingSender(sent.clone()));
        let events = EventBus::new();
        install(&events, sender.clone());

        events.emit(Event::new(
            NODE_PENDING,
            crate::event_payload! { "run_id" => "r1", "user_id" => 42, "node_id" => "a", "status" => "pending" },
        ));
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(sent.lock().await.len(), 1);
    }
}
