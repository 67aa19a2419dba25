//! Entry point for submitting a run: assigns a run id, announces it on the
//! event bus, and hands the actual work to a detached runner task.

use std::sync::Arc;

use futures_util::FutureExt;
use rustc_hash::FxHashMap;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::event_bus::{EXECUTION_FAILED, EXECUTION_STARTED, EventBus, Event};
use crate::event_payload;
use crate::executors::ExecutorRegistry;
use crate::graph::{Edge, Node, NodeOutput};
use crate::providers::ProviderRegistry;
use crate::runner::{RunContext, run_execution};

/// A client-submitted run request, as carried in the HTTP POST body or the
/// `execution.start` channel message (§6).
pub struct RunRequest {
    pub flow_id: String,
    pub user_id: i64,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub provider_id: String,
    pub trigger_node_id: Option<String>,
    pub cached_outputs: FxHashMap<String, NodeOutput>,
}

/// Generate a run id, emit `EXECUTION_STARTED`, spawn the runner detached,
/// and return the run id immediately — the caller never awaits node work.
#[instrument(skip_all, fields(flow_id = %request.flow_id, user_id = request.user_id))]
pub fn run(
    request: RunRequest,
    executors: Arc<ExecutorRegistry>,
    providers: Arc<ProviderRegistry>,
    events: EventBus,
) -> String {
    let run_id = Uuid::new_v4().to_string();

    events.emit(Event::new(
        EXECUTION_STARTED,
        event_payload! {
            "run_id" => run_id.clone(),
            "user_id" => request.user_id,
            "flow_id" => request.flow_id.clone(),
        },
    ));

    let spawned_run_id = run_id.clone();
    tokio::spawn(async move {
        let ctx = RunContext {
            run_id: spawned_run_id.clone(),
            user_id: request.user_id,
            flow_id: request.flow_id,
            provider_id: request.provider_id,
            trigger_node_id: request.trigger_node_id,
            cached_outputs: request.cached_outputs,
        };
        let result = std::panic::AssertUnwindSafe(run_execution(
            ctx,
            &request.nodes,
            &request.edges,
            &executors,
            &providers,
            &events,
        ))
        .catch_unwind()
        .await;

        if result.is_err() {
            error!(run_id = %spawned_run_id, "runner task panicked");
            events.emit(Event::new(
                EXECUTION_FAILED,
                event_payload! {
                    "run_id" => spawned_run_id,
                    "error" => "internal error during execution",
                },
            ));
        }
    });

    run_id
}
