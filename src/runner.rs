//! The execution runner: walks a scheduled plan level by level, dispatching
//! every step in a level concurrently and recording outputs into a single
//! shared map.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::{info, instrument};

use crate::event_bus::{EXECUTION_COMPLETED, EXECUTION_FAILED, EventBus, Event, NODE_COMPLETED, NODE_FAILED, NODE_PENDING, NODE_RUNNING, NODE_SKIPPED, NodeStatus};
use crate::event_payload;
use crate::executors::ExecutorRegistry;
use crate::graph::scheduler::{Schedule, schedule};
use crate::graph::traversal::{ancestors, descendants};
use crate::graph::{Edge, ExecutionStep, Node, NodeExecutionContext, NodeOutput};
use crate::model_resolver;
use crate::providers::ProviderRegistry;

/// Everything one call to [`run_execution`] needs beyond the graph itself.
pub struct RunContext {
    pub run_id: String,
    pub user_id: i64,
    pub flow_id: String,
    pub provider_id: String,
    pub trigger_node_id: Option<String>,
    pub cached_outputs: FxHashMap<String, NodeOutput>,
}

/// Run one execution to completion, returning the final output map.
///
/// Emits the full event sequence documented in the component design
/// (`EXECUTION_STARTED` is the caller's responsibility — see
/// [`crate::run_manager::run`] — this function starts from scheduling and
/// emits everything from `NODE_PENDING` through `EXECUTION_COMPLETED`, or
/// `EXECUTION_FAILED` if the graph cannot be scheduled).
#[instrument(skip_all, fields(run_id = %ctx.run_id, flow_id = %ctx.flow_id))]
pub async fn run_execution(
    ctx: RunContext,
    nodes: &[Node],
    edges: &[Edge],
    executors: &ExecutorRegistry,
    providers: &ProviderRegistry,
    events: &EventBus,
) -> FxHashMap<String, NodeOutput> {
    let plan = match schedule(nodes, edges) {
        Ok(plan) => plan,
        Err(err) => {
            events.emit(Event::new(
                EXECUTION_FAILED,
                event_payload! {
                    "run_id" => ctx.run_id,
                    "error" => format!("cycle: {err}"),
                },
            ));
            return FxHashMap::default();
        }
    };

    let outputs: Arc<Mutex<FxHashMap<String, NodeOutput>>> = Arc::new(Mutex::new(FxHashMap::default()));
    let levels = restrict_to_execution_set(plan, &ctx, nodes, edges, &outputs);

    for step in levels.iter().flatten() {
        if !outputs.lock().contains_key(&step.node_id) {
            events.emit(Event::new(
                NODE_PENDING,
                event_payload! {
                    "run_id" => ctx.run_id,
                    "node_id" => step.node_id.clone(),
                    "status" => NodeStatus::Pending.as_str(),
                },
            ));
        }
    }

    for level in &levels {
        let tasks = level.iter().map(|step| {
            dispatch_node(
                step,
                &ctx.run_id,
                ctx.user_id,
                &ctx.provider_id,
                nodes,
                executors,
                providers,
                events,
                &outputs,
                &ctx.cached_outputs,
            )
        });
        futures_util::future::join_all(tasks).await;
    }

    let snapshot = outputs.lock().clone();
    events.emit(Event::new(
        EXECUTION_COMPLETED,
        event_payload! {
            "run_id" => ctx.run_id,
            "outputs" => serialize_outputs(&snapshot),
        },
    ));
    info!(nodes = snapshot.len(), "execution completed");
    snapshot
}

fn serialize_outputs(outputs: &FxHashMap<String, NodeOutput>) -> Value {
    let map: serde_json::Map<String, Value> = outputs.iter().map(|(id, out)| (id.clone(), out.to_sparse_json())).collect();
    Value::Object(map)
}

/// Apply partial re-execution: restrict the step levels to the trigger's
/// downstream closure plus any non-cached ancestor, pre-loading cached
/// ancestor outputs into the shared map.
fn restrict_to_execution_set(
    plan: Schedule,
    ctx: &RunContext,
    nodes: &[Node],
    edges: &[Edge],
    outputs: &Arc<Mutex<FxHashMap<String, NodeOutput>>>,
) -> Vec<Vec<ExecutionStep>> {
    let Some(trigger) = &ctx.trigger_node_id else {
        return plan.levels;
    };

    let downstream = descendants(trigger, nodes, edges);
    let upstream = ancestors(trigger, nodes, edges);

    let mut execution_set = downstream;
    execution_set.insert(trigger.clone());

    {
        let mut guard = outputs.lock();
        for node_id in &upstream {
            if let Some(cached) = ctx.cached_outputs.get(node_id) {
                guard.insert(node_id.clone(), cached.clone());
            } else {
                execution_set.insert(node_id.clone());
            }
        }
    }

    plan.levels
        .into_iter()
        .map(|level| level.into_iter().filter(|step| execution_set.contains(&step.node_id)).collect::<Vec<_>>())
        .filter(|level: &Vec<ExecutionStep>| !level.is_empty())
        .collect()
}

#[allow(clippy::too_many_arguments)]
#[instrument(skip_all, fields(node_id = %step.node_id, node_type = %step.node_type))]
async fn dispatch_node(
    step: &ExecutionStep,
    run_id: &str,
    user_id: i64,
    flow_provider_id: &str,
    nodes: &[Node],
    executors: &ExecutorRegistry,
    providers: &ProviderRegistry,
    events: &EventBus,
    outputs: &Arc<Mutex<FxHashMap<String, NodeOutput>>>,
    cached_outputs: &FxHashMap<String, NodeOutput>,
) {
    if outputs.lock().contains_key(&step.node_id) {
        return;
    }

    if let Some(cached) = cached_outputs.get(&step.node_id) {
        outputs.lock().insert(step.node_id.clone(), cached.clone());
        events.emit(Event::new(
            NODE_COMPLETED,
            event_payload! {
                "run_id" => run_id,
                "node_id" => step.node_id.clone(),
                "output" => cached.to_sparse_json(),
            },
        ));
        return;
    }

    let failed_dependency = {
        let guard = outputs.lock();
        step.all_dependencies().find(|dep| guard.get(*dep).is_some_and(NodeOutput::is_error)).cloned()
    };
    if let Some(dep) = failed_dependency {
        let reason = format!("Upstream node {dep} failed");
        outputs.lock().insert(step.node_id.clone(), NodeOutput::error(reason.clone()));
        emit_skipped(events, run_id, &step.node_id, &reason);
        return;
    }

    let Some(executor) = executors.get(&step.node_type) else {
        let reason = format!("No executor for type: {}", step.node_type);
        outputs.lock().insert(step.node_id.clone(), NodeOutput::error(reason.clone()));
        emit_skipped(events, run_id, &step.node_id, &reason);
        return;
    };

    let (text_inputs, adapter_inputs) = {
        let guard = outputs.lock();
        (
            step.input_node_ids.iter().filter_map(|dep| guard.get(dep).cloned()).collect::<Vec<_>>(),
            step.adapter_node_ids.iter().filter_map(|dep| guard.get(dep).cloned()).collect::<Vec<_>>(),
        )
    };

    let Some(node) = nodes.iter().find(|n| n.id == step.node_id) else {
        return;
    };
    let resolved = model_resolver::resolve(node, flow_provider_id);

    let execution_ctx = NodeExecutionContext {
        node_id: step.node_id.clone(),
        node_type: step.node_type.clone(),
        node_data: node.data.clone(),
        text_inputs,
        adapter_inputs,
        provider_id: resolved.provider_id,
        model: resolved.model,
        temperature: resolved.temperature,
        run_id: run_id.to_string(),
        user_id,
    };

    events.emit(Event::new(
        NODE_RUNNING,
        event_payload! {
            "run_id" => run_id,
            "node_id" => step.node_id.clone(),
            "status" => NodeStatus::Running.as_str(),
        },
    ));

    let started = std::time::Instant::now();
    match executor.execute(&execution_ctx, providers).await {
        Ok(mut output) => {
            if output.duration_ms.is_none() {
                output.duration_ms = Some(started.elapsed().as_secs_f64() * 1000.0);
            }
            let is_error = output.is_error();
            outputs.lock().insert(step.node_id.clone(), output.clone());
            if is_error {
                events.emit(Event::new(
                    NODE_FAILED,
                    event_payload! {
                        "run_id" => run_id,
                        "node_id" => step.node_id.clone(),
                        "error" => output.error.clone().unwrap_or_default(),
                    },
                ));
            } else {
                events.emit(Event::new(
                    NODE_COMPLETED,
                    event_payload! {
                        "run_id" => run_id,
                        "node_id" => step.node_id.clone(),
                        "output" => output.to_sparse_json(),
                    },
                ));
            }
        }
        Err(err) => {
            let message = err.to_string();
            outputs.lock().insert(step.node_id.clone(), NodeOutput::error(message.clone()));
            events.emit(Event::new(
                NODE_FAILED,
                event_payload! {
                    "run_id" => run_id,
                    "node_id" => step.node_id.clone(),
                    "error" => message,
                },
            ));
        }
    }
}

fn emit_skipped(events: &EventBus, run_id: &str, node_id: &str, reason: &str) {
    events.emit(Event::new(
        NODE_SKIPPED,
        event_payload! {
            "run_id" => run_id,
            "node_id" => node_id,
            "status" => NodeStatus::Skipped.as_str(),
            "error" => reason,
        },
    ));
}
