//! End-to-end scenarios exercising the scheduler, runner, and event bus
//! together over small graphs with stub providers.

use std::sync::Arc;

use async_trait::async_trait;
use loomgraph::event_bus::{EXECUTION_COMPLETED, EXECUTION_FAILED, EventBus, NODE_COMPLETED, NODE_FAILED, NODE_PENDING};
use loomgraph::executors::ExecutorRegistry;
use loomgraph::graph::{Edge, Node};
use loomgraph::providers::{ChatMessage, ProviderError, ProviderRegistry, TextProvider};
use loomgraph::runner::{RunContext, run_execution};
use rustc_hash::FxHashMap;
use serde_json::json;
use tokio::sync::Mutex;

fn node(id: &str, node_type: &str, data: &[(&str, serde_json::Value)]) -> Node {
    Node {
        id: id.to_string(),
        node_type: Some(node_type.to_string()),
        data: data.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
    }
}

fn edge(source: &str, target: &str, handle: Option<&str>) -> Edge {
    Edge { source: source.to_string(), target: target.to_string(), target_handle: handle.map(str::to_string) }
}

/// Echoes back `"ES[" + last_message + "]"` regardless of model/temperature,
/// used for S1's translator step.
struct SpanishEchoProvider;

#[async_trait]
impl TextProvider for SpanishEchoProvider {
    async fn chat(&self, messages: &[ChatMessage], _model: &str, _temperature: f64, _max_tokens: u32) -> Result<String, ProviderError> {
        let input = &messages.last().expect("at least one message").content;
        Ok(format!("ES[{input}]"))
    }
}

/// Returns whatever text it's asked to enhance verbatim for prompt-enhancer
/// calls, and prefixes `"[name:description] "` for persona-injection calls
/// (detected by the presence of a persona name/description in the prompt).
struct PassthroughWithPersonaPrefix;

#[async_trait]
impl TextProvider for PassthroughWithPersonaPrefix {
    async fn chat(&self, messages: &[ChatMessage], _model: &str, _temperature: f64, _max_tokens: u32) -> Result<String, ProviderError> {
        let system = messages.iter().find(|m| m.role == "system").map(|m| m.content.as_str()).unwrap_or_default();
        let user = messages.last().expect("at least one message").content.clone();
        if system.contains("persona") || system.contains("Persona") || system.contains("character") {
            Ok(format!("[Ada:red hair] {user}"))
        } else {
            Ok(user)
        }
    }
}

fn events_of_type(log: &[loomgraph::event_bus::Event], event_type: &str) -> Vec<loomgraph::event_bus::Event> {
    log.iter().filter(|e| e.event_type == event_type).cloned().collect()
}

/// `execution.node.status` events filtered by payload `status`, since
/// `NODE_PENDING`/`NODE_RUNNING`/`NODE_SKIPPED` all share that one wire type.
fn node_status_events(log: &[loomgraph::event_bus::Event], status: &str) -> Vec<loomgraph::event_bus::Event> {
    events_of_type(log, NODE_PENDING)
        .into_iter()
        .filter(|e| e.payload.get("status").and_then(serde_json::Value::as_str) == Some(status))
        .collect()
}

async fn recording_bus() -> (EventBus, Arc<Mutex<Vec<loomgraph::event_bus::Event>>>) {
    let bus = EventBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    // NODE_PENDING/NODE_RUNNING/NODE_SKIPPED alias the same event-bus key,
    // so each distinct key below is listed exactly once.
    for event_type in ["execution.started", EXECUTION_COMPLETED, EXECUTION_FAILED, NODE_PENDING, NODE_COMPLETED, NODE_FAILED] {
        let log = log.clone();
        bus.on(event_type, move |event| {
            let log = log.clone();
            async move {
                log.lock().await.push(event);
                Ok(())
            }
        });
    }
    (bus, log)
}

#[tokio::test]
async fn s1_straight_line_text_pipeline() {
    let nodes = vec![
        node("A", "initialPrompt", &[("text", json!("hello"))]),
        node("B", "translator", &[("language", json!("es")), ("providerId", json!("stub")), ("model", json!("m"))]),
        node("C", "textOutput", &[]),
    ];
    let edges = vec![edge("A", "B", None), edge("B", "C", None)];

    let executors = ExecutorRegistry::with_builtins();
    let mut providers = ProviderRegistry::new();
    providers.register_text("stub", Arc::new(SpanishEchoProvider));

    let (events, log) = recording_bus().await;
    let ctx = RunContext {
        run_id: "s1".to_string(),
        user_id: 1,
        flow_id: "f1".to_string(),
        provider_id: "stub".to_string(),
        trigger_node_id: None,
        cached_outputs: FxHashMap::default(),
    };
    let outputs = run_execution(ctx, &nodes, &edges, &executors, &providers, &events).await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    assert_eq!(outputs["C"].text.as_deref(), Some("ES[hello]"));

    let log = log.lock().await;
    assert_eq!(node_status_events(&log, "pending").len(), 3);
    assert_eq!(node_status_events(&log, "running").len(), 3);
    assert_eq!(events_of_type(&log, NODE_COMPLETED).len(), 3);
    assert_eq!(events_of_type(&log, EXECUTION_COMPLETED).len(), 1);
}

#[tokio::test]
async fn s2_diamond_with_persona_adapter() {
    let nodes = vec![
        node("P", "consistentCharacter", &[("characterName", json!("Ada")), ("characterDescription", json!("red hair"))]),
        node("S", "sceneBuilder", &[("imageStyle", json!("anime"))]),
        node(
            "M",
            "promptEnhancer",
            &[("providerId", json!("stub")), ("model", json!("m"))],
        ),
        node("O", "textOutput", &[]),
    ];
    let edges = vec![
        edge("P", "M", Some("adapter-0")),
        edge("S", "M", None),
        edge("M", "O", None),
    ];

    let executors = ExecutorRegistry::with_builtins();
    let mut providers = ProviderRegistry::new();
    providers.register_text("stub", Arc::new(PassthroughWithPersonaPrefix));

    let (events, _log) = recording_bus().await;
    let ctx = RunContext {
        run_id: "s2".to_string(),
        user_id: 1,
        flow_id: "f1".to_string(),
        provider_id: "stub".to_string(),
        trigger_node_id: None,
        cached_outputs: FxHashMap::default(),
    };
    let outputs = run_execution(ctx, &nodes, &edges, &executors, &providers, &events).await;

    let final_text = outputs["O"].text.as_deref().unwrap_or_default();
    assert!(final_text.starts_with("[Ada:red hair] Anime art style"), "got: {final_text}");
}

#[tokio::test]
async fn s3_cycle_rejection_emits_execution_failed_and_no_node_events() {
    let nodes = vec![node("A", "textOutput", &[]), node("B", "textOutput", &[])];
    let edges = vec![edge("A", "B", None), edge("B", "A", None)];

    let executors = ExecutorRegistry::with_builtins();
    let providers = ProviderRegistry::new();
    let (events, log) = recording_bus().await;
    let ctx = RunContext {
        run_id: "s3".to_string(),
        user_id: 1,
        flow_id: "f1".to_string(),
        provider_id: "stub".to_string(),
        trigger_node_id: None,
        cached_outputs: FxHashMap::default(),
    };
    let outputs = run_execution(ctx, &nodes, &edges, &executors, &providers, &events).await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    assert!(outputs.is_empty());
    let log = log.lock().await;
    assert_eq!(events_of_type(&log, EXECUTION_FAILED).len(), 1);
    assert!(events_of_type(&log, EXECUTION_FAILED)[0].payload["error"].as_str().unwrap().contains("cycle"));
    assert!(events_of_type(&log, NODE_PENDING).is_empty());
}

struct BoomProvider;
#[async_trait]
impl TextProvider for BoomProvider {
    async fn chat(&self, _messages: &[ChatMessage], _model: &str, _temperature: f64, _max_tokens: u32) -> Result<String, ProviderError> {
        Err(ProviderError::Request("boom".to_string()))
    }
}

#[tokio::test]
async fn s4_upstream_failure_cascades_to_skip() {
    let nodes = vec![
        node("A", "translator", &[("language", json!("es")), ("providerId", json!("stub")), ("model", json!("m"))]),
        node("B", "textOutput", &[]),
        node("C", "textOutput", &[]),
    ];
    let edges = vec![edge("A", "B", None), edge("B", "C", None)];

    let executors = ExecutorRegistry::with_builtins();
    let mut providers = ProviderRegistry::new();
    providers.register_text("stub", Arc::new(BoomProvider));

    let (events, _log) = recording_bus().await;
    let ctx = RunContext {
        run_id: "s4".to_string(),
        user_id: 1,
        flow_id: "f1".to_string(),
        provider_id: "stub".to_string(),
        trigger_node_id: None,
        cached_outputs: FxHashMap::default(),
    };
    let outputs = run_execution(ctx, &nodes, &edges, &executors, &providers, &events).await;

    assert!(outputs["A"].error.as_deref().unwrap().contains("boom"));
    assert_eq!(outputs["B"].error.as_deref(), Some("Upstream node A failed"));
    assert_eq!(outputs["C"].error.as_deref(), Some("Upstream node B failed"));
}

#[tokio::test]
async fn s5_partial_re_execution_with_cache_matches_full_run() {
    let nodes = vec![
        node("A", "initialPrompt", &[("text", json!("a"))]),
        node("B", "translator", &[("language", json!("es")), ("providerId", json!("stub")), ("model", json!("m"))]),
        node("C", "textOutput", &[]),
    ];
    let edges = vec![edge("A", "B", None), edge("B", "C", None)];

    let executors = ExecutorRegistry::with_builtins();
    let mut providers = ProviderRegistry::new();
    providers.register_text("stub", Arc::new(SpanishEchoProvider));

    let (events, _log) = recording_bus().await;
    let full_ctx = RunContext {
        run_id: "full".to_string(),
        user_id: 1,
        flow_id: "f1".to_string(),
        provider_id: "stub".to_string(),
        trigger_node_id: None,
        cached_outputs: FxHashMap::default(),
    };
    let full = run_execution(full_ctx, &nodes, &edges, &executors, &providers, &events).await;

    let mut cached = FxHashMap::default();
    cached.insert("A".to_string(), full["A"].clone());
    let partial_ctx = RunContext {
        run_id: "partial".to_string(),
        user_id: 1,
        flow_id: "f1".to_string(),
        provider_id: "stub".to_string(),
        trigger_node_id: Some("B".to_string()),
        cached_outputs: cached,
    };
    let partial = run_execution(partial_ctx, &nodes, &edges, &executors, &providers, &events).await;

    assert_eq!(partial["B"].text, full["B"].text);
    assert_eq!(partial["C"].text, full["C"].text);
}

#[tokio::test]
async fn s7_aspect_ratio_mapping_end_to_end_invariant() {
    use loomgraph::providers::aspect_ratio_for_dimensions;
    assert_eq!(aspect_ratio_for_dimensions(1024, 768), "4:3");
    assert_eq!(aspect_ratio_for_dimensions(1000, 500), "2:1");
}
