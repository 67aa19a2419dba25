//! # Loomgraph: a graph execution engine for LLM/image-generation workflows
//!
//! Loomgraph schedules a client-submitted graph of nodes and edges into
//! dependency levels, dispatches each level's nodes concurrently through a
//! registry of executors backed by pluggable text/image providers, and fans
//! progress out over a typed event bus.
//!
//! ## Core concepts
//!
//! - [`graph`] — the data model (`Node`, `Edge`, `ExecutionStep`), the edge
//!   classifier, the topological scheduler, and BFS ancestor/descendant
//!   traversal used for partial re-execution.
//! - [`model_resolver`] and [`scene`] — the per-node model resolution chain
//!   and the canonical scene-prompt/model-default tables.
//! - [`providers`] — text and image provider contracts plus the registries
//!   that look clients up by id.
//! - [`executors`] — the `node_type → Executor` registry and every
//!   built-in node type's behavior.
//! - [`event_bus`] — the process-wide typed publish/subscribe bus.
//! - [`runner`] and [`run_manager`] — the level-by-level dispatch loop and
//!   its run-submission entry point.
//! - [`bridge`] — the transport-facing translation between domain events
//!   and outbound channel messages.
//!
//! ## Quick start
//!
//! ```
//! use loomgraph::graph::{Edge, Node};
//! use loomgraph::graph::scheduler::schedule;
//! use rustc_hash::FxHashMap;
//!
//! let nodes = vec![
//!     Node { id: "a".into(), node_type: Some("initialPrompt".into()), data: FxHashMap::default() },
//!     Node { id: "b".into(), node_type: Some("textOutput".into()), data: FxHashMap::default() },
//! ];
//! let edges = vec![Edge { source: "a".into(), target: "b".into(), target_handle: None }];
//!
//! let plan = schedule(&nodes, &edges).unwrap();
//! assert_eq!(plan.steps.len(), 2);
//! ```

pub mod bridge;
pub mod config;
pub mod event_bus;
pub mod executors;
pub mod graph;
pub mod model_resolver;
pub mod providers;
pub mod run_manager;
pub mod runner;
pub mod scene;
pub mod telemetry;
