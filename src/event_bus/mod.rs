//! Typed publish/subscribe event bus used to fan execution progress out to
//! transport bridges and other observers.
//!
//! The module is organised around [`EventBus`], a process-wide `on`/`off`/
//! `emit` registry, and [`Event`], the wire-format occurrence every domain
//! event is expressed as.

pub mod bus;
pub mod event;

pub use bus::{EventBus, HandlerError, SubscriptionId};
pub use event::{
    EXECUTION_COMPLETED, EXECUTION_FAILED, EXECUTION_STARTED, Event, NODE_COMPLETED, NODE_FAILED,
    NODE_PENDING, NODE_RUNNING, NODE_SKIPPED, NodeStatus,
};
