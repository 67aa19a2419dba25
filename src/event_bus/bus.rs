//! Process-wide typed publish/subscribe with fire-and-forget async delivery.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::warn;

use super::event::Event;

/// Error a handler can return from its fallible tail; logged, never
/// propagated to the emitter or to sibling handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), HandlerError>> + Send>>;

/// An event handler: takes the event by value, returns a future the bus
/// spawns as an independent task.
pub trait Handler: Fn(Event) -> HandlerFuture + Send + Sync {}
impl<T: Fn(Event) -> HandlerFuture + Send + Sync> Handler for T {}

/// Opaque handle returned by [`EventBus::on`], used to unregister via [`EventBus::off`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    handler: Arc<dyn Handler>,
}

/// Process-wide event bus. Registration (`on`/`off`) and delivery (`emit`)
/// are both safe to call concurrently from any task.
#[derive(Clone)]
pub struct EventBus {
    subscriptions: Arc<Mutex<FxHashMap<String, Vec<Subscription>>>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscriptions: Arc::new(Mutex::new(FxHashMap::default())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register `handler` for `event_type`. Returns an id that can later be
    /// passed to [`EventBus::off`].
    pub fn on<F, Fut>(&self, event_type: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let boxed: Arc<dyn Handler> = Arc::new(move |event| Box::pin(handler(event)) as HandlerFuture);
        self.subscriptions
            .lock()
            .entry(event_type.into())
            .or_default()
            .push(Subscription { id, handler: boxed });
        id
    }

    /// Unregister a previously-registered handler. No-op if `id` is unknown
    /// or already removed.
    pub fn off(&self, event_type: &str, id: SubscriptionId) {
        if let Some(subs) = self.subscriptions.lock().get_mut(event_type) {
            subs.retain(|s| s.id != id);
        }
    }

    /// Snapshot the handler list for `event.event_type` and schedule each as
    /// an independent task. Returns as soon as every handler has been
    /// enqueued — it never awaits a handler's completion.
    pub fn emit(&self, event: Event) {
        let handlers: Vec<Arc<dyn Handler>> = self
            .subscriptions
            .lock()
            .get(&event.event_type)
            .map(|subs| subs.iter().map(|s| s.handler.clone()).collect())
            .unwrap_or_default();

        for handler in handlers {
            let event = event.clone();
            let event_type = event.event_type.clone();
            tokio::spawn(async move {
                if let Err(err) = handler(event).await {
                    warn!(event_type, %err, "event handler failed");
                }
            });
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
