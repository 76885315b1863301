//! # Event Bus System
//!
//! In-process publish/subscribe hub used to decouple cache invalidation and
//! UI refresh from the component performing a write.
//!
//! ## Overview
//!
//! The event bus is a callback registry keyed by event name:
//! - **Listeners**: registered with [`EventBus::on`] (persistent) or
//!   [`EventBus::once`] (removed after first invocation)
//! - **Dispatch**: [`EventBus::emit`] invokes listeners synchronously, in
//!   registration order, against a snapshot of the listener list taken at
//!   emit time
//! - **Isolation**: a listener returning an error is logged and skipped;
//!   dispatch continues to subsequent listeners
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    emit      ┌───────────┐
//! │ Repositories ├─────────────>│           │
//! └──────────────┘              │ EventBus  │   snapshot     ┌────────────┐
//! ┌──────────────┐    emit      │ (listener ├───────────────>│ Listeners  │
//! │ UI / Forms   ├─────────────>│ registry) │   dispatch     └────────────┘
//! └──────────────┘              └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{topics, EventBus};
//! use serde_json::json;
//!
//! let bus = EventBus::new();
//! let sub = bus.on(topics::ENTITY_SAVED, |payload| {
//!     println!("saved: {payload}");
//!     Ok(())
//! });
//!
//! bus.emit(topics::ENTITY_SAVED, json!({ "collection": "books", "id": "b1" }));
//! sub.unsubscribe();
//! ```
//!
//! Event names are opaque strings; the [`topics`] module pins the well-known
//! vocabulary so the rest of the system never spells names by hand. The bus
//! itself is name-agnostic.
//!
//! ## Thread Safety
//!
//! The bus is `Send + Sync` and cheap to clone (clones share the registry).
//! `emit` never suspends; all listeners run synchronously in the caller's
//! turn, so listeners must not block.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use tracing::warn;

/// Well-known event names.
///
/// Named constants to avoid typographical drift between emitters and
/// subscribers. Other components rely on this vocabulary for
/// cache-invalidation-driven UI refresh.
pub mod topics {
    /// An entity was created or its fields were updated.
    pub const ENTITY_SAVED: &str = "entity:saved";
    /// An entity was deleted (hard or soft).
    pub const ENTITY_DELETED: &str = "entity:deleted";
    /// A soft-deleted entity was restored.
    pub const ENTITY_RESTORED: &str = "entity:restored";
    /// A collection cache was replaced by a fresh fetch.
    pub const COLLECTION_REFRESHED: &str = "collection:refreshed";

    pub const SERIES_CREATED: &str = "series:created";
    pub const SERIES_UPDATED: &str = "series:updated";
    pub const SERIES_DELETED: &str = "series:deleted";

    pub const FORM_DIRTY: &str = "form:dirty";
    pub const FORM_CLEAN: &str = "form:clean";
    pub const FORM_SUBMITTED: &str = "form:submitted";

    pub const MODAL_OPENED: &str = "modal:opened";
    pub const MODAL_CLOSED: &str = "modal:closed";

    pub const AUTH_CHANGED: &str = "auth:changed";

    pub const SYNC_STARTED: &str = "sync:started";
    pub const SYNC_COMPLETED: &str = "sync:completed";
    pub const SYNC_FAILED: &str = "sync:failed";
}

/// Opaque event payload. Emitters attach whatever JSON shape their
/// subscribers expect; the bus never inspects it.
pub type EventPayload = Value;

/// Listener callback. Returning an error does not abort dispatch; the error
/// is logged at the emit site.
pub type ListenerResult = anyhow::Result<()>;

type ListenerFn = dyn Fn(&EventPayload) -> ListenerResult + Send + Sync;

/// Identity of one registered listener.
///
/// Closures are not comparable in Rust, so removal by "the same callback"
/// is expressed through the id issued at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct ListenerEntry {
    id: ListenerId,
    once: bool,
    callback: Arc<ListenerFn>,
}

#[derive(Default)]
struct Registry {
    listeners: HashMap<String, Vec<ListenerEntry>>,
    next_id: u64,
}

impl Registry {
    fn remove(&mut self, event: &str, id: ListenerId) -> bool {
        let Some(entries) = self.listeners.get_mut(event) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            self.listeners.remove(event);
        }
        removed
    }
}

/// Capability to remove exactly the listener it was returned for.
///
/// [`Subscription::unsubscribe`] is idempotent: calling it twice is a no-op
/// the second time. Dropping a subscription does NOT remove the listener;
/// removal is always explicit.
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    event: String,
    id: ListenerId,
}

impl Subscription {
    /// The identity of the registered listener, usable with [`EventBus::off`].
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Remove the listener. No-op if it was already removed (e.g. a `once`
    /// listener that has fired, or a previous `unsubscribe` call).
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .lock()
                .expect("event registry poisoned")
                .remove(&self.event, self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("id", &self.id)
            .finish()
    }
}

/// Central event bus for publishing and subscribing to named events.
///
/// One instance is typically shared process-wide, but instances are fully
/// independent; tests construct their own.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a persistent listener for `event`.
    pub fn on<F>(&self, event: &str, callback: F) -> Subscription
    where
        F: Fn(&EventPayload) -> ListenerResult + Send + Sync + 'static,
    {
        self.register(event, callback, false)
    }

    /// Register a listener that is removed automatically immediately after
    /// its first invocation, before any later listener in the same emit
    /// batch runs.
    pub fn once<F>(&self, event: &str, callback: F) -> Subscription
    where
        F: Fn(&EventPayload) -> ListenerResult + Send + Sync + 'static,
    {
        self.register(event, callback, true)
    }

    fn register<F>(&self, event: &str, callback: F, once: bool) -> Subscription
    where
        F: Fn(&EventPayload) -> ListenerResult + Send + Sync + 'static,
    {
        let mut registry = self.lock();
        registry.next_id += 1;
        let id = ListenerId(registry.next_id);
        registry
            .listeners
            .entry(event.to_string())
            .or_default()
            .push(ListenerEntry {
                id,
                once,
                callback: Arc::new(callback),
            });
        Subscription {
            registry: Arc::downgrade(&self.registry),
            event: event.to_string(),
            id,
        }
    }

    /// Remove a previously registered listener by id. No-op (returns false)
    /// if it is not currently registered.
    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        self.lock().remove(event, id)
    }

    /// Invoke every current listener for `event` synchronously, in
    /// registration order. Returns the number of listeners invoked.
    ///
    /// Dispatch runs against a snapshot of the listener list taken at emit
    /// time: a listener that subscribes or unsubscribes during emission
    /// affects future dispatches only. A listener returning an error is
    /// logged and does not prevent subsequent listeners from running.
    pub fn emit(&self, event: &str, payload: EventPayload) -> usize {
        let snapshot: Vec<(ListenerId, bool, Arc<ListenerFn>)> = {
            let registry = self.lock();
            registry
                .listeners
                .get(event)
                .map(|entries| {
                    entries
                        .iter()
                        .map(|e| (e.id, e.once, Arc::clone(&e.callback)))
                        .collect()
                })
                .unwrap_or_default()
        };

        let mut invoked = 0;
        for (id, once, callback) in snapshot {
            if once {
                // Removed before the callback runs so a nested emit from
                // within the callback cannot fire it a second time.
                self.lock().remove(event, id);
            }
            if let Err(error) = callback(&payload) {
                warn!(event, listener = ?id, %error, "event listener failed");
            }
            invoked += 1;
        }
        invoked
    }

    /// Whether any listener is registered for `event`.
    pub fn has_listeners(&self, event: &str) -> bool {
        self.listener_count(event) > 0
    }

    /// Number of listeners currently registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.lock()
            .listeners
            .get(event)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// All event names with at least one registered listener.
    pub fn event_names(&self) -> Vec<String> {
        self.lock().listeners.keys().cloned().collect()
    }

    /// Remove every listener for `event`.
    pub fn clear(&self, event: &str) {
        self.lock().listeners.remove(event);
    }

    /// Remove every listener for every event.
    pub fn clear_all(&self) {
        self.lock().listeners.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().expect("event registry poisoned")
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("event_names", &self.event_names())
            .finish()
    }
}
