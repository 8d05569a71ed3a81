//! In-process publish/subscribe event bus.
//!
//! `EventBus` keeps its subscriptions and history behind an
//! `Arc<Mutex<_>>`, so clones share one bus and it can be handed to every
//! service that publishes or observes state changes.
//!
//! Delivery is synchronous: `publish` appends to history, then calls every
//! handler registered for the exact event type, then every wildcard handler.
//! The lock is released before any handler runs, so handlers may publish,
//! subscribe, or unsubscribe from inside a delivery.

use std::{
    collections::{HashMap, VecDeque},
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use tracing::{debug, error};

use nexus_contracts::{
    error::NexusResult,
    event::{event_types::WILDCARD, Event, EventPayload},
};

use crate::{config::BusConfig, traits::EventHandler};

// ── Internal mutable state ────────────────────────────────────────────────────

type HandlerEntry = (u64, Arc<dyn EventHandler>);

pub(crate) struct BusState {
    /// Handlers keyed by exact event type or `*`, in subscription order.
    handlers: HashMap<String, Vec<HandlerEntry>>,

    /// Published events, oldest first.
    pub(crate) history: VecDeque<Event>,

    /// `None` means unbounded.
    history_capacity: Option<usize>,

    next_id: u64,
}

impl BusState {
    fn record(&mut self, event: Event) {
        self.history.push_back(event);
        if let Some(capacity) = self.history_capacity {
            while self.history.len() > capacity {
                self.history.pop_front();
            }
        }
    }

    fn handlers_for(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        let exact = self.handlers.get(event_type).into_iter().flatten();
        let wildcard = if event_type == WILDCARD {
            None
        } else {
            self.handlers.get(WILDCARD)
        };
        exact
            .chain(wildcard.into_iter().flatten())
            .map(|(_, handler)| Arc::clone(handler))
            .collect()
    }
}

fn lock(state: &Mutex<BusState>) -> MutexGuard<'_, BusState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Public bus ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct EventBus {
    pub(crate) state: Arc<Mutex<BusState>>,
}

impl EventBus {
    /// A bus with unbounded history.
    pub fn new() -> Self {
        Self::with_config(&BusConfig::default())
    }

    pub fn with_config(config: &BusConfig) -> Self {
        let state = BusState {
            handlers: HashMap::new(),
            history: VecDeque::new(),
            history_capacity: config.history_capacity,
            next_id: 0,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Register `handler` for `event_type` (or `*` for every event).
    ///
    /// The returned `Subscription` removes exactly this registration.
    pub fn subscribe<F>(&self, event_type: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&Event) -> NexusResult<()> + Send + Sync + 'static,
    {
        self.subscribe_handler(event_type, Arc::new(handler))
    }

    /// Register a shared handler object.
    pub fn subscribe_handler(
        &self,
        event_type: impl Into<String>,
        handler: Arc<dyn EventHandler>,
    ) -> Subscription {
        let event_type = event_type.into();
        let mut state = lock(&self.state);
        let id = state.next_id;
        state.next_id += 1;
        state
            .handlers
            .entry(event_type.clone())
            .or_default()
            .push((id, handler));

        debug!(event_type = %event_type, subscription_id = id, "subscribed");

        Subscription {
            id,
            event_type,
            state: Arc::downgrade(&self.state),
        }
    }

    /// Append `event` to history and deliver it.
    ///
    /// A handler that returns `Err` or panics is logged and skipped; delivery
    /// to the remaining handlers continues and the publisher never sees it.
    pub fn publish(&self, event: Event) {
        let handlers = {
            let mut state = lock(&self.state);
            state.record(event.clone());
            state.handlers_for(&event.event_type)
        };

        debug!(
            event_type = %event.event_type,
            publisher = %event.publisher,
            handlers = handlers.len(),
            "publishing event"
        );

        for handler in handlers {
            match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(
                        event_type = %event.event_type,
                        event_id = %event.event_id.0,
                        error = %e,
                        "event handler failed"
                    );
                }
                Err(panic) => {
                    let message = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    error!(
                        event_type = %event.event_type,
                        event_id = %event.event_id.0,
                        panic = %message,
                        "event handler panicked"
                    );
                }
            }
        }
    }

    /// Build an event with a fresh id and timestamp, publish it, and return it.
    pub fn emit(
        &self,
        event_type: impl Into<String>,
        publisher: impl Into<String>,
        payload: EventPayload,
    ) -> Event {
        let event = Event::new(event_type, publisher, payload);
        self.publish(event.clone());
        event
    }

    /// Events in publish order, optionally filtered to one type.
    pub fn history(&self, event_type: Option<&str>) -> Vec<Event> {
        let state = lock(&self.state);
        match event_type {
            Some(wanted) => state
                .history
                .iter()
                .filter(|e| e.event_type == wanted)
                .cloned()
                .collect(),
            None => state.history.iter().cloned().collect(),
        }
    }

    pub fn clear_history(&self) {
        lock(&self.state).history.clear();
    }

    /// Number of live handlers registered under exactly `event_type`.
    pub fn subscriber_count(&self, event_type: &str) -> usize {
        lock(&self.state)
            .handlers
            .get(event_type)
            .map_or(0, Vec::len)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ── Subscription handle ───────────────────────────────────────────────────────

/// Handle to one registration on an `EventBus`.
///
/// Dropping the handle does not unsubscribe; call `unsubscribe`.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    event_type: String,
    state: Weak<Mutex<BusState>>,
}

impl Subscription {
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Remove this registration. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let mut state = lock(&state);
        if let Some(handlers) = state.handlers.get_mut(&self.event_type) {
            handlers.retain(|(id, _)| *id != self.id);
            if handlers.is_empty() {
                state.handlers.remove(&self.event_type);
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use nexus_contracts::{
        error::NexusError,
        event::{Event, EventPayload},
    };

    use super::EventBus;
    use crate::config::BusConfig;

    fn event(event_type: &str) -> Event {
        Event::new(event_type, "test", EventPayload::empty())
    }

    /// Subscribes a handler that records the type of every event it sees.
    fn recorder(bus: &EventBus, event_type: &str) -> (Arc<Mutex<Vec<String>>>, super::Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = bus.subscribe(event_type, move |e: &Event| {
            sink.lock().unwrap().push(e.event_type.clone());
            Ok(())
        });
        (seen, sub)
    }

    #[test]
    fn exact_subscription_only_sees_its_type() {
        let bus = EventBus::new();
        let (seen, _sub) = recorder(&bus, "lead.discovered");

        bus.publish(event("lead.discovered"));
        bus.publish(event("stress.detected"));

        assert_eq!(*seen.lock().unwrap(), vec!["lead.discovered"]);
    }

    #[test]
    fn wildcard_sees_everything_in_publish_order() {
        let bus = EventBus::new();
        let (seen, _sub) = recorder(&bus, "*");

        bus.publish(event("a.one"));
        bus.publish(event("b.two"));
        bus.publish(event("c.three"));

        assert_eq!(*seen.lock().unwrap(), vec!["a.one", "b.two", "c.three"]);
    }

    #[test]
    fn publishing_wildcard_type_delivers_once() {
        let bus = EventBus::new();
        let (seen, _sub) = recorder(&bus, "*");

        bus.publish(event("*"));

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery_and_keeps_history() {
        let bus = EventBus::new();
        let (seen, sub) = recorder(&bus, "*");

        bus.publish(event("x.first"));
        sub.unsubscribe();
        bus.publish(event("x.second"));

        assert_eq!(*seen.lock().unwrap(), vec!["x.first"]);
        assert_eq!(bus.history(None).len(), 2);
    }

    #[test]
    fn double_unsubscribe_is_noop() {
        let bus = EventBus::new();
        let (_seen_a, a) = recorder(&bus, "t.x");
        let (seen_b, _b) = recorder(&bus, "t.x");

        a.unsubscribe();
        a.unsubscribe();
        assert_eq!(bus.subscriber_count("t.x"), 1);

        bus.publish(event("t.x"));
        assert_eq!(seen_b.lock().unwrap().len(), 1);
    }

    #[test]
    fn failing_and_panicking_handlers_do_not_stop_delivery() {
        let bus = EventBus::new();
        let _err = bus.subscribe("t.x", |_e: &Event| {
            Err(NexusError::HandlerFailed { reason: "boom".to_string() })
        });
        let _panic = bus.subscribe("t.x", |_e: &Event| -> nexus_contracts::error::NexusResult<()> {
            panic!("handler exploded")
        });
        let (seen, _ok) = recorder(&bus, "t.x");
        let (wild, _w) = recorder(&bus, "*");

        bus.publish(event("t.x"));

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(wild.lock().unwrap().len(), 1);
    }

    #[test]
    fn handler_may_publish_reentrantly() {
        let bus = EventBus::new();
        let inner = bus.clone();
        let _relay = bus.subscribe("first.step", move |_e: &Event| {
            inner.publish(event("second.step"));
            Ok(())
        });
        let (seen, _sub) = recorder(&bus, "second.step");

        bus.publish(event("first.step"));

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(bus.history(None).len(), 2);
    }

    #[test]
    fn history_filters_by_type() {
        let bus = EventBus::new();
        bus.publish(event("a.x"));
        bus.publish(event("b.x"));
        bus.publish(event("a.x"));

        assert_eq!(bus.history(Some("a.x")).len(), 2);
        assert_eq!(bus.history(Some("b.x")).len(), 1);
        assert!(bus.history(Some("c.x")).is_empty());

        bus.clear_history();
        assert!(bus.history(None).is_empty());
    }

    #[test]
    fn bounded_history_keeps_latest_events() {
        let bus = EventBus::with_config(&BusConfig { history_capacity: Some(2) });
        bus.publish(event("e.one"));
        bus.publish(event("e.two"));
        bus.publish(event("e.three"));

        let types: Vec<String> = bus.history(None).into_iter().map(|e| e.event_type).collect();
        assert_eq!(types, vec!["e.two", "e.three"]);
    }

    #[test]
    fn emit_records_the_returned_event() {
        let bus = EventBus::new();
        let emitted = bus.emit("lead.discovered", "external", EventPayload::empty());

        let history = bus.history(Some("lead.discovered"));
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].event_id, emitted.event_id);
    }
}
