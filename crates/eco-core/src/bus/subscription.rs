use super::{EventHandler, EventKind, SelectionBus, SelectionEvent};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Scoped registration on the bus.
///
/// Holding the guard keeps the handler registered; dropping it removes the
/// handler on every exit path, so a view cannot leak its subscription across
/// remounts or early unmounts.
pub struct Subscription {
    bus: Weak<SelectionBus>,
    kind: EventKind,
    consumer: String,
}

impl Subscription {
    /// Register a handler and tie its lifetime to the returned guard
    pub fn new(
        bus: &Arc<SelectionBus>,
        kind: EventKind,
        consumer: impl Into<String>,
        handler: EventHandler,
    ) -> Self {
        let consumer = consumer.into();
        bus.subscribe(kind, consumer.clone(), handler);
        Self {
            bus: Arc::downgrade(bus),
            kind,
            consumer,
        }
    }

    /// Consumer key this guard is registered under
    pub fn consumer(&self) -> &str {
        &self.consumer
    }

    /// Channel this guard is registered on
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.kind, &self.consumer);
        }
    }
}

/// Consumer-side slot a handler writes selections into.
///
/// Bus dispatch happens during publish; views pick the new selection up on
/// their next frame update by draining the mailbox. Only the most recent
/// selection is kept.
#[derive(Clone, Default)]
pub struct SelectionMailbox {
    pending: Arc<Mutex<Option<String>>>,
}

impl SelectionMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler that stores every received selection in the mailbox
    pub fn handler(&self) -> EventHandler {
        let pending = self.pending.clone();
        Box::new(move |event| {
            let SelectionEvent::CountrySelected { country } = event;
            *pending.lock() = Some(country.clone());
            Ok(())
        })
    }

    /// Take the most recent selection, leaving the mailbox empty
    pub fn take(&self) -> Option<String> {
        self.pending.lock().take()
    }
}
