//! Selection bus implementation

use super::{EventHandler, EventKind, PublishError, SelectionEvent};
use ahash::AHashMap;
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::debug;

/// The process-wide selection bus.
///
/// Handlers for a channel run synchronously, in registration order, under
/// the registry lock; a handler must not publish from inside its own
/// callback. Re-subscribing under a consumer key that is already registered
/// replaces the old handler in place, keeping its original position in the
/// dispatch order.
pub struct SelectionBus {
    channels: Arc<Mutex<AHashMap<EventKind, IndexMap<String, EventHandler>>>>,
    selection: Arc<RwLock<String>>,
}

impl SelectionBus {
    /// Create a bus whose selection starts at the given default category
    pub fn new(default_category: impl Into<String>) -> Self {
        Self {
            channels: Arc::new(Mutex::new(AHashMap::new())),
            selection: Arc::new(RwLock::new(default_category.into())),
        }
    }

    /// The current selection: the default category until the first publish,
    /// afterwards the label carried by the most recent publish.
    pub fn current(&self) -> String {
        self.selection.read().clone()
    }

    /// Register exactly one handler for the (kind, consumer) pair.
    ///
    /// Safe to call again across view remounts: the old handler is dropped
    /// and never invoked after this returns.
    pub fn subscribe(&self, kind: EventKind, consumer: impl Into<String>, handler: EventHandler) {
        let consumer = consumer.into();
        let mut channels = self.channels.lock();
        let replaced = channels
            .entry(kind)
            .or_default()
            .insert(consumer.clone(), handler)
            .is_some();
        debug!(channel = kind.channel_name(), %consumer, replaced, "subscribed");
    }

    /// Remove the handler for the (kind, consumer) pair.
    ///
    /// Calling this for a pair that was never registered is a no-op.
    /// Returns whether a handler was actually removed.
    pub fn unsubscribe(&self, kind: EventKind, consumer: &str) -> bool {
        let mut channels = self.channels.lock();
        let removed = channels
            .get_mut(&kind)
            .and_then(|channel| channel.shift_remove(consumer))
            .is_some();
        if removed {
            debug!(channel = kind.channel_name(), consumer, "unsubscribed");
        }
        removed
    }

    /// Publish an event: update the bus-owned selection, then notify every
    /// handler on the event's channel in registration order.
    ///
    /// Does not return until all notified handlers have run. The first
    /// handler error aborts delivery to the handlers after it and is
    /// returned with the failing consumer's key; the event is not persisted
    /// or redelivered.
    pub fn publish(&self, event: SelectionEvent) -> Result<(), PublishError> {
        let kind = event.kind();
        {
            let SelectionEvent::CountrySelected { country } = &event;
            *self.selection.write() = country.clone();
        }

        let mut channels = self.channels.lock();
        if let Some(channel) = channels.get_mut(&kind) {
            for (consumer, handler) in channel.iter_mut() {
                handler(&event).map_err(|message| PublishError {
                    consumer: consumer.clone(),
                    kind,
                    message,
                })?;
            }
        }
        Ok(())
    }

    /// Number of live handlers on a channel
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.channels
            .lock()
            .get(&kind)
            .map_or(0, |channel| channel.len())
    }
}

impl Default for SelectionBus {
    fn default() -> Self {
        Self::new(crate::DEFAULT_CATEGORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_handler(log: &Arc<Mutex<Vec<String>>>, tag: &str) -> EventHandler {
        let log = log.clone();
        let tag = tag.to_string();
        Box::new(move |event| {
            log.lock().push(format!("{}:{}", tag, event.category()));
            Ok(())
        })
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = SelectionBus::default();
        let result = bus.publish(SelectionEvent::country_selected("France"));
        assert!(result.is_ok());
        assert_eq!(bus.current(), "France");
    }

    #[test]
    fn test_default_category_until_first_publish() {
        let bus = SelectionBus::default();
        assert_eq!(bus.current(), crate::DEFAULT_CATEGORY);

        bus.publish(SelectionEvent::country_selected("Brazil"))
            .unwrap();
        assert_eq!(bus.current(), "Brazil");
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let bus = SelectionBus::default();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe(
            EventKind::CountrySelected,
            "line",
            recording_handler(&log, "line"),
        );
        bus.subscribe(
            EventKind::CountrySelected,
            "stream",
            recording_handler(&log, "stream"),
        );

        bus.publish(SelectionEvent::country_selected("India"))
            .unwrap();
        assert_eq!(&*log.lock(), &["line:India", "stream:India"]);
    }

    #[test]
    fn test_resubscribe_replaces_handler_in_place() {
        let bus = SelectionBus::default();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe(
            EventKind::CountrySelected,
            "line",
            recording_handler(&log, "old"),
        );
        bus.subscribe(
            EventKind::CountrySelected,
            "stream",
            recording_handler(&log, "stream"),
        );
        // Remount: same consumer key, new handler.
        bus.subscribe(
            EventKind::CountrySelected,
            "line",
            recording_handler(&log, "new"),
        );

        assert_eq!(bus.subscriber_count(EventKind::CountrySelected), 2);
        bus.publish(SelectionEvent::country_selected("China"))
            .unwrap();
        assert_eq!(&*log.lock(), &["new:China", "stream:China"]);
    }

    #[test]
    fn test_unsubscribe_absent_is_noop() {
        let bus = SelectionBus::default();
        assert!(!bus.unsubscribe(EventKind::CountrySelected, "nobody"));

        bus.subscribe(EventKind::CountrySelected, "line", Box::new(|_| Ok(())));
        assert!(bus.unsubscribe(EventKind::CountrySelected, "line"));
        assert!(!bus.unsubscribe(EventKind::CountrySelected, "line"));
        assert_eq!(bus.subscriber_count(EventKind::CountrySelected), 0);
    }

    #[test]
    fn test_selection_visible_to_handlers() {
        let bus = Arc::new(SelectionBus::default());
        let seen = Arc::new(Mutex::new(String::new()));

        let bus_ref = bus.clone();
        let seen_ref = seen.clone();
        bus.subscribe(
            EventKind::CountrySelected,
            "probe",
            Box::new(move |_| {
                *seen_ref.lock() = bus_ref.current();
                Ok(())
            }),
        );

        bus.publish(SelectionEvent::country_selected("Canada"))
            .unwrap();
        assert_eq!(&*seen.lock(), "Canada");
    }

    #[test]
    fn test_failing_handler_aborts_delivery() {
        let bus = SelectionBus::default();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe(
            EventKind::CountrySelected,
            "broken",
            Box::new(|_| Err("lost its surface".to_string())),
        );
        bus.subscribe(
            EventKind::CountrySelected,
            "stream",
            recording_handler(&log, "stream"),
        );

        let err = bus
            .publish(SelectionEvent::country_selected("Kenya"))
            .unwrap_err();
        assert_eq!(err.consumer, "broken");
        assert_eq!(err.kind, EventKind::CountrySelected);
        assert!(log.lock().is_empty());
        // The selection state was still updated before dispatch began.
        assert_eq!(bus.current(), "Kenya");
    }
}
