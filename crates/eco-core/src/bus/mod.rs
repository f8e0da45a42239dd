//! Selection bus: the publish/subscribe channel linking the chart views
//!
//! A click on the map publishes a [`SelectionEvent`]; the line chart and
//! streamgraph subscribe and re-filter. Events are a closed set of tagged
//! variants rather than string-keyed payloads, and the bus itself owns the
//! current selection so any view can read it without having observed the
//! last publish.

mod engine;
mod subscription;

pub use engine::SelectionBus;
pub use subscription::{SelectionMailbox, Subscription};

/// Events carried by the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// A country was picked on the map; the label is already canonical.
    CountrySelected { country: String },
}

impl SelectionEvent {
    /// Build the country-selection event
    pub fn country_selected(country: impl Into<String>) -> Self {
        SelectionEvent::CountrySelected {
            country: country.into(),
        }
    }

    /// The channel this event is dispatched on
    pub fn kind(&self) -> EventKind {
        match self {
            SelectionEvent::CountrySelected { .. } => EventKind::CountrySelected,
        }
    }

    /// The category label the event carries
    pub fn category(&self) -> &str {
        match self {
            SelectionEvent::CountrySelected { country } => country,
        }
    }
}

/// Channel key, one per event variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CountrySelected,
}

impl EventKind {
    /// Wire-level channel name
    pub fn channel_name(&self) -> &'static str {
        match self {
            EventKind::CountrySelected => "countrySelected",
        }
    }
}

/// Handler invoked synchronously during publish.
///
/// A handler that returns an error aborts delivery to the handlers
/// registered after it; see [`SelectionBus::publish`].
pub type EventHandler = Box<dyn FnMut(&SelectionEvent) -> Result<(), String> + Send>;

/// Error returned by a publish whose delivery was aborted by a handler
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("subscriber '{consumer}' failed handling {kind:?}: {message}")]
pub struct PublishError {
    /// Consumer key of the failing handler
    pub consumer: String,
    /// Channel the event was dispatched on
    pub kind: EventKind,
    /// Error text the handler returned
    pub message: String,
}
