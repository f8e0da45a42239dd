//! Core coordination for the environmental dashboard
//!
//! This crate provides the selection bus that links the chart views,
//! the view lifecycle bookkeeping, and the transition timing engine.

pub mod bus;
pub mod lifecycle;
pub mod transition;

// Re-export commonly used types
pub use bus::{
    EventKind, PublishError, SelectionBus, SelectionEvent, SelectionMailbox, Subscription,
};
pub use lifecycle::{LoadSlot, MountToken, ViewPhase};
pub use transition::{Easing, Interval, Transition};
pub use source::DatasetSource;

/// Category every view filters by before the first selection is published.
pub const DEFAULT_CATEGORY: &str = "united states";

pub mod source {
    //! Loader seam between the data crate and the chart views.

    /// Trait for tabular dataset sources
    #[async_trait::async_trait]
    pub trait DatasetSource: Send + Sync {
        /// Load the full table
        async fn fetch(&self) -> anyhow::Result<arrow::record_batch::RecordBatch>;

        /// Get the source name/path
        fn source_name(&self) -> &str;
    }
}
