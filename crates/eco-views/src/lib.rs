//! Chart views for the environmental dashboard.
//!
//! Each view is a [`ChartView`] hosted in a dockable [`Viewport`]. Views are
//! linked through the shared [`SelectionBus`]: the map publishes country
//! selections, the line and stream charts consume them.

pub mod chart_view;
pub mod plots;
pub mod viewport;

pub use chart_view::{ChartView, ViewId};
pub use viewport::Viewport;

use std::sync::Arc;

use eco_core::SelectionBus;
use parking_lot::RwLock;

/// Shared context passed to every chart view each frame.
#[derive(Clone)]
pub struct ViewerContext {
    /// Selection bus linking the views together.
    pub bus: Arc<SelectionBus>,
    /// Runtime handle for background dataset loads.
    pub runtime_handle: tokio::runtime::Handle,
    /// Frame statistics, surfaced in the status bar.
    pub frame_time: Arc<RwLock<FrameTime>>,
}

impl ViewerContext {
    pub fn new(bus: Arc<SelectionBus>, runtime_handle: tokio::runtime::Handle) -> Self {
        Self {
            bus,
            runtime_handle,
            frame_time: Arc::new(RwLock::new(FrameTime::default())),
        }
    }
}

/// Rolling frame-time statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameTime {
    pub avg_frame_ms: f32,
    pub max_frame_ms: f32,
}

impl FrameTime {
    /// Fold one frame's duration into the rolling average.
    pub fn record(&mut self, frame_ms: f32) {
        if self.avg_frame_ms == 0.0 {
            self.avg_frame_ms = frame_ms;
        } else {
            self.avg_frame_ms = self.avg_frame_ms * 0.95 + frame_ms * 0.05;
        }
        self.max_frame_ms = self.max_frame_ms.max(frame_ms);
    }
}
