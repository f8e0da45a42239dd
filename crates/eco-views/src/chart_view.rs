//! The `ChartView` trait that all dashboard views implement.

use eco_core::ViewPhase;

use crate::ViewerContext;

/// Unique identifier for a chart view instance.
pub type ViewId = uuid::Uuid;

/// A chart view that can be docked in the viewport.
///
/// Views go through an explicit lifecycle: [`ChartView::mount`] subscribes to
/// the bus and kicks off the dataset load, [`ChartView::unmount`] tears all of
/// that down again. Between the two, [`ChartView::on_frame_update`] advances
/// timers and transitions and [`ChartView::ui`] draws the current state.
pub trait ChartView: Send + Sync {
    /// Unique id of this view instance.
    fn id(&self) -> ViewId;

    /// Short name shown on the dock tab.
    fn display_name(&self) -> &str;

    /// Type of view, e.g. "ChoroplethMap".
    fn view_type(&self) -> &str;

    /// Heading drawn above the chart. May change with the selection.
    fn title(&self) -> &str;

    /// Current lifecycle phase.
    fn phase(&self) -> ViewPhase;

    /// Bring the view up: subscribe to the bus and start loading data.
    ///
    /// Calling this on an already mounted view is a no-op.
    fn mount(&mut self, ctx: &ViewerContext);

    /// Tear the view down: drop subscriptions, stop timers, discard data.
    ///
    /// A load still in flight keeps running but its result is discarded.
    fn unmount(&mut self);

    /// Advance timers and transitions by `dt` seconds.
    fn on_frame_update(&mut self, ctx: &ViewerContext, dt: f32);

    /// Render the view.
    fn ui(&mut self, ctx: &ViewerContext, ui: &mut egui::Ui);

    /// True while a transition or timer wants another frame soon.
    fn is_animating(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
