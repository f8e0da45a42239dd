//! Dockable viewport hosting the chart views.

use std::collections::HashMap;

use egui_dock::{DockArea, DockState, NodeIndex, Style};
use tracing::info;

use crate::chart_view::{ChartView, ViewId};
use crate::ViewerContext;

/// Manages the dock layout and the chart views inside it.
pub struct Viewport {
    dock_state: DockState<ViewId>,
    chart_views: HashMap<ViewId, Box<dyn ChartView>>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            dock_state: DockState::new(vec![]),
            chart_views: HashMap::new(),
        }
    }

    /// Build the dashboard layout: map and stream graph side by side on top,
    /// line chart across the bottom. Mounts all three views.
    pub fn dashboard_layout(
        &mut self,
        ctx: &ViewerContext,
        map: Box<dyn ChartView>,
        stream: Box<dyn ChartView>,
        line: Box<dyn ChartView>,
    ) {
        let map_id = map.id();
        let stream_id = stream.id();
        let line_id = line.id();

        let mut dock_state = DockState::new(vec![map_id]);
        let surface = dock_state.main_surface_mut();
        let [top, _bottom] = surface.split_below(NodeIndex::root(), 0.62, vec![line_id]);
        surface.split_right(top, 0.58, vec![stream_id]);
        self.dock_state = dock_state;

        for view in [map, stream, line] {
            self.mount_view(ctx, view);
        }
    }

    /// Add a single chart view to the first leaf of the dock.
    pub fn add_chart_view(&mut self, ctx: &ViewerContext, view: Box<dyn ChartView>) {
        let id = view.id();
        self.mount_view(ctx, view);
        self.dock_state.main_surface_mut().push_to_first_leaf(id);
    }

    fn mount_view(&mut self, ctx: &ViewerContext, mut view: Box<dyn ChartView>) {
        info!(view_type = view.view_type(), "mounting chart view");
        view.mount(ctx);
        self.chart_views.insert(view.id(), view);
    }

    /// Unmount a view and drop it. Returns true if the view existed.
    pub fn remove_chart_view(&mut self, id: ViewId) -> bool {
        if let Some(mut view) = self.chart_views.remove(&id) {
            info!(view_type = view.view_type(), "unmounting chart view");
            view.unmount();
            true
        } else {
            false
        }
    }

    /// Advance every mounted view by `dt` seconds.
    pub fn update(&mut self, ctx: &ViewerContext, dt: f32) {
        for view in self.chart_views.values_mut() {
            view.on_frame_update(ctx, dt);
        }
    }

    /// True while any view is animating and wants continuous repaints.
    pub fn any_animating(&self) -> bool {
        self.chart_views.values().any(|v| v.is_animating())
    }

    pub fn view_count(&self) -> usize {
        self.chart_views.len()
    }

    /// Unmount every view, e.g. on application exit.
    pub fn unmount_all(&mut self) {
        for (_, mut view) in self.chart_views.drain() {
            view.unmount();
        }
    }

    pub fn ui(&mut self, ctx: &ViewerContext, ui: &mut egui::Ui) {
        let mut tab_viewer = ViewportTabViewer {
            chart_views: &mut self.chart_views,
            ctx,
        };

        DockArea::new(&mut self.dock_state)
            .style(Style::from_egui(ui.style().as_ref()))
            .show_close_buttons(true)
            .draggable_tabs(true)
            .show_inside(ui, &mut tab_viewer);
    }
}

struct ViewportTabViewer<'a> {
    chart_views: &'a mut HashMap<ViewId, Box<dyn ChartView>>,
    ctx: &'a ViewerContext,
}

impl egui_dock::TabViewer for ViewportTabViewer<'_> {
    type Tab = ViewId;

    fn title(&mut self, tab: &mut Self::Tab) -> egui::WidgetText {
        self.chart_views
            .get(tab)
            .map(|v| v.display_name().to_owned())
            .unwrap_or_else(|| "Unknown".to_owned())
            .into()
    }

    fn ui(&mut self, ui: &mut egui::Ui, tab: &mut Self::Tab) {
        if let Some(view) = self.chart_views.get_mut(tab) {
            view.ui(self.ctx, ui);
        } else {
            ui.label("View not found");
        }
    }

    fn on_close(&mut self, tab: &mut Self::Tab) -> bool {
        if let Some(mut view) = self.chart_views.remove(tab) {
            view.unmount();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;

    use eco_core::{SelectionBus, ViewPhase};

    use super::*;

    struct TestView {
        id: ViewId,
        mounted: Arc<AtomicBool>,
        frames: Arc<AtomicU32>,
        animating: bool,
    }

    impl TestView {
        fn new(animating: bool) -> (Self, Arc<AtomicBool>, Arc<AtomicU32>) {
            let mounted = Arc::new(AtomicBool::new(false));
            let frames = Arc::new(AtomicU32::new(0));
            let view = Self {
                id: uuid::Uuid::new_v4(),
                mounted: mounted.clone(),
                frames: frames.clone(),
                animating,
            };
            (view, mounted, frames)
        }
    }

    impl ChartView for TestView {
        fn id(&self) -> ViewId {
            self.id
        }
        fn display_name(&self) -> &str {
            "Test"
        }
        fn view_type(&self) -> &str {
            "TestView"
        }
        fn title(&self) -> &str {
            "Test"
        }
        fn phase(&self) -> ViewPhase {
            if self.mounted.load(Ordering::Relaxed) {
                ViewPhase::Ready
            } else {
                ViewPhase::Unmounted
            }
        }
        fn mount(&mut self, _ctx: &ViewerContext) {
            self.mounted.store(true, Ordering::Relaxed);
        }
        fn unmount(&mut self) {
            self.mounted.store(false, Ordering::Relaxed);
        }
        fn on_frame_update(&mut self, _ctx: &ViewerContext, _dt: f32) {
            self.frames.fetch_add(1, Ordering::Relaxed);
        }
        fn ui(&mut self, _ctx: &ViewerContext, _ui: &mut egui::Ui) {}
        fn is_animating(&self) -> bool {
            self.animating
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    fn test_ctx() -> (ViewerContext, tokio::runtime::Runtime) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ctx = ViewerContext::new(Arc::new(SelectionBus::default()), runtime.handle().clone());
        (ctx, runtime)
    }

    #[test]
    fn test_dashboard_layout_mounts_all_views() {
        let (ctx, _rt) = test_ctx();
        let mut viewport = Viewport::new();
        let (map, map_mounted, _) = TestView::new(false);
        let (stream, stream_mounted, _) = TestView::new(false);
        let (line, line_mounted, _) = TestView::new(false);

        viewport.dashboard_layout(&ctx, Box::new(map), Box::new(stream), Box::new(line));

        assert_eq!(viewport.view_count(), 3);
        assert!(map_mounted.load(Ordering::Relaxed));
        assert!(stream_mounted.load(Ordering::Relaxed));
        assert!(line_mounted.load(Ordering::Relaxed));
    }

    #[test]
    fn test_remove_chart_view_unmounts() {
        let (ctx, _rt) = test_ctx();
        let mut viewport = Viewport::new();
        let (view, mounted, _) = TestView::new(false);
        let id = view.id();

        viewport.add_chart_view(&ctx, Box::new(view));
        assert!(mounted.load(Ordering::Relaxed));

        assert!(viewport.remove_chart_view(id));
        assert!(!mounted.load(Ordering::Relaxed));
        assert_eq!(viewport.view_count(), 0);
        assert!(!viewport.remove_chart_view(id));
    }

    #[test]
    fn test_update_fans_out_to_all_views() {
        let (ctx, _rt) = test_ctx();
        let mut viewport = Viewport::new();
        let (a, _, a_frames) = TestView::new(false);
        let (b, _, b_frames) = TestView::new(true);

        viewport.add_chart_view(&ctx, Box::new(a));
        viewport.add_chart_view(&ctx, Box::new(b));

        viewport.update(&ctx, 0.016);
        viewport.update(&ctx, 0.016);

        assert_eq!(a_frames.load(Ordering::Relaxed), 2);
        assert_eq!(b_frames.load(Ordering::Relaxed), 2);
        assert!(viewport.any_animating());
    }

    #[test]
    fn test_unmount_all() {
        let (ctx, _rt) = test_ctx();
        let mut viewport = Viewport::new();
        let (a, a_mounted, _) = TestView::new(false);
        let (b, b_mounted, _) = TestView::new(false);

        viewport.add_chart_view(&ctx, Box::new(a));
        viewport.add_chart_view(&ctx, Box::new(b));
        viewport.unmount_all();

        assert!(!a_mounted.load(Ordering::Relaxed));
        assert!(!b_mounted.load(Ordering::Relaxed));
        assert_eq!(viewport.view_count(), 0);
    }
}
