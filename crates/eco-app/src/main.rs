//! Environmental data dashboard.
//!
//! Three linked chart views in a dockable layout: a choropleth world map that
//! cycles through years of risk scores, a line chart of population growth and
//! a stream graph of stacked environmental measures. Clicking a country on
//! the map drives the other two charts through the selection bus.

mod sample_data;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use eco_core::{SelectionBus, DEFAULT_CATEGORY};
use eco_data::CsvSource;
use eco_ui::{apply_theme, AppShell, Theme};
use eco_views::plots::{ChoroplethView, LineChartView, StreamGraphView};
use eco_views::{ViewerContext, Viewport};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Environmental Data Dashboard")
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Environmental Data Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(EcoDashApp::new(cc)?))),
    )
}

struct EcoDashApp {
    /// Keeps the background runtime alive for the app's lifetime.
    _runtime: tokio::runtime::Runtime,
    viewer_context: ViewerContext,
    viewport: Viewport,
    shell: AppShell,
    data_dir: PathBuf,
}

impl EcoDashApp {
    fn new(cc: &eframe::CreationContext<'_>) -> anyhow::Result<Self> {
        apply_theme(&cc.egui_ctx, &Theme::default());

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("failed to start background runtime")?;

        let data_dir = PathBuf::from("data");
        sample_data::ensure_sample_data(&data_dir).context("failed to prepare sample datasets")?;

        let bus = Arc::new(SelectionBus::new(DEFAULT_CATEGORY));
        let viewer_context = ViewerContext::new(bus, runtime.handle().clone());

        let mut app = Self {
            _runtime: runtime,
            viewer_context,
            viewport: Viewport::new(),
            shell: AppShell::new(),
            data_dir,
        };
        app.build_dashboard();
        Ok(app)
    }

    /// Mount a fresh set of views in the default layout.
    fn build_dashboard(&mut self) {
        self.viewport.unmount_all();
        self.viewport = Viewport::new();

        let map = ChoroplethView::new(
            self.data_dir.join("world.geojson"),
            Arc::new(CsvSource::new(
                self.data_dir.join("global_population_risk.csv"),
            )),
        );
        let line = LineChartView::new(Arc::new(CsvSource::new(
            self.data_dir.join("population_growth.csv"),
        )));
        let stream = StreamGraphView::new(Arc::new(CsvSource::new(
            self.data_dir.join("population_ozone_environment.csv"),
        )));

        self.viewport.dashboard_layout(
            &self.viewer_context,
            Box::new(map),
            Box::new(stream),
            Box::new(line),
        );
        info!("dashboard ready");
    }
}

impl eframe::App for EcoDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // cap pauses so animations do not jump after a stall
        let dt = ctx.input(|i| i.stable_dt).min(0.1);
        self.viewer_context.frame_time.write().record(dt * 1000.0);

        self.viewport.update(&self.viewer_context, dt);

        let shell_response = self.shell.top_bar(ctx);
        if shell_response.reset_layout {
            self.build_dashboard();
        }

        let selection = self.viewer_context.bus.current();
        let frame_stats = {
            let ft = self.viewer_context.frame_time.read();
            Some((ft.avg_frame_ms, ft.max_frame_ms))
        };
        self.shell.status_bar(ctx, &selection, frame_stats);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.viewport.ui(&self.viewer_context, ui);
        });

        if self.viewport.any_animating() {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("shutting down, unmounting views");
        self.viewport.unmount_all();
    }
}
