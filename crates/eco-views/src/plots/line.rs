//! Line chart of population growth rate for the selected country.
//!
//! Subscribes to country selections on the bus. When the selection changes
//! the plotted path morphs from the old series to the new one; when the new
//! selection has no rows the chart clears and shows a message instead.

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use eco_core::{
    DatasetSource, EventKind, LoadSlot, MountToken, SelectionMailbox, Subscription, Transition,
    ViewPhase,
};
use eco_data::filter::{extent, filter_rows};
use eco_data::{numeric_column, string_column};
use egui::Color32;
use egui_plot::{Line, Plot, PlotBounds, PlotPoints};
use tracing::{debug, error};

use crate::chart_view::{ChartView, ViewId};
use crate::plots::utils::{
    empty_ui, error_ui, interpolate_points, lerp_domain, loading_ui, padded_domain, with_opacity,
};
use crate::ViewerContext;

const VALUE_COLUMN: &str = "population_growth_rate";

/// Steel blue stroke for the series.
const LINE_COLOR: Color32 = Color32::from_rgb(70, 130, 180);

/// Line chart view of population growth over time.
pub struct LineChartView {
    id: ViewId,
    title: String,
    phase: ViewPhase,
    source: Arc<dyn DatasetSource>,
    token: MountToken,
    slot: LoadSlot<Result<RecordBatch, String>>,
    mailbox: SelectionMailbox,
    subscription: Option<Subscription>,
    table: Option<GrowthTable>,
    selection: String,
    /// Latest target shape, None when the selection has no rows.
    current: Option<SeriesShape>,
    anim: Option<SeriesAnim>,
    load_error: Option<String>,
}

impl LineChartView {
    pub fn new(source: Arc<dyn DatasetSource>) -> Self {
        let selection = eco_core::DEFAULT_CATEGORY.to_owned();
        Self {
            id: uuid::Uuid::new_v4(),
            title: title_for(&selection),
            phase: ViewPhase::Unmounted,
            source,
            token: MountToken::new(),
            slot: LoadSlot::new(),
            mailbox: SelectionMailbox::new(),
            subscription: None,
            table: None,
            selection,
            current: None,
            anim: None,
            load_error: None,
        }
    }

    fn consumer_key(&self) -> String {
        format!("line-chart/{}", self.id)
    }

    fn poll_load(&mut self, ctx: &ViewerContext) {
        let Some(result) = self.slot.take() else {
            return;
        };
        match result.and_then(|batch| GrowthTable::from_batch(&batch)) {
            Ok(table) => {
                debug!(rows = table.years.len(), "population growth data ready");
                self.table = Some(table);
                self.selection = ctx.bus.current();
                self.title = title_for(&self.selection);
                self.rebuild_series(false);
                self.phase = ViewPhase::Ready;
            }
            Err(message) => {
                error!(error = %message, "population growth load failed");
                self.load_error = Some(message);
                self.phase = ViewPhase::Failed;
            }
        }
    }

    fn apply_selection(&mut self, selection: String) {
        if selection == self.selection && self.table.is_some() {
            return;
        }
        self.selection = selection;
        self.title = title_for(&self.selection);
        self.rebuild_series(true);
    }

    /// Recompute the target shape for the current selection, optionally
    /// animating from whatever is on screen right now.
    fn rebuild_series(&mut self, animate: bool) {
        let Some(table) = &self.table else {
            return;
        };
        let target = series_for(table, &self.selection);
        if !animate {
            self.current = target;
            self.anim = None;
            return;
        }

        let from = self.displayed_shape();
        self.anim = None;
        match (from, target) {
            (Some(from), Some(to)) => {
                self.anim = Some(SeriesAnim {
                    from,
                    to: to.clone(),
                    transition: Transition::primary(),
                    fade_in: false,
                });
                self.current = Some(to);
                self.phase = ViewPhase::Updating;
            }
            (None, Some(to)) => {
                self.anim = Some(SeriesAnim {
                    from: to.clone(),
                    to: to.clone(),
                    transition: Transition::primary(),
                    fade_in: true,
                });
                self.current = Some(to);
                self.phase = ViewPhase::Updating;
            }
            (_, None) => {
                // nothing to morph toward, the message takes over at once
                self.current = None;
                self.phase = ViewPhase::Ready;
            }
        }
    }

    /// Shape as drawn this frame, mid-animation included.
    fn displayed_shape(&self) -> Option<SeriesShape> {
        match &self.anim {
            Some(anim) => Some(anim.shape_at(anim.transition.progress())),
            None => self.current.clone(),
        }
    }
}

impl ChartView for LineChartView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        "Population Growth"
    }

    fn view_type(&self) -> &str {
        "PopulationLineChart"
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn phase(&self) -> ViewPhase {
        self.phase
    }

    fn mount(&mut self, ctx: &ViewerContext) {
        if self.phase.is_mounted() {
            return;
        }
        self.phase = ViewPhase::Loading;
        self.load_error = None;
        self.token = MountToken::new();
        self.slot = LoadSlot::new();
        self.selection = ctx.bus.current();
        self.title = title_for(&self.selection);

        // stable consumer key, remounting replaces the old registration
        self.subscription = Some(Subscription::new(
            &ctx.bus,
            EventKind::CountrySelected,
            self.consumer_key(),
            self.mailbox.handler(),
        ));

        let token = self.token.clone();
        let slot = self.slot.clone();
        let source = Arc::clone(&self.source);
        ctx.runtime_handle.spawn(async move {
            let result = source.fetch().await.map_err(|e| e.to_string());
            if token.is_active() {
                slot.put(result);
            } else {
                debug!("population growth load finished after unmount, discarding");
            }
        });
    }

    fn unmount(&mut self) {
        self.subscription = None;
        self.token.revoke();
        self.slot = LoadSlot::new();
        self.table = None;
        self.current = None;
        self.anim = None;
        self.phase = ViewPhase::Unmounted;
    }

    fn on_frame_update(&mut self, ctx: &ViewerContext, dt: f32) {
        if self.phase == ViewPhase::Loading {
            self.poll_load(ctx);
        }
        if let Some(selection) = self.mailbox.take() {
            self.apply_selection(selection);
        }
        if let Some(anim) = &mut self.anim {
            if anim.transition.advance(dt) {
                self.anim = None;
                if self.phase == ViewPhase::Updating {
                    self.phase = ViewPhase::Ready;
                }
            }
        }
    }

    fn ui(&mut self, _ctx: &ViewerContext, ui: &mut egui::Ui) {
        match self.phase {
            ViewPhase::Unmounted => return,
            ViewPhase::Loading => {
                loading_ui(ui, "Loading population growth...");
                return;
            }
            ViewPhase::Failed => {
                let message = self.load_error.as_deref().unwrap_or("dataset load failed");
                error_ui(ui, message);
                return;
            }
            ViewPhase::Ready | ViewPhase::Updating => {}
        }

        ui.heading(&self.title);

        let drawn = match (&self.anim, &self.current) {
            (Some(anim), _) => {
                let t = anim.transition.progress();
                let shape = anim.shape_at(t);
                let alpha = if anim.fade_in { t } else { 1.0 };
                Some((shape, alpha))
            }
            (None, Some(shape)) => Some((shape.clone(), 1.0)),
            (None, None) => None,
        };
        let Some((shape, alpha)) = drawn else {
            empty_ui(
                ui,
                &format!("no data available for {}", self.selection.to_lowercase()),
            );
            return;
        };

        let (x0, x1) = padded_domain(shape.x_domain);
        let (y0, y1) = padded_domain(shape.y_domain);
        Plot::new(self.id)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .x_axis_label("Year")
            .y_axis_label("Growth Rate")
            .x_axis_formatter(|mark, _range| format!("{:.0}", mark.value))
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([x0, y0], [x1, y1]));
                let color = if alpha < 1.0 {
                    with_opacity(LINE_COLOR, alpha)
                } else {
                    LINE_COLOR
                };
                let series = Line::new(PlotPoints::new(shape.points.clone()))
                    .color(color)
                    .width(2.0);
                plot_ui.line(series);
            });
    }

    fn is_animating(&self) -> bool {
        self.anim.is_some()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

fn title_for(selection: &str) -> String {
    format!("Population Growth Rate in {}", selection.to_lowercase())
}

/// Columnar growth-rate table.
struct GrowthTable {
    years: Vec<f64>,
    countries: Vec<String>,
    rates: Vec<f64>,
}

impl GrowthTable {
    fn from_batch(batch: &RecordBatch) -> Result<Self, String> {
        Ok(Self {
            years: numeric_column(batch, "year").map_err(|e| e.to_string())?,
            countries: string_column(batch, "country").map_err(|e| e.to_string())?,
            rates: numeric_column(batch, VALUE_COLUMN).map_err(|e| e.to_string())?,
        })
    }
}

/// One drawable series with the axis domains derived from it alone.
#[derive(Clone, Debug, PartialEq)]
struct SeriesShape {
    points: Vec<[f64; 2]>,
    x_domain: (f64, f64),
    y_domain: (f64, f64),
}

struct SeriesAnim {
    from: SeriesShape,
    to: SeriesShape,
    transition: Transition,
    fade_in: bool,
}

impl SeriesAnim {
    fn shape_at(&self, t: f64) -> SeriesShape {
        if self.fade_in {
            return self.to.clone();
        }
        SeriesShape {
            points: interpolate_points(&self.from.points, &self.to.points, t),
            x_domain: lerp_domain(self.from.x_domain, self.to.x_domain, t),
            y_domain: lerp_domain(self.from.y_domain, self.to.y_domain, t),
        }
    }
}

/// Rows for `selection`, in dataset order, NaN rows dropped.
fn series_for(table: &GrowthTable, selection: &str) -> Option<SeriesShape> {
    let rows = filter_rows(&table.countries, selection);
    let points: Vec<[f64; 2]> = rows
        .iter()
        .filter_map(|&i| {
            let x = table.years[i];
            let y = table.rates[i];
            (x.is_finite() && y.is_finite()).then_some([x, y])
        })
        .collect();
    if points.is_empty() {
        return None;
    }
    let x_domain = extent(points.iter().map(|p| p[0]))?;
    let y_domain = extent(points.iter().map(|p| p[1]))?;
    Some(SeriesShape {
        points,
        x_domain,
        y_domain,
    })
}
