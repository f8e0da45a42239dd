//! Stream graph of stacked environmental measures for the selected country.
//!
//! Three measures are stacked bottom-up in a fixed order and smoothed with a
//! B-spline at draw time. Selection changes morph the stack; a selection with
//! no rows fades the old stack out while the message appears at once.

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use eco_core::{
    DatasetSource, EventKind, LoadSlot, MountToken, SelectionMailbox, Subscription, Transition,
    ViewPhase,
};
use eco_data::filter::filter_rows;
use eco_data::{numeric_column, string_column};
use egui::Color32;
use egui_plot::{Legend, Plot, PlotBounds, PlotPoint, PlotPoints, Polygon, Text};
use tracing::{debug, error};

use crate::chart_view::{ChartView, ViewId};
use crate::plots::utils::{
    basis_curve, empty_ui, error_ui, interpolate_points, lerp_domain, loading_ui, measure_color,
    padded_domain, with_opacity,
};
use crate::ViewerContext;

/// Samples per segment when smoothing layer outlines.
const CURVE_SAMPLES: usize = 8;

/// The stacked environmental measures, bottom layer first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Measure {
    CfcConsumption,
    IndustrializationIndex,
    PolicyScore,
}

impl Measure {
    pub const ALL: [Measure; 3] = [
        Measure::CfcConsumption,
        Measure::IndustrializationIndex,
        Measure::PolicyScore,
    ];

    /// Dataset column holding this measure.
    pub fn column(self) -> &'static str {
        match self {
            Measure::CfcConsumption => "cfc_consumption",
            Measure::IndustrializationIndex => "industrialization_index",
            Measure::PolicyScore => "policy_score",
        }
    }

    /// Legend label.
    pub fn label(self) -> &'static str {
        match self {
            Measure::CfcConsumption => "CFC Consumption",
            Measure::IndustrializationIndex => "Industrialization Index",
            Measure::PolicyScore => "Policy Score",
        }
    }

    pub fn color(self) -> Color32 {
        measure_color(self as usize)
    }
}

/// Stream graph view of the stacked measures over time.
pub struct StreamGraphView {
    id: ViewId,
    title: String,
    phase: ViewPhase,
    source: Arc<dyn DatasetSource>,
    token: MountToken,
    slot: LoadSlot<Result<RecordBatch, String>>,
    mailbox: SelectionMailbox,
    subscription: Option<Subscription>,
    table: Option<OzoneTable>,
    selection: String,
    /// Latest target stack, None when the selection has no rows.
    current: Option<StackShape>,
    anim: Option<StreamAnim>,
    load_error: Option<String>,
}

impl StreamGraphView {
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
        format!("stream-graph/{}", self.id)
    }

    fn poll_load(&mut self, ctx: &ViewerContext) {
        let Some(result) = self.slot.take() else {
            return;
        };
        match result.and_then(|batch| OzoneTable::from_batch(&batch)) {
            Ok(table) => {
                debug!(rows = table.years.len(), "environmental data ready");
                self.table = Some(table);
                self.selection = ctx.bus.current();
                self.title = title_for(&self.selection);
                self.rebuild_stack(false);
                self.phase = ViewPhase::Ready;
            }
            Err(message) => {
                error!(error = %message, "environmental data load failed");
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
        self.rebuild_stack(true);
    }

    fn rebuild_stack(&mut self, animate: bool) {
        let Some(table) = &self.table else {
            return;
        };
        let target = stack_for(table, &self.selection);
        if !animate {
            self.current = target;
            self.anim = None;
            return;
        }

        let from = self.displayed_stack();
        self.anim = None;
        match (from, target) {
            (Some(from), Some(to)) => {
                self.anim = Some(StreamAnim {
                    from: Some(from),
                    to: Some(to.clone()),
                    transition: Transition::primary(),
                });
                self.current = Some(to);
                self.phase = ViewPhase::Updating;
            }
            (None, Some(to)) => {
                self.anim = Some(StreamAnim {
                    from: None,
                    to: Some(to.clone()),
                    transition: Transition::primary(),
                });
                self.current = Some(to);
                self.phase = ViewPhase::Updating;
            }
            (Some(from), None) => {
                // old layers fade out on the shorter removal clock
                self.anim = Some(StreamAnim {
                    from: Some(from),
                    to: None,
                    transition: Transition::removal(),
                });
                self.current = None;
                self.phase = ViewPhase::Updating;
            }
            (None, None) => {
                self.current = None;
                self.phase = ViewPhase::Ready;
            }
        }
    }

    /// Stack as drawn this frame, mid-animation included.
    fn displayed_stack(&self) -> Option<StackShape> {
        match &self.anim {
            Some(anim) => anim.shape_at(anim.transition.progress()).map(|(s, _)| s),
            None => self.current.clone(),
        }
    }
}

impl ChartView for StreamGraphView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        "Environmental Factors"
    }

    fn view_type(&self) -> &str {
        "EnvironmentStreamGraph"
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
                debug!("environmental data load finished after unmount, discarding");
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
                loading_ui(ui, "Loading environmental data...");
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

        let empty_message = format!("no data available for {}", self.selection.to_lowercase());
        let drawn = match (&self.anim, &self.current) {
            (Some(anim), _) => anim.shape_at(anim.transition.progress()),
            (None, Some(shape)) => Some((shape.clone(), 1.0)),
            (None, None) => None,
        };
        let Some((shape, alpha)) = drawn else {
            empty_ui(ui, &empty_message);
            return;
        };
        // the message appears as soon as the target is empty, while the old
        // layers are still fading out underneath it
        let show_message = self.current.is_none();

        let (x0, x1) = padded_domain(shape.x_domain);
        let (y0, y1) = padded_domain(shape.y_domain);
        Plot::new(self.id)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .legend(Legend::default())
            .x_axis_label("Year")
            .y_axis_label("Aggregated Scores")
            .x_axis_formatter(|mark, _range| format!("{:.0}", mark.value))
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([x0, y0], [x1, y1]));
                for (idx, measure) in Measure::ALL.iter().enumerate() {
                    let outline = shape.layer_outline(idx, CURVE_SAMPLES);
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::new(outline))
                            .fill_color(with_opacity(measure.color(), 0.85 * alpha))
                            .stroke(egui::Stroke::new(
                                1.0,
                                with_opacity(measure.color(), alpha),
                            ))
                            .name(measure.label()),
                    );
                }
                if show_message {
                    let center = PlotPoint::new((x0 + x1) * 0.5, (y0 + y1) * 0.5);
                    plot_ui.text(
                        Text::new(
                            center,
                            egui::RichText::new(empty_message.as_str()).size(16.0),
                        )
                        .color(Color32::GRAY)
                        .anchor(egui::Align2::CENTER_CENTER),
                    );
                }
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
    format!("Environmental Factors in {}", selection.to_lowercase())
}

/// Columnar environment table, one vector per measure.
struct OzoneTable {
    years: Vec<f64>,
    countries: Vec<String>,
    measures: [Vec<f64>; 3],
}

impl OzoneTable {
    fn from_batch(batch: &RecordBatch) -> Result<Self, String> {
        let to_msg = |e: eco_data::DataError| e.to_string();
        Ok(Self {
            years: numeric_column(batch, "year").map_err(to_msg)?,
            countries: string_column(batch, "country").map_err(to_msg)?,
            measures: [
                numeric_column(batch, Measure::CfcConsumption.column()).map_err(to_msg)?,
                numeric_column(batch, Measure::IndustrializationIndex.column()).map_err(to_msg)?,
                numeric_column(batch, Measure::PolicyScore.column()).map_err(to_msg)?,
            ],
        })
    }
}

/// Boundary polylines of one stacked layer.
#[derive(Clone, Debug, PartialEq)]
struct Layer {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

/// A fully stacked shape for one selection.
#[derive(Clone, Debug, PartialEq)]
struct StackShape {
    /// Ascending years, one entry per row.
    years: Vec<f64>,
    layers: [Layer; 3],
    x_domain: (f64, f64),
    y_domain: (f64, f64),
}

impl StackShape {
    /// Closed outline of layer `idx`: smoothed top edge forward, smoothed
    /// bottom edge reversed.
    fn layer_outline(&self, idx: usize, samples: usize) -> Vec<[f64; 2]> {
        let layer = &self.layers[idx];
        let top: Vec<[f64; 2]> = self
            .years
            .iter()
            .zip(&layer.upper)
            .map(|(x, y)| [*x, *y])
            .collect();
        let bottom: Vec<[f64; 2]> = self
            .years
            .iter()
            .zip(&layer.lower)
            .map(|(x, y)| [*x, *y])
            .collect();
        let mut outline = basis_curve(&top, samples);
        let mut back = basis_curve(&bottom, samples);
        back.reverse();
        outline.extend(back);
        outline
    }
}

struct StreamAnim {
    from: Option<StackShape>,
    to: Option<StackShape>,
    transition: Transition,
}

impl StreamAnim {
    /// Shape and opacity at progress `t`. None once a fade-out has nothing
    /// left to draw.
    fn shape_at(&self, t: f64) -> Option<(StackShape, f64)> {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => Some((morph_stack(from, to, t), 1.0)),
            (None, Some(to)) => Some((to.clone(), t)),
            (Some(from), None) => Some((from.clone(), 1.0 - t)),
            (None, None) => None,
        }
    }
}

/// Stack the measures for `selection`, rows sorted by year. NaN measure
/// values count as zero so one gap does not poison the whole stack.
fn stack_for(table: &OzoneTable, selection: &str) -> Option<StackShape> {
    let rows = filter_rows(&table.countries, selection);
    let mut picked: Vec<(f64, [f64; 3])> = rows
        .iter()
        .filter_map(|&i| {
            let year = table.years[i];
            if !year.is_finite() {
                return None;
            }
            let values = [
                finite_or_zero(table.measures[0][i]),
                finite_or_zero(table.measures[1][i]),
                finite_or_zero(table.measures[2][i]),
            ];
            Some((year, values))
        })
        .collect();
    if picked.is_empty() {
        return None;
    }
    picked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let years: Vec<f64> = picked.iter().map(|(y, _)| *y).collect();
    let mut layers: [Layer; 3] = std::array::from_fn(|_| Layer {
        lower: Vec::with_capacity(years.len()),
        upper: Vec::with_capacity(years.len()),
    });
    for (_, values) in &picked {
        let mut base = 0.0;
        for (k, layer) in layers.iter_mut().enumerate() {
            layer.lower.push(base);
            base += values[k];
            layer.upper.push(base);
        }
    }

    let x_domain = (years[0], years[years.len() - 1]);
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for layer in &layers {
        for v in &layer.lower {
            y_min = y_min.min(*v);
        }
        for v in &layer.upper {
            y_max = y_max.max(*v);
        }
    }

    Some(StackShape {
        years,
        layers,
        x_domain,
        y_domain: (y_min, y_max),
    })
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Interpolate every layer boundary and both domains between two stacks.
fn morph_stack(from: &StackShape, to: &StackShape, t: f64) -> StackShape {
    let boundary = |years: &[f64], values: &[f64]| -> Vec<[f64; 2]> {
        years.iter().zip(values).map(|(x, y)| [*x, *y]).collect()
    };
    let morph_boundary = |pick: fn(&Layer) -> &Vec<f64>, idx: usize| -> Vec<[f64; 2]> {
        interpolate_points(
            &boundary(&from.years, pick(&from.layers[idx])),
            &boundary(&to.years, pick(&to.layers[idx])),
            t,
        )
    };

    let base = morph_boundary(|l| &l.lower, 0);
    let years: Vec<f64> = base.iter().map(|p| p[0]).collect();
    let layers: [Layer; 3] = std::array::from_fn(|idx| Layer {
        lower: morph_boundary(|l| &l.lower, idx)
            .iter()
            .map(|p| p[1])
            .collect(),
        upper: morph_boundary(|l| &l.upper, idx)
            .iter()
            .map(|p| p[1])
            .collect(),
    });

    StackShape {
        years,
        layers,
        x_domain: lerp_domain(from.x_domain, to.x_domain, t),
        y_domain: lerp_domain(from.y_domain, to.y_domain, t),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use eco_core::{SelectionBus, SelectionEvent};
    use eco_data::sources::read_typed_csv;
    use eco_data::MemorySource;

    use super::*;

    const OZONE_CSV: &str = "\
year,country,cfc_consumption,industrialization_index,policy_score
2001,Germany,12,6,3
2000,Germany,10,5,2
2000,France,1,2,3
";

    fn test_table() -> OzoneTable {
        let batch = read_typed_csv(Cursor::new(OZONE_CSV)).unwrap();
        OzoneTable::from_batch(&batch).unwrap()
    }

    #[test]
    fn test_measure_columns() {
        let columns: Vec<&str> = Measure::ALL.iter().map(|m| m.column()).collect();
        assert_eq!(
            columns,
            vec!["cfc_consumption", "industrialization_index", "policy_score"]
        );
    }

    #[test]
    fn test_stack_is_cumulative_in_measure_order() {
        let stack = stack_for(&test_table(), "germany").unwrap();
        assert_eq!(stack.years, vec![2000.0, 2001.0]);
        // 2000: cfc 10, industry 5, policy 2
        assert_eq!(stack.layers[0].lower[0], 0.0);
        assert_eq!(stack.layers[0].upper[0], 10.0);
        assert_eq!(stack.layers[1].lower[0], 10.0);
        assert_eq!(stack.layers[1].upper[0], 15.0);
        assert_eq!(stack.layers[2].lower[0], 15.0);
        assert_eq!(stack.layers[2].upper[0], 17.0);
    }

    #[test]
    fn test_stack_sorts_rows_by_year() {
        // the 2001 row comes first in the csv
        let stack = stack_for(&test_table(), "Germany").unwrap();
        assert_eq!(stack.years, vec![2000.0, 2001.0]);
        assert_eq!(stack.layers[0].upper, vec![10.0, 12.0]);
    }

    #[test]
    fn test_stack_domains() {
        let stack = stack_for(&test_table(), "germany").unwrap();
        assert_eq!(stack.x_domain, (2000.0, 2001.0));
        assert_eq!(stack.y_domain, (0.0, 21.0));
    }

    #[test]
    fn test_stack_for_absent_country_is_none() {
        assert!(stack_for(&test_table(), "narnia").is_none());
    }

    #[test]
    fn test_morph_stack_midway() {
        let table = test_table();
        let from = stack_for(&table, "germany").unwrap();
        let to = stack_for(&table, "france").unwrap();
        let mid = morph_stack(&from, &to, 0.5);
        // germany tops out at 21, france at 6
        assert!((mid.y_domain.1 - 13.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_selection_fades_out_then_clears() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ctx = ViewerContext::new(Arc::new(SelectionBus::default()), runtime.handle().clone());

        let batch = read_typed_csv(Cursor::new(OZONE_CSV)).unwrap();
        let mut view = StreamGraphView::new(Arc::new(MemorySource::new("ozone", batch)));
        view.table = Some(test_table());
        view.selection = "germany".to_owned();
        view.rebuild_stack(false);
        view.phase = ViewPhase::Ready;

        view.apply_selection("narnia".to_owned());
        assert_eq!(view.phase(), ViewPhase::Updating);
        assert!(view.current.is_none());
        let anim = view.anim.as_ref().unwrap();
        assert!(anim.from.is_some() && anim.to.is_none());

        // removal clock is shorter than the primary one
        view.on_frame_update(&ctx, 0.6);
        assert!(view.anim.is_none());
        assert_eq!(view.phase(), ViewPhase::Ready);
    }

    #[tokio::test]
    async fn test_mount_subscribes_and_follows_the_bus() {
        const LINKED_CSV: &str = "\
year,country,cfc_consumption,industrialization_index,policy_score
2000,United States,4,5,6
2001,United States,5,6,7
2000,Brazil,1,1,1
";
        let batch = read_typed_csv(Cursor::new(LINKED_CSV)).unwrap();
        let source = Arc::new(MemorySource::new("ozone", batch));
        let bus = Arc::new(SelectionBus::default());
        let ctx = ViewerContext::new(bus.clone(), tokio::runtime::Handle::current());

        let mut view = StreamGraphView::new(source);
        view.mount(&ctx);
        assert_eq!(bus.subscriber_count(EventKind::CountrySelected), 1);
        for _ in 0..200 {
            view.on_frame_update(&ctx, 0.016);
            if view.phase() == ViewPhase::Ready {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(view.phase(), ViewPhase::Ready);
        assert!(view.current.is_some());

        bus.publish(SelectionEvent::country_selected("Brazil")).unwrap();
        view.on_frame_update(&ctx, 0.016);
        assert_eq!(view.title(), "Environmental Factors in brazil");
        assert_eq!(view.phase(), ViewPhase::Updating);

        view.unmount();
        assert_eq!(bus.subscriber_count(EventKind::CountrySelected), 0);
    }
}
