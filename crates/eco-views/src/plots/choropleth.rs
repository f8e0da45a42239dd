//! Choropleth world map of population risk scores.
//!
//! The map cycles through the dataset's years on a fixed interval and
//! recolors countries with an animated fill transition. Clicking a country
//! publishes its canonical name on the selection bus; the line and stream
//! charts pick the selection up from there.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use ahash::AHashMap;
use arrow::record_batch::RecordBatch;
use eco_core::transition::YEAR_CYCLE_PERIOD;
use eco_core::{
    DatasetSource, Interval, LoadSlot, MountToken, SelectionBus, SelectionEvent, Transition,
    ViewPhase,
};
use eco_data::{numeric_column, string_column, CountryAliases, WorldMap};
use egui::{Color32, RichText, Stroke};
use egui_plot::{Plot, PlotPoints, Polygon};
use tracing::{debug, error};

use crate::chart_view::{ChartView, ViewId};
use crate::plots::utils::{
    error_ui, lerp_color, loading_ui, ThresholdScale, NO_DATA_FILL, OUTLINE, RISK_REDS,
};
use crate::ViewerContext;

/// Risk-score thresholds separating the fill ramp's bands.
const RISK_THRESHOLDS: [f64; 6] = [20.0, 35.0, 50.0, 65.0, 75.0, 100.0];

const SCORE_COLUMN: &str = "risk_score";

type LoadResult = Result<(WorldMap, RecordBatch), String>;

/// World map view colored by per-country risk score.
pub struct ChoroplethView {
    id: ViewId,
    title: String,
    phase: ViewPhase,
    world_path: PathBuf,
    source: Arc<dyn DatasetSource>,
    token: MountToken,
    slot: LoadSlot<LoadResult>,
    model: Option<MapModel>,
    /// Target fill per feature, in feature order.
    fills: Vec<Color32>,
    /// Fill snapshot the running transition started from.
    fill_from: Vec<Color32>,
    fill_anim: Option<Transition>,
    year_timer: Option<Interval>,
    load_error: Option<String>,
}

impl ChoroplethView {
    pub fn new(world_path: impl Into<PathBuf>, source: Arc<dyn DatasetSource>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            title: "Global Population Risk".to_owned(),
            phase: ViewPhase::Unmounted,
            world_path: world_path.into(),
            source,
            token: MountToken::new(),
            slot: LoadSlot::new(),
            model: None,
            fills: Vec::new(),
            fill_from: Vec::new(),
            fill_anim: None,
            year_timer: None,
            load_error: None,
        }
    }

    fn poll_load(&mut self) {
        let Some(result) = self.slot.take() else {
            return;
        };
        let built = result.and_then(|(world, batch)| MapModel::from_parts(world, &batch));
        match built {
            Ok(model) => {
                debug!(
                    features = model.world.features.len(),
                    years = model.years.len(),
                    "world map ready"
                );
                self.fills = model.target_fills(CountryAliases::builtin());
                self.fill_from = self.fills.clone();
                self.year_timer = Some(Interval::new(YEAR_CYCLE_PERIOD));
                self.model = Some(model);
                self.phase = ViewPhase::Ready;
            }
            Err(message) => {
                error!(error = %message, "world map load failed");
                self.load_error = Some(message);
                self.phase = ViewPhase::Failed;
            }
        }
    }

    /// Start an animated recolor toward the current year's scores.
    fn begin_fill_transition(&mut self) {
        self.fill_from = self.current_fills();
        let Some(model) = &self.model else {
            return;
        };
        self.fills = model.target_fills(CountryAliases::builtin());
        self.fill_anim = Some(Transition::primary());
        self.phase = ViewPhase::Updating;
    }

    /// Fills to draw this frame, interpolated while a transition runs.
    fn current_fills(&self) -> Vec<Color32> {
        match &self.fill_anim {
            Some(anim) => {
                let t = anim.progress();
                self.fills
                    .iter()
                    .zip(&self.fill_from)
                    .map(|(to, from)| lerp_color(*from, *to, t))
                    .collect()
            }
            None => self.fills.clone(),
        }
    }
}

/// Normalize a feature name and publish it as the new selection.
fn publish_country(bus: &SelectionBus, raw_name: &str) {
    let canonical = CountryAliases::builtin().normalize(raw_name);
    match bus.publish(SelectionEvent::country_selected(canonical)) {
        Ok(()) => debug!(country = canonical, "published country selection"),
        Err(err) => error!(error = %err, "country selection rejected"),
    }
}

impl ChartView for ChoroplethView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        "World Map"
    }

    fn view_type(&self) -> &str {
        "ChoroplethMap"
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

        let token = self.token.clone();
        let slot = self.slot.clone();
        let world_path = self.world_path.clone();
        let source = Arc::clone(&self.source);
        ctx.runtime_handle.spawn(async move {
            let result = load_map_data(world_path, source).await;
            if token.is_active() {
                slot.put(result);
            } else {
                debug!("world map load finished after unmount, discarding");
            }
        });
    }

    fn unmount(&mut self) {
        self.token.revoke();
        self.slot = LoadSlot::new();
        self.model = None;
        self.fills.clear();
        self.fill_from.clear();
        self.fill_anim = None;
        self.year_timer = None;
        self.phase = ViewPhase::Unmounted;
    }

    fn on_frame_update(&mut self, _ctx: &ViewerContext, dt: f32) {
        if self.phase == ViewPhase::Loading {
            self.poll_load();
        }
        if !self.phase.has_data() {
            return;
        }

        let fired = match &mut self.year_timer {
            Some(timer) => timer.tick(dt),
            None => 0,
        };
        if fired > 0 {
            if let Some(model) = &mut self.model {
                model.advance_years(fired);
            }
            self.begin_fill_transition();
        }

        if let Some(anim) = &mut self.fill_anim {
            if anim.advance(dt) {
                self.fill_anim = None;
                self.fill_from = self.fills.clone();
                self.phase = ViewPhase::Ready;
            }
        }
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut egui::Ui) {
        match self.phase {
            ViewPhase::Unmounted => return,
            ViewPhase::Loading => {
                loading_ui(ui, "Loading world map...");
                return;
            }
            ViewPhase::Failed => {
                let message = self.load_error.as_deref().unwrap_or("dataset load failed");
                error_ui(ui, message);
                return;
            }
            ViewPhase::Ready | ViewPhase::Updating => {}
        }

        let fills = self.current_fills();
        let Some(model) = &self.model else {
            return;
        };

        ui.horizontal(|ui| {
            ui.heading(&self.title);
            if let Some(year) = model.current_year() {
                ui.separator();
                ui.label(RichText::new(format!("Year: {year}")).strong());
            }
        });
        legend_strip(ui, &model.scale);

        let mut hovered: Option<usize> = None;
        let mut clicked = false;
        let plot_response = Plot::new(self.id)
            .show_grid(false)
            .show_axes(false)
            .show_x(false)
            .show_y(false)
            .data_aspect(1.0)
            .show(ui, |plot_ui| {
                if let Some(pointer) = plot_ui.pointer_coordinate() {
                    hovered = model
                        .world
                        .features
                        .iter()
                        .position(|f| f.contains(pointer.x, pointer.y));
                }
                clicked = plot_ui.response().clicked();

                for (idx, feature) in model.world.features.iter().enumerate() {
                    let stroke_width = if hovered == Some(idx) { 2.0 } else { 0.5 };
                    for ring in feature.rings() {
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::new(ring.clone()))
                                .fill_color(fills[idx])
                                .stroke(Stroke::new(stroke_width, OUTLINE)),
                        );
                    }
                }
            });

        if let Some(idx) = hovered {
            let feature = &model.world.features[idx];
            let canonical = CountryAliases::builtin().normalize(&feature.name);
            let score = model
                .current_year()
                .and_then(|year| model.score_for(year, canonical));
            plot_response.response.on_hover_ui_at_pointer(|ui| {
                ui.strong(&feature.name);
                match score {
                    Some(s) => ui.label(format!("Risk score: {s:.1}")),
                    None => ui.label("No data"),
                };
            });
            if clicked {
                publish_country(&ctx.bus, &feature.name);
            }
        }
    }

    fn is_animating(&self) -> bool {
        self.fill_anim.is_some() || (self.year_timer.is_some() && self.phase.has_data())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

async fn load_map_data(world_path: PathBuf, source: Arc<dyn DatasetSource>) -> LoadResult {
    let world = WorldMap::load(world_path).await.map_err(|e| e.to_string())?;
    let batch = source.fetch().await.map_err(|e| e.to_string())?;
    Ok((world, batch))
}

/// Parsed map data: geometry plus per-year score tables.
struct MapModel {
    world: WorldMap,
    /// Year to country-name-to-score table. Lookup is case sensitive, the
    /// score table keys must match the alias map's canonical names exactly.
    scores: BTreeMap<i64, AHashMap<String, f64>>,
    /// Distinct years, ascending.
    years: Vec<i64>,
    year_index: usize,
    scale: ThresholdScale,
}

impl MapModel {
    fn from_parts(world: WorldMap, batch: &RecordBatch) -> Result<Self, String> {
        let years = numeric_column(batch, "year").map_err(|e| e.to_string())?;
        let countries = string_column(batch, "country").map_err(|e| e.to_string())?;
        let scores_col = numeric_column(batch, SCORE_COLUMN).map_err(|e| e.to_string())?;

        let mut scores: BTreeMap<i64, AHashMap<String, f64>> = BTreeMap::new();
        for ((year, country), score) in years.iter().zip(&countries).zip(&scores_col) {
            if !year.is_finite() || !score.is_finite() {
                continue;
            }
            scores
                .entry(*year as i64)
                .or_default()
                .insert(country.clone(), *score);
        }
        let years: Vec<i64> = scores.keys().copied().collect();

        Ok(Self {
            world,
            scores,
            years,
            year_index: 0,
            scale: ThresholdScale::new(RISK_THRESHOLDS.to_vec()),
        })
    }

    fn current_year(&self) -> Option<i64> {
        self.years.get(self.year_index).copied()
    }

    /// Step the displayed year forward, wrapping at the end.
    fn advance_years(&mut self, steps: u32) {
        if !self.years.is_empty() {
            self.year_index = (self.year_index + steps as usize) % self.years.len();
        }
    }

    fn score_for(&self, year: i64, canonical: &str) -> Option<f64> {
        self.scores.get(&year)?.get(canonical).copied()
    }

    /// Fill color per feature for the current year.
    fn target_fills(&self, aliases: &CountryAliases) -> Vec<Color32> {
        let year_scores = self.current_year().and_then(|y| self.scores.get(&y));
        self.world
            .features
            .iter()
            .map(|feature| {
                let canonical = aliases.normalize(&feature.name);
                let bucket = year_scores
                    .and_then(|table| table.get(canonical))
                    .and_then(|score| self.scale.bucket(*score));
                match bucket {
                    Some(idx) => RISK_REDS[idx.min(RISK_REDS.len() - 1)],
                    None => NO_DATA_FILL,
                }
            })
            .collect()
    }
}

/// Row of color swatches labeling the threshold bands.
fn legend_strip(ui: &mut egui::Ui, scale: &ThresholdScale) {
    let thresholds = scale.thresholds();
    ui.horizontal_wrapped(|ui| {
        for (idx, color) in RISK_REDS.iter().enumerate() {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, 10.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 2.0, *color);
            let label = if idx == 0 {
                format!("<{:.0}", thresholds[0])
            } else if idx == thresholds.len() {
                format!(">={:.0}", thresholds[idx - 1])
            } else {
                format!("{:.0}-{:.0}", thresholds[idx - 1], thresholds[idx])
            };
            ui.label(RichText::new(label).small());
            ui.add_space(6.0);
        }
    });
}
