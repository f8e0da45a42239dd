//! Shared plotting utilities: palettes, scales, curve smoothing.

pub mod colors;
pub mod curve;
pub mod scale;

pub use colors::{lerp_color, measure_color, with_opacity, NO_DATA_FILL, OUTLINE, RISK_REDS};
pub use curve::basis_curve;
pub use scale::{lerp_domain, ThresholdScale};

use eco_core::transition::{lerp, resample};

/// Widen a degenerate axis domain so plot bounds never collapse to a point.
pub fn padded_domain(domain: (f64, f64)) -> (f64, f64) {
    if (domain.1 - domain.0).abs() < 1e-9 {
        (domain.0 - 1.0, domain.1 + 1.0)
    } else {
        domain
    }
}

/// Pointwise interpolation between two paths after resampling both to a
/// shared length. Drives the morph between an old and a new chart shape.
pub fn interpolate_points(from: &[[f64; 2]], to: &[[f64; 2]], t: f64) -> Vec<[f64; 2]> {
    let n = from.len().max(to.len()).max(2);
    let from_r = resample(from, n);
    let to_r = resample(to, n);
    from_r
        .iter()
        .zip(&to_r)
        .map(|(a, b)| [lerp(a[0], b[0], t), lerp(a[1], b[1], t)])
        .collect()
}

/// Centered spinner shown while a view's dataset is loading.
pub fn loading_ui(ui: &mut egui::Ui, message: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.4);
        ui.spinner();
        ui.label(message);
    });
    ui.ctx()
        .request_repaint_after(std::time::Duration::from_millis(50));
}

/// Centered error text shown when a view's dataset failed to load.
pub fn error_ui(ui: &mut egui::Ui, message: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.4);
        ui.colored_label(ui.visuals().error_fg_color, message);
    });
}

/// Centered gray text shown when a filter matched no rows.
pub fn empty_ui(ui: &mut egui::Ui, message: &str) {
    ui.centered_and_justified(|ui| {
        ui.label(
            egui::RichText::new(message)
                .size(16.0)
                .color(egui::Color32::GRAY),
        );
    });
}
