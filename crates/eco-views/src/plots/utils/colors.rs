//! Color palettes for the dashboard charts.

use egui::Color32;

/// Sequential seven-step red ramp used for risk scores, light to dark.
pub const RISK_REDS: [Color32; 7] = [
    Color32::from_rgb(0xfe, 0xe5, 0xd9),
    Color32::from_rgb(0xfc, 0xbb, 0xa1),
    Color32::from_rgb(0xfc, 0x92, 0x72),
    Color32::from_rgb(0xfb, 0x6a, 0x4a),
    Color32::from_rgb(0xef, 0x3b, 0x2c),
    Color32::from_rgb(0xcb, 0x18, 0x1d),
    Color32::from_rgb(0x99, 0x00, 0x0d),
];

/// Qualitative palette used for the stacked environmental measures.
pub const MEASURE_SET: [Color32; 8] = [
    Color32::from_rgb(0x66, 0xc2, 0xa5),
    Color32::from_rgb(0xfc, 0x8d, 0x62),
    Color32::from_rgb(0x8d, 0xa0, 0xcb),
    Color32::from_rgb(0xe7, 0x8a, 0xc3),
    Color32::from_rgb(0xa6, 0xd8, 0x54),
    Color32::from_rgb(0xff, 0xd9, 0x2f),
    Color32::from_rgb(0xe5, 0xc4, 0x94),
    Color32::from_rgb(0xb3, 0xb3, 0xb3),
];

/// Fill for countries with no score in the displayed year.
pub const NO_DATA_FILL: Color32 = Color32::from_rgb(238, 238, 238);

/// Country outline stroke color.
pub const OUTLINE: Color32 = Color32::from_rgb(5, 0, 0);

/// Color for the measure at `idx`, wrapping past the palette end.
pub fn measure_color(idx: usize) -> Color32 {
    MEASURE_SET[idx % MEASURE_SET.len()]
}

/// Per-channel linear interpolation between two colors.
pub fn lerp_color(from: Color32, to: Color32, t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    let ch = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Color32::from_rgba_unmultiplied(
        ch(from.r(), to.r()),
        ch(from.g(), to.g()),
        ch(from.b(), to.b()),
        ch(from.a(), to.a()),
    )
}

/// Scale a color's alpha by `opacity` in `0..=1`.
pub fn with_opacity(color: Color32, opacity: f64) -> Color32 {
    let alpha = (color.a() as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}
