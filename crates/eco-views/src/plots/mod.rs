//! The three dashboard charts: choropleth map, line chart, stream graph.

pub mod choropleth;
pub mod line;
pub mod stream;
pub mod utils;

pub use choropleth::ChoroplethView;
pub use line::LineChartView;
pub use stream::StreamGraphView;
