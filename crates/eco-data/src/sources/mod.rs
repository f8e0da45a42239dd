//! Dataset sources

mod csv_source;
mod memory_source;
mod world_map;

pub use csv_source::{read_typed_csv, CsvSource};
pub use memory_source::MemorySource;
pub use world_map::{project, WorldFeature, WorldMap};
