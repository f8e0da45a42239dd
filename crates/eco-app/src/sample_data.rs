//! Writes the bundled sample datasets on first launch.
//!
//! Three CSVs and a world outline land in the data directory unless they are
//! already there. Values are synthetic but deterministic, so the dashboard
//! looks the same on every machine. Country names in the geojson deliberately
//! use the long-form spellings that the alias table resolves.

use std::fs;
use std::path::Path;

use anyhow::Context as _;
use tracing::info;

/// Canonical country names used across all three CSVs.
const COUNTRIES: [&str; 15] = [
    "United States",
    "Canada",
    "Brazil",
    "France",
    "Germany",
    "United Kingdom",
    "Russia",
    "China",
    "India",
    "Australia",
    "Vietnam",
    "South Korea",
    "Tanzania",
    "Congo",
    "Iran",
];

const YEARS: std::ops::RangeInclusive<i32> = 1970..=2015;
const YEAR_STEP: i32 = 5;

/// Create the data directory and any missing sample files.
pub fn ensure_sample_data(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create data directory {}", dir.display()))?;

    write_if_missing(&dir.join("world.geojson"), WORLD_GEOJSON)?;
    write_csv_if_missing(&dir.join("population_growth.csv"), write_growth)?;
    write_csv_if_missing(&dir.join("global_population_risk.csv"), write_risk)?;
    write_csv_if_missing(
        &dir.join("population_ozone_environment.csv"),
        write_environment,
    )?;
    Ok(())
}

fn write_if_missing(path: &Path, contents: &str) -> anyhow::Result<()> {
    if path.exists() {
        return Ok(());
    }
    info!(path = %path.display(), "writing sample dataset");
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn write_csv_if_missing(
    path: &Path,
    fill: fn(&mut csv::Writer<fs::File>) -> csv::Result<()>,
) -> anyhow::Result<()> {
    if path.exists() {
        return Ok(());
    }
    info!(path = %path.display(), "writing sample dataset");
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("failed to create {}", path.display()))?;
    fill(&mut writer).with_context(|| format!("failed to write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

fn sample_years() -> impl Iterator<Item = i32> {
    YEARS.step_by(YEAR_STEP as usize)
}

fn write_growth(writer: &mut csv::Writer<fs::File>) -> csv::Result<()> {
    writer.write_record(["year", "country", "population_growth_rate"])?;
    for (ci, country) in COUNTRIES.iter().enumerate() {
        for (yi, year) in sample_years().enumerate() {
            let base = 0.4 + (ci % 7) as f64 * 0.35;
            let wave = (yi as f64 * 0.9 + ci as f64).sin() * 0.6;
            let rate = base + wave;
            writer.write_record([year.to_string(), (*country).to_string(), format!("{rate:.2}")])?;
        }
    }
    Ok(())
}

fn write_risk(writer: &mut csv::Writer<fs::File>) -> csv::Result<()> {
    writer.write_record(["year", "country", "risk_score"])?;
    for (ci, country) in COUNTRIES.iter().enumerate() {
        for (yi, year) in sample_years().enumerate() {
            let base = 35.0 + (ci % 5) as f64 * 12.0;
            let wave = (yi as f64 * 0.7 + ci as f64 * 1.3).sin() * 30.0;
            let score = (base + wave).clamp(0.0, 100.0);
            writer.write_record([year.to_string(), (*country).to_string(), format!("{score:.1}")])?;
        }
    }
    Ok(())
}

fn write_environment(writer: &mut csv::Writer<fs::File>) -> csv::Result<()> {
    writer.write_record([
        "year",
        "country",
        "cfc_consumption",
        "industrialization_index",
        "policy_score",
    ])?;
    for (ci, country) in COUNTRIES.iter().enumerate() {
        for (yi, year) in sample_years().enumerate() {
            let cfc = 25.0 + (ci % 6) as f64 * 8.0 + (yi as f64 * 0.8 + ci as f64).sin() * 10.0;
            let industry = 12.0 + (ci % 4) as f64 * 6.0 + (yi as f64 * 0.5 + ci as f64 * 0.7).cos() * 5.0;
            let policy = 6.0 + (ci % 3) as f64 * 4.0 + (yi as f64 * 1.1).sin() * 3.0;
            writer.write_record([
                year.to_string(),
                (*country).to_string(),
                format!("{:.1}", cfc.max(0.0)),
                format!("{:.1}", industry.max(0.0)),
                format!("{:.1}", policy.max(0.0)),
            ])?;
        }
    }
    Ok(())
}

/// Coarse country outlines. Shapes are simplified boxes, good enough for a
/// sample map. Several names use the long forms the alias table maps back to
/// the CSV spelling.
const WORLD_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature", "properties": { "name": "USA" },
      "geometry": { "type": "Polygon", "coordinates": [[
        [-125.0, 25.0], [-66.0, 25.0], [-66.0, 49.0], [-125.0, 49.0], [-125.0, 25.0]]] } },
    { "type": "Feature", "properties": { "name": "Canada" },
      "geometry": { "type": "Polygon", "coordinates": [[
        [-140.0, 50.0], [-55.0, 50.0], [-55.0, 70.0], [-140.0, 70.0], [-140.0, 50.0]]] } },
    { "type": "Feature", "properties": { "name": "Brazil" },
      "geometry": { "type": "Polygon", "coordinates": [[
        [-74.0, -33.0], [-35.0, -33.0], [-35.0, 5.0], [-74.0, 5.0], [-74.0, -33.0]]] } },
    { "type": "Feature", "properties": { "name": "France" },
      "geometry": { "type": "Polygon", "coordinates": [[
        [-5.0, 42.0], [8.0, 42.0], [8.0, 50.0], [-5.0, 50.0], [-5.0, 42.0]]] } },
    { "type": "Feature", "properties": { "name": "Germany" },
      "geometry": { "type": "Polygon", "coordinates": [[
        [8.0, 47.0], [15.0, 47.0], [15.0, 55.0], [8.0, 55.0], [8.0, 47.0]]] } },
    { "type": "Feature", "properties": { "name": "England" },
      "geometry": { "type": "Polygon", "coordinates": [[
        [-6.0, 50.0], [2.0, 50.0], [2.0, 59.0], [-6.0, 59.0], [-6.0, 50.0]]] } },
    { "type": "Feature", "properties": { "name": "Russian Federation" },
      "geometry": { "type": "Polygon", "coordinates": [[
        [30.0, 53.0], [179.0, 53.0], [179.0, 77.0], [30.0, 77.0], [30.0, 53.0]]] } },
    { "type": "Feature", "properties": { "name": "China" },
      "geometry": { "type": "Polygon", "coordinates": [[
        [74.0, 28.0], [125.0, 28.0], [125.0, 53.0], [74.0, 53.0], [74.0, 28.0]]] } },
    { "type": "Feature", "properties": { "name": "India" },
      "geometry": { "type": "Polygon", "coordinates": [[
        [68.0, 6.0], [97.0, 6.0], [97.0, 27.0], [68.0, 27.0], [68.0, 6.0]]] } },
    { "type": "Feature", "properties": { "name": "Australia" },
      "geometry": { "type": "Polygon", "coordinates": [[
        [113.0, -44.0], [154.0, -44.0], [154.0, -10.0], [113.0, -10.0], [113.0, -44.0]]] } },
    { "type": "Feature", "properties": { "name": "Viet Nam" },
      "geometry": { "type": "Polygon", "coordinates": [[
        [102.0, 8.0], [110.0, 8.0], [110.0, 17.0], [102.0, 17.0], [102.0, 8.0]]] } },
    { "type": "Feature", "properties": { "name": "Republic of Korea" },
      "geometry": { "type": "Polygon", "coordinates": [[
        [126.0, 34.0], [130.0, 34.0], [130.0, 39.0], [126.0, 39.0], [126.0, 34.0]]] } },
    { "type": "Feature", "properties": { "name": "United Republic of Tanzania" },
      "geometry": { "type": "Polygon", "coordinates": [[
        [29.0, -12.0], [41.0, -12.0], [41.0, -1.0], [29.0, -1.0], [29.0, -12.0]]] } },
    { "type": "Feature", "properties": { "name": "Democratic Republic of the Congo" },
      "geometry": { "type": "Polygon", "coordinates": [[
        [12.0, -13.0], [28.0, -13.0], [28.0, 5.0], [12.0, 5.0], [12.0, -13.0]]] } },
    { "type": "Feature", "properties": { "name": "Iran (Islamic Republic of)" },
      "geometry": { "type": "Polygon", "coordinates": [[
        [44.0, 25.0], [63.0, 25.0], [63.0, 40.0], [44.0, 40.0], [44.0, 25.0]]] } }
  ]
}"#;

#[cfg(test)]
mod tests {
    use eco_data::{CountryAliases, CsvSource, WorldMap};

    use super::*;

    #[test]
    fn test_ensure_writes_all_files_once() {
        let dir = tempfile::tempdir().unwrap();
        ensure_sample_data(dir.path()).unwrap();

        let files = [
            "world.geojson",
            "population_growth.csv",
            "global_population_risk.csv",
            "population_ozone_environment.csv",
        ];
        for file in files {
            assert!(dir.path().join(file).exists(), "{file} missing");
        }

        // a second run must leave existing files untouched
        let growth_path = dir.path().join("population_growth.csv");
        let before = fs::read(&growth_path).unwrap();
        ensure_sample_data(dir.path()).unwrap();
        let after = fs::read(&growth_path).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_world_outline_parses_and_exercises_aliases() {
        let dir = tempfile::tempdir().unwrap();
        ensure_sample_data(dir.path()).unwrap();

        let text = fs::read_to_string(dir.path().join("world.geojson")).unwrap();
        let world = WorldMap::from_geojson(&text).unwrap();
        assert_eq!(world.features.len(), 15);

        // every feature name must resolve to a CSV country name
        let aliases = CountryAliases::builtin();
        for feature in &world.features {
            let canonical = aliases.normalize(&feature.name);
            assert!(
                COUNTRIES.contains(&canonical),
                "{} does not resolve to a dataset country",
                feature.name
            );
        }
    }

    #[test]
    fn test_csvs_parse_with_expected_columns() {
        let dir = tempfile::tempdir().unwrap();
        ensure_sample_data(dir.path()).unwrap();

        let growth = CsvSource::read_file(&dir.path().join("population_growth.csv")).unwrap();
        assert_eq!(growth.num_rows(), 15 * 10);
        assert!(growth.schema().column_with_name("population_growth_rate").is_some());

        let risk = CsvSource::read_file(&dir.path().join("global_population_risk.csv")).unwrap();
        assert!(risk.schema().column_with_name("risk_score").is_some());

        let env =
            CsvSource::read_file(&dir.path().join("population_ozone_environment.csv")).unwrap();
        for column in ["cfc_consumption", "industrialization_index", "policy_score"] {
            assert!(env.schema().column_with_name(column).is_some(), "{column}");
        }
    }
}
