//! Loading factory descriptions from disk.

use plant_core::test_fixtures::sawmill_def;
use plant_core::{factory_report, unit_report};
use plant_world::{build_factory, load_config};
use std::io::Write;
use std::path::PathBuf;

fn content_path(file: &str) -> PathBuf {
    let manifest = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    PathBuf::from(manifest).join("../../content").join(file)
}

#[test]
fn bundled_sawmill_config_loads() {
    let def = load_config(&content_path("sawmill.json")).unwrap();

    assert_eq!(def.name, "sawmill works");
    assert_eq!(def.minutes_per_day, Some(1440));
    assert_eq!(def.production_units.len(), 2);

    let factory = build_factory(&def);
    let report = factory_report(&factory);
    assert_eq!(report.production_unit_count, 2);
    assert_eq!(report.worker_count, 3);
}

#[test]
fn bundled_sawmill_runs_until_output_is_full() {
    let def = load_config(&content_path("sawmill.json")).unwrap();
    let mut factory = build_factory(&def);

    factory.run(200);

    let sawmill = unit_report(&factory, "sawmill").unwrap();
    assert!((sawmill.units_produced - 40.0).abs() < 1e-6);
    assert!((sawmill.value_produced - 100.0).abs() < 1e-6);
}

#[test]
fn temp_file_round_trips_through_the_loader() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", serde_json::to_string(&sawmill_def()).unwrap()).unwrap();

    let def = load_config(file.path()).unwrap();
    let mut factory = build_factory(&def);
    factory.run(61);

    let sawmill = unit_report(&factory, "sawmill").unwrap();
    assert!((sawmill.units_produced - 30.0).abs() < 1e-6);
}

#[test]
fn missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let err = load_config(&path).unwrap_err();

    assert!(format!("{err:#}").contains("absent.json"));
}

#[test]
fn invalid_json_is_reported_with_context() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{\"name\": ").unwrap();

    let err = load_config(file.path()).unwrap_err();

    assert!(format!("{err:#}").contains("parsing factory description"));
}
