use super::*;
use crate::test_fixtures::{sawmill_factory, sawmill_floor, TIRELESS};

mod processes;
mod scenarios;

// --- Shared test helpers ------------------------------------------------

fn approx(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-6
}

/// Sawmill at `rate`, already STARTED, with one tireless worker.
fn started_sawmill(rate: f64) -> (Floor, UnitId, WorkerId) {
    started_sawmill_with(UnitSettings {
        rate,
        ..UnitSettings::default()
    })
}

fn started_sawmill_with(settings: UnitSettings) -> (Floor, UnitId, WorkerId) {
    let (mut floor, unit) = sawmill_floor(settings);
    let worker = floor.hire_worker(TIRELESS, &[]);
    let mut events = Vec::new();
    Operation::start(unit.clone())
        .perform(&mut floor, Some(&worker), 1, &mut events)
        .unwrap();
    assert_eq!(floor.status_of(&unit).unwrap(), UnitStatus::Started);
    (floor, unit, worker)
}

fn stock_input(floor: &mut Floor, unit: &UnitId, material: Material) {
    let zone = floor.units[unit].inputs.clone();
    floor.zone_mut(&zone).unwrap().add_to_stock(material).unwrap();
}

fn stock_output(floor: &mut Floor, unit: &UnitId, material: Material) {
    let zone = floor.units[unit].outputs.clone();
    floor.zone_mut(&zone).unwrap().add_to_stock(material).unwrap();
}

fn wood(floor: &Floor, unit: &UnitId) -> f64 {
    floor.input_zone_of(unit).unwrap().quantity_of("wood")
}

fn planks(floor: &Floor, unit: &UnitId) -> f64 {
    floor.output_zone_of(unit).unwrap().quantity_of("plank")
}

fn count_events(events: &[EventEnvelope], pred: impl Fn(&Event) -> bool) -> usize {
    events.iter().filter(|e| pred(&e.event)).count()
}
