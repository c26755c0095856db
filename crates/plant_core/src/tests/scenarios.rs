//! Wood → plank runs over many ticks.

use super::*;

#[test]
fn sixty_ticks_of_load_and_produce_yield_thirty_planks() {
    let (mut floor, unit, worker) = started_sawmill(1.0);
    let mut process = Process::new(vec![
        Operation::load(unit.clone(), Material::new("wood", 1.0)),
        Operation::produce(unit.clone()),
    ])
    .with_worker(worker);
    let mut events = Vec::new();

    process.perform(&mut floor, None, 60, &mut events).unwrap();

    assert!(approx(planks(&floor, &unit), 30.0));
    assert!(approx(floor.units[&unit].units_produced(), 30.0));
}

#[test]
fn loading_two_per_cycle_yields_forty_planks() {
    let (mut floor, unit, worker) = started_sawmill(1.0);
    let mut process = Process::new(vec![
        Operation::load(unit.clone(), Material::new("wood", 2.0)),
        Operation::produce(unit.clone()),
    ])
    .with_worker(worker);
    let mut events = Vec::new();

    process.perform(&mut floor, None, 60, &mut events).unwrap();

    assert!(approx(planks(&floor, &unit), 40.0));
    assert!(floor.input_zone_of(&unit).unwrap().is_empty());
}

#[test]
fn load_produce_unload_moves_every_plank() {
    let (mut floor, unit, worker) = started_sawmill(1.0);
    let warehouse = floor.add_stocking_zone(None);
    let mut process = Process::new(vec![
        Operation::load(unit.clone(), Material::new("wood", 1.0)),
        Operation::produce(unit.clone()),
        Operation::unload(unit.clone(), 1.0, warehouse.clone()),
    ])
    .with_worker(worker);
    let mut events = Vec::new();

    process.perform(&mut floor, None, 180, &mut events).unwrap();

    assert!(approx(floor.zone(&warehouse).unwrap().quantity_of("plank"), 60.0));
    assert!(floor.output_zone_of(&unit).unwrap().is_empty());
}

#[test]
fn chained_unit_consumes_upstream_output() {
    let (mut floor, mill, worker) = started_sawmill(1.0);
    let mut chair_spec = Specification::new();
    chair_spec.add(Constraint::material_input(Material::new("plank", 2.0)));
    chair_spec.add_output_material(Material::new("chair", 1.0));
    let carpenter = floor.add_production_unit("carpenter", chair_spec, UnitSettings::default());
    let shared = floor.units[&mill].outputs.clone();
    floor.attach_input_zone(&carpenter, &shared).unwrap();
    let mut events = Vec::new();

    Operation::start(carpenter.clone())
        .perform(&mut floor, Some(&worker), 1, &mut events)
        .unwrap();
    Process::new(vec![
        Operation::load(mill.clone(), Material::new("wood", 1.0)),
        Operation::produce(mill.clone()),
    ])
    .with_worker(worker)
    .perform(&mut floor, None, 4, &mut events)
    .unwrap();
    assert!(approx(planks(&floor, &mill), 2.0));

    let outcome = Operation::produce(carpenter.clone())
        .perform(&mut floor, None, 1, &mut events)
        .unwrap();

    assert_eq!(outcome, StepOutcome::Completed);
    assert!(approx(
        floor.output_zone_of(&carpenter).unwrap().quantity_of("chair"),
        1.0
    ));
    assert!(floor.zone(&shared).unwrap().is_empty());
}
