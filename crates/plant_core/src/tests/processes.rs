use super::*;

fn wood_then_produce(unit: &UnitId) -> Process {
    Process::new(vec![
        Operation::load(unit.clone(), Material::new("wood", 1.0)),
        Operation::produce(unit.clone()),
    ])
}

#[test]
fn cursor_persists_and_wraps() {
    let (mut floor, unit, worker) = started_sawmill(1.0);
    let mut process = wood_then_produce(&unit).with_worker(worker);
    let mut events = Vec::new();

    process.perform(&mut floor, None, 1, &mut events).unwrap();
    assert_eq!(process.cursor(), 1);

    let outcome = process.perform(&mut floor, None, 1, &mut events).unwrap();
    assert_eq!(process.cursor(), 0);
    assert_eq!(outcome, StepOutcome::Progressed);
}

#[test]
fn retryable_failure_keeps_the_cursor() {
    let (mut floor, unit, _) = started_sawmill(1.0);
    let mut process = wood_then_produce(&unit);
    let mut events = Vec::new();

    let err = process.perform(&mut floor, None, 1, &mut events).unwrap_err();

    assert_eq!(err.kind(), "NoWorkerToPerformAction");
    assert_eq!(process.cursor(), 0);
}

#[test]
fn cannot_produce_moves_on_to_the_next_operation() {
    let (mut floor, unit, worker) = started_sawmill(1.0);
    let mut process = Process::new(vec![
        Operation::produce(unit.clone()),
        Operation::load(unit.clone(), Material::new("wood", 1.0)),
    ])
    .with_worker(worker);
    let mut events = Vec::new();

    let err = process.perform(&mut floor, None, 1, &mut events).unwrap_err();
    assert_eq!(err.kind(), "CannotProduce");
    assert_eq!(process.cursor(), 1);

    process.perform(&mut floor, None, 1, &mut events).unwrap();
    assert!(approx(wood(&floor, &unit), 1.0));
}

#[test]
fn leftover_input_does_not_stall_the_cycle() {
    let (mut floor, unit, worker) = started_sawmill(1.0);
    let mut process = Process::new(vec![
        Operation::load(unit.clone(), Material::new("wood", 1.5)),
        Operation::produce(unit.clone()),
    ])
    .with_worker(worker);
    let mut events = Vec::new();
    let mut failures = Vec::new();

    for _ in 0..20 {
        if let Err(err) = process.perform(&mut floor, None, 1, &mut events) {
            failures.push(err.kind());
        }
    }

    assert!(approx(planks(&floor, &unit), 10.0));
    assert!(approx(wood(&floor, &unit), 0.5));
    assert_eq!(failures, vec!["CannotProduce"; 3]);
}

#[test]
fn process_worker_overrides_operation_workers() {
    let (mut floor, unit, first) = started_sawmill(1.0);
    let second = floor.hire_worker(TIRELESS, &[]);
    let mut process = Process::new(vec![
        Operation::load(unit.clone(), Material::new("wood", 1.0)).with_worker(first.clone())
    ])
    .with_worker(second.clone());
    let first_hours = floor.workers[&first].hours_worked();
    let mut events = Vec::new();

    process.perform(&mut floor, None, 1, &mut events).unwrap();

    assert_eq!(floor.workers[&first].hours_worked(), first_hours);
    assert_eq!(floor.workers[&second].hours_worked(), 1);
}

#[test]
fn parallel_steps_every_process_before_reporting_an_error() {
    let (mut floor, unit, worker) = started_sawmill(1.0);
    let mut parallel = ParallelProcess::new(vec![
        Process::new(vec![Operation::produce(unit.clone())]),
        Process::new(vec![Operation::load(unit.clone(), Material::new("wood", 1.0))])
            .with_worker(worker),
    ]);
    let mut events = Vec::new();

    let err = parallel.perform(&mut floor, None, 1, &mut events).unwrap_err();

    assert_eq!(err.kind(), "CannotProduce");
    assert!(approx(wood(&floor, &unit), 1.0));
}

#[test]
fn parallel_loading_and_unloading_share_the_timeline() {
    let (mut floor, unit, loader) = started_sawmill(1.0);
    let unloader = floor.hire_worker(TIRELESS, &[]);
    let warehouse = floor.add_stocking_zone(None);
    let mut parallel = ParallelProcess::new(vec![
        wood_then_produce(&unit).with_worker(loader),
        Process::new(vec![Operation::unload(unit.clone(), 10.0, warehouse.clone())])
            .with_worker(unloader),
    ]);
    let mut events = Vec::new();
    let unloaded = |floor: &Floor| floor.zone(&warehouse).unwrap().quantity_of("plank");

    parallel.perform(&mut floor, None, 1, &mut events).unwrap();
    assert!(approx(unloaded(&floor), 0.0));

    parallel.perform(&mut floor, None, 3, &mut events).unwrap();
    assert!(approx(unloaded(&floor), 2.0));

    parallel.perform(&mut floor, None, 56, &mut events).unwrap();
    assert!(approx(unloaded(&floor), 30.0));
    assert!(floor.output_zone_of(&unit).unwrap().is_empty());
}
