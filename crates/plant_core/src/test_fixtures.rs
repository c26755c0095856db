//! Shared test fixtures for plant_core and downstream crates.
//!
//! `sawmill_floor()` is a single wood → plank unit with no workers.
//! `sawmill_factory()` wraps it in a factory with the given shift lengths.
//! `sawmill_def()` is the same setup as a `FactoryDef`, for ingestion tests.

use crate::{
    Constraint, Factory, FactoryDef, Floor, Material, MaterialDef, OutputDef, ProductionUnitDef,
    Specification, UnitId, UnitSettings, WorkerDef,
};

/// Working hours high enough that no test runs into the day limit.
pub const TIRELESS: u32 = 100_000;

pub const PLANK_PRICE: f64 = 2.5;

/// 1 wood → 1 plank, planks priced at [`PLANK_PRICE`].
pub fn wood_to_plank_spec() -> Specification {
    let mut spec = Specification::new();
    spec.add(Constraint::material_input(Material::new("wood", 1.0)));
    spec.add_priced_output(Material::new("plank", 1.0), PLANK_PRICE);
    spec
}

pub fn sawmill_floor(settings: UnitSettings) -> (Floor, UnitId) {
    let mut floor = Floor::new();
    let unit = floor.add_production_unit("sawmill", wood_to_plank_spec(), settings);
    (floor, unit)
}

/// One worker per entry of `working_hours`, no skills, no shift rollover.
pub fn sawmill_factory(working_hours: &[u32]) -> Factory {
    let (mut floor, _) = sawmill_floor(UnitSettings::default());
    for hours in working_hours {
        floor.hire_worker(*hours, &[]);
    }
    Factory::new("sawmill works", floor)
}

pub fn sawmill_def() -> FactoryDef {
    FactoryDef {
        name: "sawmill works".to_string(),
        minutes_per_day: None,
        production_units: vec![ProductionUnitDef {
            name: "sawmill".to_string(),
            rate: 1.0,
            load_time: 1,
            input_capacity: None,
            output_capacity: None,
            required_skills: vec![],
            inputs: vec![MaterialDef {
                material_type: "wood".to_string(),
                quantity: 1.0,
            }],
            outputs: vec![OutputDef {
                material_type: "plank".to_string(),
                quantity: 1.0,
                price: PLANK_PRICE,
            }],
        }],
        workers: vec![WorkerDef {
            working_hour: TIRELESS,
            skills: vec![],
            count: 1,
        }],
    }
}
