//! Plain-data views of a factory for the outer layers.

use serde::Serialize;

use crate::{Factory, Material, UnitStatus, ZoneId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactoryReport {
    pub current_time: u64,
    pub production_unit_count: usize,
    pub worker_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitReport {
    pub name: String,
    pub state: UnitStatus,
    /// Output types declared by the unit's specification.
    pub produced_material_types: Vec<String>,
    pub units_produced: f64,
    pub value_produced: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitStatusLine {
    pub name: String,
    pub state: UnitStatus,
    pub inputs: Vec<Material>,
    pub outputs: Vec<Material>,
}

pub fn factory_report(factory: &Factory) -> FactoryReport {
    FactoryReport {
        current_time: factory.current_time(),
        production_unit_count: factory.floor.units.len(),
        worker_count: factory.floor.workers.len(),
    }
}

pub fn unit_report(factory: &Factory, name: &str) -> Option<UnitReport> {
    let unit = factory.floor.unit_by_name(name)?;
    let mut produced_material_types: Vec<String> = Vec::new();
    for output in unit.spec.output_materials() {
        if !produced_material_types.contains(&output.material_type) {
            produced_material_types.push(output.material_type.clone());
        }
    }
    Some(UnitReport {
        name: unit.name.clone(),
        state: unit.status(),
        produced_material_types,
        units_produced: unit.units_produced(),
        value_produced: unit.value_produced(),
    })
}

pub fn floor_status(factory: &Factory) -> Vec<UnitStatusLine> {
    let floor = &factory.floor;
    floor
        .units
        .values()
        .map(|unit| {
            let stock = |zone: &ZoneId| {
                floor
                    .zone(zone)
                    .map(|z| z.materials().to_vec())
                    .unwrap_or_default()
            };
            UnitStatusLine {
                name: unit.name.clone(),
                state: unit.status(),
                inputs: stock(&unit.inputs),
                outputs: stock(&unit.outputs),
            }
        })
        .collect()
}
