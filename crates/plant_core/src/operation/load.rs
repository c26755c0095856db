use serde::{Deserialize, Serialize};

use super::{OperationBehavior, StepContext};
use crate::{Event, Floor, Material, OperationError, ProductionUnit, UnitStatus};

const LOAD_STATES: &[UnitStatus] = &[UnitStatus::Idle, UnitStatus::Started, UnitStatus::Producing];

/// Feeds `material / time_to_perform` into the input zone every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOperation {
    pub material: Material,
}

/// Deposits the whole material at once when the cycle completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllInOneLoadOperation {
    pub material: Material,
}

fn check_loadable(material: &Material, unit: &ProductionUnit) -> Result<(), OperationError> {
    if unit.spec.validate_any(std::slice::from_ref(material)) {
        Ok(())
    } else {
        Err(OperationError::InvalidInputLoaded {
            unit_id: unit.id.clone(),
            material_type: material.material_type.clone(),
            quantity: material.quantity,
        })
    }
}

fn deposit(ctx: &mut StepContext<'_>, material: Material) -> Result<(), OperationError> {
    let zone = ctx.unit()?.inputs.clone();
    let (material_type, quantity) = (material.material_type.clone(), material.quantity);
    ctx.stock(&zone, material)?;
    ctx.emit(Event::MaterialLoaded {
        unit_id: ctx.unit_id.clone(),
        material_type,
        quantity,
    });
    Ok(())
}

impl OperationBehavior for LoadOperation {
    fn label(&self) -> &'static str {
        "load"
    }

    fn valid_states(&self) -> &'static [UnitStatus] {
        LOAD_STATES
    }

    fn check(&self, unit: &ProductionUnit, _floor: &Floor) -> Result<(), OperationError> {
        check_loadable(&self.material, unit)
    }

    fn step(&mut self, ctx: &mut StepContext<'_>) -> Result<(), OperationError> {
        let slice = self.material.quantity / f64::from(ctx.time_to_perform.max(1));
        deposit(ctx, self.material.portion(slice))
    }
}

impl OperationBehavior for AllInOneLoadOperation {
    fn label(&self) -> &'static str {
        "all_in_one_load"
    }

    fn valid_states(&self) -> &'static [UnitStatus] {
        LOAD_STATES
    }

    fn check(&self, unit: &ProductionUnit, _floor: &Floor) -> Result<(), OperationError> {
        check_loadable(&self.material, unit)
    }

    fn on_operation_complete(&mut self, ctx: &mut StepContext<'_>) -> Result<(), OperationError> {
        deposit(ctx, self.material.clone())
    }
}
