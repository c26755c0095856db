use serde::{Deserialize, Serialize};

use super::{OperationBehavior, StepContext};
use crate::unit::Transition;
use crate::{Event, Floor, Material, OperationError, ProductionUnit, UnitStatus};

/// Turns inputs into one output batch per cycle, paced by the unit rate.
/// Runs until the input zone is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProduceOperation;

impl OperationBehavior for ProduceOperation {
    fn label(&self) -> &'static str {
        "produce"
    }

    fn valid_states(&self) -> &'static [UnitStatus] {
        &[UnitStatus::Started, UnitStatus::Producing]
    }

    /// Only a specification with skill constraints needs someone at the unit.
    fn requires_worker(&self, unit: &ProductionUnit) -> bool {
        unit.spec.requires_skill()
    }

    fn progress_step(&self, _time_to_perform: u32, unit: &ProductionUnit) -> f64 {
        unit.rate
    }

    /// Inputs are re-validated every tick, skill constraints against the
    /// acting worker. Falling short reverts a producing unit to STARTED.
    fn step(&mut self, ctx: &mut StepContext<'_>) -> Result<(), OperationError> {
        let unit = ctx.unit()?;
        let status = unit.status();
        let worker = match ctx.worker {
            Some(id) => Some(ctx.floor.worker(id)?),
            None => None,
        };
        let inputs = ctx.floor.zone(&unit.inputs)?.materials();
        if !unit.spec.validate_all_with(inputs, worker) {
            let constraint = unit
                .spec
                .first_unmet(inputs, worker)
                .map_or_else(|| "no inputs loaded".to_string(), ToString::to_string);
            if status == UnitStatus::Producing {
                ctx.floor
                    .transition(ctx.unit_id, Transition::Interrupt, ctx.events)?;
            }
            return Err(OperationError::CannotProduce {
                unit_id: ctx.unit_id.clone(),
                constraint,
            });
        }
        if status == UnitStatus::Started {
            ctx.floor
                .transition(ctx.unit_id, Transition::Produce, ctx.events)?;
        }
        Ok(())
    }

    /// The whole batch must fit the output zone before anything is consumed.
    fn on_operation_complete(&mut self, ctx: &mut StepContext<'_>) -> Result<(), OperationError> {
        let unit = ctx.unit()?;
        let (inputs, outputs) = (unit.inputs.clone(), unit.outputs.clone());
        let spec = unit.spec.clone();
        let batch: Vec<Material> = spec.output_materials().to_vec();
        let total: f64 = batch.iter().map(|m| m.quantity).sum();

        if !ctx.floor.zone(&outputs)?.can_accept(total) {
            return Err(OperationError::StockIsFull {
                unit_id: ctx.unit_id.clone(),
                zone_id: outputs,
            });
        }
        ctx.floor.zone_mut(&inputs)?.consume(&spec);
        for material in &batch {
            ctx.stock(&outputs, material.clone())?;
            ctx.floor.unit_mut(ctx.unit_id)?.record_output(material);
        }
        ctx.emit(Event::BatchProduced {
            unit_id: ctx.unit_id.clone(),
            outputs: batch,
        });
        Ok(())
    }

    fn is_complete(&self, unit: &ProductionUnit, floor: &Floor) -> bool {
        floor
            .zone(&unit.inputs)
            .map_or(true, crate::StockingZone::is_empty)
    }
}
