use serde::{Deserialize, Serialize};

use super::{stock_error, OperationBehavior, StepContext};
use crate::{Event, Floor, OperationError, ProductionUnit, UnitStatus, ZoneId};

/// Moves up to `quantity / time_to_perform` of the first stored output per
/// tick into `zone`. Stalls while the output zone is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnloadOperation {
    pub quantity: f64,
    pub zone: ZoneId,
}

impl OperationBehavior for UnloadOperation {
    fn label(&self) -> &'static str {
        "unload"
    }

    fn valid_states(&self) -> &'static [UnitStatus] {
        &[UnitStatus::Idle, UnitStatus::Started, UnitStatus::Producing]
    }

    fn check(&self, _unit: &ProductionUnit, floor: &Floor) -> Result<(), OperationError> {
        floor.zone(&self.zone).map(|_| ())
    }

    fn ready_to_be_performed(&self, unit: &ProductionUnit, floor: &Floor) -> bool {
        floor.zone(&unit.outputs).is_ok_and(|zone| !zone.is_empty())
    }

    fn step(&mut self, ctx: &mut StepContext<'_>) -> Result<(), OperationError> {
        let source = ctx.unit()?.outputs.clone();
        let per_tick = self.quantity / f64::from(ctx.time_to_perform.max(1));
        let Some(amount) = ctx
            .floor
            .zone(&source)?
            .materials()
            .first()
            .map(|m| m.quantity.min(per_tick))
        else {
            return Ok(());
        };
        if !ctx.floor.zone(&self.zone)?.can_accept(amount) {
            return Err(OperationError::StockIsFull {
                unit_id: ctx.unit_id.clone(),
                zone_id: self.zone.clone(),
            });
        }
        let Some(moved) = ctx.floor.zone_mut(&source)?.take_first(amount) else {
            return Ok(());
        };
        let (material_type, quantity) = (moved.material_type.clone(), moved.quantity);
        let unit_id = ctx.unit_id;
        ctx.floor
            .zone_mut(&self.zone)?
            .add_to_stock(moved)
            .map_err(|err| stock_error(unit_id, err))?;
        ctx.emit(Event::MaterialUnloaded {
            unit_id: ctx.unit_id.clone(),
            zone_id: self.zone.clone(),
            material_type,
            quantity,
        });
        Ok(())
    }
}
