use serde::{Deserialize, Serialize};

use super::{OperationBehavior, StepContext};
use crate::unit::Transition;
use crate::{OperationError, UnitStatus};

/// IDLE → STARTED once the cycle completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartOperation;

/// STARTED → IDLE once the cycle completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopOperation;

impl OperationBehavior for StartOperation {
    fn label(&self) -> &'static str {
        "start"
    }

    fn valid_states(&self) -> &'static [UnitStatus] {
        &[UnitStatus::Idle]
    }

    fn on_operation_complete(&mut self, ctx: &mut StepContext<'_>) -> Result<(), OperationError> {
        ctx.floor
            .transition(ctx.unit_id, Transition::Start, ctx.events)
            .map(|_| ())
    }
}

impl OperationBehavior for StopOperation {
    fn label(&self) -> &'static str {
        "stop"
    }

    fn valid_states(&self) -> &'static [UnitStatus] {
        &[UnitStatus::Started]
    }

    fn on_operation_complete(&mut self, ctx: &mut StepContext<'_>) -> Result<(), OperationError> {
        ctx.floor
            .transition(ctx.unit_id, Transition::Stop, ctx.events)
            .map(|_| ())
    }
}
