//! Incremental, resumable operations against one production unit.
//!
//! An [`Operation`] carries the shared bookkeeping (unit, worker, duration,
//! fractional progress, attached constraints) and an [`OperationKind`] that
//! supplies the behavior through [`OperationBehavior`]. Hooks a kind does not
//! override fall back to the defaults on the trait.
//!
//! Each tick of [`Operation::perform`]:
//! 1. progress left at 1 by the previous completion resets to 0,
//! 2. the bound worker is charged one unit of work,
//! 3. a kind that is not ready stalls without progressing,
//! 4. otherwise the kind's step runs and progress advances; reaching 1 fires
//!    the completion hook.

mod lifecycle;
mod load;
mod produce;
mod unload;

pub use lifecycle::{StartOperation, StopOperation};
pub use load::{AllInOneLoadOperation, LoadOperation};
pub use produce::ProduceOperation;
pub use unload::UnloadOperation;

use serde::{Deserialize, Serialize};

use crate::{
    Constraint, Event, EventEnvelope, Floor, Material, OperationError, ProductionUnit, StepOutcome,
    StockError, UnitId, UnitStatus, WorkerId, ZoneId,
};

/// Progress within this distance of 1 counts as complete.
const PROGRESS_EPSILON: f64 = 1e-9;

/// Mutable view handed to an operation kind while it steps.
pub(crate) struct StepContext<'a> {
    pub floor: &'a mut Floor,
    pub unit_id: &'a UnitId,
    /// Worker acting on the operation this tick, if any.
    pub worker: Option<&'a WorkerId>,
    pub time_to_perform: u32,
    pub events: &'a mut Vec<EventEnvelope>,
}

impl StepContext<'_> {
    pub fn unit(&self) -> Result<&ProductionUnit, OperationError> {
        self.floor.unit(self.unit_id)
    }

    pub fn emit(&mut self, event: Event) {
        self.floor.emit(self.events, event);
    }

    /// Stocks `material` into `zone`, tagging a full zone with this unit.
    pub fn stock(&mut self, zone: &ZoneId, material: Material) -> Result<(), OperationError> {
        let unit_id = self.unit_id;
        self.floor
            .zone_mut(zone)?
            .add_to_stock(material)
            .map_err(|err| stock_error(unit_id, err))
    }
}

pub(crate) fn stock_error(unit_id: &UnitId, err: StockError) -> OperationError {
    match err {
        StockError::Full { zone_id, .. } => OperationError::StockIsFull {
            unit_id: unit_id.clone(),
            zone_id,
        },
        StockError::Insufficient {
            zone_id,
            material_type,
            requested,
            available,
        } => OperationError::InsufficientStock {
            unit_id: unit_id.clone(),
            zone_id,
            material_type,
            requested,
            available,
        },
    }
}

pub(crate) trait OperationBehavior {
    fn label(&self) -> &'static str;

    /// Unit states in which the operation may run.
    fn valid_states(&self) -> &'static [UnitStatus];

    fn requires_worker(&self, _unit: &ProductionUnit) -> bool {
        true
    }

    /// Kind-specific precondition, checked once before the first tick.
    fn check(&self, _unit: &ProductionUnit, _floor: &Floor) -> Result<(), OperationError> {
        Ok(())
    }

    fn ready_to_be_performed(&self, _unit: &ProductionUnit, _floor: &Floor) -> bool {
        true
    }

    fn progress_step(&self, time_to_perform: u32, _unit: &ProductionUnit) -> f64 {
        1.0 / f64::from(time_to_perform.max(1))
    }

    fn step(&mut self, _ctx: &mut StepContext<'_>) -> Result<(), OperationError> {
        Ok(())
    }

    fn on_operation_complete(&mut self, _ctx: &mut StepContext<'_>) -> Result<(), OperationError> {
        Ok(())
    }

    /// Asked after a cycle finishes. `false` keeps the operation running.
    fn is_complete(&self, _unit: &ProductionUnit, _floor: &Floor) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OperationKind {
    Load(LoadOperation),
    AllInOneLoad(AllInOneLoadOperation),
    Unload(UnloadOperation),
    Start(StartOperation),
    Stop(StopOperation),
    Produce(ProduceOperation),
}

impl OperationKind {
    pub fn label(&self) -> &'static str {
        self.behavior().label()
    }

    pub fn requires_worker(&self, unit: &ProductionUnit) -> bool {
        self.behavior().requires_worker(unit)
    }

    pub(crate) fn behavior(&self) -> &dyn OperationBehavior {
        match self {
            OperationKind::Load(op) => op,
            OperationKind::AllInOneLoad(op) => op,
            OperationKind::Unload(op) => op,
            OperationKind::Start(op) => op,
            OperationKind::Stop(op) => op,
            OperationKind::Produce(op) => op,
        }
    }

    pub(crate) fn behavior_mut(&mut self) -> &mut dyn OperationBehavior {
        match self {
            OperationKind::Load(op) => op,
            OperationKind::AllInOneLoad(op) => op,
            OperationKind::Unload(op) => op,
            OperationKind::Start(op) => op,
            OperationKind::Stop(op) => op,
            OperationKind::Produce(op) => op,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub unit: UnitId,
    worker: Option<WorkerId>,
    /// Ticks one cycle takes. Produce ignores it and paces on the unit rate.
    pub time_to_perform: u32,
    progress: f64,
    constraints: Vec<Constraint>,
    pub kind: OperationKind,
}

impl Operation {
    pub fn new(unit: UnitId, kind: OperationKind) -> Self {
        Self {
            unit,
            worker: None,
            time_to_perform: 1,
            progress: 0.0,
            constraints: Vec::new(),
            kind,
        }
    }

    pub fn start(unit: UnitId) -> Self {
        Self::new(unit, OperationKind::Start(StartOperation))
    }

    pub fn stop(unit: UnitId) -> Self {
        Self::new(unit, OperationKind::Stop(StopOperation))
    }

    pub fn load(unit: UnitId, material: Material) -> Self {
        Self::new(unit, OperationKind::Load(LoadOperation { material }))
    }

    pub fn all_in_one_load(unit: UnitId, material: Material) -> Self {
        Self::new(
            unit,
            OperationKind::AllInOneLoad(AllInOneLoadOperation { material }),
        )
    }

    /// Moves `quantity` per cycle from the unit's output zone into `zone`.
    pub fn unload(unit: UnitId, quantity: f64, zone: ZoneId) -> Self {
        Self::new(
            unit,
            OperationKind::Unload(UnloadOperation { quantity, zone }),
        )
    }

    pub fn produce(unit: UnitId) -> Self {
        Self::new(unit, OperationKind::Produce(ProduceOperation))
    }

    #[must_use]
    pub fn with_worker(mut self, worker: WorkerId) -> Self {
        self.worker = Some(worker);
        self
    }

    #[must_use]
    pub fn with_time_to_perform(mut self, ticks: u32) -> Self {
        self.time_to_perform = ticks.max(1);
        self
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn worker(&self) -> Option<&WorkerId> {
        self.worker.as_ref()
    }

    pub fn bind_worker(&mut self, worker: WorkerId) {
        self.worker = Some(worker);
    }

    pub fn release_worker(&mut self) -> Option<WorkerId> {
        self.worker.take()
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Checks run once before any tick: unit state, worker presence,
    /// attached constraints, then the kind's own precondition.
    pub fn check_all(&self, floor: &Floor) -> Result<(), OperationError> {
        let unit = floor.unit(&self.unit)?;
        let behavior = self.kind.behavior();
        if !behavior.valid_states().contains(&unit.status()) {
            return Err(OperationError::IllegalStateToPerformAction {
                unit_id: self.unit.clone(),
                state: unit.status(),
                operation: behavior.label(),
            });
        }
        let worker = match &self.worker {
            Some(id) => Some(floor.worker(id)?),
            None => None,
        };
        if behavior.requires_worker(unit) && worker.is_none() {
            return Err(OperationError::NoWorkerToPerformAction {
                unit_id: self.unit.clone(),
                operation: behavior.label(),
            });
        }
        let inputs = floor.zone(&unit.inputs)?.materials();
        if let Some(failed) = self
            .constraints
            .iter()
            .find(|constraint| !constraint.validate(inputs, worker))
        {
            return Err(OperationError::CannotPerformOperation {
                unit_id: self.unit.clone(),
                constraint: failed.to_string(),
            });
        }
        behavior.check(unit, floor)
    }

    /// Runs `during` ticks. A `worker` overrides the bound one.
    pub fn perform(
        &mut self,
        floor: &mut Floor,
        worker: Option<&WorkerId>,
        during: u32,
        events: &mut Vec<EventEnvelope>,
    ) -> Result<StepOutcome, OperationError> {
        if let Some(worker) = worker {
            self.worker = Some(worker.clone());
        }
        self.check_all(floor)?;
        let mut outcome = StepOutcome::Stalled;
        for _ in 0..during {
            outcome = self.tick(floor, events)?;
        }
        Ok(outcome)
    }

    fn tick(
        &mut self,
        floor: &mut Floor,
        events: &mut Vec<EventEnvelope>,
    ) -> Result<StepOutcome, OperationError> {
        if self.progress >= 1.0 - PROGRESS_EPSILON {
            self.progress = 0.0;
        }
        if let Some(worker) = &self.worker {
            floor.worker_mut(worker)?.add_unit_of_work()?;
        }

        let (ready, step) = {
            let unit = floor.unit(&self.unit)?;
            let behavior = self.kind.behavior();
            (
                behavior.ready_to_be_performed(unit, floor),
                behavior
                    .progress_step(self.time_to_perform, unit)
                    .clamp(0.0, 1.0),
            )
        };
        if !ready {
            return Ok(StepOutcome::Stalled);
        }

        let mut ctx = StepContext {
            floor,
            unit_id: &self.unit,
            worker: self.worker.as_ref(),
            time_to_perform: self.time_to_perform,
            events,
        };
        let behavior = self.kind.behavior_mut();
        behavior.step(&mut ctx)?;

        if self.progress + step < 1.0 - PROGRESS_EPSILON {
            self.progress += step;
            return Ok(StepOutcome::Progressed);
        }
        self.progress = 1.0;
        behavior.on_operation_complete(&mut ctx)?;

        let unit = ctx.floor.unit(&self.unit)?;
        if behavior.is_complete(unit, ctx.floor) {
            Ok(StepOutcome::Completed)
        } else {
            Ok(StepOutcome::Progressed)
        }
    }
}
