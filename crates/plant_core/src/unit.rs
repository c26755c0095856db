//! Production unit and its state machine.
//!
//! Each [`UnitStatus`] dispatches to a zero-sized state value implementing
//! [`ProductionUnitState`]. A state only overrides the transitions it allows;
//! everything else falls through to the default, which fails with
//! [`OperationError::IllegalStateToPerformAction`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::protocol::Protocol;
use crate::{
    emit, Counters, Event, EventEnvelope, Material, Operation, OperationError, Specification,
    UnitEvent, UnitId, UnitStatus, ZoneId,
};

/// Requested state change. Operations issue `Start`, `Stop`, `Produce` and
/// `Interrupt`; external events issue `Fail` and `Fix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    Stop,
    Produce,
    /// Falls back from producing to started when inputs run short.
    Interrupt,
    Fail,
    Fix,
}

impl Transition {
    fn label(self) -> &'static str {
        match self {
            Transition::Start => "start",
            Transition::Stop => "stop",
            Transition::Produce => "produce",
            Transition::Interrupt => "interrupt",
            Transition::Fail => "fail",
            Transition::Fix => "fix",
        }
    }
}

impl From<UnitEvent> for Transition {
    fn from(event: UnitEvent) -> Self {
        match event {
            UnitEvent::Failure => Transition::Fail,
            UnitEvent::Fix => Transition::Fix,
        }
    }
}

pub trait ProductionUnitState {
    fn status(&self) -> UnitStatus;

    fn start(&self, unit_id: &UnitId) -> Result<UnitStatus, OperationError> {
        Err(self.illegal(unit_id, Transition::Start))
    }

    fn stop(&self, unit_id: &UnitId) -> Result<UnitStatus, OperationError> {
        Err(self.illegal(unit_id, Transition::Stop))
    }

    fn produce(&self, unit_id: &UnitId) -> Result<UnitStatus, OperationError> {
        Err(self.illegal(unit_id, Transition::Produce))
    }

    fn interrupt(&self, unit_id: &UnitId) -> Result<UnitStatus, OperationError> {
        Err(self.illegal(unit_id, Transition::Interrupt))
    }

    /// Any state can fail.
    fn fail(&self, _unit_id: &UnitId) -> Result<UnitStatus, OperationError> {
        Ok(UnitStatus::Failure)
    }

    fn fix(&self, unit_id: &UnitId) -> Result<UnitStatus, OperationError> {
        Err(self.illegal(unit_id, Transition::Fix))
    }

    fn illegal(&self, unit_id: &UnitId, transition: Transition) -> OperationError {
        OperationError::IllegalStateToPerformAction {
            unit_id: unit_id.clone(),
            state: self.status(),
            operation: transition.label(),
        }
    }
}

pub struct IdleState;
pub struct StartedState;
pub struct ProducingState;
pub struct FailureState;

impl ProductionUnitState for IdleState {
    fn status(&self) -> UnitStatus {
        UnitStatus::Idle
    }

    fn start(&self, _unit_id: &UnitId) -> Result<UnitStatus, OperationError> {
        Ok(UnitStatus::Started)
    }
}

impl ProductionUnitState for StartedState {
    fn status(&self) -> UnitStatus {
        UnitStatus::Started
    }

    fn stop(&self, _unit_id: &UnitId) -> Result<UnitStatus, OperationError> {
        Ok(UnitStatus::Idle)
    }

    fn produce(&self, _unit_id: &UnitId) -> Result<UnitStatus, OperationError> {
        Ok(UnitStatus::Producing)
    }
}

impl ProductionUnitState for ProducingState {
    fn status(&self) -> UnitStatus {
        UnitStatus::Producing
    }

    fn produce(&self, _unit_id: &UnitId) -> Result<UnitStatus, OperationError> {
        Ok(UnitStatus::Producing)
    }

    fn interrupt(&self, _unit_id: &UnitId) -> Result<UnitStatus, OperationError> {
        Ok(UnitStatus::Started)
    }
}

impl ProductionUnitState for FailureState {
    fn status(&self) -> UnitStatus {
        UnitStatus::Failure
    }

    fn fix(&self, _unit_id: &UnitId) -> Result<UnitStatus, OperationError> {
        Ok(UnitStatus::Started)
    }
}

impl UnitStatus {
    pub fn behavior(self) -> &'static dyn ProductionUnitState {
        match self {
            UnitStatus::Idle => &IdleState,
            UnitStatus::Started => &StartedState,
            UnitStatus::Producing => &ProducingState,
            UnitStatus::Failure => &FailureState,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionUnit {
    pub id: UnitId,
    pub name: String,
    status: UnitStatus,
    pub spec: Specification,
    /// Produce progress per tick. One batch per tick at most.
    pub rate: f64,
    pub inputs: ZoneId,
    pub outputs: ZoneId,
    pub protocol: Protocol,
    /// Quantity produced per material type over the unit's lifetime,
    /// independent of later unloading.
    produced: BTreeMap<String, f64>,
}

impl ProductionUnit {
    pub fn new(
        id: UnitId,
        name: impl Into<String>,
        spec: Specification,
        rate: f64,
        inputs: ZoneId,
        outputs: ZoneId,
        protocol: Protocol,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            status: UnitStatus::Idle,
            spec,
            rate,
            inputs,
            outputs,
            protocol,
            produced: BTreeMap::new(),
        }
    }

    pub fn status(&self) -> UnitStatus {
        self.status
    }

    /// Runs `transition` against the current state. Emits `StateChanged`
    /// only when the status actually moves.
    pub(crate) fn apply(
        &mut self,
        transition: Transition,
        tick: u64,
        counters: &mut Counters,
        events: &mut Vec<EventEnvelope>,
    ) -> Result<UnitStatus, OperationError> {
        let state = self.status.behavior();
        let next = match transition {
            Transition::Start => state.start(&self.id)?,
            Transition::Stop => state.stop(&self.id)?,
            Transition::Produce => state.produce(&self.id)?,
            Transition::Interrupt => state.interrupt(&self.id)?,
            Transition::Fail => state.fail(&self.id)?,
            Transition::Fix => state.fix(&self.id)?,
        };
        if next != self.status {
            tracing::debug!(unit = %self.id, from = %self.status, to = %next, "unit state changed");
            events.push(emit(
                counters,
                tick,
                Event::StateChanged {
                    unit_id: self.id.clone(),
                    from: self.status,
                    to: next,
                },
            ));
            self.status = next;
        }
        Ok(next)
    }

    /// Next operation of the unit's canonical cycle.
    pub fn next_protocol_operation(&mut self) -> Operation {
        self.protocol.next_operation(&self.id, &self.spec)
    }

    pub(crate) fn record_output(&mut self, material: &Material) {
        *self
            .produced
            .entry(material.material_type.clone())
            .or_insert(0.0) += material.quantity;
    }

    pub fn produced(&self) -> &BTreeMap<String, f64> {
        &self.produced
    }

    pub fn units_produced(&self) -> f64 {
        self.produced.values().sum()
    }

    pub fn value_produced(&self) -> f64 {
        self.produced
            .iter()
            .map(|(material_type, quantity)| quantity * self.spec.price_of(material_type))
            .sum()
    }
}
