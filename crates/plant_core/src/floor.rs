//! Arena holding every unit, zone and worker of one factory.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::unit::Transition;
use crate::{
    emit, Constraint, Counters, Event, EventEnvelope, MetaState, OperationError,
    ProductionUnit, Protocol, Specification, StockingZone, UnitEvent, UnitId,
    UnitStatus, Worker, WorkerId, ZoneId,
};

/// Per-unit construction settings. Defaults: rate 1, load time 1,
/// unbounded zones, no start constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitSettings {
    pub rate: f64,
    pub load_time: u32,
    pub input_capacity: Option<f64>,
    pub output_capacity: Option<f64>,
    pub start_constraints: Vec<Constraint>,
}

impl Default for UnitSettings {
    fn default() -> Self {
        Self {
            rate: 1.0,
            load_time: 1,
            input_capacity: None,
            output_capacity: None,
            start_constraints: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Floor {
    pub meta: MetaState,
    pub counters: Counters,
    pub units: BTreeMap<UnitId, ProductionUnit>,
    pub zones: BTreeMap<ZoneId, StockingZone>,
    pub workers: BTreeMap<WorkerId, Worker>,
}

impl Floor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stocking_zone(&mut self, capacity: Option<f64>) -> ZoneId {
        self.counters.next_zone_id += 1;
        let id = ZoneId(format!("zone_{:04}", self.counters.next_zone_id));
        self.zones
            .insert(id.clone(), StockingZone::new(id.clone(), capacity));
        id
    }

    /// Creates the unit together with fresh input and output zones.
    pub fn add_production_unit(
        &mut self,
        name: impl Into<String>,
        spec: Specification,
        settings: UnitSettings,
    ) -> UnitId {
        let inputs = self.add_stocking_zone(settings.input_capacity);
        let outputs = self.add_stocking_zone(settings.output_capacity);
        self.counters.next_unit_id += 1;
        let id = UnitId(format!("unit_{:04}", self.counters.next_unit_id));
        let protocol = settings
            .start_constraints
            .into_iter()
            .fold(Protocol::new(settings.load_time), Protocol::with_start_constraint);
        let unit = ProductionUnit::new(
            id.clone(),
            name,
            spec,
            settings.rate,
            inputs,
            outputs,
            protocol,
        );
        self.units.insert(id.clone(), unit);
        id
    }

    pub fn hire_worker(&mut self, working_hour: u32, skills: &[String]) -> WorkerId {
        self.counters.next_worker_id += 1;
        let id = WorkerId(format!("worker_{:04}", self.counters.next_worker_id));
        let mut worker = Worker::new(id.clone(), working_hour);
        for skill in skills {
            worker.add_skill(skill.clone());
        }
        self.workers.insert(id.clone(), worker);
        id
    }

    /// Makes `unit` read its inputs from `zone`, e.g. another unit's outputs.
    pub fn attach_input_zone(&mut self, unit: &UnitId, zone: &ZoneId) -> Result<(), OperationError> {
        self.zone(zone)?;
        self.unit_mut(unit)?.inputs = zone.clone();
        Ok(())
    }

    pub fn attach_output_zone(
        &mut self,
        unit: &UnitId,
        zone: &ZoneId,
    ) -> Result<(), OperationError> {
        self.zone(zone)?;
        self.unit_mut(unit)?.outputs = zone.clone();
        Ok(())
    }

    pub fn unit(&self, id: &UnitId) -> Result<&ProductionUnit, OperationError> {
        self.units
            .get(id)
            .ok_or_else(|| OperationError::UnknownUnit(id.clone()))
    }

    pub fn unit_mut(&mut self, id: &UnitId) -> Result<&mut ProductionUnit, OperationError> {
        self.units
            .get_mut(id)
            .ok_or_else(|| OperationError::UnknownUnit(id.clone()))
    }

    pub fn unit_by_name(&self, name: &str) -> Option<&ProductionUnit> {
        self.units.values().find(|unit| unit.name == name)
    }

    pub fn zone(&self, id: &ZoneId) -> Result<&StockingZone, OperationError> {
        self.zones
            .get(id)
            .ok_or_else(|| OperationError::UnknownZone(id.clone()))
    }

    pub fn zone_mut(&mut self, id: &ZoneId) -> Result<&mut StockingZone, OperationError> {
        self.zones
            .get_mut(id)
            .ok_or_else(|| OperationError::UnknownZone(id.clone()))
    }

    pub fn worker(&self, id: &WorkerId) -> Result<&Worker, OperationError> {
        self.workers
            .get(id)
            .ok_or_else(|| OperationError::UnknownWorker(id.clone()))
    }

    pub fn worker_mut(&mut self, id: &WorkerId) -> Result<&mut Worker, OperationError> {
        self.workers
            .get_mut(id)
            .ok_or_else(|| OperationError::UnknownWorker(id.clone()))
    }

    pub fn input_zone_of(&self, unit: &UnitId) -> Result<&StockingZone, OperationError> {
        let zone = &self.unit(unit)?.inputs;
        self.zone(zone)
    }

    pub fn output_zone_of(&self, unit: &UnitId) -> Result<&StockingZone, OperationError> {
        let zone = &self.unit(unit)?.outputs;
        self.zone(zone)
    }

    pub fn status_of(&self, unit: &UnitId) -> Result<UnitStatus, OperationError> {
        Ok(self.unit(unit)?.status())
    }

    /// Applies an external lifecycle event. Operation checks are bypassed.
    pub fn apply_event(
        &mut self,
        unit: &UnitId,
        event: UnitEvent,
        events: &mut Vec<EventEnvelope>,
    ) -> Result<UnitStatus, OperationError> {
        self.transition(unit, Transition::from(event), events)
    }

    pub(crate) fn transition(
        &mut self,
        unit: &UnitId,
        transition: Transition,
        events: &mut Vec<EventEnvelope>,
    ) -> Result<UnitStatus, OperationError> {
        let tick = self.meta.tick;
        let production_unit = self
            .units
            .get_mut(unit)
            .ok_or_else(|| OperationError::UnknownUnit(unit.clone()))?;
        production_unit.apply(transition, tick, &mut self.counters, events)
    }

    pub(crate) fn emit(&mut self, events: &mut Vec<EventEnvelope>, event: Event) {
        events.push(emit(&mut self.counters, self.meta.tick, event));
    }
}
