//! Top-level driver: one in-flight protocol operation per unit, a shared
//! worker pool, one tick per `do_step`.

use std::collections::{BTreeSet, VecDeque};

use crate::error::FailurePolicy;
use crate::{
    Event, EventEnvelope, Floor, Operation, OperationError, StepOutcome, UnitEvent, UnitId,
    UnitStatus, WorkerId,
};

/// FIFO pool of workers free to take an operation, plus the ones benched
/// for the rest of the day.
#[derive(Debug, Clone, Default)]
pub struct EventManager {
    available: VecDeque<WorkerId>,
    benched: BTreeSet<WorkerId>,
}

impl EventManager {
    pub fn make_available(&mut self, workers: impl IntoIterator<Item = WorkerId>) {
        self.available.clear();
        self.benched.clear();
        self.available.extend(workers);
    }

    pub fn acquire(&mut self) -> Option<WorkerId> {
        self.available.pop_front()
    }

    /// Returns a worker to the back of the pool unless it is benched.
    pub fn release(&mut self, worker: WorkerId) {
        if !self.benched.contains(&worker) && !self.available.contains(&worker) {
            self.available.push_back(worker);
        }
    }

    pub fn bench(&mut self, worker: WorkerId) {
        self.available.retain(|w| w != &worker);
        self.benched.insert(worker);
    }

    pub fn available(&self) -> impl Iterator<Item = &WorkerId> {
        self.available.iter()
    }

    pub fn is_benched(&self, worker: &WorkerId) -> bool {
        self.benched.contains(worker)
    }
}

pub struct Factory {
    pub name: String,
    pub floor: Floor,
    in_flight: Vec<Operation>,
    event_manager: EventManager,
    /// Ticks per working day. `None` disables automatic shift rollover.
    shift_length: Option<u64>,
}

impl Factory {
    /// Seeds the in-flight operations right away.
    pub fn new(name: impl Into<String>, floor: Floor) -> Self {
        let mut factory = Self {
            name: name.into(),
            floor,
            in_flight: Vec::new(),
            event_manager: EventManager::default(),
            shift_length: None,
        };
        factory.init_operations();
        factory
    }

    #[must_use]
    pub fn with_shift_length(mut self, minutes_per_day: u64) -> Self {
        self.shift_length = (minutes_per_day > 0).then_some(minutes_per_day);
        self
    }

    pub fn current_time(&self) -> u64 {
        self.floor.meta.tick
    }

    pub fn in_flight(&self) -> &[Operation] {
        &self.in_flight
    }

    pub fn event_manager(&self) -> &EventManager {
        &self.event_manager
    }

    /// One protocol operation per unit, every worker available again.
    pub fn init_operations(&mut self) {
        self.in_flight = self
            .floor
            .units
            .values_mut()
            .map(|unit| {
                unit.protocol.reset();
                unit.next_protocol_operation()
            })
            .collect();
        self.event_manager
            .make_available(self.floor.workers.keys().cloned());
    }

    pub fn run(&mut self, during: u64) -> Vec<EventEnvelope> {
        let mut events = Vec::new();
        for _ in 0..during {
            events.extend(self.do_step());
        }
        events
    }

    pub fn do_step(&mut self) -> Vec<EventEnvelope> {
        let mut events = Vec::new();
        let tick = self.floor.meta.tick;
        if let Some(day) = self.shift_length {
            if tick > 0 && tick.is_multiple_of(day) {
                self.begin_shift(tick / day, &mut events);
            }
        }

        let mut to_release: Vec<(WorkerId, UnitId)> = Vec::new();
        for index in 0..self.in_flight.len() {
            let unit_id = self.in_flight[index].unit.clone();
            let Ok(unit) = self.floor.unit(&unit_id) else {
                continue;
            };
            let needs_worker = self.in_flight[index].kind.requires_worker(unit);
            if unit.status() == UnitStatus::Failure {
                if let Some(worker) = self.in_flight[index].release_worker() {
                    to_release.push((worker, unit_id));
                }
                continue;
            }
            let operation = &mut self.in_flight[index];
            if needs_worker && operation.worker().is_none() {
                let Some(worker) = self.event_manager.acquire() else {
                    continue;
                };
                tracing::debug!(worker = %worker, unit = %unit_id, operation = operation.label(), "worker assigned");
                self.floor.emit(
                    &mut events,
                    Event::WorkerAssigned {
                        worker_id: worker.clone(),
                        unit_id: unit_id.clone(),
                    },
                );
                operation.bind_worker(worker);
            }
            self.step_in_flight(index, &unit_id, &mut to_release, &mut events);
        }

        for (worker, unit_id) in to_release {
            self.event_manager.release(worker.clone());
            self.floor.emit(
                &mut events,
                Event::WorkerReleased {
                    worker_id: worker,
                    unit_id,
                },
            );
        }
        self.floor.meta.tick += 1;
        events
    }

    fn step_in_flight(
        &mut self,
        index: usize,
        unit_id: &UnitId,
        to_release: &mut Vec<(WorkerId, UnitId)>,
        events: &mut Vec<EventEnvelope>,
    ) {
        loop {
            let operation = &mut self.in_flight[index];
            match operation.perform(&mut self.floor, None, 1, events) {
                Ok(StepOutcome::Completed) => {
                    let label = operation.label();
                    self.floor.emit(
                        events,
                        Event::OperationCompleted {
                            unit_id: unit_id.clone(),
                            operation: label.to_string(),
                        },
                    );
                    self.advance(index, unit_id, to_release);
                    return;
                }
                Ok(_) => return,
                Err(OperationError::DayOfWorkIsOver { worker_id }) => {
                    operation.release_worker();
                    tracing::warn!(worker = %worker_id, unit = %unit_id, "day of work is over, benching worker");
                    self.event_manager.bench(worker_id.clone());
                    self.floor
                        .emit(events, Event::DayOfWorkIsOver { worker_id });
                    if let Some(next) = self.event_manager.acquire() {
                        self.floor.emit(
                            events,
                            Event::WorkerAssigned {
                                worker_id: next.clone(),
                                unit_id: unit_id.clone(),
                            },
                        );
                        self.in_flight[index].bind_worker(next);
                    }
                }
                Err(err) => {
                    let label = operation.label();
                    tracing::debug!(unit = %unit_id, operation = label, error = %err, "operation failed");
                    self.floor.emit(
                        events,
                        Event::OperationFailed {
                            unit_id: unit_id.clone(),
                            operation: label.to_string(),
                            error_kind: err.kind().to_string(),
                            message: err.to_string(),
                        },
                    );
                    match err.failure_policy() {
                        FailurePolicy::Advance => self.advance(index, unit_id, to_release),
                        FailurePolicy::Retry => {
                            if let Some(worker) = self.in_flight[index].release_worker() {
                                to_release.push((worker, unit_id.clone()));
                            }
                        }
                    }
                    return;
                }
            }
        }
    }

    /// Replaces the in-flight operation with the unit's next protocol step.
    fn advance(&mut self, index: usize, unit_id: &UnitId, to_release: &mut Vec<(WorkerId, UnitId)>) {
        if let Some(worker) = self.in_flight[index].release_worker() {
            to_release.push((worker, unit_id.clone()));
        }
        if let Ok(unit) = self.floor.unit_mut(unit_id) {
            self.in_flight[index] = unit.next_protocol_operation();
        }
    }

    /// Resets every worker's hours and returns benched workers to the pool.
    pub fn start_new_shift(&mut self) -> Vec<EventEnvelope> {
        let mut events = Vec::new();
        let day = self
            .shift_length
            .map_or(0, |length| self.floor.meta.tick / length);
        self.begin_shift(day, &mut events);
        events
    }

    fn begin_shift(&mut self, day: u64, events: &mut Vec<EventEnvelope>) {
        for worker in self.floor.workers.values_mut() {
            worker.start_new_shift();
        }
        let busy: BTreeSet<WorkerId> = self
            .in_flight
            .iter()
            .filter_map(|op| op.worker().cloned())
            .collect();
        self.event_manager.make_available(
            self.floor
                .workers
                .keys()
                .filter(|id| !busy.contains(*id))
                .cloned(),
        );
        tracing::info!(factory = %self.name, day, "new shift started");
        self.floor.emit(events, Event::ShiftStarted { day });
    }

    /// Applies an external Failure or Fix to `unit`.
    pub fn apply_event(
        &mut self,
        unit: &UnitId,
        event: UnitEvent,
    ) -> Result<Vec<EventEnvelope>, OperationError> {
        let mut events = Vec::new();
        self.floor.apply_event(unit, event, &mut events)?;
        Ok(events)
    }

    pub fn unit_id_by_name(&self, name: &str) -> Option<UnitId> {
        self.floor.unit_by_name(name).map(|unit| unit.id.clone())
    }
}
