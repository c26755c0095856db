//! Perpetual sequences of operations.

use serde::{Deserialize, Serialize};

use crate::error::FailurePolicy;
use crate::{EventEnvelope, Floor, Operation, OperationError, StepOutcome, WorkerId};

/// Anything that can be advanced tick by tick against a floor.
pub trait Performable {
    fn perform(
        &mut self,
        floor: &mut Floor,
        worker: Option<&WorkerId>,
        during: u32,
        events: &mut Vec<EventEnvelope>,
    ) -> Result<StepOutcome, OperationError>;
}

impl Performable for Operation {
    fn perform(
        &mut self,
        floor: &mut Floor,
        worker: Option<&WorkerId>,
        during: u32,
        events: &mut Vec<EventEnvelope>,
    ) -> Result<StepOutcome, OperationError> {
        Operation::perform(self, floor, worker, during, events)
    }
}

/// Fixed list of operations cycled forever. The cursor survives between
/// calls and moves when the current operation completes or fails in a way
/// that abandons it. A process never reports `Completed` itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    operations: Vec<Operation>,
    cursor: usize,
    worker: Option<WorkerId>,
}

impl Process {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self {
            operations,
            cursor: 0,
            worker: None,
        }
    }

    /// Binds one worker to every operation of the process.
    #[must_use]
    pub fn with_worker(mut self, worker: WorkerId) -> Self {
        self.worker = Some(worker);
        self
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&Operation> {
        self.operations.get(self.cursor)
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    fn tick(
        &mut self,
        floor: &mut Floor,
        worker: Option<&WorkerId>,
        events: &mut Vec<EventEnvelope>,
    ) -> Result<StepOutcome, OperationError> {
        let worker = worker.or(self.worker.as_ref());
        let Some(current) = self.operations.get_mut(self.cursor) else {
            return Ok(StepOutcome::Stalled);
        };
        match current.perform(floor, worker, 1, events) {
            Ok(StepOutcome::Completed) => {
                self.advance();
                Ok(StepOutcome::Progressed)
            }
            Ok(other) => Ok(other),
            Err(err) => {
                if err.failure_policy() == FailurePolicy::Advance {
                    self.advance();
                }
                Err(err)
            }
        }
    }

    fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.operations.len();
    }
}

impl Performable for Process {
    fn perform(
        &mut self,
        floor: &mut Floor,
        worker: Option<&WorkerId>,
        during: u32,
        events: &mut Vec<EventEnvelope>,
    ) -> Result<StepOutcome, OperationError> {
        let mut outcome = StepOutcome::Stalled;
        for _ in 0..during {
            outcome = self.tick(floor, worker, events)?;
        }
        Ok(outcome)
    }
}

/// Several processes sharing one timeline. Every process gets one step per
/// tick, in order; the first error of a tick is returned once the tick ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelProcess {
    processes: Vec<Process>,
}

impl ParallelProcess {
    pub fn new(processes: Vec<Process>) -> Self {
        Self { processes }
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }
}

impl Performable for ParallelProcess {
    fn perform(
        &mut self,
        floor: &mut Floor,
        worker: Option<&WorkerId>,
        during: u32,
        events: &mut Vec<EventEnvelope>,
    ) -> Result<StepOutcome, OperationError> {
        let mut outcome = StepOutcome::Stalled;
        for _ in 0..during {
            let mut first_error = None;
            outcome = StepOutcome::Stalled;
            for process in &mut self.processes {
                match process.tick(floor, worker, events) {
                    Ok(StepOutcome::Stalled) => {}
                    Ok(_) => outcome = StepOutcome::Progressed,
                    Err(err) => {
                        first_error.get_or_insert(err);
                    }
                }
            }
            if let Some(err) = first_error {
                return Err(err);
            }
        }
        Ok(outcome)
    }
}
