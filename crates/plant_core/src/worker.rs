use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{OperationError, WorkerId};

/// Default shift: eight hours of one-minute ticks.
pub const DEFAULT_WORKING_HOUR: u32 = 8 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub skills: BTreeSet<String>,
    /// Units of work allowed per shift.
    pub working_hour: u32,
    hours_worked: u32,
}

impl Worker {
    pub fn new(id: WorkerId, working_hour: u32) -> Self {
        Self {
            id,
            skills: BTreeSet::new(),
            working_hour,
            hours_worked: 0,
        }
    }

    #[must_use]
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.add_skill(skill);
        self
    }

    pub fn add_skill(&mut self, skill: impl Into<String>) {
        self.skills.insert(skill.into());
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains(skill)
    }

    pub fn hours_worked(&self) -> u32 {
        self.hours_worked
    }

    pub fn is_exhausted(&self) -> bool {
        self.hours_worked >= self.working_hour
    }

    /// Charges one tick of work. Past the shift limit the increment is
    /// rejected and the count stays where it was.
    pub fn add_unit_of_work(&mut self) -> Result<(), OperationError> {
        let next = self.hours_worked + 1;
        if next > self.working_hour {
            return Err(OperationError::DayOfWorkIsOver {
                worker_id: self.id.clone(),
            });
        }
        self.hours_worked = next;
        Ok(())
    }

    pub fn start_new_shift(&mut self) {
        self.hours_worked = 0;
    }
}
