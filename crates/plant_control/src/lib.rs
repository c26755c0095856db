use std::collections::BTreeMap;

use plant_core::{EventEnvelope, Factory, UnitEvent, UnitId, UnitStatus};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Produces external lifecycle events for a factory, once per tick,
/// before the factory steps.
pub trait EventSource {
    fn generate_events(&mut self, factory: &Factory) -> Vec<(UnitId, UnitEvent)>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakdownConfig {
    /// Chance per tick that a running unit breaks down.
    pub failure_probability: f64,
    /// Ticks between a breakdown and its repair.
    pub repair_ticks: u64,
}

impl Default for BreakdownConfig {
    fn default() -> Self {
        Self {
            failure_probability: 0.0,
            repair_ticks: 30,
        }
    }
}

/// Breaks units down at random and repairs them after a fixed delay.
/// Deterministic for a given seed.
pub struct BreakdownController {
    config: BreakdownConfig,
    rng: ChaCha8Rng,
    /// Unit → tick its repair is due.
    repairs: BTreeMap<UnitId, u64>,
}

impl BreakdownController {
    pub fn new(config: BreakdownConfig, seed: u64) -> Self {
        Self {
            config: BreakdownConfig {
                failure_probability: config.failure_probability.clamp(0.0, 1.0),
                ..config
            },
            rng: ChaCha8Rng::seed_from_u64(seed),
            repairs: BTreeMap::new(),
        }
    }

    pub fn pending_repairs(&self) -> usize {
        self.repairs.len()
    }
}

impl EventSource for BreakdownController {
    fn generate_events(&mut self, factory: &Factory) -> Vec<(UnitId, UnitEvent)> {
        let tick = factory.current_time();
        let mut events = Vec::new();

        let due: Vec<UnitId> = self
            .repairs
            .iter()
            .filter(|(_, at)| **at <= tick)
            .map(|(unit, _)| unit.clone())
            .collect();
        for unit in due {
            self.repairs.remove(&unit);
            if factory.floor.status_of(&unit) == Ok(UnitStatus::Failure) {
                events.push((unit, UnitEvent::Fix));
            }
        }

        for unit in factory.floor.units.values() {
            let repairing = events.iter().any(|(id, _)| id == &unit.id);
            if unit.status() == UnitStatus::Failure || repairing {
                continue;
            }
            if self.rng.gen_bool(self.config.failure_probability) {
                tracing::debug!(unit = %unit.id, tick, "breakdown");
                self.repairs
                    .insert(unit.id.clone(), tick + self.config.repair_ticks);
                events.push((unit.id.clone(), UnitEvent::Failure));
            }
        }
        events
    }
}

/// Runs `factory` for `during` ticks, feeding `source`'s events in before
/// every step. Events the factory rejects are logged and dropped.
pub fn run_with_source(
    factory: &mut Factory,
    source: &mut impl EventSource,
    during: u64,
) -> Vec<EventEnvelope> {
    let mut events = Vec::new();
    for _ in 0..during {
        for (unit, event) in source.generate_events(factory) {
            match factory.apply_event(&unit, event) {
                Ok(applied) => events.extend(applied),
                Err(err) => tracing::warn!(unit = %unit, error = %err, "external event rejected"),
            }
        }
        events.extend(factory.do_step());
    }
    events
}
