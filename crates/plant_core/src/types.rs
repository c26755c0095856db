//! Type definitions for `plant_core`.
//!
//! ID newtypes, unit status, events, counters and the factory description
//! consumed by the configuration layer.

use serde::{Deserialize, Serialize};

use crate::Material;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(UnitId);
string_id!(ZoneId);
string_id!(WorkerId);
string_id!(EventId);

/// Reference handed out by the [`Registry`](crate::Registry) for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactoryRef(pub u64);

impl std::fmt::Display for FactoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitStatus {
    Idle,
    Started,
    Producing,
    Failure,
}

impl std::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            UnitStatus::Idle => "IDLE",
            UnitStatus::Started => "STARTED",
            UnitStatus::Producing => "PRODUCING",
            UnitStatus::Failure => "FAILURE",
        };
        f.write_str(label)
    }
}

/// External lifecycle events. They bypass operation checks entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitEvent {
    Failure,
    Fix,
}

/// Result of one tick of an operation or process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// The effect ran and progress advanced.
    Progressed,
    /// The operation finished this tick.
    Completed,
    /// Nothing to do this tick (e.g. unloading an empty zone).
    Stalled,
}

// ---------------------------------------------------------------------------
// State bookkeeping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaState {
    pub tick: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
    pub next_unit_id: u64,
    pub next_zone_id: u64,
    pub next_worker_id: u64,
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub tick: u64,
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    StateChanged {
        unit_id: UnitId,
        from: UnitStatus,
        to: UnitStatus,
    },
    MaterialLoaded {
        unit_id: UnitId,
        material_type: String,
        quantity: f64,
    },
    BatchProduced {
        unit_id: UnitId,
        outputs: Vec<Material>,
    },
    MaterialUnloaded {
        unit_id: UnitId,
        zone_id: ZoneId,
        material_type: String,
        quantity: f64,
    },
    OperationCompleted {
        unit_id: UnitId,
        operation: String,
    },
    OperationFailed {
        unit_id: UnitId,
        operation: String,
        /// Stable taxonomy name, see [`OperationError::kind`](crate::OperationError::kind).
        error_kind: String,
        message: String,
    },
    WorkerAssigned {
        worker_id: WorkerId,
        unit_id: UnitId,
    },
    WorkerReleased {
        worker_id: WorkerId,
        unit_id: UnitId,
    },
    DayOfWorkIsOver {
        worker_id: WorkerId,
    },
    ShiftStarted {
        day: u64,
    },
}

// ---------------------------------------------------------------------------
// Factory description types
// ---------------------------------------------------------------------------

fn default_rate() -> f64 {
    1.0
}

fn default_load_time() -> u32 {
    1
}

fn default_count() -> u32 {
    1
}

/// Structured description a factory is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactoryDef {
    pub name: String,
    /// Ticks per working day. `None` disables automatic shift rollover.
    #[serde(default)]
    pub minutes_per_day: Option<u64>,
    pub production_units: Vec<ProductionUnitDef>,
    #[serde(default)]
    pub workers: Vec<WorkerDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionUnitDef {
    pub name: String,
    #[serde(default = "default_rate")]
    pub rate: f64,
    /// Ticks each protocol load takes.
    #[serde(default = "default_load_time")]
    pub load_time: u32,
    #[serde(default)]
    pub input_capacity: Option<f64>,
    #[serde(default)]
    pub output_capacity: Option<f64>,
    /// Skills a worker needs to start the unit.
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<MaterialDef>,
    #[serde(default)]
    pub outputs: Vec<OutputDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialDef {
    #[serde(rename = "type")]
    pub material_type: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDef {
    #[serde(rename = "type")]
    pub material_type: String,
    pub quantity: f64,
    #[serde(default)]
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerDef {
    pub working_hour: u32,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Number of identical workers described by this entry.
    #[serde(default = "default_count")]
    pub count: u32,
}
