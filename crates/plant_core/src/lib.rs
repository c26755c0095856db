//! `plant_core`: deterministic discrete-time production simulation.
//!
//! No IO, no network. Time advances one tick at a time through
//! [`Factory::do_step`]; everything that happened comes back as events.

mod error;
mod factory;
mod floor;
mod material;
mod operation;
mod process;
mod protocol;
mod registry;
pub mod report;
mod specification;
mod types;
mod unit;
mod worker;
mod zone;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use error::{OperationError, StockError};
pub use factory::{EventManager, Factory};
pub use floor::{Floor, UnitSettings};
pub use material::Material;
pub use operation::{
    AllInOneLoadOperation, LoadOperation, Operation, OperationKind, ProduceOperation,
    StartOperation, StopOperation, UnloadOperation,
};
pub use process::{ParallelProcess, Performable, Process};
pub use protocol::Protocol;
pub use registry::Registry;
pub use report::{factory_report, floor_status, unit_report, FactoryReport, UnitReport};
pub use specification::{Constraint, Specification};
pub use types::*;
pub use unit::{ProductionUnit, ProductionUnitState, Transition};
pub use worker::{Worker, DEFAULT_WORKING_HOUR};
pub use zone::StockingZone;

pub(crate) fn emit(counters: &mut Counters, tick: u64, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, tick, event }
}

#[cfg(test)]
mod tests;
