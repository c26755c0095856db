use thiserror::Error;

use crate::{UnitId, UnitStatus, WorkerId, ZoneId};

/// Failures raised while checking or stepping an operation.
///
/// All of them are recoverable simulation outcomes. The factory turns them
/// into [`Event::OperationFailed`](crate::Event::OperationFailed) and keeps
/// the timeline going.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("cannot {operation} unit {unit_id} while it is {state}")]
    IllegalStateToPerformAction {
        unit_id: UnitId,
        state: UnitStatus,
        operation: &'static str,
    },

    #[error("no worker assigned to {operation} unit {unit_id}")]
    NoWorkerToPerformAction {
        unit_id: UnitId,
        operation: &'static str,
    },

    #[error("{quantity} of {material_type} does not satisfy any input of unit {unit_id}")]
    InvalidInputLoaded {
        unit_id: UnitId,
        material_type: String,
        quantity: f64,
    },

    #[error("unit {unit_id} cannot produce: {constraint}")]
    CannotProduce { unit_id: UnitId, constraint: String },

    #[error("unit {unit_id}: constraint failed: {constraint}")]
    CannotPerformOperation { unit_id: UnitId, constraint: String },

    #[error("stocking zone {zone_id} of unit {unit_id} is full")]
    StockIsFull { unit_id: UnitId, zone_id: ZoneId },

    #[error("zone {zone_id} of unit {unit_id} holds {available} of {material_type}, {requested} requested")]
    InsufficientStock {
        unit_id: UnitId,
        zone_id: ZoneId,
        material_type: String,
        requested: f64,
        available: f64,
    },

    #[error("worker {worker_id} has no working hours left today")]
    DayOfWorkIsOver { worker_id: WorkerId },

    #[error("unknown production unit {0}")]
    UnknownUnit(UnitId),

    #[error("unknown stocking zone {0}")]
    UnknownZone(ZoneId),

    #[error("unknown worker {0}")]
    UnknownWorker(WorkerId),
}

impl OperationError {
    /// Stable taxonomy name, used by the API layer as the error code.
    pub fn kind(&self) -> &'static str {
        match self {
            OperationError::IllegalStateToPerformAction { .. } => "IllegalStateToPerformAction",
            OperationError::NoWorkerToPerformAction { .. } => "NoWorkerToPerformAction",
            OperationError::InvalidInputLoaded { .. } => "InvalidInputLoaded",
            OperationError::CannotProduce { .. } => "CannotProduce",
            OperationError::CannotPerformOperation { .. } => "CannotPerformOperation",
            OperationError::StockIsFull { .. } => "StockIsFull",
            OperationError::InsufficientStock { .. } => "InsufficientStock",
            OperationError::DayOfWorkIsOver { .. } => "DayOfWorkIsOver",
            OperationError::UnknownUnit(_) => "UnknownUnit",
            OperationError::UnknownZone(_) => "UnknownZone",
            OperationError::UnknownWorker(_) => "UnknownWorker",
        }
    }

    /// What an orchestrator does with the operation that raised `self`.
    pub(crate) fn failure_policy(&self) -> FailurePolicy {
        match self {
            OperationError::CannotProduce { .. }
            | OperationError::InvalidInputLoaded { .. }
            | OperationError::IllegalStateToPerformAction { .. } => FailurePolicy::Advance,
            _ => FailurePolicy::Retry,
        }
    }
}

/// Shared by the factory loop and [`Process`](crate::Process).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailurePolicy {
    /// Drop the operation and move on to the next one in the cycle.
    Advance,
    /// Keep the operation and try again next tick.
    Retry,
}

/// Failures of a single stocking zone mutation. Prior stock is untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StockError {
    #[error("zone {zone_id} is full: {requested} requested, {free} free")]
    Full {
        zone_id: ZoneId,
        requested: f64,
        free: f64,
    },

    #[error("zone {zone_id} holds {available} of {material_type}, {requested} requested")]
    Insufficient {
        zone_id: ZoneId,
        material_type: String,
        requested: f64,
        available: f64,
    },
}
