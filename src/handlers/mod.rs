//! gRPC service implementations.
//!
//! Handlers authenticate the caller, run the domain component, and map
//! domain errors onto status codes at the boundary:
//!
//! - not found            -> `NOT_FOUND`
//! - bad input            -> `INVALID_ARGUMENT`
//! - business rejection   -> `FAILED_PRECONDITION`
//! - duplicate creation   -> `ALREADY_EXISTS`
//! - storage failure      -> `INTERNAL`

pub mod auth;

mod inventory;
mod kitchen;
mod loyalty;
mod order;

pub use inventory::InventoryHandler;
pub use kitchen::KitchenHandler;
pub use loyalty::LoyaltyHandler;
pub use order::OrderHandler;

use chrono::{DateTime, Utc};
use tonic::Status;

use crate::interfaces::gateway::GatewayError;
use crate::interfaces::StorageError;
use crate::kitchen::TicketError;
use crate::ledger::LedgerError;
use crate::loyalty::LoyaltyError;
use crate::orchestration::OrderError;

pub(crate) fn timestamp(at: DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: at.timestamp(),
        nanos: at.timestamp_subsec_nanos() as i32,
    }
}

fn storage_status(error: StorageError) -> Status {
    match error {
        StorageError::Duplicate { entity, key } => {
            Status::already_exists(format!("{entity} already exists: {key}"))
        }
        StorageError::NotFound { entity, key } => {
            Status::not_found(format!("{entity} not found: {key}"))
        }
        other => Status::internal(other.to_string()),
    }
}

impl From<LedgerError> for Status {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::NotFound(_) => Status::not_found(error.to_string()),
            LedgerError::InvalidQuantity(_) => Status::invalid_argument(error.to_string()),
            LedgerError::InsufficientStock { .. } => {
                Status::failed_precondition(error.to_string())
            }
            LedgerError::Storage(e) => storage_status(e),
        }
    }
}

impl From<TicketError> for Status {
    fn from(error: TicketError) -> Self {
        match error {
            TicketError::NotFound(_)
            | TicketError::NoTicketForOrder(_)
            | TicketError::ChefNotFound(_) => Status::not_found(error.to_string()),
            TicketError::DuplicateOrder(_) => Status::already_exists(error.to_string()),
            TicketError::InvalidTransition { .. } | TicketError::ChefUnavailable(_) => {
                Status::failed_precondition(error.to_string())
            }
            TicketError::Storage(e) => storage_status(e),
        }
    }
}

impl From<LoyaltyError> for Status {
    fn from(error: LoyaltyError) -> Self {
        match error {
            LoyaltyError::NotEnrolled(_) => Status::not_found(error.to_string()),
            LoyaltyError::AlreadyEnrolled(_) => Status::already_exists(error.to_string()),
            LoyaltyError::InvalidPoints(_) => Status::invalid_argument(error.to_string()),
            LoyaltyError::InsufficientPoints { .. } => {
                Status::failed_precondition(error.to_string())
            }
            LoyaltyError::Storage(e) => storage_status(e),
        }
    }
}

impl From<OrderError> for Status {
    fn from(error: OrderError) -> Self {
        match error {
            OrderError::EmptyOrder
            | OrderError::InvalidQuantity(_)
            | OrderError::InvalidPrice(_) => Status::invalid_argument(error.to_string()),
            OrderError::DuplicateOrder(_) | OrderError::DuplicateMenu(_) => {
                Status::already_exists(error.to_string())
            }
            OrderError::NotFound(_) | OrderError::MenuNotFound(_) => {
                Status::not_found(error.to_string())
            }
            OrderError::InvalidTransition { .. } => Status::failed_precondition(error.to_string()),
            OrderError::Storage(e) => storage_status(e),
        }
    }
}

impl From<GatewayError> for Status {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::Unavailable(message) => Status::unavailable(message),
            GatewayError::Rejected(message) => Status::failed_precondition(message),
        }
    }
}
