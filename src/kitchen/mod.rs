//! The kitchen ticket store.

mod board;

pub use board::{TicketBoard, TicketError};
