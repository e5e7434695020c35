//! The stock ledger.

mod stock;

pub use stock::{LedgerError, StockCheck, StockLedger};
