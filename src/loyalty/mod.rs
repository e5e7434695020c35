//! The loyalty points ledger.

mod ledger;

pub use ledger::{LoyaltyError, LoyaltyLedger};
