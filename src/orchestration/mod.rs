//! Order fulfillment orchestration.

mod order;

pub use order::{
    CreateOrderInput, FulfillmentOutcome, MenuStockLine, OrderError, OrderOrchestrator,
};
