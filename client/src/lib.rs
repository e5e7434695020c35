//! Warung client library.
//!
//! Generated protocol types for the four warung services plus the typed
//! resilient clients used for every cross-service and third-party call.
//! All remote calls go through [`RetryPolicy`]: exponential backoff between
//! attempts, an independent timeout per attempt, and the last error raised
//! once the budget is exhausted. Call sites that speak to services with a
//! legacy query shape compose [`with_fallback`] around the retry loop.

pub mod auth;
pub mod call;
pub mod channel;
pub mod inventory;
pub mod kitchen;
pub mod loyalty;
pub mod supplier;

pub use auth::Identity;
pub use call::{with_fallback, RetryPolicy};
pub use channel::{connect_channel, connect_with_backoff, connection_backoff};
pub use inventory::InventoryClient;
pub use kitchen::KitchenClient;
pub use loyalty::LoyaltyClient;
pub use supplier::SupplierClient;

pub mod proto {
    pub mod inventory {
        tonic::include_proto!("warung.inventory");
    }
    pub mod kitchen {
        tonic::include_proto!("warung.kitchen");
    }
    pub mod loyalty {
        tonic::include_proto!("warung.loyalty");
    }
    pub mod order {
        tonic::include_proto!("warung.order");
    }
    pub mod supplier {
        tonic::include_proto!("warung.supplier");
    }
}
