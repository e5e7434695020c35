//! Gateway implementations over the resilient clients.

mod grpc;

pub use grpc::{GrpcInventoryGateway, GrpcKitchenGateway, GrpcLoyaltyGateway, GrpcSupplierGateway};
