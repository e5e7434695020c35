//! Order and menu-catalog storage interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StorageResult;

/// Order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "preparing" => Some(Self::Preparing),
            "ready" => Some(Self::Ready),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether `self -> to` is a legal order-status transition.
    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, to),
            (Pending, Preparing)
                | (Pending, Completed)
                | (Pending, Cancelled)
                | (Preparing, Ready)
                | (Preparing, Completed)
                | (Preparing, Cancelled)
                | (Ready, Completed)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }
}

/// One ordered line, with the price captured at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub menu_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

/// Fulfillment saga step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SagaStep {
    Kitchen,
    Stock,
    Loyalty,
}

impl SagaStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kitchen => "kitchen",
            Self::Stock => "stock",
            Self::Loyalty => "loyalty",
        }
    }
}

/// Outcome of a fulfillment saga step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Succeeded,
    Failed,
    Skipped,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// One entry of the per-order saga step log. Kept on the order so partial
/// fulfillment can be reconciled out-of-band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: SagaStep,
    pub status: StepStatus,
    pub detail: String,
}

/// The authoritative order row.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: u64,
    pub order_id: String,
    pub customer_id: Option<String>,
    pub table_number: Option<String>,
    pub items: Vec<OrderLineItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub service_charge: f64,
    pub discount: f64,
    pub loyalty_points_used: f64,
    pub loyalty_points_earned: f64,
    pub total: f64,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub kitchen_status: Option<String>,
    pub notes: Option<String>,
    pub kitchen_ticket_created: bool,
    pub stock_updated: bool,
    pub fulfillment: Vec<StepRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A new order, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: String,
    pub customer_id: Option<String>,
    pub table_number: Option<String>,
    pub items: Vec<OrderLineItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub service_charge: f64,
    pub discount: f64,
    pub loyalty_points_used: f64,
    pub total: f64,
    pub payment_method: String,
    pub notes: Option<String>,
}

/// Per-unit ingredient requirement of a menu item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientRequirement {
    pub ingredient_id: String,
    pub ingredient_name: String,
    pub quantity: f64,
}

/// A menu catalog row.
#[derive(Debug, Clone)]
pub struct MenuRecord {
    pub id: u64,
    pub menu_id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub ingredients: Vec<IngredientRequirement>,
    pub available: bool,
    pub preparation_minutes: u32,
}

/// A new menu item, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewMenu {
    pub menu_id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub ingredients: Vec<IngredientRequirement>,
    pub preparation_minutes: u32,
}

/// Interface for order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new order. Fails `Duplicate` on an existing `order_id`.
    async fn insert_order(&self, order: NewOrder) -> StorageResult<OrderRecord>;

    async fn order(&self, order_id: &str) -> StorageResult<Option<OrderRecord>>;

    async fn update_order(&self, order: &OrderRecord) -> StorageResult<()>;
}

/// Interface for menu-catalog persistence.
#[async_trait]
pub trait MenuStore: Send + Sync {
    /// Insert a new menu item. Fails `Duplicate` on an existing `menu_id`.
    async fn insert_menu(&self, menu: NewMenu) -> StorageResult<MenuRecord>;

    async fn menu(&self, menu_id: &str) -> StorageResult<Option<MenuRecord>>;
}
