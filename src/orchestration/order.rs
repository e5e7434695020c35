//! The order fulfillment saga.
//!
//! `create_order` persists the order first — the durability boundary — then
//! fans out three best-effort side effects in a fixed sequence: kitchen
//! ticket, stock debits, loyalty credit. There is no shared transaction and
//! no rollback: a failed side effect is logged, recorded in the step log,
//! and reflected as a false outcome flag on the order. The order itself is
//! returned regardless.
//!
//! Known asymmetry: when a later stock debit fails after earlier ones
//! succeeded, no compensating credit is issued. The step log carries the
//! detail needed for out-of-band reconciliation.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::PricingPolicy;
use crate::interfaces::gateway::{InventoryGateway, KitchenGateway, LoyaltyGateway};
use crate::interfaces::order::{
    MenuRecord, MenuStore, NewMenu, NewOrder, OrderLineItem, OrderRecord, OrderStatus, OrderStore,
    SagaStep, StepRecord, StepStatus,
};
use crate::interfaces::stock::Reference;
use crate::interfaces::StorageError;

/// Result type for orchestration operations.
pub type Result<T> = std::result::Result<T, OrderError>;

/// Errors that can occur during orchestration.
///
/// Remote side-effect failures never appear here; they soft-fail into the
/// step log. These are the hard failures of the order service itself.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("order must contain at least one item")]
    EmptyOrder,

    #[error("invalid quantity for menu item {0}")]
    InvalidQuantity(String),

    #[error("invalid price for menu item {0}")]
    InvalidPrice(String),

    #[error("order already exists: {0}")]
    DuplicateOrder(String),

    #[error("order not found: {0}")]
    NotFound(String),

    #[error("menu not found: {0}")]
    MenuNotFound(String),

    #[error("menu already exists: {0}")]
    DuplicateMenu(String),

    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Input to `create_order`.
#[derive(Debug, Clone, Default)]
pub struct CreateOrderInput {
    /// Externally-stable identifier; generated when empty.
    pub order_id: Option<String>,
    pub customer_id: Option<String>,
    pub table_number: Option<String>,
    pub items: Vec<OrderLineItem>,
    pub payment_method: Option<String>,
    pub loyalty_points_used: f64,
    pub discount: Option<f64>,
    pub notes: Option<String>,
}

/// The persisted order plus the per-side-effect outcomes.
#[derive(Debug, Clone)]
pub struct FulfillmentOutcome {
    pub order: OrderRecord,
    pub kitchen_ticket_created: bool,
    pub stock_updated: bool,
    pub loyalty_points_earned: f64,
    pub message: String,
}

/// One line of a menu-level stock report.
#[derive(Debug, Clone)]
pub struct MenuStockLine {
    pub ingredient_id: String,
    pub ingredient_name: String,
    pub required: f64,
    pub available_quantity: f64,
    pub available: bool,
    pub message: String,
}

/// The order orchestrator.
pub struct OrderOrchestrator {
    orders: Arc<dyn OrderStore>,
    menus: Arc<dyn MenuStore>,
    kitchen: Arc<dyn KitchenGateway>,
    inventory: Arc<dyn InventoryGateway>,
    loyalty: Arc<dyn LoyaltyGateway>,
    pricing: PricingPolicy,
}

impl OrderOrchestrator {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        menus: Arc<dyn MenuStore>,
        kitchen: Arc<dyn KitchenGateway>,
        inventory: Arc<dyn InventoryGateway>,
        loyalty: Arc<dyn LoyaltyGateway>,
        pricing: PricingPolicy,
    ) -> Self {
        Self {
            orders,
            menus,
            kitchen,
            inventory,
            loyalty,
            pricing,
        }
    }

    /// Create an order and fan out its side effects.
    ///
    /// Steps, in fixed order:
    /// 1. validate + compute the monetary breakdown
    /// 2. persist the order (durability boundary)
    /// 3. kitchen ticket (best effort)
    /// 4. stock debits, one per required ingredient (best effort, all
    ///    attempted)
    /// 5. loyalty credit when a customer is attached (best effort)
    /// 6. persist outcome flags + step log, return everything
    pub async fn create_order(&self, input: CreateOrderInput) -> Result<FulfillmentOutcome> {
        if input.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        for item in &input.items {
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity(item.menu_id.clone()));
            }
            if item.price < 0.0 {
                return Err(OrderError::InvalidPrice(item.menu_id.clone()));
            }
        }

        let subtotal: f64 = input
            .items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum();
        let tax = subtotal * self.pricing.tax_rate;
        let service_charge = subtotal * self.pricing.service_charge_rate;
        let discount = input.discount.unwrap_or(0.0);
        let redemption = input.loyalty_points_used * self.pricing.redemption_rate;
        let total = subtotal + tax + service_charge - discount - redemption;

        let order_id = match input.order_id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("ORD-{}", Uuid::new_v4()),
        };

        // Durability boundary: once this insert succeeds the order exists
        // regardless of what the side effects do.
        let mut order = match self
            .orders
            .insert_order(NewOrder {
                order_id: order_id.clone(),
                customer_id: input.customer_id.clone(),
                table_number: input.table_number.clone(),
                items: input.items.clone(),
                subtotal,
                tax,
                service_charge,
                discount,
                loyalty_points_used: input.loyalty_points_used,
                total,
                payment_method: input
                    .payment_method
                    .unwrap_or_else(|| "cash".to_string()),
                notes: input.notes.clone(),
            })
            .await
        {
            Ok(order) => order,
            Err(StorageError::Duplicate { .. }) => {
                return Err(OrderError::DuplicateOrder(order_id));
            }
            Err(e) => return Err(e.into()),
        };

        let mut steps = Vec::with_capacity(3);

        self.open_kitchen_ticket(&mut order, &mut steps).await;
        self.debit_stock(&mut order, &mut steps).await;
        let loyalty_points_earned = self.credit_loyalty(&mut order, &mut steps).await;

        order.fulfillment = steps;
        order.updated_at = Utc::now();
        self.orders.update_order(&order).await?;

        let partial = order
            .fulfillment
            .iter()
            .any(|step| step.status == StepStatus::Failed);
        let message = if partial {
            "Order created with partial fulfillment".to_string()
        } else {
            "Order created successfully".to_string()
        };

        info!(
            order_id = %order.order_id,
            kitchen = order.kitchen_ticket_created,
            stock = order.stock_updated,
            loyalty_points_earned,
            "Order created"
        );

        Ok(FulfillmentOutcome {
            kitchen_ticket_created: order.kitchen_ticket_created,
            stock_updated: order.stock_updated,
            loyalty_points_earned,
            message,
            order,
        })
    }

    /// Step 3: open the kitchen ticket.
    async fn open_kitchen_ticket(&self, order: &mut OrderRecord, steps: &mut Vec<StepRecord>) {
        match self
            .kitchen
            .open_ticket(
                &order.order_id,
                order.table_number.as_deref(),
                &order.items,
            )
            .await
        {
            Ok(()) => {
                order.kitchen_ticket_created = true;
                order.kitchen_status = Some("pending".to_string());
                steps.push(StepRecord {
                    step: SagaStep::Kitchen,
                    status: StepStatus::Succeeded,
                    detail: "ticket opened".to_string(),
                });
            }
            Err(e) => {
                warn!(order_id = %order.order_id, error = %e, "Kitchen ticket creation failed");
                steps.push(StepRecord {
                    step: SagaStep::Kitchen,
                    status: StepStatus::Failed,
                    detail: e.to_string(),
                });
            }
        }
    }

    /// Step 4: debit stock for every ingredient the ordered items require.
    ///
    /// Every debit is attempted even after a failure; failed ones are
    /// collected into the step detail and no compensating credit is issued.
    async fn debit_stock(&self, order: &mut OrderRecord, steps: &mut Vec<StepRecord>) {
        let mut attempted = 0u32;
        let mut failures: Vec<String> = Vec::new();

        for item in &order.items {
            let menu = match self.menus.menu(&item.menu_id).await {
                Ok(Some(menu)) => menu,
                Ok(None) => {
                    failures.push(format!("menu not found: {}", item.menu_id));
                    continue;
                }
                Err(e) => {
                    failures.push(format!("menu lookup failed for {}: {}", item.menu_id, e));
                    continue;
                }
            };

            for requirement in &menu.ingredients {
                attempted += 1;
                let quantity = requirement.quantity * f64::from(item.quantity);
                let result = self
                    .inventory
                    .reduce_stock(
                        &requirement.ingredient_id,
                        quantity,
                        &format!("Order {}", order.order_id),
                        Reference {
                            id: order.order_id.clone(),
                            kind: "order".to_string(),
                        },
                    )
                    .await;
                if let Err(e) = result {
                    warn!(
                        order_id = %order.order_id,
                        ingredient_id = %requirement.ingredient_id,
                        error = %e,
                        "Stock debit failed"
                    );
                    failures.push(format!("{}: {}", requirement.ingredient_id, e));
                }
            }
        }

        if attempted == 0 {
            steps.push(StepRecord {
                step: SagaStep::Stock,
                status: StepStatus::Skipped,
                detail: "no ingredient requirements".to_string(),
            });
        } else if failures.is_empty() {
            order.stock_updated = true;
            steps.push(StepRecord {
                step: SagaStep::Stock,
                status: StepStatus::Succeeded,
                detail: format!("{} debits applied", attempted),
            });
        } else {
            steps.push(StepRecord {
                step: SagaStep::Stock,
                status: StepStatus::Failed,
                detail: failures.join("; "),
            });
        }
    }

    /// Step 5: credit loyalty points when the order carries a customer.
    async fn credit_loyalty(&self, order: &mut OrderRecord, steps: &mut Vec<StepRecord>) -> f64 {
        let Some(customer_id) = order.customer_id.clone() else {
            steps.push(StepRecord {
                step: SagaStep::Loyalty,
                status: StepStatus::Skipped,
                detail: "no customer on order".to_string(),
            });
            return 0.0;
        };

        let points = (order.total * self.pricing.points_rate).floor();
        if points <= 0.0 {
            steps.push(StepRecord {
                step: SagaStep::Loyalty,
                status: StepStatus::Skipped,
                detail: "order total below one point".to_string(),
            });
            return 0.0;
        }

        match self
            .loyalty
            .earn_points(
                &customer_id,
                points,
                &order.order_id,
                &format!("Points earned from order {}", order.order_id),
            )
            .await
        {
            Ok(()) => {
                order.loyalty_points_earned = points;
                steps.push(StepRecord {
                    step: SagaStep::Loyalty,
                    status: StepStatus::Succeeded,
                    detail: format!("{} points credited", points),
                });
                points
            }
            Err(e) => {
                warn!(order_id = %order.order_id, error = %e, "Loyalty credit failed");
                steps.push(StepRecord {
                    step: SagaStep::Loyalty,
                    status: StepStatus::Failed,
                    detail: e.to_string(),
                });
                0.0
            }
        }
    }

    pub async fn order(&self, order_id: &str) -> Result<OrderRecord> {
        self.orders
            .order(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))
    }

    /// Cancel an order. A pure status transition: side effects already
    /// applied by fulfillment are not compensated.
    pub async fn cancel_order(&self, order_id: &str) -> Result<OrderRecord> {
        self.transition(order_id, OrderStatus::Cancelled).await
    }

    /// Transition an order's status. Moving to `completed` additionally
    /// completes the kitchen ticket (best effort) and stamps the
    /// completion time.
    pub async fn update_order_status(
        &self,
        order_id: &str,
        to: OrderStatus,
    ) -> Result<OrderRecord> {
        self.transition(order_id, to).await
    }

    async fn transition(&self, order_id: &str, to: OrderStatus) -> Result<OrderRecord> {
        let mut order = self.order(order_id).await?;
        if !order.order_status.can_transition_to(to) {
            return Err(OrderError::InvalidTransition {
                from: order.order_status,
                to,
            });
        }

        order.order_status = to;
        order.updated_at = Utc::now();
        if to == OrderStatus::Completed {
            order.completed_at = Some(Utc::now());
            if let Err(e) = self.kitchen.complete_for_order(order_id).await {
                error!(order_id, error = %e, "Failed to complete kitchen ticket");
            }
        }
        self.orders.update_order(&order).await?;
        Ok(order)
    }

    /// Fan out per-ingredient availability checks for a menu item.
    ///
    /// A gateway failure for one ingredient marks that line unavailable
    /// rather than failing the whole report.
    pub async fn check_menu_stock(
        &self,
        menu_id: &str,
        quantity: u32,
    ) -> Result<Vec<MenuStockLine>> {
        let menu = self
            .menus
            .menu(menu_id)
            .await?
            .ok_or_else(|| OrderError::MenuNotFound(menu_id.to_string()))?;

        let mut lines = Vec::with_capacity(menu.ingredients.len());
        for requirement in &menu.ingredients {
            let required = requirement.quantity * f64::from(quantity);
            match self
                .inventory
                .check_stock(&requirement.ingredient_id, required)
                .await
            {
                Ok(probe) => lines.push(MenuStockLine {
                    ingredient_id: requirement.ingredient_id.clone(),
                    ingredient_name: requirement.ingredient_name.clone(),
                    required,
                    available_quantity: probe.current_stock,
                    available: probe.available,
                    message: probe.message,
                }),
                Err(e) => lines.push(MenuStockLine {
                    ingredient_id: requirement.ingredient_id.clone(),
                    ingredient_name: requirement.ingredient_name.clone(),
                    required,
                    available_quantity: 0.0,
                    available: false,
                    message: format!(
                        "Error checking stock for {}: {}",
                        requirement.ingredient_name, e
                    ),
                }),
            }
        }
        Ok(lines)
    }

    pub async fn register_menu(&self, menu: NewMenu) -> Result<MenuRecord> {
        if menu.price < 0.0 {
            return Err(OrderError::InvalidPrice(menu.menu_id));
        }
        let menu_id = menu.menu_id.clone();
        match self.menus.insert_menu(menu).await {
            Ok(record) => Ok(record),
            Err(StorageError::Duplicate { .. }) => Err(OrderError::DuplicateMenu(menu_id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn menu(&self, menu_id: &str) -> Result<MenuRecord> {
        self.menus
            .menu(menu_id)
            .await?
            .ok_or_else(|| OrderError::MenuNotFound(menu_id.to_string()))
    }
}
