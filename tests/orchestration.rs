//! Order fulfillment saga behavior, with failures injected per service.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::Arc;

use async_trait::async_trait;

use warung::config::PricingPolicy;
use warung::interfaces::gateway::{
    GatewayError, GatewayResult, InventoryGateway, KitchenGateway, LoyaltyGateway, StockProbe,
};
use warung::interfaces::order::{
    IngredientRequirement, NewMenu, OrderLineItem, OrderStatus, SagaStep, StepStatus,
};
use warung::interfaces::stock::Reference;
use warung::orchestration::{CreateOrderInput, OrderError, OrderOrchestrator};
use warung::storage::memory::{MemoryMenuStore, MemoryOrderStore};

#[derive(Default)]
struct MockKitchen {
    fail: bool,
    opened: Mutex<Vec<String>>,
    completed: Mutex<Vec<String>>,
}

#[async_trait]
impl KitchenGateway for MockKitchen {
    async fn open_ticket(
        &self,
        order_id: &str,
        _table_number: Option<&str>,
        _items: &[OrderLineItem],
    ) -> GatewayResult<()> {
        if self.fail {
            return Err(GatewayError::Unavailable("kitchen down".to_string()));
        }
        self.opened.lock().unwrap().push(order_id.to_string());
        Ok(())
    }

    async fn complete_for_order(&self, order_id: &str) -> GatewayResult<()> {
        self.completed.lock().unwrap().push(order_id.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct MockInventory {
    fail_ingredients: HashSet<String>,
    debits: Mutex<Vec<(String, f64)>>,
}

#[async_trait]
impl InventoryGateway for MockInventory {
    async fn reduce_stock(
        &self,
        ingredient_id: &str,
        quantity: f64,
        _reason: &str,
        _reference: Reference,
    ) -> GatewayResult<()> {
        self.debits
            .lock()
            .unwrap()
            .push((ingredient_id.to_string(), quantity));
        if self.fail_ingredients.contains(ingredient_id) {
            return Err(GatewayError::Rejected(format!(
                "insufficient stock for {ingredient_id}"
            )));
        }
        Ok(())
    }

    async fn check_stock(&self, _ingredient_id: &str, quantity: f64) -> GatewayResult<StockProbe> {
        Ok(StockProbe {
            available: true,
            current_stock: quantity,
            message: "ok".to_string(),
        })
    }
}

#[derive(Default)]
struct MockLoyalty {
    fail: bool,
    credits: Mutex<Vec<(String, f64)>>,
}

#[async_trait]
impl LoyaltyGateway for MockLoyalty {
    async fn earn_points(
        &self,
        customer_id: &str,
        points: f64,
        _order_id: &str,
        _description: &str,
    ) -> GatewayResult<()> {
        if self.fail {
            return Err(GatewayError::Unavailable("loyalty down".to_string()));
        }
        self.credits
            .lock()
            .unwrap()
            .push((customer_id.to_string(), points));
        Ok(())
    }
}

struct Harness {
    orchestrator: OrderOrchestrator,
    kitchen: Arc<MockKitchen>,
    inventory: Arc<MockInventory>,
    loyalty: Arc<MockLoyalty>,
}

async fn harness(
    kitchen: MockKitchen,
    inventory: MockInventory,
    loyalty: MockLoyalty,
) -> Harness {
    let kitchen = Arc::new(kitchen);
    let inventory = Arc::new(inventory);
    let loyalty = Arc::new(loyalty);
    let menus = Arc::new(MemoryMenuStore::new());

    let orchestrator = OrderOrchestrator::new(
        Arc::new(MemoryOrderStore::new()),
        menus.clone(),
        kitchen.clone(),
        inventory.clone(),
        loyalty.clone(),
        PricingPolicy::default(),
    );

    orchestrator
        .register_menu(NewMenu {
            menu_id: "MENU-NASGOR".to_string(),
            name: "Nasi Goreng".to_string(),
            category: "mains".to_string(),
            price: 25_000.0,
            ingredients: vec![
                IngredientRequirement {
                    ingredient_id: "ING-RICE".to_string(),
                    ingredient_name: "Beras".to_string(),
                    quantity: 0.2,
                },
                IngredientRequirement {
                    ingredient_id: "ING-AYAM".to_string(),
                    ingredient_name: "Ayam".to_string(),
                    quantity: 0.15,
                },
            ],
            preparation_minutes: 15,
        })
        .await
        .unwrap();
    orchestrator
        .register_menu(NewMenu {
            menu_id: "MENU-SATE".to_string(),
            name: "Sate Ayam".to_string(),
            category: "mains".to_string(),
            price: 30_000.0,
            ingredients: vec![IngredientRequirement {
                ingredient_id: "ING-AYAM".to_string(),
                ingredient_name: "Ayam".to_string(),
                quantity: 0.3,
            }],
            preparation_minutes: 20,
        })
        .await
        .unwrap();

    Harness {
        orchestrator,
        kitchen,
        inventory,
        loyalty,
    }
}

fn standard_order() -> CreateOrderInput {
    CreateOrderInput {
        order_id: Some("ORD-1".to_string()),
        customer_id: Some("CUST-1".to_string()),
        table_number: Some("T3".to_string()),
        items: vec![
            OrderLineItem {
                menu_id: "MENU-NASGOR".to_string(),
                name: "Nasi Goreng".to_string(),
                quantity: 2,
                price: 25_000.0,
                special_instructions: None,
            },
            OrderLineItem {
                menu_id: "MENU-SATE".to_string(),
                name: "Sate Ayam".to_string(),
                quantity: 1,
                price: 30_000.0,
                special_instructions: None,
            },
        ],
        ..CreateOrderInput::default()
    }
}

fn step<'a>(
    outcome: &'a warung::orchestration::FulfillmentOutcome,
    step: SagaStep,
) -> &'a warung::interfaces::order::StepRecord {
    outcome
        .order
        .fulfillment
        .iter()
        .find(|record| record.step == step)
        .expect("step missing from log")
}

#[tokio::test]
async fn test_full_fulfillment() {
    let h = harness(
        MockKitchen::default(),
        MockInventory::default(),
        MockLoyalty::default(),
    )
    .await;

    let outcome = h.orchestrator.create_order(standard_order()).await.unwrap();

    // Monetary breakdown: 2x25k + 1x30k = 80k; 10% tax, 5% service charge.
    assert_eq!(outcome.order.subtotal, 80_000.0);
    assert_eq!(outcome.order.tax, 8_000.0);
    assert_eq!(outcome.order.service_charge, 4_000.0);
    assert_eq!(outcome.order.total, 92_000.0);

    assert!(outcome.kitchen_ticket_created);
    assert!(outcome.stock_updated);
    assert_eq!(outcome.loyalty_points_earned, 920.0);
    assert_eq!(outcome.message, "Order created successfully");

    // One debit per ingredient requirement per line item.
    let debits = h.inventory.debits.lock().unwrap().clone();
    assert_eq!(
        debits,
        vec![
            ("ING-RICE".to_string(), 0.4),
            ("ING-AYAM".to_string(), 0.3),
            ("ING-AYAM".to_string(), 0.3),
        ]
    );

    let credits = h.loyalty.credits.lock().unwrap().clone();
    assert_eq!(credits, vec![("CUST-1".to_string(), 920.0)]);

    for saga_step in [SagaStep::Kitchen, SagaStep::Stock, SagaStep::Loyalty] {
        assert_eq!(step(&outcome, saga_step).status, StepStatus::Succeeded);
    }

    // The step log is persisted on the order, not only returned.
    let persisted = h.orchestrator.order("ORD-1").await.unwrap();
    assert_eq!(persisted.fulfillment.len(), 3);
    assert!(persisted.kitchen_ticket_created);
    assert!(persisted.stock_updated);
    assert_eq!(persisted.loyalty_points_earned, 920.0);
}

#[tokio::test]
async fn test_kitchen_failure_leaves_other_steps_unaffected() {
    let h = harness(
        MockKitchen {
            fail: true,
            ..MockKitchen::default()
        },
        MockInventory::default(),
        MockLoyalty::default(),
    )
    .await;

    let outcome = h.orchestrator.create_order(standard_order()).await.unwrap();

    assert!(!outcome.kitchen_ticket_created);
    assert_eq!(step(&outcome, SagaStep::Kitchen).status, StepStatus::Failed);
    assert_eq!(outcome.message, "Order created with partial fulfillment");

    // The order exists and the remaining side effects ran.
    assert!(outcome.stock_updated);
    assert_eq!(outcome.loyalty_points_earned, 920.0);
    let persisted = h.orchestrator.order("ORD-1").await.unwrap();
    assert_eq!(persisted.order_status, OrderStatus::Pending);
    assert!(persisted.kitchen_status.is_none());
}

#[tokio::test]
async fn test_partial_debit_failure_attempts_every_debit() {
    let mut inventory = MockInventory::default();
    inventory.fail_ingredients.insert("ING-RICE".to_string());
    let h = harness(MockKitchen::default(), inventory, MockLoyalty::default()).await;

    let outcome = h.orchestrator.create_order(standard_order()).await.unwrap();

    assert!(!outcome.stock_updated);
    let stock_step = step(&outcome, SagaStep::Stock);
    assert_eq!(stock_step.status, StepStatus::Failed);
    assert!(stock_step.detail.contains("ING-RICE"));

    // The failing first debit must not short-circuit the remaining ones.
    assert_eq!(h.inventory.debits.lock().unwrap().len(), 3);

    // Kitchen and loyalty are independent of the stock outcome.
    assert!(outcome.kitchen_ticket_created);
    assert_eq!(outcome.loyalty_points_earned, 920.0);
}

#[tokio::test]
async fn test_loyalty_failure_leaves_earned_at_zero() {
    let h = harness(
        MockKitchen::default(),
        MockInventory::default(),
        MockLoyalty {
            fail: true,
            ..MockLoyalty::default()
        },
    )
    .await;

    let outcome = h.orchestrator.create_order(standard_order()).await.unwrap();

    assert_eq!(outcome.loyalty_points_earned, 0.0);
    assert_eq!(step(&outcome, SagaStep::Loyalty).status, StepStatus::Failed);
    assert_eq!(h.orchestrator.order("ORD-1").await.unwrap().loyalty_points_earned, 0.0);
    assert!(outcome.kitchen_ticket_created);
    assert!(outcome.stock_updated);
}

#[tokio::test]
async fn test_order_without_customer_skips_loyalty() {
    let h = harness(
        MockKitchen::default(),
        MockInventory::default(),
        MockLoyalty::default(),
    )
    .await;

    let mut input = standard_order();
    input.customer_id = None;
    let outcome = h.orchestrator.create_order(input).await.unwrap();

    assert_eq!(outcome.loyalty_points_earned, 0.0);
    assert_eq!(step(&outcome, SagaStep::Loyalty).status, StepStatus::Skipped);
    assert!(h.loyalty.credits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_menu_fails_the_stock_step_only() {
    let h = harness(
        MockKitchen::default(),
        MockInventory::default(),
        MockLoyalty::default(),
    )
    .await;

    let mut input = standard_order();
    input.items.push(OrderLineItem {
        menu_id: "MENU-GHOST".to_string(),
        name: "Off-menu special".to_string(),
        quantity: 1,
        price: 10_000.0,
        special_instructions: None,
    });
    let outcome = h.orchestrator.create_order(input).await.unwrap();

    assert!(!outcome.stock_updated);
    assert!(step(&outcome, SagaStep::Stock).detail.contains("MENU-GHOST"));
    // The known menus were still debited.
    assert_eq!(h.inventory.debits.lock().unwrap().len(), 3);
    assert!(outcome.kitchen_ticket_created);
}

#[tokio::test]
async fn test_duplicate_order_id_rejected() {
    let h = harness(
        MockKitchen::default(),
        MockInventory::default(),
        MockLoyalty::default(),
    )
    .await;

    h.orchestrator.create_order(standard_order()).await.unwrap();
    let err = h.orchestrator.create_order(standard_order()).await.unwrap_err();
    assert!(matches!(err, OrderError::DuplicateOrder(_)));
}

#[tokio::test]
async fn test_empty_and_invalid_orders_rejected_before_persist() {
    let h = harness(
        MockKitchen::default(),
        MockInventory::default(),
        MockLoyalty::default(),
    )
    .await;

    let err = h
        .orchestrator
        .create_order(CreateOrderInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::EmptyOrder));

    let mut input = standard_order();
    input.items[0].quantity = 0;
    let err = h.orchestrator.create_order(input).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidQuantity(_)));

    // Nothing was fanned out for rejected orders.
    assert!(h.kitchen.opened.lock().unwrap().is_empty());
    assert!(h.inventory.debits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cancel_is_a_pure_transition() {
    let h = harness(
        MockKitchen::default(),
        MockInventory::default(),
        MockLoyalty::default(),
    )
    .await;

    h.orchestrator.create_order(standard_order()).await.unwrap();
    let debits_before = h.inventory.debits.lock().unwrap().len();

    let order = h.orchestrator.cancel_order("ORD-1").await.unwrap();
    assert_eq!(order.order_status, OrderStatus::Cancelled);

    // No compensation: the debits applied by fulfillment stay applied.
    assert_eq!(h.inventory.debits.lock().unwrap().len(), debits_before);

    let err = h.orchestrator.cancel_order("ORD-1").await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_completing_an_order_completes_the_kitchen_ticket() {
    let h = harness(
        MockKitchen::default(),
        MockInventory::default(),
        MockLoyalty::default(),
    )
    .await;

    h.orchestrator.create_order(standard_order()).await.unwrap();
    let order = h
        .orchestrator
        .update_order_status("ORD-1", OrderStatus::Completed)
        .await
        .unwrap();

    assert_eq!(order.order_status, OrderStatus::Completed);
    assert!(order.completed_at.is_some());
    assert_eq!(
        h.kitchen.completed.lock().unwrap().clone(),
        vec!["ORD-1".to_string()]
    );

    let err = h
        .orchestrator
        .update_order_status("ORD-1", OrderStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_check_menu_stock_fans_out_per_ingredient() {
    let h = harness(
        MockKitchen::default(),
        MockInventory::default(),
        MockLoyalty::default(),
    )
    .await;

    let lines = h.orchestrator.check_menu_stock("MENU-NASGOR", 3).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].ingredient_id, "ING-RICE");
    assert!((lines[0].required - 0.6).abs() < 1e-9);
    assert!(lines.iter().all(|line| line.available));

    let err = h.orchestrator.check_menu_stock("MENU-GHOST", 1).await.unwrap_err();
    assert!(matches!(err, OrderError::MenuNotFound(_)));
}
