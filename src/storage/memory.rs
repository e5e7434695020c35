//! In-memory storage backend.
//!
//! The reference implementation of the store traits. Used for tests and
//! single-process deployments; the SQLite backend mirrors its semantics.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::interfaces::kitchen::{
    ChefRecord, ChefStatus, KitchenStore, NewChef, NewTicket, TicketRecord, TicketStatus,
};
use crate::interfaces::loyalty::{
    AccountRecord, LoyaltyStore, NewTransaction, Tier, TransactionRecord,
};
use crate::interfaces::order::{
    MenuRecord, MenuStore, NewMenu, NewOrder, OrderRecord, OrderStatus, OrderStore, PaymentStatus,
};
use crate::interfaces::stock::{
    IngredientRecord, IngredientStatus, MovementDirection, MovementRecord, NewIngredient,
    NewMovement, Reference, StockStore,
};
use crate::interfaces::{StorageError, StorageResult};

#[derive(Default)]
struct StockInner {
    ingredients: HashMap<String, IngredientRecord>,
    movements: Vec<MovementRecord>,
    next_ingredient_id: u64,
    next_movement_id: u64,
}

/// In-memory stock store.
#[derive(Default)]
pub struct MemoryStockStore {
    inner: RwLock<StockInner>,
}

impl MemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StockStore for MemoryStockStore {
    async fn insert_ingredient(
        &self,
        ingredient: NewIngredient,
    ) -> StorageResult<IngredientRecord> {
        let mut inner = self.inner.write().await;
        if inner.ingredients.contains_key(&ingredient.ingredient_id) {
            return Err(StorageError::Duplicate {
                entity: "ingredient",
                key: ingredient.ingredient_id,
            });
        }
        inner.next_ingredient_id += 1;
        let record = IngredientRecord {
            id: inner.next_ingredient_id,
            ingredient_id: ingredient.ingredient_id.clone(),
            name: ingredient.name,
            unit: ingredient.unit,
            category: ingredient.category,
            min_stock_level: ingredient.min_stock_level,
            current_stock: ingredient.current_stock,
            cost_per_unit: ingredient.cost_per_unit,
            status: ingredient.status,
        };
        inner
            .ingredients
            .insert(record.ingredient_id.clone(), record.clone());
        Ok(record)
    }

    async fn ingredient(&self, ingredient_id: &str) -> StorageResult<Option<IngredientRecord>> {
        Ok(self.inner.read().await.ingredients.get(ingredient_id).cloned())
    }

    async fn update_ingredient(&self, ingredient: &IngredientRecord) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        match inner.ingredients.get_mut(&ingredient.ingredient_id) {
            Some(existing) => {
                *existing = ingredient.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound {
                entity: "ingredient",
                key: ingredient.ingredient_id.clone(),
            }),
        }
    }

    async fn list_low_stock(&self) -> StorageResult<Vec<IngredientRecord>> {
        let inner = self.inner.read().await;
        let mut low: Vec<IngredientRecord> = inner
            .ingredients
            .values()
            .filter(|ingredient| {
                ingredient.current_stock <= ingredient.min_stock_level
                    && ingredient.status != IngredientStatus::Inactive
            })
            .cloned()
            .collect();
        low.sort_by(|a, b| {
            (a.current_stock / a.min_stock_level.max(f64::EPSILON))
                .total_cmp(&(b.current_stock / b.min_stock_level.max(f64::EPSILON)))
        });
        Ok(low)
    }

    async fn append_movement(&self, movement: NewMovement) -> StorageResult<MovementRecord> {
        let mut inner = self.inner.write().await;
        inner.next_movement_id += 1;
        let record = MovementRecord {
            id: inner.next_movement_id,
            ingredient_id: movement.ingredient_id,
            direction: movement.direction,
            quantity: movement.quantity,
            reason: movement.reason,
            reference: movement.reference,
            created_at: Utc::now(),
        };
        inner.movements.push(record.clone());
        Ok(record)
    }

    async fn movements(&self, ingredient_id: &str) -> StorageResult<Vec<MovementRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .movements
            .iter()
            .filter(|movement| movement.ingredient_id == ingredient_id)
            .cloned()
            .collect())
    }

    async fn movement_by_reference(
        &self,
        ingredient_id: &str,
        reference: &Reference,
        direction: MovementDirection,
    ) -> StorageResult<Option<MovementRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .movements
            .iter()
            .find(|movement| {
                movement.ingredient_id == ingredient_id
                    && movement.direction == direction
                    && movement.reference.as_ref() == Some(reference)
            })
            .cloned())
    }
}

#[derive(Default)]
struct KitchenInner {
    tickets: HashMap<u64, TicketRecord>,
    chefs: HashMap<u64, ChefRecord>,
    next_ticket_id: u64,
    next_chef_id: u64,
}

/// In-memory kitchen store.
#[derive(Default)]
pub struct MemoryKitchenStore {
    inner: RwLock<KitchenInner>,
}

impl MemoryKitchenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KitchenStore for MemoryKitchenStore {
    async fn insert_ticket(&self, ticket: NewTicket) -> StorageResult<TicketRecord> {
        let mut inner = self.inner.write().await;
        if inner
            .tickets
            .values()
            .any(|existing| existing.order_id == ticket.order_id)
        {
            return Err(StorageError::Duplicate {
                entity: "kitchen ticket",
                key: ticket.order_id,
            });
        }
        inner.next_ticket_id += 1;
        let now = Utc::now();
        let record = TicketRecord {
            id: inner.next_ticket_id,
            order_id: ticket.order_id,
            table_number: ticket.table_number,
            status: TicketStatus::Pending,
            items: ticket.items,
            priority: ticket.priority,
            estimated_minutes: None,
            chef_id: None,
            notes: ticket.notes,
            created_at: now,
            updated_at: now,
        };
        inner.tickets.insert(record.id, record.clone());
        Ok(record)
    }

    async fn ticket(&self, id: u64) -> StorageResult<Option<TicketRecord>> {
        Ok(self.inner.read().await.tickets.get(&id).cloned())
    }

    async fn ticket_for_order(&self, order_id: &str) -> StorageResult<Option<TicketRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tickets
            .values()
            .find(|ticket| ticket.order_id == order_id)
            .cloned())
    }

    async fn update_ticket(&self, ticket: &TicketRecord) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        match inner.tickets.get_mut(&ticket.id) {
            Some(existing) => {
                *existing = ticket.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound {
                entity: "kitchen ticket",
                key: ticket.id.to_string(),
            }),
        }
    }

    async fn insert_chef(&self, chef: NewChef) -> StorageResult<ChefRecord> {
        let mut inner = self.inner.write().await;
        inner.next_chef_id += 1;
        let record = ChefRecord {
            id: inner.next_chef_id,
            name: chef.name,
            status: ChefStatus::Available,
            busy_count: 0,
            max_capacity: chef.max_capacity,
        };
        inner.chefs.insert(record.id, record.clone());
        Ok(record)
    }

    async fn chef(&self, id: u64) -> StorageResult<Option<ChefRecord>> {
        Ok(self.inner.read().await.chefs.get(&id).cloned())
    }

    async fn update_chef(&self, chef: &ChefRecord) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        match inner.chefs.get_mut(&chef.id) {
            Some(existing) => {
                *existing = chef.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound {
                entity: "chef",
                key: chef.id.to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct LoyaltyInner {
    accounts: HashMap<String, AccountRecord>,
    transactions: Vec<TransactionRecord>,
    next_account_id: u64,
    next_transaction_id: u64,
}

/// In-memory loyalty store.
#[derive(Default)]
pub struct MemoryLoyaltyStore {
    inner: RwLock<LoyaltyInner>,
}

impl MemoryLoyaltyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoyaltyStore for MemoryLoyaltyStore {
    async fn insert_account(&self, customer_id: &str) -> StorageResult<AccountRecord> {
        let mut inner = self.inner.write().await;
        if inner.accounts.contains_key(customer_id) {
            return Err(StorageError::Duplicate {
                entity: "loyalty account",
                key: customer_id.to_string(),
            });
        }
        inner.next_account_id += 1;
        let record = AccountRecord {
            id: inner.next_account_id,
            customer_id: customer_id.to_string(),
            total_points: 0.0,
            redeemed_points: 0.0,
            tier: Tier::Bronze,
            active: true,
        };
        inner
            .accounts
            .insert(record.customer_id.clone(), record.clone());
        Ok(record)
    }

    async fn account(&self, customer_id: &str) -> StorageResult<Option<AccountRecord>> {
        Ok(self.inner.read().await.accounts.get(customer_id).cloned())
    }

    async fn update_account(&self, account: &AccountRecord) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        match inner.accounts.get_mut(&account.customer_id) {
            Some(existing) => {
                *existing = account.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound {
                entity: "loyalty account",
                key: account.customer_id.clone(),
            }),
        }
    }

    async fn append_transaction(
        &self,
        transaction: NewTransaction,
    ) -> StorageResult<TransactionRecord> {
        let mut inner = self.inner.write().await;
        inner.next_transaction_id += 1;
        let record = TransactionRecord {
            id: inner.next_transaction_id,
            customer_id: transaction.customer_id,
            kind: transaction.kind,
            points: transaction.points,
            order_id: transaction.order_id,
            description: transaction.description,
            created_at: Utc::now(),
        };
        inner.transactions.push(record.clone());
        Ok(record)
    }

    async fn transactions(&self, customer_id: &str) -> StorageResult<Vec<TransactionRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .transactions
            .iter()
            .filter(|transaction| transaction.customer_id == customer_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct OrderInner {
    orders: HashMap<String, OrderRecord>,
    next_order_id: u64,
}

/// In-memory order store.
#[derive(Default)]
pub struct MemoryOrderStore {
    inner: RwLock<OrderInner>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert_order(&self, order: NewOrder) -> StorageResult<OrderRecord> {
        let mut inner = self.inner.write().await;
        if inner.orders.contains_key(&order.order_id) {
            return Err(StorageError::Duplicate {
                entity: "order",
                key: order.order_id,
            });
        }
        inner.next_order_id += 1;
        let now = Utc::now();
        let record = OrderRecord {
            id: inner.next_order_id,
            order_id: order.order_id,
            customer_id: order.customer_id,
            table_number: order.table_number,
            items: order.items,
            subtotal: order.subtotal,
            tax: order.tax,
            service_charge: order.service_charge,
            discount: order.discount,
            loyalty_points_used: order.loyalty_points_used,
            loyalty_points_earned: 0.0,
            total: order.total,
            payment_method: order.payment_method,
            payment_status: PaymentStatus::Pending,
            order_status: OrderStatus::Pending,
            kitchen_status: None,
            notes: order.notes,
            kitchen_ticket_created: false,
            stock_updated: false,
            fulfillment: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        inner
            .orders
            .insert(record.order_id.clone(), record.clone());
        Ok(record)
    }

    async fn order(&self, order_id: &str) -> StorageResult<Option<OrderRecord>> {
        Ok(self.inner.read().await.orders.get(order_id).cloned())
    }

    async fn update_order(&self, order: &OrderRecord) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        match inner.orders.get_mut(&order.order_id) {
            Some(existing) => {
                *existing = order.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound {
                entity: "order",
                key: order.order_id.clone(),
            }),
        }
    }
}

#[derive(Default)]
struct MenuInner {
    menus: HashMap<String, MenuRecord>,
    next_menu_id: u64,
}

/// In-memory menu-catalog store.
#[derive(Default)]
pub struct MemoryMenuStore {
    inner: RwLock<MenuInner>,
}

impl MemoryMenuStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MenuStore for MemoryMenuStore {
    async fn insert_menu(&self, menu: NewMenu) -> StorageResult<MenuRecord> {
        let mut inner = self.inner.write().await;
        if inner.menus.contains_key(&menu.menu_id) {
            return Err(StorageError::Duplicate {
                entity: "menu",
                key: menu.menu_id,
            });
        }
        inner.next_menu_id += 1;
        let record = MenuRecord {
            id: inner.next_menu_id,
            menu_id: menu.menu_id,
            name: menu.name,
            category: menu.category,
            price: menu.price,
            ingredients: menu.ingredients,
            available: true,
            preparation_minutes: menu.preparation_minutes,
        };
        inner.menus.insert(record.menu_id.clone(), record.clone());
        Ok(record)
    }

    async fn menu(&self, menu_id: &str) -> StorageResult<Option<MenuRecord>> {
        Ok(self.inner.read().await.menus.get(menu_id).cloned())
    }
}
