//! SQLite storage backend.
//!
//! Runtime-bound queries only; timestamps are stored as RFC 3339 text and
//! line items / step logs as JSON columns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::interfaces::kitchen::{
    ChefRecord, ChefStatus, KitchenStore, NewChef, NewTicket, TicketRecord, TicketStatus,
};
use crate::interfaces::loyalty::{
    AccountRecord, LoyaltyStore, NewTransaction, Tier, TransactionKind, TransactionRecord,
};
use crate::interfaces::order::{
    MenuRecord, MenuStore, NewMenu, NewOrder, OrderRecord, OrderStatus, OrderStore, PaymentStatus,
};
use crate::interfaces::stock::{
    IngredientRecord, IngredientStatus, MovementDirection, MovementRecord, NewIngredient,
    NewMovement, Reference, StockStore,
};
use crate::interfaces::{StorageError, StorageResult};

use super::schema;

fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt(format!("bad timestamp {value:?}: {e}")))
}

fn parse_json<T: serde::de::DeserializeOwned>(value: &str, what: &str) -> StorageResult<T> {
    serde_json::from_str(value)
        .map_err(|e| StorageError::Corrupt(format!("bad {what} JSON: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T, what: &str) -> StorageResult<String> {
    serde_json::to_string(value)
        .map_err(|e| StorageError::Corrupt(format!("unencodable {what}: {e}")))
}

/// SQLite stock store.
pub struct SqliteStockStore {
    pool: SqlitePool,
}

impl SqliteStockStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the inventory tables.
    pub async fn init(&self) -> Result<(), sqlx::Error> {
        sqlx::query(schema::CREATE_INGREDIENTS)
            .execute(&self.pool)
            .await?;
        sqlx::query(schema::CREATE_STOCK_MOVEMENTS)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn ingredient_from_row(row: &SqliteRow) -> StorageResult<IngredientRecord> {
        let status: String = row.get("status");
        Ok(IngredientRecord {
            id: row.get::<i64, _>("id") as u64,
            ingredient_id: row.get("ingredient_id"),
            name: row.get("name"),
            unit: row.get("unit"),
            category: row.get("category"),
            min_stock_level: row.get("min_stock_level"),
            current_stock: row.get("current_stock"),
            cost_per_unit: row.get("cost_per_unit"),
            status: IngredientStatus::parse(&status)
                .ok_or_else(|| StorageError::Corrupt(format!("bad ingredient status {status:?}")))?,
        })
    }

    fn movement_from_row(row: &SqliteRow) -> StorageResult<MovementRecord> {
        let direction: String = row.get("direction");
        let created_at: String = row.get("created_at");
        let reference_id: Option<String> = row.get("reference_id");
        let reference_type: Option<String> = row.get("reference_type");
        let reference = match (reference_id, reference_type) {
            (Some(id), Some(kind)) => Some(Reference { id, kind }),
            _ => None,
        };
        Ok(MovementRecord {
            id: row.get::<i64, _>("id") as u64,
            ingredient_id: row.get("ingredient_id"),
            direction: MovementDirection::parse(&direction)
                .ok_or_else(|| StorageError::Corrupt(format!("bad direction {direction:?}")))?,
            quantity: row.get("quantity"),
            reason: row.get("reason"),
            reference,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}

#[async_trait]
impl StockStore for SqliteStockStore {
    async fn insert_ingredient(
        &self,
        ingredient: NewIngredient,
    ) -> StorageResult<IngredientRecord> {
        let existing = sqlx::query("SELECT id FROM ingredients WHERE ingredient_id = ?")
            .bind(&ingredient.ingredient_id)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(StorageError::Duplicate {
                entity: "ingredient",
                key: ingredient.ingredient_id,
            });
        }

        let result = sqlx::query(
            "INSERT INTO ingredients \
             (ingredient_id, name, unit, category, min_stock_level, current_stock, cost_per_unit, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&ingredient.ingredient_id)
        .bind(&ingredient.name)
        .bind(&ingredient.unit)
        .bind(&ingredient.category)
        .bind(ingredient.min_stock_level)
        .bind(ingredient.current_stock)
        .bind(ingredient.cost_per_unit)
        .bind(ingredient.status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(IngredientRecord {
            id: result.last_insert_rowid() as u64,
            ingredient_id: ingredient.ingredient_id,
            name: ingredient.name,
            unit: ingredient.unit,
            category: ingredient.category,
            min_stock_level: ingredient.min_stock_level,
            current_stock: ingredient.current_stock,
            cost_per_unit: ingredient.cost_per_unit,
            status: ingredient.status,
        })
    }

    async fn ingredient(&self, ingredient_id: &str) -> StorageResult<Option<IngredientRecord>> {
        let row = sqlx::query("SELECT * FROM ingredients WHERE ingredient_id = ?")
            .bind(ingredient_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| Self::ingredient_from_row(&row)).transpose()
    }

    async fn update_ingredient(&self, ingredient: &IngredientRecord) -> StorageResult<()> {
        let result = sqlx::query(
            "UPDATE ingredients SET name = ?, unit = ?, category = ?, min_stock_level = ?, \
             current_stock = ?, cost_per_unit = ?, status = ? WHERE ingredient_id = ?",
        )
        .bind(&ingredient.name)
        .bind(&ingredient.unit)
        .bind(&ingredient.category)
        .bind(ingredient.min_stock_level)
        .bind(ingredient.current_stock)
        .bind(ingredient.cost_per_unit)
        .bind(ingredient.status.as_str())
        .bind(&ingredient.ingredient_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound {
                entity: "ingredient",
                key: ingredient.ingredient_id.clone(),
            });
        }
        Ok(())
    }

    async fn list_low_stock(&self) -> StorageResult<Vec<IngredientRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM ingredients \
             WHERE current_stock <= min_stock_level AND status != 'inactive' \
             ORDER BY (current_stock / MAX(min_stock_level, 0.000001)) ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::ingredient_from_row).collect()
    }

    async fn append_movement(&self, movement: NewMovement) -> StorageResult<MovementRecord> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO stock_movements \
             (ingredient_id, direction, quantity, reason, reference_id, reference_type, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&movement.ingredient_id)
        .bind(movement.direction.as_str())
        .bind(movement.quantity)
        .bind(&movement.reason)
        .bind(movement.reference.as_ref().map(|r| r.id.clone()))
        .bind(movement.reference.as_ref().map(|r| r.kind.clone()))
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(MovementRecord {
            id: result.last_insert_rowid() as u64,
            ingredient_id: movement.ingredient_id,
            direction: movement.direction,
            quantity: movement.quantity,
            reason: movement.reason,
            reference: movement.reference,
            created_at,
        })
    }

    async fn movements(&self, ingredient_id: &str) -> StorageResult<Vec<MovementRecord>> {
        let rows =
            sqlx::query("SELECT * FROM stock_movements WHERE ingredient_id = ? ORDER BY id ASC")
                .bind(ingredient_id)
                .fetch_all(&self.pool)
                .await?;
        rows.iter().map(Self::movement_from_row).collect()
    }

    async fn movement_by_reference(
        &self,
        ingredient_id: &str,
        reference: &Reference,
        direction: MovementDirection,
    ) -> StorageResult<Option<MovementRecord>> {
        let row = sqlx::query(
            "SELECT * FROM stock_movements WHERE ingredient_id = ? AND reference_id = ? \
             AND reference_type = ? AND direction = ? LIMIT 1",
        )
        .bind(ingredient_id)
        .bind(&reference.id)
        .bind(&reference.kind)
        .bind(direction.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(|row| Self::movement_from_row(&row)).transpose()
    }
}

/// SQLite kitchen store.
pub struct SqliteKitchenStore {
    pool: SqlitePool,
}

impl SqliteKitchenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the kitchen tables.
    pub async fn init(&self) -> Result<(), sqlx::Error> {
        sqlx::query(schema::CREATE_KITCHEN_TICKETS)
            .execute(&self.pool)
            .await?;
        sqlx::query(schema::CREATE_CHEFS)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn ticket_from_row(row: &SqliteRow) -> StorageResult<TicketRecord> {
        let status: String = row.get("status");
        let items: String = row.get("items");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");
        Ok(TicketRecord {
            id: row.get::<i64, _>("id") as u64,
            order_id: row.get("order_id"),
            table_number: row.get("table_number"),
            status: TicketStatus::parse(&status)
                .ok_or_else(|| StorageError::Corrupt(format!("bad ticket status {status:?}")))?,
            items: parse_json(&items, "ticket items")?,
            priority: row.get::<i64, _>("priority") as u32,
            estimated_minutes: row
                .get::<Option<i64>, _>("estimated_minutes")
                .map(|m| m as u32),
            chef_id: row.get::<Option<i64>, _>("chef_id").map(|id| id as u64),
            notes: row.get("notes"),
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }

    fn chef_from_row(row: &SqliteRow) -> StorageResult<ChefRecord> {
        let status: String = row.get("status");
        Ok(ChefRecord {
            id: row.get::<i64, _>("id") as u64,
            name: row.get("name"),
            status: ChefStatus::parse(&status)
                .ok_or_else(|| StorageError::Corrupt(format!("bad chef status {status:?}")))?,
            busy_count: row.get::<i64, _>("busy_count") as u32,
            max_capacity: row.get::<i64, _>("max_capacity") as u32,
        })
    }
}

#[async_trait]
impl KitchenStore for SqliteKitchenStore {
    async fn insert_ticket(&self, ticket: NewTicket) -> StorageResult<TicketRecord> {
        let existing = sqlx::query("SELECT id FROM kitchen_tickets WHERE order_id = ?")
            .bind(&ticket.order_id)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(StorageError::Duplicate {
                entity: "kitchen ticket",
                key: ticket.order_id,
            });
        }

        let now = Utc::now();
        let items = to_json(&ticket.items, "ticket items")?;
        let result = sqlx::query(
            "INSERT INTO kitchen_tickets \
             (order_id, table_number, status, items, priority, notes, created_at, updated_at) \
             VALUES (?, ?, 'pending', ?, ?, ?, ?, ?)",
        )
        .bind(&ticket.order_id)
        .bind(&ticket.table_number)
        .bind(&items)
        .bind(ticket.priority as i64)
        .bind(&ticket.notes)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(TicketRecord {
            id: result.last_insert_rowid() as u64,
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
        })
    }

    async fn ticket(&self, id: u64) -> StorageResult<Option<TicketRecord>> {
        let row = sqlx::query("SELECT * FROM kitchen_tickets WHERE id = ?")
            .bind(id as i64)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| Self::ticket_from_row(&row)).transpose()
    }

    async fn ticket_for_order(&self, order_id: &str) -> StorageResult<Option<TicketRecord>> {
        let row = sqlx::query("SELECT * FROM kitchen_tickets WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| Self::ticket_from_row(&row)).transpose()
    }

    async fn update_ticket(&self, ticket: &TicketRecord) -> StorageResult<()> {
        let items = to_json(&ticket.items, "ticket items")?;
        let result = sqlx::query(
            "UPDATE kitchen_tickets SET table_number = ?, status = ?, items = ?, priority = ?, \
             estimated_minutes = ?, chef_id = ?, notes = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&ticket.table_number)
        .bind(ticket.status.as_str())
        .bind(&items)
        .bind(ticket.priority as i64)
        .bind(ticket.estimated_minutes.map(|m| m as i64))
        .bind(ticket.chef_id.map(|id| id as i64))
        .bind(&ticket.notes)
        .bind(ticket.updated_at.to_rfc3339())
        .bind(ticket.id as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound {
                entity: "kitchen ticket",
                key: ticket.id.to_string(),
            });
        }
        Ok(())
    }

    async fn insert_chef(&self, chef: NewChef) -> StorageResult<ChefRecord> {
        let result = sqlx::query(
            "INSERT INTO chefs (name, status, busy_count, max_capacity) \
             VALUES (?, 'available', 0, ?)",
        )
        .bind(&chef.name)
        .bind(chef.max_capacity as i64)
        .execute(&self.pool)
        .await?;

        Ok(ChefRecord {
            id: result.last_insert_rowid() as u64,
            name: chef.name,
            status: ChefStatus::Available,
            busy_count: 0,
            max_capacity: chef.max_capacity,
        })
    }

    async fn chef(&self, id: u64) -> StorageResult<Option<ChefRecord>> {
        let row = sqlx::query("SELECT * FROM chefs WHERE id = ?")
            .bind(id as i64)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| Self::chef_from_row(&row)).transpose()
    }

    async fn update_chef(&self, chef: &ChefRecord) -> StorageResult<()> {
        let result = sqlx::query(
            "UPDATE chefs SET name = ?, status = ?, busy_count = ?, max_capacity = ? WHERE id = ?",
        )
        .bind(&chef.name)
        .bind(chef.status.as_str())
        .bind(chef.busy_count as i64)
        .bind(chef.max_capacity as i64)
        .bind(chef.id as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound {
                entity: "chef",
                key: chef.id.to_string(),
            });
        }
        Ok(())
    }
}

/// SQLite loyalty store.
pub struct SqliteLoyaltyStore {
    pool: SqlitePool,
}

impl SqliteLoyaltyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the loyalty tables.
    pub async fn init(&self) -> Result<(), sqlx::Error> {
        sqlx::query(schema::CREATE_LOYALTY_ACCOUNTS)
            .execute(&self.pool)
            .await?;
        sqlx::query(schema::CREATE_LOYALTY_TRANSACTIONS)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn account_from_row(row: &SqliteRow) -> StorageResult<AccountRecord> {
        let tier: String = row.get("tier");
        Ok(AccountRecord {
            id: row.get::<i64, _>("id") as u64,
            customer_id: row.get("customer_id"),
            total_points: row.get("total_points"),
            redeemed_points: row.get("redeemed_points"),
            tier: Tier::parse(&tier)
                .ok_or_else(|| StorageError::Corrupt(format!("bad tier {tier:?}")))?,
            active: row.get::<i64, _>("active") != 0,
        })
    }

    fn transaction_from_row(row: &SqliteRow) -> StorageResult<TransactionRecord> {
        let kind: String = row.get("kind");
        let created_at: String = row.get("created_at");
        Ok(TransactionRecord {
            id: row.get::<i64, _>("id") as u64,
            customer_id: row.get("customer_id"),
            kind: TransactionKind::parse(&kind)
                .ok_or_else(|| StorageError::Corrupt(format!("bad transaction kind {kind:?}")))?,
            points: row.get("points"),
            order_id: row.get("order_id"),
            description: row.get("description"),
            created_at: parse_timestamp(&created_at)?,
        })
    }
}

#[async_trait]
impl LoyaltyStore for SqliteLoyaltyStore {
    async fn insert_account(&self, customer_id: &str) -> StorageResult<AccountRecord> {
        let existing = sqlx::query("SELECT id FROM loyalty_accounts WHERE customer_id = ?")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(StorageError::Duplicate {
                entity: "loyalty account",
                key: customer_id.to_string(),
            });
        }

        let result = sqlx::query(
            "INSERT INTO loyalty_accounts (customer_id, total_points, redeemed_points, tier, active) \
             VALUES (?, 0, 0, 'bronze', 1)",
        )
        .bind(customer_id)
        .execute(&self.pool)
        .await?;

        Ok(AccountRecord {
            id: result.last_insert_rowid() as u64,
            customer_id: customer_id.to_string(),
            total_points: 0.0,
            redeemed_points: 0.0,
            tier: Tier::Bronze,
            active: true,
        })
    }

    async fn account(&self, customer_id: &str) -> StorageResult<Option<AccountRecord>> {
        let row = sqlx::query("SELECT * FROM loyalty_accounts WHERE customer_id = ?")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| Self::account_from_row(&row)).transpose()
    }

    async fn update_account(&self, account: &AccountRecord) -> StorageResult<()> {
        let result = sqlx::query(
            "UPDATE loyalty_accounts SET total_points = ?, redeemed_points = ?, tier = ?, \
             active = ? WHERE customer_id = ?",
        )
        .bind(account.total_points)
        .bind(account.redeemed_points)
        .bind(account.tier.as_str())
        .bind(account.active as i64)
        .bind(&account.customer_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound {
                entity: "loyalty account",
                key: account.customer_id.clone(),
            });
        }
        Ok(())
    }

    async fn append_transaction(
        &self,
        transaction: NewTransaction,
    ) -> StorageResult<TransactionRecord> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO loyalty_transactions \
             (customer_id, kind, points, order_id, description, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&transaction.customer_id)
        .bind(transaction.kind.as_str())
        .bind(transaction.points)
        .bind(&transaction.order_id)
        .bind(&transaction.description)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(TransactionRecord {
            id: result.last_insert_rowid() as u64,
            customer_id: transaction.customer_id,
            kind: transaction.kind,
            points: transaction.points,
            order_id: transaction.order_id,
            description: transaction.description,
            created_at,
        })
    }

    async fn transactions(&self, customer_id: &str) -> StorageResult<Vec<TransactionRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM loyalty_transactions WHERE customer_id = ? ORDER BY id ASC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::transaction_from_row).collect()
    }
}

/// SQLite order store.
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the orders table.
    pub async fn init(&self) -> Result<(), sqlx::Error> {
        sqlx::query(schema::CREATE_ORDERS).execute(&self.pool).await?;
        Ok(())
    }

    fn order_from_row(row: &SqliteRow) -> StorageResult<OrderRecord> {
        let items: String = row.get("items");
        let fulfillment: String = row.get("fulfillment");
        let payment_status: String = row.get("payment_status");
        let order_status: String = row.get("order_status");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");
        let completed_at: Option<String> = row.get("completed_at");
        Ok(OrderRecord {
            id: row.get::<i64, _>("id") as u64,
            order_id: row.get("order_id"),
            customer_id: row.get("customer_id"),
            table_number: row.get("table_number"),
            items: parse_json(&items, "order items")?,
            subtotal: row.get("subtotal"),
            tax: row.get("tax"),
            service_charge: row.get("service_charge"),
            discount: row.get("discount"),
            loyalty_points_used: row.get("loyalty_points_used"),
            loyalty_points_earned: row.get("loyalty_points_earned"),
            total: row.get("total"),
            payment_method: row.get("payment_method"),
            payment_status: PaymentStatus::parse(&payment_status).ok_or_else(|| {
                StorageError::Corrupt(format!("bad payment status {payment_status:?}"))
            })?,
            order_status: OrderStatus::parse(&order_status).ok_or_else(|| {
                StorageError::Corrupt(format!("bad order status {order_status:?}"))
            })?,
            kitchen_status: row.get("kitchen_status"),
            notes: row.get("notes"),
            kitchen_ticket_created: row.get::<i64, _>("kitchen_ticket_created") != 0,
            stock_updated: row.get::<i64, _>("stock_updated") != 0,
            fulfillment: parse_json(&fulfillment, "fulfillment steps")?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
            completed_at: completed_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn insert_order(&self, order: NewOrder) -> StorageResult<OrderRecord> {
        let existing = sqlx::query("SELECT id FROM orders WHERE order_id = ?")
            .bind(&order.order_id)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(StorageError::Duplicate {
                entity: "order",
                key: order.order_id,
            });
        }

        let now = Utc::now();
        let items = to_json(&order.items, "order items")?;
        let result = sqlx::query(
            "INSERT INTO orders \
             (order_id, customer_id, table_number, items, subtotal, tax, service_charge, \
              discount, loyalty_points_used, total, payment_method, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&order.order_id)
        .bind(&order.customer_id)
        .bind(&order.table_number)
        .bind(&items)
        .bind(order.subtotal)
        .bind(order.tax)
        .bind(order.service_charge)
        .bind(order.discount)
        .bind(order.loyalty_points_used)
        .bind(order.total)
        .bind(&order.payment_method)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(OrderRecord {
            id: result.last_insert_rowid() as u64,
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
        })
    }

    async fn order(&self, order_id: &str) -> StorageResult<Option<OrderRecord>> {
        let row = sqlx::query("SELECT * FROM orders WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| Self::order_from_row(&row)).transpose()
    }

    async fn update_order(&self, order: &OrderRecord) -> StorageResult<()> {
        let items = to_json(&order.items, "order items")?;
        let fulfillment = to_json(&order.fulfillment, "fulfillment steps")?;
        let result = sqlx::query(
            "UPDATE orders SET customer_id = ?, table_number = ?, items = ?, subtotal = ?, \
             tax = ?, service_charge = ?, discount = ?, loyalty_points_used = ?, \
             loyalty_points_earned = ?, total = ?, payment_method = ?, payment_status = ?, \
             order_status = ?, kitchen_status = ?, notes = ?, kitchen_ticket_created = ?, \
             stock_updated = ?, fulfillment = ?, updated_at = ?, completed_at = ? \
             WHERE order_id = ?",
        )
        .bind(&order.customer_id)
        .bind(&order.table_number)
        .bind(&items)
        .bind(order.subtotal)
        .bind(order.tax)
        .bind(order.service_charge)
        .bind(order.discount)
        .bind(order.loyalty_points_used)
        .bind(order.loyalty_points_earned)
        .bind(order.total)
        .bind(&order.payment_method)
        .bind(order.payment_status.as_str())
        .bind(order.order_status.as_str())
        .bind(&order.kitchen_status)
        .bind(&order.notes)
        .bind(order.kitchen_ticket_created as i64)
        .bind(order.stock_updated as i64)
        .bind(&fulfillment)
        .bind(order.updated_at.to_rfc3339())
        .bind(order.completed_at.map(|at| at.to_rfc3339()))
        .bind(&order.order_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound {
                entity: "order",
                key: order.order_id.clone(),
            });
        }
        Ok(())
    }
}

/// SQLite menu-catalog store.
pub struct SqliteMenuStore {
    pool: SqlitePool,
}

impl SqliteMenuStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the menus table.
    pub async fn init(&self) -> Result<(), sqlx::Error> {
        sqlx::query(schema::CREATE_MENUS).execute(&self.pool).await?;
        Ok(())
    }

    fn menu_from_row(row: &SqliteRow) -> StorageResult<MenuRecord> {
        let ingredients: String = row.get("ingredients");
        Ok(MenuRecord {
            id: row.get::<i64, _>("id") as u64,
            menu_id: row.get("menu_id"),
            name: row.get("name"),
            category: row.get("category"),
            price: row.get("price"),
            ingredients: parse_json(&ingredients, "menu ingredients")?,
            available: row.get::<i64, _>("available") != 0,
            preparation_minutes: row.get::<i64, _>("preparation_minutes") as u32,
        })
    }
}

#[async_trait]
impl MenuStore for SqliteMenuStore {
    async fn insert_menu(&self, menu: NewMenu) -> StorageResult<MenuRecord> {
        let existing = sqlx::query("SELECT id FROM menus WHERE menu_id = ?")
            .bind(&menu.menu_id)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(StorageError::Duplicate {
                entity: "menu",
                key: menu.menu_id,
            });
        }

        let ingredients = to_json(&menu.ingredients, "menu ingredients")?;
        let result = sqlx::query(
            "INSERT INTO menus (menu_id, name, category, price, ingredients, available, \
             preparation_minutes) VALUES (?, ?, ?, ?, ?, 1, ?)",
        )
        .bind(&menu.menu_id)
        .bind(&menu.name)
        .bind(&menu.category)
        .bind(menu.price)
        .bind(&ingredients)
        .bind(menu.preparation_minutes as i64)
        .execute(&self.pool)
        .await?;

        Ok(MenuRecord {
            id: result.last_insert_rowid() as u64,
            menu_id: menu.menu_id,
            name: menu.name,
            category: menu.category,
            price: menu.price,
            ingredients: menu.ingredients,
            available: true,
            preparation_minutes: menu.preparation_minutes,
        })
    }

    async fn menu(&self, menu_id: &str) -> StorageResult<Option<MenuRecord>> {
        let row = sqlx::query("SELECT * FROM menus WHERE menu_id = ?")
            .bind(menu_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| Self::menu_from_row(&row)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::kitchen::TicketItem;
    use crate::interfaces::order::OrderLineItem;

    async fn pool() -> SqlitePool {
        sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_stock_store_roundtrip() {
        let store = SqliteStockStore::new(pool().await);
        store.init().await.unwrap();

        let inserted = store
            .insert_ingredient(NewIngredient {
                ingredient_id: "ING-1".to_string(),
                name: "Beras".to_string(),
                unit: "kg".to_string(),
                category: "staple".to_string(),
                min_stock_level: 10.0,
                current_stock: 50.0,
                cost_per_unit: 12_000.0,
                status: IngredientStatus::Active,
            })
            .await
            .unwrap();
        assert!(inserted.id > 0);

        let mut loaded = store.ingredient("ING-1").await.unwrap().unwrap();
        assert_eq!(loaded.current_stock, 50.0);
        assert_eq!(loaded.status, IngredientStatus::Active);

        loaded.current_stock = 5.0;
        loaded.status = IngredientStatus::Active;
        store.update_ingredient(&loaded).await.unwrap();
        let low = store.list_low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].ingredient_id, "ING-1");

        let movement = store
            .append_movement(NewMovement {
                ingredient_id: "ING-1".to_string(),
                direction: MovementDirection::Out,
                quantity: 45.0,
                reason: Some("spill".to_string()),
                reference: Some(Reference {
                    id: "ORD-1".to_string(),
                    kind: "order".to_string(),
                }),
            })
            .await
            .unwrap();

        let found = store
            .movement_by_reference(
                "ING-1",
                &Reference {
                    id: "ORD-1".to_string(),
                    kind: "order".to_string(),
                },
                MovementDirection::Out,
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, movement.id);
        assert_eq!(found.quantity, 45.0);

        let err = store
            .insert_ingredient(NewIngredient {
                ingredient_id: "ING-1".to_string(),
                name: "Beras".to_string(),
                unit: "kg".to_string(),
                category: "staple".to_string(),
                min_stock_level: 0.0,
                current_stock: 0.0,
                cost_per_unit: 0.0,
                status: IngredientStatus::Active,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_kitchen_store_roundtrip() {
        let store = SqliteKitchenStore::new(pool().await);
        store.init().await.unwrap();

        let ticket = store
            .insert_ticket(NewTicket {
                order_id: "ORD-1".to_string(),
                table_number: Some("T2".to_string()),
                items: vec![TicketItem {
                    menu_id: "MENU-1".to_string(),
                    name: "Sate".to_string(),
                    quantity: 3,
                    special_instructions: Some("extra sauce".to_string()),
                }],
                priority: 1,
                notes: None,
            })
            .await
            .unwrap();

        let chef = store
            .insert_chef(NewChef {
                name: "Budi".to_string(),
                max_capacity: 4,
            })
            .await
            .unwrap();

        let mut loaded = store.ticket(ticket.id).await.unwrap().unwrap();
        assert_eq!(loaded.items[0].quantity, 3);
        loaded.status = TicketStatus::Preparing;
        loaded.chef_id = Some(chef.id);
        store.update_ticket(&loaded).await.unwrap();

        let by_order = store.ticket_for_order("ORD-1").await.unwrap().unwrap();
        assert_eq!(by_order.status, TicketStatus::Preparing);
        assert_eq!(by_order.chef_id, Some(chef.id));
    }

    #[tokio::test]
    async fn test_order_store_roundtrip() {
        let store = SqliteOrderStore::new(pool().await);
        store.init().await.unwrap();

        let order = store
            .insert_order(NewOrder {
                order_id: "ORD-1".to_string(),
                customer_id: Some("CUST-1".to_string()),
                table_number: None,
                items: vec![OrderLineItem {
                    menu_id: "MENU-1".to_string(),
                    name: "Sate".to_string(),
                    quantity: 2,
                    price: 25_000.0,
                    special_instructions: None,
                }],
                subtotal: 50_000.0,
                tax: 5_000.0,
                service_charge: 2_500.0,
                discount: 0.0,
                loyalty_points_used: 0.0,
                total: 57_500.0,
                payment_method: "cash".to_string(),
                notes: None,
            })
            .await
            .unwrap();

        let mut loaded = store.order("ORD-1").await.unwrap().unwrap();
        assert_eq!(loaded.total, 57_500.0);
        assert_eq!(loaded.order_status, OrderStatus::Pending);
        assert_eq!(loaded.id, order.id);

        loaded.stock_updated = true;
        loaded.order_status = OrderStatus::Completed;
        loaded.completed_at = Some(Utc::now());
        store.update_order(&loaded).await.unwrap();

        let reloaded = store.order("ORD-1").await.unwrap().unwrap();
        assert!(reloaded.stock_updated);
        assert_eq!(reloaded.order_status, OrderStatus::Completed);
        assert!(reloaded.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_loyalty_store_roundtrip() {
        let store = SqliteLoyaltyStore::new(pool().await);
        store.init().await.unwrap();

        let mut account = store.insert_account("CUST-1").await.unwrap();
        account.total_points = 300.0;
        account.tier = Tier::Silver;
        store.update_account(&account).await.unwrap();

        let loaded = store.account("CUST-1").await.unwrap().unwrap();
        assert_eq!(loaded.tier, Tier::Silver);
        assert_eq!(loaded.available_points(), 300.0);

        store
            .append_transaction(NewTransaction {
                customer_id: "CUST-1".to_string(),
                kind: TransactionKind::Earn,
                points: 300.0,
                order_id: Some("ORD-1".to_string()),
                description: None,
            })
            .await
            .unwrap();
        let transactions = store.transactions("CUST-1").await.unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].kind, TransactionKind::Earn);
    }
}
