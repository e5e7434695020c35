//! Stock storage interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::StorageResult;

/// Ingredient lifecycle status.
///
/// `out_of_stock` and `active` are derived from quantity by the ledger;
/// `inactive` is only ever set manually and is never overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngredientStatus {
    Active,
    Inactive,
    OutOfStock,
}

impl IngredientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::OutOfStock => "out_of_stock",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "out_of_stock" => Some(Self::OutOfStock),
            _ => None,
        }
    }
}

impl std::fmt::Display for IngredientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementDirection {
    In,
    Out,
    Adjustment,
}

impl MovementDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::Adjustment => "adjustment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            "adjustment" => Some(Self::Adjustment),
            _ => None,
        }
    }
}

impl std::fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Correlates a movement to its originating order or purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub id: String,
    pub kind: String,
}

/// An ingredient row. `current_stock` is a materialized aggregate; the
/// movement log is ground truth.
#[derive(Debug, Clone)]
pub struct IngredientRecord {
    pub id: u64,
    pub ingredient_id: String,
    pub name: String,
    pub unit: String,
    pub category: String,
    pub min_stock_level: f64,
    pub current_stock: f64,
    pub cost_per_unit: f64,
    pub status: IngredientStatus,
}

/// A new ingredient, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewIngredient {
    pub ingredient_id: String,
    pub name: String,
    pub unit: String,
    pub category: String,
    pub min_stock_level: f64,
    pub current_stock: f64,
    pub cost_per_unit: f64,
    pub status: IngredientStatus,
}

/// An immutable stock movement row.
#[derive(Debug, Clone)]
pub struct MovementRecord {
    pub id: u64,
    pub ingredient_id: String,
    pub direction: MovementDirection,
    pub quantity: f64,
    pub reason: Option<String>,
    pub reference: Option<Reference>,
    pub created_at: DateTime<Utc>,
}

/// A new movement, before the store assigns an id and timestamp.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub ingredient_id: String,
    pub direction: MovementDirection,
    pub quantity: f64,
    pub reason: Option<String>,
    pub reference: Option<Reference>,
}

/// Interface for ingredient and movement persistence.
///
/// Implementations:
/// - `MemoryStockStore`: in-memory
/// - `SqliteStockStore`: SQLite (feature `sqlite`)
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Insert a new ingredient. Fails `Duplicate` on an existing
    /// `ingredient_id`.
    async fn insert_ingredient(&self, ingredient: NewIngredient)
        -> StorageResult<IngredientRecord>;

    /// Look up an ingredient by its stable identifier.
    async fn ingredient(&self, ingredient_id: &str) -> StorageResult<Option<IngredientRecord>>;

    /// Persist an updated ingredient row.
    async fn update_ingredient(&self, ingredient: &IngredientRecord) -> StorageResult<()>;

    /// Ingredients at or below their minimum stock level, excluding
    /// inactive ones.
    async fn list_low_stock(&self) -> StorageResult<Vec<IngredientRecord>>;

    /// Append a movement to the log.
    async fn append_movement(&self, movement: NewMovement) -> StorageResult<MovementRecord>;

    /// All movements for an ingredient, oldest first.
    async fn movements(&self, ingredient_id: &str) -> StorageResult<Vec<MovementRecord>>;

    /// Find an existing movement with the same reference and direction.
    /// Used to make referenced debits idempotent.
    async fn movement_by_reference(
        &self,
        ingredient_id: &str,
        reference: &Reference,
        direction: MovementDirection,
    ) -> StorageResult<Option<MovementRecord>>;
}
