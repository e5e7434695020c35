//! Per-ingredient stock ledger with an append-only movement log.
//!
//! `current_stock` is a materialized aggregate; the movement log is ground
//! truth. Debits and credits against the same ingredient serialize on a
//! per-ingredient lock so the availability check and the decrement cannot
//! be separated by another writer — the one place a race would oversell
//! stock. The inventory service exclusively owns ingredient rows, so the
//! in-process lock is the row-level lock.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::interfaces::stock::{
    IngredientRecord, IngredientStatus, MovementDirection, MovementRecord, NewIngredient,
    NewMovement, Reference, StockStore,
};
use crate::interfaces::StorageError;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ingredient not found: {0}")]
    NotFound(String),

    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(f64),

    #[error(
        "insufficient stock for {ingredient}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        ingredient: String,
        available: f64,
        requested: f64,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result of an availability check.
#[derive(Debug, Clone)]
pub struct StockCheck {
    pub available: bool,
    pub current_stock: f64,
    pub requested_quantity: f64,
    pub message: String,
}

/// The stock ledger.
pub struct StockLedger {
    store: Arc<dyn StockStore>,
    // Per-ingredient write locks. The map itself is only touched briefly
    // to hand out a lock; the per-key lock is held across the
    // check-then-apply sequence.
    locks: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl StockLedger {
    pub fn new(store: Arc<dyn StockStore>) -> Self {
        Self {
            store,
            locks: std::sync::Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, ingredient_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(ingredient_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Register a new ingredient. Initial status is derived from the
    /// initial stock.
    pub async fn register(&self, ingredient: NewIngredient) -> Result<IngredientRecord> {
        if ingredient.current_stock < 0.0 || ingredient.min_stock_level < 0.0 {
            return Err(LedgerError::InvalidQuantity(ingredient.current_stock.min(
                ingredient.min_stock_level,
            )));
        }
        let mut ingredient = ingredient;
        ingredient.status = if ingredient.current_stock > 0.0 {
            IngredientStatus::Active
        } else {
            IngredientStatus::OutOfStock
        };
        Ok(self.store.insert_ingredient(ingredient).await?)
    }

    pub async fn ingredient(&self, ingredient_id: &str) -> Result<IngredientRecord> {
        self.store
            .ingredient(ingredient_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(ingredient_id.to_string()))
    }

    pub async fn list_low_stock(&self) -> Result<Vec<IngredientRecord>> {
        Ok(self.store.list_low_stock().await?)
    }

    pub async fn movements(&self, ingredient_id: &str) -> Result<Vec<MovementRecord>> {
        Ok(self.store.movements(ingredient_id).await?)
    }

    /// Availability check. Read-only.
    pub async fn check_availability(
        &self,
        ingredient_id: &str,
        quantity: f64,
    ) -> Result<StockCheck> {
        let ingredient = self.ingredient(ingredient_id).await?;
        let available = ingredient.current_stock >= quantity;
        let message = if available {
            format!(
                "Stock available: {} {}",
                ingredient.current_stock, ingredient.unit
            )
        } else {
            format!(
                "Insufficient stock. Available: {} {}, requested: {} {}",
                ingredient.current_stock, ingredient.unit, quantity, ingredient.unit
            )
        };
        Ok(StockCheck {
            available,
            current_stock: ingredient.current_stock,
            requested_quantity: quantity,
            message,
        })
    }

    /// Debit stock, appending an `out` movement.
    ///
    /// A debit carrying a reference is idempotent: a repeat with the same
    /// reference returns the originally recorded movement and leaves stock
    /// untouched, so a retried order fulfillment cannot double-debit.
    pub async fn debit(
        &self,
        ingredient_id: &str,
        quantity: f64,
        reason: Option<String>,
        reference: Option<Reference>,
    ) -> Result<MovementRecord> {
        if quantity <= 0.0 {
            return Err(LedgerError::InvalidQuantity(quantity));
        }

        let lock = self.lock_for(ingredient_id);
        let _guard = lock.lock().await;

        if let Some(reference) = &reference {
            if let Some(existing) = self
                .store
                .movement_by_reference(ingredient_id, reference, MovementDirection::Out)
                .await?
            {
                return Ok(existing);
            }
        }

        let mut ingredient = self.ingredient(ingredient_id).await?;
        if ingredient.current_stock < quantity {
            return Err(LedgerError::InsufficientStock {
                ingredient: ingredient_id.to_string(),
                available: ingredient.current_stock,
                requested: quantity,
            });
        }

        ingredient.current_stock -= quantity;
        if ingredient.current_stock <= 0.0 && ingredient.status != IngredientStatus::Inactive {
            ingredient.status = IngredientStatus::OutOfStock;
        }
        self.store.update_ingredient(&ingredient).await?;

        let movement = self
            .store
            .append_movement(NewMovement {
                ingredient_id: ingredient_id.to_string(),
                direction: MovementDirection::Out,
                quantity,
                reason,
                reference,
            })
            .await?;
        Ok(movement)
    }

    /// Credit stock, appending an `in` movement.
    pub async fn credit(
        &self,
        ingredient_id: &str,
        quantity: f64,
        reason: Option<String>,
        reference: Option<Reference>,
    ) -> Result<MovementRecord> {
        if quantity <= 0.0 {
            return Err(LedgerError::InvalidQuantity(quantity));
        }

        let lock = self.lock_for(ingredient_id);
        let _guard = lock.lock().await;

        if let Some(reference) = &reference {
            if let Some(existing) = self
                .store
                .movement_by_reference(ingredient_id, reference, MovementDirection::In)
                .await?
            {
                return Ok(existing);
            }
        }

        let mut ingredient = self.ingredient(ingredient_id).await?;
        ingredient.current_stock += quantity;
        if ingredient.current_stock > 0.0 && ingredient.status != IngredientStatus::Inactive {
            ingredient.status = IngredientStatus::Active;
        }
        self.store.update_ingredient(&ingredient).await?;

        let movement = self
            .store
            .append_movement(NewMovement {
                ingredient_id: ingredient_id.to_string(),
                direction: MovementDirection::In,
                quantity,
                reason,
                reference,
            })
            .await?;
        Ok(movement)
    }

    /// Stocktake correction to an absolute quantity, appending an
    /// `adjustment` movement of the absolute delta.
    pub async fn adjust(
        &self,
        ingredient_id: &str,
        new_quantity: f64,
        reason: Option<String>,
    ) -> Result<MovementRecord> {
        if new_quantity < 0.0 {
            return Err(LedgerError::InvalidQuantity(new_quantity));
        }

        let lock = self.lock_for(ingredient_id);
        let _guard = lock.lock().await;

        let mut ingredient = self.ingredient(ingredient_id).await?;
        let delta = new_quantity - ingredient.current_stock;
        if delta == 0.0 {
            return Err(LedgerError::InvalidQuantity(0.0));
        }

        ingredient.current_stock = new_quantity;
        if ingredient.status != IngredientStatus::Inactive {
            ingredient.status = if new_quantity > 0.0 {
                IngredientStatus::Active
            } else {
                IngredientStatus::OutOfStock
            };
        }
        self.store.update_ingredient(&ingredient).await?;

        let movement = self
            .store
            .append_movement(NewMovement {
                ingredient_id: ingredient_id.to_string(),
                direction: MovementDirection::Adjustment,
                quantity: delta.abs(),
                reason,
                reference: None,
            })
            .await?;
        Ok(movement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStockStore;

    fn ayam() -> NewIngredient {
        NewIngredient {
            ingredient_id: "ING-AYAM".to_string(),
            name: "Ayam".to_string(),
            unit: "kg".to_string(),
            category: "protein".to_string(),
            min_stock_level: 20.0,
            current_stock: 30.0,
            cost_per_unit: 35_000.0,
            status: IngredientStatus::Active,
        }
    }

    async fn ledger_with_ayam() -> StockLedger {
        let ledger = StockLedger::new(Arc::new(MemoryStockStore::new()));
        ledger.register(ayam()).await.unwrap();
        ledger
    }

    #[tokio::test]
    async fn test_check_availability() {
        let ledger = ledger_with_ayam().await;

        let check = ledger.check_availability("ING-AYAM", 10.0).await.unwrap();
        assert!(check.available);
        assert_eq!(check.current_stock, 30.0);

        let check = ledger.check_availability("ING-AYAM", 35.0).await.unwrap();
        assert!(!check.available);
    }

    #[tokio::test]
    async fn test_check_availability_unknown_ingredient() {
        let ledger = ledger_with_ayam().await;
        let err = ledger.check_availability("ING-NOPE", 1.0).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_debit_to_zero_flips_out_of_stock_and_credit_restores() {
        let ledger = ledger_with_ayam().await;

        // 30 < 35: rejected, stock untouched.
        let err = ledger.debit("ING-AYAM", 35.0, None, None).await.unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientStock { .. }));
        assert_eq!(ledger.ingredient("ING-AYAM").await.unwrap().current_stock, 30.0);

        // Exact drain flips the status.
        ledger.debit("ING-AYAM", 30.0, None, None).await.unwrap();
        let ingredient = ledger.ingredient("ING-AYAM").await.unwrap();
        assert_eq!(ingredient.current_stock, 0.0);
        assert_eq!(ingredient.status, IngredientStatus::OutOfStock);

        // Any credit above zero reactivates.
        ledger.credit("ING-AYAM", 5.0, None, None).await.unwrap();
        let ingredient = ledger.ingredient("ING-AYAM").await.unwrap();
        assert_eq!(ingredient.current_stock, 5.0);
        assert_eq!(ingredient.status, IngredientStatus::Active);
    }

    #[tokio::test]
    async fn test_debit_then_credit_restores_and_logs_two_movements() {
        let ledger = ledger_with_ayam().await;

        ledger
            .debit("ING-AYAM", 7.5, Some("prep".to_string()), None)
            .await
            .unwrap();
        ledger
            .credit("ING-AYAM", 7.5, Some("returned".to_string()), None)
            .await
            .unwrap();

        assert_eq!(ledger.ingredient("ING-AYAM").await.unwrap().current_stock, 30.0);

        let movements = ledger.movements("ING-AYAM").await.unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].direction, MovementDirection::Out);
        assert_eq!(movements[0].quantity, 7.5);
        assert_eq!(movements[1].direction, MovementDirection::In);
        assert_eq!(movements[1].quantity, 7.5);
    }

    #[tokio::test]
    async fn test_non_positive_quantities_rejected() {
        let ledger = ledger_with_ayam().await;

        for quantity in [0.0, -1.0] {
            let err = ledger.debit("ING-AYAM", quantity, None, None).await.unwrap_err();
            assert!(matches!(err, LedgerError::InvalidQuantity(_)));
            let err = ledger.credit("ING-AYAM", quantity, None, None).await.unwrap_err();
            assert!(matches!(err, LedgerError::InvalidQuantity(_)));
        }
        assert_eq!(ledger.ingredient("ING-AYAM").await.unwrap().current_stock, 30.0);
        assert!(ledger.movements("ING-AYAM").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_manually_inactive_ingredient_keeps_status() {
        let ledger = ledger_with_ayam().await;

        let mut ingredient = ledger.ingredient("ING-AYAM").await.unwrap();
        ingredient.status = IngredientStatus::Inactive;
        ledger.store.update_ingredient(&ingredient).await.unwrap();

        ledger.debit("ING-AYAM", 30.0, None, None).await.unwrap();
        assert_eq!(
            ledger.ingredient("ING-AYAM").await.unwrap().status,
            IngredientStatus::Inactive
        );

        ledger.credit("ING-AYAM", 10.0, None, None).await.unwrap();
        assert_eq!(
            ledger.ingredient("ING-AYAM").await.unwrap().status,
            IngredientStatus::Inactive
        );
    }

    #[tokio::test]
    async fn test_referenced_debit_is_idempotent() {
        let ledger = ledger_with_ayam().await;
        let reference = Reference {
            id: "ORD-001".to_string(),
            kind: "order".to_string(),
        };

        let first = ledger
            .debit("ING-AYAM", 5.0, None, Some(reference.clone()))
            .await
            .unwrap();
        let second = ledger
            .debit("ING-AYAM", 5.0, None, Some(reference))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(ledger.ingredient("ING-AYAM").await.unwrap().current_stock, 25.0);
        assert_eq!(ledger.movements("ING-AYAM").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_debits_never_oversell() {
        let ledger = Arc::new(ledger_with_ayam().await);

        let mut handles = Vec::new();
        for _ in 0..10 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger.debit("ING-AYAM", 5.0, None, None).await
            }));
        }

        let mut successes = 0;
        let mut shortfalls = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(LedgerError::InsufficientStock { .. }) => shortfalls += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        // 30kg covers exactly six 5kg debits.
        assert_eq!(successes, 6);
        assert_eq!(shortfalls, 4);
        let ingredient = ledger.ingredient("ING-AYAM").await.unwrap();
        assert_eq!(ingredient.current_stock, 0.0);
        assert_eq!(ingredient.status, IngredientStatus::OutOfStock);
    }

    #[tokio::test]
    async fn test_adjust_records_absolute_delta() {
        let ledger = ledger_with_ayam().await;

        let movement = ledger
            .adjust("ING-AYAM", 22.0, Some("stocktake".to_string()))
            .await
            .unwrap();
        assert_eq!(movement.direction, MovementDirection::Adjustment);
        assert_eq!(movement.quantity, 8.0);
        assert_eq!(ledger.ingredient("ING-AYAM").await.unwrap().current_stock, 22.0);
    }
}
