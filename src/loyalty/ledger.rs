//! Per-customer point balances with an append-only transaction log.
//!
//! Tier is derived from lifetime points on every earn; redemptions draw
//! down the available balance without touching the lifetime total.

use std::sync::Arc;

use tracing::info;

use crate::config::LoyaltyPolicy;
use crate::interfaces::loyalty::{
    AccountRecord, LoyaltyStore, NewTransaction, TransactionKind, TransactionRecord,
};
use crate::interfaces::StorageError;

/// Result type for loyalty operations.
pub type Result<T> = std::result::Result<T, LoyaltyError>;

/// Errors that can occur during loyalty operations.
#[derive(Debug, thiserror::Error)]
pub enum LoyaltyError {
    #[error("customer not enrolled: {0}")]
    NotEnrolled(String),

    #[error("customer already enrolled: {0}")]
    AlreadyEnrolled(String),

    #[error("points must be positive, got {0}")]
    InvalidPoints(f64),

    #[error("insufficient points: available {available}, requested {requested}")]
    InsufficientPoints { available: f64, requested: f64 },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The loyalty ledger.
pub struct LoyaltyLedger {
    store: Arc<dyn LoyaltyStore>,
    policy: LoyaltyPolicy,
}

impl LoyaltyLedger {
    pub fn new(store: Arc<dyn LoyaltyStore>, policy: LoyaltyPolicy) -> Self {
        Self { store, policy }
    }

    /// Enroll a customer, starting at bronze with zero points.
    pub async fn enroll(&self, customer_id: &str) -> Result<AccountRecord> {
        match self.store.insert_account(customer_id).await {
            Ok(account) => Ok(account),
            Err(StorageError::Duplicate { .. }) => {
                Err(LoyaltyError::AlreadyEnrolled(customer_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn account(&self, customer_id: &str) -> Result<AccountRecord> {
        self.store
            .account(customer_id)
            .await?
            .ok_or_else(|| LoyaltyError::NotEnrolled(customer_id.to_string()))
    }

    pub async fn transactions(&self, customer_id: &str) -> Result<Vec<TransactionRecord>> {
        Ok(self.store.transactions(customer_id).await?)
    }

    /// Credit earned points, re-deriving the tier from the lifetime total.
    pub async fn earn(
        &self,
        customer_id: &str,
        points: f64,
        order_id: Option<String>,
        description: Option<String>,
    ) -> Result<TransactionRecord> {
        if points <= 0.0 {
            return Err(LoyaltyError::InvalidPoints(points));
        }

        let mut account = self.account(customer_id).await?;
        account.total_points += points;
        account.tier = self.policy.tier_for(account.total_points);
        self.store.update_account(&account).await?;

        let transaction = self
            .store
            .append_transaction(NewTransaction {
                customer_id: customer_id.to_string(),
                kind: TransactionKind::Earn,
                points,
                order_id,
                description,
            })
            .await?;

        info!(
            customer_id,
            points,
            tier = %account.tier,
            "Loyalty points earned"
        );
        Ok(transaction)
    }

    /// Redeem points against the available balance.
    pub async fn redeem(
        &self,
        customer_id: &str,
        points: f64,
        description: Option<String>,
    ) -> Result<TransactionRecord> {
        if points <= 0.0 {
            return Err(LoyaltyError::InvalidPoints(points));
        }

        let mut account = self.account(customer_id).await?;
        let available = account.available_points();
        if available < points {
            return Err(LoyaltyError::InsufficientPoints {
                available,
                requested: points,
            });
        }

        account.redeemed_points += points;
        self.store.update_account(&account).await?;

        let transaction = self
            .store
            .append_transaction(NewTransaction {
                customer_id: customer_id.to_string(),
                kind: TransactionKind::Redeem,
                points,
                order_id: None,
                description,
            })
            .await?;
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::loyalty::Tier;
    use crate::storage::memory::MemoryLoyaltyStore;

    fn ledger() -> LoyaltyLedger {
        LoyaltyLedger::new(
            Arc::new(MemoryLoyaltyStore::new()),
            LoyaltyPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_enroll_once() {
        let ledger = ledger();
        let account = ledger.enroll("CUST-1").await.unwrap();
        assert_eq!(account.tier, Tier::Bronze);
        assert_eq!(account.total_points, 0.0);

        let err = ledger.enroll("CUST-1").await.unwrap_err();
        assert!(matches!(err, LoyaltyError::AlreadyEnrolled(_)));
    }

    #[tokio::test]
    async fn test_earn_advances_tier_and_logs_transaction() {
        let ledger = ledger();
        ledger.enroll("CUST-1").await.unwrap();

        ledger
            .earn("CUST-1", 300.0, Some("ORD-1".to_string()), None)
            .await
            .unwrap();
        let account = ledger.account("CUST-1").await.unwrap();
        assert_eq!(account.total_points, 300.0);
        assert_eq!(account.tier, Tier::Silver);

        ledger.earn("CUST-1", 700.0, None, None).await.unwrap();
        let account = ledger.account("CUST-1").await.unwrap();
        assert_eq!(account.tier, Tier::Platinum);

        let transactions = ledger.transactions("CUST-1").await.unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].kind, TransactionKind::Earn);
        assert_eq!(transactions[0].order_id.as_deref(), Some("ORD-1"));
    }

    #[tokio::test]
    async fn test_earn_requires_enrollment_and_positive_points() {
        let ledger = ledger();
        let err = ledger.earn("CUST-404", 10.0, None, None).await.unwrap_err();
        assert!(matches!(err, LoyaltyError::NotEnrolled(_)));

        ledger.enroll("CUST-1").await.unwrap();
        let err = ledger.earn("CUST-1", 0.0, None, None).await.unwrap_err();
        assert!(matches!(err, LoyaltyError::InvalidPoints(_)));
    }

    #[tokio::test]
    async fn test_redeem_draws_down_available_balance() {
        let ledger = ledger();
        ledger.enroll("CUST-1").await.unwrap();
        ledger.earn("CUST-1", 100.0, None, None).await.unwrap();

        ledger.redeem("CUST-1", 60.0, None).await.unwrap();
        let account = ledger.account("CUST-1").await.unwrap();
        assert_eq!(account.available_points(), 40.0);
        // Lifetime total is untouched by redemption.
        assert_eq!(account.total_points, 100.0);

        let err = ledger.redeem("CUST-1", 50.0, None).await.unwrap_err();
        assert!(matches!(
            err,
            LoyaltyError::InsufficientPoints {
                available: a,
                requested: r,
            } if a == 40.0 && r == 50.0
        ));
    }
}
