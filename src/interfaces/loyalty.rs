//! Loyalty storage interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::StorageResult;

/// Customer tier, derived from lifetime points via the configured
/// thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bronze" => Some(Self::Bronze),
            "silver" => Some(Self::Silver),
            "gold" => Some(Self::Gold),
            "platinum" => Some(Self::Platinum),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of loyalty transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Earn,
    Redeem,
    Adjustment,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Earn => "earn",
            Self::Redeem => "redeem",
            Self::Adjustment => "adjustment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "earn" => Some(Self::Earn),
            "redeem" => Some(Self::Redeem),
            "adjustment" => Some(Self::Adjustment),
            _ => None,
        }
    }
}

/// A loyalty account row.
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub id: u64,
    pub customer_id: String,
    pub total_points: f64,
    pub redeemed_points: f64,
    pub tier: Tier,
    pub active: bool,
}

impl AccountRecord {
    /// Points available for redemption.
    pub fn available_points(&self) -> f64 {
        self.total_points - self.redeemed_points
    }
}

/// An immutable loyalty transaction row.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub id: u64,
    pub customer_id: String,
    pub kind: TransactionKind,
    pub points: f64,
    pub order_id: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A new transaction, before the store assigns an id and timestamp.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub customer_id: String,
    pub kind: TransactionKind,
    pub points: f64,
    pub order_id: Option<String>,
    pub description: Option<String>,
}

/// Interface for account and transaction persistence.
#[async_trait]
pub trait LoyaltyStore: Send + Sync {
    /// Insert a new account. Fails `Duplicate` when the customer is
    /// already enrolled.
    async fn insert_account(&self, customer_id: &str) -> StorageResult<AccountRecord>;

    async fn account(&self, customer_id: &str) -> StorageResult<Option<AccountRecord>>;

    async fn update_account(&self, account: &AccountRecord) -> StorageResult<()>;

    async fn append_transaction(
        &self,
        transaction: NewTransaction,
    ) -> StorageResult<TransactionRecord>;

    /// All transactions for a customer, oldest first.
    async fn transactions(&self, customer_id: &str) -> StorageResult<Vec<TransactionRecord>>;
}
