//! Kitchen storage interface: tickets and the chef roster.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StorageResult;

/// Production ticket lifecycle.
///
/// `pending -> preparing -> {ready -> completed} | cancelled`.
/// `preparing` is reachable only through chef assignment; `completed` and
/// `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl TicketStatus {
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

    /// Whether `self -> to` is a legal transition via a plain status
    /// update. `preparing` is never legal here: chef assignment is the
    /// only path into it.
    pub fn can_transition_to(&self, to: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, to),
            (Pending, Completed)
                | (Pending, Cancelled)
                | (Preparing, Ready)
                | (Preparing, Completed)
                | (Preparing, Cancelled)
                | (Ready, Completed)
        )
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chef availability status. `busy`/`available` are derived from the
/// capacity counter; `offline` is only ever set manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChefStatus {
    Available,
    Busy,
    Offline,
}

impl ChefStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Busy => "busy",
            Self::Offline => "offline",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "busy" => Some(Self::Busy),
            "offline" => Some(Self::Offline),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChefStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a production ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketItem {
    pub menu_id: String,
    pub name: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

/// A production ticket row.
#[derive(Debug, Clone)]
pub struct TicketRecord {
    pub id: u64,
    pub order_id: String,
    pub table_number: Option<String>,
    pub status: TicketStatus,
    pub items: Vec<TicketItem>,
    pub priority: u32,
    pub estimated_minutes: Option<u32>,
    pub chef_id: Option<u64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A new ticket, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub order_id: String,
    pub table_number: Option<String>,
    pub items: Vec<TicketItem>,
    pub priority: u32,
    pub notes: Option<String>,
}

/// A chef row with its explicit capacity.
#[derive(Debug, Clone)]
pub struct ChefRecord {
    pub id: u64,
    pub name: String,
    pub status: ChefStatus,
    pub busy_count: u32,
    pub max_capacity: u32,
}

impl ChefRecord {
    /// Single mutation entry point for taking on a ticket.
    ///
    /// Returns false when the chef is offline or at capacity; on success
    /// increments the busy counter and derives the busy status.
    pub fn acquire(&mut self) -> bool {
        if self.status == ChefStatus::Offline || self.busy_count >= self.max_capacity {
            return false;
        }
        self.busy_count += 1;
        self.status = ChefStatus::Busy;
        true
    }

    /// Single mutation entry point for releasing a ticket.
    ///
    /// Decrements the busy counter with a floor of 0 and flips the chef
    /// back to available only once the counter reaches 0. An offline chef
    /// stays offline.
    pub fn release(&mut self) {
        self.busy_count = self.busy_count.saturating_sub(1);
        if self.status != ChefStatus::Offline {
            self.status = if self.busy_count == 0 {
                ChefStatus::Available
            } else {
                ChefStatus::Busy
            };
        }
    }
}

/// A new chef, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewChef {
    pub name: String,
    pub max_capacity: u32,
}

/// Interface for ticket and chef persistence.
#[async_trait]
pub trait KitchenStore: Send + Sync {
    /// Insert a new ticket. Fails `Duplicate` when a ticket for the same
    /// order already exists.
    async fn insert_ticket(&self, ticket: NewTicket) -> StorageResult<TicketRecord>;

    async fn ticket(&self, id: u64) -> StorageResult<Option<TicketRecord>>;

    async fn ticket_for_order(&self, order_id: &str) -> StorageResult<Option<TicketRecord>>;

    async fn update_ticket(&self, ticket: &TicketRecord) -> StorageResult<()>;

    async fn insert_chef(&self, chef: NewChef) -> StorageResult<ChefRecord>;

    async fn chef(&self, id: u64) -> StorageResult<Option<ChefRecord>>;

    async fn update_chef(&self, chef: &ChefRecord) -> StorageResult<()>;
}
