//! Production tickets and chef capacity.
//!
//! Ticket lifecycle: `pending -> preparing -> {ready -> completed} |
//! cancelled`. `preparing` is reachable only through chef assignment, and
//! terminal states reject every transition. Chef capacity lives behind the
//! `ChefRecord::acquire`/`release` entry points so the busy counter and the
//! derived status can never be observed inconsistently.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::interfaces::kitchen::{
    ChefRecord, KitchenStore, NewChef, NewTicket, TicketRecord, TicketStatus,
};
use crate::interfaces::StorageError;

/// Result type for ticket operations.
pub type Result<T> = std::result::Result<T, TicketError>;

/// Errors that can occur during ticket operations.
#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("ticket not found: {0}")]
    NotFound(u64),

    #[error("no ticket for order: {0}")]
    NoTicketForOrder(String),

    #[error("chef not found: {0}")]
    ChefNotFound(u64),

    #[error("order already in kitchen queue: {0}")]
    DuplicateOrder(String),

    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: TicketStatus,
        to: TicketStatus,
    },

    #[error("chef {0} has no free capacity")]
    ChefUnavailable(u64),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The kitchen ticket board.
pub struct TicketBoard {
    store: Arc<dyn KitchenStore>,
}

impl TicketBoard {
    pub fn new(store: Arc<dyn KitchenStore>) -> Self {
        Self { store }
    }

    /// Open a ticket for an order. One ticket per order.
    pub async fn create_ticket(&self, ticket: NewTicket) -> Result<TicketRecord> {
        let order_id = ticket.order_id.clone();
        match self.store.insert_ticket(ticket).await {
            Ok(record) => {
                info!(order_id, ticket_id = record.id, "Kitchen ticket opened");
                Ok(record)
            }
            Err(StorageError::Duplicate { .. }) => Err(TicketError::DuplicateOrder(order_id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn ticket(&self, id: u64) -> Result<TicketRecord> {
        self.store
            .ticket(id)
            .await?
            .ok_or(TicketError::NotFound(id))
    }

    pub async fn ticket_for_order(&self, order_id: &str) -> Result<TicketRecord> {
        self.store
            .ticket_for_order(order_id)
            .await?
            .ok_or_else(|| TicketError::NoTicketForOrder(order_id.to_string()))
    }

    pub async fn register_chef(&self, chef: NewChef) -> Result<ChefRecord> {
        Ok(self.store.insert_chef(chef).await?)
    }

    pub async fn chef(&self, id: u64) -> Result<ChefRecord> {
        self.store
            .chef(id)
            .await?
            .ok_or(TicketError::ChefNotFound(id))
    }

    /// Assign a chef, moving the ticket to `preparing`.
    ///
    /// The only path into `preparing`. Consumes one unit of the chef's
    /// capacity.
    pub async fn assign_chef(&self, ticket_id: u64, chef_id: u64) -> Result<TicketRecord> {
        let mut ticket = self.ticket(ticket_id).await?;
        if ticket.status != TicketStatus::Pending {
            return Err(TicketError::InvalidTransition {
                from: ticket.status,
                to: TicketStatus::Preparing,
            });
        }

        let mut chef = self.chef(chef_id).await?;
        if !chef.acquire() {
            return Err(TicketError::ChefUnavailable(chef_id));
        }
        self.store.update_chef(&chef).await?;

        ticket.chef_id = Some(chef_id);
        ticket.status = TicketStatus::Preparing;
        ticket.updated_at = Utc::now();
        self.store.update_ticket(&ticket).await?;

        info!(ticket_id, chef_id, "Chef assigned");
        Ok(ticket)
    }

    /// Transition a ticket via a plain status update.
    ///
    /// `preparing` is rejected here (chef assignment is the only path),
    /// and terminal states reject everything. Reaching `completed` or
    /// `cancelled` releases the assigned chef's capacity.
    pub async fn update_status(&self, ticket_id: u64, to: TicketStatus) -> Result<TicketRecord> {
        let mut ticket = self.ticket(ticket_id).await?;
        if !ticket.status.can_transition_to(to) {
            return Err(TicketError::InvalidTransition {
                from: ticket.status,
                to,
            });
        }

        ticket.status = to;
        ticket.updated_at = Utc::now();
        self.store.update_ticket(&ticket).await?;

        if to.is_terminal() {
            if let Some(chef_id) = ticket.chef_id {
                self.release_chef(chef_id).await?;
            }
        }
        Ok(ticket)
    }

    /// Complete a ticket, releasing the assigned chef.
    pub async fn complete_ticket(&self, ticket_id: u64) -> Result<TicketRecord> {
        self.update_status(ticket_id, TicketStatus::Completed).await
    }

    /// Cancel a ticket, releasing the assigned chef.
    pub async fn cancel_ticket(&self, ticket_id: u64) -> Result<TicketRecord> {
        self.update_status(ticket_id, TicketStatus::Cancelled).await
    }

    pub async fn update_estimated_time(
        &self,
        ticket_id: u64,
        estimated_minutes: u32,
    ) -> Result<TicketRecord> {
        let mut ticket = self.ticket(ticket_id).await?;
        ticket.estimated_minutes = Some(estimated_minutes);
        ticket.updated_at = Utc::now();
        self.store.update_ticket(&ticket).await?;
        Ok(ticket)
    }

    async fn release_chef(&self, chef_id: u64) -> Result<()> {
        let mut chef = self.chef(chef_id).await?;
        chef.release();
        self.store.update_chef(&chef).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::kitchen::{ChefStatus, TicketItem};
    use crate::storage::memory::MemoryKitchenStore;

    fn nasi_goreng_ticket(order_id: &str) -> NewTicket {
        NewTicket {
            order_id: order_id.to_string(),
            table_number: Some("T5".to_string()),
            items: vec![TicketItem {
                menu_id: "MENU-NASGOR".to_string(),
                name: "Nasi Goreng".to_string(),
                quantity: 2,
                special_instructions: None,
            }],
            priority: 0,
            notes: None,
        }
    }

    async fn board() -> TicketBoard {
        TicketBoard::new(Arc::new(MemoryKitchenStore::new()))
    }

    async fn board_with_chef() -> (TicketBoard, u64) {
        let board = board().await;
        let chef = board
            .register_chef(NewChef {
                name: "Budi".to_string(),
                max_capacity: 5,
            })
            .await
            .unwrap();
        (board, chef.id)
    }

    #[tokio::test]
    async fn test_ticket_starts_pending_and_order_is_unique() {
        let board = board().await;
        let ticket = board.create_ticket(nasi_goreng_ticket("ORD-1")).await.unwrap();
        assert_eq!(ticket.status, TicketStatus::Pending);

        let err = board
            .create_ticket(nasi_goreng_ticket("ORD-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, TicketError::DuplicateOrder(_)));
    }

    #[tokio::test]
    async fn test_assign_chef_moves_to_preparing_and_flips_busy() {
        let (board, chef_id) = board_with_chef().await;
        let ticket = board.create_ticket(nasi_goreng_ticket("ORD-1")).await.unwrap();

        let ticket = board.assign_chef(ticket.id, chef_id).await.unwrap();
        assert_eq!(ticket.status, TicketStatus::Preparing);
        assert_eq!(ticket.chef_id, Some(chef_id));

        let chef = board.chef(chef_id).await.unwrap();
        assert_eq!(chef.busy_count, 1);
        assert_eq!(chef.status, ChefStatus::Busy);
    }

    #[tokio::test]
    async fn test_assign_unknown_chef() {
        let board = board().await;
        let ticket = board.create_ticket(nasi_goreng_ticket("ORD-1")).await.unwrap();
        let err = board.assign_chef(ticket.id, 404).await.unwrap_err();
        assert!(matches!(err, TicketError::ChefNotFound(404)));
    }

    #[tokio::test]
    async fn test_chef_released_only_after_last_ticket() {
        let (board, chef_id) = board_with_chef().await;
        let first = board.create_ticket(nasi_goreng_ticket("ORD-1")).await.unwrap();
        let second = board.create_ticket(nasi_goreng_ticket("ORD-2")).await.unwrap();

        board.assign_chef(first.id, chef_id).await.unwrap();
        board.assign_chef(second.id, chef_id).await.unwrap();
        let chef = board.chef(chef_id).await.unwrap();
        assert_eq!(chef.busy_count, 2);
        assert_eq!(chef.status, ChefStatus::Busy);

        board.complete_ticket(first.id).await.unwrap();
        let chef = board.chef(chef_id).await.unwrap();
        assert_eq!(chef.busy_count, 1);
        assert_eq!(chef.status, ChefStatus::Busy);

        board.complete_ticket(second.id).await.unwrap();
        let chef = board.chef(chef_id).await.unwrap();
        assert_eq!(chef.busy_count, 0);
        assert_eq!(chef.status, ChefStatus::Available);
    }

    #[tokio::test]
    async fn test_chef_capacity_exhaustion() {
        let board = board().await;
        let chef = board
            .register_chef(NewChef {
                name: "Sari".to_string(),
                max_capacity: 1,
            })
            .await
            .unwrap();
        let first = board.create_ticket(nasi_goreng_ticket("ORD-1")).await.unwrap();
        let second = board.create_ticket(nasi_goreng_ticket("ORD-2")).await.unwrap();

        board.assign_chef(first.id, chef.id).await.unwrap();
        let err = board.assign_chef(second.id, chef.id).await.unwrap_err();
        assert!(matches!(err, TicketError::ChefUnavailable(_)));

        // The rejected assignment must not have touched the ticket.
        let second = board.ticket(second.id).await.unwrap();
        assert_eq!(second.status, TicketStatus::Pending);
        assert_eq!(second.chef_id, None);
    }

    #[tokio::test]
    async fn test_preparing_unreachable_via_status_update() {
        let board = board().await;
        let ticket = board.create_ticket(nasi_goreng_ticket("ORD-1")).await.unwrap();
        let err = board
            .update_status(ticket.id, TicketStatus::Preparing)
            .await
            .unwrap_err();
        assert!(matches!(err, TicketError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_terminal_states_reject_transitions() {
        let (board, chef_id) = board_with_chef().await;
        let ticket = board.create_ticket(nasi_goreng_ticket("ORD-1")).await.unwrap();
        board.assign_chef(ticket.id, chef_id).await.unwrap();
        board.complete_ticket(ticket.id).await.unwrap();

        for target in [
            TicketStatus::Pending,
            TicketStatus::Ready,
            TicketStatus::Cancelled,
            TicketStatus::Completed,
        ] {
            let err = board.update_status(ticket.id, target).await.unwrap_err();
            assert!(matches!(err, TicketError::InvalidTransition { .. }));
        }

        // Capacity must not be double-released by the rejected attempts.
        let chef = board.chef(chef_id).await.unwrap();
        assert_eq!(chef.busy_count, 0);
        assert_eq!(chef.status, ChefStatus::Available);
    }

    #[tokio::test]
    async fn test_cancel_from_pending_without_chef() {
        let board = board().await;
        let ticket = board.create_ticket(nasi_goreng_ticket("ORD-1")).await.unwrap();
        let ticket = board.cancel_ticket(ticket.id).await.unwrap();
        assert_eq!(ticket.status, TicketStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_ready_then_complete() {
        let (board, chef_id) = board_with_chef().await;
        let ticket = board.create_ticket(nasi_goreng_ticket("ORD-1")).await.unwrap();
        board.assign_chef(ticket.id, chef_id).await.unwrap();

        let ticket = board.update_status(ticket.id, TicketStatus::Ready).await.unwrap();
        assert_eq!(ticket.status, TicketStatus::Ready);
        // Ready is not terminal; the chef is still on the hook.
        assert_eq!(board.chef(chef_id).await.unwrap().busy_count, 1);

        board.complete_ticket(ticket.id).await.unwrap();
        assert_eq!(board.chef(chef_id).await.unwrap().busy_count, 0);
    }

    #[tokio::test]
    async fn test_offline_chef_cannot_take_tickets() {
        let (board, chef_id) = board_with_chef().await;
        let mut chef = board.chef(chef_id).await.unwrap();
        chef.status = ChefStatus::Offline;
        board.store.update_chef(&chef).await.unwrap();

        let ticket = board.create_ticket(nasi_goreng_ticket("ORD-1")).await.unwrap();
        let err = board.assign_chef(ticket.id, chef_id).await.unwrap_err();
        assert!(matches!(err, TicketError::ChefUnavailable(_)));
    }
}
