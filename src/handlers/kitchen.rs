//! Kitchen service handler.

use std::sync::Arc;

use tonic::{Request, Response, Status};

use warung_client::proto::kitchen::kitchen_server::Kitchen;
use warung_client::proto::kitchen::{
    AssignChefRequest, Chef, CreateTicketRequest, GetChefRequest, GetTicketRequest,
    RegisterChefRequest, Ticket, TicketForOrderRequest, TicketItem, TicketRef,
    UpdateEstimatedTimeRequest, UpdateTicketStatusRequest,
};

use crate::interfaces::kitchen::{
    ChefRecord, NewChef, NewTicket, TicketItem as TicketItemRecord, TicketRecord, TicketStatus,
};
use crate::kitchen::TicketBoard;

use super::auth::{require_min_role, Role};
use super::timestamp;

/// Default chef capacity when a registration does not specify one.
const DEFAULT_CHEF_CAPACITY: u32 = 5;

/// The kitchen gRPC service.
pub struct KitchenHandler {
    board: Arc<TicketBoard>,
}

impl KitchenHandler {
    pub fn new(board: Arc<TicketBoard>) -> Self {
        Self { board }
    }
}

fn ticket_to_proto(record: TicketRecord) -> Ticket {
    Ticket {
        id: record.id,
        order_id: record.order_id,
        table_number: record.table_number.unwrap_or_default(),
        status: record.status.as_str().to_string(),
        items: record
            .items
            .into_iter()
            .map(|item| TicketItem {
                menu_id: item.menu_id,
                name: item.name,
                quantity: item.quantity,
                special_instructions: item.special_instructions.unwrap_or_default(),
            })
            .collect(),
        priority: record.priority,
        estimated_minutes: record.estimated_minutes.unwrap_or(0),
        chef_id: record.chef_id.unwrap_or(0),
        notes: record.notes.unwrap_or_default(),
        created_at: Some(timestamp(record.created_at)),
        updated_at: Some(timestamp(record.updated_at)),
    }
}

fn chef_to_proto(record: ChefRecord) -> Chef {
    Chef {
        id: record.id,
        name: record.name,
        status: record.status.as_str().to_string(),
        busy_count: record.busy_count,
        max_capacity: record.max_capacity,
    }
}

fn parse_status(status: &str) -> Result<TicketStatus, Status> {
    TicketStatus::parse(status)
        .ok_or_else(|| Status::invalid_argument(format!("unknown ticket status: {status}")))
}

#[tonic::async_trait]
impl Kitchen for KitchenHandler {
    async fn create_ticket(
        &self,
        request: Request<CreateTicketRequest>,
    ) -> Result<Response<Ticket>, Status> {
        require_min_role(&request, Role::Staff)?;
        let request = request.into_inner();
        if request.order_id.is_empty() {
            return Err(Status::invalid_argument("order_id is required"));
        }
        let ticket = self
            .board
            .create_ticket(NewTicket {
                order_id: request.order_id,
                table_number: (!request.table_number.is_empty())
                    .then_some(request.table_number),
                items: request
                    .items
                    .into_iter()
                    .map(|item| TicketItemRecord {
                        menu_id: item.menu_id,
                        name: item.name,
                        quantity: item.quantity,
                        special_instructions: (!item.special_instructions.is_empty())
                            .then_some(item.special_instructions),
                    })
                    .collect(),
                priority: request.priority,
                notes: (!request.notes.is_empty()).then_some(request.notes),
            })
            .await?;
        Ok(Response::new(ticket_to_proto(ticket)))
    }

    async fn get_ticket(
        &self,
        request: Request<GetTicketRequest>,
    ) -> Result<Response<Ticket>, Status> {
        let ticket = self.board.ticket(request.into_inner().id).await?;
        Ok(Response::new(ticket_to_proto(ticket)))
    }

    async fn ticket_for_order(
        &self,
        request: Request<TicketForOrderRequest>,
    ) -> Result<Response<Ticket>, Status> {
        let ticket = self
            .board
            .ticket_for_order(&request.into_inner().order_id)
            .await?;
        Ok(Response::new(ticket_to_proto(ticket)))
    }

    async fn assign_chef(
        &self,
        request: Request<AssignChefRequest>,
    ) -> Result<Response<Ticket>, Status> {
        require_min_role(&request, Role::Staff)?;
        let request = request.into_inner();
        let ticket = self
            .board
            .assign_chef(request.ticket_id, request.chef_id)
            .await?;
        Ok(Response::new(ticket_to_proto(ticket)))
    }

    async fn update_ticket_status(
        &self,
        request: Request<UpdateTicketStatusRequest>,
    ) -> Result<Response<Ticket>, Status> {
        require_min_role(&request, Role::Staff)?;
        let request = request.into_inner();
        let status = parse_status(&request.status)?;
        let ticket = self.board.update_status(request.ticket_id, status).await?;
        Ok(Response::new(ticket_to_proto(ticket)))
    }

    async fn update_estimated_time(
        &self,
        request: Request<UpdateEstimatedTimeRequest>,
    ) -> Result<Response<Ticket>, Status> {
        require_min_role(&request, Role::Staff)?;
        let request = request.into_inner();
        let ticket = self
            .board
            .update_estimated_time(request.ticket_id, request.estimated_minutes)
            .await?;
        Ok(Response::new(ticket_to_proto(ticket)))
    }

    async fn complete_ticket(
        &self,
        request: Request<TicketRef>,
    ) -> Result<Response<Ticket>, Status> {
        require_min_role(&request, Role::Staff)?;
        let ticket = self
            .board
            .complete_ticket(request.into_inner().ticket_id)
            .await?;
        Ok(Response::new(ticket_to_proto(ticket)))
    }

    async fn cancel_ticket(
        &self,
        request: Request<TicketRef>,
    ) -> Result<Response<Ticket>, Status> {
        require_min_role(&request, Role::Staff)?;
        let ticket = self
            .board
            .cancel_ticket(request.into_inner().ticket_id)
            .await?;
        Ok(Response::new(ticket_to_proto(ticket)))
    }

    async fn register_chef(
        &self,
        request: Request<RegisterChefRequest>,
    ) -> Result<Response<Chef>, Status> {
        require_min_role(&request, Role::Manager)?;
        let request = request.into_inner();
        if request.name.is_empty() {
            return Err(Status::invalid_argument("name is required"));
        }
        let chef = self
            .board
            .register_chef(NewChef {
                name: request.name,
                max_capacity: if request.max_capacity == 0 {
                    DEFAULT_CHEF_CAPACITY
                } else {
                    request.max_capacity
                },
            })
            .await?;
        Ok(Response::new(chef_to_proto(chef)))
    }

    async fn get_chef(&self, request: Request<GetChefRequest>) -> Result<Response<Chef>, Status> {
        let chef = self.board.chef(request.into_inner().id).await?;
        Ok(Response::new(chef_to_proto(chef)))
    }
}
