//! Order service handler.

use std::sync::Arc;

use tonic::{Request, Response, Status};

use warung_client::proto::order::orders_server::Orders;
use warung_client::proto::order::{
    CheckMenuStockRequest, CreateOrderRequest, CreateOrderResponse, FulfillmentStep,
    GetMenuRequest, GetOrderRequest, IngredientRequirement, Menu, MenuStockLine, MenuStockReport,
    Order, OrderLineItem, OrderRef, RegisterMenuRequest, UpdateOrderStatusRequest,
};

use crate::interfaces::order::{
    IngredientRequirement as RequirementRecord, MenuRecord, NewMenu,
    OrderLineItem as LineItemRecord, OrderRecord, OrderStatus,
};
use crate::orchestration::{CreateOrderInput, OrderOrchestrator};

use super::auth::{require_min_role, Role};
use super::timestamp;

/// The order gRPC service.
pub struct OrderHandler {
    orchestrator: Arc<OrderOrchestrator>,
}

impl OrderHandler {
    pub fn new(orchestrator: Arc<OrderOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

fn optional(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn line_item_from_proto(item: OrderLineItem) -> LineItemRecord {
    LineItemRecord {
        menu_id: item.menu_id,
        name: item.name,
        quantity: item.quantity,
        price: item.price,
        special_instructions: optional(item.special_instructions),
    }
}

fn order_to_proto(record: OrderRecord) -> Order {
    Order {
        id: record.id,
        order_id: record.order_id,
        customer_id: record.customer_id.unwrap_or_default(),
        table_number: record.table_number.unwrap_or_default(),
        items: record
            .items
            .into_iter()
            .map(|item| OrderLineItem {
                menu_id: item.menu_id,
                name: item.name,
                quantity: item.quantity,
                price: item.price,
                special_instructions: item.special_instructions.unwrap_or_default(),
            })
            .collect(),
        subtotal: record.subtotal,
        tax: record.tax,
        service_charge: record.service_charge,
        discount: record.discount,
        loyalty_points_used: record.loyalty_points_used,
        loyalty_points_earned: record.loyalty_points_earned,
        total: record.total,
        payment_method: record.payment_method,
        payment_status: record.payment_status.as_str().to_string(),
        order_status: record.order_status.as_str().to_string(),
        kitchen_status: record.kitchen_status.unwrap_or_default(),
        notes: record.notes.unwrap_or_default(),
        kitchen_ticket_created: record.kitchen_ticket_created,
        stock_updated: record.stock_updated,
        fulfillment: record
            .fulfillment
            .into_iter()
            .map(|step| FulfillmentStep {
                step: step.step.as_str().to_string(),
                status: step.status.as_str().to_string(),
                detail: step.detail,
            })
            .collect(),
        created_at: Some(timestamp(record.created_at)),
        updated_at: Some(timestamp(record.updated_at)),
        completed_at: record.completed_at.map(timestamp),
    }
}

fn menu_to_proto(record: MenuRecord) -> Menu {
    Menu {
        id: record.id,
        menu_id: record.menu_id,
        name: record.name,
        category: record.category,
        price: record.price,
        ingredients: record
            .ingredients
            .into_iter()
            .map(|requirement| IngredientRequirement {
                ingredient_id: requirement.ingredient_id,
                ingredient_name: requirement.ingredient_name,
                quantity: requirement.quantity,
            })
            .collect(),
        available: record.available,
        preparation_minutes: record.preparation_minutes,
    }
}

#[tonic::async_trait]
impl Orders for OrderHandler {
    async fn create_order(
        &self,
        request: Request<CreateOrderRequest>,
    ) -> Result<Response<CreateOrderResponse>, Status> {
        require_min_role(&request, Role::Staff)?;
        let request = request.into_inner();
        let outcome = self
            .orchestrator
            .create_order(CreateOrderInput {
                order_id: optional(request.order_id),
                customer_id: optional(request.customer_id),
                table_number: optional(request.table_number),
                items: request
                    .items
                    .into_iter()
                    .map(line_item_from_proto)
                    .collect(),
                payment_method: optional(request.payment_method),
                loyalty_points_used: request.loyalty_points_used,
                discount: (request.discount != 0.0).then_some(request.discount),
                notes: optional(request.notes),
            })
            .await?;
        Ok(Response::new(CreateOrderResponse {
            kitchen_ticket_created: outcome.kitchen_ticket_created,
            stock_updated: outcome.stock_updated,
            loyalty_points_earned: outcome.loyalty_points_earned,
            message: outcome.message,
            order: Some(order_to_proto(outcome.order)),
        }))
    }

    async fn get_order(&self, request: Request<GetOrderRequest>) -> Result<Response<Order>, Status> {
        let order = self.orchestrator.order(&request.into_inner().order_id).await?;
        Ok(Response::new(order_to_proto(order)))
    }

    async fn cancel_order(&self, request: Request<OrderRef>) -> Result<Response<Order>, Status> {
        require_min_role(&request, Role::Staff)?;
        let order = self
            .orchestrator
            .cancel_order(&request.into_inner().order_id)
            .await?;
        Ok(Response::new(order_to_proto(order)))
    }

    async fn update_order_status(
        &self,
        request: Request<UpdateOrderStatusRequest>,
    ) -> Result<Response<Order>, Status> {
        require_min_role(&request, Role::Staff)?;
        let request = request.into_inner();
        let status = OrderStatus::parse(&request.status).ok_or_else(|| {
            Status::invalid_argument(format!("unknown order status: {}", request.status))
        })?;
        let order = self
            .orchestrator
            .update_order_status(&request.order_id, status)
            .await?;
        Ok(Response::new(order_to_proto(order)))
    }

    async fn check_menu_stock(
        &self,
        request: Request<CheckMenuStockRequest>,
    ) -> Result<Response<MenuStockReport>, Status> {
        let request = request.into_inner();
        if request.quantity == 0 {
            return Err(Status::invalid_argument("quantity must be positive"));
        }
        let lines = self
            .orchestrator
            .check_menu_stock(&request.menu_id, request.quantity)
            .await?;
        let all_available = lines.iter().all(|line| line.available);
        Ok(Response::new(MenuStockReport {
            lines: lines
                .into_iter()
                .map(|line| MenuStockLine {
                    ingredient_id: line.ingredient_id,
                    ingredient_name: line.ingredient_name,
                    required: line.required,
                    available_quantity: line.available_quantity,
                    available: line.available,
                    message: line.message,
                })
                .collect(),
            all_available,
        }))
    }

    async fn register_menu(
        &self,
        request: Request<RegisterMenuRequest>,
    ) -> Result<Response<Menu>, Status> {
        require_min_role(&request, Role::Manager)?;
        let request = request.into_inner();
        if request.menu_id.is_empty() {
            return Err(Status::invalid_argument("menu_id is required"));
        }
        let menu = self
            .orchestrator
            .register_menu(NewMenu {
                menu_id: request.menu_id,
                name: request.name,
                category: request.category,
                price: request.price,
                ingredients: request
                    .ingredients
                    .into_iter()
                    .map(|requirement| RequirementRecord {
                        ingredient_id: requirement.ingredient_id,
                        ingredient_name: requirement.ingredient_name,
                        quantity: requirement.quantity,
                    })
                    .collect(),
                preparation_minutes: request.preparation_minutes,
            })
            .await?;
        Ok(Response::new(menu_to_proto(menu)))
    }

    async fn get_menu(&self, request: Request<GetMenuRequest>) -> Result<Response<Menu>, Status> {
        let menu = self.orchestrator.menu(&request.into_inner().menu_id).await?;
        Ok(Response::new(menu_to_proto(menu)))
    }
}
