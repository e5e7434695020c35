//! Inventory service handler.

use std::sync::Arc;

use tonic::{Request, Response, Status};

use warung_client::proto::inventory::inventory_server::Inventory;
use warung_client::proto::inventory::{
    AdjustStockRequest, CheckStockRequest, GetIngredientRequest, Ingredient, IngredientList,
    ListLowStockRequest, ListMovementsRequest, MovementList, RegisterIngredientRequest,
    StockChangeRequest, StockCheck, StockMovement, SupplierStockRequest,
};

use crate::interfaces::gateway::SupplierGateway;
use crate::interfaces::stock::{
    IngredientRecord, IngredientStatus, MovementRecord, NewIngredient, Reference,
};
use crate::ledger::StockLedger;

use super::auth::{require_min_role, Role};
use super::timestamp;

/// The inventory gRPC service.
pub struct InventoryHandler {
    ledger: Arc<StockLedger>,
    /// None disables the supplier integration.
    supplier: Option<Arc<dyn SupplierGateway>>,
}

impl InventoryHandler {
    pub fn new(ledger: Arc<StockLedger>, supplier: Option<Arc<dyn SupplierGateway>>) -> Self {
        Self { ledger, supplier }
    }
}

fn ingredient_to_proto(record: IngredientRecord) -> Ingredient {
    Ingredient {
        id: record.id,
        ingredient_id: record.ingredient_id,
        name: record.name,
        unit: record.unit,
        category: record.category,
        min_stock_level: record.min_stock_level,
        current_stock: record.current_stock,
        cost_per_unit: record.cost_per_unit,
        status: record.status.as_str().to_string(),
    }
}

fn movement_to_proto(record: MovementRecord) -> StockMovement {
    let (reference_id, reference_type) = match record.reference {
        Some(reference) => (reference.id, reference.kind),
        None => (String::new(), String::new()),
    };
    StockMovement {
        id: record.id,
        ingredient_id: record.ingredient_id,
        direction: record.direction.as_str().to_string(),
        quantity: record.quantity,
        reason: record.reason.unwrap_or_default(),
        reference_id,
        reference_type,
        created_at: Some(timestamp(record.created_at)),
    }
}

fn reference_from_request(reference_id: &str, reference_type: &str) -> Option<Reference> {
    if reference_id.is_empty() {
        return None;
    }
    Some(Reference {
        id: reference_id.to_string(),
        kind: if reference_type.is_empty() {
            "order".to_string()
        } else {
            reference_type.to_string()
        },
    })
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[tonic::async_trait]
impl Inventory for InventoryHandler {
    async fn check_stock(
        &self,
        request: Request<CheckStockRequest>,
    ) -> Result<Response<StockCheck>, Status> {
        let request = request.into_inner();
        let check = self
            .ledger
            .check_availability(&request.ingredient_id, request.quantity)
            .await?;
        Ok(Response::new(StockCheck {
            available: check.available,
            current_stock: check.current_stock,
            requested_quantity: check.requested_quantity,
            message: check.message,
        }))
    }

    async fn reduce_stock(
        &self,
        request: Request<StockChangeRequest>,
    ) -> Result<Response<StockMovement>, Status> {
        require_min_role(&request, Role::Staff)?;
        let request = request.into_inner();
        let movement = self
            .ledger
            .debit(
                &request.ingredient_id,
                request.quantity,
                optional(&request.reason),
                reference_from_request(&request.reference_id, &request.reference_type),
            )
            .await?;
        Ok(Response::new(movement_to_proto(movement)))
    }

    async fn add_stock(
        &self,
        request: Request<StockChangeRequest>,
    ) -> Result<Response<StockMovement>, Status> {
        require_min_role(&request, Role::Staff)?;
        let request = request.into_inner();
        let movement = self
            .ledger
            .credit(
                &request.ingredient_id,
                request.quantity,
                optional(&request.reason),
                reference_from_request(&request.reference_id, &request.reference_type),
            )
            .await?;
        Ok(Response::new(movement_to_proto(movement)))
    }

    async fn adjust_stock(
        &self,
        request: Request<AdjustStockRequest>,
    ) -> Result<Response<StockMovement>, Status> {
        require_min_role(&request, Role::Manager)?;
        let request = request.into_inner();
        let movement = self
            .ledger
            .adjust(
                &request.ingredient_id,
                request.new_quantity,
                optional(&request.reason),
            )
            .await?;
        Ok(Response::new(movement_to_proto(movement)))
    }

    async fn get_ingredient(
        &self,
        request: Request<GetIngredientRequest>,
    ) -> Result<Response<Ingredient>, Status> {
        let request = request.into_inner();
        let ingredient = self.ledger.ingredient(&request.ingredient_id).await?;
        Ok(Response::new(ingredient_to_proto(ingredient)))
    }

    async fn register_ingredient(
        &self,
        request: Request<RegisterIngredientRequest>,
    ) -> Result<Response<Ingredient>, Status> {
        require_min_role(&request, Role::Manager)?;
        let request = request.into_inner();
        let ingredient = self
            .ledger
            .register(NewIngredient {
                ingredient_id: request.ingredient_id,
                name: request.name,
                unit: request.unit,
                category: request.category,
                min_stock_level: request.min_stock_level,
                current_stock: request.initial_stock,
                cost_per_unit: request.cost_per_unit,
                status: IngredientStatus::Active,
            })
            .await?;
        Ok(Response::new(ingredient_to_proto(ingredient)))
    }

    async fn list_low_stock(
        &self,
        _request: Request<ListLowStockRequest>,
    ) -> Result<Response<IngredientList>, Status> {
        let low = self.ledger.list_low_stock().await?;
        Ok(Response::new(IngredientList {
            ingredients: low.into_iter().map(ingredient_to_proto).collect(),
        }))
    }

    async fn list_movements(
        &self,
        request: Request<ListMovementsRequest>,
    ) -> Result<Response<MovementList>, Status> {
        let request = request.into_inner();
        // Unknown ingredient is NotFound, not an empty log.
        self.ledger.ingredient(&request.ingredient_id).await?;
        let movements = self.ledger.movements(&request.ingredient_id).await?;
        Ok(Response::new(MovementList {
            movements: movements.into_iter().map(movement_to_proto).collect(),
        }))
    }

    async fn check_supplier_stock(
        &self,
        request: Request<SupplierStockRequest>,
    ) -> Result<Response<StockCheck>, Status> {
        let supplier = self
            .supplier
            .as_ref()
            .ok_or_else(|| Status::failed_precondition("supplier integration not configured"))?;
        let request = request.into_inner();
        let probe = supplier
            .check_stock(&request.product_id, request.quantity)
            .await?;
        Ok(Response::new(StockCheck {
            available: probe.available,
            current_stock: probe.current_stock,
            requested_quantity: request.quantity,
            message: probe.message,
        }))
    }
}
