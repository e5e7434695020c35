//! Loyalty service handler.

use std::sync::Arc;

use tonic::{Request, Response, Status};

use warung_client::proto::loyalty::loyalty_server::Loyalty;
use warung_client::proto::loyalty::{
    AccountRequest, EarnPointsRequest, EnrollRequest, LoyaltyAccount, LoyaltyTransaction,
    RedeemPointsRequest,
};

use crate::interfaces::loyalty::{AccountRecord, TransactionRecord};
use crate::loyalty::LoyaltyLedger;

use super::auth::{require_min_role, Role};
use super::timestamp;

/// The loyalty gRPC service.
pub struct LoyaltyHandler {
    ledger: Arc<LoyaltyLedger>,
}

impl LoyaltyHandler {
    pub fn new(ledger: Arc<LoyaltyLedger>) -> Self {
        Self { ledger }
    }
}

fn account_to_proto(record: AccountRecord) -> LoyaltyAccount {
    LoyaltyAccount {
        id: record.id,
        available_points: record.available_points(),
        customer_id: record.customer_id,
        total_points: record.total_points,
        redeemed_points: record.redeemed_points,
        tier: record.tier.as_str().to_string(),
        status: if record.active { "active" } else { "inactive" }.to_string(),
    }
}

fn transaction_to_proto(record: TransactionRecord) -> LoyaltyTransaction {
    LoyaltyTransaction {
        id: record.id,
        customer_id: record.customer_id,
        kind: record.kind.as_str().to_string(),
        points: record.points,
        order_id: record.order_id.unwrap_or_default(),
        description: record.description.unwrap_or_default(),
        created_at: Some(timestamp(record.created_at)),
    }
}

fn optional(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[tonic::async_trait]
impl Loyalty for LoyaltyHandler {
    async fn enroll(
        &self,
        request: Request<EnrollRequest>,
    ) -> Result<Response<LoyaltyAccount>, Status> {
        require_min_role(&request, Role::Staff)?;
        let request = request.into_inner();
        if request.customer_id.is_empty() {
            return Err(Status::invalid_argument("customer_id is required"));
        }
        let account = self.ledger.enroll(&request.customer_id).await?;
        Ok(Response::new(account_to_proto(account)))
    }

    async fn get_account(
        &self,
        request: Request<AccountRequest>,
    ) -> Result<Response<LoyaltyAccount>, Status> {
        let account = self
            .ledger
            .account(&request.into_inner().customer_id)
            .await?;
        Ok(Response::new(account_to_proto(account)))
    }

    async fn earn_points(
        &self,
        request: Request<EarnPointsRequest>,
    ) -> Result<Response<LoyaltyTransaction>, Status> {
        require_min_role(&request, Role::Staff)?;
        let request = request.into_inner();
        let transaction = self
            .ledger
            .earn(
                &request.customer_id,
                request.points,
                optional(request.order_id),
                optional(request.description),
            )
            .await?;
        Ok(Response::new(transaction_to_proto(transaction)))
    }

    async fn redeem_points(
        &self,
        request: Request<RedeemPointsRequest>,
    ) -> Result<Response<LoyaltyTransaction>, Status> {
        require_min_role(&request, Role::Staff)?;
        let request = request.into_inner();
        let transaction = self
            .ledger
            .redeem(
                &request.customer_id,
                request.points,
                optional(request.description),
            )
            .await?;
        Ok(Response::new(transaction_to_proto(transaction)))
    }
}
