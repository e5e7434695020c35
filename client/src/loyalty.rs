//! Typed client for the Loyalty service.

use tonic::transport::Channel;
use tonic::{Request, Status};

use crate::auth::Identity;
use crate::call::RetryPolicy;
use crate::channel::connect_with_backoff;
use crate::proto::loyalty::loyalty_client::LoyaltyClient as GrpcClient;
use crate::proto::loyalty::{
    AccountRequest, EarnPointsRequest, LoyaltyAccount, LoyaltyTransaction, RedeemPointsRequest,
};

/// Loyalty client with retry applied to every call.
#[derive(Clone)]
pub struct LoyaltyClient {
    inner: GrpcClient<Channel>,
    policy: RetryPolicy,
    identity: Identity,
}

impl LoyaltyClient {
    pub fn new(channel: Channel, policy: RetryPolicy, identity: Identity) -> Self {
        Self {
            inner: GrpcClient::new(channel),
            policy,
            identity,
        }
    }

    /// Connect to the loyalty service, retrying with backoff at startup.
    pub async fn connect(
        address: &str,
        policy: RetryPolicy,
        identity: Identity,
    ) -> Result<Self, String> {
        let channel = connect_with_backoff("loyalty", address).await?;
        Ok(Self::new(channel, policy, identity))
    }

    fn request_for<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        self.identity.apply(&mut request);
        request
    }

    pub async fn get_account(&self, customer_id: &str) -> Result<LoyaltyAccount, Status> {
        let message = AccountRequest {
            customer_id: customer_id.to_string(),
        };
        self.policy
            .run("loyalty.get_account", || {
                let mut client = self.inner.clone();
                let request = self.request_for(message.clone());
                async move { client.get_account(request).await.map(|r| r.into_inner()) }
            })
            .await
    }

    pub async fn earn_points(
        &self,
        message: EarnPointsRequest,
    ) -> Result<LoyaltyTransaction, Status> {
        self.policy
            .run("loyalty.earn_points", || {
                let mut client = self.inner.clone();
                let request = self.request_for(message.clone());
                async move { client.earn_points(request).await.map(|r| r.into_inner()) }
            })
            .await
    }

    pub async fn redeem_points(
        &self,
        message: RedeemPointsRequest,
    ) -> Result<LoyaltyTransaction, Status> {
        self.policy
            .run("loyalty.redeem_points", || {
                let mut client = self.inner.clone();
                let request = self.request_for(message.clone());
                async move { client.redeem_points(request).await.map(|r| r.into_inner()) }
            })
            .await
    }
}
