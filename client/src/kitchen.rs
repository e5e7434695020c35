//! Typed client for the Kitchen service.

use tonic::transport::Channel;
use tonic::{Request, Status};

use crate::auth::Identity;
use crate::call::RetryPolicy;
use crate::channel::connect_with_backoff;
use crate::proto::kitchen::kitchen_client::KitchenClient as GrpcClient;
use crate::proto::kitchen::{
    CreateTicketRequest, Ticket, TicketForOrderRequest, TicketRef,
};

/// Kitchen client with retry applied to every call.
#[derive(Clone)]
pub struct KitchenClient {
    inner: GrpcClient<Channel>,
    policy: RetryPolicy,
    identity: Identity,
}

impl KitchenClient {
    pub fn new(channel: Channel, policy: RetryPolicy, identity: Identity) -> Self {
        Self {
            inner: GrpcClient::new(channel),
            policy,
            identity,
        }
    }

    /// Connect to the kitchen service, retrying with backoff at startup.
    pub async fn connect(
        address: &str,
        policy: RetryPolicy,
        identity: Identity,
    ) -> Result<Self, String> {
        let channel = connect_with_backoff("kitchen", address).await?;
        Ok(Self::new(channel, policy, identity))
    }

    fn request_for<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        self.identity.apply(&mut request);
        request
    }

    pub async fn create_ticket(&self, message: CreateTicketRequest) -> Result<Ticket, Status> {
        self.policy
            .run("kitchen.create_ticket", || {
                let mut client = self.inner.clone();
                let request = self.request_for(message.clone());
                async move { client.create_ticket(request).await.map(|r| r.into_inner()) }
            })
            .await
    }

    pub async fn ticket_for_order(&self, order_id: &str) -> Result<Ticket, Status> {
        let message = TicketForOrderRequest {
            order_id: order_id.to_string(),
        };
        self.policy
            .run("kitchen.ticket_for_order", || {
                let mut client = self.inner.clone();
                let request = self.request_for(message.clone());
                async move {
                    client
                        .ticket_for_order(request)
                        .await
                        .map(|r| r.into_inner())
                }
            })
            .await
    }

    pub async fn complete_ticket(&self, ticket_id: u64) -> Result<Ticket, Status> {
        let message = TicketRef { ticket_id };
        self.policy
            .run("kitchen.complete_ticket", || {
                let mut client = self.inner.clone();
                let request = self.request_for(message.clone());
                async move {
                    client
                        .complete_ticket(request)
                        .await
                        .map(|r| r.into_inner())
                }
            })
            .await
    }

    pub async fn cancel_ticket(&self, ticket_id: u64) -> Result<Ticket, Status> {
        let message = TicketRef { ticket_id };
        self.policy
            .run("kitchen.cancel_ticket", || {
                let mut client = self.inner.clone();
                let request = self.request_for(message.clone());
                async move { client.cancel_ticket(request).await.map(|r| r.into_inner()) }
            })
            .await
    }
}
