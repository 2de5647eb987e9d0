use crate::domain::payment::{OrderRequest, PaymentOrder};
use crate::domain::ports::PaymentGateway;
use crate::error::{Result, WorkflowError};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_RAZORPAY_URL: &str = "https://api.razorpay.com";

/// Body of `POST /v1/orders`.
#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: u64,
    currency: &'a str,
    receipt: &'a str,
    payment_capture: u8,
}

impl<'a> From<&'a OrderRequest> for CreateOrderBody<'a> {
    fn from(request: &'a OrderRequest) -> Self {
        Self {
            amount: request.amount,
            currency: &request.currency,
            receipt: &request.receipt,
            payment_capture: u8::from(request.payment_capture),
        }
    }
}

/// Payment gateway backed by the Razorpay Orders API.
///
/// Requests are authenticated with HTTP basic auth (key id / key secret).
#[derive(Clone)]
pub struct RazorpayGateway {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    pub fn new(
        base_url: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WorkflowError::PaymentGatewayError(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        })
    }

    fn orders_url(&self) -> String {
        format!("{}/v1/orders", self.base_url)
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<PaymentOrder> {
        let order = self
            .client
            .post(self.orders_url())
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderBody::from(&request))
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| WorkflowError::PaymentGatewayError(e.to_string()))?
            .json::<PaymentOrder>()
            .await
            .map_err(|e| WorkflowError::PaymentGatewayError(e.to_string()))?;

        tracing::info!(order_id = %order.id, receipt = %request.receipt, "payment order created");
        Ok(order)
    }
}
