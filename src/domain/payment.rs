use crate::error::WorkflowError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Represents a positive monetary amount in major currency units (e.g. rupees).
///
/// Payment gateways bill in minor units, see [`Amount::to_minor_units`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, WorkflowError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(WorkflowError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Converts to the smallest currency unit (paise for INR).
    pub fn to_minor_units(&self) -> Result<u64, WorkflowError> {
        let minor = self.0 * Decimal::ONE_HUNDRED;
        if minor.fract() != Decimal::ZERO {
            return Err(WorkflowError::ValidationError(format!(
                "Amount {} has more than two decimal places",
                self.0
            )));
        }
        minor.to_u64().ok_or_else(|| {
            WorkflowError::ValidationError(format!("Amount {} is out of range", self.0))
        })
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = WorkflowError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Per-call overrides for the payment transition. Unset fields fall back to
/// the configured defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentRequest {
    pub amount: Option<Amount>,
    pub currency: Option<String>,
}

/// Order creation call sent to the payment gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    /// Amount in minor units.
    pub amount: u64,
    pub currency: String,
    /// Receipt id, derived from the ticket so repeated attempts are recognisable.
    pub receipt: String,
    /// Capture the payment automatically once authorised.
    pub payment_capture: bool,
}

/// Order as reported back by the payment gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: String,
}

/// Payment state recorded on a document once an order has been issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub order: PaymentOrder,
    pub ordered_at: DateTime<Utc>,
    #[serde(default)]
    pub link_sent_at: Option<DateTime<Utc>>,
}

impl PaymentRecord {
    pub fn new(order: PaymentOrder) -> Self {
        Self {
            order,
            ordered_at: Utc::now(),
            link_sent_at: None,
        }
    }
}

/// Email handed to the notification gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Result of a successful payment transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentOutcome {
    pub message: String,
    pub order: PaymentOrder,
}
