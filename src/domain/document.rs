use crate::domain::payment::PaymentRecord;
use crate::domain::status::TicketStatus;
use crate::domain::ticket::TicketNumber;
use crate::error::{Result, WorkflowError};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Base64 attachments of a submission. The workflow never inspects them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachments {
    pub pancard_base64: Option<String>,
    pub adhar_card_base64: Option<String>,
    pub loan_statement_base64: Option<String>,
    pub bank_statement_base64: Option<String>,
    pub form16_base64: Option<String>,
    pub interest_certificate_base64: Option<String>,
    pub excel_sheet_base64: Option<String>,
}

/// Payload of an applicant submission, as posted to `/upload`.
///
/// A `status` key in the payload is ignored. Only staff change the status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFields {
    #[serde(default)]
    pub phone_number: String,
    pub ticket_number: Option<String>,
    #[serde(flatten)]
    pub attachments: Attachments,
    #[serde(rename = "mobilenumber")]
    pub mobile_number: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub document_type: Option<String>,
}

/// Validates and trims a phone number used as the natural key.
pub fn phone_key(phone_number: &str) -> Result<String> {
    let phone = phone_number.trim();
    if phone.is_empty() {
        return Err(WorkflowError::ValidationError(
            "phoneNumber is required".to_string(),
        ));
    }
    Ok(phone.to_string())
}

/// The stored record of one applicant, keyed by phone number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub phone_number: String,
    pub ticket_number: TicketNumber,
    #[serde(flatten)]
    pub attachments: Attachments,
    #[serde(rename = "mobilenumber")]
    pub mobile_number: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub document_type: Option<String>,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentRecord>,
    /// Set while a payment call is creating the order for this document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_claimed_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Builds a fresh record from a submission under the given ticket number.
    /// New records always start in the initial state.
    pub fn from_submission(fields: DocumentFields, ticket_number: TicketNumber) -> Result<Self> {
        let phone_number = phone_key(&fields.phone_number)?;
        Ok(Self {
            phone_number,
            ticket_number,
            attachments: fields.attachments,
            mobile_number: fields.mobile_number,
            email: fields.email,
            password: fields.password,
            document_type: fields.document_type,
            status: TicketStatus::Submitted,
            payment: None,
            payment_claimed_at: None,
        })
    }

    /// An otherwise empty record that only reserves a ticket for a phone number.
    pub fn reservation(phone_number: &str, ticket_number: TicketNumber) -> Result<Self> {
        Ok(Self {
            phone_number: phone_key(phone_number)?,
            ticket_number,
            attachments: Attachments::default(),
            mobile_number: None,
            email: None,
            password: None,
            document_type: None,
            status: TicketStatus::Submitted,
            payment: None,
            payment_claimed_at: None,
        })
    }

    /// Overwrites every submitted field with the draft's (last write wins).
    ///
    /// The ticket number, status and payment state are kept.
    pub fn replace_with(&mut self, draft: Document) {
        let Document {
            attachments,
            mobile_number,
            email,
            password,
            document_type,
            ..
        } = draft;
        self.attachments = attachments;
        self.mobile_number = mobile_number;
        self.email = email;
        self.password = password;
        self.document_type = document_type;
    }

    pub fn payment_issued(&self) -> bool {
        self.payment.is_some()
    }

    /// Applies a staff status change.
    ///
    /// The status is frozen at `proceed to payment` once an order has been
    /// issued or while one is being created.
    pub fn transition_to(&mut self, next: TicketStatus) -> Result<()> {
        let locked = self.payment_issued() || self.payment_claimed_at.is_some();
        let frozen = locked && next != TicketStatus::ProceedToPayment;
        if next == TicketStatus::Submitted || frozen {
            return Err(WorkflowError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }

    /// Claims the right to create the payment order for this document.
    ///
    /// Succeeds without claiming when an order is already recorded. A claim
    /// held by another call fails with `PaymentInProgress` until it is older
    /// than `ttl`, after which it is taken over.
    pub fn claim_payment(&mut self, now: DateTime<Utc>, ttl: TimeDelta) -> Result<()> {
        if self.status != TicketStatus::ProceedToPayment {
            return Err(WorkflowError::InvalidState {
                status: self.status.to_string(),
            });
        }
        if self.payment_issued() {
            return Ok(());
        }
        if let Some(claimed_at) = self.payment_claimed_at
            && now - claimed_at < ttl
        {
            return Err(WorkflowError::PaymentInProgress(
                self.ticket_number.to_string(),
            ));
        }
        self.payment_claimed_at = Some(now);
        Ok(())
    }

    pub fn release_payment_claim(&mut self) {
        self.payment_claimed_at = None;
    }

    /// Records an issued order and releases the claim. An order recorded
    /// earlier wins.
    pub fn record_payment(&mut self, record: PaymentRecord) -> Result<()> {
        if self.status != TicketStatus::ProceedToPayment {
            return Err(WorkflowError::InvalidState {
                status: self.status.to_string(),
            });
        }
        if self.payment.is_none() {
            self.payment = Some(record);
        }
        self.payment_claimed_at = None;
        Ok(())
    }

    /// Stamps the last successful payment-link dispatch.
    pub fn mark_link_sent(&mut self, at: DateTime<Utc>) {
        if let Some(payment) = self.payment.as_mut() {
            payment.link_sent_at = Some(at);
        }
    }
}
