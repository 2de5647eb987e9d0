use crate::domain::document::{Document, DocumentFields, phone_key};
use crate::domain::payment::{
    Amount, EmailMessage, OrderRequest, PaymentOutcome, PaymentRecord, PaymentRequest,
};
use crate::domain::ports::{
    DocumentStoreBox, NotifierBox, PaymentGatewayBox, TicketGeneratorBox, Upsert, UpsertMode,
};
use crate::domain::status::TicketStatus;
use crate::domain::ticket::TicketNumber;
use crate::error::{Result, WorkflowError};
use chrono::{TimeDelta, Utc};

/// Attempts at drawing an unused ticket number before giving up.
pub const MAX_TICKET_ATTEMPTS: usize = 16;

pub const PAYMENT_LINK_SUBJECT: &str = "Payment Link";
pub const PAYMENT_LINK_SENT: &str = "Payment link sent successfully";

/// Minutes a payment call may hold its claim on a ticket before another call
/// may take it over.
pub const PAYMENT_CLAIM_TTL_MINUTES: i64 = 5;

/// Defaults applied by the payment transition.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSettings {
    pub amount: Amount,
    pub currency: String,
    /// Link emailed to the applicant.
    pub payment_url: String,
    /// Sender address of the payment-link email.
    pub mail_from: String,
}

/// Result of a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub ticket_number: TicketNumber,
    /// `true` when a new document was created, `false` when an existing one was overwritten.
    pub created: bool,
}

/// The document workflow: intake by phone number, staff status changes, and
/// the payment-link transition.
///
/// Every operation is a single atomic store primitive or a documented chain of
/// them. The workflow itself holds no locks.
pub struct DocumentWorkflow {
    store: DocumentStoreBox,
    tickets: TicketGeneratorBox,
    payments: PaymentGatewayBox,
    notifier: NotifierBox,
    settings: PaymentSettings,
}

impl DocumentWorkflow {
    /// Creates a new `DocumentWorkflow` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - The store for applicant documents.
    /// * `tickets` - Source of fresh ticket numbers.
    /// * `payments` - Gateway creating payment orders.
    /// * `notifier` - Gateway delivering the payment-link email.
    /// * `settings` - Defaults for the payment transition.
    pub fn new(
        store: DocumentStoreBox,
        tickets: TicketGeneratorBox,
        payments: PaymentGatewayBox,
        notifier: NotifierBox,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            store,
            tickets,
            payments,
            notifier,
            settings,
        }
    }

    /// Creates or overwrites the document for the submitted phone number.
    ///
    /// A caller-supplied ticket number is only honoured when the document is
    /// created; an existing document keeps its ticket.
    pub async fn submit(&self, fields: DocumentFields) -> Result<Submission> {
        let requested = TicketNumber::from_input(fields.ticket_number.as_deref());
        let draft = Document::from_submission(fields, TicketNumber::new(""))?;

        let outcome = self
            .allocate(draft, requested, UpsertMode::Replace)
            .await?;
        let submission = Submission {
            ticket_number: outcome.document().ticket_number.clone(),
            created: outcome.is_created(),
        };

        tracing::info!(
            ticket = %submission.ticket_number,
            created = submission.created,
            "document submitted"
        );
        Ok(submission)
    }

    /// Reserves a ticket number for a phone number without any document payload.
    /// An existing document is left untouched and its ticket returned.
    pub async fn reserve_ticket(
        &self,
        phone_number: &str,
        ticket_number: Option<&str>,
    ) -> Result<TicketNumber> {
        let requested = TicketNumber::from_input(ticket_number);
        let draft = Document::reservation(phone_number, TicketNumber::new(""))?;

        let outcome = self
            .allocate(draft, requested, UpsertMode::KeepExisting)
            .await?;
        let ticket = outcome.document().ticket_number.clone();
        tracing::info!(ticket = %ticket, created = outcome.is_created(), "ticket reserved");
        Ok(ticket)
    }

    /// Runs the atomic upsert, drawing fresh ticket numbers while generated ones collide.
    async fn allocate(
        &self,
        mut draft: Document,
        requested: Option<TicketNumber>,
        mode: UpsertMode,
    ) -> Result<Upsert> {
        if let Some(ticket) = requested {
            draft.ticket_number = ticket;
            return self.store.upsert_by_phone(draft, mode).await;
        }

        for attempt in 1..=MAX_TICKET_ATTEMPTS {
            draft.ticket_number = self.tickets.generate();
            match self.store.upsert_by_phone(draft.clone(), mode).await {
                Err(WorkflowError::Conflict(ticket)) => {
                    tracing::debug!(%ticket, attempt, "generated ticket already in use");
                }
                outcome => return outcome,
            }
        }

        Err(WorkflowError::InternalError(
            format!("no unused ticket number after {MAX_TICKET_ATTEMPTS} attempts").into(),
        ))
    }

    /// Ticket number of the document stored for `phone_number`, if any.
    /// A blank phone number matches nothing.
    pub async fn ticket_for_phone(&self, phone_number: &str) -> Result<Option<TicketNumber>> {
        let Ok(phone) = phone_key(phone_number) else {
            return Ok(None);
        };
        Ok(self
            .store
            .find_by_phone(&phone)
            .await?
            .map(|doc| doc.ticket_number))
    }

    /// Current status of a ticket. Unknown tickets and tickets still in the
    /// initial state both yield `None`.
    pub async fn status(&self, ticket: &TicketNumber) -> Result<Option<TicketStatus>> {
        Ok(self
            .store
            .find_by_ticket(ticket)
            .await?
            .and_then(|doc| doc.status.reported().cloned()))
    }

    /// Sets the status of a ticket on behalf of staff.
    ///
    /// Returns the updated document, or `None` when the ticket matches nothing.
    pub async fn set_status(&self, ticket: &TicketNumber, label: &str) -> Result<Option<Document>> {
        let next = TicketStatus::parse(label)?;
        let updated = self
            .store
            .update_by_ticket(ticket, Box::new(move |doc| doc.transition_to(next)))
            .await?;

        match &updated {
            Some(doc) => tracing::info!(%ticket, status = %doc.status, "ticket status updated"),
            None => tracing::warn!(%ticket, "status update matched no document"),
        }
        Ok(updated)
    }

    /// Issues the payment order for a ticket cleared for payment and emails the
    /// payment link to the applicant.
    ///
    /// The ticket is claimed in the store before the gateway is called, so
    /// concurrent calls create at most one order. A call that finds the claim
    /// held fails with `PaymentInProgress`. The order is recorded on the
    /// document before the email is sent. A recorded order is reused on later
    /// calls, so retrying after an email failure re-sends the link without
    /// creating a second order.
    pub async fn proceed_to_payment(
        &self,
        ticket: &TicketNumber,
        request: PaymentRequest,
    ) -> Result<PaymentOutcome> {
        let order_request = self.order_request(ticket, request)?;

        let now = Utc::now();
        let ttl = TimeDelta::minutes(PAYMENT_CLAIM_TTL_MINUTES);
        let claimed = match self
            .store
            .update_by_ticket(
                ticket,
                Box::new(move |doc| doc.claim_payment(now, ttl)),
            )
            .await
        {
            Ok(Some(doc)) => doc,
            Ok(None) => return Err(WorkflowError::NotFound(ticket.to_string())),
            Err(e) => {
                tracing::warn!(%ticket, error = %e, "payment refused");
                return Err(e);
            }
        };

        let record = match claimed.payment {
            Some(record) => {
                tracing::info!(%ticket, order_id = %record.order.id, "reusing recorded payment order");
                record
            }
            None => self.issue_order(ticket, order_request).await?,
        };

        self.send_payment_link(ticket, claimed.email.as_deref())
            .await?;

        Ok(PaymentOutcome {
            message: PAYMENT_LINK_SENT.to_string(),
            order: record.order,
        })
    }

    fn order_request(&self, ticket: &TicketNumber, request: PaymentRequest) -> Result<OrderRequest> {
        let amount = request.amount.unwrap_or(self.settings.amount);
        Ok(OrderRequest {
            amount: amount.to_minor_units()?,
            currency: request
                .currency
                .unwrap_or_else(|| self.settings.currency.clone()),
            receipt: format!("rcpt_{ticket}"),
            payment_capture: true,
        })
    }

    /// Creates the order at the gateway and records it. Must only be called
    /// while holding the payment claim on `ticket`.
    async fn issue_order(
        &self,
        ticket: &TicketNumber,
        order_request: OrderRequest,
    ) -> Result<PaymentRecord> {
        let order = match self.payments.create_order(order_request).await {
            Ok(order) => order,
            Err(e) => {
                self.release_claim(ticket).await;
                return Err(e);
            }
        };
        let record = PaymentRecord::new(order);

        let updated = self
            .store
            .update_by_ticket(ticket, Box::new(move |doc| doc.record_payment(record)))
            .await?
            .ok_or_else(|| WorkflowError::NotFound(ticket.to_string()))?;

        updated.payment.ok_or_else(|| {
            WorkflowError::InternalError(
                format!("payment record for ticket {ticket} was not persisted").into(),
            )
        })
    }

    async fn release_claim(&self, ticket: &TicketNumber) {
        let released = self
            .store
            .update_by_ticket(
                ticket,
                Box::new(|doc| {
                    doc.release_payment_claim();
                    Ok(())
                }),
            )
            .await;
        if let Err(e) = released {
            tracing::error!(%ticket, error = %e, "failed to release payment claim");
        }
    }

    async fn send_payment_link(&self, ticket: &TicketNumber, email: Option<&str>) -> Result<()> {
        let to = email
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| {
                WorkflowError::ValidationError(format!("Document {ticket} has no email address"))
            })?;

        let message = EmailMessage {
            from: self.settings.mail_from.clone(),
            to: to.to_string(),
            subject: PAYMENT_LINK_SUBJECT.to_string(),
            text: format!(
                "Dear User,\n\nPlease proceed to payment by clicking on the following link: {}",
                self.settings.payment_url
            ),
        };

        if let Err(e) = self.notifier.send(message).await {
            tracing::error!(%ticket, error = %e, "payment link email failed, order kept for retry");
            return Err(e);
        }

        // Delivered already, so the call succeeds even if the stamp fails.
        let sent_at = Utc::now();
        let stamped = self
            .store
            .update_by_ticket(
                ticket,
                Box::new(move |doc| {
                    doc.mark_link_sent(sent_at);
                    Ok(())
                }),
            )
            .await;
        if let Err(e) = stamped {
            tracing::error!(%ticket, error = %e, "payment link sent but not stamped");
        }
        Ok(())
    }

    /// Distinct ticket numbers present in the store, sorted.
    pub async fn tickets(&self) -> Result<Vec<TicketNumber>> {
        self.store.distinct_tickets().await
    }

    pub async fn documents(&self) -> Result<Vec<Document>> {
        self.store.all_documents().await
    }

    pub async fn documents_for_ticket(&self, ticket: &TicketNumber) -> Result<Vec<Document>> {
        Ok(self.store.find_by_ticket(ticket).await?.into_iter().collect())
    }
}
