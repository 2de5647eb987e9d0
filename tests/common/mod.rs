#![allow(dead_code)]

use async_trait::async_trait;
use loan_desk::application::workflow::{DocumentWorkflow, PaymentSettings};
use loan_desk::domain::document::{Document, DocumentFields};
use loan_desk::domain::payment::{Amount, EmailMessage, OrderRequest, PaymentOrder};
use loan_desk::domain::ports::{
    DocumentStore, DocumentStoreBox, Mutation, Notifier, PaymentGateway, TicketGenerator, Upsert,
    UpsertMode,
};
use loan_desk::domain::ticket::{RandomTicketGenerator, TicketNumber};
use loan_desk::error::{Result, WorkflowError};
use loan_desk::infrastructure::in_memory::InMemoryDocumentStore;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PAYMENT_URL: &str = "https://pay.example.com/link";
pub const MAIL_FROM: &str = "desk@example.com";

/// Payment gateway that records every order request.
#[derive(Clone, Default)]
pub struct RecordingPayments {
    pub requests: Arc<Mutex<Vec<OrderRequest>>>,
    pub fail: Arc<AtomicBool>,
    pub delay_ms: Arc<AtomicU64>,
}

impl RecordingPayments {
    pub fn calls(&self) -> Vec<OrderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn fail_next_calls(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Makes every order call take at least `delay`.
    pub fn respond_after(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

#[async_trait]
impl PaymentGateway for RecordingPayments {
    async fn create_order(&self, request: OrderRequest) -> Result<PaymentOrder> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(WorkflowError::PaymentGatewayError("gateway down".to_string()));
        }
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        Ok(PaymentOrder {
            id: format!("order_{}", requests.len()),
            amount: request.amount,
            currency: request.currency,
            receipt: Some(request.receipt),
            status: "created".to_string(),
        })
    }
}

/// Notifier that records every message.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<EmailMessage>>>,
    pub fail: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_next_calls(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(WorkflowError::NotificationError("smtp down".to_string()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Ticket generator replaying a fixed sequence, then falling back to random tickets.
#[derive(Default)]
pub struct ScriptedTickets {
    queue: Mutex<VecDeque<TicketNumber>>,
}

impl ScriptedTickets {
    pub fn new(tickets: &[&str]) -> Self {
        Self {
            queue: Mutex::new(tickets.iter().map(|t| TicketNumber::from(*t)).collect()),
        }
    }
}

impl TicketGenerator for ScriptedTickets {
    fn generate(&self) -> TicketNumber {
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| RandomTicketGenerator::new().generate())
    }
}

/// In-memory store whose `update_by_ticket` starts failing after a set number
/// of successful calls.
#[derive(Clone)]
pub struct FlakyStore {
    inner: InMemoryDocumentStore,
    updates: Arc<AtomicUsize>,
    fail_after: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryDocumentStore::new(),
            updates: Arc::new(AtomicUsize::new(0)),
            fail_after: Arc::new(AtomicUsize::new(usize::MAX)),
        }
    }

    pub fn fail_updates_after(&self, successful: usize) {
        self.fail_after.store(successful, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn upsert_by_phone(&self, draft: Document, mode: UpsertMode) -> Result<Upsert> {
        self.inner.upsert_by_phone(draft, mode).await
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Document>> {
        self.inner.find_by_phone(phone_number).await
    }

    async fn find_by_ticket(&self, ticket: &TicketNumber) -> Result<Option<Document>> {
        self.inner.find_by_ticket(ticket).await
    }

    async fn update_by_ticket(
        &self,
        ticket: &TicketNumber,
        mutation: Mutation,
    ) -> Result<Option<Document>> {
        let done = self.updates.fetch_add(1, Ordering::SeqCst);
        if done >= self.fail_after.load(Ordering::SeqCst) {
            return Err(WorkflowError::InternalError("disk full".into()));
        }
        self.inner.update_by_ticket(ticket, mutation).await
    }

    async fn all_documents(&self) -> Result<Vec<Document>> {
        self.inner.all_documents().await
    }

    async fn distinct_tickets(&self) -> Result<Vec<TicketNumber>> {
        self.inner.distinct_tickets().await
    }
}

pub struct Harness {
    pub workflow: DocumentWorkflow,
    pub payments: RecordingPayments,
    pub notifier: RecordingNotifier,
}

pub fn settings() -> PaymentSettings {
    PaymentSettings {
        amount: Amount::new(dec!(100.00)).unwrap(),
        currency: "INR".to_string(),
        payment_url: PAYMENT_URL.to_string(),
        mail_from: MAIL_FROM.to_string(),
    }
}

pub fn harness_with_tickets(tickets: ScriptedTickets) -> Harness {
    harness_with_store(Box::new(InMemoryDocumentStore::new()), tickets)
}

pub fn harness_with_store(store: DocumentStoreBox, tickets: ScriptedTickets) -> Harness {
    let payments = RecordingPayments::default();
    let notifier = RecordingNotifier::default();
    let workflow = DocumentWorkflow::new(
        store,
        Box::new(tickets),
        Box::new(payments.clone()),
        Box::new(notifier.clone()),
        settings(),
    );
    Harness {
        workflow,
        payments,
        notifier,
    }
}

pub fn harness() -> Harness {
    harness_with_tickets(ScriptedTickets::default())
}

pub fn submission(phone: &str, email: &str) -> DocumentFields {
    DocumentFields {
        phone_number: phone.to_string(),
        email: Some(email.to_string()),
        mobile_number: Some(phone.to_string()),
        document_type: Some("home loan".to_string()),
        ..Default::default()
    }
}
