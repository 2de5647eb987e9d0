use super::document::Document;
use super::payment::{EmailMessage, OrderRequest, PaymentOrder};
use super::ticket::TicketNumber;
use crate::error::Result;
use async_trait::async_trait;

/// How an upsert treats a document that already exists for the phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMode {
    /// Overwrite the existing document with the draft.
    Replace,
    /// Leave the existing document untouched.
    KeepExisting,
}

/// Outcome of an atomic upsert keyed by phone number.
#[derive(Debug, Clone, PartialEq)]
pub enum Upsert {
    Created(Document),
    Updated(Document),
    Unchanged(Document),
}

impl Upsert {
    pub fn document(&self) -> &Document {
        match self {
            Upsert::Created(doc) | Upsert::Updated(doc) | Upsert::Unchanged(doc) => doc,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Upsert::Created(_))
    }
}

/// A checked mutation applied to a single document inside the store's write path.
/// Returning an error leaves the stored document unchanged.
pub type Mutation = Box<dyn FnOnce(&mut Document) -> Result<()> + Send>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Atomically inserts `draft` or resolves it against the document stored for
    /// the same phone number.
    ///
    /// Fails with `Conflict` when creating would reuse a ticket number that
    /// belongs to another phone number.
    async fn upsert_by_phone(&self, draft: Document, mode: UpsertMode) -> Result<Upsert>;
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Document>>;
    async fn find_by_ticket(&self, ticket: &TicketNumber) -> Result<Option<Document>>;
    /// Atomically applies `mutation` to the document with this ticket number.
    /// Returns `None` when no document matches.
    async fn update_by_ticket(
        &self,
        ticket: &TicketNumber,
        mutation: Mutation,
    ) -> Result<Option<Document>>;
    async fn all_documents(&self) -> Result<Vec<Document>>;
    /// Distinct ticket numbers, sorted.
    async fn distinct_tickets(&self) -> Result<Vec<TicketNumber>>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: OrderRequest) -> Result<PaymentOrder>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<()>;
}

pub trait TicketGenerator: Send + Sync {
    fn generate(&self) -> TicketNumber;
}

pub type DocumentStoreBox = Box<dyn DocumentStore>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type NotifierBox = Box<dyn Notifier>;
pub type TicketGeneratorBox = Box<dyn TicketGenerator>;
