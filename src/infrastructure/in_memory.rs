use crate::domain::document::Document;
use crate::domain::ports::{DocumentStore, Mutation, Upsert, UpsertMode};
use crate::domain::ticket::TicketNumber;
use crate::error::{Result, WorkflowError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Collection {
    by_phone: HashMap<String, Document>,
    /// ticket number -> phone number
    by_ticket: HashMap<TicketNumber, String>,
}

impl Collection {
    fn phone_for_ticket(&self, ticket: &TicketNumber) -> Option<&String> {
        self.by_ticket.get(ticket)
    }
}

/// A thread-safe in-memory document store.
///
/// Every read-modify-write holds the write guard for its whole duration, so
/// upserts and filtered updates are atomic with respect to each other.
/// Ideal for testing or deployments where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<Collection>>,
}

impl InMemoryDocumentStore {
    /// Creates a new, empty in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn upsert_by_phone(&self, draft: Document, mode: UpsertMode) -> Result<Upsert> {
        let mut documents = self.documents.write().await;

        if let Some(existing) = documents.by_phone.get_mut(&draft.phone_number) {
            return Ok(match mode {
                UpsertMode::Replace => {
                    existing.replace_with(draft);
                    Upsert::Updated(existing.clone())
                }
                UpsertMode::KeepExisting => Upsert::Unchanged(existing.clone()),
            });
        }

        if documents.by_ticket.contains_key(&draft.ticket_number) {
            return Err(WorkflowError::Conflict(draft.ticket_number.to_string()));
        }
        documents
            .by_ticket
            .insert(draft.ticket_number.clone(), draft.phone_number.clone());
        documents
            .by_phone
            .insert(draft.phone_number.clone(), draft.clone());
        Ok(Upsert::Created(draft))
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents.by_phone.get(phone_number.trim()).cloned())
    }

    async fn find_by_ticket(&self, ticket: &TicketNumber) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents
            .phone_for_ticket(ticket)
            .and_then(|phone| documents.by_phone.get(phone))
            .cloned())
    }

    async fn update_by_ticket(
        &self,
        ticket: &TicketNumber,
        mutation: Mutation,
    ) -> Result<Option<Document>> {
        let mut documents = self.documents.write().await;
        let Some(phone) = documents.phone_for_ticket(ticket).cloned() else {
            return Ok(None);
        };
        let Some(stored) = documents.by_phone.get_mut(&phone) else {
            return Ok(None);
        };

        let mut updated = stored.clone();
        mutation(&mut updated)?;
        *stored = updated.clone();
        Ok(Some(updated))
    }

    async fn all_documents(&self) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        Ok(documents.by_phone.values().cloned().collect())
    }

    async fn distinct_tickets(&self) -> Result<Vec<TicketNumber>> {
        let documents = self.documents.read().await;
        let mut tickets: Vec<TicketNumber> = documents.by_ticket.keys().cloned().collect();
        tickets.sort();
        Ok(tickets)
    }
}
