use crate::domain::document::Document;
use crate::domain::ports::{DocumentStore, Mutation, Upsert, UpsertMode};
use crate::domain::ticket::TicketNumber;
use crate::error::{Result, WorkflowError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for documents, keyed by phone number.
pub const CF_DOCUMENTS: &str = "documents";
/// Column Family mapping ticket numbers to phone numbers.
pub const CF_TICKETS: &str = "tickets";

/// A persistent document store implementation using RocksDB.
///
/// Documents are stored as JSON under their phone number, with a secondary
/// ticket index in its own Column Family. Writers are serialised by an async
/// mutex and every change is committed as a single `WriteBatch`, which makes
/// upserts and filtered updates atomic read-modify-write operations.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("documents" and "tickets") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_documents = ColumnFamilyDescriptor::new(CF_DOCUMENTS, Options::default());
        let cf_tickets = ColumnFamilyDescriptor::new(CF_TICKETS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_documents, cf_tickets])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            WorkflowError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn read_document(&self, phone_number: &str) -> Result<Option<Document>> {
        let cf = self.cf(CF_DOCUMENTS)?;
        match self.db.get_cf(&cf, phone_number.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn phone_for_ticket(&self, ticket: &TicketNumber) -> Result<Option<String>> {
        let cf = self.cf(CF_TICKETS)?;
        let phone = self
            .db
            .get_cf(&cf, ticket.as_str().as_bytes())?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
        Ok(phone)
    }

    fn write_document(&self, document: &Document, index_ticket: bool) -> Result<()> {
        let documents = self.cf(CF_DOCUMENTS)?;
        let tickets = self.cf(CF_TICKETS)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(
            &documents,
            document.phone_number.as_bytes(),
            serde_json::to_vec(document)?,
        );
        if index_ticket {
            batch.put_cf(
                &tickets,
                document.ticket_number.as_str().as_bytes(),
                document.phone_number.as_bytes(),
            );
        }
        self.db.write(batch)?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for RocksDBStore {
    async fn upsert_by_phone(&self, draft: Document, mode: UpsertMode) -> Result<Upsert> {
        let _guard = self.write_lock.lock().await;

        if let Some(mut existing) = self.read_document(&draft.phone_number)? {
            return match mode {
                UpsertMode::Replace => {
                    existing.replace_with(draft);
                    self.write_document(&existing, false)?;
                    Ok(Upsert::Updated(existing))
                }
                UpsertMode::KeepExisting => Ok(Upsert::Unchanged(existing)),
            };
        }

        if self.phone_for_ticket(&draft.ticket_number)?.is_some() {
            return Err(WorkflowError::Conflict(draft.ticket_number.to_string()));
        }
        self.write_document(&draft, true)?;
        Ok(Upsert::Created(draft))
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Document>> {
        self.read_document(phone_number.trim())
    }

    async fn find_by_ticket(&self, ticket: &TicketNumber) -> Result<Option<Document>> {
        match self.phone_for_ticket(ticket)? {
            Some(phone) => self.read_document(&phone),
            None => Ok(None),
        }
    }

    async fn update_by_ticket(
        &self,
        ticket: &TicketNumber,
        mutation: Mutation,
    ) -> Result<Option<Document>> {
        let _guard = self.write_lock.lock().await;

        let Some(mut document) = self.find_by_ticket(ticket).await? else {
            return Ok(None);
        };
        mutation(&mut document)?;
        self.write_document(&document, false)?;
        Ok(Some(document))
    }

    async fn all_documents(&self) -> Result<Vec<Document>> {
        let cf = self.cf(CF_DOCUMENTS)?;

        let mut documents = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_key, value) = item?;
            documents.push(serde_json::from_slice(&value)?);
        }
        Ok(documents)
    }

    async fn distinct_tickets(&self) -> Result<Vec<TicketNumber>> {
        let cf = self.cf(CF_TICKETS)?;

        // Keys iterate in byte order, which is already sorted.
        let mut tickets = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (key, _value) = item?;
            tickets.push(TicketNumber::new(String::from_utf8_lossy(&key).into_owned()));
        }
        Ok(tickets)
    }
}
