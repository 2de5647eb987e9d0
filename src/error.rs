use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Document not found for ticket {0}")]
    NotFound(String),
    #[error("Document status is not 'proceed to payment'")]
    InvalidState { status: String },
    #[error("Cannot move ticket status from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Ticket number {0} is already in use")]
    Conflict(String),
    #[error("Payment for ticket {0} is already being processed")]
    PaymentInProgress(String),
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Payment gateway error: {0}")]
    PaymentGatewayError(String),
    #[error("Notification gateway error: {0}")]
    NotificationError(String),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl WorkflowError {
    /// Whether the failure originates in storage or an upstream gateway rather
    /// than in the caller's request.
    pub fn is_upstream(&self) -> bool {
        !matches!(
            self,
            WorkflowError::NotFound(_)
                | WorkflowError::InvalidState { .. }
                | WorkflowError::InvalidTransition { .. }
                | WorkflowError::ValidationError(_)
                | WorkflowError::Conflict(_)
                | WorkflowError::PaymentInProgress(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
