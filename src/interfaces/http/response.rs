use crate::domain::document::{Attachments, Document};
use crate::domain::payment::PaymentRecord;
use crate::domain::status::TicketStatus;
use crate::domain::ticket::TicketNumber;
use crate::error::WorkflowError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Error body shared by every route: `{"message": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Translates workflow failures into HTTP responses at the route boundary.
#[derive(Debug)]
pub struct ApiError(pub WorkflowError);

impl From<WorkflowError> for ApiError {
    fn from(error: WorkflowError) -> Self {
        Self(error)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkflowError::InvalidState { .. }
            | WorkflowError::InvalidTransition { .. }
            | WorkflowError::ValidationError(_) => StatusCode::BAD_REQUEST,
            WorkflowError::Conflict(_) | WorkflowError::PaymentInProgress(_) => {
                StatusCode::CONFLICT
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.0.is_upstream() {
            tracing::error!(error = %self.0, "request failed");
            "Internal Server Error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

/// A document as returned over HTTP. The applicant's password is never echoed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView<'a> {
    pub phone_number: &'a str,
    pub ticket_number: &'a TicketNumber,
    #[serde(flatten)]
    pub attachments: &'a Attachments,
    #[serde(rename = "mobilenumber")]
    pub mobile_number: Option<&'a str>,
    pub email: Option<&'a str>,
    pub document_type: Option<&'a str>,
    pub status: &'a TicketStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<&'a PaymentRecord>,
}

impl<'a> From<&'a Document> for DocumentView<'a> {
    fn from(doc: &'a Document) -> Self {
        Self {
            phone_number: &doc.phone_number,
            ticket_number: &doc.ticket_number,
            attachments: &doc.attachments,
            mobile_number: doc.mobile_number.as_deref(),
            email: doc.email.as_deref(),
            document_type: doc.document_type.as_deref(),
            status: &doc.status,
            payment: doc.payment.as_ref(),
        }
    }
}
