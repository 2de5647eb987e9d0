use super::extract::{ApiJson, ApiQuery};
use super::response::{ApiError, DocumentView};
use crate::application::workflow::DocumentWorkflow;
use crate::domain::document::DocumentFields;
use crate::domain::payment::{Amount, PaymentOutcome, PaymentRequest};
use crate::domain::status::TicketStatus;
use crate::domain::ticket::TicketNumber;
use axum::Json;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::Router;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Base64 attachments make uploads large.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

pub type AppState = Arc<DocumentWorkflow>;

/// Builds the HTTP surface over a shared workflow.
pub fn router(workflow: AppState) -> Router {
    Router::new()
        .route("/upload", post(upload))
        .route("/saveTicketNumber", post(save_ticket_number))
        .route(
            "/getTicketNumberByPhoneNumber/{phone_number}",
            get(ticket_by_phone),
        )
        .route("/getTicketStatus/{ticket_number}", get(ticket_status))
        .route("/tickets", get(list_tickets))
        .route("/tickets/{ticket_number}", get(ticket_status))
        .route(
            "/updateTicketStatus/{ticket_number}",
            put(update_ticket_status),
        )
        .route("/proceedToPayment/{ticket_number}", put(proceed_to_payment))
        .route("/getdocuments", get(list_documents))
        .route("/documents/{ticket_number}", get(documents_for_ticket))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(workflow)
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub message: String,
    pub ticket_number: TicketNumber,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TicketLookup {
    ticket_number: Option<TicketNumber>,
}

#[derive(Debug, Serialize)]
struct StatusLookup {
    status: Option<TicketStatus>,
}

#[derive(Debug, Serialize)]
struct DocumentList<'a> {
    documents: Vec<DocumentView<'a>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusUpdate {
    admin_status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketReservation {
    phone_number: String,
    ticket_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentQuery {
    amount: Option<Decimal>,
    currency: Option<String>,
}

impl TryFrom<PaymentQuery> for PaymentRequest {
    type Error = ApiError;

    fn try_from(query: PaymentQuery) -> Result<Self, Self::Error> {
        Ok(PaymentRequest {
            amount: query.amount.map(Amount::new).transpose()?,
            currency: query
                .currency
                .map(|currency| currency.trim().to_uppercase())
                .filter(|currency| !currency.is_empty()),
        })
    }
}

async fn upload(
    State(workflow): State<AppState>,
    ApiJson(fields): ApiJson<DocumentFields>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    let submission = workflow.submit(fields).await?;
    let (status, message) = if submission.created {
        (StatusCode::CREATED, "Document uploaded successfully")
    } else {
        (StatusCode::OK, "Document details updated successfully")
    };
    Ok((
        status,
        Json(TicketResponse {
            message: message.to_string(),
            ticket_number: submission.ticket_number,
        }),
    ))
}

async fn save_ticket_number(
    State(workflow): State<AppState>,
    ApiJson(reservation): ApiJson<TicketReservation>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    let ticket_number = workflow
        .reserve_ticket(
            &reservation.phone_number,
            reservation.ticket_number.as_deref(),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(TicketResponse {
            message: "Ticket number saved successfully".to_string(),
            ticket_number,
        }),
    ))
}

async fn ticket_by_phone(
    State(workflow): State<AppState>,
    Path(phone_number): Path<String>,
) -> Result<Json<TicketLookup>, ApiError> {
    let ticket_number = workflow.ticket_for_phone(&phone_number).await?;
    Ok(Json(TicketLookup { ticket_number }))
}

async fn ticket_status(
    State(workflow): State<AppState>,
    Path(ticket_number): Path<String>,
) -> Result<Json<StatusLookup>, ApiError> {
    let status = workflow.status(&TicketNumber::new(ticket_number)).await?;
    Ok(Json(StatusLookup { status }))
}

async fn update_ticket_status(
    State(workflow): State<AppState>,
    Path(ticket_number): Path<String>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> Result<Response, ApiError> {
    let updated = workflow
        .set_status(&TicketNumber::new(ticket_number), &update.admin_status)
        .await?;
    Ok(Json(updated.as_ref().map(DocumentView::from)).into_response())
}

async fn proceed_to_payment(
    State(workflow): State<AppState>,
    Path(ticket_number): Path<String>,
    ApiQuery(query): ApiQuery<PaymentQuery>,
) -> Result<Json<PaymentOutcome>, ApiError> {
    let request = PaymentRequest::try_from(query)?;
    let outcome = workflow
        .proceed_to_payment(&TicketNumber::new(ticket_number), request)
        .await?;
    Ok(Json(outcome))
}

async fn list_tickets(
    State(workflow): State<AppState>,
) -> Result<Json<Vec<TicketNumber>>, ApiError> {
    Ok(Json(workflow.tickets().await?))
}

async fn list_documents(State(workflow): State<AppState>) -> Result<Response, ApiError> {
    let documents = workflow.documents().await?;
    let views: Vec<DocumentView> = documents.iter().map(DocumentView::from).collect();
    Ok(Json(views).into_response())
}

async fn documents_for_ticket(
    State(workflow): State<AppState>,
    Path(ticket_number): Path<String>,
) -> Result<Response, ApiError> {
    let documents = workflow
        .documents_for_ticket(&TicketNumber::new(ticket_number))
        .await?;
    let views: Vec<DocumentView> = documents.iter().map(DocumentView::from).collect();
    Ok(Json(DocumentList { documents: views }).into_response())
}
