mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::{RecordingNotifier, RecordingPayments, ScriptedTickets, harness_with_tickets};
use loan_desk::interfaces::http::router;
use serde_json::{Value, json};
use std::sync::Arc;

fn server(tickets: &[&str]) -> (TestServer, RecordingPayments, RecordingNotifier) {
    let h = harness_with_tickets(ScriptedTickets::new(tickets));
    let server = TestServer::new(router(Arc::new(h.workflow))).expect("test server should build");
    (server, h.payments, h.notifier)
}

fn upload_body(phone: &str, email: &str) -> Value {
    json!({
        "phoneNumber": phone,
        "mobilenumber": phone,
        "email": email,
        "password": "hunter2",
        "documentType": "home loan",
        "pancardBase64": "cGFu",
        "status": null
    })
}

#[tokio::test]
async fn test_upload_creates_then_updates() {
    let (server, _, _) = server(&["T1000000"]);

    let created = server.post("/upload").json(&upload_body("9999999999", "a@example.com")).await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let body: Value = created.json();
    assert_eq!(body["message"], "Document uploaded successfully");
    assert_eq!(body["ticketNumber"], "T1000000");

    let updated = server.post("/upload").json(&upload_body("9999999999", "b@example.com")).await;
    assert_eq!(updated.status_code(), StatusCode::OK);
    let body: Value = updated.json();
    assert_eq!(body["message"], "Document details updated successfully");
    assert_eq!(body["ticketNumber"], "T1000000");
}

#[tokio::test]
async fn test_upload_without_phone_is_bad_request() {
    let (server, _, _) = server(&[]);
    let response = server
        .post("/upload")
        .json(&json!({ "email": "a@example.com" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["message"].as_str().unwrap().contains("phoneNumber"));
}

#[tokio::test]
async fn test_ticket_lookup_by_phone() {
    let (server, _, _) = server(&["T1000000"]);
    server.post("/upload").json(&upload_body("9999999999", "a@example.com")).await;

    let found: Value = server.get("/getTicketNumberByPhoneNumber/9999999999").await.json();
    assert_eq!(found, json!({ "ticketNumber": "T1000000" }));

    let missing: Value = server.get("/getTicketNumberByPhoneNumber/0000000000").await.json();
    assert_eq!(missing, json!({ "ticketNumber": null }));
}

#[tokio::test]
async fn test_status_routes_share_contract() {
    let (server, _, _) = server(&["T1000000"]);
    server.post("/upload").json(&upload_body("9999999999", "a@example.com")).await;

    for path in ["/getTicketStatus/T1000000", "/tickets/T1000000", "/tickets/UNKNOWN0"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>(), json!({ "status": null }));
    }

    server
        .put("/updateTicketStatus/T1000000")
        .json(&json!({ "adminStatus": "under review" }))
        .await;
    for path in ["/getTicketStatus/T1000000", "/tickets/T1000000"] {
        let body: Value = server.get(path).await.json();
        assert_eq!(body, json!({ "status": "under review" }));
    }
}

#[tokio::test]
async fn test_update_status_returns_document_without_password() {
    let (server, _, _) = server(&["T1000000"]);
    server.post("/upload").json(&upload_body("9999999999", "a@example.com")).await;

    let response = server
        .put("/updateTicketStatus/T1000000")
        .json(&json!({ "adminStatus": "info requested" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "info requested");
    assert_eq!(body["ticketNumber"], "T1000000");
    assert_eq!(body["pancardBase64"], "cGFu");
    assert!(body.get("password").is_none());

    let missing = server
        .put("/updateTicketStatus/UNKNOWN0")
        .json(&json!({ "adminStatus": "rejected" }))
        .await;
    assert_eq!(missing.status_code(), StatusCode::OK);
    assert_eq!(missing.json::<Value>(), Value::Null);
}

#[tokio::test]
async fn test_update_status_blank_is_bad_request() {
    let (server, _, _) = server(&["T1000000"]);
    server.post("/upload").json(&upload_body("9999999999", "a@example.com")).await;

    let response = server
        .put("/updateTicketStatus/T1000000")
        .json(&json!({ "adminStatus": "" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_proceed_to_payment_end_to_end() {
    let (server, payments, notifier) = server(&["T1000000"]);
    server.post("/upload").json(&upload_body("9999999999", "applicant@example.com")).await;
    server
        .put("/updateTicketStatus/T1000000")
        .json(&json!({ "adminStatus": "proceed to payment" }))
        .await;

    let response = server.put("/proceedToPayment/T1000000").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "Payment link sent successfully");
    assert_eq!(body["order"]["id"], "order_1");
    assert_eq!(body["order"]["amount"], 10000);
    assert_eq!(body["order"]["currency"], "INR");

    assert_eq!(payments.calls().len(), 1);
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].to, "applicant@example.com");
}

#[tokio::test]
async fn test_proceed_to_payment_amount_query() {
    let (server, payments, _) = server(&["T1000000"]);
    server.post("/upload").json(&upload_body("9999999999", "applicant@example.com")).await;
    server
        .put("/updateTicketStatus/T1000000")
        .json(&json!({ "adminStatus": "proceed to payment" }))
        .await;

    let response = server
        .put("/proceedToPayment/T1000000")
        .add_query_param("amount", "499.99")
        .add_query_param("currency", "inr")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let calls = payments.calls();
    assert_eq!(calls[0].amount, 49999);
    assert_eq!(calls[0].currency, "INR");
}

#[tokio::test]
async fn test_proceed_to_payment_negative_amount_rejected() {
    let (server, payments, _) = server(&["T1000000"]);
    server.post("/upload").json(&upload_body("9999999999", "applicant@example.com")).await;

    let response = server
        .put("/proceedToPayment/T1000000")
        .add_query_param("amount", "-5")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(payments.calls().is_empty());
}

#[tokio::test]
async fn test_proceed_to_payment_failures() {
    let (server, payments, notifier) = server(&["T1000000"]);

    let missing = server.put("/proceedToPayment/UNKNOWN0").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    assert!(missing.json::<Value>()["message"].is_string());

    server.post("/upload").json(&upload_body("9999999999", "applicant@example.com")).await;
    let wrong_state = server.put("/proceedToPayment/T1000000").await;
    assert_eq!(wrong_state.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        wrong_state.json::<Value>()["message"],
        "Document status is not 'proceed to payment'"
    );

    assert!(payments.calls().is_empty());
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_gateway_failure_is_generic_internal_error() {
    let (server, payments, _) = server(&["T1000000"]);
    server.post("/upload").json(&upload_body("9999999999", "applicant@example.com")).await;
    server
        .put("/updateTicketStatus/T1000000")
        .json(&json!({ "adminStatus": "proceed to payment" }))
        .await;

    payments.fail_next_calls(true);
    let response = server.put("/proceedToPayment/T1000000").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>(), json!({ "message": "Internal Server Error" }));
}

#[tokio::test]
async fn test_save_ticket_number() {
    let (server, _, _) = server(&[]);

    let response = server
        .post("/saveTicketNumber")
        .json(&json!({ "phoneNumber": "8888888888", "ticketNumber": "SAVED001" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["ticketNumber"], "SAVED001");

    let conflict = server
        .post("/saveTicketNumber")
        .json(&json!({ "phoneNumber": "7777777777", "ticketNumber": "SAVED001" }))
        .await;
    assert_eq!(conflict.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_listing_routes() {
    let (server, _, _) = server(&["BBBBBBBB", "AAAAAAAA"]);
    server.post("/upload").json(&upload_body("1111111111", "a@example.com")).await;
    server.post("/upload").json(&upload_body("2222222222", "b@example.com")).await;

    let tickets: Value = server.get("/tickets").await.json();
    assert_eq!(tickets, json!(["AAAAAAAA", "BBBBBBBB"]));

    let documents: Value = server.get("/getdocuments").await.json();
    assert_eq!(documents.as_array().unwrap().len(), 2);

    let by_ticket: Value = server.get("/documents/AAAAAAAA").await.json();
    let found = by_ticket["documents"].as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["phoneNumber"], "2222222222");

    let none: Value = server.get("/documents/UNKNOWN0").await.json();
    assert_eq!(none, json!({ "documents": [] }));
}

#[tokio::test]
async fn test_upload_cannot_set_status() {
    let (server, payments, _) = server(&["T1000000"]);
    let mut body = upload_body("9999999999", "applicant@example.com");
    body["status"] = json!("proceed to payment");
    server.post("/upload").json(&body).await;

    let status: Value = server.get("/getTicketStatus/T1000000").await.json();
    assert_eq!(status, json!({ "status": null }));

    let response = server.put("/proceedToPayment/T1000000").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(payments.calls().is_empty());
}

#[tokio::test]
async fn test_malformed_requests_use_message_body() {
    let (server, _, _) = server(&["T1000000"]);
    server.post("/upload").json(&upload_body("9999999999", "a@example.com")).await;

    let missing_field = server
        .put("/updateTicketStatus/T1000000")
        .json(&json!({ "status": "rejected" }))
        .await;
    assert_eq!(missing_field.status_code(), StatusCode::BAD_REQUEST);
    assert!(missing_field.json::<Value>()["message"].is_string());

    let bad_amount = server
        .put("/proceedToPayment/T1000000")
        .add_query_param("amount", "abc")
        .await;
    assert_eq!(bad_amount.status_code(), StatusCode::BAD_REQUEST);
    assert!(bad_amount.json::<Value>()["message"].is_string());

    let bad_json = server
        .post("/upload")
        .text("{ not json")
        .content_type("application/json")
        .await;
    assert_eq!(bad_json.status_code(), StatusCode::BAD_REQUEST);
    assert!(bad_json.json::<Value>()["message"].is_string());
}

#[tokio::test]
async fn test_blank_phone_lookup_is_null() {
    let (server, _, _) = server(&["T1000000"]);
    server.post("/upload").json(&upload_body("9999999999", "a@example.com")).await;

    let response = server.get("/getTicketNumberByPhoneNumber/%20").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "ticketNumber": null }));
}
