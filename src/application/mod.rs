//! Application layer containing the workflow orchestration.
//!
//! This module defines the `DocumentWorkflow`, the single entry point used by
//! the HTTP surface. It owns the ports (store, ticket generator, payment and
//! notification gateways) and drives them per request.

pub mod workflow;
