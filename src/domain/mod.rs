//! Domain model of the intake workflow: documents, ticket numbers, workflow
//! status, payment values, and the ports the workflow depends on.

pub mod document;
pub mod payment;
pub mod ports;
pub mod status;
pub mod ticket;
