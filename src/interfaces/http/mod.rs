//! HTTP surface: JSON routes over the document workflow.

pub mod extract;
pub mod response;
pub mod routes;

pub use routes::{AppState, router};
