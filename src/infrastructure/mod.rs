//! Adapters for the domain ports: document stores and outbound gateways.

pub mod in_memory;
pub mod mailer;
pub mod razorpay;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
