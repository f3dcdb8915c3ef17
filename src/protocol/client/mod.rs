//! Connector implementations for the DH protocol.
//!
//! This module provides the connector role for both
//! synchronous and asynchronous APIs.

// Common connector functionality
pub mod common;

// Synchronous connector implementation
pub mod sync_client;

// Asynchronous connector implementation (requires the "async" feature)
#[cfg(feature = "async")]
pub mod async_client;

pub use sync_client::ConnectorSession;

#[cfg(feature = "async")]
pub use async_client::AsyncConnectorSession;
