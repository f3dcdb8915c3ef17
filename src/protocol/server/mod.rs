//! Listener implementations for the DH protocol.
//!
//! This module provides the listener role for both
//! synchronous and asynchronous APIs.

// Common listener functionality
pub mod common;

// Synchronous listener implementation
pub mod sync_server;

// Asynchronous listener implementation (requires the "async" feature)
#[cfg(feature = "async")]
pub mod async_server;

pub use sync_server::ListenerSession;

#[cfg(feature = "async")]
pub use async_server::AsyncListenerSession;
