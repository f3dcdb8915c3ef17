//! Protocol implementation for DH.
//!
//! This module contains the session roles built on the core handshake,
//! the TCP transport they run over, and async framing.

// Connector implementation
pub mod client;

// Listener implementation
pub mod server;

// Async framing
pub mod stream;

// Shared implementation
pub mod shared;

// Builder
pub mod builder;

// TCP transport
pub mod transport;

// Re-export for convenience
pub use builder::DhProtocolBuilder;
pub use client::sync_client::ConnectorSession;
pub use server::sync_server::ListenerSession;
pub use shared::{DhEndpoint, SessionStats};
pub use transport::{Acceptor, IpVersion};

// Re-export async components when the "async" feature is enabled
#[cfg(feature = "async")]
pub use client::async_client::AsyncConnectorSession;
#[cfg(feature = "async")]
pub use server::async_server::AsyncListenerSession;
#[cfg(feature = "async")]
pub use transport::AsyncAcceptor;
