//! Core components for the DH handshake protocol.
//!
//! This module contains the fundamental building blocks of the protocol,
//! including number theory, message framing, the handshake state machine,
//! configuration and error handling.

// Number theory
pub mod math;

// Export message handling
pub mod message;

// Export handshake session management
pub mod session;

// Handshake configuration
pub mod config;

// Protocol constants
pub mod constants;

// Error handling
pub mod error;

// Re-exports for convenience
pub use self::error::{Error, Result, AbortReason, KeyExchangeError};
pub use self::message::{DhParameters, Frame};
pub use self::session::{HandshakeState, Role};
pub use self::config::HandshakeConfig;
pub use self::constants::DEFAULT_PORT;
