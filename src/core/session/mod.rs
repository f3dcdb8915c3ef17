/*!
Handshake session management for the DH protocol.

This module provides the state machine and the I/O-free handshake logic
shared by the blocking and async session roles.
*/

// State management
pub mod state;

// Handshake logic
pub mod handshake;

// Re-export main session types
pub use self::state::{HandshakeState, Role, StateManager};
pub use self::handshake::{Handshake, HandshakeOutcome, LocalKeys, SharedSecret};
