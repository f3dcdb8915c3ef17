//! Shared functionality for the DH protocol sessions.
//!
//! This module contains traits and utilities shared by the blocking and
//! async session roles.

// Shared traits
pub mod traits;

// Shared utilities
pub mod utils;

// Re-export for convenience
pub use traits::DhEndpoint;
pub use utils::{SessionStats, session_rng};
