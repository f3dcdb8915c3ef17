/*!
Shared utility functions for the DH protocol sessions.
*/

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::core::{
    config::HandshakeConfig,
    error::Result,
    session::HandshakeOutcome,
};

/// Random source for a session: seeded when the config asks for it
pub fn session_rng(config: &HandshakeConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Running count of handshake outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Handshakes that reached `Complete`
    pub completed: u64,
    /// Handshakes that ended in `Failed`
    pub failed: u64,
}

impl SessionStats {
    /// Count one handshake result
    pub fn record(&mut self, result: &Result<HandshakeOutcome>) {
        match result {
            Ok(_) => self.completed += 1,
            Err(_) => self.failed += 1,
        }
    }

    /// Total handshakes attempted
    pub fn total(&self) -> u64 {
        self.completed + self.failed
    }
}
