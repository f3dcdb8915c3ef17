/*!
Traits implemented by every session role.
*/

use crate::core::{config::HandshakeConfig, session::Role};
use super::utils::SessionStats;

/// Common trait for listener and connector sessions, sync or async
pub trait DhEndpoint {
    /// Role this endpoint plays in each handshake
    fn role(&self) -> Role;

    /// Configuration every handshake of this endpoint uses
    fn config(&self) -> &HandshakeConfig;

    /// Handshakes completed and failed so far
    fn stats(&self) -> SessionStats;

    /// One-line description for status output
    fn describe(&self) -> String {
        let config = self.config();
        format!(
            "{} ({}-bit primes, {} Fermat round{})",
            self.role(),
            config.prime_bits,
            config.fermat_rounds,
            if config.fermat_rounds == 1 { "" } else { "s" }
        )
    }
}
