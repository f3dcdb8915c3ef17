/*!
Constants for the DH handshake protocol.

This module contains the wire constants and configuration defaults shared by
both roles.
*/

/// Default TCP port for the listener
pub const DEFAULT_PORT: u16 = 11037;

/// Default bit width of the generated prime modulus
pub const DEFAULT_PRIME_BITS: u64 = 128;

/// Default number of Fermat rounds per primality check
pub const DEFAULT_FERMAT_ROUNDS: u32 = 1;

/// Size of the big-endian length prefix in front of every frame
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Separator between modulus and generator in the parameters payload
pub const PARAMS_SEPARATOR: char = ',';

/// Configuration defaults
pub mod defaults {
    use std::time::Duration;

    /// Pause before the listener retries after a failed accept
    pub const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

    /// Default maximum frame payload accepted during a handshake
    pub const MAX_MESSAGE_SIZE: usize = 1_048_576; // 1 MB

    /// Smallest accepted frame limit; a 128-bit parameters payload is ~80 bytes
    pub const MIN_MESSAGE_SIZE: usize = 64;
}
