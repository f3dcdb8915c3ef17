/*!
Handshake configuration for the DH protocol.

This module provides the knobs both roles share: the width of the generated
prime, the number of Fermat rounds used to accept it, the largest frame a
peer may announce, and an optional seed for reproducible runs.
*/

use crate::core::{
    constants::{defaults, DEFAULT_FERMAT_ROUNDS, DEFAULT_PRIME_BITS},
    error::Result,
};
use crate::invalid_param_err;

/// Configuration for a handshake session
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct HandshakeConfig {
    /// Bit width of the prime modulus generated by the listener
    pub prime_bits: u64,
    /// Fermat rounds per primality check (1 reproduces the classic single-round test)
    pub fermat_rounds: u32,
    /// Largest frame payload accepted from the peer
    pub max_message_size: usize,
    /// Seed for the session random source; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            prime_bits: DEFAULT_PRIME_BITS,
            fermat_rounds: DEFAULT_FERMAT_ROUNDS,
            max_message_size: defaults::MAX_MESSAGE_SIZE,
            seed: None,
        }
    }
}

impl HandshakeConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Small primes for tests and demos
    pub fn fast() -> Self {
        Self {
            prime_bits: 32,
            ..Self::default()
        }
    }

    /// Default width with enough Fermat rounds to make liars unlikely
    pub fn strong() -> Self {
        Self {
            fermat_rounds: 20,
            ..Self::default()
        }
    }

    /// Same configuration with a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Upper bound on the parameters payload length for this prime width.
    ///
    /// Two decimal numbers below `2^prime_bits` plus the separator.
    pub fn params_payload_bound(&self) -> usize {
        let digits = (self.prime_bits as f64 * std::f64::consts::LOG10_2).floor() as usize + 1;
        digits * 2 + 1
    }

    /// Check that the configuration can produce a working handshake
    pub fn validate(&self) -> Result<()> {
        if self.prime_bits < 2 {
            return invalid_param_err!("prime_bits must be at least 2, got {}", self.prime_bits);
        }
        if self.fermat_rounds == 0 {
            return invalid_param_err!("fermat_rounds must be at least 1");
        }
        if self.max_message_size < defaults::MIN_MESSAGE_SIZE {
            return invalid_param_err!(
                "max_message_size must be at least {}, got {}",
                defaults::MIN_MESSAGE_SIZE,
                self.max_message_size
            );
        }
        if self.max_message_size < self.params_payload_bound() {
            return invalid_param_err!(
                "max_message_size {} cannot hold {}-bit parameters",
                self.max_message_size,
                self.prime_bits
            );
        }
        Ok(())
    }
}
