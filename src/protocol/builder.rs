/*!
Protocol builder for the DH protocol.

This module provides a builder pattern for creating listener and connector
sessions with specific configurations.
*/

use crate::core::{config::HandshakeConfig, error::Result, session::Role};

use crate::protocol::client::sync_client::ConnectorSession;
use crate::protocol::server::sync_server::ListenerSession;

#[cfg(feature = "async")]
use crate::protocol::client::async_client::AsyncConnectorSession;
#[cfg(feature = "async")]
use crate::protocol::server::async_server::AsyncListenerSession;

/// Builder for DH sessions
#[derive(Debug, Clone)]
pub struct DhProtocolBuilder {
    /// Handshake configuration
    config: HandshakeConfig,

    /// Role the built session plays
    role: Role,
}

impl DhProtocolBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: HandshakeConfig::default(),
            role: Role::Connector,
        }
    }

    /// Set the role
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Set as listener
    pub fn as_listener(mut self) -> Self {
        self.role = Role::Listener;
        self
    }

    /// Set as connector
    pub fn as_connector(mut self) -> Self {
        self.role = Role::Connector;
        self
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: HandshakeConfig) -> Self {
        self.config = config;
        self
    }

    /// Bit width of generated primes
    pub fn with_prime_bits(mut self, bits: u64) -> Self {
        self.config.prime_bits = bits;
        self
    }

    /// Fermat rounds per primality check
    pub fn with_fermat_rounds(mut self, rounds: u32) -> Self {
        self.config.fermat_rounds = rounds;
        self
    }

    /// Largest frame accepted from the peer
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// Seed the session random source
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Use the preset for tests and demos
    pub fn fast(mut self) -> Self {
        self.config = HandshakeConfig {
            seed: self.config.seed,
            ..HandshakeConfig::fast()
        };
        self
    }

    /// Use the preset with many Fermat rounds
    pub fn strong(mut self) -> Self {
        self.config = HandshakeConfig {
            seed: self.config.seed,
            ..HandshakeConfig::strong()
        };
        self
    }

    /// Role the built session will play
    pub fn role(&self) -> Role {
        self.role
    }

    /// Configuration assembled so far
    pub fn config(&self) -> &HandshakeConfig {
        &self.config
    }

    /// Build a synchronous connector
    pub fn build_connector(self) -> Result<ConnectorSession> {
        ConnectorSession::with_config(self.config)
    }

    /// Build a synchronous listener
    pub fn build_listener(self) -> Result<ListenerSession> {
        ListenerSession::with_config(self.config)
    }

    /// Build an asynchronous connector (requires "async" feature)
    #[cfg(feature = "async")]
    pub fn build_async_connector(self) -> Result<AsyncConnectorSession> {
        AsyncConnectorSession::with_config(self.config)
    }

    /// Build an asynchronous listener (requires "async" feature)
    #[cfg(feature = "async")]
    pub fn build_async_listener(self) -> Result<AsyncListenerSession> {
        AsyncListenerSession::with_config(self.config)
    }
}

impl Default for DhProtocolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder preset for a listener
pub fn listener() -> DhProtocolBuilder {
    DhProtocolBuilder::new().as_listener()
}

/// Builder preset for a connector
pub fn connector() -> DhProtocolBuilder {
    DhProtocolBuilder::new().as_connector()
}
