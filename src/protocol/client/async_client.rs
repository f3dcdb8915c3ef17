/*!
Asynchronous connector for the DH protocol.
This module provides the connector role over tokio streams.
*/

use rand::rngs::StdRng;
use tokio::io::{AsyncRead, AsyncWrite};

use super::common;
use crate::{
    core::{
        config::HandshakeConfig,
        error::Result,
        session::{Handshake, HandshakeOutcome, Role},
    },
    protocol::{
        shared::{
            traits::DhEndpoint,
            utils::{SessionStats, session_rng},
        },
        stream::async_stream::{AsyncFramedRead, AsyncFramedWrite},
        transport::{IpVersion, connect_async},
    },
};

/// Asynchronous connector session.
pub struct AsyncConnectorSession {
    config: HandshakeConfig,
    rng: StdRng,
    stats: SessionStats,
}

impl AsyncConnectorSession {
    /// Create a new async connector with the default configuration.
    pub fn new() -> Self {
        let config = HandshakeConfig::default();
        Self {
            rng: session_rng(&config),
            config,
            stats: SessionStats::default(),
        }
    }

    /// Create an async connector with specific configuration.
    pub fn with_config(config: HandshakeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rng: session_rng(&config),
            config,
            stats: SessionStats::default(),
        })
    }

    /// Run the connector handshake on one connected stream and report the outcome.
    pub async fn handshake<S: AsyncRead + AsyncWrite + Unpin>(&mut self, mut stream: S) -> Result<HandshakeOutcome> {
        let result = self.drive(&mut stream).await;
        self.stats.record(&result);
        common::report(&result);
        result
    }

    async fn drive<S: AsyncRead + AsyncWrite + Unpin>(&mut self, stream: &mut S) -> Result<HandshakeOutcome> {
        let mut handshake = Handshake::new(Role::Connector, self.config.clone());
        let max_len = self.config.max_message_size;

        let frame = stream.read_frame_limited(max_len).await.map_err(|e| handshake.fail(e))?;
        let public = common::accept_params(&mut handshake, frame, &mut self.rng)?;

        let frame = stream.read_frame_limited(max_len).await.map_err(|e| handshake.fail(e))?;
        common::accept_public(&mut handshake, frame)?;
        stream.write_frame(&public).await.map_err(|e| handshake.fail(e))?;

        common::complete(&mut handshake)
    }

    /// Connect to `destination:port` and run one handshake.
    pub async fn connect(&mut self, destination: &str, port: u16, ip_version: IpVersion) -> Result<HandshakeOutcome> {
        let stream = connect_async(destination, port, ip_version).await?;
        self.handshake(stream).await
    }
}

impl Default for AsyncConnectorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DhEndpoint for AsyncConnectorSession {
    fn role(&self) -> Role {
        Role::Connector
    }

    fn config(&self) -> &HandshakeConfig {
        &self.config
    }

    fn stats(&self) -> SessionStats {
        self.stats
    }
}
