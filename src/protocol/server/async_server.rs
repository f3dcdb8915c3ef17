/*!
Asynchronous listener for the DH protocol.
This module provides the listener role over tokio streams. Connections are
still served one at a time.
*/

use std::convert::Infallible;

use rand::rngs::StdRng;
use tokio::io::{AsyncRead, AsyncWrite};

use super::common;
use crate::{
    core::{
        config::HandshakeConfig,
        constants::defaults::ACCEPT_RETRY_DELAY,
        error::Result,
        session::{Handshake, HandshakeOutcome, Role},
    },
    protocol::{
        shared::{
            traits::DhEndpoint,
            utils::{SessionStats, session_rng},
        },
        stream::async_stream::{AsyncFramedRead, AsyncFramedWrite},
        transport::AsyncAcceptor,
    },
};

/// Asynchronous listener session.
pub struct AsyncListenerSession {
    config: HandshakeConfig,
    rng: StdRng,
    stats: SessionStats,
}

impl AsyncListenerSession {
    /// Create a new async listener with the default configuration.
    pub fn new() -> Self {
        let config = HandshakeConfig::default();
        Self {
            rng: session_rng(&config),
            config,
            stats: SessionStats::default(),
        }
    }

    /// Create an async listener with specific configuration.
    pub fn with_config(config: HandshakeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rng: session_rng(&config),
            config,
            stats: SessionStats::default(),
        })
    }

    /// Run the listener handshake on one connected stream.
    pub async fn handshake<S: AsyncRead + AsyncWrite + Unpin>(&mut self, mut stream: S) -> Result<HandshakeOutcome> {
        let result = self.drive(&mut stream).await;
        self.stats.record(&result);
        result
    }

    async fn drive<S: AsyncRead + AsyncWrite + Unpin>(&mut self, stream: &mut S) -> Result<HandshakeOutcome> {
        let mut handshake = Handshake::new(Role::Listener, self.config.clone());

        let params = common::start(&mut handshake, &mut self.rng)?;
        stream.write_frame(&params).await.map_err(|e| handshake.fail(e))?;

        let public = common::public_value(&mut handshake, &mut self.rng)?;
        stream.write_frame(&public).await.map_err(|e| handshake.fail(e))?;

        let frame = stream
            .read_frame_limited(self.config.max_message_size)
            .await
            .map_err(|e| handshake.fail(e))?;
        common::complete(&mut handshake, frame)
    }

    /// Accept one connection and run the handshake on it.
    ///
    /// Accept failures are logged and surface as `Error::Transport`.
    pub async fn serve_one<A: AsyncAcceptor>(&mut self, acceptor: &mut A) -> Result<HandshakeOutcome> {
        let (stream, peer) = acceptor.accept_next().await.map_err(common::accept_failed)?;
        self.serve_stream(stream, &peer).await
    }

    async fn serve_stream<S: AsyncRead + AsyncWrite + Unpin>(&mut self, stream: S, peer: &str) -> Result<HandshakeOutcome> {
        log::debug!("Accepted connection from {}", peer);
        let result = self.handshake(stream).await;
        common::report(peer, &result);
        result
    }

    /// Serve exactly `count` connections, collecting every result.
    pub async fn serve_count<A: AsyncAcceptor>(
        &mut self,
        acceptor: &mut A,
        count: usize,
    ) -> Vec<Result<HandshakeOutcome>> {
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            results.push(self.serve_one(acceptor).await);
        }
        results
    }

    /// Serve connections forever; the returned future never resolves.
    ///
    /// A failed accept is retried after [`ACCEPT_RETRY_DELAY`].
    pub async fn serve<A: AsyncAcceptor>(&mut self, acceptor: &mut A) -> Infallible {
        log::info!("Serving as {}", self.describe());
        loop {
            let (stream, peer) = match acceptor.accept_next().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    common::accept_failed(e);
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    continue;
                }
            };
            if let Err(e) = self.serve_stream(stream, &peer).await {
                if !e.is_recoverable() {
                    log::error!("Listener error: {}", e);
                }
            }
        }
    }
}

impl Default for AsyncListenerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DhEndpoint for AsyncListenerSession {
    fn role(&self) -> Role {
        Role::Listener
    }

    fn config(&self) -> &HandshakeConfig {
        &self.config
    }

    fn stats(&self) -> SessionStats {
        self.stats
    }
}
