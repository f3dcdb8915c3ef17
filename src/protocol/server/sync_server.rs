/*!
Synchronous listener for the DH protocol.

The listener accepts one connection at a time, runs the whole handshake on
it and drops the stream before accepting the next. A failure on one client
is logged and never ends the loop.
*/

use std::io::{Read, Write};
use std::thread;

use rand::rngs::StdRng;

use super::common;
use crate::{
    core::{
        config::HandshakeConfig,
        constants::defaults::ACCEPT_RETRY_DELAY,
        error::Result,
        message::{FramedRead, FramedWrite},
        session::{Handshake, HandshakeOutcome, Role},
    },
    protocol::{
        shared::{
            traits::DhEndpoint,
            utils::{SessionStats, session_rng},
        },
        transport::Acceptor,
    },
};

/// Blocking listener session.
pub struct ListenerSession {
    /// Settings for every handshake
    config: HandshakeConfig,

    /// Random source shared by consecutive handshakes
    rng: StdRng,

    /// Outcomes so far
    stats: SessionStats,
}

impl ListenerSession {
    /// Create a listener with the default configuration.
    pub fn new() -> Self {
        let config = HandshakeConfig::default();
        Self {
            rng: session_rng(&config),
            config,
            stats: SessionStats::default(),
        }
    }

    /// Create a listener with specific configuration.
    pub fn with_config(config: HandshakeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rng: session_rng(&config),
            config,
            stats: SessionStats::default(),
        })
    }

    /// Run the listener handshake on one connected stream.
    ///
    /// The stream is consumed and closed when the handshake ends.
    pub fn handshake<S: Read + Write>(&mut self, mut stream: S) -> Result<HandshakeOutcome> {
        let result = self.drive(&mut stream);
        self.stats.record(&result);
        result
    }

    fn drive<S: Read + Write>(&mut self, stream: &mut S) -> Result<HandshakeOutcome> {
        let mut handshake = Handshake::new(Role::Listener, self.config.clone());

        let params = common::start(&mut handshake, &mut self.rng)?;
        stream.write_frame(&params).map_err(|e| handshake.fail(e))?;

        let public = common::public_value(&mut handshake, &mut self.rng)?;
        stream.write_frame(&public).map_err(|e| handshake.fail(e))?;

        let frame = stream
            .read_frame_limited(self.config.max_message_size)
            .map_err(|e| handshake.fail(e))?;
        common::complete(&mut handshake, frame)
    }

    /// Accept one connection and run the handshake on it.
    ///
    /// Accept failures are logged and surface as `Error::Transport`.
    pub fn serve_one<A: Acceptor>(&mut self, acceptor: &mut A) -> Result<HandshakeOutcome> {
        let (stream, peer) = acceptor.accept_next().map_err(common::accept_failed)?;
        self.serve_stream(stream, &peer)
    }

    fn serve_stream<S: Read + Write>(&mut self, stream: S, peer: &str) -> Result<HandshakeOutcome> {
        log::debug!("Accepted connection from {}", peer);
        let result = self.handshake(stream);
        common::report(peer, &result);
        result
    }

    /// Serve exactly `count` connections, collecting every result.
    pub fn serve_count<A: Acceptor>(&mut self, acceptor: &mut A, count: usize) -> Vec<Result<HandshakeOutcome>> {
        (0..count).map(|_| self.serve_one(acceptor)).collect()
    }

    /// Serve connections forever.
    ///
    /// A failed accept is retried after [`ACCEPT_RETRY_DELAY`].
    pub fn serve<A: Acceptor>(&mut self, acceptor: &mut A) -> ! {
        log::info!("Serving as {}", self.describe());
        loop {
            let (stream, peer) = match acceptor.accept_next() {
                Ok(accepted) => accepted,
                Err(e) => {
                    common::accept_failed(e);
                    thread::sleep(ACCEPT_RETRY_DELAY);
                    continue;
                }
            };
            if let Err(e) = self.serve_stream(stream, &peer) {
                if !e.is_recoverable() {
                    log::error!("Listener error: {}", e);
                }
            }
        }
    }
}

impl Default for ListenerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DhEndpoint for ListenerSession {
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
