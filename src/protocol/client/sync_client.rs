/*!
Synchronous connector for the DH protocol.

A connector runs exactly one handshake: it receives the parameters and the
listener's public value, then sends its own and derives the secret.
*/

use std::io::{Read, Write};

use rand::rngs::StdRng;

use super::common;
use crate::{
    core::{
        config::HandshakeConfig,
        error::Result,
        message::{FramedRead, FramedWrite},
        session::{Handshake, HandshakeOutcome, Role},
    },
    protocol::{
        shared::{
            traits::DhEndpoint,
            utils::{SessionStats, session_rng},
        },
        transport::{self, IpVersion},
    },
};

/// Blocking connector session.
pub struct ConnectorSession {
    config: HandshakeConfig,
    rng: StdRng,
    stats: SessionStats,
}

impl ConnectorSession {
    /// Create a connector with the default configuration.
    pub fn new() -> Self {
        let config = HandshakeConfig::default();
        Self {
            rng: session_rng(&config),
            config,
            stats: SessionStats::default(),
        }
    }

    /// Create a connector with specific configuration.
    pub fn with_config(config: HandshakeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rng: session_rng(&config),
            config,
            stats: SessionStats::default(),
        })
    }

    /// Run the connector handshake on one connected stream and report the outcome.
    ///
    /// The stream is consumed and closed when the handshake ends.
    pub fn handshake<S: Read + Write>(&mut self, mut stream: S) -> Result<HandshakeOutcome> {
        let result = self.drive(&mut stream);
        self.stats.record(&result);
        common::report(&result);
        result
    }

    fn drive<S: Read + Write>(&mut self, stream: &mut S) -> Result<HandshakeOutcome> {
        let mut handshake = Handshake::new(Role::Connector, self.config.clone());
        let max_len = self.config.max_message_size;

        let frame = stream.read_frame_limited(max_len).map_err(|e| handshake.fail(e))?;
        let public = common::accept_params(&mut handshake, frame, &mut self.rng)?;

        // The listener's value comes first, then ours goes out
        let frame = stream.read_frame_limited(max_len).map_err(|e| handshake.fail(e))?;
        common::accept_public(&mut handshake, frame)?;
        stream.write_frame(&public).map_err(|e| handshake.fail(e))?;

        common::complete(&mut handshake)
    }

    /// Connect to `destination:port` and run one handshake.
    pub fn connect(&mut self, destination: &str, port: u16, ip_version: IpVersion) -> Result<HandshakeOutcome> {
        let stream = transport::connect(destination, port, ip_version)?;
        self.handshake(stream)
    }
}

impl Default for ConnectorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DhEndpoint for ConnectorSession {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{AbortReason, Error, KeyExchangeError};
    use std::io::{self, Cursor};

    struct MockStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn stream_with(frames: &[&[u8]]) -> MockStream {
        let mut input = Vec::new();
        for frame in frames {
            input.write_frame(frame).unwrap();
        }
        MockStream { input: Cursor::new(input), output: Vec::new() }
    }

    #[test]
    fn test_connector_exchange() -> Result<()> {
        let mut stream = stream_with(&[&b"23,5"[..], &b"8"[..]]);
        let mut connector = ConnectorSession::with_config(HandshakeConfig::new().with_seed(1))?;
        let outcome = connector.drive(&mut stream)?;

        assert_eq!(outcome.peer_public.to_string(), "8");
        let mut written = Cursor::new(stream.output);
        let sent = written.read_frame()?.into_message().unwrap();
        assert_eq!(sent, outcome.local_public.to_string().into_bytes());
        Ok(())
    }

    #[test]
    fn test_nothing_sent_before_listener_value() -> Result<()> {
        let mut stream = stream_with(&[&b"23,5"[..]]);
        let mut connector = ConnectorSession::new();
        let result = connector.drive(&mut stream);
        assert!(matches!(
            result,
            Err(Error::KeyExchangeFailed(KeyExchangeError::PeerDisconnected))
        ));
        assert!(stream.output.is_empty());
        Ok(())
    }

    #[test]
    fn test_truncated_params_abort() {
        let stream = MockStream { input: Cursor::new(vec![0, 0]), output: Vec::new() };
        let mut connector = ConnectorSession::new();
        assert!(matches!(
            connector.handshake(stream),
            Err(Error::HandshakeAborted(AbortReason::PeerDisconnected))
        ));
        assert_eq!(connector.stats().failed, 1);
    }

    #[test]
    fn test_oversized_params_abort() {
        let stream = MockStream { input: Cursor::new(vec![0, 0x20, 0, 0]), output: Vec::new() };
        let mut connector = ConnectorSession::new();
        assert!(matches!(
            connector.handshake(stream),
            Err(Error::HandshakeAborted(AbortReason::MalformedParameters(_)))
        ));
    }
}
