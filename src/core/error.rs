/*!
Error handling for the DH handshake protocol.

Failures are split by the phase they belong to: transport failures, an
aborted handshake (nothing usable arrived from the peer while waiting for
parameters) and a failed key exchange (the public-value round trip broke).
*/

use std::io;
use thiserror::Error;

/// Result type for the DH handshake protocol
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the DH handshake protocol
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying stream write/connect/bind/accept failure
    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),

    /// The connector never received usable parameters
    #[error("Handshake aborted: {0}")]
    HandshakeAborted(#[source] AbortReason),

    /// The public-value exchange did not complete
    #[error("Key exchange failed: {0}")]
    KeyExchangeFailed(#[source] KeyExchangeError),

    /// Argument outside the domain of an operation
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Frame larger than the receiver (or the length prefix) allows
    #[error("Message too large: {size} bytes exceeds limit of {max} bytes")]
    MessageTooLarge {
        size: usize,
        max: usize,
    },

    /// Handshake step attempted from the wrong state
    #[error("Handshake not in correct state: expected {expected}, but was {actual}")]
    InvalidState {
        expected: String,
        actual: String,
    },
}

/// Why a handshake was aborted before key derivation started
#[derive(Error, Debug)]
pub enum AbortReason {
    /// Peer closed the stream before a full parameters frame arrived
    #[error("peer disconnected before sending parameters")]
    PeerDisconnected,

    /// Parameters frame did not decode to a valid modulus and generator
    #[error("malformed parameters: {0}")]
    MalformedParameters(String),
}

/// Why the public-value exchange failed
#[derive(Error, Debug)]
pub enum KeyExchangeError {
    /// Peer closed the stream in the middle of the exchange
    #[error("peer disconnected during public value exchange")]
    PeerDisconnected,

    /// Public value frame did not decode to an integer below the modulus
    #[error("malformed public value: {0}")]
    MalformedPublicValue(String),

    /// Public value frame announced more bytes than the receiver accepts
    #[error("public value frame of {size} bytes exceeds limit of {max} bytes")]
    Oversized {
        size: usize,
        max: usize,
    },

    /// Stream failed while sending or receiving a public value
    #[error("transport failure: {0}")]
    Transport(#[source] io::Error),
}

impl Error {
    /// Whether the failure is scoped to a single peer.
    ///
    /// A listener keeps accepting after any recoverable error; only local
    /// misconfiguration is reported as unrecoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Transport(_)
            | Error::HandshakeAborted(_)
            | Error::KeyExchangeFailed(_)
            | Error::MessageTooLarge { .. } => true,
            Error::InvalidParameter(_) | Error::InvalidState { .. } => false,
        }
    }
}

/// Create an invalid parameter error
#[macro_export]
macro_rules! invalid_param_err {
    ($msg:expr) => {
        Err($crate::core::error::Error::InvalidParameter($msg.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        Err($crate::core::error::Error::InvalidParameter(format!($fmt, $($arg)*)))
    };
}

/// Create an invalid state error
#[macro_export]
macro_rules! invalid_state_err {
    ($expected:expr, $actual:expr) => {
        Err($crate::core::error::Error::InvalidState {
            expected: $expected.to_string(),
            actual: $actual.to_string(),
        })
    };
}

/// Convert from Error to io::Error (for compatibility)
impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::Transport(io_error) => io_error,
            Error::HandshakeAborted(reason) => {
                io::Error::new(io::ErrorKind::ConnectionAborted, reason.to_string())
            }
            Error::KeyExchangeFailed(KeyExchangeError::Transport(io_error)) => io_error,
            Error::KeyExchangeFailed(err) => {
                io::Error::new(io::ErrorKind::ConnectionReset, err.to_string())
            }
            Error::InvalidParameter(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            Error::MessageTooLarge { size, max } => io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Message too large: {} bytes exceeds limit of {} bytes", size, max),
            ),
            Error::InvalidState { expected, actual } => io::Error::new(
                io::ErrorKind::Other,
                format!("Invalid state: expected {}, but was {}", expected, actual),
            ),
        }
    }
}
