/*!
# DH Handshake

An unauthenticated Diffie-Hellman key agreement between two peers over TCP.

## Overview

One peer listens, the other connects. For every connection:

- the listener generates a random probable prime `p` and a base `g`
- it sends `"p,g"` followed by its public value `g^x mod p`
- the connector answers with its own public value
- both sides derive the same shared secret

Every message travels in a frame made of a 4-byte big-endian length and a
UTF-8 decimal payload. The listener serves connections one at a time and
keeps going when a client misbehaves.

This is a teaching-grade exchange: primes are small, the primality test is
Fermat's, and nothing authenticates the peers.

## Example

```no_run
use dh_handshake::{listener, connector, IpVersion};
use dh_handshake::protocol::transport::bind_listener;

# fn main() -> dh_handshake::Result<()> {
let mut acceptor = bind_listener(IpVersion::V4, 11037)?;
let mut session = listener().build_listener()?;
let outcome = session.serve_one(&mut acceptor)?;
println!("shared secret: {}", outcome.shared_secret);

let mut session = connector().build_connector()?;
let outcome = session.connect("localhost", 11037, IpVersion::V4)?;
println!("shared secret: {}", outcome.shared_secret);
# Ok(())
# }
```
*/

// Core protocol components
pub mod core;

// Protocol implementation
pub mod protocol;

// Re-export commonly used types for convenience
pub use self::core::error::{Error, Result, AbortReason, KeyExchangeError};
pub use self::core::message::{DhParameters, Frame, FramedRead, FramedWrite, receive_message, send_message};
pub use self::core::session::{Handshake, HandshakeOutcome, HandshakeState, Role, SharedSecret};
pub use self::core::config::HandshakeConfig;
pub use self::core::constants::{DEFAULT_PORT, DEFAULT_PRIME_BITS};
pub use self::core::math::{find_prime, is_probably_prime, mod_pow, random_below};

// Re-export protocol builder
pub use protocol::builder::{DhProtocolBuilder, connector, listener};

// Re-export shared traits and transport
pub use protocol::shared::{DhEndpoint, SessionStats};
pub use protocol::transport::{Acceptor, IpVersion};

// Re-export synchronous API components for ease of use
pub mod sync {
    pub use crate::protocol::client::sync_client::ConnectorSession;
    pub use crate::protocol::server::sync_server::ListenerSession;
    pub use crate::protocol::transport::{bind_listener, connect};
}

// Re-export asynchronous API components (enabled with the "async" feature)
#[cfg(feature = "async")]
pub mod r#async {
    pub use crate::protocol::client::async_client::AsyncConnectorSession;
    pub use crate::protocol::server::async_server::AsyncListenerSession;
    pub use crate::protocol::stream::async_stream::{
        AsyncFramedRead, AsyncFramedWrite, receive_message_async, send_message_async,
    };
    pub use crate::protocol::transport::{AsyncAcceptor, bind_listener_async, connect_async};
}
