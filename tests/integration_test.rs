// tests/integration_test.rs
use std::io::Write;
use std::net::TcpStream;
use std::thread;

use dh_handshake::{
    AbortReason, DhEndpoint, DhParameters, Error, Frame, FramedRead, Handshake, HandshakeConfig,
    IpVersion, KeyExchangeError, Result, connector, core::session::LocalKeys, listener,
    sync::bind_listener,
};
use num_bigint::BigUint;

#[test]
fn test_tcp_handshake_agrees() -> Result<()> {
    let mut acceptor = bind_listener(IpVersion::V4, 0)?;
    let port = acceptor.local_addr()?.port();

    let server = thread::spawn(move || -> Result<_> {
        let mut session = listener().fast().with_seed(11).build_listener()?;
        session.serve_one(&mut acceptor)
    });

    let mut session = connector().fast().with_seed(22).build_connector()?;
    let client_outcome = session.connect("127.0.0.1", port, IpVersion::V4)?;
    let server_outcome = server.join().expect("listener thread panicked")?;

    assert_eq!(client_outcome.shared_secret, server_outcome.shared_secret);
    assert_eq!(client_outcome.parameters, server_outcome.parameters);
    assert_eq!(client_outcome.local_public, server_outcome.peer_public);
    assert_eq!(client_outcome.peer_public, server_outcome.local_public);
    assert!(client_outcome.parameters.modulus.bits() <= 32);
    Ok(())
}

#[test]
fn test_listener_survives_disconnect() -> Result<()> {
    let mut acceptor = bind_listener(IpVersion::V4, 0)?;
    let port = acceptor.local_addr()?.port();

    let server = thread::spawn(move || -> Result<_> {
        let mut session = listener().fast().with_seed(5).build_listener()?;
        Ok(session.serve_count(&mut acceptor, 2))
    });

    // First client reads both frames and leaves without answering
    {
        let mut stream = TcpStream::connect(("127.0.0.1", port))?;
        assert!(matches!(stream.read_frame()?, Frame::Message(_)));
        assert!(matches!(stream.read_frame()?, Frame::Message(_)));
    }

    let mut session = connector().fast().with_seed(6).build_connector()?;
    let client_outcome = session.connect("127.0.0.1", port, IpVersion::V4)?;

    let results = server.join().expect("listener thread panicked")?;
    assert_eq!(results.len(), 2);
    assert!(matches!(
        results[0],
        Err(Error::KeyExchangeFailed(KeyExchangeError::PeerDisconnected))
    ));
    let server_outcome = results[1].as_ref().expect("second handshake should succeed");
    assert_eq!(server_outcome.shared_secret, client_outcome.shared_secret);
    Ok(())
}

#[test]
fn test_truncated_params_abort_connector() -> Result<()> {
    let acceptor = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = acceptor.local_addr()?.port();

    let server = thread::spawn(move || -> std::io::Result<()> {
        let (mut stream, _) = acceptor.accept()?;
        // Half a length prefix, then close
        stream.write_all(&[0, 0])?;
        Ok(())
    });

    let mut session = connector().build_connector()?;
    let result = session.connect("127.0.0.1", port, IpVersion::V4);
    server.join().expect("listener thread panicked")?;

    assert!(matches!(
        result,
        Err(Error::HandshakeAborted(AbortReason::PeerDisconnected))
    ));
    assert_eq!(session.stats().failed, 1);
    Ok(())
}

#[test]
fn test_malformed_params_abort_connector() -> Result<()> {
    let acceptor = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = acceptor.local_addr()?.port();

    let server = thread::spawn(move || -> Result<()> {
        let (mut stream, _) = acceptor.accept()?;
        dh_handshake::send_message(&mut stream, b"23;5")?;
        Ok(())
    });

    let mut session = connector().build_connector()?;
    let result = session.connect("127.0.0.1", port, IpVersion::V4);
    server.join().expect("listener thread panicked")?;

    assert!(matches!(
        result,
        Err(Error::HandshakeAborted(AbortReason::MalformedParameters(_)))
    ));
    Ok(())
}

#[test]
fn test_textbook_values() -> Result<()> {
    let big = |n: u32| BigUint::from(n);
    let params = DhParameters::new(big(23), big(5));

    // Listener side: x = 6
    let listener_keys = LocalKeys::from_private(&params, big(6))?;
    assert_eq!(listener_keys.public(), &big(8));

    // Connector side through the state machine: x = 15
    let mut handshake = Handshake::connector(HandshakeConfig::new());
    handshake.receive_params(Frame::Message(b"23,5".to_vec()))?;
    let public = handshake.derive_local_keys_from(big(15))?;
    assert_eq!(public, b"19".to_vec());
    handshake.accept_peer_public(Frame::Message(b"8".to_vec()))?;
    let outcome = handshake.finish()?;

    let listener_secret = listener_keys.shared_secret(&params, &big(19))?;
    assert_eq!(outcome.shared_secret.value(), &big(2));
    assert_eq!(outcome.shared_secret, listener_secret);
    Ok(())
}
