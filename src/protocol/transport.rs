/*!
TCP transport for the handshake sessions.

The sessions only need "accept the next connection" and "connect to an
address"; this module provides both for `std::net` and, with the `async`
feature, for `tokio::net`.
*/

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use crate::core::error::{Error, Result};

/// Address family used for binding and connecting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IpVersion {
    /// IPv4
    #[default]
    V4,
    /// IPv6
    V6,
}

impl IpVersion {
    /// Loopback address of this family
    pub fn loopback(&self) -> IpAddr {
        match self {
            IpVersion::V4 => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpVersion::V6 => IpAddr::V6(Ipv6Addr::LOCALHOST),
        }
    }

    /// Whether `addr` belongs to this family
    pub fn matches(&self, addr: &SocketAddr) -> bool {
        match self {
            IpVersion::V4 => addr.is_ipv4(),
            IpVersion::V6 => addr.is_ipv6(),
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => write!(f, "IPv4"),
            IpVersion::V6 => write!(f, "IPv6"),
        }
    }
}

/// Source of connected streams for a listener
pub trait Acceptor {
    /// Stream type handed to each handshake
    type Stream: Read + Write;

    /// Block until the next peer connects; returns the stream and a printable peer name
    fn accept_next(&mut self) -> io::Result<(Self::Stream, String)>;
}

impl Acceptor for TcpListener {
    type Stream = TcpStream;

    fn accept_next(&mut self) -> io::Result<(TcpStream, String)> {
        let (stream, addr) = self.accept()?;
        Ok((stream, addr.to_string()))
    }
}

/// Bind a listener on the loopback address of `ip_version`
pub fn bind_listener(ip_version: IpVersion, port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::new(ip_version.loopback(), port);
    let listener = TcpListener::bind(addr)?;
    log::info!("Listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Resolve `destination` and return its addresses of the requested family
pub fn resolve(destination: &str, port: u16, ip_version: IpVersion) -> Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = (destination, port)
        .to_socket_addrs()?
        .filter(|addr| ip_version.matches(addr))
        .collect();
    if addrs.is_empty() {
        return Err(Error::Transport(io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{} has no {} address", destination, ip_version),
        )));
    }
    Ok(addrs)
}

/// Connect to `destination:port`, trying each resolved address in turn
pub fn connect(destination: &str, port: u16, ip_version: IpVersion) -> Result<TcpStream> {
    let mut last_error = None;
    for addr in resolve(destination, port, ip_version)? {
        match TcpStream::connect(addr) {
            Ok(stream) => {
                log::info!("Connected to {}", addr);
                return Ok(stream);
            }
            Err(e) => {
                log::debug!("Connection to {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }
    Err(Error::Transport(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotConnected, "no address to connect to")
    })))
}

#[cfg(feature = "async")]
pub use self::async_transport::{AsyncAcceptor, bind_listener_async, connect_async};

#[cfg(feature = "async")]
mod async_transport {
    use std::future::Future;
    use std::io;
    use std::net::SocketAddr;

    use tokio::io::{AsyncRead, AsyncWrite};
    use tokio::net::{TcpListener, TcpStream};

    use super::{IpVersion, resolve};
    use crate::core::error::{Error, Result};

    /// Source of connected async streams for a listener
    pub trait AsyncAcceptor {
        /// Stream type handed to each handshake
        type Stream: AsyncRead + AsyncWrite + Unpin;

        /// Wait for the next peer; returns the stream and a printable peer name
        fn accept_next(&mut self) -> impl Future<Output = io::Result<(Self::Stream, String)>>;
    }

    impl AsyncAcceptor for TcpListener {
        type Stream = TcpStream;

        async fn accept_next(&mut self) -> io::Result<(TcpStream, String)> {
            let (stream, addr) = self.accept().await?;
            Ok((stream, addr.to_string()))
        }
    }

    /// Bind an async listener on the loopback address of `ip_version`
    pub async fn bind_listener_async(ip_version: IpVersion, port: u16) -> Result<TcpListener> {
        let listener = TcpListener::bind(SocketAddr::new(ip_version.loopback(), port)).await?;
        log::info!("Listening on {}", listener.local_addr()?);
        Ok(listener)
    }

    /// Connect asynchronously to `destination:port`
    pub async fn connect_async(destination: &str, port: u16, ip_version: IpVersion) -> Result<TcpStream> {
        let mut last_error = None;
        for addr in resolve(destination, port, ip_version)? {
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    log::info!("Connected to {}", addr);
                    return Ok(stream);
                }
                Err(e) => last_error = Some(e),
            }
        }
        Err(Error::Transport(last_error.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "no address to connect to")
        })))
    }
}
