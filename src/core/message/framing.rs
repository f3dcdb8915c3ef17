/*!
Length-prefixed message framing over blocking byte streams.

Every frame is a 4-byte big-endian payload length followed by exactly that
many payload bytes. Readers loop over short reads until the frame is
complete; a stream that ends part-way through a frame yields
[`Frame::EndOfStream`], never a truncated payload.
*/

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, BytesMut};

use crate::core::{
    constants::LENGTH_PREFIX_SIZE,
    error::{Error, Result},
};

/// Outcome of reading one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete payload
    Message(Vec<u8>),
    /// The peer closed the stream before a complete frame arrived
    EndOfStream,
}

impl Frame {
    /// Payload of a complete frame
    pub fn into_message(self) -> Option<Vec<u8>> {
        match self {
            Frame::Message(payload) => Some(payload),
            Frame::EndOfStream => None,
        }
    }

    /// Whether the stream ended
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Frame::EndOfStream)
    }
}

/// Build the on-wire bytes of a frame
pub fn encode_frame(payload: &[u8]) -> Result<BytesMut> {
    let len = u32::try_from(payload.len()).map_err(|_| Error::MessageTooLarge {
        size: payload.len(),
        max: u32::MAX as usize,
    })?;
    let mut frame = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    frame.put_u32(len);
    frame.put_slice(payload);
    Ok(frame)
}

/// Write one frame: length prefix and payload in a single write.
pub fn send_message<W: Write + ?Sized>(stream: &mut W, payload: &[u8]) -> Result<()> {
    let frame = encode_frame(payload)?;
    stream.write_all(&frame)?;
    stream.flush()?;
    log::trace!("Sent frame with {} byte payload", payload.len());
    Ok(())
}

/// Read one frame of any length the prefix allows.
pub fn receive_message<R: Read + ?Sized>(stream: &mut R) -> Result<Frame> {
    receive_message_limited(stream, u32::MAX as usize)
}

/// Read one frame, rejecting announced lengths above `max_len`.
///
/// The limit is checked before the payload buffer is allocated.
pub fn receive_message_limited<R: Read + ?Sized>(stream: &mut R, max_len: usize) -> Result<Frame> {
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    if !read_full(stream, &mut prefix)? {
        return Ok(Frame::EndOfStream);
    }

    let len = BigEndian::read_u32(&prefix) as usize;
    if len > max_len {
        return Err(Error::MessageTooLarge { size: len, max: max_len });
    }

    let mut payload = vec![0u8; len];
    if !read_full(stream, &mut payload)? {
        return Ok(Frame::EndOfStream);
    }
    log::trace!("Received frame with {} byte payload", len);
    Ok(Frame::Message(payload))
}

/// Fill `buf` completely. Returns `false` if the stream ended first.
fn read_full<R: Read + ?Sized>(stream: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if is_disconnect(&e) => return Ok(false),
            Err(e) => return Err(Error::Transport(e)),
        }
    }
    Ok(true)
}

/// Errors a socket reports when the peer went away mid-read
pub(crate) fn is_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
    )
}

/// Extension trait for Read to receive frames.
pub trait FramedRead: Read {
    /// Read one frame.
    fn read_frame(&mut self) -> Result<Frame> {
        receive_message(self)
    }

    /// Read one frame no larger than `max_len`.
    fn read_frame_limited(&mut self, max_len: usize) -> Result<Frame> {
        receive_message_limited(self, max_len)
    }
}

impl<T: Read + ?Sized> FramedRead for T {}

/// Extension trait for Write to send frames.
pub trait FramedWrite: Write {
    /// Write one frame.
    fn write_frame(&mut self, payload: &[u8]) -> Result<()> {
        send_message(self, payload)
    }
}

impl<T: Write + ?Sized> FramedWrite for T {}
