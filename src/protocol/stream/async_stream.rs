/*!
Length-prefixed framing over tokio streams.

Same wire format and end-of-stream rules as the blocking framing: a stream
that ends part-way through a frame yields [`Frame::EndOfStream`].
*/

use std::future::Future;
use std::io;

use byteorder::{BigEndian, ByteOrder};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::core::{
    constants::LENGTH_PREFIX_SIZE,
    error::{Error, Result},
    message::{encode_frame, framing::is_disconnect, Frame},
};

/// Write one frame asynchronously.
pub async fn send_message_async<W: AsyncWrite + Unpin + ?Sized>(stream: &mut W, payload: &[u8]) -> Result<()> {
    let frame = encode_frame(payload)?;
    stream.write_all(&frame).await?;
    stream.flush().await?;
    log::trace!("Sent frame with {} byte payload", payload.len());
    Ok(())
}

/// Read one frame of any length the prefix allows.
pub async fn receive_message_async<R: AsyncRead + Unpin + ?Sized>(stream: &mut R) -> Result<Frame> {
    receive_message_limited_async(stream, u32::MAX as usize).await
}

/// Read one frame, rejecting announced lengths above `max_len`.
pub async fn receive_message_limited_async<R: AsyncRead + Unpin + ?Sized>(
    stream: &mut R,
    max_len: usize,
) -> Result<Frame> {
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    if !read_full(stream, &mut prefix).await? {
        return Ok(Frame::EndOfStream);
    }

    let len = BigEndian::read_u32(&prefix) as usize;
    if len > max_len {
        return Err(Error::MessageTooLarge { size: len, max: max_len });
    }

    let mut payload = vec![0u8; len];
    if !read_full(stream, &mut payload).await? {
        return Ok(Frame::EndOfStream);
    }
    log::trace!("Received frame with {} byte payload", len);
    Ok(Frame::Message(payload))
}

async fn read_full<R: AsyncRead + Unpin + ?Sized>(stream: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]).await {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if is_disconnect(&e) => return Ok(false),
            Err(e) => return Err(Error::Transport(e)),
        }
    }
    Ok(true)
}

/// Extension trait for async readers to receive frames.
pub trait AsyncFramedRead: AsyncRead + Unpin {
    /// Read one frame no larger than `max_len`.
    fn read_frame_limited(&mut self, max_len: usize) -> impl Future<Output = Result<Frame>> {
        receive_message_limited_async(self, max_len)
    }
}

impl<T: AsyncRead + Unpin + ?Sized> AsyncFramedRead for T {}

/// Extension trait for async writers to send frames.
pub trait AsyncFramedWrite: AsyncWrite + Unpin {
    /// Write one frame.
    fn write_frame<'a>(&'a mut self, payload: &'a [u8]) -> impl Future<Output = Result<()>> + 'a {
        send_message_async(self, payload)
    }
}

impl<T: AsyncWrite + Unpin + ?Sized> AsyncFramedWrite for T {}
