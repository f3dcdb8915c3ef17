//! Framing over async streams.
//!
//! The blocking framing lives in `core::message::framing`; this module
//! provides the same wire format for tokio streams.

// Asynchronous framing implementation (requires the "async" feature)
#[cfg(feature = "async")]
pub mod async_stream;

#[cfg(feature = "async")]
pub use async_stream::{
    AsyncFramedRead, AsyncFramedWrite, receive_message_async, receive_message_limited_async,
    send_message_async,
};
