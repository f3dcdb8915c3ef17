/*!
Message handling for the DH handshake.

This module provides the length-prefixed framing used on the wire and the
decimal text encoding of the values carried inside frames.
*/

pub mod types;
pub mod framing;
pub mod encoding;

// Re-export commonly used items
pub use types::DhParameters;
pub use framing::{
    Frame, FramedRead, FramedWrite, encode_frame, receive_message, receive_message_limited, send_message,
};
pub use encoding::{decode_params, decode_public_value, encode_params, encode_public_value};
