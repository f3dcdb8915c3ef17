/*!
Common functionality for the connector role.
This module factors out the steps a connector performs on a [`Handshake`].
*/

use rand::RngCore;

use crate::core::{
    error::Result,
    message::Frame,
    session::{Handshake, HandshakeOutcome},
};

/// Accept the parameters frame and return the own public value payload.
///
/// The payload is held back until the listener's value has arrived.
pub fn accept_params<R: RngCore + ?Sized>(
    handshake: &mut Handshake,
    frame: Frame,
    rng: &mut R,
) -> Result<Vec<u8>> {
    let params = handshake.receive_params(frame)?;
    log::info!("CONNECTOR - Received modulus and base {}", params);
    handshake.derive_local_keys(rng)
}

/// Take the listener's public value.
pub fn accept_public(handshake: &mut Handshake, frame: Frame) -> Result<()> {
    handshake.accept_peer_public(frame)
}

/// Derive the secret once the own value is out.
pub fn complete(handshake: &mut Handshake) -> Result<HandshakeOutcome> {
    handshake.finish()
}

/// Status line for the finished handshake.
pub fn report(result: &Result<HandshakeOutcome>) {
    match result {
        Ok(outcome) => log::info!("CONNECTOR - Shared key generated: {}", outcome.shared_secret),
        Err(e) => log::warn!("CONNECTOR - Handshake failed: {}", e),
    }
}
