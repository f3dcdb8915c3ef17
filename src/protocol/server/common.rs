/*!
Common functionality for the listener role.
This module factors out the steps a listener performs on a [`Handshake`] so
the blocking and async sessions only differ in how frames move.
*/

use std::io;

use rand::RngCore;

use crate::core::{
    error::{Error, Result},
    message::Frame,
    session::{Handshake, HandshakeOutcome},
};

/// Generate the parameters and return the frame payload to send.
pub fn start<R: RngCore + ?Sized>(handshake: &mut Handshake, rng: &mut R) -> Result<Vec<u8>> {
    let payload = handshake.generate_params(rng)?;
    if let Some(params) = handshake.parameters() {
        log::debug!("Generated parameters {}", params);
    }
    Ok(payload)
}

/// Record that the parameters went out and return the own public value payload.
pub fn public_value<R: RngCore + ?Sized>(handshake: &mut Handshake, rng: &mut R) -> Result<Vec<u8>> {
    handshake.params_sent()?;
    if let Some(params) = handshake.parameters() {
        log::info!("LISTENER - Parameters {} sent to the connector", params);
    }
    handshake.derive_local_keys(rng)
}

/// Take the connector's public value and derive the secret.
pub fn complete(handshake: &mut Handshake, frame: Frame) -> Result<HandshakeOutcome> {
    handshake.receive_peer_public(frame)
}

/// Status line for a failed accept; returns the error to surface.
pub fn accept_failed(error: io::Error) -> Error {
    log::warn!("LISTENER - Accept failed: {}", error);
    Error::Transport(error)
}

/// Status line for one served connection.
pub fn report(peer: &str, result: &Result<HandshakeOutcome>) {
    match result {
        Ok(outcome) => log::info!("LISTENER - Shared key generated with {}: {}", peer, outcome.shared_secret),
        Err(e) => log::warn!("LISTENER - Handshake with {} failed: {}", peer, e),
    }
}
