/*!
The DH handshake state machine.

`Handshake` holds everything one side needs between frames and performs
every computation of the protocol, but never touches a stream. The session
roles feed it received frames and send what it returns, which keeps the
blocking and async drivers on exactly the same protocol logic.
*/

use std::fmt;

use num_bigint::BigUint;
use rand::RngCore;

use super::state::{HandshakeState, Role, StateManager};
use crate::core::{
    config::HandshakeConfig,
    error::{AbortReason, Error, KeyExchangeError, Result},
    math::{find_prime_rounds, mod_pow, random_below},
    message::{
        decode_params, decode_public_value, encode_params, encode_public_value, DhParameters, Frame,
    },
};
use crate::invalid_state_err;

/// Secret both sides derive; never transmitted
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct SharedSecret(BigUint);

impl SharedSecret {
    /// Wrap a derived value
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    /// The secret as an integer
    pub fn value(&self) -> &BigUint {
        &self.0
    }

    /// Big-endian bytes of the secret
    pub fn to_bytes_be(&self) -> Vec<u8> {
        self.0.to_bytes_be()
    }
}

impl fmt::Display for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret({} bits)", self.0.bits())
    }
}

/// One side's private exponent and matching public value
#[derive(Clone)]
pub struct LocalKeys {
    private: BigUint,
    public: BigUint,
}

impl LocalKeys {
    /// Pick a private exponent in `[0, p)` and compute `g^x mod p`
    pub fn generate<R: RngCore + ?Sized>(params: &DhParameters, rng: &mut R) -> Result<Self> {
        let private = random_below(&params.modulus, rng)?;
        Self::from_private(params, private)
    }

    /// Use a known private exponent
    pub fn from_private(params: &DhParameters, private: BigUint) -> Result<Self> {
        let public = mod_pow(&params.generator, &private, &params.modulus)?;
        Ok(Self { private, public })
    }

    /// Public value `y`
    pub fn public(&self) -> &BigUint {
        &self.public
    }

    /// `peer_public^x mod p`
    pub fn shared_secret(&self, params: &DhParameters, peer_public: &BigUint) -> Result<SharedSecret> {
        mod_pow(peer_public, &self.private, &params.modulus).map(SharedSecret::new)
    }
}

impl fmt::Debug for LocalKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalKeys")
            .field("private", &"<redacted>")
            .field("public", &self.public)
            .finish()
    }
}

/// Result of a completed handshake
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct HandshakeOutcome {
    /// Role this side played
    pub role: Role,
    /// Parameters used by both sides
    pub parameters: DhParameters,
    /// Public value this side sent
    pub local_public: BigUint,
    /// Public value received from the peer
    pub peer_public: BigUint,
    /// Derived shared secret
    pub shared_secret: SharedSecret,
}

/// I/O-free handshake for one side of one connection
#[derive(Debug)]
pub struct Handshake {
    state: StateManager,
    config: HandshakeConfig,
    params: Option<DhParameters>,
    keys: Option<LocalKeys>,
    peer_public: Option<BigUint>,
}

impl Handshake {
    /// Start a handshake for `role`
    pub fn new(role: Role, config: HandshakeConfig) -> Self {
        Self {
            state: StateManager::new(role),
            config,
            params: None,
            keys: None,
            peer_public: None,
        }
    }

    /// Start a listener handshake
    pub fn listener(config: HandshakeConfig) -> Self {
        Self::new(Role::Listener, config)
    }

    /// Start a connector handshake
    pub fn connector(config: HandshakeConfig) -> Self {
        Self::new(Role::Connector, config)
    }

    /// Role of this side
    pub fn role(&self) -> Role {
        self.state.role()
    }

    /// Current state
    pub fn state(&self) -> HandshakeState {
        self.state.state()
    }

    /// Configuration in use
    pub fn config(&self) -> &HandshakeConfig {
        &self.config
    }

    /// Parameters, once generated or received
    pub fn parameters(&self) -> Option<&DhParameters> {
        self.params.as_ref()
    }

    /// Listener: generate `p` and `g` and return the parameters payload.
    ///
    /// Moves `GeneratingParams -> SendingParams`.
    pub fn generate_params<R: RngCore + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<u8>> {
        let result = self.generate_params_inner(rng);
        self.guard(result)
    }

    fn generate_params_inner<R: RngCore + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<u8>> {
        self.expect_state(HandshakeState::GeneratingParams)?;
        let modulus = find_prime_rounds(self.config.prime_bits, self.config.fermat_rounds, rng)?;
        let generator = random_below(&modulus, rng)?;
        let params = DhParameters::new(modulus, generator);
        let payload = encode_params(&params);
        self.params = Some(params);
        self.advance(HandshakeState::SendingParams)?;
        Ok(payload)
    }

    /// Listener: the parameters frame went out.
    ///
    /// Moves `SendingParams -> DerivingLocalKeys`.
    pub fn params_sent(&mut self) -> Result<()> {
        let result = self
            .expect_state(HandshakeState::SendingParams)
            .and_then(|_| self.advance(HandshakeState::DerivingLocalKeys));
        self.guard(result)
    }

    /// Connector: accept the parameters frame.
    ///
    /// An ended stream or a malformed payload aborts the handshake.
    /// Moves `AwaitingParams -> DerivingLocalKeys`.
    pub fn receive_params(&mut self, frame: Frame) -> Result<&DhParameters> {
        let result = self.receive_params_inner(frame);
        self.guard(result)?;
        self.params
            .as_ref()
            .ok_or_else(|| Error::InvalidState {
                expected: "parameters".to_string(),
                actual: "none".to_string(),
            })
    }

    fn receive_params_inner(&mut self, frame: Frame) -> Result<()> {
        self.expect_state(HandshakeState::AwaitingParams)?;
        let payload = match frame {
            Frame::Message(payload) => payload,
            Frame::EndOfStream => return Err(Error::HandshakeAborted(AbortReason::PeerDisconnected)),
        };
        self.params = Some(decode_params(&payload)?);
        self.advance(HandshakeState::DerivingLocalKeys)
    }

    /// Pick the private exponent and return the public value payload.
    ///
    /// Moves `DerivingLocalKeys -> ExchangingPublicValues`.
    pub fn derive_local_keys<R: RngCore + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<u8>> {
        let keys = self
            .current_params()
            .and_then(|params| LocalKeys::generate(params, rng));
        let result = keys.and_then(|keys| self.install_keys(keys));
        self.guard(result)
    }

    /// Same as [`Handshake::derive_local_keys`] with a chosen private exponent
    pub fn derive_local_keys_from(&mut self, private: BigUint) -> Result<Vec<u8>> {
        let keys = self
            .current_params()
            .and_then(|params| LocalKeys::from_private(params, private));
        let result = keys.and_then(|keys| self.install_keys(keys));
        self.guard(result)
    }

    fn current_params(&self) -> Result<&DhParameters> {
        self.expect_state(HandshakeState::DerivingLocalKeys)?;
        match self.params.as_ref() {
            Some(params) => Ok(params),
            None => invalid_state_err!("parameters", "none"),
        }
    }

    fn install_keys(&mut self, keys: LocalKeys) -> Result<Vec<u8>> {
        let payload = encode_public_value(keys.public());
        self.keys = Some(keys);
        self.advance(HandshakeState::ExchangingPublicValues)?;
        Ok(payload)
    }

    /// Accept the peer's public value without finishing.
    ///
    /// Stays in `ExchangingPublicValues` so a side that still has to send
    /// its own value can do so before calling [`Handshake::finish`].
    pub fn accept_peer_public(&mut self, frame: Frame) -> Result<()> {
        let result = self.accept_peer_public_inner(frame);
        self.guard(result)
    }

    fn accept_peer_public_inner(&mut self, frame: Frame) -> Result<()> {
        self.expect_state(HandshakeState::ExchangingPublicValues)?;
        let payload = match frame {
            Frame::Message(payload) => payload,
            Frame::EndOfStream => {
                return Err(Error::KeyExchangeFailed(KeyExchangeError::PeerDisconnected));
            }
        };
        let peer_public = match self.params.as_ref() {
            Some(params) => decode_public_value(&payload, &params.modulus)?,
            None => return invalid_state_err!("parameters", "none"),
        };
        self.peer_public = Some(peer_public);
        Ok(())
    }

    /// Derive the shared secret from the accepted peer value.
    ///
    /// The private exponent is dropped once the secret exists.
    /// Moves `ExchangingPublicValues -> DerivingSharedSecret -> Complete`.
    pub fn finish(&mut self) -> Result<HandshakeOutcome> {
        let result = self.finish_inner();
        self.guard(result)
    }

    fn finish_inner(&mut self) -> Result<HandshakeOutcome> {
        self.expect_state(HandshakeState::ExchangingPublicValues)?;
        let (params, keys, peer_public) =
            match (self.params.as_ref(), self.keys.take(), self.peer_public.take()) {
                (Some(params), Some(keys), Some(peer_public)) => (params, keys, peer_public),
                _ => return invalid_state_err!("peer public value", "none"),
            };
        self.state.transition_to(HandshakeState::DerivingSharedSecret);

        let shared_secret = keys.shared_secret(params, &peer_public)?;
        let outcome = HandshakeOutcome {
            role: self.state.role(),
            parameters: params.clone(),
            local_public: keys.public().clone(),
            peer_public,
            shared_secret,
        };
        self.advance(HandshakeState::Complete)?;
        Ok(outcome)
    }

    /// [`Handshake::accept_peer_public`] followed by [`Handshake::finish`]
    pub fn receive_peer_public(&mut self, frame: Frame) -> Result<HandshakeOutcome> {
        self.accept_peer_public(frame)?;
        self.finish()
    }

    /// Record a failure raised outside the state machine (usually by the
    /// stream) and return the error the caller should surface.
    ///
    /// Transport errors and oversized frames during the public-value
    /// exchange become `KeyExchangeFailed`; an oversized parameters frame
    /// aborts the handshake.
    pub fn fail(&mut self, error: Error) -> Error {
        let error = match (self.state.state(), error) {
            (HandshakeState::ExchangingPublicValues, Error::Transport(io_error)) => {
                Error::KeyExchangeFailed(KeyExchangeError::Transport(io_error))
            }
            (HandshakeState::ExchangingPublicValues, Error::MessageTooLarge { size, max }) => {
                Error::KeyExchangeFailed(KeyExchangeError::Oversized { size, max })
            }
            (HandshakeState::AwaitingParams, Error::MessageTooLarge { size, max }) => {
                Error::HandshakeAborted(AbortReason::MalformedParameters(format!(
                    "frame of {} bytes exceeds limit of {} bytes",
                    size, max
                )))
            }
            (_, error) => error,
        };
        if !self.state.state().is_terminal() {
            log::debug!("{} handshake failed in {}: {}", self.role(), self.state(), error);
        }
        self.state.transition_to_failed();
        self.keys = None;
        self.peer_public = None;
        error
    }

    fn guard<T>(&mut self, result: Result<T>) -> Result<T> {
        result.map_err(|e| self.fail(e))
    }

    fn expect_state(&self, expected: HandshakeState) -> Result<()> {
        if self.state.is_state(expected) {
            Ok(())
        } else {
            invalid_state_err!(expected, self.state.state())
        }
    }

    fn advance(&mut self, target: HandshakeState) -> Result<()> {
        if self.state.transition_to(target) {
            Ok(())
        } else {
            invalid_state_err!(target, self.state.state())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_textbook_exchange() -> Result<()> {
        let params = DhParameters::new(big(23), big(5));
        let listener = LocalKeys::from_private(&params, big(6))?;
        let connector = LocalKeys::from_private(&params, big(15))?;

        assert_eq!(listener.public(), &big(8));
        assert_eq!(connector.public(), &big(19));

        let k_listener = listener.shared_secret(&params, connector.public())?;
        let k_connector = connector.shared_secret(&params, listener.public())?;
        assert_eq!(k_listener.value(), &big(2));
        assert_eq!(k_listener, k_connector);
        Ok(())
    }

    #[test]
    fn test_state_machines_agree() -> Result<()> {
        let mut rng_l = StdRng::seed_from_u64(100);
        let mut rng_c = StdRng::seed_from_u64(200);
        let config = HandshakeConfig::fast();

        let mut listener = Handshake::listener(config.clone());
        let mut connector = Handshake::connector(config);

        let params = listener.generate_params(&mut rng_l)?;
        assert_eq!(listener.state(), HandshakeState::SendingParams);
        listener.params_sent()?;
        connector.receive_params(Frame::Message(params))?;
        assert_eq!(connector.parameters(), listener.parameters());

        let y_l = listener.derive_local_keys(&mut rng_l)?;
        let y_c = connector.derive_local_keys(&mut rng_c)?;

        let from_connector = connector.receive_peer_public(Frame::Message(y_l))?;
        let from_listener = listener.receive_peer_public(Frame::Message(y_c))?;

        assert_eq!(listener.state(), HandshakeState::Complete);
        assert_eq!(connector.state(), HandshakeState::Complete);
        assert_eq!(from_listener.shared_secret, from_connector.shared_secret);
        assert_eq!(from_listener.local_public, from_connector.peer_public);
        assert_eq!(from_listener.role, Role::Listener);
        Ok(())
    }

    #[test]
    fn test_fixed_exponents_through_state_machine() -> Result<()> {
        let mut connector = Handshake::connector(HandshakeConfig::new());
        connector.receive_params(Frame::Message(b"23,5".to_vec()))?;
        assert_eq!(connector.derive_local_keys_from(big(15))?, b"19".to_vec());
        let outcome = connector.receive_peer_public(Frame::Message(b"8".to_vec()))?;
        assert_eq!(outcome.shared_secret.value(), &big(2));
        Ok(())
    }

    #[test]
    fn test_connector_receives_before_finishing() -> Result<()> {
        let mut connector = Handshake::connector(HandshakeConfig::new());
        connector.receive_params(Frame::Message(b"23,5".to_vec()))?;
        connector.derive_local_keys_from(big(15))?;
        connector.accept_peer_public(Frame::Message(b"8".to_vec()))?;
        // Still exchanging until the own value is out and finish is called
        assert_eq!(connector.state(), HandshakeState::ExchangingPublicValues);
        let outcome = connector.finish()?;
        assert_eq!(outcome.peer_public, big(8));
        assert_eq!(outcome.local_public, big(19));
        Ok(())
    }

    #[test]
    fn test_finish_requires_peer_value() -> Result<()> {
        let mut connector = Handshake::connector(HandshakeConfig::new());
        connector.receive_params(Frame::Message(b"23,5".to_vec()))?;
        connector.derive_local_keys_from(big(6))?;
        assert!(matches!(connector.finish(), Err(Error::InvalidState { .. })));
        assert_eq!(connector.state(), HandshakeState::Failed);
        Ok(())
    }

    #[test]
    fn test_params_end_of_stream_aborts() {
        let mut connector = Handshake::connector(HandshakeConfig::new());
        let result = connector.receive_params(Frame::EndOfStream);
        assert!(matches!(
            result,
            Err(Error::HandshakeAborted(AbortReason::PeerDisconnected))
        ));
        assert_eq!(connector.state(), HandshakeState::Failed);
    }

    #[test]
    fn test_malformed_params_abort() {
        let mut connector = Handshake::connector(HandshakeConfig::new());
        let result = connector.receive_params(Frame::Message(b"twenty-three,5".to_vec()));
        assert!(matches!(
            result,
            Err(Error::HandshakeAborted(AbortReason::MalformedParameters(_)))
        ));
        assert_eq!(connector.state(), HandshakeState::Failed);
    }

    #[test]
    fn test_peer_disconnect_fails_exchange() -> Result<()> {
        let mut connector = Handshake::connector(HandshakeConfig::new());
        connector.receive_params(Frame::Message(b"23,5".to_vec()))?;
        connector.derive_local_keys_from(big(3))?;
        let result = connector.receive_peer_public(Frame::EndOfStream);
        assert!(matches!(
            result,
            Err(Error::KeyExchangeFailed(KeyExchangeError::PeerDisconnected))
        ));
        assert_eq!(connector.state(), HandshakeState::Failed);
        Ok(())
    }

    #[test]
    fn test_transport_error_during_exchange() -> Result<()> {
        let mut connector = Handshake::connector(HandshakeConfig::new());
        connector.receive_params(Frame::Message(b"23,5".to_vec()))?;
        connector.derive_local_keys_from(big(3))?;
        let err = connector.fail(Error::Transport(std::io::Error::from(
            std::io::ErrorKind::BrokenPipe,
        )));
        assert!(matches!(
            err,
            Error::KeyExchangeFailed(KeyExchangeError::Transport(_))
        ));
        Ok(())
    }

    #[test]
    fn test_oversized_frames_by_phase() -> Result<()> {
        let mut connector = Handshake::connector(HandshakeConfig::new());
        let err = connector.fail(Error::MessageTooLarge { size: 2_097_152, max: 1_048_576 });
        assert!(matches!(
            err,
            Error::HandshakeAborted(AbortReason::MalformedParameters(_))
        ));
        assert_eq!(connector.state(), HandshakeState::Failed);

        let mut connector = Handshake::connector(HandshakeConfig::new());
        connector.receive_params(Frame::Message(b"23,5".to_vec()))?;
        connector.derive_local_keys_from(big(3))?;
        let err = connector.fail(Error::MessageTooLarge { size: 2_097_152, max: 1_048_576 });
        assert!(matches!(
            err,
            Error::KeyExchangeFailed(KeyExchangeError::Oversized { size: 2_097_152, max: 1_048_576 })
        ));
        assert_eq!(connector.state(), HandshakeState::Failed);
        Ok(())
    }

    #[test]
    fn test_out_of_order_steps() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut connector = Handshake::connector(HandshakeConfig::fast());
        assert!(matches!(
            connector.generate_params(&mut rng),
            Err(Error::InvalidState { .. })
        ));

        let mut listener = Handshake::listener(HandshakeConfig::fast());
        assert!(matches!(
            listener.derive_local_keys(&mut rng),
            Err(Error::InvalidState { .. })
        ));
        assert_eq!(listener.state(), HandshakeState::Failed);
    }

    #[test]
    fn test_secret_debug_is_redacted() -> Result<()> {
        let params = DhParameters::new(big(23), big(5));
        let keys = LocalKeys::from_private(&params, big(6))?;
        let debug = format!("{:?}", keys);
        assert!(debug.contains("redacted"));
        let secret = keys.shared_secret(&params, &big(19))?;
        assert_eq!(format!("{:?}", secret), "SharedSecret(2 bits)");
        assert_eq!(secret.to_string(), "2");
        Ok(())
    }
}
