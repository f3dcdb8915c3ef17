/*!
Handshake state management for the DH protocol.

This module defines handshake states and the state machine for handshake
progression. Listener and connector walk different paths to the same
terminal states.
*/

use std::fmt;

/// Handshake state for tracking progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum HandshakeState {
    /// Listener is generating `p` and `g`
    GeneratingParams,
    /// Listener is sending `p` and `g`
    SendingParams,
    /// Connector is waiting for `p` and `g`
    AwaitingParams,
    /// Choosing the private exponent and computing the public value
    DerivingLocalKeys,
    /// Public values are being exchanged
    ExchangingPublicValues,
    /// Computing the shared secret from the peer's public value
    DerivingSharedSecret,
    /// Shared secret available
    Complete,
    /// Handshake ended with an error
    Failed,
}

impl HandshakeState {
    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, HandshakeState::Complete | HandshakeState::Failed)
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeState::GeneratingParams => write!(f, "GeneratingParams"),
            HandshakeState::SendingParams => write!(f, "SendingParams"),
            HandshakeState::AwaitingParams => write!(f, "AwaitingParams"),
            HandshakeState::DerivingLocalKeys => write!(f, "DerivingLocalKeys"),
            HandshakeState::ExchangingPublicValues => write!(f, "ExchangingPublicValues"),
            HandshakeState::DerivingSharedSecret => write!(f, "DerivingSharedSecret"),
            HandshakeState::Complete => write!(f, "Complete"),
            HandshakeState::Failed => write!(f, "Failed"),
        }
    }
}

/// Endpoint role in the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    /// Accepts connections and generates the parameters
    Listener,
    /// Connects and receives the parameters
    Connector,
}

impl Role {
    /// State a fresh handshake starts in
    pub fn initial_state(&self) -> HandshakeState {
        match self {
            Role::Listener => HandshakeState::GeneratingParams,
            Role::Connector => HandshakeState::AwaitingParams,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Listener => write!(f, "Listener"),
            Role::Connector => write!(f, "Connector"),
        }
    }
}

/// Handshake state manager
///
/// Tracks the current state and rejects transitions the role does not
/// allow. Any non-terminal state may move to `Failed`.
#[derive(Debug, Clone, Copy)]
pub struct StateManager {
    /// Current state of the handshake
    state: HandshakeState,
    /// Role of this endpoint
    role: Role,
}

impl StateManager {
    /// Create a new state manager in the role's initial state
    pub fn new(role: Role) -> Self {
        Self {
            state: role.initial_state(),
            role,
        }
    }

    /// Get the current state
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Get the role
    pub fn role(&self) -> Role {
        self.role
    }

    /// Check if the handshake is in the given state
    pub fn is_state(&self, state: HandshakeState) -> bool {
        self.state == state
    }

    /// State that follows the current one on success, if any
    pub fn next_state(&self) -> Option<HandshakeState> {
        use HandshakeState::*;
        match (self.role, self.state) {
            (Role::Listener, GeneratingParams) => Some(SendingParams),
            (Role::Listener, SendingParams) => Some(DerivingLocalKeys),
            (Role::Connector, AwaitingParams) => Some(DerivingLocalKeys),
            (_, DerivingLocalKeys) => Some(ExchangingPublicValues),
            (_, ExchangingPublicValues) => Some(DerivingSharedSecret),
            (_, DerivingSharedSecret) => Some(Complete),
            _ => None,
        }
    }

    /// Check if moving to `target` is allowed
    pub fn can_transition_to(&self, target: HandshakeState) -> bool {
        if target == HandshakeState::Failed {
            return !self.state.is_terminal();
        }
        self.next_state() == Some(target)
    }

    /// Move to `target`; returns whether the transition happened
    pub fn transition_to(&mut self, target: HandshakeState) -> bool {
        if self.can_transition_to(target) {
            log::debug!("{} handshake: {} -> {}", self.role, self.state, target);
            self.state = target;
            true
        } else {
            false
        }
    }

    /// Move to `Failed` unless already terminal
    pub fn transition_to_failed(&mut self) {
        self.transition_to(HandshakeState::Failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use HandshakeState::*;

    #[test]
    fn test_listener_path() {
        let mut manager = StateManager::new(Role::Listener);
        assert_eq!(manager.state(), GeneratingParams);
        for next in [SendingParams, DerivingLocalKeys, ExchangingPublicValues, DerivingSharedSecret, Complete] {
            assert!(manager.transition_to(next), "listener should reach {}", next);
        }
        assert!(manager.state().is_terminal());
        assert_eq!(manager.next_state(), None);
    }

    #[test]
    fn test_connector_path() {
        let mut manager = StateManager::new(Role::Connector);
        assert_eq!(manager.state(), AwaitingParams);
        for next in [DerivingLocalKeys, ExchangingPublicValues, DerivingSharedSecret, Complete] {
            assert!(manager.transition_to(next), "connector should reach {}", next);
        }
    }

    #[test]
    fn test_invalid_transitions() {
        let mut manager = StateManager::new(Role::Connector);

        // Connectors never send parameters
        assert!(!manager.transition_to(SendingParams));
        assert!(!manager.transition_to(Complete));
        assert_eq!(manager.state(), AwaitingParams);

        let mut manager = StateManager::new(Role::Listener);
        assert!(!manager.transition_to(DerivingLocalKeys));
        assert_eq!(manager.state(), GeneratingParams);
    }

    #[test]
    fn test_failure_is_final() {
        let mut manager = StateManager::new(Role::Listener);
        manager.transition_to_failed();
        assert_eq!(manager.state(), Failed);
        assert!(!manager.transition_to(SendingParams));

        let mut manager = StateManager::new(Role::Connector);
        for next in [DerivingLocalKeys, ExchangingPublicValues, DerivingSharedSecret, Complete] {
            manager.transition_to(next);
        }
        manager.transition_to_failed();
        assert_eq!(manager.state(), Complete);
    }
}
