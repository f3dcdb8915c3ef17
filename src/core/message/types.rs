/*!
Values exchanged during the handshake.
*/

use std::fmt;

use num_bigint::BigUint;

/// Public group parameters chosen by the listener
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct DhParameters {
    /// Prime modulus `p`
    pub modulus: BigUint,
    /// Generator `g` in `[0, p)`
    pub generator: BigUint,
}

impl DhParameters {
    /// Create parameters from a modulus and generator
    pub fn new(modulus: BigUint, generator: BigUint) -> Self {
        Self { modulus, generator }
    }
}

impl fmt::Display for DhParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(p={}, g={})", self.modulus, self.generator)
    }
}
