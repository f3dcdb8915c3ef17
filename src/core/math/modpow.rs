/*!
Modular exponentiation by repeated squaring.
*/

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::core::error::Result;
use crate::invalid_param_err;

/// Compute `base^exponent mod modulus`.
///
/// Walks the exponent from its low bit: multiply the accumulator by the
/// current base when the bit is set, square the base, shift the exponent.
/// Every intermediate value is reduced modulo `modulus`. A modulus of 1
/// yields 0; a modulus of 0 is rejected.
pub fn mod_pow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    if modulus.is_zero() {
        return invalid_param_err!("mod_pow requires a non-zero modulus");
    }
    if modulus.is_one() {
        return Ok(BigUint::zero());
    }

    let one = BigUint::one();
    let mut result = BigUint::one();
    let mut base = base % modulus;
    let mut exponent = exponent.clone();

    while !exponent.is_zero() {
        if !(&exponent & &one).is_zero() {
            result = (result * &base) % modulus;
        }
        exponent >>= 1u32;
        base = (&base * &base) % modulus;
    }
    Ok(result)
}
