/*!
Uniform random integers.

Values are drawn from raw bytes of the caller's `RngCore`, masked to the
needed bit count and rejected when they land at or above the bound.
*/

use num_bigint::BigUint;
use num_traits::Zero;
use rand::RngCore;

use crate::core::error::Result;
use crate::invalid_param_err;

/// Uniform integer in `[0, 2^bits)`.
pub fn random_bits<R: RngCore + ?Sized>(bits: u64, rng: &mut R) -> BigUint {
    if bits == 0 {
        return BigUint::zero();
    }
    let byte_len = bits.div_ceil(8) as usize;
    let mut bytes = vec![0u8; byte_len];
    rng.fill_bytes(&mut bytes);

    // Big-endian: the excess high bits live in the first byte.
    let excess = (byte_len as u64 * 8 - bits) as u32;
    bytes[0] &= 0xFF >> excess;
    BigUint::from_bytes_be(&bytes)
}

/// Uniform integer in `[0, bound)`.
///
/// Not suitable for key material that must resist an attacker; the quality
/// of the result is exactly the quality of `rng`.
pub fn random_below<R: RngCore + ?Sized>(bound: &BigUint, rng: &mut R) -> Result<BigUint> {
    if bound.is_zero() {
        return invalid_param_err!("random_below requires a positive bound");
    }
    let bits = bound.bits();
    loop {
        let candidate = random_bits(bits, rng);
        if &candidate < bound {
            return Ok(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::ToPrimitive;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_bits_width() {
        let mut rng = StdRng::seed_from_u64(1);
        for bits in [1u64, 7, 8, 9, 63, 64, 65, 128] {
            for _ in 0..50 {
                assert!(random_bits(bits, &mut rng).bits() <= bits);
            }
        }
        assert!(random_bits(0, &mut rng).is_zero());
    }

    #[test]
    fn test_random_below_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let bound = BigUint::from(23u32);
        let mut seen = [false; 23];
        for _ in 0..2000 {
            let value = random_below(&bound, &mut rng).unwrap();
            assert!(value < bound);
            seen[value.to_usize().unwrap()] = true;
        }
        assert!(seen.iter().all(|s| *s), "every residue should appear");
    }

    #[test]
    fn test_random_below_one() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(random_below(&BigUint::from(1u32), &mut rng).unwrap().is_zero());
    }

    #[test]
    fn test_random_below_zero_rejected() {
        let mut rng = StdRng::seed_from_u64(4);
        assert!(random_below(&BigUint::zero(), &mut rng).is_err());
    }

    #[test]
    fn test_seeded_reproducible() {
        let bound = BigUint::from(1u64) << 100u32;
        let a = random_below(&bound, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = random_below(&bound, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }
}
