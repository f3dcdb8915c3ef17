/*!
Fermat primality testing and prime search.

A single Fermat round accepts some composites (Fermat liars, Carmichael
numbers among them). One round is the default; callers that want fewer
false positives ask for more rounds explicitly.
*/

use num_bigint::BigUint;
use num_traits::One;
use rand::RngCore;

use super::{modpow::mod_pow, random::{random_below, random_bits}};
use crate::core::error::Result;
use crate::invalid_param_err;

/// Single-round Fermat test.
///
/// `0` and `1` are not prime, `2` and `3` are. Anything larger passes when
/// `a^(n-1) mod n == 1` for one random witness `a` in `[2, n-2]`.
pub fn is_probably_prime<R: RngCore + ?Sized>(n: &BigUint, rng: &mut R) -> bool {
    is_probably_prime_rounds(n, 1, rng)
}

/// Fermat test with `rounds` independent witnesses, all of which must pass.
///
/// `rounds == 0` runs a single round.
pub fn is_probably_prime_rounds<R: RngCore + ?Sized>(n: &BigUint, rounds: u32, rng: &mut R) -> bool {
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);
    if n < &two {
        return false;
    }
    if n <= &three {
        return true;
    }

    let n_minus_one = n - BigUint::one();
    // Witnesses span n - 3 values starting at 2.
    let witness_span = n - &three;
    for _ in 0..rounds.max(1) {
        let witness = match random_below(&witness_span, rng) {
            Ok(offset) => offset + &two,
            Err(_) => return false,
        };
        match mod_pow(&witness, &n_minus_one, n) {
            Ok(residue) if residue.is_one() => continue,
            _ => return false,
        }
    }
    true
}

/// Draw `bit_width`-bit integers until one passes a single Fermat round.
pub fn find_prime<R: RngCore + ?Sized>(bit_width: u64, rng: &mut R) -> Result<BigUint> {
    find_prime_rounds(bit_width, 1, rng)
}

/// Draw `bit_width`-bit integers until one passes `rounds` Fermat rounds.
///
/// Candidates are uniform in `[0, 2^bit_width)`, so the result fits the
/// requested width without necessarily filling its top bit. There is no
/// bound on the number of draws.
pub fn find_prime_rounds<R: RngCore + ?Sized>(bit_width: u64, rounds: u32, rng: &mut R) -> Result<BigUint> {
    if bit_width < 2 {
        return invalid_param_err!("prime search needs at least 2 bits, got {}", bit_width);
    }
    let mut attempts: u64 = 0;
    loop {
        attempts += 1;
        let candidate = random_bits(bit_width, rng);
        if is_probably_prime_rounds(&candidate, rounds, rng) {
            log::debug!("Found {}-bit probable prime after {} draws", bit_width, attempts);
            return Ok(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_small_numbers() {
        let mut rng = StdRng::seed_from_u64(11);
        assert!(!is_probably_prime(&BigUint::from(0u32), &mut rng));
        assert!(!is_probably_prime(&BigUint::from(1u32), &mut rng));
        assert!(is_probably_prime(&BigUint::from(2u32), &mut rng));
        assert!(is_probably_prime(&BigUint::from(3u32), &mut rng));
        // 4 has a single witness, 2, and 2^3 mod 4 == 0
        assert!(!is_probably_prime(&BigUint::from(4u32), &mut rng));
    }

    #[test]
    fn test_known_primes_pass() {
        let mut rng = StdRng::seed_from_u64(12);
        for p in [5u64, 7, 23, 101, 7919, 1_000_000_007] {
            assert!(is_probably_prime_rounds(&BigUint::from(p), 10, &mut rng), "{} is prime", p);
        }
        let mersenne: BigUint = "170141183460469231731687303715884105727".parse().unwrap();
        assert!(is_probably_prime(&mersenne, &mut rng));
    }

    #[test]
    fn test_even_composites_fail() {
        let mut rng = StdRng::seed_from_u64(13);
        for n in [6u64, 8, 100, 1 << 20] {
            assert!(!is_probably_prime(&BigUint::from(n), &mut rng), "{} is composite", n);
        }
    }

    #[test]
    fn test_rounds_reject_composite() {
        // 91 = 7 * 13 has few Fermat liars; 20 rounds almost surely expose it.
        let mut rng = StdRng::seed_from_u64(14);
        assert!(!is_probably_prime_rounds(&BigUint::from(91u32), 20, &mut rng));
    }

    #[test]
    fn test_find_prime_tiny_widths() {
        // Below 8 only 2, 3, 5 and 7 can pass; 4 and 6 have no Fermat liars.
        let mut rng = StdRng::seed_from_u64(15);
        for _ in 0..20 {
            let p = find_prime(3, &mut rng).unwrap();
            assert!([2u32, 3, 5, 7].iter().any(|q| p == BigUint::from(*q)), "{} is not prime", p);
        }
        let p = find_prime(2, &mut rng).unwrap();
        assert!(p == BigUint::from(2u32) || p == BigUint::from(3u32));
    }

    #[test]
    fn test_find_prime_fits_width() {
        let mut rng = StdRng::seed_from_u64(16);
        for bits in [16u64, 32] {
            let p = find_prime_rounds(bits, 20, &mut rng).unwrap();
            assert!(p.bits() <= bits);
            assert!(is_probably_prime(&p, &mut rng));
        }
        for bits in [64u64, 128] {
            let p = find_prime(bits, &mut rng).unwrap();
            assert!(p.bits() <= bits);
            assert!(is_probably_prime(&p, &mut rng));
        }
    }

    #[test]
    fn test_find_prime_rejects_narrow_width() {
        let mut rng = StdRng::seed_from_u64(17);
        assert!(find_prime(0, &mut rng).is_err());
        assert!(find_prime(1, &mut rng).is_err());
    }
}
