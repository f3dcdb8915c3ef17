//! Number theory for the DH handshake.
//!
//! Uniform sampling, Fermat primality testing and modular exponentiation
//! over arbitrary-precision unsigned integers. Every function that needs
//! randomness takes the random source explicitly so runs can be seeded.
//!
//! None of this is cryptographically strong: the samplers use whatever
//! `RngCore` they are given and nothing here is constant-time.

pub mod random;
pub mod primality;
pub mod modpow;

pub use self::random::{random_below, random_bits};
pub use self::primality::{find_prime, find_prime_rounds, is_probably_prime, is_probably_prime_rounds};
pub use self::modpow::mod_pow;
