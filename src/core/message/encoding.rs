/*!
Text encoding of handshake values.

Every integer travels as the UTF-8 decimal string of its value. The
parameters frame joins modulus and generator with a comma; each public value
is a frame of its own.
*/

use num_bigint::BigUint;

use super::types::DhParameters;
use crate::core::{
    constants::PARAMS_SEPARATOR,
    error::{AbortReason, Error, KeyExchangeError, Result},
};

/// Encode parameters as `"<p>,<g>"`
pub fn encode_params(params: &DhParameters) -> Vec<u8> {
    format!("{}{}{}", params.modulus, PARAMS_SEPARATOR, params.generator).into_bytes()
}

/// Decode a parameters payload.
///
/// The modulus must be at least 2 and the generator below it.
pub fn decode_params(payload: &[u8]) -> Result<DhParameters> {
    let malformed = |msg: String| Error::HandshakeAborted(AbortReason::MalformedParameters(msg));

    let text = std::str::from_utf8(payload).map_err(|e| malformed(format!("not UTF-8: {}", e)))?;
    let (modulus, generator) = text
        .split_once(PARAMS_SEPARATOR)
        .ok_or_else(|| malformed(format!("missing '{}' separator", PARAMS_SEPARATOR)))?;

    let modulus = parse_decimal(modulus).ok_or_else(|| malformed(format!("bad modulus {:?}", modulus)))?;
    let generator =
        parse_decimal(generator).ok_or_else(|| malformed(format!("bad generator {:?}", generator)))?;

    if modulus < BigUint::from(2u32) {
        return Err(malformed(format!("modulus {} is below 2", modulus)));
    }
    if generator >= modulus {
        return Err(malformed(format!("generator {} is not below modulus", generator)));
    }
    Ok(DhParameters::new(modulus, generator))
}

/// Encode a public value as its decimal string
pub fn encode_public_value(value: &BigUint) -> Vec<u8> {
    value.to_string().into_bytes()
}

/// Decode a public value, which must lie below `modulus`
pub fn decode_public_value(payload: &[u8], modulus: &BigUint) -> Result<BigUint> {
    let malformed = |msg: String| Error::KeyExchangeFailed(KeyExchangeError::MalformedPublicValue(msg));

    let text = std::str::from_utf8(payload).map_err(|e| malformed(format!("not UTF-8: {}", e)))?;
    let value = parse_decimal(text).ok_or_else(|| malformed(format!("bad value {:?}", text)))?;
    if &value >= modulus {
        return Err(malformed(format!("value {} is not below modulus", value)));
    }
    Ok(value)
}

/// Plain ASCII digits only; no sign, whitespace or radix prefix.
fn parse_decimal(text: &str) -> Option<BigUint> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(text.as_bytes(), 10)
}
