use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use serde::de::DeserializeOwned;
use std::{fs, path::Path};

use crate::error::{BridgeError, Result};

/// Width of a serialized BN254 field element.
pub const FIELD_ELEMENT_LEN: usize = 32;

/// Read a whole input file, tagging failures with the path.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| BridgeError::InputReadFailure {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse JSON bytes into `T`; `what` names the document in error messages.
pub fn parse_json<T: DeserializeOwned>(bytes: &[u8], what: &'static str) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|source| BridgeError::MalformedJson { what, source })
}

/// Parse a base-10 unsigned integer. Surrounding whitespace is not accepted.
pub fn parse_decimal(value: &str) -> Option<BigUint> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(value.as_bytes(), 10)
}

/// Convert a decimal string into a field element, rejecting values that are
/// not already reduced modulo the field order.
pub fn decimal_to_field<F: PrimeField>(value: &str, what: &str) -> Result<F> {
    let parsed = parse_decimal(value)
        .ok_or_else(|| BridgeError::conversion(format!("{what}: '{value}' is not a decimal")))?;

    let modulus: BigUint = F::MODULUS.into();
    if parsed >= modulus {
        return Err(BridgeError::conversion(format!(
            "{what}: value exceeds the field modulus"
        )));
    }

    Ok(F::from(parsed))
}

/// Convert each decimal string into a field element.
pub fn decimals_to_fields<F: PrimeField>(values: &[String], what: &str) -> Result<Vec<F>> {
    values
        .iter()
        .enumerate()
        .map(|(idx, v)| decimal_to_field(v, &format!("{what}[{idx}]")))
        .collect()
}

/// Big-endian encoding of a field element, left-padded to 32 bytes.
pub fn field_to_be_bytes<F: PrimeField>(value: &F) -> [u8; FIELD_ELEMENT_LEN] {
    let bytes = value.into_bigint().to_bytes_be();
    let mut padded = [0u8; FIELD_ELEMENT_LEN];
    let start = FIELD_ELEMENT_LEN.saturating_sub(bytes.len());
    let skip = bytes.len().saturating_sub(FIELD_ELEMENT_LEN);
    padded[start..].copy_from_slice(&bytes[skip..]);
    padded
}

/// Interpret 32 big-endian bytes as a field element, rejecting non-canonical values.
pub fn field_from_be_bytes<F: PrimeField>(bytes: &[u8]) -> Option<F> {
    let value = BigUint::from_bytes_be(bytes);
    let modulus: BigUint = F::MODULUS.into();
    if value >= modulus {
        return None;
    }
    Some(F::from(value))
}

/// The low `count` bytes of `value`, least significant first.
///
/// Byte `j` equals `(value >> 8j) & 0xFF`; positions past the integer's own
/// length are zero and anything above `count` bytes is dropped.
pub fn low_bytes_le(value: &BigUint, count: usize) -> Vec<u8> {
    let le = value.to_bytes_le();
    (0..count).map(|j| le.get(j).copied().unwrap_or(0)).collect()
}
