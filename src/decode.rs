//! Unpacking of revealed MRZ data from public signals.
//!
//! The disclosure circuits pack the revealed document bytes into the first
//! public signals, 31 bytes per field element (the last one holds a single
//! byte), least significant byte first.

use std::collections::BTreeMap;

use num_bigint::BigUint;
use tracing::{debug, warn};

use crate::utils::{low_bytes_le, parse_decimal};

/// Bytes carried by each packed signal.
pub const BYTES_PER_ELEMENT: [usize; 4] = [31, 31, 31, 1];

/// Fields are only extracted when at least this many bytes were unpacked.
pub const MIN_DECODED_LEN: usize = 92;

const ISSUING_STATE: (usize, usize) = (2, 5);
const DOB: (usize, usize) = (30, 36);
const NATIONALITY: (usize, usize) = (45, 48);
const NAME: (usize, usize) = (60, 90);
const OLDER_THAN: (usize, usize) = (90, 92);

/// Decoded identity attributes, keyed by field name.
pub type DecodedIdentity = BTreeMap<String, String>;

/// Concatenate the packed bytes of the first `min(4, signals.len())` signals.
pub fn unpack_revealed_bytes(signals: &[String]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(BYTES_PER_ELEMENT.iter().sum());

    for (signal, &count) in signals.iter().zip(BYTES_PER_ELEMENT.iter()) {
        let value = parse_decimal(signal).unwrap_or_else(|| {
            warn!(signal = %signal, "Public signal is not a decimal, unpacking as zero");
            BigUint::default()
        });
        bytes.extend(low_bytes_le(&value, count));
    }

    bytes
}

/// Decode MRZ identity fields from public signals.
///
/// Returns an empty map when fewer than 92 bytes could be unpacked.
pub fn decode_identity(signals: &[String]) -> DecodedIdentity {
    let bytes = unpack_revealed_bytes(signals);
    debug!(decoded_bytes = bytes.len(), "Unpacked revealed data from public signals");
    decode_mrz_bytes(&bytes)
}

/// Extract fields from an unpacked MRZ buffer.
pub fn decode_mrz_bytes(bytes: &[u8]) -> DecodedIdentity {
    let mut result = DecodedIdentity::new();
    if bytes.len() < MIN_DECODED_LEN {
        return result;
    }

    let field = |(start, end): (usize, usize)| {
        trim_padding(&String::from_utf8_lossy(&bytes[start..end])).to_string()
    };

    result.insert("issuing_state".into(), field(ISSUING_STATE));
    result.insert("dob".into(), field(DOB));
    result.insert("nationality".into(), field(NATIONALITY));

    let name_raw = String::from_utf8_lossy(&bytes[NAME.0..NAME.1]);
    let name = name_raw.trim_end_matches(&['\0', ' ', '<'][..]);
    let mut parts = name.splitn(2, "<<");
    let surname = parts.next().unwrap_or_default();
    result.insert("surname".into(), surname.trim_end_matches('<').to_string());
    if let Some(given) = parts.next() {
        result.insert(
            "given_name".into(),
            given.trim_end_matches('<').replace('<', " "),
        );
    }

    result.insert("older_than".into(), field(OLDER_THAN));
    result
}

fn trim_padding(value: &str) -> &str {
    value.trim_end_matches(&['\0', ' '][..])
}
