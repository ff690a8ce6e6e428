use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::Result;

/// Attestation id as it appears on the wire: a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AttestationTag {
    Number(i64),
    Text(String),
}

impl Default for AttestationTag {
    fn default() -> Self {
        AttestationTag::Number(0)
    }
}

impl AttestationTag {
    /// Integer tag; a non-numeric string maps to 0, which no kind uses.
    pub fn value(&self) -> i64 {
        match self {
            AttestationTag::Number(n) => *n,
            AttestationTag::Text(s) => s.trim().parse().unwrap_or_else(|_| {
                warn!(attestation_id = %s, "Non-numeric attestation id, treating as 0");
                0
            }),
        }
    }
}

/// Proof envelope saved by the capture endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedProof {
    #[serde(default)]
    pub attestation_id: AttestationTag,
    pub proof: Value,
    pub public_signals: Vec<String>,
    #[serde(default)]
    pub proof_id: String,
    #[serde(default)]
    pub captured_at: String,
}

impl CapturedProof {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        crate::utils::parse_json(bytes, "captured proof")
    }
}
