use serde::{Deserialize, Serialize};

/// snarkjs `verification_key.json` for a Groth16 circuit.
///
/// Points carry the projective coordinate as their last entry, like proofs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircomVerificationKey {
    #[serde(default)]
    pub protocol: String,
    pub curve: String,
    #[serde(rename = "nPublic")]
    pub n_public: usize,
    pub vk_alpha_1: Vec<String>,
    pub vk_beta_2: Vec<Vec<String>>,
    pub vk_gamma_2: Vec<Vec<String>>,
    pub vk_delta_2: Vec<Vec<String>>,
    #[serde(rename = "IC")]
    pub ic: Vec<Vec<String>>,
}

impl CircomVerificationKey {
    pub fn from_slice(bytes: &[u8]) -> crate::error::Result<Self> {
        crate::utils::parse_json(bytes, "verification key")
    }

    /// Whether the curve tag names BN254 (snarkjs calls it `bn128`).
    pub fn is_bn254(&self) -> bool {
        matches!(self.curve.to_ascii_lowercase().as_str(), "bn128" | "bn254")
    }
}

/// Public signals file: a JSON array of decimal strings.
pub fn parse_public_signals(bytes: &[u8]) -> crate::error::Result<Vec<String>> {
    crate::utils::parse_json(bytes, "public signals")
}
