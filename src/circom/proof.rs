use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{BridgeError, Result};

/// Projective `Z` appended to G1 points (`a`, `c`).
pub const G1_PROJECTIVE_ONE: &str = "1";
/// Projective `Z` row appended to the G2 point (`b`).
pub const G2_PROJECTIVE_ONE: [&str; 2] = ["1", "0"];

/// Affine proof groups as sent by the identity app: `a`, `b`, `c` with no `Z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactProof {
    pub a: Vec<String>,
    pub b: Vec<Vec<String>>,
    pub c: Vec<String>,
    pub protocol: String,
    pub curve: Option<String>,
}

/// snarkjs proof layout (`pi_a`, `pi_b`, `pi_c`), projective `Z` included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalProof {
    pub pi_a: Vec<String>,
    pub pi_b: Vec<Vec<String>>,
    pub pi_c: Vec<String>,
    #[serde(default)]
    pub protocol: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawProof {
    Compact(CompactProof),
    Canonical(CanonicalProof),
}

/// Both wire shapes overlaid; only used to resolve which one is present.
#[derive(Debug, Default, Deserialize)]
struct WireProof {
    #[serde(default)]
    a: Vec<String>,
    #[serde(default)]
    b: Vec<Vec<String>>,
    #[serde(default)]
    c: Vec<String>,
    #[serde(default)]
    pi_a: Vec<String>,
    #[serde(default)]
    pi_b: Vec<Vec<String>>,
    #[serde(default)]
    pi_c: Vec<String>,
    #[serde(default)]
    protocol: Option<String>,
    #[serde(default)]
    curve: Option<String>,
}

impl RawProof {
    /// Detect the wire shape of a proof object.
    ///
    /// A non-empty `pi_a` wins over `a` when both are present.
    pub fn from_json(value: &Value) -> Result<Self> {
        let wire = WireProof::deserialize(value)
            .map_err(|source| BridgeError::MalformedJson {
                what: "proof",
                source,
            })?;
        Self::from_wire(wire)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let wire: WireProof = crate::utils::parse_json(bytes, "proof")?;
        Self::from_wire(wire)
    }

    fn from_wire(wire: WireProof) -> Result<Self> {
        let protocol = wire.protocol.unwrap_or_default();

        if !wire.pi_a.is_empty() {
            return Ok(RawProof::Canonical(CanonicalProof {
                pi_a: wire.pi_a,
                pi_b: wire.pi_b,
                pi_c: wire.pi_c,
                protocol,
            }));
        }

        if !wire.a.is_empty() {
            return Ok(RawProof::Compact(CompactProof {
                a: wire.a,
                b: wire.b,
                c: wire.c,
                protocol,
                curve: wire.curve,
            }));
        }

        Err(BridgeError::UnknownProofFormat)
    }

    pub fn format_name(&self) -> &'static str {
        match self {
            RawProof::Compact(_) => "compact (a/b/c)",
            RawProof::Canonical(_) => "snarkjs (pi_a/pi_b/pi_c)",
        }
    }
}

impl CompactProof {
    /// Append the projective identity coordinate to every group.
    ///
    /// Rows of `b` keep their order; `["1","0"]` becomes the last row.
    pub fn into_canonical(self) -> CanonicalProof {
        let mut pi_a = self.a;
        pi_a.push(G1_PROJECTIVE_ONE.to_string());

        let mut pi_c = self.c;
        pi_c.push(G1_PROJECTIVE_ONE.to_string());

        let mut pi_b = self.b;
        pi_b.push(G2_PROJECTIVE_ONE.iter().map(|s| s.to_string()).collect());

        CanonicalProof {
            pi_a,
            pi_b,
            pi_c,
            protocol: self.protocol,
        }
    }
}

/// Bring either wire shape into the snarkjs layout.
pub fn normalize(raw: RawProof) -> CanonicalProof {
    match raw {
        RawProof::Canonical(proof) => {
            info!("Detected snarkjs format (pi_a/pi_b/pi_c)");
            proof
        }
        RawProof::Compact(proof) => {
            info!("Detected compact format (a/b/c), converting to snarkjs (pi_a/pi_b/pi_c)");
            proof.into_canonical()
        }
    }
}
