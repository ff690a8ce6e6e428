//! Error types for the proof bridge

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Every failure the pipeline can hit. All of them are fatal for a run.
///
/// A proof that converts cleanly but does not verify is *not* an error; it is
/// reported as `Ok(false)` by the verifier.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Missing or unreadable input file
    #[error("failed to read {}: {source}", path.display())]
    InputReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is not valid JSON for the expected schema
    #[error("failed to parse {what}: {source}")]
    MalformedJson {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown proof format: neither 'a' nor 'pi_a' found")]
    UnknownProofFormat,

    #[error("unknown attestation ID {0}, provide --vk explicitly")]
    UnknownAttestationId(i64),

    #[error("proof has {signals} public signals but vkey expects {expected}, wrong vkey?")]
    PublicSignalMismatch { signals: usize, expected: usize },

    /// Proof or key cannot be mapped onto BN254 points / field elements
    #[error("failed to convert circom data to verifier types: {0}")]
    ConversionFailure(String),

    /// The Groth16 verifier itself errored (distinct from a negative verdict)
    #[error("verification error: {0}")]
    VerificationError(String),

    #[error("failed to write {}: {source}", path.display())]
    ArtifactWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is required")]
    MissingArgument(&'static str),

    /// Exported artifacts failed to decode or re-verify
    #[error("exported artifacts failed self-check: {0}")]
    ExportCheckFailure(String),
}

impl BridgeError {
    pub(crate) fn conversion(reason: impl Into<String>) -> Self {
        BridgeError::ConversionFailure(reason.into())
    }
}
