//! Bridge from Self-protocol identity proofs to gnark-compatible artifacts
//!
//! This library:
//! - Detects and normalizes the two snarkjs Groth16 proof wire formats
//! - Verifies proofs over BN254 with arkworks
//! - Decodes MRZ identity fields packed into the public signals
//! - Exports proof, verifying key and public inputs in gnark's binary layout
//!
//! The verifier sits behind the [`ProofVerifier`] trait; [`pipeline::run`]
//! drives one run end to end.

pub mod attestation;
pub mod circom;
pub mod decode;
pub mod error;
pub mod export;
pub mod gnark;
pub mod pipeline;
pub mod utils;
pub mod verifier;

// Re-export commonly used types and functions
pub use attestation::{attestation_name, AttestationKind, VkeyRegistry, VkeySelector};
pub use circom::{normalize, CanonicalProof, CapturedProof, CircomVerificationKey, RawProof};
pub use decode::{decode_identity, DecodedIdentity};
pub use error::{BridgeError, Result};
pub use export::{
    check_export, export_artifacts, ExportReport, IdentitySummary, IDENTITY_FILE, PROOF_FILE,
    PUBLIC_INPUTS_FILE, VK_FILE,
};
pub use gnark::PROOF_BLOB_LEN;
pub use pipeline::{PipelineOptions, PipelineReport, ProofInput};
pub use utils::FIELD_ELEMENT_LEN;
pub use verifier::{
    convert, validate_arity, verify_bundle, Groth16Bundle, Groth16Verifier, ProofVerifier,
    VerificationOutcome,
};
