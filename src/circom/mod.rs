//! snarkjs/circom JSON shapes: proofs in either wire format, verification
//! keys, public signals, and the captured-proof envelope.

pub mod capture;
pub mod proof;
pub mod vkey;

pub use capture::{AttestationTag, CapturedProof};
pub use proof::{normalize, CanonicalProof, CompactProof, RawProof};
pub use vkey::{parse_public_signals, CircomVerificationKey};
