//! One run of the bridge: load, normalize, validate, convert, verify, then
//! optionally decode and export.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, warn};

use crate::{
    attestation::{attestation_name, AttestationKind, VkeyRegistry, VkeySelector},
    circom::{normalize, parse_public_signals, CapturedProof, CircomVerificationKey, RawProof},
    decode::{decode_identity, DecodedIdentity},
    error::{BridgeError, Result},
    export::{check_export, export_artifacts, ExportReport, IdentitySummary},
    utils::{parse_json, read_input},
    verifier::{convert_timed, validate_arity, verify_bundle, ProofVerifier, VerificationOutcome},
};

/// Where the proof comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofInput {
    /// Envelope saved by the capture endpoint (proof, signals and attestation id).
    Captured(PathBuf),
    /// Bare snarkjs `proof.json` plus `public.json`.
    Standalone {
        proof: PathBuf,
        public_signals: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub input: ProofInput,
    /// Explicit verification key; skips auto-selection.
    pub vk_path: Option<PathBuf>,
    /// Directory searched by auto-selection instead of `<proof dir>/../self-vkeys`.
    pub vk_dir: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub decode: bool,
    /// Re-read and re-verify exported artifacts. Ignored without `export_dir`.
    pub check_export: bool,
}

impl PipelineOptions {
    pub fn new(input: ProofInput) -> Self {
        Self {
            input,
            vk_path: None,
            vk_dir: None,
            export_dir: None,
            decode: false,
            check_export: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub attestation_id: i64,
    pub proof_format: &'static str,
    pub verification: VerificationOutcome,
    /// Present when decoding was requested and the proof verified.
    pub identity: Option<DecodedIdentity>,
    /// Present when export was requested and the proof verified.
    pub export: Option<ExportReport>,
}

/// Proof object and signals before the key is known.
struct LoadedProof {
    attestation_id: i64,
    proof: Value,
    signals: Option<Vec<String>>,
    signals_path: Option<PathBuf>,
}

fn load_captured(path: &Path) -> Result<LoadedProof> {
    let captured = CapturedProof::from_slice(&read_input(path)?)?;
    let attestation_id = captured.attestation_id.value();
    info!(
        proof_id = %captured.proof_id,
        captured_at = %captured.captured_at,
        attestation_id,
        attestation = attestation_name(attestation_id),
        "Loaded captured proof from: {}",
        path.display()
    );

    Ok(LoadedProof {
        attestation_id,
        proof: captured.proof,
        signals: Some(captured.public_signals),
        signals_path: None,
    })
}

fn load_standalone(proof: &Path, public_signals: &Path) -> Result<LoadedProof> {
    let value: Value = parse_json(&read_input(proof)?, "proof")?;
    info!("Loaded proof from: {}", proof.display());

    Ok(LoadedProof {
        attestation_id: 0,
        proof: value,
        signals: None,
        signals_path: Some(public_signals.to_path_buf()),
    })
}

fn resolve_vk_path(options: &PipelineOptions, attestation_id: i64) -> Result<PathBuf> {
    if let Some(path) = &options.vk_path {
        return Ok(path.clone());
    }

    match &options.input {
        ProofInput::Captured(proof_path) => {
            let selector = VkeySelector::new(VkeyRegistry::default(), options.vk_dir.clone());
            let path = selector.resolve(attestation_id, proof_path)?;
            info!(
                attestation = attestation_name(attestation_id),
                "Auto-selected vkey: {}",
                path.display()
            );
            Ok(path)
        }
        ProofInput::Standalone { .. } => Err(BridgeError::MissingArgument("--vk")),
    }
}

/// Run the whole pipeline once.
///
/// A proof that converts but does not verify is returned as a report with
/// `verification.verified == false`; decoding and export are skipped then.
pub fn run(options: &PipelineOptions, verifier: &dyn ProofVerifier) -> Result<PipelineReport> {
    let loaded = match &options.input {
        ProofInput::Captured(path) => load_captured(path)?,
        ProofInput::Standalone {
            proof,
            public_signals,
        } => load_standalone(proof, public_signals)?,
    };

    let vk_path = resolve_vk_path(options, loaded.attestation_id)?;
    let vk_bytes = read_input(&vk_path)?;

    let raw = RawProof::from_json(&loaded.proof)?;
    let proof_format = raw.format_name();
    let proof = normalize(raw);
    info!(protocol = %proof.protocol, "Proof protocol");

    let vk = CircomVerificationKey::from_slice(&vk_bytes)?;
    info!(
        curve = %vk.curve,
        n_public = vk.n_public,
        ic_len = vk.ic.len(),
        "Loaded vkey from: {}",
        vk_path.display()
    );

    let signals = match (loaded.signals, &loaded.signals_path) {
        (Some(signals), _) => signals,
        (None, Some(path)) => parse_public_signals(&read_input(path)?)?,
        (None, None) => return Err(BridgeError::MissingArgument("--public-signals")),
    };
    info!(count = signals.len(), "Public signals");

    validate_arity(&signals, &vk)?;

    let bundle = convert_timed(&proof, &vk, &signals)?;
    let verification = verify_bundle(verifier, &bundle)?;

    let mut report = PipelineReport {
        attestation_id: loaded.attestation_id,
        proof_format,
        verification,
        identity: None,
        export: None,
    };
    if !verification.verified {
        return Ok(report);
    }

    if options.decode {
        if AttestationKind::from_tag(loaded.attestation_id)
            .is_some_and(|kind| !kind.has_mrz_layout())
        {
            warn!(
                attestation = attestation_name(loaded.attestation_id),
                "MRZ layout is unconfirmed for this attestation kind, decoded fields may be garbage"
            );
        }
        report.identity = Some(decode_identity(&signals));
    }

    if let Some(dir) = &options.export_dir {
        let summary = IdentitySummary {
            attestation_id: loaded.attestation_id,
            fields: report.identity.clone().unwrap_or_default(),
        };
        report.export = Some(export_artifacts(dir, &bundle, &summary)?);

        if options.check_export {
            check_export(dir, verifier)?;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::Groth16Bundle;
    use std::{cell::Cell, fs};
    use tempfile::tempdir;

    struct Counting {
        calls: Cell<usize>,
    }

    impl ProofVerifier for Counting {
        fn verify(&self, _bundle: &Groth16Bundle) -> Result<bool> {
            self.calls.set(self.calls.get() + 1);
            Ok(true)
        }
    }

    const VK_JSON: &str = r#"{
        "protocol": "groth16",
        "curve": "bn128",
        "nPublic": 5,
        "vk_alpha_1": ["1", "2", "1"],
        "vk_beta_2": [["1", "0"], ["1", "0"], ["1", "0"]],
        "vk_gamma_2": [["1", "0"], ["1", "0"], ["1", "0"]],
        "vk_delta_2": [["1", "0"], ["1", "0"], ["1", "0"]],
        "IC": [["1", "2", "1"], ["1", "2", "1"], ["1", "2", "1"],
               ["1", "2", "1"], ["1", "2", "1"], ["1", "2", "1"]]
    }"#;

    #[test]
    fn test_arity_mismatch_never_reaches_verifier() {
        let dir = tempdir().unwrap();
        let proof_path = dir.path().join("proof.json");
        let vk_path = dir.path().join("vk.json");
        fs::write(
            &proof_path,
            r#"{"attestationId": 2,
                "proof": {"a": ["1", "2"], "b": [["1", "0"], ["1", "0"]], "c": ["1", "2"]},
                "publicSignals": ["1", "2", "3", "4"]}"#,
        )
        .unwrap();
        fs::write(&vk_path, VK_JSON).unwrap();

        let mut options = PipelineOptions::new(ProofInput::Captured(proof_path));
        options.vk_path = Some(vk_path);
        let verifier = Counting {
            calls: Cell::new(0),
        };

        let err = run(&options, &verifier).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::PublicSignalMismatch {
                signals: 4,
                expected: 5
            }
        ));
        assert_eq!(verifier.calls.get(), 0);
    }

    #[test]
    fn test_unknown_attestation_without_vk() {
        let dir = tempdir().unwrap();
        let proof_path = dir.path().join("proof.json");
        fs::write(
            &proof_path,
            r#"{"attestationId": 99, "proof": {"a": ["1", "2"]}, "publicSignals": []}"#,
        )
        .unwrap();

        let verifier = Counting {
            calls: Cell::new(0),
        };
        let err = run(&PipelineOptions::new(ProofInput::Captured(proof_path)), &verifier)
            .unwrap_err();
        assert!(matches!(err, BridgeError::UnknownAttestationId(99)));
    }

    #[test]
    fn test_standalone_requires_vk() {
        let dir = tempdir().unwrap();
        let proof = dir.path().join("proof.json");
        fs::write(&proof, r#"{"a": ["1", "2"]}"#).unwrap();
        let options = PipelineOptions::new(ProofInput::Standalone {
            proof,
            public_signals: dir.path().join("public.json"),
        });

        let verifier = Counting {
            calls: Cell::new(0),
        };
        assert!(matches!(
            run(&options, &verifier),
            Err(BridgeError::MissingArgument("--vk"))
        ));
    }

    #[test]
    fn test_missing_vk_file_is_read_failure() {
        let dir = tempdir().unwrap();
        let proofs = dir.path().join("proofs");
        fs::create_dir_all(&proofs).unwrap();
        let proof_path = proofs.join("p.json");
        fs::write(
            &proof_path,
            r#"{"attestationId": "1", "proof": {"a": ["1", "2"]}, "publicSignals": []}"#,
        )
        .unwrap();

        let verifier = Counting {
            calls: Cell::new(0),
        };
        match run(&PipelineOptions::new(ProofInput::Captured(proof_path)), &verifier) {
            Err(BridgeError::InputReadFailure { path, .. }) => {
                assert_eq!(
                    path,
                    proofs.join("..").join("self-vkeys").join("vc_and_disclose.json")
                );
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
