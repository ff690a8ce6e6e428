use std::{
    fs::{self, create_dir_all},
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::{
    decode::DecodedIdentity,
    error::{BridgeError, Result},
    gnark::{
        proof_blob, proof_from_blob, public_inputs_from_bytes, public_inputs_to_bytes,
        vk_from_compressed, vk_to_compressed, PROOF_BLOB_LEN,
    },
    utils::FIELD_ELEMENT_LEN,
    verifier::{Groth16Bundle, ProofVerifier},
};

pub const PROOF_FILE: &str = "proof.bin";
pub const VK_FILE: &str = "vk.bin";
pub const PUBLIC_INPUTS_FILE: &str = "public_inputs.bin";
pub const IDENTITY_FILE: &str = "identity.json";

/// Attestation id plus whatever fields were decoded (possibly none).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentitySummary {
    pub attestation_id: i64,
    pub fields: DecodedIdentity,
}

impl IdentitySummary {
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("attestation_id".into(), Value::from(self.attestation_id));
        for (key, value) in &self.fields {
            map.insert(key.clone(), Value::String(value.clone()));
        }
        Value::Object(map)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub bytes: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub proof: ExportedFile,
    pub vk: ExportedFile,
    pub public_inputs: ExportedFile,
    pub identity: ExportedFile,
}

impl ExportReport {
    pub fn files(&self) -> [&ExportedFile; 4] {
        [&self.proof, &self.vk, &self.public_inputs, &self.identity]
    }
}

fn write_artifact(path: PathBuf, bytes: &[u8]) -> Result<ExportedFile> {
    fs::write(&path, bytes).map_err(|source| BridgeError::ArtifactWriteFailure {
        path: path.clone(),
        source,
    })?;

    let sha256 = hex::encode(Sha256::digest(bytes));
    info!(
        bytes = bytes.len(),
        sha256 = %sha256,
        "Saved {} to: {}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or_default(),
        path.display()
    );

    Ok(ExportedFile {
        path,
        bytes: bytes.len(),
        sha256,
    })
}

/// Write the verified artifacts in gnark's binary layout, plus `identity.json`.
pub fn export_artifacts(
    dir: &Path,
    bundle: &Groth16Bundle,
    identity: &IdentitySummary,
) -> Result<ExportReport> {
    create_dir_all(dir).map_err(|source| BridgeError::ArtifactWriteFailure {
        path: dir.to_path_buf(),
        source,
    })?;

    let proof = write_artifact(dir.join(PROOF_FILE), &proof_blob(&bundle.proof))?;
    let vk = write_artifact(dir.join(VK_FILE), &vk_to_compressed(&bundle.vk))?;
    let public_inputs = write_artifact(
        dir.join(PUBLIC_INPUTS_FILE),
        &public_inputs_to_bytes(&bundle.public_inputs),
    )?;

    let json = serde_json::to_vec_pretty(&identity.to_json()).map_err(|e| {
        BridgeError::ArtifactWriteFailure {
            path: dir.join(IDENTITY_FILE),
            source: e.into(),
        }
    })?;
    let identity = write_artifact(dir.join(IDENTITY_FILE), &json)?;

    Ok(ExportReport {
        proof,
        vk,
        public_inputs,
        identity,
    })
}

fn read_artifact(dir: &Path, name: &str) -> Result<Vec<u8>> {
    let path = dir.join(name);
    fs::read(&path)
        .map_err(|e| BridgeError::ExportCheckFailure(format!("cannot read {}: {e}", path.display())))
}

/// Re-read the exported binaries, decode them and verify again.
pub fn check_export(dir: &Path, verifier: &dyn ProofVerifier) -> Result<()> {
    let proof_bytes = read_artifact(dir, PROOF_FILE)?;
    if proof_bytes.len() != PROOF_BLOB_LEN {
        return Err(BridgeError::ExportCheckFailure(format!(
            "{PROOF_FILE} is {} bytes, expected {PROOF_BLOB_LEN}",
            proof_bytes.len()
        )));
    }
    let inputs_bytes = read_artifact(dir, PUBLIC_INPUTS_FILE)?;
    if inputs_bytes.len() % FIELD_ELEMENT_LEN != 0 {
        return Err(BridgeError::ExportCheckFailure(format!(
            "{PUBLIC_INPUTS_FILE} is {} bytes, not a multiple of {FIELD_ELEMENT_LEN}",
            inputs_bytes.len()
        )));
    }
    let vk_bytes = read_artifact(dir, VK_FILE)?;

    let bundle = Groth16Bundle {
        proof: proof_from_blob(&proof_bytes).map_err(BridgeError::ExportCheckFailure)?,
        vk: vk_from_compressed(&vk_bytes).map_err(BridgeError::ExportCheckFailure)?,
        public_inputs: public_inputs_from_bytes(&inputs_bytes)
            .map_err(BridgeError::ExportCheckFailure)?,
    };

    if bundle.public_inputs.len() + 1 != bundle.vk.gamma_abc_g1.len() {
        return Err(BridgeError::ExportCheckFailure(format!(
            "{} public inputs but key has {} IC points",
            bundle.public_inputs.len(),
            bundle.vk.gamma_abc_g1.len()
        )));
    }

    if !verifier.verify(&bundle)? {
        return Err(BridgeError::ExportCheckFailure(
            "decoded artifacts do not verify".into(),
        ));
    }

    info!(dir = %dir.display(), "Exported artifacts decode and verify");
    Ok(())
}
