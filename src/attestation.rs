//! Attestation kinds and verification-key auto-selection.

use std::path::{Path, PathBuf};

use crate::error::{BridgeError, Result};

/// Directory name searched next to the proofs directory when no `--vk-dir` is set.
pub const DEFAULT_VKEY_DIR: &str = "self-vkeys";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttestationKind {
    EPassport,
    EuIdCard,
    Aadhaar,
}

impl AttestationKind {
    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            1 => Some(AttestationKind::EPassport),
            2 => Some(AttestationKind::EuIdCard),
            3 => Some(AttestationKind::Aadhaar),
            _ => None,
        }
    }

    pub fn tag(self) -> i64 {
        match self {
            AttestationKind::EPassport => 1,
            AttestationKind::EuIdCard => 2,
            AttestationKind::Aadhaar => 3,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AttestationKind::EPassport => "E-PASSPORT",
            AttestationKind::EuIdCard => "EU_ID_CARD",
            AttestationKind::Aadhaar => "AADHAAR",
        }
    }

    /// Whether the revealed data carries an MRZ byte layout.
    pub fn has_mrz_layout(self) -> bool {
        !matches!(self, AttestationKind::Aadhaar)
    }
}

/// Display name for a raw tag, `"unknown"` for unrecognized ones.
pub fn attestation_name(tag: i64) -> &'static str {
    AttestationKind::from_tag(tag)
        .map(AttestationKind::display_name)
        .unwrap_or("unknown")
}

/// Kind -> verification key file name table.
#[derive(Debug, Clone)]
pub struct VkeyRegistry {
    entries: Vec<(AttestationKind, String)>,
}

impl Default for VkeyRegistry {
    fn default() -> Self {
        Self::new([
            (AttestationKind::EPassport, "vc_and_disclose.json"),
            (AttestationKind::EuIdCard, "vc_and_disclose_id.json"),
            (AttestationKind::Aadhaar, "vc_and_disclose_aadhaar.json"),
        ])
    }
}

impl VkeyRegistry {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (AttestationKind, S)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(kind, file)| (kind, file.into()))
                .collect(),
        }
    }

    pub fn file_for(&self, kind: AttestationKind) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, file)| file.as_str())
    }
}

/// Computes the key path for an attestation tag. Never touches the filesystem.
#[derive(Debug, Clone, Default)]
pub struct VkeySelector {
    registry: VkeyRegistry,
    vk_dir: Option<PathBuf>,
}

impl VkeySelector {
    pub fn new(registry: VkeyRegistry, vk_dir: Option<PathBuf>) -> Self {
        Self { registry, vk_dir }
    }

    /// `<vk_dir>/<file>`, or `<dir of proof>/../self-vkeys/<file>` without a `vk_dir`.
    pub fn resolve(&self, tag: i64, proof_path: &Path) -> Result<PathBuf> {
        let file = AttestationKind::from_tag(tag)
            .and_then(|kind| self.registry.file_for(kind))
            .ok_or(BridgeError::UnknownAttestationId(tag))?;

        let dir = match &self.vk_dir {
            Some(dir) => dir.clone(),
            None => proof_path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join("..")
                .join(DEFAULT_VKEY_DIR),
        };

        Ok(dir.join(file))
    }
}
