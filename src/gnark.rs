//! gnark (BN254) binary encodings of Groth16 proofs, verifying keys and
//! public inputs.
//!
//! Coordinates are 32-byte big-endian. The two most significant bits of the
//! first byte of a point carry gnark's encoding flags:
//!
//! | bits | meaning                          |
//! |------|----------------------------------|
//! | `00` | uncompressed                     |
//! | `01` | point at infinity                |
//! | `10` | compressed, smallest `y`         |
//! | `11` | compressed, lexicographically largest `y` |
//!
//! G2 coordinates are written imaginary part first (`A1 ‖ A0`).

use ark_bn254::{Bn254, Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_ff::{PrimeField, Zero};
use ark_groth16::{Proof, VerifyingKey};

use crate::utils::{field_from_be_bytes, field_to_be_bytes, FIELD_ELEMENT_LEN};

const MASK: u8 = 0b11 << 6;
const UNCOMPRESSED: u8 = 0b00 << 6;
const INFINITY: u8 = 0b01 << 6;
const COMPRESSED_SMALLEST: u8 = 0b10 << 6;
const COMPRESSED_LARGEST: u8 = 0b11 << 6;

pub const G1_RAW_LEN: usize = 2 * FIELD_ELEMENT_LEN;
pub const G2_RAW_LEN: usize = 4 * FIELD_ELEMENT_LEN;
pub const G1_COMPRESSED_LEN: usize = FIELD_ELEMENT_LEN;
pub const G2_COMPRESSED_LEN: usize = 2 * FIELD_ELEMENT_LEN;

/// `Ar ‖ Bs ‖ Krs`, the part of the raw proof encoding that carries the proof itself.
pub const PROOF_BLOB_LEN: usize = G1_RAW_LEN + G2_RAW_LEN + G1_RAW_LEN;

/// Fixed prefix of the compressed key: `[α]1 [β]1 [β]2 [γ]2 [δ]1 [δ]2`.
const VK_POINTS_LEN: usize = 3 * G1_COMPRESSED_LEN + 3 * G2_COMPRESSED_LEN;

fn is_lexicographically_largest(value: &Fq) -> bool {
    value.into_bigint() > (-*value).into_bigint()
}

fn is_lexicographically_largest_fq2(value: &Fq2) -> bool {
    if value.c1.is_zero() {
        is_lexicographically_largest(&value.c0)
    } else {
        is_lexicographically_largest(&value.c1)
    }
}

/// Uncompressed encoding; infinity is all zeros, there is no flag for it.
pub fn g1_to_raw(p: &G1Affine) -> [u8; G1_RAW_LEN] {
    let mut out = [0u8; G1_RAW_LEN];
    if p.is_zero() {
        return out;
    }
    out[..32].copy_from_slice(&field_to_be_bytes(&p.x));
    out[32..].copy_from_slice(&field_to_be_bytes(&p.y));
    out
}

pub fn g2_to_raw(p: &G2Affine) -> [u8; G2_RAW_LEN] {
    let mut out = [0u8; G2_RAW_LEN];
    if p.is_zero() {
        return out;
    }
    out[..32].copy_from_slice(&field_to_be_bytes(&p.x.c1));
    out[32..64].copy_from_slice(&field_to_be_bytes(&p.x.c0));
    out[64..96].copy_from_slice(&field_to_be_bytes(&p.y.c1));
    out[96..].copy_from_slice(&field_to_be_bytes(&p.y.c0));
    out
}

pub fn g1_to_compressed(p: &G1Affine) -> [u8; G1_COMPRESSED_LEN] {
    let mut out = [0u8; G1_COMPRESSED_LEN];
    if p.is_zero() {
        out[0] = INFINITY;
        return out;
    }
    out.copy_from_slice(&field_to_be_bytes(&p.x));
    out[0] |= if is_lexicographically_largest(&p.y) {
        COMPRESSED_LARGEST
    } else {
        COMPRESSED_SMALLEST
    };
    out
}

pub fn g2_to_compressed(p: &G2Affine) -> [u8; G2_COMPRESSED_LEN] {
    let mut out = [0u8; G2_COMPRESSED_LEN];
    if p.is_zero() {
        out[0] = INFINITY;
        return out;
    }
    out[..32].copy_from_slice(&field_to_be_bytes(&p.x.c1));
    out[32..].copy_from_slice(&field_to_be_bytes(&p.x.c0));
    out[0] |= if is_lexicographically_largest_fq2(&p.y) {
        COMPRESSED_LARGEST
    } else {
        COMPRESSED_SMALLEST
    };
    out
}

fn read_fq(bytes: &[u8], what: &str) -> Result<Fq, String> {
    field_from_be_bytes(bytes).ok_or_else(|| format!("{what}: coordinate not canonical"))
}

fn check_infinity(bytes: &[u8], what: &str) -> Result<(), String> {
    if bytes[0] & !MASK != 0 || bytes[1..].iter().any(|b| *b != 0) {
        return Err(format!("{what}: infinity flag with non-zero coordinates"));
    }
    Ok(())
}

fn check_g1(p: G1Affine, what: &str) -> Result<G1Affine, String> {
    if !p.is_on_curve() || !p.is_in_correct_subgroup_assuming_on_curve() {
        return Err(format!("{what}: point not in G1"));
    }
    Ok(p)
}

fn check_g2(p: G2Affine, what: &str) -> Result<G2Affine, String> {
    if !p.is_on_curve() || !p.is_in_correct_subgroup_assuming_on_curve() {
        return Err(format!("{what}: point not in G2"));
    }
    Ok(p)
}

pub fn g1_from_raw(bytes: &[u8], what: &str) -> Result<G1Affine, String> {
    if bytes.len() != G1_RAW_LEN {
        return Err(format!("{what}: expected {G1_RAW_LEN} bytes"));
    }
    match bytes[0] & MASK {
        INFINITY => {
            check_infinity(bytes, what)?;
            Ok(G1Affine::zero())
        }
        UNCOMPRESSED if bytes.iter().all(|b| *b == 0) => Ok(G1Affine::zero()),
        UNCOMPRESSED => {
            let x = read_fq(&bytes[..32], what)?;
            let y = read_fq(&bytes[32..], what)?;
            check_g1(G1Affine::new_unchecked(x, y), what)
        }
        _ => Err(format!("{what}: expected an uncompressed point")),
    }
}

pub fn g2_from_raw(bytes: &[u8], what: &str) -> Result<G2Affine, String> {
    if bytes.len() != G2_RAW_LEN {
        return Err(format!("{what}: expected {G2_RAW_LEN} bytes"));
    }
    match bytes[0] & MASK {
        INFINITY => {
            check_infinity(bytes, what)?;
            Ok(G2Affine::zero())
        }
        UNCOMPRESSED if bytes.iter().all(|b| *b == 0) => Ok(G2Affine::zero()),
        UNCOMPRESSED => {
            let x = Fq2::new(read_fq(&bytes[32..64], what)?, read_fq(&bytes[..32], what)?);
            let y = Fq2::new(read_fq(&bytes[96..], what)?, read_fq(&bytes[64..96], what)?);
            check_g2(G2Affine::new_unchecked(x, y), what)
        }
        _ => Err(format!("{what}: expected an uncompressed point")),
    }
}

pub fn g1_from_compressed(bytes: &[u8], what: &str) -> Result<G1Affine, String> {
    if bytes.len() != G1_COMPRESSED_LEN {
        return Err(format!("{what}: expected {G1_COMPRESSED_LEN} bytes"));
    }
    let flag = bytes[0] & MASK;
    match flag {
        INFINITY => {
            check_infinity(bytes, what)?;
            return Ok(G1Affine::zero());
        }
        COMPRESSED_SMALLEST | COMPRESSED_LARGEST => {}
        _ => return Err(format!("{what}: expected a compressed point")),
    }

    let mut x_bytes = [0u8; G1_COMPRESSED_LEN];
    x_bytes.copy_from_slice(bytes);
    x_bytes[0] &= !MASK;
    let x = read_fq(&x_bytes, what)?;

    let mut p = G1Affine::get_point_from_x_unchecked(x, true)
        .ok_or_else(|| format!("{what}: x is not on the curve"))?;
    if is_lexicographically_largest(&p.y) != (flag == COMPRESSED_LARGEST) {
        p = -p;
    }
    check_g1(p, what)
}

pub fn g2_from_compressed(bytes: &[u8], what: &str) -> Result<G2Affine, String> {
    if bytes.len() != G2_COMPRESSED_LEN {
        return Err(format!("{what}: expected {G2_COMPRESSED_LEN} bytes"));
    }
    let flag = bytes[0] & MASK;
    match flag {
        INFINITY => {
            check_infinity(bytes, what)?;
            return Ok(G2Affine::zero());
        }
        COMPRESSED_SMALLEST | COMPRESSED_LARGEST => {}
        _ => return Err(format!("{what}: expected a compressed point")),
    }

    let mut x_bytes = [0u8; G2_COMPRESSED_LEN];
    x_bytes.copy_from_slice(bytes);
    x_bytes[0] &= !MASK;
    let x = Fq2::new(read_fq(&x_bytes[32..], what)?, read_fq(&x_bytes[..32], what)?);

    let mut p = G2Affine::get_point_from_x_unchecked(x, true)
        .ok_or_else(|| format!("{what}: x is not on the twist"))?;
    if is_lexicographically_largest_fq2(&p.y) != (flag == COMPRESSED_LARGEST) {
        p = -p;
    }
    check_g2(p, what)
}

/// gnark's raw proof encoding:
/// `Ar ‖ Bs ‖ Krs ‖ u32(len(commitments)) ‖ commitments ‖ commitmentPok`.
///
/// Circom proofs carry no commitments, so the tail is an empty list and a
/// zero proof of knowledge.
pub fn proof_to_raw(proof: &Proof<Bn254>) -> Vec<u8> {
    let mut out = Vec::with_capacity(PROOF_BLOB_LEN + 4 + G1_RAW_LEN);
    out.extend_from_slice(&g1_to_raw(&proof.a));
    out.extend_from_slice(&g2_to_raw(&proof.b));
    out.extend_from_slice(&g1_to_raw(&proof.c));
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&g1_to_raw(&G1Affine::zero()));
    out
}

/// First 256 bytes of the raw proof encoding (`Ar ‖ Bs ‖ Krs`).
pub fn proof_blob(proof: &Proof<Bn254>) -> [u8; PROOF_BLOB_LEN] {
    let raw = proof_to_raw(proof);
    let mut out = [0u8; PROOF_BLOB_LEN];
    out.copy_from_slice(&raw[..PROOF_BLOB_LEN]);
    out
}

pub fn proof_from_blob(bytes: &[u8]) -> Result<Proof<Bn254>, String> {
    if bytes.len() != PROOF_BLOB_LEN {
        return Err(format!(
            "proof blob must be exactly {PROOF_BLOB_LEN} bytes, got {}",
            bytes.len()
        ));
    }
    let a = g1_from_raw(&bytes[..G1_RAW_LEN], "Ar")?;
    let b = g2_from_raw(&bytes[G1_RAW_LEN..G1_RAW_LEN + G2_RAW_LEN], "Bs")?;
    let c = g1_from_raw(&bytes[G1_RAW_LEN + G2_RAW_LEN..], "Krs")?;
    Ok(Proof { a, b, c })
}

/// gnark's compressed verifying key encoding.
///
/// `[α]1 [β]1 [β]2 [γ]2 [δ]1 [δ]2 ‖ u32 ‖ [K]1… ‖ u32(0) ‖ u32(0)`. The two
/// trailing zero counts are the (empty) commitment bookkeeping lists. A
/// snarkjs key has no `[β]1`/`[δ]1`; they are encoded as infinity and are not
/// used by Groth16 verification.
pub fn vk_to_compressed(vk: &VerifyingKey<Bn254>) -> Vec<u8> {
    let mut out =
        Vec::with_capacity(VK_POINTS_LEN + 12 + vk.gamma_abc_g1.len() * G1_COMPRESSED_LEN);
    out.extend_from_slice(&g1_to_compressed(&vk.alpha_g1));
    out.extend_from_slice(&g1_to_compressed(&G1Affine::zero()));
    out.extend_from_slice(&g2_to_compressed(&vk.beta_g2));
    out.extend_from_slice(&g2_to_compressed(&vk.gamma_g2));
    out.extend_from_slice(&g1_to_compressed(&G1Affine::zero()));
    out.extend_from_slice(&g2_to_compressed(&vk.delta_g2));

    out.extend_from_slice(&(vk.gamma_abc_g1.len() as u32).to_be_bytes());
    for k in &vk.gamma_abc_g1 {
        out.extend_from_slice(&g1_to_compressed(k));
    }

    // PublicAndCommitmentCommitted, CommitmentKeys
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    out
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], String> {
        let slice = self
            .bytes
            .get(self.offset..self.offset + len)
            .ok_or_else(|| format!("unexpected end of data at offset {}", self.offset))?;
        self.offset += len;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32, String> {
        let s = self.take(4)?;
        Ok(u32::from_be_bytes([s[0], s[1], s[2], s[3]]))
    }
}

pub fn vk_from_compressed(bytes: &[u8]) -> Result<VerifyingKey<Bn254>, String> {
    let mut reader = Reader { bytes, offset: 0 };

    let alpha_g1 = g1_from_compressed(reader.take(G1_COMPRESSED_LEN)?, "[α]1")?;
    let _beta_g1 = g1_from_compressed(reader.take(G1_COMPRESSED_LEN)?, "[β]1")?;
    let beta_g2 = g2_from_compressed(reader.take(G2_COMPRESSED_LEN)?, "[β]2")?;
    let gamma_g2 = g2_from_compressed(reader.take(G2_COMPRESSED_LEN)?, "[γ]2")?;
    let _delta_g1 = g1_from_compressed(reader.take(G1_COMPRESSED_LEN)?, "[δ]1")?;
    let delta_g2 = g2_from_compressed(reader.take(G2_COMPRESSED_LEN)?, "[δ]2")?;

    let k_len = reader.u32()? as usize;
    let mut gamma_abc_g1 = Vec::with_capacity(k_len.min(bytes.len() / G1_COMPRESSED_LEN));
    for idx in 0..k_len {
        gamma_abc_g1.push(g1_from_compressed(
            reader.take(G1_COMPRESSED_LEN)?,
            &format!("[K]1[{idx}]"),
        )?);
    }
    if gamma_abc_g1.is_empty() {
        return Err("verifying key has no K points".to_string());
    }

    let committed_lists = reader.u32()?;
    for _ in 0..committed_lists {
        let len = reader.u32()? as usize;
        reader.take(len * 8)?;
    }
    if reader.u32()? != 0 {
        return Err("verifying keys with commitment keys are not supported".to_string());
    }
    if reader.offset != bytes.len() {
        return Err(format!(
            "{} trailing bytes after verifying key",
            bytes.len() - reader.offset
        ));
    }

    Ok(VerifyingKey {
        alpha_g1,
        beta_g2,
        gamma_g2,
        delta_g2,
        gamma_abc_g1,
    })
}

/// Each input as a 32-byte big-endian integer, concatenated in order.
pub fn public_inputs_to_bytes(inputs: &[Fr]) -> Vec<u8> {
    let mut out = Vec::with_capacity(inputs.len() * FIELD_ELEMENT_LEN);
    for input in inputs {
        out.extend_from_slice(&field_to_be_bytes(input));
    }
    out
}

pub fn public_inputs_from_bytes(bytes: &[u8]) -> Result<Vec<Fr>, String> {
    if bytes.len() % FIELD_ELEMENT_LEN != 0 {
        return Err("public inputs must be 32-byte aligned".to_string());
    }
    bytes
        .chunks(FIELD_ELEMENT_LEN)
        .enumerate()
        .map(|(idx, chunk)| {
            field_from_be_bytes(chunk)
                .ok_or_else(|| format!("public input {idx} is not a canonical field element"))
        })
        .collect()
}
