use std::time::{Duration, Instant};

use ark_bn254::{Bn254, Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_groth16::{prepare_verifying_key, Groth16, Proof, VerifyingKey};
use num_bigint::BigUint;
use tracing::info;

use crate::{
    circom::{CanonicalProof, CircomVerificationKey},
    error::{BridgeError, Result},
    utils::{decimal_to_field, decimals_to_fields, parse_decimal},
};

/// Proof, key and public inputs in verifier representation.
#[derive(Debug, Clone)]
pub struct Groth16Bundle {
    pub proof: Proof<Bn254>,
    pub vk: VerifyingKey<Bn254>,
    pub public_inputs: Vec<Fr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub verified: bool,
    pub elapsed: Duration,
}

/// Pairing check over a converted bundle.
///
/// `Ok(false)` is a well-formed proof that does not verify; `Err` is reserved
/// for failures inside the verifier itself.
pub trait ProofVerifier {
    fn verify(&self, bundle: &Groth16Bundle) -> Result<bool>;
}

/// arkworks Groth16 over BN254.
#[derive(Debug, Clone, Copy, Default)]
pub struct Groth16Verifier;

impl ProofVerifier for Groth16Verifier {
    fn verify(&self, bundle: &Groth16Bundle) -> Result<bool> {
        let pvk = prepare_verifying_key(&bundle.vk);
        Groth16::<Bn254>::verify_proof(&pvk, &bundle.proof, &bundle.public_inputs)
            .map_err(|e| BridgeError::VerificationError(e.to_string()))
    }
}

/// Fail unless there is exactly one public signal per declared public input.
pub fn validate_arity(signals: &[String], vk: &CircomVerificationKey) -> Result<()> {
    if signals.len() != vk.n_public {
        return Err(BridgeError::PublicSignalMismatch {
            signals: signals.len(),
            expected: vk.n_public,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProjectiveZ {
    One,
    Zero,
}

fn projective_z(coords: &[String], what: &str) -> Result<ProjectiveZ> {
    let values = coords
        .iter()
        .map(|c| parse_decimal(c))
        .collect::<Option<Vec<BigUint>>>()
        .ok_or_else(|| BridgeError::conversion(format!("{what}: Z is not a decimal")))?;

    let zero = BigUint::default();
    let one = BigUint::from(1u8);
    let (first, rest) = values
        .split_first()
        .ok_or_else(|| BridgeError::conversion(format!("{what}: missing Z")))?;

    if rest.iter().any(|v| *v != zero) {
        return Err(BridgeError::conversion(format!(
            "{what}: only affine points (Z = 1) are supported"
        )));
    }
    if *first == one {
        Ok(ProjectiveZ::One)
    } else if *first == zero {
        Ok(ProjectiveZ::Zero)
    } else {
        Err(BridgeError::conversion(format!(
            "{what}: only affine points (Z = 1) are supported"
        )))
    }
}

/// G1 point from `[x, y, z]` decimals.
pub fn g1_from_decimals(coords: &[String], what: &str) -> Result<G1Affine> {
    let [x, y, z] = coords else {
        return Err(BridgeError::conversion(format!(
            "{what}: expected 3 coordinates, got {}",
            coords.len()
        )));
    };

    if projective_z(std::slice::from_ref(z), what)? == ProjectiveZ::Zero {
        return Ok(G1Affine::zero());
    }

    let x: Fq = decimal_to_field(x, what)?;
    let y: Fq = decimal_to_field(y, what)?;
    let point = G1Affine::new_unchecked(x, y);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(BridgeError::conversion(format!("{what}: point is not in G1")));
    }
    Ok(point)
}

fn fq2_from_decimals(pair: &[String], what: &str) -> Result<Fq2> {
    let [c0, c1] = pair else {
        return Err(BridgeError::conversion(format!(
            "{what}: expected 2 components, got {}",
            pair.len()
        )));
    };
    Ok(Fq2::new(decimal_to_field(c0, what)?, decimal_to_field(c1, what)?))
}

/// G2 point from `[[x0, x1], [y0, y1], [z0, z1]]` decimals.
pub fn g2_from_decimals(coords: &[Vec<String>], what: &str) -> Result<G2Affine> {
    let [x, y, z] = coords else {
        return Err(BridgeError::conversion(format!(
            "{what}: expected 3 coordinate pairs, got {}",
            coords.len()
        )));
    };
    if z.len() != 2 {
        return Err(BridgeError::conversion(format!(
            "{what}: expected 2 components in Z"
        )));
    }

    if projective_z(z, what)? == ProjectiveZ::Zero {
        return Ok(G2Affine::zero());
    }

    let point = G2Affine::new_unchecked(fq2_from_decimals(x, what)?, fq2_from_decimals(y, what)?);
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(BridgeError::conversion(format!("{what}: point is not in G2")));
    }
    Ok(point)
}

/// Convert snarkjs proof, key and signals into arkworks types.
pub fn convert(
    proof: &CanonicalProof,
    vk: &CircomVerificationKey,
    signals: &[String],
) -> Result<Groth16Bundle> {
    if !vk.is_bn254() {
        return Err(BridgeError::conversion(format!(
            "unsupported curve '{}', expected bn128",
            vk.curve
        )));
    }
    for (what, protocol) in [("proof", &proof.protocol), ("vkey", &vk.protocol)] {
        if !protocol.is_empty() && protocol != "groth16" {
            return Err(BridgeError::conversion(format!(
                "{what} protocol '{protocol}' is not groth16"
            )));
        }
    }
    if vk.ic.len() != vk.n_public + 1 {
        return Err(BridgeError::conversion(format!(
            "vkey has {} IC points, expected nPublic + 1 = {}",
            vk.ic.len(),
            vk.n_public + 1
        )));
    }

    let proof = Proof {
        a: g1_from_decimals(&proof.pi_a, "pi_a")?,
        b: g2_from_decimals(&proof.pi_b, "pi_b")?,
        c: g1_from_decimals(&proof.pi_c, "pi_c")?,
    };

    let gamma_abc_g1 = vk
        .ic
        .iter()
        .enumerate()
        .map(|(idx, point)| g1_from_decimals(point, &format!("IC[{idx}]")))
        .collect::<Result<Vec<_>>>()?;

    let vk = VerifyingKey {
        alpha_g1: g1_from_decimals(&vk.vk_alpha_1, "vk_alpha_1")?,
        beta_g2: g2_from_decimals(&vk.vk_beta_2, "vk_beta_2")?,
        gamma_g2: g2_from_decimals(&vk.vk_gamma_2, "vk_gamma_2")?,
        delta_g2: g2_from_decimals(&vk.vk_delta_2, "vk_delta_2")?,
        gamma_abc_g1,
    };

    let public_inputs = decimals_to_fields::<Fr>(signals, "publicSignals")?;

    Ok(Groth16Bundle {
        proof,
        vk,
        public_inputs,
    })
}

/// Timed conversion; logs the elapsed time.
pub fn convert_timed(
    proof: &CanonicalProof,
    vk: &CircomVerificationKey,
    signals: &[String],
) -> Result<Groth16Bundle> {
    let t0 = Instant::now();
    let bundle = convert(proof, vk, signals)?;
    let convert_ms = t0.elapsed().as_millis();
    info!(elapsed_ms = convert_ms, "Converted circom proof to verifier types");
    Ok(bundle)
}

/// Run the verifier and time it.
pub fn verify_bundle(
    verifier: &dyn ProofVerifier,
    bundle: &Groth16Bundle,
) -> Result<VerificationOutcome> {
    let t0 = Instant::now();
    let verified = verifier.verify(bundle)?;
    let elapsed = t0.elapsed();
    info!(
        elapsed_ms = elapsed.as_millis(),
        verified, "Groth16 verification (BN254 pairing)"
    );
    Ok(VerificationOutcome { verified, elapsed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ec::CurveGroup;
    use num_bigint::BigUint;
    use proptest::prelude::*;

    fn dec(value: Fq) -> String {
        BigUint::from(value).to_string()
    }

    fn g1_json(p: &G1Affine) -> Vec<String> {
        vec![dec(p.x), dec(p.y), "1".into()]
    }

    fn g2_json(p: &G2Affine) -> Vec<Vec<String>> {
        vec![
            vec![dec(p.x.c0), dec(p.x.c1)],
            vec![dec(p.y.c0), dec(p.y.c1)],
            vec!["1".into(), "0".into()],
        ]
    }

    fn key(n_public: usize) -> CircomVerificationKey {
        let g1 = G1Affine::generator();
        let g2 = G2Affine::generator();
        CircomVerificationKey {
            protocol: "groth16".into(),
            curve: "bn128".into(),
            n_public,
            vk_alpha_1: g1_json(&g1),
            vk_beta_2: g2_json(&g2),
            vk_gamma_2: g2_json(&g2),
            vk_delta_2: g2_json(&g2),
            ic: vec![g1_json(&g1); n_public + 1],
        }
    }

    fn proof() -> CanonicalProof {
        let g1 = G1Affine::generator();
        let g2 = G2Affine::generator();
        CanonicalProof {
            pi_a: g1_json(&g1),
            pi_b: g2_json(&g2),
            pi_c: g1_json(&(g1 * Fr::from(2u64)).into_affine()),
            protocol: "groth16".into(),
        }
    }

    #[test]
    fn test_arity_mismatch() {
        let vk = key(5);
        let signals = vec!["1".to_string(); 4];
        let err = validate_arity(&signals, &vk).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::PublicSignalMismatch {
                signals: 4,
                expected: 5
            }
        ));
        assert!(validate_arity(&vec!["1".to_string(); 5], &vk).is_ok());
    }

    proptest! {
        #[test]
        fn prop_arity_fails_iff_lengths_differ(n_public in 0usize..12, n_signals in 0usize..12) {
            let vk = CircomVerificationKey { n_public, ..key(0) };
            let signals = vec!["0".to_string(); n_signals];
            prop_assert_eq!(validate_arity(&signals, &vk).is_err(), n_public != n_signals);
        }
    }

    #[test]
    fn test_convert_generator_points() {
        let bundle = convert(&proof(), &key(2), &["7".into(), "8".into()]).unwrap();
        assert_eq!(bundle.proof.a, G1Affine::generator());
        assert_eq!(bundle.proof.b, G2Affine::generator());
        assert_eq!(bundle.vk.gamma_abc_g1.len(), 3);
        assert_eq!(bundle.public_inputs, vec![Fr::from(7u64), Fr::from(8u64)]);
    }

    #[test]
    fn test_infinity_coordinate() {
        let p = g1_from_decimals(&["0".into(), "1".into(), "0".into()], "p").unwrap();
        assert!(p.is_zero());
    }

    #[test]
    fn test_rejects_point_off_curve() {
        let mut bad = proof();
        bad.pi_a[1] = "3".into();
        let err = convert(&bad, &key(0), &[]).unwrap_err();
        assert!(matches!(err, BridgeError::ConversionFailure(_)));
    }

    #[test]
    fn test_rejects_non_affine_z() {
        let mut bad = proof();
        bad.pi_a[2] = "2".into();
        assert!(matches!(
            convert(&bad, &key(0), &[]),
            Err(BridgeError::ConversionFailure(_))
        ));

        let mut bad = proof();
        bad.pi_b[2] = vec!["1".into(), "5".into()];
        assert!(matches!(
            convert(&bad, &key(0), &[]),
            Err(BridgeError::ConversionFailure(_))
        ));
    }

    #[test]
    fn test_rejects_compact_shape() {
        let mut bad = proof();
        bad.pi_a.pop();
        assert!(matches!(
            convert(&bad, &key(0), &[]),
            Err(BridgeError::ConversionFailure(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_curve_and_ic() {
        let mut vk = key(1);
        vk.curve = "bls12381".into();
        assert!(matches!(
            convert(&proof(), &vk, &["1".into()]),
            Err(BridgeError::ConversionFailure(_))
        ));

        let mut vk = key(1);
        vk.ic.pop();
        assert!(matches!(
            convert(&proof(), &vk, &["1".into()]),
            Err(BridgeError::ConversionFailure(_))
        ));
    }

    #[test]
    fn test_rejects_bad_signal() {
        let modulus: BigUint = Fr::from(-1i64).into();
        let too_big = (modulus + 1u8).to_string();
        assert!(matches!(
            convert(&proof(), &key(1), &[too_big]),
            Err(BridgeError::ConversionFailure(_))
        ));
        assert!(matches!(
            convert(&proof(), &key(1), &["abc".into()]),
            Err(BridgeError::ConversionFailure(_))
        ));
    }

    #[test]
    fn test_garbage_proof_is_rejected_not_error() {
        let bundle = convert(&proof(), &key(1), &["1".into()]).unwrap();
        let outcome = verify_bundle(&Groth16Verifier, &bundle).unwrap();
        assert!(!outcome.verified);
    }
}
