//! Real BN254 Groth16 fixtures rendered in the JSON shapes snarkjs produces.

#![allow(dead_code)]

use std::{fs, path::Path};

use ark_bn254::{Bn254, Fq, Fr, G1Affine, G2Affine};
use ark_groth16::{Groth16, Proof, ProvingKey, VerifyingKey};
use ark_relations::r1cs::{
    ConstraintSynthesizer, ConstraintSystemRef, LinearCombination, SynthesisError, Variable,
};
use ark_snark::{CircuitSpecificSetupSNARK, SNARK};
use ark_std::rand::{rngs::StdRng, SeedableRng};
use num_bigint::BigUint;
use serde_json::{json, Value};

/// Exposes every value as a public input, each bound to a witness copy.
#[derive(Clone)]
struct DisclosureCircuit {
    values: Vec<Fr>,
}

impl ConstraintSynthesizer<Fr> for DisclosureCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        for value in self.values {
            let witness = cs.new_witness_variable(|| Ok(value))?;
            let input = cs.new_input_variable(|| Ok(value))?;
            cs.enforce_constraint(
                LinearCombination::from(witness),
                LinearCombination::from(Variable::One),
                LinearCombination::from(input),
            )?;
        }
        Ok(())
    }
}

pub struct Fixture {
    pub proof: Proof<Bn254>,
    pub vk: VerifyingKey<Bn254>,
    pub signals: Vec<String>,
}

/// Set up and prove a circuit whose public inputs are `signals`.
pub fn prove(signals: &[String]) -> Fixture {
    let values: Vec<Fr> = signals
        .iter()
        .map(|s| Fr::from(BigUint::parse_bytes(s.as_bytes(), 10).unwrap()))
        .collect();
    let circuit = DisclosureCircuit { values };

    let mut rng = StdRng::seed_from_u64(0xdecafbad);
    let (pk, vk): (ProvingKey<Bn254>, VerifyingKey<Bn254>) =
        Groth16::<Bn254>::circuit_specific_setup(circuit.clone(), &mut rng).unwrap();
    let proof = Groth16::<Bn254>::prove(&pk, circuit, &mut rng).unwrap();

    Fixture {
        proof,
        vk,
        signals: signals.to_vec(),
    }
}

fn dec(value: Fq) -> String {
    BigUint::from(value).to_string()
}

fn g1(p: &G1Affine) -> Value {
    json!([dec(p.x), dec(p.y), "1"])
}

fn g2(p: &G2Affine) -> Value {
    json!([
        [dec(p.x.c0), dec(p.x.c1)],
        [dec(p.y.c0), dec(p.y.c1)],
        ["1", "0"]
    ])
}

impl Fixture {
    pub fn canonical_proof_json(&self) -> Value {
        json!({
            "pi_a": g1(&self.proof.a),
            "pi_b": g2(&self.proof.b),
            "pi_c": g1(&self.proof.c),
            "protocol": "groth16",
            "curve": "bn128"
        })
    }

    pub fn compact_proof_json(&self) -> Value {
        let (a, b, c) = (&self.proof.a, &self.proof.b, &self.proof.c);
        json!({
            "a": [dec(a.x), dec(a.y)],
            "b": [[dec(b.x.c0), dec(b.x.c1)], [dec(b.y.c0), dec(b.y.c1)]],
            "c": [dec(c.x), dec(c.y)],
            "protocol": "groth16",
            "curve": "bn128"
        })
    }

    pub fn vk_json(&self) -> Value {
        json!({
            "protocol": "groth16",
            "curve": "bn128",
            "nPublic": self.signals.len(),
            "vk_alpha_1": g1(&self.vk.alpha_g1),
            "vk_beta_2": g2(&self.vk.beta_g2),
            "vk_gamma_2": g2(&self.vk.gamma_g2),
            "vk_delta_2": g2(&self.vk.delta_g2),
            "vk_alphabeta_12": [],
            "IC": self.vk.gamma_abc_g1.iter().map(g1).collect::<Vec<_>>()
        })
    }

    pub fn captured_json(&self, attestation_id: Value, proof: Value) -> Value {
        json!({
            "attestationId": attestation_id,
            "proof": proof,
            "publicSignals": self.signals,
            "proofId": "0193a8d2-test",
            "capturedAt": "2025-06-01T12:00:00Z"
        })
    }
}

pub fn write_json(path: &Path, value: &Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

/// Pack a 94-byte MRZ buffer into four signals, 31/31/31/1 bytes, little-endian.
pub fn pack_mrz(buffer: &[u8; 94]) -> Vec<String> {
    let mut offset = 0;
    [31usize, 31, 31, 1]
        .iter()
        .map(|&count| {
            let chunk = &buffer[offset..offset + count];
            offset += count;
            BigUint::from_bytes_le(chunk).to_string()
        })
        .collect()
}

pub fn id_card_buffer() -> [u8; 94] {
    let mut buffer = [0u8; 94];
    let mut put = |at: usize, text: &str| {
        buffer[at..at + text.len()].copy_from_slice(text.as_bytes());
    };
    put(0, "ID");
    put(2, "DEU");
    put(30, "850312");
    put(45, "DEU");
    put(60, &format!("{:<<30}", "MUSTERMANN<<ERIKA<ANNA"));
    put(90, "21");
    buffer
}

/// MRZ signals followed by trailing non-MRZ signals, as the disclosure circuit emits.
pub fn id_card_signals() -> Vec<String> {
    let mut signals = pack_mrz(&id_card_buffer());
    signals.extend(["42", "0", "1234567890123456789"].map(String::from));
    signals
}
